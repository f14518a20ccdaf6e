//! Blocking flavor of the client, for callers that don't have (or want) an async runtime.
use crate::auth::AuthContext;
use crate::client::JsonRpcClient;
use crate::config::ClientConfig;
use crate::error::*;
use crate::shared::ResultArity;
use serde_json::Value;
use snafu::ResultExt;

/// A client whose calls park the calling thread until the HTTP exchange is finished.
///
/// Internally this drives a regular [`JsonRpcClient`] on a private single-threaded runtime, so it
/// must not be used (or dropped) from inside an async context.
#[derive(Debug)]
pub struct BlockingJsonRpcClient {
    client: JsonRpcClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingJsonRpcClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::from_client(JsonRpcClient::new(config)?)
    }

    pub fn with_auth(config: &ClientConfig, auth: AuthContext) -> Result<Self, ConfigError> {
        Self::from_client(JsonRpcClient::with_auth(config, auth)?)
    }

    /// Wrap an async client.
    ///
    /// The async client should not also be used on another runtime, since pooled connections are
    /// tied to the runtime that opened them.
    pub fn from_client(client: JsonRpcClient) -> Result<Self, ConfigError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .thread_name("wsclient-blocking")
            .build()
            .context(RuntimeSnafu)?;

        Ok(Self { client, runtime })
    }

    pub fn url(&self) -> &str {
        self.client.url()
    }

    /// Blocking equivalent of [`JsonRpcClient::call`].
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn call(&self, method: &str, params: Vec<Value>, arity: ResultArity) -> Result<Value> {
        self.runtime.block_on(self.client.call(method, params, arity))
    }
}
