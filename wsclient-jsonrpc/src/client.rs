//! The JSON-RPC client itself.
//!
//! All three ways of making a call end up in [`JsonRpcClient::call`]:
//!
//! - `async`: await [`JsonRpcClient::call`] directly, or use [`JsonRpcClient::spawn_call`] to get
//!   a handle that resolves exactly once, without waiting here.
//! - continuations: [`JsonRpcClient::call_with_callbacks`] returns immediately and later invokes
//!   exactly one of the two callbacks.
//! - blocking: [`crate::BlockingJsonRpcClient`] parks the calling thread until the call is done.
use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::error::*;
use crate::shared::{classify_response, ResultArity, RpcRequest};
use serde_json::Value;
use snafu::ResultExt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::*;

/// Async client for a single JSON-RPC 1.1 endpoint.
///
/// Cloning is cheap and clones share the underlying HTTP connection pool.  The client holds no
/// per-call state: every call builds its own request and reads its own response.
#[derive(Clone)]
pub struct JsonRpcClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    url: reqwest::Url,
    auth: AuthContext,
    http: reqwest::Client,
}

impl Debug for JsonRpcClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("url", &self.inner.url.as_str())
            .field("auth", &self.inner.auth)
            .finish()
    }
}

impl JsonRpcClient {
    /// Build a client from a config, using the config's static token (if any) for auth.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let auth = match &config.token {
            Some(token) => AuthContext::with_token(token),
            None => AuthContext::none(),
        };
        Self::with_auth(config, auth)
    }

    /// Build a client from a config, with explicit auth that overrides the config's token.
    pub fn with_auth(config: &ClientConfig, auth: AuthContext) -> Result<Self, ConfigError> {
        Ok(Self::from_parts(
            config.parse_url()?,
            auth,
            config.build_http_client()?,
        ))
    }

    /// Assemble a client out of an already-constructed HTTP client.
    pub fn from_parts(url: reqwest::Url, auth: AuthContext, http: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(ClientInner { url, auth, http }),
        }
    }

    pub fn url(&self) -> &str {
        self.inner.url.as_str()
    }

    pub fn auth(&self) -> &AuthContext {
        &self.inner.auth
    }

    /// Invoke `method` with positional `params`, and unwrap the result according to `arity`.
    ///
    /// Exactly one HTTP request is made.  There are no retries; whatever goes wrong is returned.
    pub async fn call(&self, method: &str, params: Vec<Value>, arity: ResultArity) -> Result<Value> {
        let request = RpcRequest::new(method, &params);
        let body = request.to_json()?;

        let mut builder = self
            .inner
            .http
            .post(self.inner.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(token) = self.inner.auth.resolve().await {
            builder = builder.header(reqwest::header::AUTHORIZATION, token);
        }

        trace!(method, id = request.id(), url = %self.inner.url, "Sending JSON-RPC request");
        let started = Instant::now();

        let response = builder.send().await.context(TransportSnafu {
            url: self.inner.url.as_str(),
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.context(TransportSnafu {
            url: self.inner.url.as_str(),
        })?;

        debug!(
            method,
            id = request.id(),
            status,
            body_len = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "JSON-RPC response received"
        );

        classify_response(status, &body, arity)
    }

    /// Start a call in the background and return a handle that resolves once with its outcome.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_call(
        &self,
        method: impl Into<String>,
        params: Vec<Value>,
        arity: ResultArity,
    ) -> JoinHandle<Result<Value>> {
        let client = self.clone();
        let method = method.into();
        tokio::spawn(async move { client.call(&method, params, arity).await })
    }

    /// Start a call in the background; `on_success` or `on_error` is invoked exactly once when it
    /// completes.
    ///
    /// The continuation runs on a runtime worker, so it shouldn't block.  The returned handle can
    /// be awaited to know that the continuation has run, or dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn call_with_callbacks<S, E>(
        &self,
        method: impl Into<String>,
        params: Vec<Value>,
        arity: ResultArity,
        on_success: S,
        on_error: E,
    ) -> JoinHandle<()>
    where
        S: FnOnce(Value) + Send + 'static,
        E: FnOnce(RpcError) + Send + 'static,
    {
        let client = self.clone();
        let method = method.into();
        tokio::spawn(async move {
            match client.call(&method, params, arity).await {
                Ok(result) => on_success(result),
                Err(e) => on_error(e),
            }
        })
    }

    /// Like [`Self::call_with_callbacks`], but without an error continuation.
    ///
    /// If the call fails there is nobody to hand the error to, so the background task panics with
    /// the [`RpcError`] as its payload.  Await the returned handle and use
    /// [`tokio::task::JoinError::into_panic`] to get it back.
    pub fn call_with_callback<S>(
        &self,
        method: impl Into<String>,
        params: Vec<Value>,
        arity: ResultArity,
        on_success: S,
    ) -> JoinHandle<()>
    where
        S: FnOnce(Value) + Send + 'static,
    {
        let client = self.clone();
        let method = method.into();
        tokio::spawn(async move {
            match client.call(&method, params, arity).await {
                Ok(result) => on_success(result),
                Err(e) => {
                    warn!(method = %method, error = %e, "JSON-RPC call failed and no error callback was provided");
                    std::panic::panic_any(e)
                }
            }
        })
    }
}
