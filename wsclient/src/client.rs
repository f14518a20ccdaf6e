use crate::error::*;
use crate::methods::{ServiceRevision, SERVICE_NAME};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::*;
use wsclient_jsonrpc::{
    AuthContext, BlockingJsonRpcClient, ClientConfig, ConfigError, JsonRpcClient, ResultArity,
    RpcError,
};

fn to_params(method: &'static str, params: impl Serialize) -> Result<Value> {
    serde_json::to_value(params).map_err(|source| WorkspaceError::InvalidParams { method, source })
}

/// Async client for the workspace service.
///
/// Besides the generated per-method calls (`save_object`, `get_object`, ...) any method of either
/// [`ServiceRevision`] can be called by name with [`Self::call_method`].
#[derive(Clone, Debug)]
pub struct WorkspaceClient {
    rpc: JsonRpcClient,
}

impl WorkspaceClient {
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::from_rpc(JsonRpcClient::new(config)?))
    }

    pub fn with_auth(
        config: &ClientConfig,
        auth: AuthContext,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self::from_rpc(JsonRpcClient::with_auth(config, auth)?))
    }

    pub fn from_rpc(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }

    /// The JSON-RPC client underneath, for calling methods that aren't in any table.
    pub fn rpc(&self) -> &JsonRpcClient {
        &self.rpc
    }

    /// Call a method by name with positional arguments.
    ///
    /// The name and argument count are checked against the revision's table before anything is
    /// sent; the result is unwrapped according to the table's arity for that method.
    pub async fn call_method(
        &self,
        revision: ServiceRevision,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        let spec = revision.resolve(name, args.len())?;
        debug!(method = spec.name, %revision, "Calling workspace service method");
        Ok(self
            .rpc
            .call(&spec.qualified_name(), args, spec.result)
            .await?)
    }

    /// Callback flavor of [`Self::call_method`].
    ///
    /// Lookup failures are returned right away and neither callback fires.  Otherwise this returns
    /// immediately and exactly one of the callbacks fires when the call completes.
    pub fn call_with_callbacks<S, E>(
        &self,
        revision: ServiceRevision,
        name: &str,
        args: Vec<Value>,
        on_success: S,
        on_error: E,
    ) -> Result<JoinHandle<()>>
    where
        S: FnOnce(Value) + Send + 'static,
        E: FnOnce(RpcError) + Send + 'static,
    {
        let spec = revision.resolve(name, args.len())?;
        Ok(self.rpc.call_with_callbacks(
            spec.qualified_name(),
            args,
            spec.result,
            on_success,
            on_error,
        ))
    }

    /// Shared body of the generated methods.
    pub(crate) async fn invoke(&self, name: &'static str, params: impl Serialize) -> Result<Value> {
        let params = to_params(name, params)?;
        Ok(self
            .rpc
            .call(
                &format!("{SERVICE_NAME}.{name}"),
                vec![params],
                ResultArity::Single,
            )
            .await?)
    }
}

/// Blocking counterpart of [`WorkspaceClient`].
///
/// Must not be used from inside an async context; see [`BlockingJsonRpcClient`].
#[derive(Debug)]
pub struct BlockingWorkspaceClient {
    rpc: BlockingJsonRpcClient,
}

impl BlockingWorkspaceClient {
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::from_rpc(BlockingJsonRpcClient::new(config)?))
    }

    pub fn with_auth(
        config: &ClientConfig,
        auth: AuthContext,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self::from_rpc(BlockingJsonRpcClient::with_auth(
            config, auth,
        )?))
    }

    pub fn from_rpc(rpc: BlockingJsonRpcClient) -> Self {
        Self { rpc }
    }

    pub fn rpc(&self) -> &BlockingJsonRpcClient {
        &self.rpc
    }

    /// Blocking equivalent of [`WorkspaceClient::call_method`].
    pub fn call_method(
        &self,
        revision: ServiceRevision,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        let spec = revision.resolve(name, args.len())?;
        debug!(method = spec.name, %revision, "Calling workspace service method");
        Ok(self.rpc.call(&spec.qualified_name(), args, spec.result)?)
    }

    pub(crate) fn invoke(&self, name: &'static str, params: impl Serialize) -> Result<Value> {
        let params = to_params(name, params)?;
        Ok(self.rpc.call(
            &format!("{SERVICE_NAME}.{name}"),
            vec![params],
            ResultArity::Single,
        )?)
    }
}
