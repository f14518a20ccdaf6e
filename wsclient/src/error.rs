use crate::methods::ServiceRevision;
use thiserror::Error;
use wsclient_jsonrpc::RpcError;

pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Errors calling workspace service methods.
///
/// Everything except [`WorkspaceError::Rpc`] is detected locally, before a request is sent.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("'{name}' is not a method of the {revision} workspace service")]
    UnknownMethod {
        name: String,
        revision: ServiceRevision,
    },

    #[error("'{method}' takes {expected} parameter(s) ({params}) but {actual} were given")]
    ArityMismatch {
        method: &'static str,
        params: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unable to serialize the parameters for '{method}'")]
    InvalidParams {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl WorkspaceError {
    /// The underlying RPC error, if the call actually went out.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            WorkspaceError::Rpc(e) => Some(e),
            _ => None,
        }
    }
}
