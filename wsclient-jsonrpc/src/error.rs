use snafu::Snafu;
use std::path::PathBuf;

/// Everything that can go wrong with a single JSON-RPC call.
///
/// The first three variants are the classification of the HTTP exchange itself; `InvalidRequest`
/// is a local failure that happens before anything is put on the wire.
#[derive(Debug, Snafu, strum::EnumDiscriminants)]
#[snafu(visibility(pub(crate)))]
#[strum_discriminants(
    name(RpcErrorKind),
    derive(Hash, strum::Display, strum::AsRefStr)
)]
pub enum RpcError {
    /// The request never produced an HTTP status: the server was unreachable, refused the
    /// connection, timed out, or the connection dropped before the body was read.
    #[snafu(display("HTTP request to '{url}' failed before a response was received"))]
    Transport { url: String, source: reqwest::Error },

    /// The service returned a structured error payload.  The payload is service-defined and kept
    /// as-is.
    #[snafu(display("Service returned an error (HTTP {status}): {detail}"))]
    ServiceError {
        status: u16,
        detail: serde_json::Value,
    },

    /// A response arrived but its body isn't something we can interpret.
    #[snafu(display("Malformed response (HTTP {status}): {reason}"))]
    MalformedResponse { status: u16, reason: String },

    #[snafu(display("Unable to serialize the request for method '{method}'"))]
    InvalidRequest {
        method: String,
        source: serde_json::Error,
    },
}

impl RpcError {
    pub fn kind(&self) -> RpcErrorKind {
        RpcErrorKind::from(self)
    }

    /// The HTTP status of the response, if a response was received at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RpcError::ServiceError { status, .. } | RpcError::MalformedResponse { status, .. } => {
                Some(*status)
            }
            RpcError::Transport { .. } | RpcError::InvalidRequest { .. } => None,
        }
    }

    /// The opaque error value the service sent back, for [`RpcError::ServiceError`] only.
    pub fn detail(&self) -> Option<&serde_json::Value> {
        match self {
            RpcError::ServiceError { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Best-effort human readable message out of a service error detail.
    ///
    /// The detail is opaque, but in practice it's either a bare string or an object with a
    /// `message` field, so try both.
    pub fn service_message(&self) -> Option<&str> {
        let detail = self.detail()?;
        detail
            .as_str()
            .or_else(|| detail.get("message").and_then(|m| m.as_str()))
    }
}

pub type Result<T, E = RpcError> = std::result::Result<T, E>;

/// Errors setting up a client, as opposed to errors making a call with one.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("Error reading client config file '{}'", path.display()))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Client config file '{}' is not valid", path.display()))]
    ParseConfig {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("The service URL '{url}' is not valid: {reason}"))]
    InvalidUrl { url: String, reason: String },

    #[snafu(display("A timeout of zero would fail every call; omit the timeout to wait forever"))]
    ZeroTimeout,

    #[snafu(display("Unable to construct the HTTP client"))]
    HttpClient { source: reqwest::Error },

    #[snafu(display("Unable to start the runtime used for blocking calls"))]
    Runtime { source: std::io::Error },
}
