//! Client bindings for the workspace service: a JSON-RPC 1.1 service for storing, versioning
//! and sharing typed objects in named workspaces.
//!
//! The transport lives in [`wsclient_jsonrpc`]; this crate adds the service's method tables and
//! the wrappers generated from them.
mod client;
mod error;
mod methods;

pub use client::*;
pub use error::*;
pub use methods::*;

/// Re-export of the transport crate, so callers don't need a separate dependency on it
pub use wsclient_jsonrpc as jsonrpc;
pub use wsclient_jsonrpc::{AuthContext, ClientConfig, ResultArity, RpcError, RpcErrorKind};

