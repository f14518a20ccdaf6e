//! A very small JSON-RPC 1.1 client, with just enough functionality to talk to the workspace
//! service and its relatives.
//!
//! JSON-RPC 1.1 differs from 2.0 in ways that matter on the wire (a `version` member instead of
//! `jsonrpc`, and results that are arrays of positional return values), so the 2.0 types from
//! `jsonrpsee-types` don't fit.  The envelope here is hand-written instead; see [`RpcRequest`].
mod auth;
mod blocking;
mod client;
mod config;
mod error;
mod shared;

pub use auth::*;
pub use blocking::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use shared::*;
