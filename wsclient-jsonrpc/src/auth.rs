//! Authorization for outgoing requests.
//!
//! The service takes the raw token in the `Authorization` header (no `Bearer ` scheme).  A client
//! either has a fixed token, or a [`TokenSupplier`] that's asked for a token before every single
//! call so that short-lived credentials can rotate underneath a long-lived client.
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::*;

/// Something that can produce a fresh token for each request.
///
/// Implementations must tolerate being called concurrently from many in-flight requests.  Any
/// state they keep is their own business.
#[async_trait::async_trait]
pub trait TokenSupplier: Send + Sync {
    /// Get the token to use for the next request, or `None` to send the request unauthenticated.
    async fn token(&self) -> Option<String>;
}

#[async_trait::async_trait]
impl<F> TokenSupplier for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    async fn token(&self) -> Option<String> {
        (self)()
    }
}

/// Token supplier that re-reads an environment variable on every call.
#[derive(Clone, Debug)]
pub struct EnvTokenSupplier {
    var: String,
}

impl EnvTokenSupplier {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait::async_trait]
impl TokenSupplier for EnvTokenSupplier {
    async fn token(&self) -> Option<String> {
        match std::env::var(&self.var) {
            Ok(token) => Some(token),
            Err(e) => {
                trace!(var = %self.var, error = %e, "Token environment variable not usable");
                None
            }
        }
    }
}

/// The credentials a client attaches to its requests.
#[derive(Clone, Default)]
pub struct AuthContext {
    token: Option<String>,
    supplier: Option<Arc<dyn TokenSupplier>>,
}

impl AuthContext {
    /// No credentials at all; requests go out without an `Authorization` header.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            supplier: None,
        }
    }

    pub fn with_supplier(supplier: impl TokenSupplier + 'static) -> Self {
        Self {
            token: None,
            supplier: Some(Arc::new(supplier)),
        }
    }

    /// Add (or replace) the supplier on an existing context.  The supplier takes precedence over
    /// the static token.
    pub fn supplier(mut self, supplier: impl TokenSupplier + 'static) -> Self {
        self.supplier = Some(Arc::new(supplier));
        self
    }

    /// Work out the token for one request.
    ///
    /// The supplier, if any, is invoked every time.  Empty tokens are treated the same as no
    /// token.
    pub async fn resolve(&self) -> Option<String> {
        let token = match &self.supplier {
            Some(supplier) => supplier.token().await,
            None => self.token.clone(),
        };

        token.filter(|token| !token.is_empty())
    }
}

impl Debug for AuthContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Never put the token itself in logs
        f.debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("supplier", &self.supplier.is_some())
            .finish()
    }
}
