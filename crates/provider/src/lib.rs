//! Provider abstraction for OAuth identity providers
//!
//! Defines the `Provider` trait that decouples the HTTP adapter from any
//! concrete OAuth library. The adapter only ever calls the three steps of an
//! authorization-code login:
//! - `begin_auth_url` builds the provider's authorization URL
//! - `complete_auth` turns the callback query into credentials
//! - `get_user` resolves the authenticated user from those credentials
//!
//! Concrete providers (GitHub, Google, ...) live in `oauth-providers`.

pub mod query;
pub mod state;
pub mod user;

pub use query::{QueryError, QueryMap, parse_query};
pub use state::State;
pub use user::{Credentials, User};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Errors from provider operations (construction, URL building, code
/// exchange, user lookup).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider misconfigured: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("authorization denied: {0}")]
    AuthDenied(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("missing callback parameter: {0}")]
    MissingParameter(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("user lookup failed: {0}")]
    UserInfo(String),
}

/// Result alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// An OAuth identity provider.
///
/// Every call is a single attempt: implementations must not retry, and
/// callers treat any error as terminal for the current request.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn Provider>`).
pub trait Provider: Send + Sync {
    /// Registry name, also the `{provider}` path segment (e.g. "github").
    fn name(&self) -> &str;

    /// Build the URL the browser is redirected to in order to start login.
    ///
    /// `state` is round-tripped by the provider and comes back on the
    /// callback. `options` are appended as extra authorization parameters.
    fn begin_auth_url(&self, state: &State, options: &QueryMap) -> Result<String>;

    /// Exchange the callback parameters (code, state, ...) for credentials.
    fn complete_auth<'a>(
        &'a self,
        query: &'a QueryMap,
    ) -> Pin<Box<dyn Future<Output = Result<Credentials>> + Send + 'a>>;

    /// Fetch the authenticated user with previously obtained credentials.
    fn get_user<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> Pin<Box<dyn Future<Output = Result<User>> + Send + 'a>>;
}

/// Produces a ready-to-use provider handle from stored registration data.
///
/// Construction may fail (e.g. an unparsable callback URL), which callers
/// surface as a per-request error rather than a panic.
pub trait ProviderFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn Provider>>;
}

impl<F> ProviderFactory for F
where
    F: Fn() -> Result<Arc<dyn Provider>> + Send + Sync,
{
    fn create(&self) -> Result<Arc<dyn Provider>> {
        self()
    }
}
