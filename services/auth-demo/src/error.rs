//! Service-specific error types

use provider::ProviderError;
use thiserror::Error;

/// Startup errors raised while wiring providers into the registry.
///
/// Per-request failures live in the `RequestContext` and are rendered by
/// the error layer; they never propagate as Rust errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("provider {provider} cannot be set up: {source}")]
    ProviderSetup {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),

    #[error(transparent)]
    Registry(#[from] router_auth::Error),
}

/// Result alias using service Error
pub type Result<T> = std::result::Result<T, Error>;
