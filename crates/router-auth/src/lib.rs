//! OAuth login routes for axum
//!
//! Glue between an axum router and any `provider::Provider` implementation.
//! Three pieces cooperate on every auth request:
//! - `select_provider` resolves the `{provider}` path segment against the
//!   `ProviderRegistry` and stores the provider in the `RequestContext`
//! - `LoginRedirect` sends the browser to the provider's authorization URL
//! - `complete_callback` turns the callback query into a `User` before the
//!   application handler runs
//!
//! Failures are never rendered here. They are stored in the context's error
//! slot and the chain stops; an outer layer decides what the client sees.
//!
//! ```ignore
//! let mut registry = ProviderRegistry::new(Routes::new("/auth"));
//! registry.register("github", github_config);
//! let registry = Arc::new(registry);
//!
//! let app = Router::new()
//!     .merge(auth_router(registry.clone(), LoginRedirect::default(), welcome))
//!     .layer(middleware::from_fn(render_errors))
//!     .layer(middleware::from_fn(install_context));
//! ```

pub mod context;
pub mod error;
pub mod host;
pub mod login;
pub mod metrics;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod routes;

pub use context::{ContextKind, ContextValue, RequestContext, install_context};
pub use error::{Error, Result};
pub use host::{Host, Scheme};
pub use login::LoginRedirect;
pub use middleware::{complete_callback, select_provider};
pub use registry::{ProviderRegistry, Registration};
pub use router::auth_router;
pub use routes::Routes;
