//! OAuth2 providers for GitHub, Google, Facebook and SoundCloud
//!
//! Implements the `provider::Provider` trait with a single generic
//! authorization-code client. This crate has no dependency on the HTTP
//! adapter; it can be tested and used independently.
//!
//! Login flow:
//! 1. `ProviderConfig::github(...)` (or another kind) registered at startup
//! 2. `begin_auth_url()` signs the login `State` into the `state` parameter
//! 3. The provider redirects back with `code` and `state`
//! 4. `complete_auth()` verifies the state and calls `token::exchange_code()`
//! 5. `get_user()` fetches the user document and maps it via `ProviderKind`

pub mod kind;
pub mod oauth2;
pub mod state;
pub mod token;

pub use kind::{Endpoints, ProviderKind};
pub use oauth2::{OAuth2Provider, ProviderConfig};
pub use state::{generate_security_key, sign_state, verify_state};
pub use token::{CodeExchange, TokenResponse, exchange_code};
