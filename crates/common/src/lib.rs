//! Shared types for the router-omniauth workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
