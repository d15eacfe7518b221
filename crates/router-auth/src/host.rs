//! Absolute login and callback URLs
//!
//! The callback URL is what gets pasted into each provider's developer
//! console, so it is always formatted with an explicit port.

use std::fmt;

use crate::registry::ProviderRegistry;
use crate::routes::Routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Externally reachable address of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub scheme: Scheme,
    pub hostname: String,
    pub port: u16,
}

impl Host {
    pub fn http(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: Scheme::Http,
            hostname: hostname.into(),
            port,
        }
    }

    pub fn https(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: Scheme::Https,
            hostname: hostname.into(),
            port,
        }
    }

    /// `scheme://hostname:port`
    pub fn prefix(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.hostname, self.port)
    }

    pub fn callback_url(&self, routes: &Routes, provider: &str) -> String {
        format!("{}{}", self.prefix(), routes.callback_path(provider))
    }

    /// # Panics
    ///
    /// Panics if `provider` is not registered, like `ProviderRegistry::login_url`.
    pub fn login_url(&self, registry: &ProviderRegistry, provider: &str) -> String {
        format!("{}{}", self.prefix(), registry.login_url(provider))
    }
}
