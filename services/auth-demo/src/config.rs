//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Client secrets come from `<KIND>_CLIENT_SECRET` or `client_secret_file`
//! and the state signing key from `AUTH_SECURITY_KEY`; neither is ever
//! stored in the TOML.

use common::Secret;
use oauth_providers::ProviderKind;
use router_auth::Host;
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Env var holding the state signing key.
pub const SECURITY_KEY_ENV: &str = "AUTH_SECURITY_KEY";

/// Shortest accepted signing key, in bytes.
pub const MIN_SECURITY_KEY_LEN: usize = 32;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
    /// From `AUTH_SECURITY_KEY`; a random key is generated when absent.
    #[serde(skip)]
    pub security_key: Option<Secret<Vec<u8>>>,
}

/// HTTP listener and externally visible address
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Hostname used in callback URLs
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Port used in callback URLs; defaults to the listen port
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub https: bool,
    #[serde(default = "default_mount")]
    pub mount: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Timeout for calls to provider token and user endpoints
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// One `[[providers]]` entry
#[derive(Debug, Deserialize)]
pub struct ProviderEntry {
    pub kind: ProviderKind,
    pub client_id: String,
    /// Path to a file containing the client secret (alternative to env var)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
}

fn default_hostname() -> String {
    "localhost".into()
}

fn default_mount() -> String {
    "/auth".into()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_connections() -> usize {
    1000
}

impl ServerConfig {
    /// Externally visible address the callback URLs are built from.
    pub fn host(&self) -> Host {
        let port = self.port.unwrap_or(self.listen_addr.port());
        if self.https {
            Host::https(self.hostname.clone(), port)
        } else {
            Host::http(self.hostname.clone(), port)
        }
    }
}

impl ProviderEntry {
    /// `GITHUB_CLIENT_SECRET`, `GOOGLE_CLIENT_SECRET`, ...
    pub fn secret_env_var(&self) -> String {
        format!("{}_CLIENT_SECRET", self.kind.name().to_uppercase())
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Client secret resolution order, per provider:
    /// 1. `<KIND>_CLIENT_SECRET` env var
    /// 2. client_secret_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if config.server.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if config.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if config.server.hostname.trim().is_empty() {
            return Err(common::Error::Config("hostname must not be empty".into()));
        }

        if config.providers.is_empty() {
            return Err(common::Error::Config(
                "at least one [[providers]] entry is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &mut config.providers {
            if !seen.insert(entry.kind) {
                return Err(common::Error::Config(format!(
                    "provider {} is configured more than once",
                    entry.kind
                )));
            }
            if entry.client_id.trim().is_empty() {
                return Err(common::Error::Config(format!(
                    "provider {}: client_id must not be empty",
                    entry.kind
                )));
            }
            entry.client_secret = Some(resolve_client_secret(entry)?);
        }

        if let Ok(key) = std::env::var(SECURITY_KEY_ENV) {
            if key.len() < MIN_SECURITY_KEY_LEN {
                return Err(common::Error::Config(format!(
                    "{SECURITY_KEY_ENV} must be at least {MIN_SECURITY_KEY_LEN} bytes"
                )));
            }
            config.security_key = Some(Secret::new(key.into_bytes()));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("auth-demo.toml")
    }
}

fn resolve_client_secret(entry: &ProviderEntry) -> common::Result<Secret<String>> {
    let env_var = entry.secret_env_var();
    if let Ok(secret) = std::env::var(&env_var) {
        let secret = Secret::new(secret);
        if !secret.is_blank() {
            return Ok(secret);
        }
    }

    let Some(ref path) = entry.client_secret_file else {
        return Err(common::Error::Config(format!(
            "provider {}: no client secret, set {env_var} or client_secret_file",
            entry.kind
        )));
    };
    let secret = std::fs::read_to_string(path).map_err(|e| {
        common::Error::Config(format!(
            "failed to read client_secret_file {}: {e}",
            path.display()
        ))
    })?;
    let secret = Secret::new(secret.trim().to_owned());
    if secret.is_blank() {
        return Err(common::Error::Config(format!(
            "provider {}: client_secret_file {} is empty",
            entry.kind,
            path.display()
        )));
    }
    Ok(secret)
}
