//! Generic OAuth2 authorization-code provider
//!
//! One implementation covers every `ProviderKind`; the kind only contributes
//! endpoints, scopes and user mapping.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use common::Secret;
use provider::{
    Credentials, Provider, ProviderError, ProviderFactory, QueryMap, Result, State, User,
};
use reqwest::Url;
use tracing::debug;

use crate::kind::{Endpoints, ProviderKind};
use crate::state::{sign_state, verify_state};
use crate::token::{CodeExchange, exchange_code};

/// User-Agent sent to provider APIs (GitHub rejects requests without one).
const USER_AGENT: &str = concat!("router-omniauth/", env!("CARGO_PKG_VERSION"));

/// Registration data for one provider.
///
/// Cheap to clone: the HTTP client and the signing key are shared.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub callback_url: String,
    pub scopes: Vec<String>,
    pub endpoints: Endpoints,
    security_key: Arc<Secret<Vec<u8>>>,
    http: reqwest::Client,
}

impl ProviderConfig {
    pub fn new(
        kind: ProviderKind,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
        security_key: Arc<Secret<Vec<u8>>>,
    ) -> Self {
        Self {
            kind,
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
            callback_url: callback_url.into(),
            scopes: kind.default_scopes().iter().map(|s| s.to_string()).collect(),
            endpoints: kind.endpoints(),
            security_key,
            http: reqwest::Client::new(),
        }
    }

    pub fn github(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
        security_key: Arc<Secret<Vec<u8>>>,
    ) -> Self {
        Self::new(
            ProviderKind::GitHub,
            client_id,
            client_secret,
            callback_url,
            security_key,
        )
    }

    pub fn google(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
        security_key: Arc<Secret<Vec<u8>>>,
    ) -> Self {
        Self::new(
            ProviderKind::Google,
            client_id,
            client_secret,
            callback_url,
            security_key,
        )
    }

    pub fn facebook(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
        security_key: Arc<Secret<Vec<u8>>>,
    ) -> Self {
        Self::new(
            ProviderKind::Facebook,
            client_id,
            client_secret,
            callback_url,
            security_key,
        )
    }

    pub fn soundcloud(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
        security_key: Arc<Secret<Vec<u8>>>,
    ) -> Self {
        Self::new(
            ProviderKind::SoundCloud,
            client_id,
            client_secret,
            callback_url,
            security_key,
        )
    }

    /// Replace the default scopes. An empty list omits the `scope` parameter.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Point the provider at different endpoints (self-hosted or test servers).
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("callback_url", &self.callback_url)
            .field("scopes", &self.scopes)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl ProviderFactory for ProviderConfig {
    fn create(&self) -> Result<Arc<dyn Provider>> {
        Ok(Arc::new(OAuth2Provider::new(self.clone())?))
    }
}

/// A validated, ready-to-use provider.
pub struct OAuth2Provider {
    config: ProviderConfig,
    authorize_url: Url,
}

impl OAuth2Provider {
    /// Validate the configuration. Fails on an empty client id or secret, or
    /// on callback/endpoint URLs that are not absolute http(s) URLs.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            return Err(ProviderError::Config(format!(
                "{}: client_id is empty",
                config.kind
            )));
        }
        if config.client_secret.is_blank() {
            return Err(ProviderError::Config(format!(
                "{}: client_secret is empty",
                config.kind
            )));
        }
        parse_http_url(config.kind, "callback_url", &config.callback_url)?;
        parse_http_url(config.kind, "token endpoint", &config.endpoints.token)?;
        parse_http_url(config.kind, "user endpoint", &config.endpoints.user)?;
        let authorize_url =
            parse_http_url(config.kind, "authorize endpoint", &config.endpoints.authorize)?;

        Ok(Self {
            config,
            authorize_url,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    async fn fetch_user(&self, credentials: &Credentials) -> Result<User> {
        let kind = self.config.kind;
        let response = self
            .config
            .http
            .get(&self.config.endpoints.user)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", kind.auth_scheme(), credentials.access_token.expose()),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| ProviderError::Http(format!("user request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(ProviderError::UserInfo(format!(
                "user endpoint returned {status}: {body}"
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::UserInfo(format!("invalid user document: {e}")))?;
        let mut user = kind.user_from_json(raw)?;
        user.credentials = Some(credentials.clone());
        debug!(provider = %kind, user_id = %user.id, "user resolved");
        Ok(user)
    }
}

fn parse_http_url(kind: ProviderKind, what: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ProviderError::Config(format!("{kind}: invalid {what} {raw:?}: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ProviderError::Config(format!(
            "{kind}: {what} must use http or https, got: {raw}"
        )));
    }
    Ok(url)
}

impl Provider for OAuth2Provider {
    fn name(&self) -> &str {
        self.config.kind.name()
    }

    fn begin_auth_url(&self, state: &State, options: &QueryMap) -> Result<String> {
        let signed = sign_state(self.config.security_key.expose(), state)?;
        let mut url = self.authorize_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.callback_url)
                .append_pair("response_type", "code");
            if !self.config.scopes.is_empty() {
                let scope = self.config.scopes.join(self.config.kind.scope_separator());
                query.append_pair("scope", &scope);
            }
            query.append_pair("state", &signed);
            for (key, value) in options {
                query.append_pair(key, value);
            }
        }
        Ok(url.to_string())
    }

    fn complete_auth<'a>(
        &'a self,
        query: &'a QueryMap,
    ) -> Pin<Box<dyn Future<Output = Result<Credentials>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(error) = query.get("error") {
                let reason = match query.get("error_description") {
                    Some(description) => format!("{error}: {description}"),
                    None => error.clone(),
                };
                return Err(ProviderError::AuthDenied(reason));
            }

            let state = query
                .get("state")
                .ok_or_else(|| ProviderError::MissingParameter("state".into()))?;
            verify_state(self.config.security_key.expose(), state)?;

            let code = query
                .get("code")
                .ok_or_else(|| ProviderError::MissingParameter("code".into()))?;

            exchange_code(
                &self.config.http,
                &CodeExchange {
                    token_endpoint: &self.config.endpoints.token,
                    client_id: &self.config.client_id,
                    client_secret: self.config.client_secret.expose(),
                    redirect_uri: &self.config.callback_url,
                    code,
                },
            )
            .await
        })
    }

    fn get_user<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> Pin<Box<dyn Future<Output = Result<User>> + Send + 'a>> {
        Box::pin(self.fetch_user(credentials))
    }
}
