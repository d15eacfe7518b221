//! Authorization code exchange
//!
//! POSTs the code to the provider's token endpoint with the client
//! credentials. Some providers (GitHub) answer `200 OK` with an `error`
//! field instead of a 4xx, so the body is checked for that too.

use common::Secret;
use provider::{Credentials, ProviderError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Response from the token endpoint.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl From<TokenResponse> for Credentials {
    fn from(token: TokenResponse) -> Self {
        Credentials {
            access_token: Secret::new(token.access_token),
            token_type: token.token_type.unwrap_or_else(|| "bearer".into()),
            refresh_token: token.refresh_token.map(Secret::new),
            expires_in: token.expires_in,
            scope: token.scope,
        }
    }
}

/// Parameters of an authorization-code grant.
pub struct CodeExchange<'a> {
    pub token_endpoint: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub redirect_uri: &'a str,
    pub code: &'a str,
}

/// Exchange an authorization code for credentials. Single attempt.
pub async fn exchange_code(
    client: &reqwest::Client,
    exchange: &CodeExchange<'_>,
) -> Result<Credentials> {
    let response = client
        .post(exchange.token_endpoint)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", exchange.code),
            ("client_id", exchange.client_id),
            ("client_secret", exchange.client_secret),
            ("redirect_uri", exchange.redirect_uri),
        ])
        .send()
        .await
        .map_err(|e| ProviderError::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(ProviderError::TokenExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ProviderError::TokenExchange(format!("invalid token response: {e}")))?;

    if let Some(error) = body.get("error").and_then(|e| e.as_str()) {
        let description = body
            .get("error_description")
            .and_then(|d| d.as_str())
            .unwrap_or("no description");
        return Err(ProviderError::TokenExchange(format!(
            "{error}: {description}"
        )));
    }

    let token: TokenResponse = serde_json::from_value(body)
        .map_err(|e| ProviderError::TokenExchange(format!("invalid token response: {e}")))?;
    debug!(
        token_type = token.token_type.as_deref().unwrap_or("bearer"),
        expires_in = token.expires_in,
        "authorization code exchanged"
    );
    Ok(token.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_deserializes_minimal_github_body() {
        let json = r#"{"access_token":"gho_abc","token_type":"bearer","scope":"read:user"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "gho_abc");
        assert_eq!(token.scope.as_deref(), Some("read:user"));
        assert!(token.refresh_token.is_none());
        assert!(token.expires_in.is_none());
    }

    #[test]
    fn token_response_converts_to_credentials() {
        let json = r#"{"access_token":"ya29.x","refresh_token":"1//r","expires_in":3599}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let creds: Credentials = token.into();
        assert_eq!(creds.access_token.expose(), "ya29.x");
        assert_eq!(creds.refresh_token.as_ref().unwrap().expose(), "1//r");
        assert_eq!(creds.expires_in, Some(3599));
        assert_eq!(creds.token_type, "bearer");
    }

    #[tokio::test]
    async fn unreachable_token_endpoint_is_http_error() {
        let client = reqwest::Client::new();
        let exchange = CodeExchange {
            token_endpoint: "http://127.0.0.1:1/token",
            client_id: "id",
            client_secret: "secret",
            redirect_uri: "http://localhost:8080/auth/github/callback",
            code: "abc",
        };
        let err = exchange_code(&client, &exchange).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)), "got: {err:?}");
    }
}
