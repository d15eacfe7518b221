//! Credentials and user identity returned by a provider

use common::Secret;
use serde::Serialize;

/// Tokens issued by the provider's token endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: Secret<String>,
    /// Usually "bearer"
    pub token_type: String,
    pub refresh_token: Option<Secret<String>>,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

impl Credentials {
    /// Bearer credentials holding only an access token.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            token_type: "bearer".into(),
            refresh_token: None,
            expires_in: None,
            scope: None,
        }
    }
}

/// The authenticated user as reported by the provider.
///
/// Only `provider` and `id` are guaranteed; the rest depends on what the
/// provider exposes and which scopes were granted. `raw` keeps the full
/// user document for fields not mapped here.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub provider: String,
    /// Provider-scoped identifier
    pub id: String,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub raw: serde_json::Value,
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl User {
    pub fn new(provider: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            id: id.into(),
            name: None,
            nickname: None,
            email: None,
            avatar_url: None,
            raw: serde_json::Value::Null,
            credentials: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_credentials_hide_token_in_debug() {
        let creds = Credentials::bearer("gho_secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("gho_secret"), "got: {debug}");
        assert_eq!(creds.access_token.expose(), "gho_secret");
        assert_eq!(creds.token_type, "bearer");
    }

    #[test]
    fn user_serializes_without_credentials() {
        let mut user = User::new("github", "42");
        user.email = Some("octo@example.com".into());
        user.credentials = Some(Credentials::bearer("gho_secret"));
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["provider"], "github");
        assert_eq!(json["id"], "42");
        assert_eq!(json["email"], "octo@example.com");
        assert!(json.get("credentials").is_none());
    }
}
