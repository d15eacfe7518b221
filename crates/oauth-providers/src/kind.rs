//! Supported identity providers
//!
//! Endpoint URLs, default scopes and user-document mapping for each
//! provider. The client IDs and secrets that pair with these endpoints come
//! from configuration, never from this module.

use provider::{ProviderError, Result, User};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Identity providers this library can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
    Google,
    Facebook,
    SoundCloud,
}

/// The three URLs of an authorization-code flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize: String,
    pub token: String,
    pub user: String,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::GitHub,
        ProviderKind::Google,
        ProviderKind::Facebook,
        ProviderKind::SoundCloud,
    ];

    /// Registry name and `{provider}` path segment.
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
            ProviderKind::Google => "google",
            ProviderKind::Facebook => "facebook",
            ProviderKind::SoundCloud => "soundcloud",
        }
    }

    pub fn endpoints(self) -> Endpoints {
        let (authorize, token, user) = match self {
            ProviderKind::GitHub => (
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
                "https://api.github.com/user",
            ),
            ProviderKind::Google => (
                "https://accounts.google.com/o/oauth2/v2/auth",
                "https://oauth2.googleapis.com/token",
                "https://www.googleapis.com/oauth2/v3/userinfo",
            ),
            ProviderKind::Facebook => (
                "https://www.facebook.com/v19.0/dialog/oauth",
                "https://graph.facebook.com/v19.0/oauth/access_token",
                "https://graph.facebook.com/v19.0/me?fields=id,name,email,picture",
            ),
            ProviderKind::SoundCloud => (
                "https://secure.soundcloud.com/authorize",
                "https://secure.soundcloud.com/oauth/token",
                "https://api.soundcloud.com/me",
            ),
        };
        Endpoints {
            authorize: authorize.into(),
            token: token.into(),
            user: user.into(),
        }
    }

    /// Scopes requested when the configuration names none.
    pub fn default_scopes(self) -> &'static [&'static str] {
        match self {
            ProviderKind::GitHub => &["read:user", "user:email"],
            ProviderKind::Google => &["openid", "profile", "email"],
            ProviderKind::Facebook => &["public_profile", "email"],
            ProviderKind::SoundCloud => &[],
        }
    }

    /// Facebook wants comma-separated scopes, everyone else spaces.
    pub fn scope_separator(self) -> &'static str {
        match self {
            ProviderKind::Facebook => ",",
            _ => " ",
        }
    }

    /// Authorization header scheme for user-endpoint calls.
    pub fn auth_scheme(self) -> &'static str {
        match self {
            ProviderKind::SoundCloud => "OAuth",
            _ => "Bearer",
        }
    }

    /// Map the provider's user document onto `User`.
    pub fn user_from_json(self, raw: Value) -> Result<User> {
        let id_field = match self {
            ProviderKind::Google => "sub",
            _ => "id",
        };
        let id = json_id(&raw[id_field]).ok_or_else(|| {
            ProviderError::UserInfo(format!("{} user document has no {id_field}", self.name()))
        })?;

        let mut user = User::new(self.name(), id);
        match self {
            ProviderKind::GitHub => {
                user.name = json_str(&raw["name"]);
                user.nickname = json_str(&raw["login"]);
                user.email = json_str(&raw["email"]);
                user.avatar_url = json_str(&raw["avatar_url"]);
            }
            ProviderKind::Google => {
                user.name = json_str(&raw["name"]);
                user.nickname = json_str(&raw["given_name"]);
                user.email = json_str(&raw["email"]);
                user.avatar_url = json_str(&raw["picture"]);
            }
            ProviderKind::Facebook => {
                user.name = json_str(&raw["name"]);
                user.email = json_str(&raw["email"]);
                user.avatar_url = json_str(&raw["picture"]["data"]["url"]);
            }
            ProviderKind::SoundCloud => {
                user.name = json_str(&raw["full_name"]);
                user.nickname = json_str(&raw["username"]);
                user.avatar_url = json_str(&raw["avatar_url"]);
            }
        }
        user.raw = raw;
        Ok(user)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ProviderError::Config(format!("unknown provider kind: {s}")))
    }
}

/// Ids come back as numbers from some providers and strings from others.
fn json_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_str(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.name().parse::<ProviderKind>().unwrap(), kind);
        }
        assert!("myspace".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn deserializes_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: ProviderKind,
        }
        let w: Wrapper = serde_json::from_str(r#"{"kind":"soundcloud"}"#).unwrap();
        assert_eq!(w.kind, ProviderKind::SoundCloud);
    }

    #[test]
    fn endpoints_are_https() {
        for kind in ProviderKind::ALL {
            let e = kind.endpoints();
            for url in [&e.authorize, &e.token, &e.user] {
                assert!(url.starts_with("https://"), "{kind}: {url}");
            }
        }
    }

    #[test]
    fn maps_github_user() {
        let user = ProviderKind::GitHub
            .user_from_json(json!({
                "id": 583231,
                "login": "octocat",
                "name": "The Octocat",
                "email": "octocat@github.com",
                "avatar_url": "https://avatars.githubusercontent.com/u/583231"
            }))
            .unwrap();
        assert_eq!(user.provider, "github");
        assert_eq!(user.id, "583231");
        assert_eq!(user.nickname.as_deref(), Some("octocat"));
        assert_eq!(user.name.as_deref(), Some("The Octocat"));
        assert_eq!(user.email.as_deref(), Some("octocat@github.com"));
        assert_eq!(user.raw["login"], "octocat");
    }

    #[test]
    fn maps_google_user_from_sub() {
        let user = ProviderKind::Google
            .user_from_json(json!({
                "sub": "110169484474386276334",
                "name": "Ada Lovelace",
                "given_name": "Ada",
                "email": "ada@example.com",
                "picture": "https://lh3.googleusercontent.com/a/ada"
            }))
            .unwrap();
        assert_eq!(user.id, "110169484474386276334");
        assert_eq!(user.nickname.as_deref(), Some("Ada"));
        assert_eq!(
            user.avatar_url.as_deref(),
            Some("https://lh3.googleusercontent.com/a/ada")
        );
    }

    #[test]
    fn maps_facebook_nested_picture() {
        let user = ProviderKind::Facebook
            .user_from_json(json!({
                "id": "10158",
                "name": "Mark",
                "picture": {"data": {"url": "https://graph.facebook.com/pic.jpg"}}
            }))
            .unwrap();
        assert_eq!(
            user.avatar_url.as_deref(),
            Some("https://graph.facebook.com/pic.jpg")
        );
        assert!(user.email.is_none());
    }

    #[test]
    fn maps_soundcloud_user_without_email() {
        let user = ProviderKind::SoundCloud
            .user_from_json(json!({"id": 3207, "username": "jwagener", "full_name": "Johannes"}))
            .unwrap();
        assert_eq!(user.id, "3207");
        assert_eq!(user.nickname.as_deref(), Some("jwagener"));
        assert!(user.email.is_none());
    }

    #[test]
    fn missing_id_is_an_error() {
        let err = ProviderKind::GitHub
            .user_from_json(json!({"login": "ghost"}))
            .unwrap_err();
        assert!(err.to_string().contains("no id"), "got: {err}");
    }

    #[test]
    fn soundcloud_uses_oauth_scheme_and_facebook_commas() {
        assert_eq!(ProviderKind::SoundCloud.auth_scheme(), "OAuth");
        assert_eq!(ProviderKind::GitHub.auth_scheme(), "Bearer");
        assert_eq!(ProviderKind::Facebook.scope_separator(), ",");
    }
}
