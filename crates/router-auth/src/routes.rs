//! Route templates for the login and callback endpoints

/// Name of the path parameter carrying the provider name.
pub const PROVIDER_PARAM: &str = "provider";

/// Login route, relative to the mount prefix.
pub const LOGIN_ROUTE: &str = "/{provider}/login";

/// Callback route, relative to the mount prefix.
pub const CALLBACK_ROUTE: &str = "/{provider}/callback";

/// Where the auth routes are mounted and how their paths are formed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routes {
    mount: String,
}

impl Routes {
    /// `mount` is normalized to a leading slash and no trailing slash;
    /// `""` and `"/"` both mean the routes sit at the root.
    pub fn new(mount: impl AsRef<str>) -> Self {
        let trimmed = mount.as_ref().trim_matches('/');
        let mount = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self { mount }
    }

    /// Normalized mount prefix (`""` at the root).
    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// `<mount>/<provider>/login`
    pub fn login_path(&self, provider: &str) -> String {
        self.expand(LOGIN_ROUTE, provider)
    }

    /// `<mount>/<provider>/callback`
    pub fn callback_path(&self, provider: &str) -> String {
        self.expand(CALLBACK_ROUTE, provider)
    }

    fn expand(&self, template: &str, provider: &str) -> String {
        let placeholder = format!("{{{PROVIDER_PARAM}}}");
        let path = template.replace(&placeholder, &urlencoding::encode(provider));
        format!("{}{path}", self.mount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_provider_into_templates() {
        let routes = Routes::new("/auth");
        for name in ["github", "google", "facebook", "soundcloud"] {
            assert_eq!(routes.login_path(name), format!("/auth/{name}/login"));
            assert_eq!(routes.callback_path(name), format!("/auth/{name}/callback"));
        }
    }

    #[test]
    fn normalizes_mount_prefix() {
        assert_eq!(Routes::new("auth/").mount(), "/auth");
        assert_eq!(Routes::new("/auth/v1/").mount(), "/auth/v1");
        assert_eq!(Routes::new("/").mount(), "");
        assert_eq!(Routes::default().login_path("github"), "/github/login");
    }

    #[test]
    fn escapes_unusual_provider_names() {
        let routes = Routes::new("/auth");
        assert_eq!(routes.login_path("a b/c"), "/auth/a%20b%2Fc/login");
    }
}
