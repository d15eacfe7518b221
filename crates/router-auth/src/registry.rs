//! Provider registry
//!
//! Built once at startup, then frozen behind an `Arc` and shared with the
//! selection middleware. Lookups are plain `HashMap` reads with no locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use provider::{Provider, ProviderFactory};

use crate::error::{Error, Result};
use crate::routes::Routes;

/// A registered provider: its name and how to obtain a handle for it.
#[derive(Clone)]
pub struct Registration {
    name: String,
    factory: Arc<dyn ProviderFactory>,
}

impl Registration {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Obtain the provider handle. Fails when the registration data cannot
    /// produce a working provider (e.g. a malformed callback URL).
    pub fn provider(&self) -> provider::Result<Arc<dyn Provider>> {
        self.factory.create()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Name → provider mapping plus the routes login links are built from.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    routes: Routes,
    entries: HashMap<String, Registration>,
}

impl ProviderRegistry {
    pub fn new(routes: Routes) -> Self {
        Self {
            routes,
            entries: HashMap::new(),
        }
    }

    /// Register a provider under `name`. A second registration with the same
    /// name replaces the first.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl ProviderFactory + 'static,
    ) -> &mut Self {
        let name = name.into();
        let registration = Registration {
            name: name.clone(),
            factory: Arc::new(factory),
        };
        self.entries.insert(name, registration);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&Registration> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Login path for a registered provider.
    pub fn try_login_url(&self, name: &str) -> Result<String> {
        if !self.contains(name) {
            return Err(Error::UnregisteredProvider(name.to_string()));
        }
        Ok(self.routes.login_path(name))
    }

    /// Login path for a provider that is known to be registered, for use in
    /// templates and navigation built from a fixed provider list.
    ///
    /// # Panics
    ///
    /// Panics if `name` was never registered. Call `ensure_registered` at
    /// startup to turn that into an error before serving traffic.
    pub fn login_url(&self, name: &str) -> String {
        match self.try_login_url(name) {
            Ok(url) => url,
            Err(e) => panic!("{e}"),
        }
    }

    /// Check a fixed list of provider names up front.
    pub fn ensure_registered<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for name in names {
            if !self.contains(name) {
                return Err(Error::UnregisteredProvider(name.to_string()));
            }
        }
        Ok(())
    }
}
