//! Login redirect handler

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use provider::{QueryMap, State};
use tracing::debug;

use crate::context::{RequestContext, halt};
use crate::error::Error;
use crate::metrics;

/// Sends the browser to the selected provider's authorization URL.
///
/// `state` travels through the provider and comes back on the callback;
/// `options` are extra authorization parameters (e.g. `prompt`).
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    state: State,
    options: QueryMap,
}

impl Default for LoginRedirect {
    fn default() -> Self {
        Self {
            state: State::pair("after", "success"),
            options: QueryMap::new(),
        }
    }
}

impl LoginRedirect {
    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn with_options(mut self, options: QueryMap) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// 302 to the provider, or `halt()` with the error stored in `ctx`.
    pub fn redirect(&self, ctx: &RequestContext) -> Response {
        let Some(provider) = ctx.provider() else {
            ctx.set_error(Error::MissingProvider);
            return halt();
        };

        match provider.begin_auth_url(&self.state, &self.options) {
            Ok(url) => {
                debug!(provider = provider.name(), "redirecting to provider");
                metrics::record_login_redirect(provider.name());
                (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
            }
            Err(e) => {
                ctx.set_error(e);
                halt()
            }
        }
    }
}
