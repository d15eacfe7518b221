//! Router assembly

use std::sync::Arc;

use axum::Router;
use axum::handler::Handler;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;

use crate::context::RequestContext;
use crate::login::LoginRedirect;
use crate::middleware::{complete_callback, select_provider};
use crate::registry::ProviderRegistry;
use crate::routes::{CALLBACK_ROUTE, LOGIN_ROUTE};

/// Build the login and callback routes under the registry's mount prefix.
///
/// `app` runs after a successful callback and reads the user from the
/// `RequestContext`. The result is already nested, so callers merge it
/// rather than nest it again; it still needs `install_context` as an outer layer.
pub fn auth_router<H, T>(registry: Arc<ProviderRegistry>, login: LoginRedirect, app: H) -> Router
where
    H: Handler<T, ()>,
    T: 'static,
{
    let mount = registry.routes().mount().to_string();

    let routes = Router::new()
        .route(
            LOGIN_ROUTE,
            get(move |ctx: RequestContext| {
                let login = login.clone();
                async move { login.redirect(&ctx) }
            }),
        )
        .route(CALLBACK_ROUTE, get(app).layer(from_fn(complete_callback)))
        .route_layer(from_fn_with_state(registry, select_provider));

    if mount.is_empty() {
        routes
    } else {
        Router::new().nest(&mount, routes)
    }
}
