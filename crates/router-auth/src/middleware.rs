//! Provider selection and callback completion
//!
//! Both are `axum::middleware` functions. On failure they record the error in
//! the `RequestContext` and return `halt()` without calling the next handler.

use std::sync::Arc;

use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{FromRequestParts, RawPathParams, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use provider::parse_query;
use tracing::{debug, instrument};

use crate::context::{RequestContext, halt};
use crate::error::Error;
use crate::metrics;
use crate::registry::ProviderRegistry;
use crate::routes::PROVIDER_PARAM;

/// Resolve the `{provider}` path segment and store the provider handle.
///
/// Routes without the path parameter pass straight through.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn select_provider(
    State(registry): State<Arc<ProviderRegistry>>,
    ctx: RequestContext,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let params = RawPathParams::from_request_parts(&mut parts, &()).await;
    let request = Request::from_parts(parts, body);

    let name = match params {
        Ok(params) => params
            .iter()
            .find(|(key, _)| *key == PROVIDER_PARAM)
            .map(|(_, value)| value.to_string()),
        Err(RawPathParamsRejection::MissingPathParams(_)) => None,
        // The segment is there but does not decode to a name.
        Err(rejection) => {
            debug!(%rejection, "undecodable provider segment");
            metrics::record_selection_failure("unsupported");
            ctx.set_error(Error::UnsupportedProvider(rejection.body_text()));
            return halt();
        }
    };

    let Some(name) = name else {
        return next.run(request).await;
    };

    let Some(registration) = registry.lookup(&name) else {
        debug!(provider = %name, "unsupported provider");
        metrics::record_selection_failure("unsupported");
        ctx.set_error(Error::UnsupportedProvider(name));
        return halt();
    };

    match registration.provider() {
        Ok(provider) => {
            debug!(provider = %name, "provider selected");
            ctx.set_provider(provider);
            next.run(request).await
        }
        Err(e) => {
            metrics::record_selection_failure("misconfigured");
            ctx.set_error(e);
            halt()
        }
    }
}

/// Turn the provider's callback query into a `User` before the app runs.
///
/// Without a provider in the context this is a pass-through.
#[instrument(skip_all)]
pub async fn complete_callback(ctx: RequestContext, request: Request, next: Next) -> Response {
    let Some(provider) = ctx.provider() else {
        return next.run(request).await;
    };
    let name = provider.name().to_string();

    let query = match parse_query(request.uri().query().unwrap_or_default()) {
        Ok(query) => query,
        Err(e) => {
            metrics::record_callback(&name, "query");
            ctx.set_error(e);
            return halt();
        }
    };

    let credentials = match provider.complete_auth(&query).await {
        Ok(credentials) => credentials,
        Err(e) => {
            metrics::record_callback(&name, "exchange");
            ctx.set_error(e);
            return halt();
        }
    };

    let user = match provider.get_user(&credentials).await {
        Ok(user) => user,
        Err(e) => {
            metrics::record_callback(&name, "user");
            ctx.set_error(e);
            return halt();
        }
    };

    debug!(provider = %name, user_id = %user.id, "callback completed");
    metrics::record_callback(&name, "success");
    ctx.set_user(user);
    next.run(request).await
}
