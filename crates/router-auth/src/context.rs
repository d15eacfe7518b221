//! Per-request auth context
//!
//! Every request entering the app gets a fresh `RequestContext` from
//! `install_context`. Middleware further down writes the selected provider,
//! the resolved user or an error into it; handlers and the outer error layer
//! read them back. The slot set is closed: provider, user, error.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{FromRequestParts, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use provider::{Provider, User};

use crate::error::Error;

/// Discriminant used to ask the context for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Provider,
    User,
    Error,
}

/// A value held in one of the context slots.
#[derive(Clone)]
pub enum ContextValue {
    Provider(Arc<dyn Provider>),
    User(User),
    Error(Arc<Error>),
}

impl ContextValue {
    pub fn kind(&self) -> ContextKind {
        match self {
            ContextValue::Provider(_) => ContextKind::Provider,
            ContextValue::User(_) => ContextKind::User,
            ContextValue::Error(_) => ContextKind::Error,
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Provider(p) => f.debug_tuple("Provider").field(&p.name()).finish(),
            ContextValue::User(u) => f.debug_tuple("User").field(u).finish(),
            ContextValue::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

#[derive(Default)]
struct Slots {
    provider: Option<Arc<dyn Provider>>,
    user: Option<User>,
    error: Option<Arc<Error>>,
}

/// Handle to the current request's slots. Clones share the same slots.
#[derive(Clone, Default)]
pub struct RequestContext {
    slots: Arc<Mutex<Slots>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    // The lock is never held across an await; a poisoned lock only means a
    // handler panicked mid-write, and the slots are still consistent values.
    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read one slot. `None` is the "not found" signal.
    pub fn get(&self, kind: ContextKind) -> Option<ContextValue> {
        let slots = self.slots();
        match kind {
            ContextKind::Provider => slots.provider.clone().map(ContextValue::Provider),
            ContextKind::User => slots.user.clone().map(ContextValue::User),
            ContextKind::Error => slots.error.clone().map(ContextValue::Error),
        }
    }

    /// Write one slot, replacing what was there.
    pub fn set(&self, value: ContextValue) {
        let mut slots = self.slots();
        match value {
            ContextValue::Provider(p) => slots.provider = Some(p),
            ContextValue::User(u) => slots.user = Some(u),
            ContextValue::Error(e) => slots.error = Some(e),
        }
    }

    pub fn provider(&self) -> Option<Arc<dyn Provider>> {
        self.slots().provider.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.slots().user.clone()
    }

    pub fn error(&self) -> Option<Arc<Error>> {
        self.slots().error.clone()
    }

    pub fn has_error(&self) -> bool {
        self.slots().error.is_some()
    }

    pub fn set_provider(&self, provider: Arc<dyn Provider>) {
        self.set(ContextValue::Provider(provider));
    }

    pub fn set_user(&self, user: User) {
        self.set(ContextValue::User(user));
    }

    pub fn set_error(&self, error: impl Into<Error>) {
        self.set(ContextValue::Error(Arc::new(error.into())));
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots();
        f.debug_struct("RequestContext")
            .field("provider", &slots.provider.as_ref().map(|p| p.name().to_string()))
            .field("user", &slots.user.as_ref().map(|u| u.id.clone()))
            .field("error", &slots.error)
            .finish()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestContext>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "request context missing: install_context must wrap the auth routes",
        ))
    }
}

/// Outermost middleware: give the request a fresh context.
///
/// The same context is attached to the response extensions, so layers
/// outside this one can still inspect the error slot.
pub async fn install_context(mut request: Request, next: Next) -> Response {
    let context = RequestContext::new();
    request.extensions_mut().insert(context.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(context);
    response
}

/// Response returned when the chain stops on an error: status only, no body.
/// Whoever renders errors replaces it.
pub(crate) fn halt() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
