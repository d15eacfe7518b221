//! OAuth login demo
//!
//! Single-binary service that:
//! 1. Registers the configured providers (GitHub, Google, Facebook, SoundCloud)
//! 2. Serves a login page linking to `<mount>/<provider>/login`
//! 3. Completes the callback and greets the authenticated user
//! 4. Renders any auth failure stored in the request context as a 500

mod config;
mod error;
mod metrics;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use common::Secret;
use oauth_providers::{ProviderConfig, generate_security_key};
use provider::ProviderFactory;
use router_auth::{
    LoginRedirect, ProviderRegistry, RequestContext, Routes, auth_router, install_context,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;

/// How long in-flight requests get to finish after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    registry: Arc<ProviderRegistry>,
    prometheus: PrometheusHandle,
    started_at: Instant,
}

/// Build the axum router with all routes and shared state.
///
/// Layer order, outermost first: concurrency limit, request tracking,
/// context installation, error rendering.
fn build_router(state: AppState, max_connections: usize) -> Router {
    let auth = auth_router(state.registry.clone(), LoginRedirect::default(), welcome);

    Router::new()
        .route("/", get(login_page))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .merge(auth)
        .layer(middleware::from_fn(render_errors))
        .layer(middleware::from_fn(install_context))
        .layer(middleware::from_fn(track_requests))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
}

/// Register every configured provider and validate it before serving.
fn build_registry(
    config: &Config,
    security_key: Arc<Secret<Vec<u8>>>,
    http: reqwest::Client,
) -> error::Result<ProviderRegistry> {
    let routes = Routes::new(&config.server.mount);
    let host = config.server.host();
    let mut registry = ProviderRegistry::new(routes.clone());

    for entry in &config.providers {
        let name = entry.kind.name();
        let client_secret = entry
            .client_secret
            .as_ref()
            .map(|s| s.expose().clone())
            .unwrap_or_default();
        let provider = ProviderConfig::new(
            entry.kind,
            entry.client_id.clone(),
            client_secret,
            host.callback_url(&routes, name),
            security_key.clone(),
        )
        .with_http_client(http.clone());

        provider
            .create()
            .map_err(|source| error::Error::ProviderSetup {
                provider: name.to_string(),
                source,
            })?;
        info!(provider = name, callback_url = %provider.callback_url, "provider registered");
        registry.register(name, provider);
    }

    registry.ensure_registered(config.providers.iter().map(|p| p.kind.name()))?;
    Ok(registry)
}

fn http_client(timeout_secs: u64) -> error::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| error::Error::HttpClient(e.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting auth-demo");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder().context("failed to install metrics")?;

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        public_url = %config.server.host().prefix(),
        mount = %config.server.mount,
        providers = config.providers.len(),
        "configuration loaded"
    );

    let security_key = match config.security_key.take() {
        Some(key) => key,
        None => {
            warn!("AUTH_SECURITY_KEY not set, generated a random key; logins in flight will not survive a restart");
            generate_security_key()
        }
    };

    let http = http_client(config.server.timeout_secs).context("failed to build HTTP client")?;
    let registry = build_registry(&config, Arc::new(security_key), http)
        .context("failed to register providers")?;

    let app_state = AppState {
        registry: Arc::new(registry),
        prometheus: prometheus_handle,
        started_at: Instant::now(),
    };

    let app = build_router(app_state, config.server.max_connections);

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    // The drain timeout starts when the shutdown signal fires, not when the
    // server starts.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => info!("all in-flight requests drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "server task panicked"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }

    info!("shutdown complete");
    Ok(())
}

/// Error-rendering collaborator: turns a context error into a 500 with the
/// error message, replacing the empty response the adapter returned.
async fn render_errors(ctx: RequestContext, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    match ctx.error() {
        Some(err) => {
            warn!(error = %err, "auth request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("an error happened: {err}"),
            )
                .into_response()
        }
        None => response,
    }
}

/// Tag each request with an id and record its status and duration.
async fn track_requests(request: Request, next: Next) -> Response {
    let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
    let method = request.method().to_string();
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %request.uri().path()
    );

    let started = Instant::now();
    let response = next.run(request).instrument(span).await;
    metrics::record_request(
        response.status().as_u16(),
        &method,
        started.elapsed().as_secs_f64(),
    );
    response
}

/// Application handler behind the callback route.
///
/// Plain text: the fields come from the identity provider and are user-controlled.
async fn welcome(ctx: RequestContext) -> Response {
    match ctx.user() {
        Some(user) => format!(
            "email: {} name: {}",
            user.email.as_deref().unwrap_or(""),
            user.name.as_deref().unwrap_or("")
        )
        .into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no user in request context").into_response(),
    }
}

/// Login page with one link per registered provider.
async fn login_page(State(state): State<AppState>) -> Html<String> {
    let links: String = state
        .registry
        .names()
        .into_iter()
        .map(|name| {
            format!(
                "<li><a href=\"{}\">Log in with {name}</a></li>",
                state.registry.login_url(name)
            )
        })
        .collect();
    Html(format!("<ul>{links}</ul>"))
}

/// Health endpoint: JSON with status, uptime and registered providers.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "providers": state.registry.names(),
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
