//! Development proxy.
//!
//! Serves `/api/{*path}` on a local port and forwards each request to the
//! backend, so the client can talk to a same-origin `/api` prefix during
//! development.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::config::{Config, api};

/// Response headers relayed from the backend.
const RELAYED_HEADERS: [header::HeaderName; 2] = [header::CONTENT_TYPE, header::CONTENT_DISPOSITION];

/// Shared proxy state.
#[derive(Debug, Clone)]
pub struct ProxyState {
    backend: Url,
    client: reqwest::Client,
}

/// Build the proxy router forwarding to `backend`.
pub fn router(backend: Url, client: reqwest::Client) -> Router {
    let state = Arc::new(ProxyState { backend, client });

    Router::new()
        .route(&format!("{}/{{*path}}", api::PROXY_PREFIX), any(forward))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Run the proxy on `127.0.0.1:<port>` until Ctrl+C.
///
/// # Errors
///
/// Returns error if the backend URL is invalid or the port cannot be bound.
pub async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    let backend = Url::parse(&config.api_url)?;
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .build()?;

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!(%addr, backend = %backend, "Dev proxy listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(backend, client)).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Dev proxy shut down");
    Ok(())
}

async fn forward(
    State(state): State<Arc<ProxyState>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let target = upstream_url(&state.backend, &path, query.as_deref());

    let mut request = state.client.request(method.clone(), target.clone()).body(body);
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request = request.header(header::CONTENT_TYPE, content_type.clone());
    }

    let upstream = match request.send().await {
        Ok(upstream) => upstream,
        Err(e) => return bad_gateway(&method, &target, &e),
    };

    let status = upstream.status();
    let mut relayed = HeaderMap::new();
    for name in RELAYED_HEADERS {
        if let Some(value) = upstream.headers().get(&name) {
            relayed.insert(name, value.clone());
        }
    }

    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return bad_gateway(&method, &target, &e),
    };

    tracing::debug!(%method, path = %target.path(), status = status.as_u16(), "proxied");
    (status, relayed, bytes).into_response()
}

/// `<backend>/<path>?<query>`, keeping any path prefix on the backend URL.
fn upstream_url(backend: &Url, path: &str, query: Option<&str>) -> Url {
    let mut url = backend.clone();
    let joined = format!("{}/{}", backend.path().trim_end_matches('/'), path.trim_start_matches('/'));
    url.set_path(&joined);
    url.set_query(query.filter(|q| !q.is_empty()));
    url
}

fn bad_gateway(method: &Method, target: &Url, error: &reqwest::Error) -> Response {
    tracing::warn!(%method, target = %target, error = %error, "Backend unreachable");
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "detail": format!("Backend unreachable: {error}") })),
    )
        .into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
