//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every path and verb to the runner
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Translate between axum requests/responses and the dispatch types
//! - Load and persist the cookie-backed session around each dispatch
//! - Bind server to listener and stop on shutdown
//!
//! # Design Decisions
//! - The dispatch core is synchronous; it runs on the blocking pool
//! - HEAD responses keep status and headers but drop the body
//! - Dispatch errors become a 500 with an error log line
//! - Sessions are saved only for dispatches that returned a response

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request as AxumRequest, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RunnerConfig;
use crate::dispatch::Runner;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::lifecycle::shutdown;
use crate::session::{MemorySessionStore, SessionData};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<Runner>,
    pub sessions: MemorySessionStore,
    pub cookie_name: Arc<str>,
}

/// HTTP server in front of a [`Runner`].
pub struct HttpServer {
    router: Router,
    config: RunnerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with a fresh in-memory session store.
    pub fn new(config: RunnerConfig, runner: Arc<Runner>) -> Self {
        Self::with_sessions(config, runner, MemorySessionStore::new())
    }

    /// Create a server over an existing session store.
    pub fn with_sessions(
        config: RunnerConfig,
        runner: Arc<Runner>,
        sessions: MemorySessionStore,
    ) -> Self {
        let state = AppState {
            runner,
            sessions,
            cookie_name: Arc::from(config.session.cookie_name.as_str()),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RunnerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the server until `shutdown_rx` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch_handler(State(state): State<AppState>, request: AxumRequest) -> AxumResponse {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large").into_response();
        }
    };

    let uri = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let mut dispatch_request = Request::new(parts.method.as_str(), uri);
    if is_form(&parts.headers) {
        dispatch_request = dispatch_request.with_form_body(&String::from_utf8_lossy(&bytes));
    }

    let session_id = cookie_value(&parts.headers, &state.cookie_name);
    let is_head = parts.method == Method::HEAD;
    let cookie_name = Arc::clone(&state.cookie_name);

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Dispatching request"
    );

    let joined = tokio::task::spawn_blocking(move || {
        let mut session = state.sessions.load(session_id.as_deref());
        let result = state.runner.run(dispatch_request, &mut session);
        if result.is_ok() {
            state.sessions.save(&session);
        }
        (result, session)
    })
    .await;

    match joined {
        Ok((Ok(response), session)) => into_axum(response, &session, &cookie_name, is_head),
        Ok((Err(e), _)) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch failed");
            internal_error()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task panicked");
            internal_error()
        }
    }
}

fn internal_error() -> AxumResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Value of cookie `name` from the `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn into_axum(
    response: Response,
    session: &SessionData,
    cookie_name: &str,
    is_head: bool,
) -> AxumResponse {
    let (status, headers, body) = response.into_parts();
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in &headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => builder = builder.header(name, value),
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }
    if session.was_started() {
        if let Some(id) = session.id() {
            builder = builder.header(
                header::SET_COOKIE,
                format!("{cookie_name}={id}; Path=/; HttpOnly; SameSite=Lax"),
            );
        }
    }

    let body = if is_head { Body::empty() } else { Body::from(body) };
    builder.body(body).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build response");
        internal_error()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1; sid=abc; b=2"));
        assert_eq!(cookie_value(&headers, "sid").as_deref(), Some("abc"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_is_form() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        assert!(is_form(&headers));
    }

    #[test]
    fn test_head_drops_body_keeps_headers() {
        let mut response = Response::text(200, "hello");
        response.set_header("X-Test", "1");
        let out = into_axum(response, &SessionData::default(), "sid", true);
        assert_eq!(out.status(), StatusCode::OK);
        assert_eq!(out.headers()["x-test"], "1");
        assert!(out.headers().get(header::SET_COOKIE).is_none());
    }
}
