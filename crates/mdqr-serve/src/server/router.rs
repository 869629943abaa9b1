//! HTTP entry point.
//!
//! Every request goes through [`handle_request`], which applies these checks
//! in order and answers at the first one that decides the request:
//!
//! 1. method is not GET or HEAD: `405`
//! 2. the session this router was built for is no longer active: `404`
//! 3. `/` or `/sse` without a valid token: `403`
//! 4. `/sse`: live-reload stream (GET only)
//! 5. `/`: the rendered page; anything else is `404`

use crate::auth;
use crate::server::page;
use crate::server::sse;
use crate::server::state::{Session, SharedContext};
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response, Sse, sse::KeepAlive},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// State handed to the request handler.
#[derive(Clone)]
pub struct RouterState {
    pub ctx: SharedContext,
    /// Session the router was started for
    pub session: Arc<Session>,
    /// Interval between SSE keep-alive comments
    pub keep_alive: Duration,
}

/// Build the axum router for one session.
pub fn build_router(state: RouterState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_request(State(state): State<RouterState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return method_not_allowed("GET, HEAD");
    }

    let current = state.ctx.session();
    let is_current = current
        .as_deref()
        .is_some_and(|session| session.matches(&state.session.document, &state.session.token));
    if !is_current {
        return not_found();
    }

    let path = uri.path();
    if path != "/" && path != "/sse" {
        return not_found();
    }

    let target = uri.path_and_query().map_or(path, |pq| pq.as_str());
    let candidate = auth::extract(target);
    if let Err(failure) = auth::authorize(candidate.as_deref(), &state.session.token) {
        tracing::warn!(path, reason = failure.reason(), "rejected unauthorized request");
        return plain(StatusCode::FORBIDDEN, "Forbidden");
    }

    if path == "/sse" {
        if method != Method::GET {
            return method_not_allowed("GET");
        }
        return live_reload(&state);
    }

    serve_page(state, method == Method::HEAD).await
}

fn live_reload(state: &RouterState) -> Response {
    let Some(subscription) = state.ctx.subscribers.subscribe() else {
        return plain(StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down");
    };

    Sse::new(sse::event_stream(subscription))
        .keep_alive(KeepAlive::new().interval(state.keep_alive).text("ping"))
        .into_response()
}

async fn serve_page(state: RouterState, head_only: bool) -> Response {
    let ctx = Arc::clone(&state.ctx);
    let rendered = match tokio::task::spawn_blocking(move || ctx.cache.get()).await {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::error!(error = %e, "render task failed");
            return render_failed();
        }
    };

    let html = match rendered {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(error = %e, path = %state.session.document.display(), "failed to render document");
            return render_failed();
        }
    };

    let body = if head_only {
        Body::empty()
    } else {
        Body::from(html.to_string())
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, TEXT_HTML.to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
            (header::CONTENT_SECURITY_POLICY, page::content_security_policy()),
        ],
        body,
    )
        .into_response()
}

fn plain(status: StatusCode, message: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], message).into_response()
}

fn not_found() -> Response {
    plain(StatusCode::NOT_FOUND, "Not Found")
}

fn render_failed() -> Response {
    plain(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render markdown file.")
}

fn method_not_allowed(allow: &'static str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::CONTENT_TYPE, TEXT_PLAIN), (header::ALLOW, allow)],
        "Method Not Allowed",
    )
        .into_response()
}
