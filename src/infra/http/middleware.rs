//! Request ids and one log line per finished request.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

const REQUEST_ID_HEADER: &str = "x-request-id";

const LOG_TARGET: &str = "postdeck::http::response";
const MAX_FORWARDED_ID_LEN: usize = 128;

#[derive(Clone)]
pub(super) struct RequestContext {
    request_id: String,
}

/// Tag the request with an id and echo it in `x-request-id`.
///
/// An id forwarded by a proxy is reused when it is printable and short.
pub(super) async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty() && value.len() <= MAX_FORWARDED_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub(super) async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if response.status().is_redirection() {
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        info!(
            target: LOG_TARGET,
            %method,
            %path,
            post_id = post_id_of(&path),
            location,
            request_id,
            elapsed_ms,
            "post form handled"
        );
        return response;
    }

    if !(response.status().is_client_error() || response.status().is_server_error()) {
        debug!(target: LOG_TARGET, status, %method, %path, request_id, elapsed_ms, "request served");
        return response;
    }

    let (source, chain) = response
        .extensions_mut()
        .remove::<ErrorReport>()
        .map(|report| (report.source, report.messages))
        .unwrap_or(("unknown", Vec::new()));
    let detail = chain
        .first()
        .map_or("no diagnostic available", String::as_str);

    if response.status().is_server_error() {
        error!(
            target: LOG_TARGET,
            status, %method, %path, request_id, elapsed_ms, source, detail, ?chain,
            "request failed"
        );
    } else {
        warn!(
            target: LOG_TARGET,
            status, %method, %path, request_id, elapsed_ms, source, detail, ?chain,
            "client request error"
        );
    }
    response
}

/// `/posts/{id}/...` yields the raw id segment, anything else an empty string.
fn post_id_of(path: &str) -> &str {
    path.strip_prefix("/posts/")
        .and_then(|rest| rest.split('/').next())
        .unwrap_or("")
}
