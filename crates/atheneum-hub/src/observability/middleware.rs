//! Request-scoped middleware: request IDs and HTTP metrics.

use axum::{
    body::Body,
    extract::Request,
    http::{header::HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use super::metrics::METRICS;

/// Header carrying the request ID, inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID as a request extension.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Tags every request with an ID and echoes it on the response.
///
/// An inbound `x-request-id` is kept, so an ID minted by one hub stays
/// attached through the hub-to-hub hops of a handshake.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
    }

    response
}

/// Records count and duration per method/route/status.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(request.uri().path());

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    METRICS.record_http_request(&method, &route, status, duration);

    tracing::debug!(
        method = %method,
        route = %route,
        status = %status,
        duration_ms = %format!("{:.2}", duration * 1000.0),
        "request completed"
    );

    response
}

/// Collapse parametrized path segments into route templates.
///
/// Peer IDs and locales are unbounded; recording raw paths would mint
/// one label set per peer and per locale.
fn route_label(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    let path = if trimmed.is_empty() { "/" } else { trimmed };

    let segments: Vec<&str> = path.split('/').collect();
    match segments.as_slice() {
        ["", "api", "peers", id, rest @ ..] if id.parse::<u64>().is_ok() => {
            if rest.is_empty() {
                "/api/peers/{id}".to_string()
            } else {
                format!("/api/peers/{{id}}/{}", rest.join("/"))
            }
        }
        ["", "api", "translations", _locale] => "/api/translations/{locale}".to_string(),
        _ => path.to_string(),
    }
}

/// `/metrics` endpoint in Prometheus text exposition format.
pub async fn metrics_handler() -> Response<Body> {
    let body = METRICS.encode();

    Response::builder()
        .status(200)
        .header("content-type", "text/plain; version=0.0.4; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|_| {
            Response::builder()
                .status(500)
                .body(Body::from("Failed to encode metrics"))
                .expect("Failed to build error response")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label_collapses_parameters() {
        assert_eq!(
            route_label("/api/peers/17/status"),
            "/api/peers/{id}/status"
        );
        assert_eq!(route_label("/api/peers/17"), "/api/peers/{id}");
        assert_eq!(route_label("/api/peers/17/"), "/api/peers/{id}");
        assert_eq!(
            route_label("/api/translations/fr"),
            "/api/translations/{locale}"
        );
    }

    #[test]
    fn test_route_label_keeps_static_paths() {
        assert_eq!(route_label("/api/peers"), "/api/peers");
        assert_eq!(route_label("/api/peers/connect"), "/api/peers/connect");
        assert_eq!(route_label("/health/ready"), "/health/ready");
        assert_eq!(route_label("/"), "/");
    }
}
