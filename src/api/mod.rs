// API module entry
// HTTP boundary: builds the explicit request context, runs the dispatcher,
// and hands the envelope to the response formatter.

pub mod dispatch;
pub mod types;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Bytes;
use hyper::{HeaderMap, Request, Response, Version};
use serde_json::Value;
use thiserror::Error;

use crate::config::AppState;
use crate::http::response::envelope_response;
use crate::logger::{self, AccessLogEntry};
use dispatch::{dispatch, Gateways};
use types::{Envelope, RequestContext};

/// Why a request body could not be decoded.
#[derive(Debug, Error)]
enum BodyError {
    #[error("request body exceeds the configured limit")]
    TooLarge,
    #[error("{0}")]
    Read(String),
}

/// Handle one HTTP request end to end.
///
/// Every request terminates in a formatted envelope; nothing escapes this
/// function as an error. Generic over the body type so tests can drive it
/// with an in-memory body.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        method.to_string(),
        path.clone(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_value(req.headers(), "referer");
    entry.user_agent = header_value(req.headers(), "user-agent");

    // Reject a declared oversize body before reading anything
    if declared_body_too_large(req.headers(), state.config.http.max_body_size) {
        logger::log_warning(&format!("request body too large: {method} {path}"));
        return Ok(finish(&state, entry, started, &Envelope::payload_too_large()));
    }

    let envelope = match read_json_body(req.into_body(), state.config.http.max_body_size).await {
        Ok(body) => {
            let ctx = RequestContext::new(method, path, body);
            let gateways = Gateways {
                counties: &state.counties,
                cities: &state.cities,
            };
            dispatch(&ctx, &state.routes, &gateways)
        }
        Err(BodyError::TooLarge) => {
            logger::log_warning(&format!("request body too large: {method} {path}"));
            Envelope::payload_too_large()
        }
        Err(BodyError::Read(err)) => {
            logger::log_warning(&format!("failed to read request body: {err}"));
            Envelope::bad_request()
        }
    };

    Ok(finish(&state, entry, started, &envelope))
}

/// Record the access-log entry and format the response.
fn finish(
    state: &AppState,
    mut entry: AccessLogEntry,
    started: Instant,
    envelope: &Envelope,
) -> Response<Full<Bytes>> {
    let (response, body_bytes) = envelope_response(envelope);
    if state.config.logging.access_log {
        entry.status = envelope.code;
        entry.body_bytes = body_bytes;
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }
    response
}

/// Collect and decode the JSON body, capped at the configured limit.
///
/// The cap holds for chunked bodies too, not just a declared
/// Content-Length. An empty or undecodable body yields `None`; the
/// dispatcher then treats the required fields as missing, which is the
/// 400 path.
async fn read_json_body<B>(body: B, max_body_size: u64) -> Result<Option<Value>, BodyError>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.is::<LengthLimitError>() => return Err(BodyError::TooLarge),
        Err(err) => return Err(BodyError::Read(err.to_string())),
    };
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_slice(&bytes).ok())
}

/// Check a declared Content-Length against the configured limit.
fn declared_body_too_large(headers: &HeaderMap, max_body_size: u64) -> bool {
    headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .is_some_and(|size| size > max_body_size)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use hyper::{Method, StatusCode};
    use serde_json::json;

    fn test_state(max_body_size: u64) -> Arc<AppState> {
        let mut cfg = Config::load_from("no-such-test-config").unwrap();
        cfg.http.max_body_size = max_body_size;
        cfg.logging.access_log = false;
        Arc::new(AppState::new(&cfg).unwrap())
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn request(method: Method, path: &str, body: &[u8]) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::copy_from_slice(body)))
            .unwrap()
    }

    async fn response_json(response: Response<Full<Bytes>>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_read_json_body_respects_limit() {
        let over = Full::new(Bytes::from(vec![b'x'; 64]));
        assert!(matches!(
            read_json_body(over, 16).await,
            Err(BodyError::TooLarge)
        ));

        let under = Full::new(Bytes::from(r#"{"name":"Heves"}"#));
        let decoded = read_json_body(under, 1024).await.unwrap();
        assert_eq!(decoded, Some(json!({"name": "Heves"})));

        let empty = Full::new(Bytes::new());
        assert_eq!(read_json_body(empty, 1024).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_undeclared_oversize_body_is_413() {
        // No Content-Length pre-check applies here; the cap must hold
        // during collection
        let state = test_state(16);
        let req = request(Method::POST, "/counties", &[b'x'; 64]);
        let response = handle_request(req, state, peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = response_json(response).await;
        assert_eq!(body["code"], 413);
        assert_eq!(body["message"], "Payload Too Large");
    }

    #[tokio::test]
    async fn test_oversize_body_never_reaches_dispatcher() {
        // An over-limit POST with a valid create body: had it reached the
        // dispatcher it would answer 201, so 413 proves the early exit
        let state = test_state(8);
        let req = request(Method::POST, "/counties", br#"{"name":"Heves"}"#);
        let response = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let listing = request(Method::GET, "/counties", b"");
        let response = handle_request(listing, state, peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_declared_oversize_body_is_413() {
        let state = test_state(16);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/counties")
            .header("content-length", "9999")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, state, peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrip() {
        let state = test_state(1024);

        let req = request(Method::POST, "/counties", br#"{"name":"Heves"}"#);
        let response = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = response_json(response).await;
        assert_eq!(created["data"], json!({"id": 1}));

        let req = request(Method::GET, "/counties/1", b"");
        let response = handle_request(req, state, peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = response_json(response).await;
        assert_eq!(fetched["data"], json!({"id": 1, "name": "Heves"}));
    }
}
