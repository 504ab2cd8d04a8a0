//! HTTP response building module
//!
//! Serializes the dispatcher's envelope to a JSON response, decoupled from
//! the dispatch logic itself.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::api::types::Envelope;
use crate::logger;

/// Build the wire response for an envelope.
///
/// Returns the response together with the serialized body length for
/// access logging.
pub fn envelope_response(envelope: &Envelope) -> (Response<Full<Bytes>>, usize) {
    let json = match serde_json::to_string_pretty(envelope) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("failed to serialize envelope: {e}"));
            r#"{"data":[],"message":"Internal Server Error","code":500}"#.to_string()
        }
    };
    let body_bytes = json.len();

    let status = StatusCode::from_u16(envelope.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let response = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        });

    (response, body_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_and_content_type() {
        let (response, len) = envelope_response(&Envelope::ok(json!([{"id": 1}])));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        assert!(len > 0);
    }

    #[test]
    fn test_delete_envelope_is_204() {
        let (response, _) = envelope_response(&Envelope::deleted());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
