//! API value types
//!
//! The explicit request context handed to the dispatcher and the
//! data/message/code envelope every response is built from.

use hyper::Method;
use serde::Serialize;
use serde_json::{json, Value};

/// Everything the dispatcher needs from a request.
///
/// Built once per request; no ambient request state is consulted anywhere
/// downstream, so the dispatcher runs without a real HTTP server in tests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    /// Decoded JSON body. `None` for absent or undecodable bodies, which
    /// downstream treats as missing fields.
    pub body: Option<Value>,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// The result tuple the core produces and the formatter serializes.
///
/// Wire shape: `{"data": ..., "message": ..., "code": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub data: Value,
    pub message: String,
    pub code: u16,
}

impl Envelope {
    fn with(data: Value, message: &str, code: u16) -> Self {
        Self {
            data,
            message: message.to_string(),
            code,
        }
    }

    /// 200 with the found entity or non-empty list.
    pub fn ok(data: Value) -> Self {
        Self::with(data, "OK", 200)
    }

    /// 201 for a successful create, carrying the new id.
    pub fn created(id: u64) -> Self {
        Self::with(json!({ "id": id }), "", 201)
    }

    /// 201 for a successful update.
    pub fn updated() -> Self {
        Self::with(json!([]), "", 201)
    }

    /// 204 for a successful delete.
    pub fn deleted() -> Self {
        Self::with(json!([]), "", 204)
    }

    /// 404 for an absent entity or empty listing.
    pub fn not_found() -> Self {
        Self::with(json!([]), "", 404)
    }

    /// 404 for a path that resolves to no route.
    pub fn unresolved(path: &str) -> Self {
        Self::with(json!([]), &format!("{path} not found"), 404)
    }

    /// 400 for a mutating request missing its id or name.
    pub fn bad_request() -> Self {
        Self::with(json!([]), "Bad Request", 400)
    }

    /// 400 for a create that was rejected, echoing the zero id.
    pub fn create_rejected() -> Self {
        Self::with(json!({ "id": 0 }), "", 400)
    }

    /// 405 for a method outside GET/POST/PUT/DELETE.
    pub fn method_not_allowed() -> Self {
        Self::with(json!([]), "Method Not Allowed", 405)
    }

    /// 413 when the declared body size exceeds the configured limit.
    pub fn payload_too_large() -> Self {
        Self::with(json!([]), "Payload Too Large", 413)
    }

    /// 500 for a data-access failure.
    pub fn upstream_failure() -> Self {
        Self::with(json!([]), "Internal Server Error", 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_shape() {
        let body = serde_json::to_value(Envelope::ok(json!({"id": 10, "name": "Heves"}))).unwrap();
        assert_eq!(
            body,
            json!({
                "data": {"id": 10, "name": "Heves"},
                "message": "OK",
                "code": 200
            })
        );
    }

    #[test]
    fn test_unresolved_carries_original_path() {
        let envelope = Envelope::unresolved("/widgets/9");
        assert_eq!(envelope.message, "/widgets/9 not found");
        assert_eq!(envelope.code, 404);
        assert_eq!(envelope.data, json!([]));
    }
}
