//! Resource handlers and the shared request/response plumbing.
//!
//! Handlers are pure functions of the parsed request: validate, authorize via
//! the token authority, perform a single store operation, answer with
//! `(status, JSON)`. Every failure becomes a `{"Error": "..."}` body; pure
//! mutations answer `200` with an empty object.

pub mod ping;
pub mod tokens;
pub mod users;
pub mod validation;


use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Request header carrying the session token id for protected operations.
pub const TOKEN_HEADER: &str = "token";

/// Typed failure surfaced by every handler.
///
/// Store and token-authority errors are translated into exactly one of these
/// at the handler boundary; nothing is thrown past it.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed, missing, or business-rule-violating input.
    Validation(&'static str),
    /// A create against a key that already holds a record.
    Conflict(&'static str),
    /// Missing, mismatched, or expired token.
    Authorization,
    /// Unknown record or unregistered route.
    NotFound,
    /// Storage or hashing fault; the message names the failed operation,
    /// never internal paths.
    Storage(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(message) | Self::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "Error": message }))).into_response()
            }
            Self::Authorization => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "Error": "Missing required token in header, or token is invalid."
                })),
            )
                .into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
            Self::Storage(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "Error": message })),
            )
                .into_response(),
        }
    }
}

/// Decode a JSON request body leniently: an unreadable or mistyped body
/// becomes the payload type's defaults, so validation answers with a field
/// error instead of a transport-level parse failure.
pub(crate) fn parse_payload<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

/// Session token id from the request headers; absent or non-UTF-8 headers
/// read as an empty id, which never verifies.
pub(crate) fn token_header(headers: &HeaderMap) -> String {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// `200` with an empty JSON object, the success shape of mutation-only calls.
pub(crate) fn ok_empty() -> Response {
    (StatusCode::OK, Json(json!({}))).into_response()
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Payload {
        name: Option<String>,
    }

    #[test]
    fn parse_payload_reads_valid_json() {
        let payload: Payload = parse_payload(br#"{"name": "x"}"#);
        assert_eq!(payload.name.as_deref(), Some("x"));
    }

    #[test]
    fn parse_payload_defaults_on_garbage() {
        let payload: Payload = parse_payload(b"{nope");
        assert_eq!(payload, Payload::default());
    }

    #[test]
    fn parse_payload_defaults_on_empty_body() {
        let payload: Payload = parse_payload(b"");
        assert_eq!(payload, Payload::default());
    }

    #[test]
    fn token_header_reads_the_token() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("abc123"));
        assert_eq!(token_header(&headers), "abc123");
    }

    #[test]
    fn token_header_defaults_to_empty() {
        assert_eq!(token_header(&HeaderMap::new()), "");
    }
}
