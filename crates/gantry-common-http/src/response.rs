// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Response payload parsing and outgoing JSON body construction.

use serde_json::{json, Map, Value};
use tracing::warn;

/// Result of a request that reached the backend and was not classified as an
/// error: the HTTP status plus the parsed JSON-like payload.
///
/// Created per request and consumed immediately by the caller; never shared.
#[derive(Debug, Clone)]
pub struct ApiResponse {
	/// HTTP status code of the final attempt.
	pub status: u16,
	/// Parsed payload (object, array, or primitive).
	pub payload: Value,
}

/// Parses a success-response body into a JSON payload.
///
/// - Empty body → `{}`
/// - The literal token `ok` (quoted or bare) → `{"success": true, "message": "ok"}`
/// - Valid JSON → parsed value
/// - Anything else → `{"raw": "<text>"}` with a logged warning
pub fn parse_success_payload(body: &str) -> Value {
	let trimmed = body.trim();
	if trimmed.is_empty() {
		return Value::Object(Map::new());
	}
	if trimmed == "ok" || trimmed == "\"ok\"" {
		return json!({ "success": true, "message": "ok" });
	}
	match serde_json::from_str(trimmed) {
		Ok(value) => value,
		Err(_) => {
			warn!(body = %trimmed, "response body is not valid JSON, wrapping as raw text");
			json!({ "raw": trimmed })
		}
	}
}

/// Extracts a human-readable error message from a 4xx/5xx response body.
///
/// Looks for a `message` or `error` field in a JSON object body; falls back
/// to `HTTP {status}` when neither is present.
pub fn parse_error_message(status: u16, body: &str) -> String {
	if let Ok(Value::Object(map)) = serde_json::from_str(body) {
		for key in ["message", "error"] {
			if let Some(Value::String(message)) = map.get(key) {
				if !message.is_empty() {
					return message.clone();
				}
			}
		}
	}
	format!("HTTP {status}")
}

/// Drops `null` and empty-string members from an outgoing JSON object.
///
/// `false`, `0`, and empty collections are kept, so callers can send explicit
/// falsy values while the backend never sees placeholder empty fields.
/// Non-object values pass through unchanged.
pub fn strip_empty(value: Value) -> Value {
	match value {
		Value::Object(map) => Value::Object(
			map.into_iter()
				.filter(|(_, v)| !v.is_null() && v.as_str() != Some(""))
				.collect(),
		),
		other => other,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_body_parses_to_empty_object() {
		assert_eq!(parse_success_payload(""), json!({}));
		assert_eq!(parse_success_payload("   "), json!({}));
	}

	#[test]
	fn ok_token_becomes_success_object() {
		let expected = json!({ "success": true, "message": "ok" });
		assert_eq!(parse_success_payload("ok"), expected);
		assert_eq!(parse_success_payload("\"ok\""), expected);
	}

	#[test]
	fn valid_json_parses_through() {
		assert_eq!(
			parse_success_payload(r#"{"id": 7, "name": "x"}"#),
			json!({ "id": 7, "name": "x" })
		);
		assert_eq!(parse_success_payload("[1, 2]"), json!([1, 2]));
	}

	#[test]
	fn unparseable_body_is_wrapped_as_raw() {
		assert_eq!(
			parse_success_payload("<html>oops</html>"),
			json!({ "raw": "<html>oops</html>" })
		);
	}

	#[test]
	fn error_message_prefers_message_field() {
		assert_eq!(
			parse_error_message(400, r#"{"message": "bad input"}"#),
			"bad input"
		);
		assert_eq!(
			parse_error_message(400, r#"{"error": "no such user"}"#),
			"no such user"
		);
	}

	#[test]
	fn error_message_falls_back_to_status() {
		assert_eq!(parse_error_message(404, ""), "HTTP 404");
		assert_eq!(parse_error_message(500, "not json"), "HTTP 500");
		assert_eq!(parse_error_message(400, r#"{"message": ""}"#), "HTTP 400");
	}

	#[test]
	fn strip_empty_keeps_explicit_falsy_values() {
		let stripped = strip_empty(json!({
			"a": "",
			"b": null,
			"c": false,
			"d": 0,
			"e": [],
		}));
		assert_eq!(stripped, json!({ "c": false, "d": 0, "e": [] }));
	}

	#[test]
	fn strip_empty_passes_non_objects_through() {
		assert_eq!(strip_empty(json!([1, "", null])), json!([1, "", null]));
		assert_eq!(strip_empty(json!("text")), json!("text"));
	}
}
