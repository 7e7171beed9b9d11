//! Canonical response type
//!
//! Every call through [`crate::ApiClient`] yields an [`ApiResponse`]. Values
//! that were stashed and retrieved through a one-element container (as some
//! step glue does) arrive as [`ResponseValue::Wrapped`] and are unwrapped by
//! [`ResponseValue::normalize`] before any validator reads them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Marker property identifying the wrapped representation
pub const WRAPPED_MARKER: &str = "jquery";

/// A completed HTTP exchange: status plus decoded body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub url: String,
    pub status: u16,
    /// Decoded JSON body. Non-JSON bodies are kept as a JSON string,
    /// empty bodies as `null`.
    pub body: Value,
}

impl ApiResponse {
    pub fn new(url: impl Into<String>, status: u16, body: Value) -> Self {
        Self {
            url: url.into(),
            status,
            body,
        }
    }

    /// Build from raw body text
    pub fn from_text(url: impl Into<String>, status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self::new(url, status, body)
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `body.success`, if present and boolean
    pub fn success(&self) -> Option<bool> {
        self.body.get("success").and_then(Value::as_bool)
    }

    /// `body.message`, if present and a string
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// `body.data`, if present and not null
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data").filter(|v| !v.is_null())
    }

    /// Deserialize `body.data` into a typed value
    pub fn data_as<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let data = self
            .data()
            .ok_or_else(|| ApiError::assertion("body.data", "to be present"))?;
        Ok(serde_json::from_value(data.clone())?)
    }

    /// Look up a dotted path in the body, e.g. `"data.token"`
    pub fn body_path(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.body, |value, segment| value.get(segment))
    }
}

/// A response as it reaches a call site: direct, or wrapped once
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    Direct(ApiResponse),
    Wrapped(Box<ApiResponse>),
}

impl ResponseValue {
    /// Resolve to the direct form. Idempotent.
    pub fn normalize(self) -> ApiResponse {
        match self {
            ResponseValue::Direct(response) => response,
            ResponseValue::Wrapped(inner) => *inner,
        }
    }

    /// Decode a JSON-serialized response, detecting the wrapped form by its
    /// marker property and taking element `"0"`
    pub fn from_json(value: Value) -> ApiResult<Self> {
        let is_wrapped = value
            .get(WRAPPED_MARKER)
            .map(|marker| !marker.is_null())
            .unwrap_or(false);

        if is_wrapped {
            let inner = value
                .get("0")
                .cloned()
                .ok_or_else(|| ApiError::assertion("wrapped response", "to carry element 0"))?;
            let response: ApiResponse = serde_json::from_value(inner)?;
            Ok(ResponseValue::Wrapped(Box::new(response)))
        } else {
            Ok(ResponseValue::Direct(serde_json::from_value(value)?))
        }
    }

    /// Wrap a response in the container form
    pub fn wrap(response: ApiResponse) -> Self {
        ResponseValue::Wrapped(Box::new(response))
    }
}

impl From<ApiResponse> for ResponseValue {
    fn from(response: ApiResponse) -> Self {
        ResponseValue::Direct(response)
    }
}

impl From<&ApiResponse> for ResponseValue {
    fn from(response: &ApiResponse) -> Self {
        ResponseValue::Direct(response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ApiResponse {
        ApiResponse::new(
            "http://localhost/notes/api/notes",
            200,
            json!({"success": true, "status": 200, "message": "ok", "data": {"id": "n1"}}),
        )
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let direct = ResponseValue::from(sample());
        let wrapped = ResponseValue::wrap(sample());

        let once = direct.normalize();
        let twice = ResponseValue::from(once.clone()).normalize();
        assert_eq!(once, twice);

        let unwrapped = wrapped.normalize();
        assert_eq!(unwrapped, sample());
        assert_eq!(ResponseValue::from(unwrapped.clone()).normalize(), unwrapped);
    }

    #[test]
    fn test_from_json_detects_marker() {
        let inner = serde_json::to_value(sample()).unwrap();
        let wrapped = json!({"jquery": "3.7.1", "length": 1, "0": inner});

        let value = ResponseValue::from_json(wrapped).unwrap();
        assert!(matches!(value, ResponseValue::Wrapped(_)));
        assert_eq!(value.normalize(), sample());
    }

    #[test]
    fn test_from_json_passes_direct_through() {
        let direct = serde_json::to_value(sample()).unwrap();
        let value = ResponseValue::from_json(direct).unwrap();
        assert!(matches!(value, ResponseValue::Direct(_)));
        assert_eq!(value.normalize(), sample());
    }

    #[test]
    fn test_envelope_accessors() {
        let response = sample();
        assert!(response.is_success());
        assert_eq!(response.success(), Some(true));
        assert_eq!(response.message(), Some("ok"));
        assert_eq!(response.body_path("data.id"), Some(&json!("n1")));
        assert!(response.body_path("data.token").is_none());
    }

    #[test]
    fn test_from_text_keeps_non_json() {
        let response = ApiResponse::from_text("u", 502, "<html>Bad Gateway</html>");
        assert_eq!(response.body, json!("<html>Bad Gateway</html>"));
        assert_eq!(ApiResponse::from_text("u", 204, "").body, Value::Null);
    }

    #[test]
    fn test_null_data_is_absent() {
        let response = ApiResponse::new("u", 200, json!({"success": true, "data": null}));
        assert!(response.data().is_none());
        assert!(response.data_as::<String>().unwrap_err().is_assertion());
    }
}
