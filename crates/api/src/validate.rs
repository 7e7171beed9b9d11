//! Assertion helpers shared by the response validators
//!
//! Each helper returns [`ApiError::Assertion`] naming the property path that
//! failed, so a broken response surfaces as a readable expected/actual diff.

use chrono::DateTime;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_MULTIPLE_CHOICES: u16 = 300;
pub const STATUS_BAD_REQUEST: u16 = 400;

fn describe(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 80 {
        format!("{}...", text.chars().take(77).collect::<String>())
    } else {
        text
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// `response.status == expected`
pub fn expect_status(response: &ApiResponse, expected: u16) -> ApiResult<()> {
    if response.status != expected {
        return Err(ApiError::Assertion(format!(
            "expected status {} but got {} from {}",
            expected, response.status, response.url
        )));
    }
    Ok(())
}

/// `parent` has property `key`
pub fn expect_property<'a>(parent: &'a Value, path: &str, key: &str) -> ApiResult<&'a Value> {
    parent
        .get(key)
        .ok_or_else(|| ApiError::Assertion(format!(
            "expected {} to have property '{}', got {}",
            if path.is_empty() { "body" } else { path },
            key,
            describe(parent)
        )))
}

/// Property `key` of `parent` is a string
pub fn expect_string<'a>(parent: &'a Value, path: &str, key: &str) -> ApiResult<&'a str> {
    let value = expect_property(parent, path, key)?;
    value.as_str().ok_or_else(|| {
        ApiError::assertion(&join(path, key), format!("to be a string, got {}", describe(value)))
    })
}

/// Property `key` of `parent` is a non-empty string
pub fn expect_non_empty_string<'a>(parent: &'a Value, path: &str, key: &str) -> ApiResult<&'a str> {
    let value = expect_string(parent, path, key)?;
    if value.is_empty() {
        return Err(ApiError::assertion(&join(path, key), "not to be empty"));
    }
    Ok(value)
}

/// Property `key` of `parent` is a boolean equal to `expected`
pub fn expect_bool(parent: &Value, path: &str, key: &str, expected: bool) -> ApiResult<()> {
    let value = expect_property(parent, path, key)?;
    match value.as_bool() {
        Some(actual) if actual == expected => Ok(()),
        _ => Err(ApiError::assertion(
            &join(path, key),
            format!("to be {}, got {}", expected, describe(value)),
        )),
    }
}

/// Property `key` of `parent` is an array
pub fn expect_array<'a>(parent: &'a Value, path: &str, key: &str) -> ApiResult<&'a Vec<Value>> {
    let value = expect_property(parent, path, key)?;
    value.as_array().ok_or_else(|| {
        ApiError::assertion(&join(path, key), format!("to be an array, got {}", describe(value)))
    })
}

/// Property `key` of `parent` is a string holding a valid RFC 3339 date
pub fn expect_date(parent: &Value, path: &str, key: &str) -> ApiResult<()> {
    let text = expect_string(parent, path, key)?;
    DateTime::parse_from_rfc3339(text).map_err(|e| {
        ApiError::assertion(&join(path, key), format!("to be a valid date, got '{}' ({})", text, e))
    })?;
    Ok(())
}

/// Status and envelope check shared by every endpoint.
///
/// For an expected 2xx status the body must report `success: true`; for
/// anything else `success: false` plus a `message`.
pub fn validate_standard_response(response: &ApiResponse, expected_status: u16) -> ApiResult<()> {
    expect_status(response, expected_status)?;
    expect_property(&response.body, "", "success")?;

    if (STATUS_OK..STATUS_MULTIPLE_CHOICES).contains(&expected_status) {
        expect_bool(&response.body, "body", "success", true)?;
        if response.data().is_some() {
            expect_property(&response.body, "body", "data")?;
        }
    } else {
        expect_bool(&response.body, "body", "success", false)?;
        expect_property(&response.body, "body", "message")?;
    }
    Ok(())
}
