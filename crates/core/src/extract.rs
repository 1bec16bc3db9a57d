//! Coupon code extraction from heterogeneous QR payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Shortest code that is worth looking up.
pub const MIN_CODE_LENGTH: usize = 3;

const COUPON_TYPE: &str = "coupon";

static CODE_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)code\s*[:=]\s*([A-Za-z0-9_-]+)").ok());

/// A decoded payload reduced to what redemption needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanPayload {
    /// Canonical coupon code; may be empty or too short when nothing usable was found.
    pub code: String,

    /// Customer identifier embedded in a structured payload, if any.
    pub customer_hint: Option<String>,
}

/// Extract the canonical coupon code from a raw QR payload.
///
/// Tries, in order: an embedded JSON object carrying `code` or `couponCode`, a
/// `code:value` / `code=value` pattern, and finally the payload with every
/// non-alphanumeric character removed. Never fails; callers validate the result
/// with [`is_valid_code`].
#[must_use]
pub fn extract(raw: &str) -> String {
    extract_payload(raw).code
}

/// Like [`extract`], additionally returning a `customerId` hint from JSON payloads.
#[must_use]
pub fn extract_payload(raw: &str) -> ScanPayload {
    let object = embedded_object(raw);

    let customer_hint = object
        .as_ref()
        .and_then(|object| field_as_string(object, "customerId"));

    let code = object
        .as_ref()
        .and_then(code_from_object)
        .or_else(|| code_from_pattern(raw))
        .unwrap_or_else(|| alphanumeric(raw));

    ScanPayload {
        code,
        customer_hint,
    }
}

/// Whether `code` is long enough to be looked up.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    code.chars().count() >= MIN_CODE_LENGTH
}

fn embedded_object(raw: &str) -> Option<Map<String, Value>> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;

    match serde_json::from_str(raw.get(start..=end)?) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn code_from_object(object: &Map<String, Value>) -> Option<String> {
    let is_coupon = object.get("type").and_then(Value::as_str) == Some(COUPON_TYPE);
    let has_code = object.contains_key("code") || object.contains_key("couponCode");

    if !is_coupon && !has_code {
        return None;
    }

    field_as_string(object, "code").or_else(|| field_as_string(object, "couponCode"))
}

fn field_as_string(object: &Map<String, Value>, field: &str) -> Option<String> {
    let value = match object.get(field)? {
        Value::String(value) => value.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };

    (!value.is_empty()).then_some(value)
}

fn code_from_pattern(raw: &str) -> Option<String> {
    CODE_PATTERN
        .as_ref()?
        .captures(raw)?
        .get(1)
        .map(|value| value.as_str().to_owned())
}

fn alphanumeric(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}
