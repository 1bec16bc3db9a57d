//! Customer lookup parsing for loyalty scans.

use serde_json::{Map, Value};

use crate::domain::loyalty::errors::LoyaltyError;

/// Fewest digits for an input to be treated as a phone number.
pub const MIN_PHONE_DIGITS: usize = 7;

const CUSTOMER_PREFIX: &str = "customer:";

/// How a scanned or typed input identifies a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerLookup {
    Id(String),
    Phone(String),
}

impl CustomerLookup {
    /// Parse a loyalty card payload or operator input.
    ///
    /// Accepts a JSON object with `customerId` or `phone`, a `customer:<id>` payload, a
    /// phone number, or a bare customer id.
    ///
    /// # Errors
    ///
    /// Returns [`LoyaltyError::InvalidLookup`] for empty input and for JSON objects
    /// carrying neither field.
    pub fn parse(raw: &str) -> Result<Self, LoyaltyError> {
        let input = raw.trim();

        if input.is_empty() {
            return Err(LoyaltyError::InvalidLookup);
        }

        if input.starts_with('{') {
            let object: Map<String, Value> =
                serde_json::from_str(input).map_err(|_| LoyaltyError::InvalidLookup)?;

            return text_field(&object, "customerId")
                .map(Self::Id)
                .or_else(|| text_field(&object, "phone").map(Self::Phone))
                .ok_or(LoyaltyError::InvalidLookup);
        }

        if let Some(id) = input
            .get(..CUSTOMER_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(CUSTOMER_PREFIX))
            .and_then(|_| input.get(CUSTOMER_PREFIX.len()..))
        {
            let id = id.trim();

            return if id.is_empty() {
                Err(LoyaltyError::InvalidLookup)
            } else {
                Ok(Self::Id(id.to_string()))
            };
        }

        if looks_like_phone(input) {
            return Ok(Self::Phone(input.to_string()));
        }

        Ok(Self::Id(input.to_string()))
    }
}

fn text_field(object: &Map<String, Value>, field: &str) -> Option<String> {
    let value = match object.get(field)? {
        Value::String(value) => value.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };

    (!value.is_empty()).then_some(value)
}

fn looks_like_phone(input: &str) -> bool {
    let digits = input.chars().filter(char::is_ascii_digit).count();

    digits >= MIN_PHONE_DIGITS
        && input
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Option<CustomerLookup> {
        CustomerLookup::parse(raw).ok()
    }

    #[test]
    fn json_payloads() {
        assert_eq!(
            parse(r#"{"customerId":"cust-1"}"#),
            Some(CustomerLookup::Id("cust-1".to_string()))
        );
        assert_eq!(
            parse(r#"{"phone":"555 0102"}"#),
            Some(CustomerLookup::Phone("555 0102".to_string()))
        );
        assert_eq!(parse(r#"{"name":"Ada"}"#), None);
        assert_eq!(parse(r#"{"customerId":"#), None);
    }

    #[test]
    fn prefixed_ids() {
        assert_eq!(
            parse("Customer: cust-9"),
            Some(CustomerLookup::Id("cust-9".to_string()))
        );
        assert_eq!(parse("customer:"), None);
    }

    #[test]
    fn phone_numbers_need_seven_digits() {
        assert_eq!(
            parse("+1 (555) 010-2030"),
            Some(CustomerLookup::Phone("+1 (555) 010-2030".to_string()))
        );
        assert_eq!(parse("12345"), Some(CustomerLookup::Id("12345".to_string())));
    }

    #[test]
    fn anything_else_is_an_id() {
        assert_eq!(parse("  abc123 "), Some(CustomerLookup::Id("abc123".to_string())));
        assert_eq!(parse("   "), None);
    }
}
