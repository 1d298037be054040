//! Trade magnitude extraction and currency formatting.

use std::sync::LazyLock;

use intent_reasoning::SelectedAction;
use regex::Regex;
use serde_json::Value;

use crate::engine::{PolicyError, PolicyResult};

/// Parameter keys inspected for a trade magnitude; the first present key wins.
pub const MAGNITUDE_KEYS: [&str; 4] = ["quantity", "amount", "size", "value"];

static MAGNITUDE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(?:([KMB])\b)?")
        .expect("magnitude pattern is a valid regular expression")
});

/// Locates the trade magnitude in the action's parameters.
///
/// Numbers are taken as is. Strings such as `"$90M"`, `"1,500,000"` or
/// `"2.5B"` are normalised to a plain number; a string without digits counts
/// as no magnitude.
///
/// # Errors
///
/// Returns [`PolicyError::InvalidParameter`] when the first present key holds
/// a boolean, array, object or null.
pub fn trade_magnitude(action: &SelectedAction) -> PolicyResult<Option<f64>> {
    let Some((key, value)) = MAGNITUDE_KEYS
        .iter()
        .find_map(|key| action.parameter(key).map(|value| (*key, value)))
    else {
        return Ok(None);
    };

    match value {
        Value::Number(number) => Ok(number.as_f64()),
        Value::String(text) => Ok(parse_magnitude(text)),
        other => Err(PolicyError::InvalidParameter {
            key,
            reason: format!("expected a number or numeric string, got {}", json_kind(other)),
        }),
    }
}

/// Parses the first numeric token of `text`, honouring K/M/B suffixes.
#[must_use]
pub fn parse_magnitude(text: &str) -> Option<f64> {
    let caps = MAGNITUDE_TOKEN.captures(text)?;
    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let scale = match caps.get(2).map(|suffix| suffix.as_str().to_ascii_uppercase()) {
        Some(suffix) if suffix == "K" => 1_000.0,
        Some(suffix) if suffix == "M" => 1_000_000.0,
        Some(suffix) if suffix == "B" => 1_000_000_000.0,
        _ => 1.0,
    };
    Some(number * scale)
}

/// Formats `value` as whole dollars with thousands separators.
#[must_use]
pub fn format_currency(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    if value.round() < 0.0 {
        grouped.push('-');
    }
    grouped.push('$');
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_reasoning::ActionArguments;
    use serde_json::json;

    fn trade(params: &Value) -> SelectedAction {
        SelectedAction::ToolCall {
            call_id: "call_1".into(),
            function: "execute_trade".into(),
            arguments: ActionArguments::Parsed(params.as_object().cloned().unwrap()),
        }
    }

    #[test]
    fn normalises_suffixes_and_symbols() {
        assert_eq!(parse_magnitude("$90M"), Some(90_000_000.0));
        assert_eq!(parse_magnitude("$1,500,000"), Some(1_500_000.0));
        assert_eq!(parse_magnitude("2.5B"), Some(2_500_000_000.0));
        assert_eq!(parse_magnitude("750k"), Some(750_000.0));
        assert_eq!(parse_magnitude("100 shares"), Some(100.0));
        assert_eq!(parse_magnitude("all of it"), None);
    }

    #[test]
    fn first_present_key_wins() {
        let action = trade(&json!({"amount": "$90M", "size": 5}));
        assert_eq!(trade_magnitude(&action).unwrap(), Some(90_000_000.0));

        let action = trade(&json!({"quantity": 1000, "amount": "$90M"}));
        assert_eq!(trade_magnitude(&action).unwrap(), Some(1000.0));
    }

    #[test]
    fn absent_magnitude_is_none() {
        let action = trade(&json!({"symbol": "NVDA"}));
        assert_eq!(trade_magnitude(&action).unwrap(), None);
        assert_eq!(trade_magnitude(&SelectedAction::Unknown).unwrap(), None);
    }

    #[test]
    fn unsupported_type_is_an_error() {
        let action = trade(&json!({"amount": true}));
        let err = trade_magnitude(&action).expect_err("boolean magnitude");
        assert!(matches!(err, PolicyError::InvalidParameter { key: "amount", .. }));
    }

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(150_000_000.0), "$150,000,000");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1_000.0), "$1,000");
        assert_eq!(format_currency(0.0), "$0");
    }
}
