//! Coercion of inbound monetary amounts.
//!
//! Amounts arrive as JSON numbers or numeric strings. They are stored as
//! non-negative decimals with two fractional digits.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::error::PlanningError;

/// Fractional digits kept on every stored amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount that fits a `NUMERIC(15, 2)` column.
#[must_use]
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999_999, AMOUNT_SCALE)
}

/// Coerces a JSON value into a validated amount.
pub fn coerce(value: &Value, field: &str) -> Result<Decimal, PlanningError> {
    let parsed = match value {
        Value::Number(number) => parse(&number.to_string()),
        Value::String(text) => parse(text.trim()),
        _ => None,
    };
    let amount = parsed.ok_or_else(|| {
        PlanningError::InvalidAmount(format!("{field} must be a number, got {value}"))
    })?;
    validate(amount, field)
}

/// Checks an already-typed amount and rounds it to [`AMOUNT_SCALE`].
pub fn validate(amount: Decimal, field: &str) -> Result<Decimal, PlanningError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PlanningError::InvalidAmount(format!(
            "{field} cannot be negative"
        )));
    }
    let rounded = amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded > max_amount() {
        return Err(PlanningError::InvalidAmount(format!(
            "{field} exceeds the maximum of {}",
            max_amount()
        )));
    }
    Ok(rounded)
}

fn parse(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[rstest]
    #[case(json!(1000), dec!(1000))]
    #[case(json!(1500.5), dec!(1500.50))]
    #[case(json!("250"), dec!(250))]
    #[case(json!(" 42.125 "), dec!(42.13))]
    #[case(json!("1e3"), dec!(1000))]
    #[case(json!(0), dec!(0))]
    fn test_coerce_accepts_numbers_and_numeric_strings(
        #[case] value: Value,
        #[case] expected: Decimal,
    ) {
        assert_eq!(coerce(&value, "amount").unwrap(), expected);
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!(true))]
    #[case(json!("abc"))]
    #[case(json!(""))]
    #[case(json!({ "value": 1 }))]
    #[case(json!([1, 2]))]
    #[case(json!(-5))]
    #[case(json!("-0.01"))]
    fn test_coerce_rejects(#[case] value: Value) {
        let err = coerce(&value, "amount").unwrap_err();
        assert!(matches!(err, PlanningError::InvalidAmount(_)));
    }

    #[test]
    fn test_validate_rejects_overflowing_column() {
        assert!(validate(max_amount(), "amount").is_ok());
        let err = validate(max_amount() + dec!(0.01), "amount").unwrap_err();
        assert!(matches!(err, PlanningError::InvalidAmount(_)));
    }

    #[test]
    fn test_error_names_the_field() {
        let err = coerce(&json!("ten"), "budget").unwrap_err();
        assert!(err.to_string().starts_with("budget must be a number"));
    }
}
