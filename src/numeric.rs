use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

lazy_static! {
    static ref QUANTITY_REGEX: Regex = Regex::new(r"^\+?([0-9]+)(?:\.0*)?$").unwrap();
    static ref PRICE_REGEX: Regex = Regex::new(r"^\+?([0-9]+(?:\.[0-9]+)?|\.[0-9]+)$").unwrap();
}

/// Raw value typed or pasted into a quantity or price field
///
/// Whatever arrives is normalized before it reaches a line item: anything that
/// is not a valid non-negative number becomes 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput<'a> {
    Text(&'a str),
    Integer(i64),
    Decimal(Decimal),
    Float(f64),
}

impl<'a> From<&'a str> for RawInput<'a> {
    fn from(value: &'a str) -> Self {
        RawInput::Text(value)
    }
}

impl<'a> From<&'a String> for RawInput<'a> {
    fn from(value: &'a String) -> Self {
        RawInput::Text(value.as_str())
    }
}

impl From<i64> for RawInput<'_> {
    fn from(value: i64) -> Self {
        RawInput::Integer(value)
    }
}

impl From<i32> for RawInput<'_> {
    fn from(value: i32) -> Self {
        RawInput::Integer(value as i64)
    }
}

impl From<u32> for RawInput<'_> {
    fn from(value: u32) -> Self {
        RawInput::Integer(value as i64)
    }
}

impl From<Decimal> for RawInput<'_> {
    fn from(value: Decimal) -> Self {
        RawInput::Decimal(value)
    }
}

impl From<f64> for RawInput<'_> {
    fn from(value: f64) -> Self {
        RawInput::Float(value)
    }
}

/// Normalize a quantity input to a non-negative whole number
///
/// # Arguments
/// * `input` - Text, integer, decimal or float as entered by the user
///
/// # Returns
/// * `u32` - The parsed quantity, or 0 when the input is malformed, negative,
///   fractional or out of range
///
/// # Examples
/// ```
/// use order_ledger::numeric::{normalize_quantity, RawInput};
///
/// assert_eq!(normalize_quantity(RawInput::Text(" 3 ")), 3);
/// assert_eq!(normalize_quantity(RawInput::Text("abc")), 0);
/// assert_eq!(normalize_quantity(RawInput::Integer(-4)), 0);
/// ```
pub fn normalize_quantity(input: RawInput<'_>) -> u32 {
    match input {
        RawInput::Text(text) => QUANTITY_REGEX
            .captures(text.trim())
            .and_then(|captures| captures.get(1))
            .and_then(|digits| digits.as_str().parse::<u32>().ok())
            .unwrap_or(0),
        RawInput::Integer(value) => u32::try_from(value).unwrap_or(0),
        RawInput::Decimal(value) => quantity_from_decimal(value),
        RawInput::Float(value) => float_to_decimal(value).map_or(0, quantity_from_decimal),
    }
}

/// Largest accepted unit price (10^12)
///
/// `u32::MAX` units at this price stay near 4.3 × 10^21, so line totals and the
/// sum of millions of them fit well inside `Decimal::MAX`.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Normalize a unit price input to a non-negative decimal amount
///
/// The scale of the input is kept as entered; rounding only happens when an
/// amount is displayed. Prices above [`MAX_UNIT_PRICE`] count as 0, like any
/// other out-of-range input.
///
/// # Examples
/// ```
/// use order_ledger::numeric::{normalize_price, RawInput};
/// use rust_decimal::Decimal;
///
/// assert_eq!(normalize_price(RawInput::Text("5.50")), Decimal::new(550, 2));
/// assert_eq!(normalize_price(RawInput::Text("-2")), Decimal::ZERO);
/// ```
pub fn normalize_price(input: RawInput<'_>) -> Decimal {
    let parsed = match input {
        RawInput::Text(text) => parse_price_text(text.trim()),
        RawInput::Integer(value) => Some(Decimal::from(value)),
        RawInput::Decimal(value) => Some(value),
        RawInput::Float(value) => float_to_decimal(value),
    };

    match parsed {
        Some(price) if price >= Decimal::ZERO && price <= MAX_UNIT_PRICE => price,
        _ => Decimal::ZERO,
    }
}

fn parse_price_text(text: &str) -> Option<Decimal> {
    let captures = PRICE_REGEX.captures(text)?;
    let digits = captures.get(1)?.as_str();
    if digits.starts_with('.') {
        Decimal::from_str(&format!("0{}", digits)).ok()
    } else {
        Decimal::from_str(digits).ok()
    }
}

fn quantity_from_decimal(value: Decimal) -> u32 {
    if value < Decimal::ZERO || !value.fract().is_zero() {
        return 0;
    }
    value.to_u32().unwrap_or(0)
}

// f64 Display never uses exponent notation, so the shortest round-trip digits
// parse straight into a Decimal.
fn float_to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}
