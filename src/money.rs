use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Display settings for monetary amounts
///
/// Defaults render Colombian pesos the way the order pages show them:
/// `$ 1.234,50`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    /// Symbol placed before the amount
    pub symbol: String,

    /// Separator between groups of three integer digits
    pub thousands_separator: char,

    /// Separator between the integer and fractional part
    pub decimal_separator: char,

    /// Number of fractional digits shown
    pub decimals: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            decimals: 2,
        }
    }
}

/// Round an amount for display, half away from zero.
///
/// Only the presentation boundary calls this; totals are always summed from
/// unrounded line values.
pub fn round_for_display(amount: Decimal, decimals: u32) -> Decimal {
    amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as currency
///
/// # Arguments
/// * `amount` - The unrounded amount
/// * `format` - Symbol, separators and number of decimals to use
///
/// # Returns
/// * `String` - e.g. `$ 41.000,00` with the default format
///
/// # Examples
/// ```
/// use order_ledger::money::{format_currency, CurrencyFormat};
/// use rust_decimal::Decimal;
///
/// let fmt = CurrencyFormat::default();
/// assert_eq!(format_currency(Decimal::new(123450, 2), &fmt), "$ 1.234,50");
/// ```
pub fn format_currency(amount: Decimal, format: &CurrencyFormat) -> String {
    let rounded = round_for_display(amount, format.decimals);
    let digits = format!("{:.*}", format.decimals as usize, rounded.abs());

    let (integer_part, fraction_part) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut text = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        text.push('-');
    }
    if !format.symbol.is_empty() {
        text.push_str(&format.symbol);
        text.push(' ');
    }
    text.push_str(&group_thousands(integer_part, format.thousands_separator));
    if let Some(fraction) = fraction_part {
        text.push(format.decimal_separator);
        text.push_str(fraction);
    }
    text
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_format() {
        let fmt = CurrencyFormat::default();
        assert_eq!(format_currency(dec!(0), &fmt), "$ 0,00");
        assert_eq!(format_currency(dec!(41), &fmt), "$ 41,00");
        assert_eq!(format_currency(dec!(999.999), &fmt), "$ 1.000,00");
        assert_eq!(format_currency(dec!(1234567.5), &fmt), "$ 1.234.567,50");
        assert_eq!(format_currency(dec!(-12.5), &fmt), "-$ 12,50");
    }

    #[test]
    fn test_custom_format() {
        let fmt = CurrencyFormat {
            symbol: String::new(),
            thousands_separator: ',',
            decimal_separator: '.',
            decimals: 0,
        };
        assert_eq!(format_currency(dec!(1500.5), &fmt), "1,501");
        assert_eq!(format_currency(dec!(100), &fmt), "100");
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_for_display(dec!(0.125), 2), dec!(0.13));
        assert_eq!(round_for_display(dec!(-0.125), 2), dec!(-0.13));
        assert_eq!(round_for_display(dec!(2.344), 2), dec!(2.34));
    }
}
