use num_format::{Locale, ToFormattedString as _};
use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};

use crate::entities::{CurrencyFormat, SymbolPosition};

/// Single rounding policy for every displayed amount.
pub(crate) fn round(amount: Decimal, decimal_places: u32) -> Decimal {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds and groups the number with thousands separators, without any
/// symbol (ex. "-1,234.50").
///
/// For consistency, uses en locale ('.' as decimal mark, i.e. 1,000.00)
/// regardless of the currency.
pub(crate) fn format_number(amount: Decimal, decimal_places: u32) -> String {
    let rounded = round(amount, decimal_places);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = rounded.abs();
    let integer_part = abs
        .trunc()
        .to_u128()
        .unwrap_or_default()
        .to_formatted_string(&Locale::en);
    if decimal_places == 0 {
        return format!("{}{}", sign, integer_part);
    }
    let places = decimal_places as usize;
    let fractional_part = format!("{:.places$}", abs.fract());
    let fractional_digits = fractional_part.split('.').nth(1).unwrap_or_default();
    format!("{}{}.{:0<places$}", sign, integer_part, fractional_digits)
}

/// Formats a cash amount with the currency symbol on the configured side,
/// ex. "$1,234.50" or "1,234.50 $".
pub(crate) fn format_amount(amount: Decimal, format: &CurrencyFormat) -> String {
    let number = format_number(amount, format.decimal_places);
    match format.position {
        SymbolPosition::Before => format!("{}{}", format.currency.symbol(), number),
        SymbolPosition::After => format!("{} {}", number, format.currency.symbol()),
    }
}

pub(crate) fn format_percent(percent: Decimal) -> String {
    format!("{}%", format_number(percent, 2))
}
