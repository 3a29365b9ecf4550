use rust_decimal::{Decimal, RoundingStrategy};

pub const BRL_SYMBOL: &str = "R$";

/// Truncate toward zero at `places` decimal places. Never rounds up.
pub fn round_down(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::ToZero)
}

/// Render `value` as `R$1,234.56`: thousands separated by commas, `places` decimals.
pub fn format_money(value: Decimal, symbol: &str, places: u32) -> String {
    let mut value = value.round_dp(places);
    value.rescale(places);

    let digits = value.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac_part) => format!("{symbol}{sign}{grouped}.{frac_part}"),
        None => format!("{symbol}{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_down_truncates() {
        assert_eq!(round_down(dec("1.005"), 2), dec("1.00"));
        assert_eq!(round_down(dec("1.009"), 2), dec("1.00"));
        assert_eq!(round_down(dec("575.30304"), 2), dec("575.30"));
        assert_eq!(round_down(dec("553.33557"), 2), dec("553.33"));
        // Already at precision
        assert_eq!(round_down(dec("12.5"), 2), dec("12.5"));
        // Toward zero for negatives as well
        assert_eq!(round_down(dec("-1.009"), 2), dec("-1.00"));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("1234.56"), BRL_SYMBOL, 2), "R$1,234.56");
        assert_eq!(format_money(dec("575.30"), BRL_SYMBOL, 2), "R$575.30");
        assert_eq!(format_money(dec("575.3"), BRL_SYMBOL, 2), "R$575.30");
        assert_eq!(format_money(dec("0"), BRL_SYMBOL, 2), "R$0.00");
        assert_eq!(format_money(dec("1234567.8"), BRL_SYMBOL, 2), "R$1,234,567.80");
        assert_eq!(format_money(dec("100000"), BRL_SYMBOL, 2), "R$100,000.00");
        assert_eq!(format_money(dec("999.999"), "US$", 3), "US$999.999");
        assert_eq!(format_money(dec("1234.4"), BRL_SYMBOL, 0), "R$1,234");
    }

    #[test]
    fn test_format_negative_money() {
        assert_eq!(format_money(dec("-1234.56"), BRL_SYMBOL, 2), "R$-1,234.56");
        assert_eq!(format_money(dec("-0.001"), BRL_SYMBOL, 2), "R$0.00");
    }
}
