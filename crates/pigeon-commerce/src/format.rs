//! Price formatting at the presentation boundary.
//!
//! All arithmetic stays in integer minor units; these functions only turn a
//! finished value into text.

/// Decimal separator used when rendering amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecimalStyle {
    /// `123,45` (Polish convention).
    #[default]
    Comma,
    /// `123.45`.
    Dot,
}

impl DecimalStyle {
    fn separator(&self) -> char {
        match self {
            Self::Comma => ',',
            Self::Dot => '.',
        }
    }
}

/// Render a minor-unit integer with `places` decimals.
pub fn format_minor(amount: i64, places: u32, style: DecimalStyle) -> String {
    let scale = 10_u64.pow(places);
    let abs = amount.unsigned_abs();
    let sign = if amount < 0 { "-" } else { "" };
    if places == 0 {
        return format!("{}{}", sign, abs);
    }
    format!(
        "{}{}{}{:0width$}",
        sign,
        abs / scale,
        style.separator(),
        abs % scale,
        width = places as usize
    )
}

/// Render a decimal amount with two places, rounding half-up.
///
/// Rounding works on the shortest decimal representation of `value`, so
/// `99.995` becomes `100,00` even though the nearest binary double is slightly
/// below it.
///
/// ```
/// use pigeon_commerce::format::{format_decimal, DecimalStyle};
/// assert_eq!(format_decimal(99.994, DecimalStyle::Comma), "99,99");
/// assert_eq!(format_decimal(99.995, DecimalStyle::Comma), "100,00");
/// ```
pub fn format_decimal(value: f64, style: DecimalStyle) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let literal = value.abs().to_string();
    let (int_part, frac_part) = literal.split_once('.').unwrap_or((literal.as_str(), ""));

    let rounded = int_part.parse::<u128>().ok().and_then(|int_value| {
        let mut digits = frac_part.bytes().map(|b| u128::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let next = digits.next().unwrap_or(0);

        let total = int_value
            .checked_mul(100)?
            .checked_add(tenths * 10 + hundredths)?;
        if next >= 5 {
            total.checked_add(1)
        } else {
            Some(total)
        }
    });

    // Beyond u128 hundredths.
    let Some(hundredths_total) = rounded else {
        let fallback = format!("{:.2}", value);
        return match style {
            DecimalStyle::Comma => fallback.replace('.', ","),
            DecimalStyle::Dot => fallback,
        };
    };

    let sign = if value < 0.0 && hundredths_total != 0 { "-" } else { "" };
    format!(
        "{}{}{}{:02}",
        sign,
        hundredths_total / 100,
        style.separator(),
        hundredths_total % 100
    )
}

/// Render a decimal PLN amount as shown in the cart summary (e.g., "123,45 zł").
pub fn format_pln(value: f64) -> String {
    format!("{} z\u{142}", format_decimal(value, DecimalStyle::Comma))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minor() {
        assert_eq!(format_minor(12345, 2, DecimalStyle::Comma), "123,45");
        assert_eq!(format_minor(7, 2, DecimalStyle::Dot), "0.07");
        assert_eq!(format_minor(-1999, 2, DecimalStyle::Comma), "-19,99");
        assert_eq!(format_minor(500, 0, DecimalStyle::Comma), "500");
    }

    #[test]
    fn test_format_decimal_rounds_half_up() {
        assert_eq!(format_decimal(99.994, DecimalStyle::Comma), "99,99");
        assert_eq!(format_decimal(99.995, DecimalStyle::Comma), "100,00");
        assert_eq!(format_decimal(99.999, DecimalStyle::Comma), "100,00");
        assert_eq!(format_decimal(1.005, DecimalStyle::Dot), "1.01");
    }

    #[test]
    fn test_format_pln() {
        assert_eq!(format_pln(0.0), "0,00 z\u{142}");
        assert_eq!(format_pln(100.0), "100,00 z\u{142}");
        assert_eq!(format_pln(123.45), "123,45 z\u{142}");
        assert_eq!(format_pln(99.9), "99,90 z\u{142}");
        assert_eq!(format_pln(1234567.89), "1234567,89 z\u{142}");
    }

    #[test]
    fn test_format_decimal_negative() {
        assert_eq!(format_decimal(-2.5, DecimalStyle::Comma), "-2,50");
        assert_eq!(format_decimal(-0.001, DecimalStyle::Comma), "0,00");
    }

    #[test]
    fn test_format_decimal_huge_values_fall_back() {
        // Parses as u128 but overflows once scaled to hundredths.
        let big = format_decimal(1e37, DecimalStyle::Comma);
        assert!(big.ends_with(",00"), "{}", big);

        let bigger = format_decimal(-1e300, DecimalStyle::Dot);
        assert!(bigger.starts_with('-'));
        assert!(bigger.ends_with(".00"));

        assert_eq!(format_decimal(f64::INFINITY, DecimalStyle::Comma), "inf");
    }
}
