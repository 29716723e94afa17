//! Amount formatting for totals shown to the user

/// Format an amount with two decimals and thousands separators (`1,234.50`)
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.004 rounds to 0.00 and should not keep its sign
    let negative = value < 0.0 && rounded.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    if negative {
        format!("-{grouped}.{fraction}")
    } else {
        format!("{grouped}.{fraction}")
    }
}

/// Format a signed change, always showing the sign unless the value is zero
pub fn format_delta(value: f64) -> String {
    let formatted = format_amount(value.abs());
    if value == 0.0 {
        formatted
    } else if value < 0.0 {
        format!("-{formatted}")
    } else {
        format!("+{formatted}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(9.5), "9.50");
        assert_eq!(format_amount(109.5), "109.50");
        assert_eq!(format_amount(1234.567), "1,234.57");
        assert_eq!(format_amount(1_000_000.0), "1,000,000.00");
        assert_eq!(format_amount(-2500.25), "-2,500.25");
    }

    #[test]
    fn test_format_amount_negative_zero() {
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(0.0), "0.00");
        assert_eq!(format_delta(9.5), "+9.50");
        assert_eq!(format_delta(-1200.0), "-1,200.00");
    }
}
