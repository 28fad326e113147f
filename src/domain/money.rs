use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift
/// across many small transactions. R$ 150.00 = 15000 cents.
pub type Cents = i64;

/// Format cents as a human-readable currency string.
/// Example: 15000 -> "150.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "150.00" -> 15000, "12.5" -> 1250, "100" -> 10000
///
/// At most one leading minus and one dot; both parts must be ASCII digits,
/// at least one of them non-empty. More than two decimals truncate.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, unsigned) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, decimal_str) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.bytes().all(|b| b.is_ascii_digit())
        || !decimal_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::OutOfRange)?
    };

    // Everything past two decimal digits truncates. The slice is safe:
    // the decimal part is already known to be ASCII digits.
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => {
            decimal_str
                .parse::<i64>()
                .map_err(|_| ParseCentsError::OutOfRange)?
                * 10
        }
        _ => decimal_str[..2]
            .parse()
            .map_err(|_| ParseCentsError::OutOfRange)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::OutOfRange)?;

    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::OutOfRange => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(15000), "150.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("150.00"), Ok(15000));
        assert_eq!(parse_cents("150"), Ok(15000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents("0.01"), Ok(1));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
        assert_eq!(parse_cents("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("12.34.56").is_err());
        assert!(parse_cents("").is_err());
        assert!(parse_cents("-").is_err());
        assert!(parse_cents("--5").is_err());
        assert!(parse_cents("1,50").is_err());
    }

    #[test]
    fn test_parse_cents_rejects_non_ascii_digits() {
        // Must come back as an error, never a slicing panic.
        assert_eq!(parse_cents("1.5é"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("１５０"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("é.50"), Err(ParseCentsError::InvalidFormat));
    }

    #[test]
    fn test_parse_cents_out_of_range() {
        // i64::MAX is 9223372036854775807; a hundredfold overflows.
        assert_eq!(
            parse_cents("9223372036854775807"),
            Err(ParseCentsError::OutOfRange)
        );
        assert_eq!(
            parse_cents("99999999999999999999999999.00"),
            Err(ParseCentsError::OutOfRange)
        );
    }
}
