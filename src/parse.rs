//! Parsing of single `<key>;<value>` records.

use std::fmt;

use crate::error::ParseError;

/// A measurement held as a whole number of tenths.
///
/// The input format allows exactly one fractional digit, so every value it can
/// express is representable without rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reading(i64);

impl Reading {
    pub const fn from_tenths(tenths: i64) -> Self {
        Self(tenths)
    }

    /// Truncates `value` toward zero to one decimal digit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_value_truncated(value: f64) -> Self {
        Self((value * 10.0).trunc() as i64)
    }

    pub const fn tenths(self) -> i64 {
        self.0
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn value(self) -> f64 {
        self.0 as f64 / 10.0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

enum ValueFault {
    Malformed,
    OutOfRange,
}

/// Splits `line` at its `;` and parses the value that follows.
///
/// The key borrows from `line`. Accepted values match `-?[0-9]+(\.[0-9])?`;
/// anything else is rejected rather than guessed at.
pub fn parse_line(line: &[u8]) -> Result<(&str, Reading), ParseError> {
    let split = memchr::memchr(b';', line).ok_or_else(|| ParseError::MissingDelimiter {
        line: lossy(line),
    })?;
    let key = std::str::from_utf8(&line[..split])
        .map_err(|_| ParseError::InvalidKey { line: lossy(line) })?;
    let reading = parse_value(&line[split + 1..]).map_err(|fault| match fault {
        ValueFault::Malformed => ParseError::MalformedValue { line: lossy(line) },
        ValueFault::OutOfRange => ParseError::OutOfRange { line: lossy(line) },
    })?;
    Ok((key, reading))
}

fn parse_value(bytes: &[u8]) -> Result<Reading, ValueFault> {
    let (is_negative, mut rest) = match bytes {
        [b'-', rest @ ..] => (true, rest),
        _ => (false, bytes),
    };

    let mut tenths: i64 = 0;
    let mut integer_digits = 0_usize;
    while let [digit @ b'0'..=b'9', tail @ ..] = rest {
        tenths = push_digit(tenths, digit - b'0')?;
        integer_digits += 1;
        rest = tail;
    }
    if integer_digits == 0 {
        return Err(ValueFault::Malformed);
    }

    let fraction = match rest {
        [] => 0,
        [b'.', digit @ b'0'..=b'9'] => digit - b'0',
        _ => return Err(ValueFault::Malformed),
    };
    let tenths = push_digit(tenths, fraction)?;

    Ok(Reading(if is_negative { -tenths } else { tenths }))
}

fn push_digit(acc: i64, digit: u8) -> Result<i64, ValueFault> {
    acc.checked_mul(10)
        .and_then(|acc| acc.checked_add(i64::from(digit)))
        .ok_or(ValueFault::OutOfRange)
}

fn lossy(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! parses {
        ($name:ident, $line:expr, $key:expr, $value:expr) => {
            #[test]
            fn $name() {
                let (key, reading) = parse_line($line).unwrap();
                assert_eq!(key, $key);
                assert!(
                    (reading.value() - $value).abs() < 1e-9,
                    "{} != {}",
                    reading.value(),
                    $value
                );
            }
        };
    }

    parses!(negative_with_fraction, b"Amsterdam;-3.4", "Amsterdam", -3.4);
    parses!(zero, b"Tokyo;0.0", "Tokyo", 0.0);
    parses!(two_integer_digits, b"Abha;18.0", "Abha", 18.0);
    parses!(negative_only_fraction, b"Oslo;-0.3", "Oslo", -0.3);
    parses!(no_fraction, b"Lima;22", "Lima", 22.0);
    parses!(unicode_key, "São Paulo;25.6".as_bytes(), "São Paulo", 25.6);
    parses!(empty_key, b";1.5", "", 1.5);

    #[test]
    fn readings_are_exact_tenths() {
        assert_eq!(parse_line(b"A;-12.3").unwrap().1, Reading::from_tenths(-123));
        assert_eq!(parse_line(b"A;99.9").unwrap().1.tenths(), 999);
        assert_eq!(parse_line(b"A;-3.4").unwrap().1.value(), -3.4);
    }

    #[test]
    fn keys_are_case_sensitive_views() {
        let line = b"tokyo;1.0";
        let (key, _) = parse_line(line).unwrap();
        assert_eq!(key, "tokyo");
        assert_ne!(key, "Tokyo");
        assert_eq!(key.as_ptr(), line.as_ptr());
    }

    #[test]
    fn rejects_missing_delimiter() {
        assert_eq!(
            parse_line(b"Amsterdam 3.4"),
            Err(ParseError::MissingDelimiter {
                line: "Amsterdam 3.4".to_string()
            })
        );
        assert!(matches!(
            parse_line(b""),
            Err(ParseError::MissingDelimiter { .. })
        ));
    }

    #[test]
    fn rejects_malformed_values() {
        for line in [
            &b"A;"[..],
            b"A;-",
            b"A;.5",
            b"A;1.",
            b"A;1.23",
            b"A;1,5",
            b"A;1e3",
            b"A;+1.0",
            b"A; 1.0",
            b"A;1.0 ",
            b"A;--1.0",
            b"A;1.0;2.0",
        ] {
            assert!(
                matches!(parse_line(line), Err(ParseError::MalformedValue { .. })),
                "accepted {:?}",
                String::from_utf8_lossy(line)
            );
        }
    }

    #[test]
    fn rejects_invalid_utf8_key() {
        let err = parse_line(b"\xff\xfe;1.0").unwrap_err();
        assert!(matches!(err, ParseError::InvalidKey { .. }));
    }

    #[test]
    fn rejects_overflowing_values() {
        let err = parse_line(b"A;99999999999999999999.9").unwrap_err();
        assert!(matches!(err, ParseError::OutOfRange { .. }));
    }

    #[test]
    fn displays_one_fractional_digit() {
        assert_eq!(Reading::from_tenths(-34).to_string(), "-3.4");
        assert_eq!(Reading::from_tenths(-3).to_string(), "-0.3");
        assert_eq!(Reading::from_tenths(0).to_string(), "0.0");
        assert_eq!(Reading::from_tenths(999).to_string(), "99.9");
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(Reading::from_value_truncated(12.39), Reading::from_tenths(123));
        assert_eq!(Reading::from_value_truncated(-12.39), Reading::from_tenths(-123));
        assert_eq!(Reading::from_value_truncated(-0.04), Reading::from_tenths(0));
    }
}
