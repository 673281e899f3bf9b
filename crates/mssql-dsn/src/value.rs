//! Primitive value parsers used by the resolver.
//!
//! Failures are reported as [`DsnError::InvalidValue`] naming the parameter
//! and the raw text.

use std::time::Duration;

use crate::error::{DsnError, Result};

/// How an unsigned integer parameter selects its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    /// Plain decimal digits.
    Decimal,
    /// Base taken from the prefix: `0x` hex, `0b` binary, `0o` or a bare
    /// leading `0` octal, decimal otherwise.
    Auto,
}

const INVALID_SYNTAX: &str = "invalid syntax";
const OUT_OF_RANGE: &str = "value out of range";

/// Parse an unsigned integer no larger than `max`.
pub fn parse_uint(param: &'static str, value: &str, radix: Radix, max: u64) -> Result<u64> {
    let (digits, base) = match radix {
        Radix::Decimal => (value, 10),
        Radix::Auto => split_prefix(value),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(base)) {
        return Err(DsnError::invalid_value(param, value, INVALID_SYNTAX));
    }

    let n = u64::from_str_radix(digits, base)
        .map_err(|_| DsnError::invalid_value(param, value, OUT_OF_RANGE))?;
    if n > max {
        return Err(DsnError::invalid_value(param, value, OUT_OF_RANGE));
    }
    Ok(n)
}

fn split_prefix(value: &str) -> (&str, u32) {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (&value[2..], 16),
            b'b' | b'B' => return (&value[2..], 2),
            b'o' | b'O' => return (&value[2..], 8),
            _ => return (&value[1..], 8),
        }
    }
    (value, 10)
}

/// Parse a 16-bit unsigned integer.
pub fn parse_u16(param: &'static str, value: &str, radix: Radix) -> Result<u16> {
    let n = parse_uint(param, value, radix, u64::from(u16::MAX))?;
    u16::try_from(n).map_err(|_| DsnError::invalid_value(param, value, OUT_OF_RANGE))
}

/// Parse a whole number of seconds.
pub fn parse_secs(param: &'static str, value: &str) -> Result<Duration> {
    parse_uint(param, value, Radix::Decimal, u64::MAX).map(Duration::from_secs)
}

/// Parse boolean text.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and the matching false
/// spellings `0`, `f`, `F`, `FALSE`, `false`, `False`.
pub fn parse_bool(param: &'static str, value: &str) -> Result<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(DsnError::invalid_value(param, value, INVALID_SYNTAX)),
    }
}
