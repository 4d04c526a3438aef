//! Semantic comparison of Kubernetes resource quantities.
//!
//! Quantities are compared by value rather than by spelling, so `"1"` and
//! `"1000m"` are the same amount of CPU and `"1Gi"` is the same amount of
//! memory as `"1073741824"`.

use crate::{Quantity, ResourceList};

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("invalid suffix: {0:?}")]
    InvalidSuffix(String),

    #[error("quantity out of range")]
    Overflow,
}

enum Scale {
    Decimal(i32),
    Binary(u32),
}

/// Parses a quantity into an integer count of nano-units, rounding any
/// remainder away from zero.
pub fn to_nanos(quantity: &str) -> Result<i128, ParseError> {
    let s = quantity.trim();
    if s.is_empty() {
        return Err(ParseError::Empty);
    }

    let (negative, s) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let number_end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(number_end);

    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && frac.is_empty()) || frac.contains('.') {
        return Err(ParseError::InvalidNumber(number.to_string()));
    }

    let mut mantissa: i128 = 0;
    for d in whole.bytes().chain(frac.bytes()) {
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(i128::from(d - b'0')))
            .ok_or(ParseError::Overflow)?;
    }

    let frac_len = i32::try_from(frac.len()).map_err(|_| ParseError::Overflow)?;
    let mut exponent = 9 - frac_len;
    match parse_suffix(suffix)? {
        Scale::Decimal(e) => exponent += e,
        Scale::Binary(shift) => {
            mantissa = mantissa
                .checked_mul(1i128 << shift)
                .ok_or(ParseError::Overflow)?;
        }
    }

    let value = if exponent >= 0 {
        let factor = 10i128
            .checked_pow(exponent as u32)
            .ok_or(ParseError::Overflow)?;
        mantissa.checked_mul(factor).ok_or(ParseError::Overflow)?
    } else {
        match 10i128.checked_pow(exponent.unsigned_abs()) {
            Some(divisor) => {
                let (q, r) = (mantissa / divisor, mantissa % divisor);
                if r == 0 {
                    q
                } else {
                    q + 1
                }
            }
            // Smaller than a nano-unit; rounds up to one.
            None if mantissa > 0 => 1,
            None => 0,
        }
    };

    Ok(if negative { -value } else { value })
}

fn parse_suffix(suffix: &str) -> Result<Scale, ParseError> {
    let scale = match suffix {
        "" => Scale::Decimal(0),
        "n" => Scale::Decimal(-9),
        "u" => Scale::Decimal(-6),
        "m" => Scale::Decimal(-3),
        "k" => Scale::Decimal(3),
        "M" => Scale::Decimal(6),
        "G" => Scale::Decimal(9),
        "T" => Scale::Decimal(12),
        "P" => Scale::Decimal(15),
        "E" => Scale::Decimal(18),
        "Ki" => Scale::Binary(10),
        "Mi" => Scale::Binary(20),
        "Gi" => Scale::Binary(30),
        "Ti" => Scale::Binary(40),
        "Pi" => Scale::Binary(50),
        "Ei" => Scale::Binary(60),
        s if s.starts_with(['e', 'E']) => {
            let e = s[1..]
                .parse::<i32>()
                .map_err(|_| ParseError::InvalidSuffix(s.to_string()))?;
            if e.unsigned_abs() > 38 {
                return Err(ParseError::Overflow);
            }
            Scale::Decimal(e)
        }
        s => return Err(ParseError::InvalidSuffix(s.to_string())),
    };
    Ok(scale)
}

/// Returns true if both quantities describe the same amount.
///
/// Quantities that fail to parse are compared by their literal text.
pub fn semantic_eq(a: &Quantity, b: &Quantity) -> bool {
    match (to_nanos(&a.0), to_nanos(&b.0)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.0 == b.0,
    }
}

/// Returns true if both lists name the same resources with semantically
/// equal quantities.
pub fn resource_lists_eq(a: &ResourceList, b: &ResourceList) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(name, qa)| b.get(name).map_or(false, |qb| semantic_eq(qa, qb)))
}
