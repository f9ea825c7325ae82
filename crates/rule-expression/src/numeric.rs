//! Ordering and arithmetic over [`Value`]s with cross-kind numeric promotion.
//!
//! Arithmetic helpers take `(modifier, value)`: the second argument is the
//! operand being transformed, so `div(2, 8)` is `8 / 2`. The bound argument of
//! an arithmetic operator is the modifier and the input is the value.

use crate::error::Error;
use crate::value::Value;
use std::cmp::Ordering;

/// Significant decimal digits kept by [`denoise`].
const NOISE_DIGITS: usize = 12;

/// Compares two values.
///
/// Numbers of any kind compare with each other: floats promote both sides to
/// `f64`, mixed signed/unsigned integers compare in a signed domain. Strings
/// compare bytewise with strings. Every other pairing is `NotComparable`.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering, Error> {
    let not_comparable = || Error::NotComparable(a.kind(), b.kind());
    match (a, b) {
        (Value::Float(x), Value::Float(_) | Value::Int(_) | Value::Uint(_)) => {
            x.partial_cmp(&b.to_float()).ok_or_else(not_comparable)
        }
        (Value::Int(_) | Value::Uint(_), Value::Float(y)) => {
            a.to_float().partial_cmp(y).ok_or_else(not_comparable)
        }
        (Value::Uint(x), Value::Uint(y)) => Ok(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Int(x), Value::Uint(y)) => Ok(i128::from(*x).cmp(&i128::from(*y))),
        (Value::Uint(x), Value::Int(y)) => Ok(i128::from(*x).cmp(&i128::from(*y))),
        (Value::String(x), Value::String(y)) => Ok(x.as_bytes().cmp(y.as_bytes())),
        _ => Err(not_comparable()),
    }
}

/// Rounds away binary floating-point noise, e.g. `0.09999999999999964` → `0.1`.
pub fn denoise(n: f64) -> f64 {
    if !n.is_finite() || n == 0.0 {
        return n;
    }
    format!("{:.*e}", NOISE_DIGITS - 1, n)
        .parse()
        .unwrap_or(n)
}

enum Operands {
    Float(f64, f64),
    Int(i64, i64),
    Uint(u64, u64),
}

fn operands(modifier: &Value, value: &Value) -> Result<Operands, Error> {
    match (modifier, value) {
        (Value::Float(m), v) if v.is_numeric() => Ok(Operands::Float(*m, v.to_float())),
        (m, Value::Float(v)) if m.is_numeric() => Ok(Operands::Float(m.to_float(), *v)),
        (Value::Uint(m), Value::Uint(v)) => Ok(Operands::Uint(*m, *v)),
        (Value::Int(_) | Value::Uint(_), Value::Int(_) | Value::Uint(_)) => {
            Ok(Operands::Int(modifier.to_int(), value.to_int()))
        }
        _ => Err(Error::NotSupported(modifier.kind(), value.kind())),
    }
}

pub fn add(modifier: &Value, value: &Value) -> Result<Value, Error> {
    Ok(match operands(modifier, value)? {
        Operands::Float(m, v) => Value::Float(v + m),
        Operands::Int(m, v) => Value::Int(v.wrapping_add(m)),
        Operands::Uint(m, v) => Value::Uint(v.wrapping_add(m)),
    })
}

pub fn sub(modifier: &Value, value: &Value) -> Result<Value, Error> {
    Ok(match operands(modifier, value)? {
        Operands::Float(m, v) => Value::Float(denoise(v - m)),
        Operands::Int(m, v) => Value::Int(v.wrapping_sub(m)),
        Operands::Uint(m, v) => Value::Uint(v.wrapping_sub(m)),
    })
}

pub fn mul(modifier: &Value, value: &Value) -> Result<Value, Error> {
    Ok(match operands(modifier, value)? {
        Operands::Float(m, v) => Value::Float(v * m),
        Operands::Int(m, v) => Value::Int(v.wrapping_mul(m)),
        Operands::Uint(m, v) => Value::Uint(v.wrapping_mul(m)),
    })
}

/// Divides `value` by `modifier`.
///
/// Integer operands stay integral only when the division is exact; otherwise
/// the quotient is computed in floating point.
pub fn div(modifier: &Value, value: &Value) -> Result<Value, Error> {
    match operands(modifier, value)? {
        Operands::Float(m, v) => {
            if m == 0.0 {
                return Err(Error::DivisionByZero);
            }
            Ok(Value::Float(v / m))
        }
        Operands::Int(m, v) => {
            if m == 0 {
                return Err(Error::DivisionByZero);
            }
            if v.wrapping_rem(m) == 0 {
                Ok(Value::Int(v.wrapping_div(m)))
            } else {
                Ok(Value::Float(v as f64 / m as f64))
            }
        }
        Operands::Uint(m, v) => {
            if m == 0 {
                return Err(Error::DivisionByZero);
            }
            if v % m == 0 {
                Ok(Value::Uint(v / m))
            } else {
                Ok(Value::Float(v as f64 / m as f64))
            }
        }
    }
}

pub fn modulo(modifier: &Value, value: &Value) -> Result<Value, Error> {
    match operands(modifier, value)? {
        Operands::Float(m, v) => {
            if m == 0.0 {
                return Err(Error::DivisionByZero);
            }
            Ok(Value::Float(denoise(v % m)))
        }
        Operands::Int(m, v) => {
            if m == 0 {
                return Err(Error::DivisionByZero);
            }
            Ok(Value::Int(v.wrapping_rem(m)))
        }
        Operands::Uint(m, v) => {
            if m == 0 {
                return Err(Error::DivisionByZero);
            }
            Ok(Value::Uint(v % m))
        }
    }
}

/// Raises `value` to the power `modifier`.
///
/// Integer exponents outside `0..=u32::MAX` fall back to floating point.
pub fn pow(modifier: &Value, value: &Value) -> Result<Value, Error> {
    Ok(match operands(modifier, value)? {
        Operands::Float(m, v) => Value::Float(denoise(v.powf(m))),
        Operands::Int(m, v) => match u32::try_from(m) {
            Ok(exp) => Value::Int(v.wrapping_pow(exp)),
            Err(_) => Value::Float(denoise((v as f64).powf(m as f64))),
        },
        Operands::Uint(m, v) => match u32::try_from(m) {
            Ok(exp) => Value::Uint(v.wrapping_pow(exp)),
            Err(_) => Value::Float(denoise((v as f64).powf(m as f64))),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;

    #[test]
    fn compare_promotes_numbers() {
        assert_eq!(compare(&Value::Int(1), &Value::Uint(1)), Ok(Ordering::Equal));
        assert_eq!(compare(&Value::Int(-1), &Value::Uint(u64::MAX)), Ok(Ordering::Less));
        assert_eq!(compare(&Value::Float(1.5), &Value::Int(1)), Ok(Ordering::Greater));
        assert_eq!(compare(&Value::Uint(2), &Value::Float(2.0)), Ok(Ordering::Equal));
        assert_eq!(compare(&Value::from("abc"), &Value::from("abd")), Ok(Ordering::Less));
    }

    #[test]
    fn compare_rejects_mixed_kinds() {
        assert_eq!(
            compare(&Value::from("1"), &Value::Int(1)),
            Err(Error::NotComparable(Kind::String, Kind::Int))
        );
        assert_eq!(
            compare(&Value::Bool(true), &Value::Bool(true)),
            Err(Error::NotComparable(Kind::Bool, Kind::Bool))
        );
        assert!(compare(&Value::Float(f64::NAN), &Value::Float(1.0)).is_err());
    }

    #[test]
    fn add_promotion_table() {
        assert_eq!(add(&Value::Int(1), &Value::Int(1)), Ok(Value::Int(2)));
        assert_eq!(add(&Value::Int(1), &Value::Uint(1)), Ok(Value::Int(2)));
        assert_eq!(add(&Value::Uint(1), &Value::Int(1)), Ok(Value::Int(2)));
        assert_eq!(add(&Value::Uint(1), &Value::Uint(1)), Ok(Value::Uint(2)));
        assert_eq!(add(&Value::Int(1), &Value::Float(1.0)), Ok(Value::Float(2.0)));
    }

    #[test]
    fn div_exact_and_inexact() {
        assert_eq!(div(&Value::Int(2), &Value::Int(8)), Ok(Value::Int(4)));
        assert_eq!(div(&Value::Int(2), &Value::Int(7)), Ok(Value::Float(3.5)));
        assert_eq!(div(&Value::Uint(4), &Value::Uint(8)), Ok(Value::Uint(2)));
        assert_eq!(div(&Value::Int(2), &Value::Float(7.0)), Ok(Value::Float(3.5)));
        assert_eq!(div(&Value::Int(0), &Value::Int(5)), Err(Error::DivisionByZero));
        assert_eq!(div(&Value::Float(0.0), &Value::Int(5)), Err(Error::DivisionByZero));
    }

    #[test]
    fn mod_is_denoised() {
        assert_eq!(modulo(&Value::Float(2.2), &Value::Float(4.5)), Ok(Value::Float(0.1)));
        assert_eq!(modulo(&Value::Int(3), &Value::Int(10)), Ok(Value::Int(1)));
        assert_eq!(modulo(&Value::Uint(0), &Value::Uint(10)), Err(Error::DivisionByZero));
    }

    #[test]
    fn sub_and_pow() {
        assert_eq!(sub(&Value::Float(0.1), &Value::Float(0.3)), Ok(Value::Float(0.2)));
        assert_eq!(sub(&Value::Int(3), &Value::Uint(1)), Ok(Value::Int(-2)));
        assert_eq!(pow(&Value::Int(3), &Value::Int(2)), Ok(Value::Int(8)));
        assert_eq!(pow(&Value::Int(-1), &Value::Int(2)), Ok(Value::Float(0.5)));
        assert_eq!(pow(&Value::Int(2), &Value::Float(1.1)), Ok(Value::Float(1.21)));
    }

    #[test]
    fn unsupported_kinds() {
        assert_eq!(
            add(&Value::from("a"), &Value::Int(1)),
            Err(Error::NotSupported(Kind::String, Kind::Int))
        );
        assert_eq!(
            mul(&Value::Int(1), &Value::Bool(true)),
            Err(Error::NotSupported(Kind::Int, Kind::Bool))
        );
    }

    #[test]
    fn denoise_keeps_clean_values() {
        assert_eq!(denoise(0.1 + 0.2), 0.3);
        assert_eq!(denoise(123456.5), 123456.5);
        assert_eq!(denoise(-0.0), -0.0);
        assert!(denoise(f64::INFINITY).is_infinite());
    }
}
