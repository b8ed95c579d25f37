//! Fixed-precision DECIMAL type
//!
//! Values are normalized to an exact fixed-point decimal carrying exactly
//! `scale` fractional digits. Inputs round half-away-from-zero; integer
//! digit overflow is an out-of-range error, never silent truncation.

use crate::error::{Error, Result};
use crate::types::{compare_nulls, SqlType, TypeRef, Value, WireType, WireValue};
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Maximum precision allowed for the DECIMAL type.
pub const DECIMAL_MAX_PRECISION: u8 = 65;

#[derive(Debug, Clone)]
pub struct DecimalType {
    precision: u8,
    scale: u8,
    // 10^(precision - scale); |v| must stay strictly below this after
    // rounding to scale
    exclusive_upper_bound: BigDecimal,
}

impl DecimalType {
    pub fn new(precision: u8, scale: u8) -> Result<Self> {
        if precision == 0 || precision > DECIMAL_MAX_PRECISION {
            return Err(Error::InvalidTypeDefinition(format!(
                "precision {} is outside the range 1-{}",
                precision, DECIMAL_MAX_PRECISION
            )));
        }
        if scale > precision {
            return Err(Error::InvalidTypeDefinition(format!(
                "scale {} cannot be larger than the precision {}",
                scale, precision
            )));
        }
        let exclusive_upper_bound = BigDecimal::from_str(&format!("1e{}", precision - scale))
            .expect("power-of-ten literal always parses");
        Ok(DecimalType {
            precision,
            scale,
            exclusive_upper_bound,
        })
    }

    /// Panicking variant of [`DecimalType::new`], for statically known
    /// precision and scale.
    pub fn must_new(precision: u8, scale: u8) -> Self {
        match Self::new(precision, scale) {
            Ok(t) => t,
            Err(e) => panic!("invalid decimal type: {}", e),
        }
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn exclusive_upper_bound(&self) -> &BigDecimal {
        &self.exclusive_upper_bound
    }

    /// Convert a raw value to a decimal without applying this type's scale
    /// or range restrictions. Comparison goes through here so that values
    /// wider than the column can still be ordered.
    fn to_decimal(&self, v: &Value) -> Result<BigDecimal> {
        let fail = |v: &Value| Error::ConvertFailed {
            value: format!("{:?}", v),
            typ: self.to_string(),
        };
        match v {
            Value::Bool(b) => Ok(BigDecimal::from(*b as i64)),
            Value::Decimal(d) => Ok(d.clone()),
            Value::F32(f) => decimal_from_float(*f as f64).ok_or_else(|| fail(v)),
            Value::F64(f) => decimal_from_float(*f).ok_or_else(|| fail(v)),
            Value::Str(s) => parse_decimal_literal(s).ok_or_else(|| fail(v)),
            Value::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => parse_decimal_literal(s).ok_or_else(|| fail(v)),
                Err(_) => Err(fail(v)),
            },
            other if other.is_integer() => Ok(BigDecimal::from(other.to_i128()?)),
            other => Err(fail(other)),
        }
    }

    /// Round to this type's scale, then range-check the integer digits.
    fn bounds_check(&self, d: BigDecimal) -> Result<BigDecimal> {
        let rounded = d.with_scale_round(self.scale as i64, RoundingMode::HalfUp);
        if rounded.abs() >= self.exclusive_upper_bound {
            return Err(Error::OutOfRange {
                value: rounded.to_string(),
                typ: self.to_string(),
            });
        }
        Ok(rounded)
    }
}

impl SqlType for DecimalType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        let ad = self.to_decimal(a)?;
        let bd = self.to_decimal(b)?;
        Ok(ad.cmp(&bd))
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        let d = self.to_decimal(&v)?;
        Ok(Value::Decimal(self.bounds_check(d)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(DecimalType::must_new(DECIMAL_MAX_PRECISION, self.scale))
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let normalized = self.convert(v.clone())?;
        Ok(WireValue::new(
            WireType::Decimal,
            normalized.to_string().into_bytes(),
        ))
    }

    fn wire_type(&self) -> WireType {
        WireType::Decimal
    }

    fn zero(&self) -> Value {
        Value::Decimal(BigDecimal::from(0).with_scale(self.scale as i64))
    }
}

impl fmt::Display for DecimalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decimal({},{})", self.precision, self.scale)
    }
}

fn decimal_from_float(f: f64) -> Option<BigDecimal> {
    if !f.is_finite() {
        return None;
    }
    // The shortest round-tripping representation, not the full binary
    // expansion, matches what a user wrote
    BigDecimal::from_str(&format!("{}", f)).ok()
}

/// Parse a decimal literal: plain or scientific form, or an integer in
/// hexadecimal (`0x`) or binary (`0b`) notation.
fn parse_decimal_literal(s: &str) -> Option<BigDecimal> {
    let s = s.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X"))
    {
        BigDecimal::from(BigInt::parse_bytes(hex.as_bytes(), 16)?)
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        BigDecimal::from(BigInt::parse_bytes(bin.as_bytes(), 2)?)
    } else {
        return BigDecimal::from_str(s).ok();
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(p: u8, s: u8) -> DecimalType {
        DecimalType::must_new(p, s)
    }

    #[test]
    fn test_construction_bounds() {
        assert!(DecimalType::new(0, 0).is_err());
        assert!(DecimalType::new(66, 0).is_err());
        assert!(DecimalType::new(5, 6).is_err());
        assert!(DecimalType::new(65, 65).is_ok());
        assert!(DecimalType::new(1, 0).is_ok());
    }

    #[test]
    fn test_round_half_away_from_zero() {
        let t = dec(1, 1);
        assert_eq!(t.convert(Value::F64(0.55)).unwrap().to_string(), "0.6");
        let t = dec(2, 1);
        assert_eq!(
            t.convert(Value::F64(-0.7863002)).unwrap().to_string(),
            "-0.8"
        );
        assert_eq!(
            t.convert(Value::Str("0.55".into())).unwrap().to_string(),
            "0.6"
        );
    }

    #[test]
    fn test_integer_digit_overflow() {
        let t = dec(1, 1);
        assert!(t.convert(Value::I64(1)).is_err());
        assert!(t.convert(Value::F64(0.95)).is_err()); // rounds to 1.0
        let t = dec(5, 2);
        assert!(t.convert(Value::I64(1000)).is_err());
        assert_eq!(t.convert(Value::I64(999)).unwrap().to_string(), "999.00");
    }

    #[test]
    fn test_fixed_scale_output() {
        let t = dec(10, 3);
        assert_eq!(t.convert(Value::I64(7)).unwrap().to_string(), "7.000");
        assert_eq!(t.zero().to_string(), "0.000");
    }

    #[test]
    fn test_multi_base_strings() {
        let t = dec(10, 0);
        assert_eq!(t.convert(Value::Str("0x1f".into())).unwrap().to_string(), "31");
        assert_eq!(
            t.convert(Value::Str("0b101".into())).unwrap().to_string(),
            "5"
        );
        assert_eq!(
            t.convert(Value::Str("-0x10".into())).unwrap().to_string(),
            "-16"
        );
        assert_eq!(
            t.convert(Value::Str("1.5e3".into())).unwrap().to_string(),
            "1500"
        );
        assert!(t.convert(Value::Str("not a number".into())).is_err());
    }

    #[test]
    fn test_sixty_five_digit_compare() {
        let t = dec(65, 0);
        let all_nines = "9".repeat(65);
        let mut smaller = "9".repeat(64);
        smaller.push('8');
        assert_eq!(
            t.compare(&Value::Str(all_nines), &Value::Str(smaller))
                .unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_convert_idempotent() {
        let t = dec(6, 2);
        let once = t.convert(Value::Str("12.345".into())).unwrap();
        let twice = t.convert(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.to_string(), "12.35");
    }

    #[test]
    fn test_compare_null_and_reflexive() {
        let t = dec(4, 1);
        assert_eq!(
            t.compare(&Value::Null, &Value::I64(0)).unwrap(),
            Ordering::Less
        );
        let v = Value::Str("3.5".into());
        assert_eq!(t.compare(&v, &v).unwrap(), Ordering::Equal);
        assert_eq!(
            t.compare(&Value::I64(2), &Value::I64(3)).unwrap(),
            t.compare(&Value::I64(3), &Value::I64(2)).unwrap().reverse()
        );
    }

    #[test]
    fn test_sql_wire_form() {
        let t = dec(5, 2);
        let wire = t.sql(&Value::Str("3.1".into())).unwrap();
        assert_eq!(wire.wire_type, WireType::Decimal);
        assert_eq!(wire.bytes, b"3.10");
        assert!(t.sql(&Value::Null).unwrap().is_null());
    }

    #[test]
    fn test_rejects_non_numeric_kinds() {
        let t = dec(5, 2);
        assert!(t.convert(Value::List(vec![])).is_err());
        assert!(t.convert(Value::F64(f64::NAN)).is_err());
        assert!(t.convert(Value::F64(f64::INFINITY)).is_err());
    }
}
