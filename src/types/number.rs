//! Primitive numeric scalar types: signed and unsigned integers of each
//! width, plus binary floats. These serve as array/tuple element types and
//! as promotion targets.

use crate::error::{Error, Result};
use crate::types::{compare_nulls, SqlType, TypeRef, Value, WireType, WireValue};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NumberKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberType {
    kind: NumberKind,
}

impl NumberType {
    pub const INT8: NumberType = NumberType { kind: NumberKind::Int8 };
    pub const INT16: NumberType = NumberType { kind: NumberKind::Int16 };
    pub const INT32: NumberType = NumberType { kind: NumberKind::Int32 };
    pub const INT64: NumberType = NumberType { kind: NumberKind::Int64 };
    pub const UINT8: NumberType = NumberType { kind: NumberKind::Uint8 };
    pub const UINT16: NumberType = NumberType { kind: NumberKind::Uint16 };
    pub const UINT32: NumberType = NumberType { kind: NumberKind::Uint32 };
    pub const UINT64: NumberType = NumberType { kind: NumberKind::Uint64 };
    pub const FLOAT32: NumberType = NumberType { kind: NumberKind::Float32 };
    pub const FLOAT64: NumberType = NumberType { kind: NumberKind::Float64 };

    pub fn is_signed(&self) -> bool {
        matches!(
            self.kind,
            NumberKind::Int8 | NumberKind::Int16 | NumberKind::Int32 | NumberKind::Int64
        )
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self.kind,
            NumberKind::Uint8 | NumberKind::Uint16 | NumberKind::Uint32 | NumberKind::Uint64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self.kind, NumberKind::Float32 | NumberKind::Float64)
    }

    fn integer_bounds(&self) -> (i128, i128) {
        match self.kind {
            NumberKind::Int8 => (i8::MIN as i128, i8::MAX as i128),
            NumberKind::Int16 => (i16::MIN as i128, i16::MAX as i128),
            NumberKind::Int32 => (i32::MIN as i128, i32::MAX as i128),
            NumberKind::Int64 => (i64::MIN as i128, i64::MAX as i128),
            NumberKind::Uint8 => (0, u8::MAX as i128),
            NumberKind::Uint16 => (0, u16::MAX as i128),
            NumberKind::Uint32 => (0, u32::MAX as i128),
            NumberKind::Uint64 => (0, u64::MAX as i128),
            NumberKind::Float32 | NumberKind::Float64 => unreachable!("float has no integer bounds"),
        }
    }

    fn from_i128(&self, i: i128) -> Result<Value> {
        let (lo, hi) = self.integer_bounds();
        if i < lo || i > hi {
            return Err(Error::OutOfRange {
                value: i.to_string(),
                typ: self.to_string(),
            });
        }
        Ok(match self.kind {
            NumberKind::Int8 => Value::I8(i as i8),
            NumberKind::Int16 => Value::I16(i as i16),
            NumberKind::Int32 => Value::I32(i as i32),
            NumberKind::Int64 => Value::I64(i as i64),
            NumberKind::Uint8 => Value::U8(i as u8),
            NumberKind::Uint16 => Value::U16(i as u16),
            NumberKind::Uint32 => Value::U32(i as u32),
            NumberKind::Uint64 => Value::U64(i as u64),
            NumberKind::Float32 | NumberKind::Float64 => unreachable!(),
        })
    }

    fn from_f64(&self, f: f64) -> Result<Value> {
        if !f.is_finite() {
            return Err(Error::ConvertFailed {
                value: f.to_string(),
                typ: self.to_string(),
            });
        }
        match self.kind {
            NumberKind::Float32 => Ok(Value::F32(f as f32)),
            NumberKind::Float64 => Ok(Value::F64(f)),
            // Integer kinds round half away from zero, then range-check
            _ => {
                let rounded = f.round();
                if rounded < i128::MIN as f64 || rounded > i128::MAX as f64 {
                    return Err(Error::OutOfRange {
                        value: f.to_string(),
                        typ: self.to_string(),
                    });
                }
                self.from_i128(rounded as i128)
            }
        }
    }

    fn normalize(&self, v: &Value) -> Result<Value> {
        match v {
            Value::Bool(b) => self.normalize(&Value::I64(*b as i64)),
            Value::F32(f) => self.from_f64(*f as f64),
            Value::F64(f) => self.from_f64(*f),
            Value::Decimal(d) => {
                if self.is_float() {
                    self.from_f64(v.to_f64()?)
                } else {
                    use bigdecimal::{RoundingMode, ToPrimitive};
                    // Exact path: a 64-bit boundary value survives a
                    // decimal round-trip but not an f64 one
                    let rounded = d.with_scale_round(0, RoundingMode::HalfUp);
                    let i = rounded.to_i128().ok_or_else(|| Error::OutOfRange {
                        value: d.to_string(),
                        typ: self.to_string(),
                    })?;
                    self.from_i128(i)
                }
            }
            Value::Str(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i128>() {
                    if self.is_float() {
                        return self.from_f64(i as f64);
                    }
                    return self.from_i128(i);
                }
                match s.parse::<f64>() {
                    Ok(f) => self.from_f64(f),
                    Err(_) => Err(Error::ConvertFailed {
                        value: format!("{:?}", v),
                        typ: self.to_string(),
                    }),
                }
            }
            other if other.is_integer() => {
                let i = other.to_i128()?;
                if self.is_float() {
                    self.from_f64(i as f64)
                } else {
                    self.from_i128(i)
                }
            }
            other => Err(Error::ConvertFailed {
                value: format!("{:?}", other),
                typ: self.to_string(),
            }),
        }
    }
}

impl SqlType for NumberType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        let an = self.normalize(a)?;
        let bn = self.normalize(b)?;
        if self.is_float() {
            let af = an.to_f64()?;
            let bf = bn.to_f64()?;
            Ok(af.partial_cmp(&bf).unwrap_or(Ordering::Equal))
        } else {
            Ok(an.to_i128()?.cmp(&bn.to_i128()?))
        }
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        self.normalize(&v)
    }

    fn promote(&self) -> TypeRef {
        Arc::new(if self.is_unsigned() {
            NumberType::UINT64
        } else if self.is_float() {
            NumberType::FLOAT64
        } else {
            NumberType::INT64
        })
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let normalized = self.normalize(v)?;
        Ok(WireValue::new(
            self.wire_type(),
            normalized.to_string().into_bytes(),
        ))
    }

    fn wire_type(&self) -> WireType {
        match self.kind {
            NumberKind::Int8 => WireType::Int8,
            NumberKind::Int16 => WireType::Int16,
            NumberKind::Int32 => WireType::Int32,
            NumberKind::Int64 => WireType::Int64,
            NumberKind::Uint8 => WireType::Uint8,
            NumberKind::Uint16 => WireType::Uint16,
            NumberKind::Uint32 => WireType::Uint32,
            NumberKind::Uint64 => WireType::Uint64,
            NumberKind::Float32 => WireType::Float32,
            NumberKind::Float64 => WireType::Float64,
        }
    }

    fn zero(&self) -> Value {
        match self.kind {
            NumberKind::Int8 => Value::I8(0),
            NumberKind::Int16 => Value::I16(0),
            NumberKind::Int32 => Value::I32(0),
            NumberKind::Int64 => Value::I64(0),
            NumberKind::Uint8 => Value::U8(0),
            NumberKind::Uint16 => Value::U16(0),
            NumberKind::Uint32 => Value::U32(0),
            NumberKind::Uint64 => Value::U64(0),
            NumberKind::Float32 => Value::F32(0.0),
            NumberKind::Float64 => Value::F64(0.0),
        }
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            NumberKind::Int8 => "tinyint",
            NumberKind::Int16 => "smallint",
            NumberKind::Int32 => "int",
            NumberKind::Int64 => "bigint",
            NumberKind::Uint8 => "tinyint unsigned",
            NumberKind::Uint16 => "smallint unsigned",
            NumberKind::Uint32 => "int unsigned",
            NumberKind::Uint64 => "bigint unsigned",
            NumberKind::Float32 => "float",
            NumberKind::Float64 => "double",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening_and_narrowing() {
        assert_eq!(
            NumberType::INT64.convert(Value::I8(-5)).unwrap(),
            Value::I64(-5)
        );
        assert_eq!(
            NumberType::INT8.convert(Value::I64(127)).unwrap(),
            Value::I8(127)
        );
        assert!(NumberType::INT8.convert(Value::I64(128)).is_err());
        assert!(NumberType::UINT8.convert(Value::I64(-1)).is_err());
    }

    #[test]
    fn test_float_rounding_into_integers() {
        assert_eq!(
            NumberType::INT32.convert(Value::F64(2.5)).unwrap(),
            Value::I32(3)
        );
        assert_eq!(
            NumberType::INT32.convert(Value::F64(-2.5)).unwrap(),
            Value::I32(-3)
        );
        assert!(NumberType::INT32.convert(Value::F64(1e300)).is_err());
    }

    #[test]
    fn test_string_parsing() {
        assert_eq!(
            NumberType::INT64.convert(Value::Str(" 42 ".into())).unwrap(),
            Value::I64(42)
        );
        assert_eq!(
            NumberType::FLOAT64.convert(Value::Str("1.5".into())).unwrap(),
            Value::F64(1.5)
        );
        assert!(NumberType::INT64.convert(Value::Str("four".into())).is_err());
    }

    #[test]
    fn test_decimal_to_integer_is_exact_at_64_bit_bounds() {
        use bigdecimal::BigDecimal;
        use std::str::FromStr;

        let max_u = BigDecimal::from_str("18446744073709551615").unwrap();
        assert_eq!(
            NumberType::UINT64.convert(Value::Decimal(max_u)).unwrap(),
            Value::U64(u64::MAX)
        );
        let max_i = BigDecimal::from_str("9223372036854775807").unwrap();
        assert_eq!(
            NumberType::INT64.convert(Value::Decimal(max_i)).unwrap(),
            Value::I64(i64::MAX)
        );
        let over = BigDecimal::from_str("18446744073709551616").unwrap();
        assert!(NumberType::UINT64.convert(Value::Decimal(over)).is_err());
        // Fractional decimals still round half away from zero
        let half = BigDecimal::from_str("-2.5").unwrap();
        assert_eq!(
            NumberType::INT32.convert(Value::Decimal(half)).unwrap(),
            Value::I32(-3)
        );
    }

    #[test]
    fn test_compare_across_variants() {
        let t = NumberType::INT64;
        assert_eq!(
            t.compare(&Value::I8(2), &Value::U32(2)).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            t.compare(&Value::Null, &Value::I64(i64::MIN)).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_promote_targets() {
        assert_eq!(NumberType::INT8.promote().to_string(), "bigint");
        assert_eq!(NumberType::UINT16.promote().to_string(), "bigint unsigned");
        assert_eq!(NumberType::FLOAT32.promote().to_string(), "double");
    }

    #[test]
    fn test_sql_text_encoding() {
        let wire = NumberType::INT64.sql(&Value::Str("7".into())).unwrap();
        assert_eq!(wire.wire_type, WireType::Int64);
        assert_eq!(wire.bytes, b"7");
    }
}
