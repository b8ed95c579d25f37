//! BIT(n) type: unsigned values packed into 1-64 bits.

use crate::error::{Error, Result};
use crate::types::{compare_nulls, SqlType, TypeRef, Value, WireType, WireValue};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Maximum number of bits for the BIT type.
pub const BIT_MAX_WIDTH: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitType {
    width: u8,
}

impl BitType {
    pub fn new(width: u8) -> Result<Self> {
        if width == 0 || width > BIT_MAX_WIDTH {
            return Err(Error::InvalidTypeDefinition(format!(
                "bit width {} is outside the range 1-{}",
                width, BIT_MAX_WIDTH
            )));
        }
        Ok(BitType { width })
    }

    pub fn must_new(width: u8) -> Self {
        match Self::new(width) {
            Ok(t) => t,
            Err(e) => panic!("invalid bit type: {}", e),
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    fn to_u64(&self, v: &Value) -> Result<u64> {
        let fail = || Error::ConvertFailed {
            value: format!("{:?}", v),
            typ: self.to_string(),
        };
        let bits = match v {
            Value::Bool(b) => *b as u64,
            // Signed values are reinterpreted as their two's-complement
            // bit pattern, so -1 needs all 64 bits
            Value::I8(i) => *i as u64,
            Value::I16(i) => *i as u64,
            Value::I32(i) => *i as u64,
            Value::I64(i) => *i as u64,
            Value::U8(i) => *i as u64,
            Value::U16(i) => *i as u64,
            Value::U32(i) => *i as u64,
            Value::U64(i) => *i,
            Value::Str(s) => parse_uint_literal(s).ok_or_else(fail)?,
            Value::Bytes(b) => bytes_to_u64(b).ok_or_else(|| Error::OutOfRange {
                value: format!("{:?}", v),
                typ: self.to_string(),
            })?,
            _ => return Err(fail()),
        };
        let needed = 64 - bits.leading_zeros() as u8;
        if needed > self.width {
            return Err(Error::OutOfRange {
                value: bits.to_string(),
                typ: self.to_string(),
            });
        }
        Ok(bits)
    }
}

impl SqlType for BitType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        let au = self.to_u64(a)?;
        let bu = self.to_u64(b)?;
        Ok(au.cmp(&bu))
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::U64(self.to_u64(&v)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(*self)
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let bits = self.to_u64(v)?;
        // Minimal big-endian byte string, at least one byte
        let full = bits.to_be_bytes();
        let skip = (bits.leading_zeros() / 8).min(7) as usize;
        Ok(WireValue::new(WireType::Bit, full[skip..].to_vec()))
    }

    fn wire_type(&self) -> WireType {
        WireType::Bit
    }

    fn zero(&self) -> Value {
        Value::U64(0)
    }
}

impl fmt::Display for BitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bit({})", self.width)
    }
}

/// Parse an unsigned integer literal in decimal, hexadecimal (`0x`), or
/// binary (`0b`) notation.
fn parse_uint_literal(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()
    } else {
        s.parse().ok()
    }
}

/// Fold a big-endian byte sequence into a u64: each byte contributes 8
/// bits, most-significant byte first. More than 8 significant bytes is out
/// of range.
fn bytes_to_u64(b: &[u8]) -> Option<u64> {
    let trimmed = match b.iter().position(|&x| x != 0) {
        Some(first) => &b[first..],
        None => return Some(0),
    };
    if trimmed.len() > 8 {
        return None;
    }
    Some(trimmed.iter().fold(0u64, |acc, &x| (acc << 8) | x as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_bounds() {
        assert!(BitType::new(0).is_err());
        assert!(BitType::new(65).is_err());
        assert!(BitType::new(1).is_ok());
        assert!(BitType::new(64).is_ok());
    }

    #[test]
    fn test_bool_and_range() {
        let t = BitType::must_new(1);
        assert_eq!(t.convert(Value::Bool(true)).unwrap(), Value::U64(1));
        assert_eq!(t.convert(Value::Bool(false)).unwrap(), Value::U64(0));
        assert!(t.convert(Value::I64(2)).is_err());
    }

    #[test]
    fn test_byte_string_input() {
        let t = BitType::must_new(22);
        assert_eq!(
            t.convert(Value::Bytes(vec![0x24, 0x6b])).unwrap(),
            Value::U64(9323)
        );
        // Leading zero bytes are insignificant
        assert_eq!(
            t.convert(Value::Bytes(vec![0, 0, 0, 0, 0, 0, 0, 0, 0x01]))
                .unwrap(),
            Value::U64(1)
        );
    }

    #[test]
    fn test_string_bases() {
        let t = BitType::must_new(16);
        assert_eq!(t.convert(Value::Str("0xff".into())).unwrap(), Value::U64(255));
        assert_eq!(t.convert(Value::Str("0b101".into())).unwrap(), Value::U64(5));
        assert_eq!(t.convert(Value::Str("512".into())).unwrap(), Value::U64(512));
        assert!(t.convert(Value::Str("0x10000".into())).is_err());
        assert!(t.convert(Value::Str("bits".into())).is_err());
    }

    #[test]
    fn test_negative_needs_full_width() {
        assert!(BitType::must_new(63).convert(Value::I64(-1)).is_err());
        assert_eq!(
            BitType::must_new(64).convert(Value::I64(-1)).unwrap(),
            Value::U64(u64::MAX)
        );
    }

    #[test]
    fn test_compare_unsigned() {
        let t = BitType::must_new(64);
        assert_eq!(
            t.compare(&Value::I64(-1), &Value::U64(1)).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            t.compare(&Value::Null, &Value::U64(0)).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_sql_minimal_bytes() {
        let t = BitType::must_new(22);
        let wire = t.sql(&Value::U64(9323)).unwrap();
        assert_eq!(wire.wire_type, WireType::Bit);
        assert_eq!(wire.bytes, vec![0x24, 0x6b]);
        assert_eq!(t.sql(&Value::U64(0)).unwrap().bytes, vec![0]);
    }

    #[test]
    fn test_convert_idempotent() {
        let t = BitType::must_new(8);
        let once = t.convert(Value::Str("0x2a".into())).unwrap();
        assert_eq!(t.convert(once.clone()).unwrap(), once);
    }
}
