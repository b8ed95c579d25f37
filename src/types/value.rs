//! The dynamic SQL value representation
//!
//! Every value flowing through the engine is one of these variants. Types
//! (`SqlType` implementations) validate and normalize raw `Value`s; rows
//! store them; the wire layer serializes them.

use crate::error::{Error, Result};
use crate::types::timespan::Timespan;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamically typed SQL value.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    // Integer types
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    // Float types
    F32(f32),
    F64(f64),
    // Exact fixed-point decimal
    Decimal(BigDecimal),
    // Strings and raw bytes
    Str(String),
    Bytes(Vec<u8>),
    // Signed time interval with microsecond resolution
    Timespan(Timespan),
    // Homogeneous sequence (arrays) or positional sequence (tuples)
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is any integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::U8(_)
                | Value::U16(_)
                | Value::U32(_)
                | Value::U64(_)
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Value::F32(_) | Value::F64(_) | Value::Decimal(_))
    }

    /// Widen any integer variant to i128 for lossless comparison
    pub fn to_i128(&self) -> Result<i128> {
        match self {
            Value::I8(v) => Ok(*v as i128),
            Value::I16(v) => Ok(*v as i128),
            Value::I32(v) => Ok(*v as i128),
            Value::I64(v) => Ok(*v as i128),
            Value::U8(v) => Ok(*v as i128),
            Value::U16(v) => Ok(*v as i128),
            Value::U32(v) => Ok(*v as i128),
            Value::U64(v) => Ok(*v as i128),
            _ => Err(Error::TypeMismatch {
                expected: "integer".into(),
                found: format!("{:?}", self),
            }),
        }
    }

    /// Lossy widening of any numeric variant to f64
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Value::F32(v) => Ok(*v as f64),
            Value::F64(v) => Ok(*v),
            Value::Decimal(d) => {
                use bigdecimal::ToPrimitive;
                d.to_f64().ok_or_else(|| Error::ConvertFailed {
                    value: d.to_string(),
                    typ: "DOUBLE".into(),
                })
            }
            v if v.is_integer() => Ok(v.to_i128()? as f64),
            _ => Err(Error::TypeMismatch {
                expected: "numeric".into(),
                found: format!("{:?}", self),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I8(i) => write!(f, "{}", i),
            Value::I16(i) => write!(f, "{}", i),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::U8(i) => write!(f, "{}", i),
            Value::U16(i) => write!(f, "{}", i),
            Value::U32(i) => write!(f, "{}", i),
            Value::U64(i) => write!(f, "{}", i),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Bytes(b) => write!(f, "x'{}'", hex::encode(b)),
            Value::Timespan(t) => write!(f, "{}", t),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::I8(i) => write!(f, "I8({})", i),
            Value::I16(i) => write!(f, "I16({})", i),
            Value::I32(i) => write!(f, "I32({})", i),
            Value::I64(i) => write!(f, "I64({})", i),
            Value::U8(i) => write!(f, "U8({})", i),
            Value::U16(i) => write!(f, "U16({})", i),
            Value::U32(i) => write!(f, "U32({})", i),
            Value::U64(i) => write!(f, "U64({})", i),
            Value::F32(v) => write!(f, "F32({})", v),
            Value::F64(v) => write!(f, "F64({})", v),
            Value::Decimal(d) => write!(f, "Decimal({})", d),
            Value::Str(s) => write!(f, "Str({})", s),
            Value::Bytes(b) => write!(f, "Bytes({})", hex::encode(b)),
            Value::Timespan(t) => write!(f, "Timespan({})", t),
            Value::List(l) => f.debug_list().entries(l.iter()).finish(),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::I8(i) => i.hash(state),
            Value::I16(i) => i.hash(state),
            Value::I32(i) => i.hash(state),
            Value::I64(i) => i.hash(state),
            Value::U8(i) => i.hash(state),
            Value::U16(i) => i.hash(state),
            Value::U32(i) => i.hash(state),
            Value::U64(i) => i.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Timespan(t) => t.hash(state),
            Value::List(l) => l.hash(state),
        }
    }
}

impl Eq for Value {}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        match (self, other) {
            // NULL orders below every non-null value, engine-wide
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,

            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),

            (a, b) if a.is_integer() && b.is_integer() => match (a.to_i128(), b.to_i128()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => Ordering::Equal,
            },
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => match (a.to_f64(), b.to_f64()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },

            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Timespan(a), Value::Timespan(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => a.cmp(b),

            // Different kinds have no meaningful order; treat as equal so
            // the ordering stays total
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widening() {
        assert!(Value::I8(10).is_integer());
        assert!(Value::U64(1000).is_integer());
        assert!(!Value::Str("not integer".into()).is_integer());

        assert_eq!(Value::I8(-10).to_i128().unwrap(), -10i128);
        assert_eq!(Value::U32(1000).to_i128().unwrap(), 1000i128);
    }

    #[test]
    fn test_null_orders_lowest() {
        assert!(Value::Null < Value::I64(i64::MIN));
        assert!(Value::Null < Value::Str(String::new()));
        assert_eq!(Value::Null.cmp(&Value::Null), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_cross_width_integer_compare() {
        assert_eq!(
            Value::I8(5).cmp(&Value::U64(5)),
            std::cmp::Ordering::Equal
        );
        assert!(Value::I16(-1) < Value::U8(0));
    }
}
