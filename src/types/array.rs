//! Homogeneous array type and the lazy value generators that feed it.

use crate::error::{Error, Result};
use crate::types::{compare_nulls, SqlType, TypeRef, Value, WireType, WireValue};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// A finite, one-shot lazy sequence of values with explicit release.
///
/// End-of-sequence is `Ok(None)`, a sentinel rather than a failure.
/// Generators are single-consumer and not restartable; recreate one to
/// restart. `close` must be safe to call more than once.
pub trait Generator {
    fn next(&mut self) -> Result<Option<Value>>;
    fn close(&mut self) -> Result<()>;
}

/// Generator over an in-memory sequence of values.
pub struct ValuesGenerator {
    values: VecDeque<Value>,
}

impl ValuesGenerator {
    pub fn new(values: Vec<Value>) -> Self {
        ValuesGenerator {
            values: values.into(),
        }
    }
}

impl Generator for ValuesGenerator {
    fn next(&mut self) -> Result<Option<Value>> {
        Ok(self.values.pop_front())
    }

    fn close(&mut self) -> Result<()> {
        self.values.clear();
        Ok(())
    }
}

/// Array of values sharing one element type.
#[derive(Clone)]
pub struct ArrayType {
    element: TypeRef,
}

impl ArrayType {
    pub fn new(element: TypeRef) -> Self {
        ArrayType { element }
    }

    pub fn element(&self) -> &TypeRef {
        &self.element
    }

    fn to_elements(&self, v: &Value) -> Result<Vec<Value>> {
        match v {
            Value::List(items) => items
                .iter()
                .map(|item| self.element.convert(item.clone()))
                .collect(),
            other => Err(Error::NotArray(format!("{:?}", other))),
        }
    }

    /// Drain a generator eagerly, converting each yielded value. The
    /// generator is released whether or not the drain succeeds.
    pub fn convert_generator(&self, gen: &mut dyn Generator) -> Result<Value> {
        let result = self.drain(gen);
        let close_result = gen.close();
        match result {
            Ok(values) => {
                close_result?;
                Ok(Value::List(values))
            }
            Err(e) => Err(e),
        }
    }

    fn drain(&self, gen: &mut dyn Generator) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while let Some(v) = gen.next()? {
            values.push(self.element.convert(v)?);
        }
        Ok(values)
    }
}

impl SqlType for ArrayType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        let av = self.to_elements(a)?;
        let bv = self.to_elements(b)?;
        // Shorter sequences sort first regardless of content
        match av.len().cmp(&bv.len()) {
            Ordering::Equal => {}
            ord => return Ok(ord),
        }
        for (x, y) in av.iter().zip(bv.iter()) {
            match self.element.compare(x, y)? {
                Ordering::Equal => continue,
                ord => return Ok(ord),
            }
        }
        Ok(Ordering::Equal)
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::List(self.to_elements(&v)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(self.clone())
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let elements = self.to_elements(v)?;
        let json = serde_json::Value::Array(
            elements.iter().map(value_to_json).collect::<Result<_>>()?,
        );
        let bytes = serde_json::to_vec(&json).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(WireValue::new(WireType::Json, bytes))
    }

    fn wire_type(&self) -> WireType {
        WireType::Json
    }

    fn zero(&self) -> Value {
        Value::List(Vec::new())
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array({})", self.element)
    }
}

impl fmt::Debug for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayType({})", self.element)
    }
}

/// Structural JSON encoding for a normalized value. Numeric and boolean
/// values take their natural JSON forms; decimals and timespans their
/// canonical strings; bytes hex-encode.
pub(crate) fn value_to_json(v: &Value) -> Result<serde_json::Value> {
    use serde_json::json;
    Ok(match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::F32(f) => json!(f),
        Value::F64(f) => json!(f),
        Value::Decimal(d) => json!(d.to_string()),
        Value::Str(s) => json!(s),
        Value::Bytes(b) => json!(hex::encode(b)),
        Value::Timespan(t) => json!(t.to_string()),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect::<Result<_>>()?)
        }
        other => {
            let i = other.to_i128()?;
            match i64::try_from(i) {
                Ok(i) => json!(i),
                Err(_) => json!(u64::try_from(i).map_err(|_| Error::Serialization(
                    format!("integer {} does not fit a JSON number", i)
                ))?),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumberType;

    fn int_array() -> ArrayType {
        ArrayType::new(Arc::new(NumberType::INT64))
    }

    #[test]
    fn test_convert_elementwise() {
        let t = int_array();
        let v = t
            .convert(Value::List(vec![Value::I8(1), Value::Str("2".into())]))
            .unwrap();
        assert_eq!(v, Value::List(vec![Value::I64(1), Value::I64(2)]));
        assert!(t.convert(Value::I64(1)).is_err());
        assert!(t
            .convert(Value::List(vec![Value::Str("x".into())]))
            .is_err());
    }

    #[test]
    fn test_length_dominates_content() {
        let t = int_array();
        let short = Value::List(vec![Value::I64(1), Value::I64(2)]);
        let long = Value::List(vec![Value::I64(1), Value::I64(2), Value::I64(3)]);
        assert_eq!(t.compare(&short, &long).unwrap(), Ordering::Less);
        assert_eq!(t.compare(&long, &short).unwrap(), Ordering::Greater);
        // Content only matters at equal lengths
        let nines = Value::List(vec![Value::I64(9), Value::I64(9)]);
        assert_eq!(t.compare(&nines, &long).unwrap(), Ordering::Less);
        assert_eq!(t.compare(&short, &nines).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_generator_drain() {
        let t = int_array();
        let mut gen = ValuesGenerator::new(vec![Value::I64(1), Value::Str("2".into())]);
        let v = t.convert_generator(&mut gen).unwrap();
        assert_eq!(v, Value::List(vec![Value::I64(1), Value::I64(2)]));
        // One-shot: the generator is exhausted and released
        assert_eq!(gen.next().unwrap(), None);
    }

    #[test]
    fn test_generator_released_on_failure() {
        let t = int_array();
        let mut gen =
            ValuesGenerator::new(vec![Value::Str("bad".into()), Value::I64(1)]);
        assert!(t.convert_generator(&mut gen).is_err());
        assert_eq!(gen.next().unwrap(), None);
        // Repeated close is safe
        gen.close().unwrap();
        gen.close().unwrap();
    }

    #[test]
    fn test_json_wire_encoding() {
        let t = int_array();
        let wire = t
            .sql(&Value::List(vec![Value::I64(1), Value::I64(2)]))
            .unwrap();
        assert_eq!(wire.wire_type, WireType::Json);
        assert_eq!(wire.bytes, b"[1,2]");

        let nested = ArrayType::new(Arc::new(int_array()));
        let wire = nested
            .sql(&Value::List(vec![Value::List(vec![Value::I64(3)])]))
            .unwrap();
        assert_eq!(wire.bytes, b"[[3]]");
    }

    #[test]
    fn test_null_handling() {
        let t = int_array();
        assert_eq!(t.convert(Value::Null).unwrap(), Value::Null);
        assert!(t.sql(&Value::Null).unwrap().is_null());
        assert_eq!(
            t.compare(&Value::Null, &Value::List(vec![])).unwrap(),
            Ordering::Less
        );
    }
}
