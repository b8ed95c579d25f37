//! Tuple type: a fixed-arity positional sequence, one element type per
//! position. Tuples exist for expression contexts (IN lists, row
//! comparisons) and are never a valid wire result type.

use crate::error::{Error, Result};
use crate::types::{compare_nulls, SqlType, TypeRef, Value, WireType, WireValue};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct TupleType {
    elements: Vec<TypeRef>,
}

impl TupleType {
    pub fn new(elements: Vec<TypeRef>) -> Self {
        TupleType { elements }
    }

    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &[TypeRef] {
        &self.elements
    }

    fn to_positions(&self, v: &Value) -> Result<Vec<Value>> {
        let items = match v {
            Value::List(items) => items,
            other => return Err(Error::NotTuple(format!("{:?}", other))),
        };
        if items.len() != self.elements.len() {
            return Err(Error::TupleArity {
                expected: self.elements.len(),
                found: items.len(),
            });
        }
        items
            .iter()
            .zip(self.elements.iter())
            .map(|(item, ty)| ty.convert(item.clone()))
            .collect()
    }
}

impl SqlType for TupleType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        let av = self.to_positions(a)?;
        let bv = self.to_positions(b)?;
        for ((x, y), ty) in av.iter().zip(bv.iter()).zip(self.elements.iter()) {
            match ty.compare(x, y)? {
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
        Ok(Value::List(self.to_positions(&v)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(self.clone())
    }

    fn sql(&self, _v: &Value) -> Result<WireValue> {
        Err(Error::TupleNotSupported)
    }

    fn wire_type(&self) -> WireType {
        WireType::Expression
    }

    fn zero(&self) -> Value {
        Value::List(self.elements.iter().map(|ty| ty.zero()).collect())
    }
}

impl fmt::Display for TupleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tuple(")?;
        for (i, ty) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for TupleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TupleType({})", self)
    }
}
