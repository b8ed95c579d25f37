//! Rows: ordered, schema-independent tuples of values.

use crate::error::Result;
use crate::types::{Column, Value};

/// A fixed-length ordered sequence of values. Construction copies its
/// inputs; a row never aliases caller-owned backing storage.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: &[Value]) -> Self {
        Row {
            values: values.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Value> {
        self.values.get(i)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// An independent duplicate of this row.
    pub fn copy(&self) -> Row {
        self.clone()
    }

    /// Concatenate two rows into a new one, this row's elements first.
    pub fn append(&self, other: &Row) -> Row {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Row { values }
    }

    /// Element-wise equality under the schema's column types. A length
    /// mismatch among either row or the schema is "not equal", not an
    /// error; a conversion failure inside a comparison propagates.
    pub fn equals(&self, other: &Row, schema: &[Column]) -> Result<bool> {
        if self.len() != other.len() || self.len() != schema.len() {
            return Ok(false);
        }
        for ((a, b), col) in self.iter().zip(other.iter()).zip(schema.iter()) {
            if col.ty.compare(a, b)? != std::cmp::Ordering::Equal {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row { values }
    }
}

impl std::ops::Index<usize> for Row {
    type Output = Value;

    fn index(&self, i: usize) -> &Value {
        &self.values[i]
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DecimalType, NumberType};
    use std::sync::Arc;

    fn int_schema(n: usize) -> Vec<Column> {
        (0..n)
            .map(|i| Column::new(format!("c{}", i), Arc::new(NumberType::INT64), true))
            .collect()
    }

    #[test]
    fn test_new_copies_inputs() {
        let mut source = vec![Value::I64(1), Value::I64(2)];
        let row = Row::new(&source);
        source[0] = Value::I64(99);
        assert_eq!(row[0], Value::I64(1));
    }

    #[test]
    fn test_append_keeps_order() {
        let left = Row::new(&[Value::I64(1)]);
        let right = Row::new(&[Value::I64(2), Value::I64(3)]);
        let joined = left.append(&right);
        assert_eq!(
            joined.values(),
            &[Value::I64(1), Value::I64(2), Value::I64(3)]
        );
        // Inputs are untouched
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 2);
    }

    #[test]
    fn test_equals_under_schema() {
        let schema = int_schema(2);
        let a = Row::new(&[Value::I64(1), Value::I8(2)]);
        let b = Row::new(&[Value::I8(1), Value::I64(2)]);
        assert!(a.equals(&b, &schema).unwrap());

        let c = Row::new(&[Value::I64(1), Value::I64(3)]);
        assert!(!a.equals(&c, &schema).unwrap());
    }

    #[test]
    fn test_length_mismatch_is_not_equal() {
        let schema = int_schema(2);
        let a = Row::new(&[Value::I64(1), Value::I64(2)]);
        let short = Row::new(&[Value::I64(1)]);
        assert!(!a.equals(&short, &schema).unwrap());
        assert!(!a.equals(&a, &int_schema(3)).unwrap());
    }

    #[test]
    fn test_equals_propagates_conversion_failure() {
        let schema = vec![Column::new(
            "d",
            Arc::new(DecimalType::must_new(5, 2)),
            true,
        )];
        let a = Row::new(&[Value::Str("oops".into())]);
        assert!(a.equals(&a, &schema).is_err());
    }
}
