//! The SQL type system: the `SqlType` contract and its concrete types.

pub mod array;
pub mod bit;
pub mod decimal;
pub mod number;
pub mod schema;
pub mod system;
pub mod timespan;
pub mod tuple;
pub mod value;

pub use array::{ArrayType, Generator, ValuesGenerator};
pub use bit::BitType;
pub use decimal::DecimalType;
pub use number::NumberType;
pub use schema::Column;
pub use system::{
    SystemBoolType, SystemDoubleType, SystemIntType, SystemScalarType, SystemStrType,
    SystemUintType, SystemVariable, SystemVariableRegistry,
};
pub use timespan::{Timespan, TimespanType};
pub use tuple::TupleType;
pub use value::Value;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a type descriptor. Types are immutable and stateless,
/// so one instance may be referenced from any number of threads.
pub type TypeRef = Arc<dyn SqlType>;

/// Wire-protocol type tags. One of these accompanies every serialized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireType {
    Null,
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
    Decimal,
    Bit,
    Time,
    VarChar,
    Blob,
    Json,
    /// Tuples carry this tag but are rejected by every wire writer.
    Expression,
}

/// A value serialized for client transport: a wire type tag plus the
/// encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireValue {
    pub wire_type: WireType,
    pub bytes: Vec<u8>,
}

impl WireValue {
    pub fn new(wire_type: WireType, bytes: Vec<u8>) -> Self {
        WireValue { wire_type, bytes }
    }

    /// The distinguished NULL wire value, used for nil regardless of the
    /// declared column type.
    pub fn null() -> Self {
        WireValue {
            wire_type: WireType::Null,
            bytes: Vec::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.wire_type == WireType::Null
    }
}

/// The capability set every concrete value type implements.
///
/// Implementations are immutable descriptor-plus-behavior bundles: a
/// `DecimalType` knows its precision and scale, how to normalize raw
/// values into that domain, how to order them, and how to serialize them
/// for the wire. All methods are safe under unlimited concurrent readers.
pub trait SqlType: fmt::Display + fmt::Debug + Send + Sync {
    /// Total order over normalized values. Both operands are converted
    /// first; a conversion failure propagates unchanged.
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering>;

    /// Validate and normalize a raw value into this type's domain.
    ///
    /// Deterministic and idempotent: `convert(convert(v))` equals
    /// `convert(v)` for any accepted `v`.
    fn convert(&self, v: Value) -> Result<Value>;

    /// Escalate a conversion failure to a panic. Reserved for call sites
    /// holding a precondition that conversion cannot fail; never apply to
    /// unvalidated external input.
    fn must_convert(&self, v: Value) -> Value {
        match self.convert(v) {
            Ok(v) => v,
            Err(e) => panic!("must_convert on {}: {}", self, e),
        }
    }

    /// The widened type used when combining values of this type in
    /// arithmetic or expression contexts.
    fn promote(&self) -> TypeRef;

    /// Serialize a normalized value for wire output.
    fn sql(&self, v: &Value) -> Result<WireValue>;

    /// The wire type tag this type declares for its column metadata.
    fn wire_type(&self) -> WireType;

    /// The type's default value.
    fn zero(&self) -> Value;
}

/// Handles the NULL cases shared by every type's `compare`: NULL orders
/// below all non-null values, and NULL equals NULL. Returns `None` when
/// neither operand is null.
pub(crate) fn compare_nulls(a: &Value, b: &Value) -> Option<Ordering> {
    match (a.is_null(), b.is_null()) {
        (true, true) => Some(Ordering::Equal),
        (true, false) => Some(Ordering::Less),
        (false, true) => Some(Ordering::Greater),
        (false, false) => None,
    }
}
