//! Error types for the value-type core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Type construction errors
    #[error("Invalid type definition: {0}")]
    InvalidTypeDefinition(String),

    // Conversion errors
    #[error("Value {value} is not a valid {typ}")]
    ConvertFailed { value: String, typ: String },

    #[error("Out of range value {value} for type {typ}")]
    OutOfRange { value: String, typ: String },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Value {0} is not a tuple")]
    NotTuple(String),

    #[error("Value {0} is not an array")]
    NotArray(String),

    #[error("Tuple should contain {expected} column(s), but has {found}")]
    TupleArity { expected: usize, found: usize },

    // Wire encoding errors
    #[error("Tuples cannot be serialized to wire form")]
    TupleNotSupported,

    #[error("Serialization error: {0}")]
    Serialization(String),

    // System variable errors
    #[error("Unknown system variable: {0}")]
    UnknownSystemVariable(String),

    #[error("Invalid value '{value}' for system variable {name}")]
    InvalidSystemValue { name: String, value: String },
}
