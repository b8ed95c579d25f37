//! Value types and row representation for a relational query engine.
//!
//! This crate is the type-system core every other engine component builds
//! on: it defines how SQL values are represented in memory, ordered,
//! converted between external encodings, and serialized to the wire.
//!
//! - [`types`]: the [`SqlType`](types::SqlType) contract and its concrete
//!   implementations (decimals, bit-fields, time intervals, arrays,
//!   tuples, primitive numbers, and bounded system scalars).
//! - [`rows`]: the [`Row`](rows::Row) tuple, single-consumer
//!   [`RowIter`](rows::RowIter) cursors, and the pooled
//!   [`RowFrame`](rows::RowFrame) buffer for allocation-free streaming.

pub mod error;
pub mod rows;
pub mod types;

pub use error::{Error, Result};
pub use rows::{FramePool, Row, RowFrame, RowIter, RowsIter};
pub use types::{SqlType, TypeRef, Value, WireType, WireValue};
