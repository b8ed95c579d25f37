//! Row representations: plain rows, streaming cursors, and pooled frames.

pub mod frame;
pub mod iter;
pub mod row;

pub use frame::{FramePool, RowFrame, FRAME_ARENA_SIZE, FRAME_VALUE_SLOTS};
pub use iter::{iter_to_rows, CancelToken, RowIter, RowsIter, ScopedRowIter};
pub use row::Row;
