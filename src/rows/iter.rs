//! Row iterators: single-consumer cursors over row sequences.

use crate::error::Result;
use crate::rows::Row;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A stateful, single-consumer cursor producing rows.
///
/// `next` yields each row of the underlying sequence in order, then
/// `Ok(None)` exactly once per pass; the end-of-sequence signal is a
/// sentinel, not a failure. `close` must be called exactly once per
/// consumer regardless of exit path, and repeated closes are safe.
pub trait RowIter {
    fn next(&mut self) -> Result<Option<Row>>;
    fn close(&mut self) -> Result<()>;
}

/// Iterator over an in-memory row sequence.
pub struct RowsIter {
    rows: std::vec::IntoIter<Row>,
}

impl RowsIter {
    pub fn new(rows: Vec<Row>) -> Self {
        RowsIter {
            rows: rows.into_iter(),
        }
    }
}

impl RowIter for RowsIter {
    fn next(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.next())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Cooperative cancellation handle shared between an execution scope and
/// the iterators running inside it.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Wraps an iterator in a cancellable execution scope. Cancellation is
/// checked at the start of each `next`, bounding cancellation latency to
/// one element's production time.
pub struct ScopedRowIter<I> {
    inner: I,
    token: CancelToken,
}

impl<I: RowIter> ScopedRowIter<I> {
    pub fn new(inner: I, token: CancelToken) -> Self {
        ScopedRowIter { inner, token }
    }
}

impl<I: RowIter> RowIter for ScopedRowIter<I> {
    fn next(&mut self) -> Result<Option<Row>> {
        if self.token.is_cancelled() {
            return Ok(None);
        }
        self.inner.next()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

/// Drain an iterator to exhaustion, always closing it. The first real
/// error wins: a mid-stream failure is returned and any close-time failure
/// is discarded; otherwise close's outcome is returned.
pub fn iter_to_rows(iter: &mut dyn RowIter) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let result = loop {
        match iter.next() {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    let close_result = iter.close();
    result?;
    close_result?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Value;

    fn three_rows() -> Vec<Row> {
        (0..3).map(|i| Row::new(&[Value::I64(i)])).collect()
    }

    #[test]
    fn test_yields_rows_then_end_once() {
        let mut iter = RowsIter::new(three_rows());
        for i in 0..3 {
            assert_eq!(iter.next().unwrap().unwrap()[0], Value::I64(i));
        }
        assert_eq!(iter.next().unwrap(), None);
    }

    #[test]
    fn test_double_close_is_safe() {
        let mut iter = RowsIter::new(three_rows());
        iter.close().unwrap();
        iter.close().unwrap();
    }

    #[test]
    fn test_drain_collects_and_closes() {
        let mut iter = RowsIter::new(three_rows());
        let rows = iter_to_rows(&mut iter).unwrap();
        assert_eq!(rows.len(), 3);
    }

    struct FailingIter {
        yielded: bool,
        close_calls: usize,
    }

    impl RowIter for FailingIter {
        fn next(&mut self) -> Result<Option<Row>> {
            if self.yielded {
                Err(Error::Serialization("stream broke".into()))
            } else {
                self.yielded = true;
                Ok(Some(Row::new(&[Value::I64(0)])))
            }
        }

        fn close(&mut self) -> Result<()> {
            self.close_calls += 1;
            Err(Error::Serialization("close also broke".into()))
        }
    }

    #[test]
    fn test_drain_returns_stream_error_over_close_error() {
        let mut iter = FailingIter {
            yielded: false,
            close_calls: 0,
        };
        let err = iter_to_rows(&mut iter).unwrap_err();
        assert_eq!(err, Error::Serialization("stream broke".into()));
        assert_eq!(iter.close_calls, 1);
    }

    #[test]
    fn test_cancelled_scope_ends_immediately() {
        let token = CancelToken::new();
        token.cancel();
        let mut iter = ScopedRowIter::new(RowsIter::new(three_rows()), token);
        assert_eq!(iter.next().unwrap(), None);
    }

    #[test]
    fn test_cancel_mid_stream() {
        let token = CancelToken::new();
        let mut iter = ScopedRowIter::new(RowsIter::new(three_rows()), token.clone());
        assert!(iter.next().unwrap().is_some());
        token.cancel();
        assert_eq!(iter.next().unwrap(), None);
    }
}
