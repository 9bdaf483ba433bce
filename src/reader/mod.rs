//! Record readers over a cursor.
//!
//! A reader advances its cursor one row per `read()` and decodes that row
//! into one record. `Ok(None)` means the rows are exhausted; once it has
//! been returned, further reads keep returning it without touching the
//! cursor or the decoder.
//!
//! A reader may own the statement its cursor came from. `close()` then
//! releases both, always attempting the second release even when the first
//! fails, and reports every failure.
//!
//! Two variants exist:
//!
//! - [`SelectReader`] over a `Creator<T>`: every row is a record, including
//!   rows whose decoded value is itself `None`.
//! - [`NonNullReader`] over a `Creator<Option<T>>`: a decoded `None` is a
//!   broken decoder and fails with [`ProtocolViolation::NullRecord`].

mod pushback;

pub use pushback::{PushbackReader, Records, each};

use crate::config::ReadConfig;
use crate::decode::Creator;
use crate::error::{AccessError, CleanupError, ProtocolViolation, Resource, RowError, RowResult};
use crate::source::{Cursor, Statement};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pull-style source of decoded records.
pub trait RecordReader<T> {
    /// Next record, or `None` once exhausted.
    fn read(&mut self) -> RowResult<Option<T>>;

    /// Release everything the reader owns. Idempotent.
    ///
    /// A failed release is reported once and not retried: later calls
    /// return `Ok(())` without touching the resources again.
    fn close(&mut self) -> Result<(), CleanupError>;
}

impl<T, R: RecordReader<T> + ?Sized> RecordReader<T> for &mut R {
    fn read(&mut self) -> RowResult<Option<T>> {
        (**self).read()
    }

    fn close(&mut self) -> Result<(), CleanupError> {
        (**self).close()
    }
}

impl<T, R: RecordReader<T> + ?Sized> RecordReader<T> for Box<R> {
    fn read(&mut self) -> RowResult<Option<T>> {
        (**self).read()
    }

    fn close(&mut self) -> Result<(), CleanupError> {
        (**self).close()
    }
}

/// A statement with its concrete type erased.
pub(crate) trait Release {
    fn release(&mut self) -> Result<(), AccessError>;
}

impl<S: Statement> Release for S {
    fn release(&mut self) -> Result<(), AccessError> {
        self.close()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Exhausted,
    Closed,
}

/// Cursor, optional owned statement and lifecycle state shared by both
/// reader variants.
struct Handles<C: Cursor> {
    cursor: C,
    statement: Option<Box<dyn Release>>,
    state: State,
    rows: u64,
    release_on_drop: bool,
}

impl<C: Cursor> Handles<C> {
    fn new(cursor: C, statement: Option<Box<dyn Release>>, config: &ReadConfig) -> Self {
        Self {
            cursor,
            statement,
            state: State::Open,
            rows: 0,
            release_on_drop: config.release_on_drop,
        }
    }

    /// Move to the next row. `false` once exhausted, without touching the
    /// cursor again.
    fn advance(&mut self) -> RowResult<bool> {
        match self.state {
            State::Closed => Err(ProtocolViolation::ReaderClosed.into()),
            State::Exhausted => Ok(false),
            State::Open => {
                if self.cursor.advance()? {
                    self.rows += 1;
                    Ok(true)
                } else {
                    self.state = State::Exhausted;
                    debug!(rows = self.rows, "reader exhausted");
                    Ok(false)
                }
            }
        }
    }

    fn close(&mut self) -> Result<(), CleanupError> {
        if self.state == State::Closed {
            return Ok(());
        }
        self.state = State::Closed;

        let mut cleanup = CleanupError::new();
        cleanup.record(Resource::Cursor, self.cursor.close());
        if let Some(statement) = self.statement.as_mut() {
            cleanup.record(Resource::Statement, statement.release());
        }
        debug!(
            rows = self.rows,
            owns_statement = self.statement.is_some(),
            "reader closed"
        );
        cleanup.into_result()
    }
}

impl<C: Cursor> Drop for Handles<C> {
    fn drop(&mut self) {
        if self.state != State::Closed && self.release_on_drop {
            if let Err(e) = self.close() {
                warn!(error = %e, "failed to release reader on drop");
            }
        }
    }
}

/// Reader over a `Creator<T>`.
pub struct SelectReader<T, C: Cursor> {
    decoder: Arc<dyn Creator<T>>,
    handles: Handles<C>,
    start: usize,
}

impl<T, C: Cursor> SelectReader<T, C> {
    /// Reader over a cursor whose statement the caller keeps.
    pub fn new(decoder: impl Creator<T> + 'static, cursor: C) -> Self {
        Self::from_parts(Arc::new(decoder), cursor, None, &ReadConfig::default())
    }

    /// Reader that also releases `statement` when closed.
    pub fn owning<S: Statement + 'static>(
        decoder: impl Creator<T> + 'static,
        cursor: C,
        statement: S,
    ) -> Self {
        Self::from_parts(
            Arc::new(decoder),
            cursor,
            Some(Box::new(statement)),
            &ReadConfig::default(),
        )
    }

    pub(crate) fn from_parts(
        decoder: Arc<dyn Creator<T>>,
        cursor: C,
        statement: Option<Box<dyn Release>>,
        config: &ReadConfig,
    ) -> Self {
        Self {
            decoder,
            handles: Handles::new(cursor, statement, config),
            start: config.start_column.get(),
        }
    }

    pub fn with_config(mut self, config: &ReadConfig) -> Self {
        self.start = config.start_column.get();
        self.handles.release_on_drop = config.release_on_drop;
        self
    }

    /// Rows consumed so far.
    pub fn rows_read(&self) -> u64 {
        self.handles.rows
    }

    pub fn is_exhausted(&self) -> bool {
        self.handles.state == State::Exhausted
    }

    pub fn is_closed(&self) -> bool {
        self.handles.state == State::Closed
    }

    pub fn owns_statement(&self) -> bool {
        self.handles.statement.is_some()
    }
}

impl<T, C: Cursor> RecordReader<T> for SelectReader<T, C> {
    fn read(&mut self) -> RowResult<Option<T>> {
        if !self.handles.advance()? {
            return Ok(None);
        }
        self.decoder.create(&self.handles.cursor, self.start).map(Some)
    }

    fn close(&mut self) -> Result<(), CleanupError> {
        self.handles.close()
    }
}

impl<T, C: Cursor> fmt::Debug for SelectReader<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectReader")
            .field("start", &self.start)
            .field("state", &self.handles.state)
            .field("rows", &self.handles.rows)
            .field("owns_statement", &self.owns_statement())
            .finish()
    }
}

/// Reader over a `Creator<Option<T>>` that treats a decoded `None` as a
/// decoder bug.
pub struct NonNullReader<T, C: Cursor> {
    decoder: Arc<dyn Creator<Option<T>>>,
    handles: Handles<C>,
    start: usize,
}

impl<T, C: Cursor> NonNullReader<T, C> {
    pub fn new(decoder: impl Creator<Option<T>> + 'static, cursor: C) -> Self {
        Self::from_parts(Arc::new(decoder), cursor, None, &ReadConfig::default())
    }

    pub fn owning<S: Statement + 'static>(
        decoder: impl Creator<Option<T>> + 'static,
        cursor: C,
        statement: S,
    ) -> Self {
        Self::from_parts(
            Arc::new(decoder),
            cursor,
            Some(Box::new(statement)),
            &ReadConfig::default(),
        )
    }

    pub(crate) fn from_parts(
        decoder: Arc<dyn Creator<Option<T>>>,
        cursor: C,
        statement: Option<Box<dyn Release>>,
        config: &ReadConfig,
    ) -> Self {
        Self {
            decoder,
            handles: Handles::new(cursor, statement, config),
            start: config.start_column.get(),
        }
    }

    pub fn with_config(mut self, config: &ReadConfig) -> Self {
        self.start = config.start_column.get();
        self.handles.release_on_drop = config.release_on_drop;
        self
    }

    pub fn rows_read(&self) -> u64 {
        self.handles.rows
    }

    pub fn is_exhausted(&self) -> bool {
        self.handles.state == State::Exhausted
    }

    pub fn is_closed(&self) -> bool {
        self.handles.state == State::Closed
    }

    pub fn owns_statement(&self) -> bool {
        self.handles.statement.is_some()
    }
}

impl<T, C: Cursor> RecordReader<T> for NonNullReader<T, C> {
    fn read(&mut self) -> RowResult<Option<T>> {
        if !self.handles.advance()? {
            return Ok(None);
        }
        match self.decoder.create(&self.handles.cursor, self.start)? {
            Some(record) => Ok(Some(record)),
            None => Err(ProtocolViolation::NullRecord {
                row: self.handles.rows,
            }
            .into()),
        }
    }

    fn close(&mut self) -> Result<(), CleanupError> {
        self.handles.close()
    }
}

impl<T, C: Cursor> fmt::Debug for NonNullReader<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonNullReader")
            .field("start", &self.start)
            .field("state", &self.handles.state)
            .field("rows", &self.handles.rows)
            .field("owns_statement", &self.owns_statement())
            .finish()
    }
}

/// Read every record, then close. A read failure is reported together with
/// any close failure that followed it.
pub fn drain<T, R: RecordReader<T>>(mut reader: R) -> RowResult<Vec<T>> {
    let mut records = Vec::new();
    let outcome = loop {
        match reader.read() {
            Ok(Some(record)) => records.push(record),
            Ok(None) => break Ok(records),
            Err(e) => break Err(e),
        }
    };
    finish(outcome, reader.close())
}

/// Merge the outcome of some work with the close that followed it.
pub(crate) fn finish<R>(outcome: RowResult<R>, closed: Result<(), CleanupError>) -> RowResult<R> {
    match outcome {
        Ok(value) => closed.map(|()| value).map_err(RowError::from),
        Err(e) => Err(e.with_cleanup(closed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{column, composer, required};
    use crate::error::ErrorKind;
    use crate::memory::{Fault, MemoryCursor, MemoryStatement};
    use crate::source::Row;
    use crate::value::Value;
    use std::num::NonZeroUsize;

    fn ints(values: &[i64]) -> MemoryCursor {
        MemoryCursor::new(values.iter().map(|v| vec![Value::Int(*v)]).collect())
    }

    #[test]
    fn test_reads_then_exhausts() {
        let mut reader = SelectReader::new(required::<i64>(), ints(&[1, 2]));
        assert_eq!(reader.read().unwrap(), Some(1));
        assert_eq!(reader.read().unwrap(), Some(2));
        assert_eq!(reader.read().unwrap(), None);
        assert!(reader.is_exhausted());
        assert_eq!(reader.rows_read(), 2);
    }

    #[test]
    fn test_exhaustion_is_sticky() {
        let cursor = ints(&[]);
        let probe = cursor.probe();
        let mut reader = SelectReader::new(required::<i64>(), cursor);

        for _ in 0..3 {
            assert_eq!(reader.read().unwrap(), None);
        }
        assert_eq!(probe.advances(), 1);
        assert!(probe.touched().is_empty());
    }

    #[test]
    fn test_null_valued_record_is_not_exhaustion() {
        let cursor = MemoryCursor::new(vec![vec![Value::Null], vec![Value::Int(3)]]);
        let mut reader = SelectReader::new(column::<i64>(), cursor);
        assert_eq!(reader.read().unwrap(), Some(None));
        assert_eq!(reader.read().unwrap(), Some(Some(3)));
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_non_null_reader_rejects_null_record() {
        let cursor = MemoryCursor::new(vec![vec![Value::Int(1)], vec![Value::Null]]);
        let mut reader = NonNullReader::new(column::<i64>(), cursor);
        assert_eq!(reader.read().unwrap(), Some(1));

        let err = reader.read().unwrap_err();
        assert!(matches!(
            err,
            RowError::Protocol(ProtocolViolation::NullRecord { row: 2 })
        ));
    }

    #[test]
    fn test_start_column() {
        let cursor = MemoryCursor::new(vec![vec![Value::Int(1), Value::Int(2)]]);
        let config = ReadConfig::new().start_column(NonZeroUsize::new(2).unwrap());
        let mut reader = SelectReader::new(required::<i64>(), cursor).with_config(&config);
        assert_eq!(reader.read().unwrap(), Some(2));
    }

    #[test]
    fn test_decode_failure_surfaces() {
        let cursor = MemoryCursor::new(vec![vec![Value::Text("x".to_string())]]);
        let mut reader = SelectReader::new(required::<i64>(), cursor);
        assert_eq!(reader.read().unwrap_err().kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_read_after_close() {
        let mut reader = SelectReader::new(required::<i64>(), ints(&[1]));
        reader.close().unwrap();
        assert!(matches!(
            reader.read().unwrap_err(),
            RowError::Protocol(ProtocolViolation::ReaderClosed)
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let statement = MemoryStatement::new(vec![]);
        let probe = statement.probe();
        let mut reader = SelectReader::owning(required::<i64>(), ints(&[]), statement);

        reader.close().unwrap();
        reader.close().unwrap();
        assert_eq!(probe.statement_closes(), 1);
    }

    #[test]
    fn test_close_without_statement() {
        let cursor = ints(&[]);
        let probe = cursor.probe();
        let mut reader = SelectReader::new(required::<i64>(), cursor);
        assert!(!reader.owns_statement());

        reader.close().unwrap();
        assert_eq!(probe.cursor_closes(), 1);
        assert_eq!(probe.statement_closes(), 0);
    }

    #[test]
    fn test_close_attempts_statement_after_cursor_failure() {
        let statement = MemoryStatement::new(vec![]);
        let probe = statement.probe();
        let cursor = ints(&[]).with_fault(Fault::CursorClose);
        let mut reader = SelectReader::owning(required::<i64>(), cursor, statement);

        let err = reader.close().unwrap_err();
        assert!(err.failed(Resource::Cursor));
        assert!(!err.failed(Resource::Statement));
        assert_eq!(probe.statement_closes(), 1);
    }

    #[test]
    fn test_failed_release_not_retried() {
        let statement = MemoryStatement::new(vec![]).with_fault(Fault::StatementClose);
        let probe = statement.probe();
        let mut reader = SelectReader::owning(required::<i64>(), ints(&[]), statement);

        let err = reader.close().unwrap_err();
        assert!(err.failed(Resource::Statement));
        assert!(reader.close().is_ok());
        assert!(reader.is_closed());
        assert_eq!(probe.statement_closes(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let statement = MemoryStatement::new(vec![]);
        let probe = statement.probe();
        let cursor = ints(&[1]).with_probe(probe.clone());
        {
            let _reader = SelectReader::owning(required::<i64>(), cursor, statement);
        }
        assert_eq!(probe.cursor_closes(), 1);
        assert_eq!(probe.statement_closes(), 1);
    }

    #[test]
    fn test_drop_without_release() {
        let cursor = ints(&[1]);
        let probe = cursor.probe();
        {
            let config = ReadConfig::new().release_on_drop(false);
            let _reader = SelectReader::new(required::<i64>(), cursor).with_config(&config);
        }
        assert_eq!(probe.cursor_closes(), 0);
    }

    #[test]
    fn test_drain_closes() {
        let cursor = ints(&[4, 5, 6]);
        let probe = cursor.probe();
        let records = drain(SelectReader::new(required::<i64>(), cursor)).unwrap();
        assert_eq!(records, vec![4, 5, 6]);
        assert_eq!(probe.cursor_closes(), 1);
    }

    #[test]
    fn test_drain_keeps_read_failure_and_cleanup() {
        let cursor = ints(&[1]).with_fault(Fault::Value).with_fault(Fault::CursorClose);
        let err = drain(SelectReader::new(required::<i64>(), cursor)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Access);
        assert!(err.cleanup().is_some_and(|c| c.failed(Resource::Cursor)));
    }

    #[test]
    fn test_decoder_sees_current_row() {
        let decoder = composer(2, |row: &dyn Row, at: usize| {
            Ok(format!("{}-{}", row.value(at)?, row.value(at + 1)?))
        });
        let cursor = MemoryCursor::new(vec![vec![Value::Int(1), Value::from("a")]]);
        let mut reader = SelectReader::new(decoder, cursor);
        assert_eq!(reader.read().unwrap(), Some("1-a".to_string()));
    }
}
