//! Reader exhaustion and release behavior.

mod common;

use pretty_assertions::assert_eq;
use rowkit::memory::{Fault, MemoryCursor, MemoryStatement};
use rowkit::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

fn rows(ids: &[i64]) -> Vec<Vec<Value>> {
    ids.iter().map(|id| vec![Value::Int(*id), Value::from("x")]).collect()
}

fn counting(calls: Rc<Cell<usize>>) -> impl Composer<i64> {
    composer(2, move |row: &dyn Row, at: usize| {
        calls.set(calls.get() + 1);
        required::<i64>().create(row, at)
    })
}

#[test]
fn test_exhaustion_never_decodes_again() -> RowResult<()> {
    common::init_tracing();
    let calls = Rc::new(Cell::new(0));
    let cursor = MemoryCursor::new(rows(&[1, 2]));
    let probe = cursor.probe();
    let mut reader = SelectReader::new(counting(calls.clone()), cursor);

    assert_eq!(reader.read()?, Some(1));
    assert_eq!(reader.read()?, Some(2));
    for _ in 0..5 {
        assert_eq!(reader.read()?, None);
    }
    assert_eq!(calls.get(), 2);
    assert_eq!(probe.advances(), 3);

    reader.close()?;
    Ok(())
}

#[test]
fn test_close_releases_cursor_and_statement() {
    common::init_tracing();
    let statement = MemoryStatement::new(vec![]);
    let probe = statement.probe();
    let cursor = MemoryCursor::new(rows(&[1])).with_probe(probe.clone());

    let mut reader = SelectReader::owning(counting(Rc::default()), cursor, statement);
    reader.close().unwrap();

    assert_eq!(probe.cursor_closes(), 1);
    assert_eq!(probe.statement_closes(), 1);
    assert!(reader.is_closed());
}

#[test]
fn test_cursor_release_failure_still_releases_statement() {
    common::init_tracing();
    let statement = MemoryStatement::new(vec![]);
    let probe = statement.probe();
    let cursor = MemoryCursor::new(vec![])
        .with_probe(probe.clone())
        .with_fault(Fault::CursorClose);

    let mut reader = SelectReader::owning(counting(Rc::default()), cursor, statement);
    let err = reader.close().unwrap_err();

    assert_eq!(err.failures().len(), 1);
    assert!(err.failed(Resource::Cursor));
    assert_eq!(probe.statement_closes(), 1);
}

#[test]
fn test_statement_release_failure_reported() {
    common::init_tracing();
    let statement = MemoryStatement::new(vec![]).with_fault(Fault::StatementClose);
    let probe = statement.probe();
    let cursor = MemoryCursor::new(vec![]).with_probe(probe.clone());

    let mut reader = SelectReader::owning(counting(Rc::default()), cursor, statement);
    let err = reader.close().unwrap_err();

    assert_eq!(err.failures().len(), 1);
    assert!(err.failed(Resource::Statement));
    assert_eq!(probe.cursor_closes(), 1);
}

#[test]
fn test_both_release_failures_reported() {
    common::init_tracing();
    let statement = MemoryStatement::new(vec![]).with_fault(Fault::StatementClose);
    let probe = statement.probe();
    let cursor = MemoryCursor::new(vec![])
        .with_probe(probe.clone())
        .with_fault(Fault::CursorClose);

    let mut reader = SelectReader::owning(counting(Rc::default()), cursor, statement);
    let err = reader.close().unwrap_err();

    assert!(err.failed(Resource::Cursor));
    assert!(err.failed(Resource::Statement));
    assert_eq!(
        err.to_string(),
        "failed to release cursor: injected CursorClose fault; \
         failed to release statement: injected StatementClose fault"
    );
    assert_eq!(probe.cursor_closes(), 1);
    assert_eq!(probe.statement_closes(), 1);

    // Already closed: nothing is released twice.
    assert!(reader.close().is_ok());
    assert_eq!(probe.statement_closes(), 1);
}

#[test]
fn test_access_failure_during_read() {
    common::init_tracing();
    let cursor = MemoryCursor::new(rows(&[1])).with_fault(Fault::Advance);
    let mut reader = SelectReader::new(counting(Rc::default()), cursor);

    let err = reader.read().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Access);
    assert_eq!(
        err.to_string(),
        "database operation failed: injected Advance fault"
    );
}

#[test]
fn test_non_null_reader_flags_broken_decoder() {
    common::init_tracing();
    let cursor = MemoryCursor::from_json("[[1], [null], [3]]").unwrap();
    let mut reader = NonNullReader::new(column::<i64>(), cursor);

    assert_eq!(reader.read().unwrap(), Some(1));
    let err = reader.read().unwrap_err();
    assert!(matches!(
        err,
        RowError::Protocol(ProtocolViolation::NullRecord { row: 2 })
    ));
    reader.close().unwrap();
}

#[test]
fn test_select_reader_keeps_null_records() -> RowResult<()> {
    common::init_tracing();
    let cursor = MemoryCursor::from_json("[[1], [null], [3]]").unwrap();
    let records = drain(SelectReader::new(column::<i64>(), cursor))?;
    assert_eq!(records, vec![Some(1), None, Some(3)]);
    Ok(())
}

#[test]
fn test_drop_releases_unclosed_reader() {
    common::init_tracing();
    let statement = MemoryStatement::new(vec![]).with_fault(Fault::StatementClose);
    let probe = statement.probe();
    let cursor = MemoryCursor::new(rows(&[1])).with_probe(probe.clone());

    let mut reader = SelectReader::owning(counting(Rc::default()), cursor, statement);
    assert_eq!(reader.read().unwrap(), Some(1));
    drop(reader);

    assert_eq!(probe.cursor_closes(), 1);
    assert_eq!(probe.statement_closes(), 1);
}

#[test]
fn test_config_from_toml() -> Result<(), ConfigError> {
    common::init_tracing();
    let config = ReadConfig::from_toml_str("start_column = 2\nrelease_on_drop = false")?;
    let cursor = MemoryCursor::new(vec![vec![Value::Int(1), Value::Int(2)]]);
    let probe = cursor.probe();

    {
        let mut reader = SelectReader::new(required::<i64>(), cursor).with_config(&config);
        assert_eq!(reader.read().unwrap(), Some(2));
    }
    assert_eq!(probe.cursor_closes(), 0);
    Ok(())
}
