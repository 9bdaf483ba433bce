//! Query execution.
//!
//! A [`Query`] couples SQL text, a record decoder and a bind step. Executing
//! it prepares a statement, binds, executes and hands the statement over to
//! the returned reader. Until that handover the statement is guarded by a
//! [`StatementGuard`] and released on any failure; afterwards only the
//! reader releases it.

use crate::config::ReadConfig;
use crate::decode::{self, Creator, SharedCreator};
use crate::error::RowResult;
use crate::guard::StatementGuard;
use crate::reader::{NonNullReader, RecordReader, SelectReader, drain, finish};
use crate::source::{Bind, Connection, Statement};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Parameter binding step.
pub type Binder = Arc<dyn Fn(&mut dyn Bind) -> RowResult<()> + Send + Sync>;

/// Cursor type produced by a connection's statements.
pub type StatementCursor<Conn> = <<Conn as Connection>::Statement as Statement>::Cursor;

/// Bind step for queries without parameters.
pub fn no_bind(_: &mut dyn Bind) -> RowResult<()> {
    Ok(())
}

/// SQL text, decoder and bind step.
pub struct Query<T> {
    sql: Arc<str>,
    decoder: SharedCreator<T>,
    binder: Binder,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            sql: Arc::clone(&self.sql),
            decoder: Arc::clone(&self.decoder),
            binder: Arc::clone(&self.binder),
        }
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("sql", &self.sql).finish_non_exhaustive()
    }
}

impl<T: 'static> Query<T> {
    pub fn new<D, B>(sql: impl Into<Arc<str>>, decoder: D, bind: B) -> Self
    where
        D: Creator<T> + Send + Sync + 'static,
        B: Fn(&mut dyn Bind) -> RowResult<()> + Send + Sync + 'static,
    {
        Self {
            sql: sql.into(),
            decoder: Arc::new(decoder),
            binder: Arc::new(bind),
        }
    }

    /// Query without parameters.
    pub fn unbound<D>(sql: impl Into<Arc<str>>, decoder: D) -> Self
    where
        D: Creator<T> + Send + Sync + 'static,
    {
        Self::new(sql, decoder, no_bind)
    }

    /// Query binding `params` to indices `1..=params.len()`.
    pub fn with_params<D>(sql: impl Into<Arc<str>>, decoder: D, params: Vec<Value>) -> Self
    where
        D: Creator<T> + Send + Sync + 'static,
    {
        let params: Arc<[Value]> = params.into();
        Self::new(sql, decoder, move |target: &mut dyn Bind| {
            for (i, value) in params.iter().enumerate() {
                target.bind(i + 1, value.clone())?;
            }
            Ok(())
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn decoder(&self) -> &SharedCreator<T> {
        &self.decoder
    }

    /// Run the bind step against `target`.
    pub fn bind(&self, target: &mut dyn Bind) -> RowResult<()> {
        (self.binder)(target)
    }

    /// Same SQL and bind step, records converted by `f`.
    pub fn map<U, F>(&self, f: F) -> Query<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Query {
            sql: Arc::clone(&self.sql),
            decoder: Arc::new(decode::map(Arc::clone(&self.decoder), f)),
            binder: Arc::clone(&self.binder),
        }
    }

    /// Prepare, bind and execute. The statement is released here on any
    /// failure and returned untouched on success.
    fn open<Conn: Connection>(
        &self,
        conn: &mut Conn,
    ) -> RowResult<(Conn::Statement, StatementCursor<Conn>)> {
        debug!(sql = %self.sql, "executing query");
        let mut statement = conn.prepare(&self.sql)?;

        let mut guard = StatementGuard::arm(&mut statement);
        if let Err(e) = (self.binder)(&mut *guard) {
            return Err(guard.abort(e));
        }
        let cursor = match guard.execute() {
            Ok(cursor) => cursor,
            Err(e) => return Err(guard.abort(e.into())),
        };
        // Callers move the statement into a reader infallibly. Any fallible
        // step added between here and that move must run before disarming.
        guard.disarm();

        Ok((statement, cursor))
    }

    pub fn execute<Conn>(&self, conn: &mut Conn) -> RowResult<SelectReader<T, StatementCursor<Conn>>>
    where
        Conn: Connection,
        Conn::Statement: 'static,
    {
        self.execute_with(conn, &ReadConfig::default())
    }

    /// Execute and hand the statement to a [`SelectReader`].
    pub fn execute_with<Conn>(
        &self,
        conn: &mut Conn,
        config: &ReadConfig,
    ) -> RowResult<SelectReader<T, StatementCursor<Conn>>>
    where
        Conn: Connection,
        Conn::Statement: 'static,
    {
        let (statement, cursor) = self.open(conn)?;
        Ok(SelectReader::from_parts(
            self.decoder.clone(),
            cursor,
            Some(Box::new(statement)),
            config,
        ))
    }

    /// Execute, run `f` on the reader and close it whatever `f` returned.
    pub fn with_reader<Conn, R, F>(&self, conn: &mut Conn, f: F) -> RowResult<R>
    where
        Conn: Connection,
        Conn::Statement: 'static,
        F: FnOnce(&mut SelectReader<T, StatementCursor<Conn>>) -> RowResult<R>,
    {
        let mut reader = self.execute(conn)?;
        let outcome = f(&mut reader);
        finish(outcome, reader.close())
    }

    /// Every record, with the statement released afterwards.
    pub fn fetch_all<Conn>(&self, conn: &mut Conn) -> RowResult<Vec<T>>
    where
        Conn: Connection,
        Conn::Statement: 'static,
    {
        drain(self.execute(conn)?)
    }
}

impl<T: 'static> Query<Option<T>> {
    /// Execute into a [`NonNullReader`]: a decoded `None` is an error.
    pub fn execute_non_null<Conn>(
        &self,
        conn: &mut Conn,
        config: &ReadConfig,
    ) -> RowResult<NonNullReader<T, StatementCursor<Conn>>>
    where
        Conn: Connection,
        Conn::Statement: 'static,
    {
        let (statement, cursor) = self.open(conn)?;
        Ok(NonNullReader::from_parts(
            self.decoder.clone(),
            cursor,
            Some(Box::new(statement)),
            config,
        ))
    }
}
