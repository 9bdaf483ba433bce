//! Row source collaborators.
//!
//! rowkit never talks to a database itself. A driver exposes its result
//! cursor, prepared statement and connection through these traits and the
//! decoders, readers and queries work on top of them.
//!
//! Column and parameter indices are 1-based.

use crate::error::AccessError;
use crate::value::Value;

/// The current row of a result.
pub trait Row {
    /// Raw value of `column`.
    fn value(&self, column: usize) -> Result<Value, AccessError>;

    /// Whether `column` is NULL.
    fn is_null(&self, column: usize) -> Result<bool, AccessError> {
        Ok(self.value(column)?.is_null())
    }
}

/// A forward-only cursor positioned before its first row.
pub trait Cursor: Row {
    /// Move to the next row. `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool, AccessError>;

    /// Release the cursor.
    fn close(&mut self) -> Result<(), AccessError>;
}

/// Parameter binding target.
pub trait Bind {
    fn bind(&mut self, index: usize, value: Value) -> Result<(), AccessError>;
}

/// A prepared statement that executes into a [`Cursor`].
pub trait Statement: Bind {
    type Cursor: Cursor;

    fn execute(&mut self) -> Result<Self::Cursor, AccessError>;

    /// Release the statement.
    fn close(&mut self) -> Result<(), AccessError>;
}

/// Something that prepares statements.
pub trait Connection {
    type Statement: Statement;

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, AccessError>;
}

impl<R: Row + ?Sized> Row for &R {
    fn value(&self, column: usize) -> Result<Value, AccessError> {
        (**self).value(column)
    }

    fn is_null(&self, column: usize) -> Result<bool, AccessError> {
        (**self).is_null(column)
    }
}

impl<R: Row + ?Sized> Row for Box<R> {
    fn value(&self, column: usize) -> Result<Value, AccessError> {
        (**self).value(column)
    }

    fn is_null(&self, column: usize) -> Result<bool, AccessError> {
        (**self).is_null(column)
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    fn advance(&mut self) -> Result<bool, AccessError> {
        (**self).advance()
    }

    fn close(&mut self) -> Result<(), AccessError> {
        (**self).close()
    }
}

impl<B: Bind + ?Sized> Bind for &mut B {
    fn bind(&mut self, index: usize, value: Value) -> Result<(), AccessError> {
        (**self).bind(index, value)
    }
}

impl<B: Bind + ?Sized> Bind for Box<B> {
    fn bind(&mut self, index: usize, value: Value) -> Result<(), AccessError> {
        (**self).bind(index, value)
    }
}

impl<S: Statement + ?Sized> Statement for Box<S> {
    type Cursor = S::Cursor;

    fn execute(&mut self) -> Result<Self::Cursor, AccessError> {
        (**self).execute()
    }

    fn close(&mut self) -> Result<(), AccessError> {
        (**self).close()
    }
}
