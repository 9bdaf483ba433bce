//! Statement ownership handoff.
//!
//! Between `prepare` and the moment a reader takes the statement over, the
//! executing code owns it and must release it on every failure path. The
//! guard closes the statement when it goes out of scope armed; disarming it
//! hands responsibility to whoever comes next.

use crate::error::{CleanupError, Resource, RowError};
use crate::source::Statement;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Closes the borrowed statement on drop unless disarmed.
pub struct StatementGuard<'a, S: Statement> {
    statement: &'a mut S,
    armed: bool,
}

impl<'a, S: Statement> StatementGuard<'a, S> {
    /// Start guarding `statement`.
    pub fn arm(statement: &'a mut S) -> Self {
        Self {
            statement,
            armed: true,
        }
    }

    /// Give up responsibility for the statement.
    pub fn disarm(mut self) {
        self.armed = false;
    }

    /// Close the statement now and fold any release failure into `error`.
    pub fn abort(mut self, error: RowError) -> RowError {
        self.armed = false;
        let mut cleanup = CleanupError::new();
        cleanup.record(Resource::Statement, self.statement.close());
        error.with_cleanup(cleanup.into_result())
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl<S: Statement> Deref for StatementGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.statement
    }
}

impl<S: Statement> DerefMut for StatementGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.statement
    }
}

impl<S: Statement> Drop for StatementGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.statement.close() {
                warn!(error = %e, "failed to release statement");
            }
        }
    }
}
