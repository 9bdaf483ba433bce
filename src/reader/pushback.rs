//! Lookahead over a reader and an iterator bridge.

use super::RecordReader;
use crate::error::{CleanupError, ProtocolViolation, RowResult};
use std::iter::FusedIterator;

/// A reader with unlimited pushback.
///
/// Unread records are returned last-in first-out before the wrapped reader
/// is consulted again.
#[derive(Debug)]
pub struct PushbackReader<T, R> {
    inner: R,
    stack: Vec<T>,
}

impl<T, R: RecordReader<T>> PushbackReader<T, R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            stack: Vec::new(),
        }
    }

    /// Push `record` back; the next `read()` returns it.
    pub fn unread(&mut self, record: T) {
        self.stack.push(record);
    }

    /// The record the next `read()` will return, without consuming it.
    pub fn peek(&mut self) -> RowResult<Option<&T>> {
        if self.stack.is_empty() {
            match self.inner.read()? {
                Some(record) => self.stack.push(record),
                None => return Ok(None),
            }
        }
        Ok(self.stack.last())
    }

    /// Records pushed back and not yet re-read.
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap the reader, discarding pending records.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Iterate the remaining records.
    pub fn records(self) -> Records<T, R> {
        Records {
            reader: self,
            done: false,
        }
    }
}

impl<T, R: RecordReader<T>> RecordReader<T> for PushbackReader<T, R> {
    fn read(&mut self) -> RowResult<Option<T>> {
        match self.stack.pop() {
            Some(record) => Ok(Some(record)),
            None => self.inner.read(),
        }
    }

    fn close(&mut self) -> Result<(), CleanupError> {
        self.inner.close()
    }
}

/// Single-pass iteration over a reader.
///
/// The iterator never closes the reader; pass `&mut reader` to [`each`] and
/// close it afterwards. Iteration stops after the first error.
#[derive(Debug)]
pub struct Records<T, R> {
    reader: PushbackReader<T, R>,
    done: bool,
}

/// Iterate `reader` without taking over its release.
pub fn each<T, R: RecordReader<T>>(reader: R) -> Records<T, R> {
    PushbackReader::new(reader).records()
}

impl<T, R: RecordReader<T>> Records<T, R> {
    /// Whether another record is available.
    pub fn has_next(&mut self) -> RowResult<bool> {
        if self.done {
            return Ok(false);
        }
        Ok(self.reader.peek()?.is_some())
    }

    /// The next record. Asking past the end is [`ProtocolViolation::Exhausted`].
    pub fn next_record(&mut self) -> RowResult<T> {
        if self.done {
            return Err(ProtocolViolation::Exhausted.into());
        }
        match self.reader.read()? {
            Some(record) => Ok(record),
            None => {
                self.done = true;
                Err(ProtocolViolation::Exhausted.into())
            }
        }
    }

    pub fn into_inner(self) -> PushbackReader<T, R> {
        self.reader
    }
}

impl<T, R: RecordReader<T>> Iterator for Records<T, R> {
    type Item = RowResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<T, R: RecordReader<T>> FusedIterator for Records<T, R> {}
