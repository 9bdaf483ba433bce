//! Mapped decoders.

use super::{Composer, Creator};
use crate::error::{DecodeErrorKind, RowError, RowResult};
use crate::source::Row;
use std::marker::PhantomData;

/// Inner decoder followed by an infallible conversion. Same width as inner.
pub struct Mapped<D, F, A> {
    inner: D,
    f: F,
    _marker: PhantomData<fn() -> A>,
}

/// Inner decoder followed by a fallible conversion. Same width as inner.
///
/// A rejected value becomes [`DecodeErrorKind::Conversion`] at the
/// decoder's start column, distinct from a column access failure.
pub struct TryMapped<D, F, A> {
    inner: D,
    f: F,
    _marker: PhantomData<fn() -> A>,
}

pub fn map<A, B, D, F>(inner: D, f: F) -> Mapped<D, F, A>
where
    D: Creator<A>,
    F: Fn(A) -> B,
{
    Mapped {
        inner,
        f,
        _marker: PhantomData,
    }
}

pub fn try_map<A, B, E, D, F>(inner: D, f: F) -> TryMapped<D, F, A>
where
    D: Creator<A>,
    F: Fn(A) -> Result<B, E>,
    E: Into<anyhow::Error>,
{
    TryMapped {
        inner,
        f,
        _marker: PhantomData,
    }
}

impl<A, B, D, F> Creator<B> for Mapped<D, F, A>
where
    D: Creator<A>,
    F: Fn(A) -> B,
{
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<B> {
        self.inner.create(row, start).map(&self.f)
    }
}

impl<A, B, D, F> Composer<B> for Mapped<D, F, A>
where
    D: Composer<A>,
    F: Fn(A) -> B,
{
    fn width(&self) -> usize {
        self.inner.width()
    }
}

impl<A, B, E, D, F> Creator<B> for TryMapped<D, F, A>
where
    D: Creator<A>,
    F: Fn(A) -> Result<B, E>,
    E: Into<anyhow::Error>,
{
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<B> {
        let value = self.inner.create(row, start)?;
        (self.f)(value)
            .map_err(|e| RowError::decode(start, DecodeErrorKind::Conversion(e.into())))
    }
}

impl<A, B, E, D, F> Composer<B> for TryMapped<D, F, A>
where
    D: Composer<A>,
    F: Fn(A) -> Result<B, E>,
    E: Into<anyhow::Error>,
{
    fn width(&self) -> usize {
        self.inner.width()
    }
}
