//! Present/absent wrappers.

use super::{Composer, Creator};
use crate::error::RowResult;
use crate::source::Row;

/// Outer-join guard: `None` when every column in the inner decoder's width
/// is NULL, `Some(inner)` otherwise.
///
/// On an all-NULL group the inner decoder is not called at all, so it may
/// use non-nullable targets such as [`required`](super::required).
#[derive(Debug, Clone)]
pub struct Optional<D> {
    inner: D,
}

pub fn optional<T, D>(inner: D) -> Optional<D>
where
    D: Composer<T>,
{
    Optional { inner }
}

impl<T, D: Composer<T>> Creator<Option<T>> for Optional<D> {
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<Option<T>> {
        let bound = start + self.inner.width();
        for column in start..bound {
            if !row.is_null(column)? {
                return self.inner.create(row, start).map(Some);
            }
        }
        Ok(None)
    }
}

impl<T, D: Composer<T>> Composer<Option<T>> for Optional<D> {
    fn width(&self) -> usize {
        self.inner.width()
    }
}

/// Always `Some(inner)`.
#[derive(Debug, Clone)]
pub struct Just<D> {
    inner: D,
}

pub fn just<T, D>(inner: D) -> Just<D>
where
    D: Creator<T>,
{
    Just { inner }
}

impl<T, D: Creator<T>> Creator<Option<T>> for Just<D> {
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<Option<T>> {
        self.inner.create(row, start).map(Some)
    }
}

impl<T, D: Composer<T>> Composer<Option<T>> for Just<D> {
    fn width(&self) -> usize {
        self.inner.width()
    }
}
