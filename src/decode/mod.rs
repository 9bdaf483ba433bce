//! Row decoders.
//!
//! A [`Creator`] knows how to build one value out of the columns of the
//! current row, starting at a given column. A [`Composer`] additionally knows
//! how many consecutive columns it reads, which is what makes decoders
//! composable: the parts of a composed decoder sit side by side, each one
//! starting where the previous one ends.
//!
//! ```ignore
//! use rowkit::decode::{column, optional, pair, required};
//!
//! // users.id, users.name, then a LEFT JOINed (address.city, address.zip)
//! let decoder = pair(
//!     pair(required::<i64>(), column::<String>()),
//!     optional(pair(required::<String>(), required::<String>())),
//! );
//! assert_eq!(decoder.width(), 4);
//! ```

mod compose;
mod mapped;
mod optional;
mod scalar;

pub use compose::{pair, pair_creator, quad, triple};
pub use mapped::{Mapped, TryMapped, map, try_map};
pub use optional::{Just, Optional, just, optional};
pub use scalar::{big_integer, code, code_in, column, get, int_value, month, required};

use crate::error::RowResult;
use crate::source::Row;
use std::fmt;
use std::sync::Arc;

/// Builds a `T` from the columns of a row, starting at `start`.
pub trait Creator<T> {
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<T>;
}

/// A [`Creator`] that reads exactly `width()` consecutive columns.
pub trait Composer<T>: Creator<T> {
    fn width(&self) -> usize;
}

/// A decoder shared between a query and the readers it opens.
pub type SharedCreator<T> = Arc<dyn Creator<T> + Send + Sync>;

/// Closure-backed [`Creator`].
#[derive(Clone)]
pub struct FnCreator<F> {
    f: F,
}

/// Closure-backed [`Composer`] with a fixed width.
#[derive(Clone)]
pub struct FnComposer<F> {
    width: usize,
    f: F,
}

/// Turn a closure into a [`Creator`].
pub fn creator<T, F>(f: F) -> FnCreator<F>
where
    F: Fn(&dyn Row, usize) -> RowResult<T>,
{
    FnCreator { f }
}

/// Turn a closure that reads `width` columns into a [`Composer`].
pub fn composer<T, F>(width: usize, f: F) -> FnComposer<F>
where
    F: Fn(&dyn Row, usize) -> RowResult<T>,
{
    FnComposer { width, f }
}

/// A composer that reads a single column.
pub fn one_column<T, F>(f: F) -> FnComposer<F>
where
    F: Fn(&dyn Row, usize) -> RowResult<T>,
{
    composer(1, f)
}

impl<T, F> Creator<T> for FnCreator<F>
where
    F: Fn(&dyn Row, usize) -> RowResult<T>,
{
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<T> {
        (self.f)(row, start)
    }
}

impl<T, F> Creator<T> for FnComposer<F>
where
    F: Fn(&dyn Row, usize) -> RowResult<T>,
{
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<T> {
        (self.f)(row, start)
    }
}

impl<T, F> Composer<T> for FnComposer<F>
where
    F: Fn(&dyn Row, usize) -> RowResult<T>,
{
    fn width(&self) -> usize {
        self.width
    }
}

impl<F> fmt::Debug for FnCreator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCreator").finish_non_exhaustive()
    }
}

impl<F> fmt::Debug for FnComposer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComposer")
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

impl<T, C: Creator<T> + ?Sized> Creator<T> for &C {
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<T> {
        (**self).create(row, start)
    }
}

impl<T, C: Composer<T> + ?Sized> Composer<T> for &C {
    fn width(&self) -> usize {
        (**self).width()
    }
}

impl<T, C: Creator<T> + ?Sized> Creator<T> for Box<C> {
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<T> {
        (**self).create(row, start)
    }
}

impl<T, C: Composer<T> + ?Sized> Composer<T> for Box<C> {
    fn width(&self) -> usize {
        (**self).width()
    }
}

impl<T, C: Creator<T> + ?Sized> Creator<T> for Arc<C> {
    fn create(&self, row: &dyn Row, start: usize) -> RowResult<T> {
        (**self).create(row, start)
    }
}

impl<T, C: Composer<T> + ?Sized> Composer<T> for Arc<C> {
    fn width(&self) -> usize {
        (**self).width()
    }
}
