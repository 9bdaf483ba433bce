//! Tuple composition.
//!
//! The composed width is the sum of the parts. Each part starts at the
//! composed decoder's start column plus the widths of the parts before it,
//! so parts never overlap. Nesting (`pair(a, pair(b, c))` vs
//! `triple(a, b, c)`) changes the tuple shape only, never the columns read.

use super::{Composer, Creator, composer, creator};
use crate::source::Row;

/// `(X, Y)` from two side-by-side composers.
pub fn pair<X, Y, A, B>(a: A, b: B) -> impl Composer<(X, Y)>
where
    A: Composer<X>,
    B: Composer<Y>,
{
    let wa = a.width();
    composer(wa + b.width(), move |row: &dyn Row, at: usize| {
        Ok((a.create(row, at)?, b.create(row, at + wa)?))
    })
}

/// `(X, Y)` where the trailing part has no known width.
///
/// The result is only a [`Creator`]; it cannot be composed further to the
/// right.
pub fn pair_creator<X, Y, A, B>(a: A, b: B) -> impl Creator<(X, Y)>
where
    A: Composer<X>,
    B: Creator<Y>,
{
    let wa = a.width();
    creator(move |row: &dyn Row, at: usize| {
        Ok((a.create(row, at)?, b.create(row, at + wa)?))
    })
}

/// `(X, Y, Z)` from three side-by-side composers.
pub fn triple<X, Y, Z, A, B, C>(a: A, b: B, c: C) -> impl Composer<(X, Y, Z)>
where
    A: Composer<X>,
    B: Composer<Y>,
    C: Composer<Z>,
{
    let wa = a.width();
    let wb = b.width();
    composer(wa + wb + c.width(), move |row: &dyn Row, at: usize| {
        Ok((
            a.create(row, at)?,
            b.create(row, at + wa)?,
            c.create(row, at + wa + wb)?,
        ))
    })
}

/// `(X, Y, Z, W)` from four side-by-side composers.
pub fn quad<X, Y, Z, W, A, B, C, D>(a: A, b: B, c: C, d: D) -> impl Composer<(X, Y, Z, W)>
where
    A: Composer<X>,
    B: Composer<Y>,
    C: Composer<Z>,
    D: Composer<W>,
{
    let wa = a.width();
    let wb = b.width();
    let wc = c.width();
    composer(wa + wb + wc + d.width(), move |row: &dyn Row, at: usize| {
        Ok((
            a.create(row, at)?,
            b.create(row, at + wa)?,
            c.create(row, at + wa + wb)?,
            d.create(row, at + wa + wb + wc)?,
        ))
    })
}
