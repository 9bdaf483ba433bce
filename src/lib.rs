//! # rowkit: composable row decoders over database cursors
//!
//! rowkit sits on top of an existing database driver and turns the rows of
//! a result into typed records without leaking cursors or statements.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use rowkit::prelude::*;
//!
//! // users.id, users.name, then a LEFT JOINed address (city, zip)
//! let query = Query::with_params(
//!     "SELECT u.id, u.name, a.city, a.zip FROM users u LEFT JOIN address a ON ... WHERE u.team = ?",
//!     pair(
//!         pair(required::<i64>(), column::<String>()),
//!         optional(pair(required::<String>(), required::<String>())),
//!     ),
//!     vec![Value::from("core")],
//! );
//!
//! let users = query.fetch_all(&mut conn)?;
//! ```
//!
//! ## Pieces
//!
//! | Module     | Role                                                  |
//! |------------|-------------------------------------------------------|
//! | `decode`   | `Creator`/`Composer` decoders and their combinators   |
//! | `reader`   | pull readers, pushback and iteration                  |
//! | `query`    | SQL + decoder + bind step, statement handover         |
//! | `source`   | traits a driver implements                            |
//! | `memory`   | in-memory driver for tests (feature `testing`)        |

pub mod code;
pub mod config;
pub mod decode;
pub mod error;
pub mod guard;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod query;
pub mod reader;
pub mod source;
pub mod value;

pub mod prelude {
    pub use crate::code::{CodeProperty, CodeTable};
    pub use crate::config::ReadConfig;
    pub use crate::decode::{
        Composer, Creator, column, composer, creator, just, map, one_column, optional, pair,
        pair_creator, quad, required, triple, try_map,
    };
    pub use crate::error::*;
    pub use crate::query::Query;
    pub use crate::reader::{
        NonNullReader, PushbackReader, RecordReader, SelectReader, drain, each,
    };
    pub use crate::source::{Bind, Connection, Cursor, Row, Statement};
    pub use crate::value::{FromValue, Value};
}
