//! Reader configuration.
//!
//! ```toml
//! [reader]
//! start_column = 1
//! release_on_drop = true
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::num::NonZeroUsize;

/// How readers decode and release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadConfig {
    /// Column the record decoder starts at (1-based).
    pub start_column: NonZeroUsize,

    /// Release the cursor and owned statement when an unclosed reader is
    /// dropped. Failures are logged since nobody can observe them.
    pub release_on_drop: bool,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            start_column: NonZeroUsize::MIN,
            release_on_drop: true,
        }
    }
}

impl ReadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_column(mut self, column: NonZeroUsize) -> Self {
        self.start_column = column;
        self
    }

    pub fn release_on_drop(mut self, release: bool) -> Self {
        self.release_on_drop = release;
        self
    }

    /// Parse a standalone TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse the `[section]` table of a larger TOML document. A missing
    /// section yields the defaults.
    pub fn from_toml_section(s: &str, section: &str) -> Result<Self, ConfigError> {
        let mut doc: toml::Table = toml::from_str(s)?;
        match doc.remove(section) {
            None => Ok(Self::default()),
            Some(value @ toml::Value::Table(_)) => Ok(value.try_into()?),
            Some(other) => Err(ConfigError::Invalid(format!(
                "[{}] must be a table, found {}",
                section,
                other.type_str()
            ))),
        }
    }
}
