//! Values identified by a short string code.
//!
//! Coded columns store a compact code (`"A"`, `"R"`) instead of a full name.
//! A [`CodeProperty`] type lists its values and their codes; lookups go
//! either through the free functions here or through a prebuilt
//! [`CodeTable`] when the same type is resolved over and over.

use std::collections::HashMap;
use thiserror::Error;

/// A closed set of values, each carrying a unique string code.
pub trait CodeProperty: Sized + Copy + 'static {
    fn code(&self) -> &'static str;

    /// Every value of the type.
    fn values() -> &'static [Self];
}

/// Code lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("no value for code: {0}")]
    Unknown(String),

    #[error("duplicate code: {0}")]
    Duplicate(String),
}

/// The value whose code is `code`, if any.
pub fn value_of_code<E: CodeProperty>(code: &str) -> Option<E> {
    E::values().iter().copied().find(|v| v.code() == code)
}

/// Whether `code` is present and names `value`.
pub fn code_equals<E: CodeProperty>(code: Option<&str>, value: E) -> bool {
    code.is_some_and(|c| c == value.code())
}

/// Whether `code` is present and names one of `values`.
pub fn code_equals_any<E: CodeProperty>(code: Option<&str>, values: &[E]) -> bool {
    values.iter().any(|v| code_equals(code, *v))
}

/// Code of `value`, or of `default` when absent.
pub fn code_or<E: CodeProperty>(value: Option<E>, default: E) -> &'static str {
    value.unwrap_or(default).code()
}

/// Codes of `values`, in order.
pub fn codes<E: CodeProperty>(values: &[E]) -> Vec<&'static str> {
    values.iter().map(CodeProperty::code).collect()
}

/// Prebuilt code index for one [`CodeProperty`] type.
#[derive(Debug, Clone)]
pub struct CodeTable<E> {
    by_code: HashMap<&'static str, E>,
    order: Vec<E>,
}

impl<E: CodeProperty> CodeTable<E> {
    /// Index every value of `E`.
    pub fn new() -> Result<Self, CodeError> {
        Self::from_values(E::values())
    }

    /// Index `values`. Two values sharing a code is an error.
    pub fn from_values(values: &[E]) -> Result<Self, CodeError> {
        let mut by_code = HashMap::with_capacity(values.len());
        for value in values {
            if by_code.insert(value.code(), *value).is_some() {
                return Err(CodeError::Duplicate(value.code().to_string()));
            }
        }
        Ok(Self {
            by_code,
            order: values.to_vec(),
        })
    }

    pub fn value_of_code(&self, code: &str) -> Result<E, CodeError> {
        self.find(code)
            .ok_or_else(|| CodeError::Unknown(code.to_string()))
    }

    pub fn find(&self, code: &str) -> Option<E> {
        self.by_code.get(code).copied()
    }

    pub fn or_default(&self, code: Option<&str>, default: E) -> E {
        code.and_then(|c| self.find(c)).unwrap_or(default)
    }

    pub fn is_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// All codes in declaration order.
    pub fn codes(&self) -> Vec<&'static str> {
        codes(&self.order)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Currency {
        Euro,
        Dollar,
        Yen,
    }

    impl CodeProperty for Currency {
        fn code(&self) -> &'static str {
            match self {
                Currency::Euro => "EUR",
                Currency::Dollar => "USD",
                Currency::Yen => "JPY",
            }
        }

        fn values() -> &'static [Self] {
            &[Currency::Euro, Currency::Dollar, Currency::Yen]
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Clash {
        First,
        Second,
    }

    impl CodeProperty for Clash {
        fn code(&self) -> &'static str {
            "X"
        }

        fn values() -> &'static [Self] {
            &[Clash::First, Clash::Second]
        }
    }

    #[test]
    fn test_value_of_code() {
        assert_eq!(value_of_code::<Currency>("USD"), Some(Currency::Dollar));
        assert_eq!(value_of_code::<Currency>("usd"), None);
    }

    #[test]
    fn test_code_equals() {
        assert!(code_equals(Some("JPY"), Currency::Yen));
        assert!(!code_equals(None, Currency::Yen));
        assert!(code_equals_any(Some("EUR"), &[Currency::Yen, Currency::Euro]));
        assert!(!code_equals_any(Some("EUR"), &[] as &[Currency]));
    }

    #[test]
    fn test_code_or() {
        assert_eq!(code_or(None, Currency::Euro), "EUR");
        assert_eq!(code_or(Some(Currency::Yen), Currency::Euro), "JPY");
    }

    #[test]
    fn test_table_lookup() {
        let table = CodeTable::<Currency>::new().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.value_of_code("EUR").unwrap(), Currency::Euro);
        assert_eq!(
            table.value_of_code("GBP").unwrap_err(),
            CodeError::Unknown("GBP".to_string())
        );
        assert!(table.is_code("JPY"));
        assert_eq!(table.or_default(Some("GBP"), Currency::Dollar), Currency::Dollar);
        assert_eq!(table.or_default(None, Currency::Yen), Currency::Yen);
        assert_eq!(table.codes(), vec!["EUR", "USD", "JPY"]);
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let err = CodeTable::<Clash>::new().unwrap_err();
        assert_eq!(err, CodeError::Duplicate("X".to_string()));
    }
}
