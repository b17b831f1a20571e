use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single spreadsheet cell as the user entered it.
///
/// Text is kept verbatim so that a table read from a snapshot is written back
/// unchanged; interpretation as a number happens only through
/// [`crate::calculations::common::coerce`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Number(Decimal),
    Text(String),
}

impl CellValue {
    /// Wraps raw cell text. An empty string is [`CellValue::Empty`].
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Self::Empty
        } else {
            Self::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::from_raw(value)
    }
}

/// Columns a table does not recognise, kept in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraColumns(Vec<(String, String)>);

impl ExtraColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        column: &str,
    ) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `column`, replacing an existing value in place.
    pub fn insert(
        &mut self,
        column: impl Into<String>,
        value: impl Into<String>,
    ) {
        let column = column.into();
        let value = value.into();
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
