//! Backend adapter implementations.
//!
//! This module contains the adapters for the supported tabular backends
//! (delimited text files, MySQL, remote spreadsheets) and the capability
//! trait they share.

pub mod mysql;
pub mod sheet;
pub mod text;

pub use mysql::MySqlAdapter;
pub use sheet::SheetAdapter;
pub use text::{TextAdapter, TextOptions};

use std::fmt;

use crate::error::{Error, Result};
use crate::value::Table;

/// Trait for backends that expose tabular data through a shared
/// read/write capability
///
/// `query` is backend-defined: the MySQL adapter requires a SQL statement,
/// while the text and spreadsheet adapters ignore it and return the whole
/// bound file or retained feed. Backend-specific operations (separator
/// overrides, `execute`, `insert`, raw writes) live on the concrete
/// adapter types.
pub trait Database {
    /// Which backend this adapter speaks to
    fn kind(&self) -> BackendKind;

    /// Read rows from the backend
    fn read(&mut self, query: &str) -> Result<Table>;

    /// Replace the backend's contents with the given rows
    ///
    /// Read-only backends fail with [`Error::Unsupported`].
    fn write(&mut self, table: &Table) -> Result<()>;
}

/// The supported backend families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Delimited text file on the local filesystem
    Text,
    /// MySQL server
    MySql,
    /// Remote spreadsheet service
    Spreadsheet,
}

impl BackendKind {
    /// Resolve a backend type tag, case-insensitively
    ///
    /// Recognized tags: `google` (spreadsheet), `excel`/`text`/`csv`
    /// (delimited text), `mysql`. Anything else fails with
    /// [`Error::Unsupported`] rather than falling through.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "google" => Ok(BackendKind::Spreadsheet),
            "excel" | "text" | "csv" => Ok(BackendKind::Text),
            "mysql" => Ok(BackendKind::MySql),
            other => Err(Error::Unsupported(other.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Text => f.write_str("text"),
            BackendKind::MySql => f.write_str("mysql"),
            BackendKind::Spreadsheet => f.write_str("spreadsheet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_recognizes_all_groups() {
        assert_eq!(
            BackendKind::from_tag("google").unwrap(),
            BackendKind::Spreadsheet
        );
        for tag in ["excel", "text", "csv"] {
            assert_eq!(BackendKind::from_tag(tag).unwrap(), BackendKind::Text);
        }
        assert_eq!(BackendKind::from_tag("mysql").unwrap(), BackendKind::MySql);
    }

    #[test]
    fn test_from_tag_is_case_insensitive() {
        assert_eq!(BackendKind::from_tag("CSV").unwrap(), BackendKind::Text);
        assert_eq!(
            BackendKind::from_tag("MySQL").unwrap(),
            BackendKind::MySql
        );
        assert_eq!(
            BackendKind::from_tag("Google").unwrap(),
            BackendKind::Spreadsheet
        );
    }

    #[test]
    fn test_from_tag_rejects_unknown_backends() {
        match BackendKind::from_tag("mongo") {
            Err(Error::Unsupported(tag)) => assert_eq!(tag, "mongo"),
            other => panic!("expected Unsupported, got {:?}", other.map(|k| k.to_string())),
        }
    }
}
