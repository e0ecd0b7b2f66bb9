//! Backend configuration.
//!
//! A [`BackendConfig`] names a backend and carries its parameters. The
//! enum is serde-tagged on `type`, so a TOML or JSON document can select
//! the backend without the caller branching on it:
//!
//! ```toml
//! type = "mysql"
//! db = "experiments"
//! user = "lab"
//! password = "hunter2"
//! host = "db.internal"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for one backend, tagged by backend type
///
/// Recognized `type` values mirror the factory tags: `google` for the
/// spreadsheet backend, `text` (aliases `excel`, `csv`) for delimited
/// text, `mysql` for MySQL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Delimited text file
    #[serde(alias = "excel", alias = "csv")]
    Text(TextConfig),
    /// MySQL server
    Mysql(MySqlConfig),
    /// Remote spreadsheet service
    Google(SheetConfig),
}

impl BackendConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&contents)
    }
}

/// Parameters for the delimited-text backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Path of the backing file
    pub file: String,
    /// Field separator; defaults to a single space when absent
    ///
    /// A `.csv` or `.tsv` suffix on `file` overrides this either way.
    #[serde(default)]
    pub separator: Option<String>,
}

/// Parameters for the MySQL backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySqlConfig {
    /// Database name
    pub db: String,
    /// User to connect as
    pub user: String,
    /// Password for that user
    pub password: String,
    /// Server host
    pub host: String,
}

/// Parameters for the spreadsheet backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Exact title of the spreadsheet to open
    pub title: String,
    /// Account to sign in with
    pub email: String,
    /// Password for that account
    pub password: String,
    /// String describing where the query comes from
    pub source: String,
    /// Spreadsheet key from the document URL; when present it is used
    /// directly and the title lookup is skipped
    #[serde(default)]
    pub key: Option<String>,
    /// 1-based worksheet index within the spreadsheet
    #[serde(default = "default_sheet_index")]
    pub sheet: usize,
}

fn default_sheet_index() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_config_from_toml() {
        let config = BackendConfig::from_toml_str(
            r#"
            type = "text"
            file = "data.txt"
            separator = "|"
            "#,
        )
        .unwrap();

        match config {
            BackendConfig::Text(c) => {
                assert_eq!(c.file, "data.txt");
                assert_eq!(c.separator.as_deref(), Some("|"));
            }
            other => panic!("expected text config, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_and_excel_tags_alias_text() {
        for tag in ["csv", "excel"] {
            let toml_str = format!("type = \"{}\"\nfile = \"data.csv\"\n", tag);
            match BackendConfig::from_toml_str(&toml_str).unwrap() {
                BackendConfig::Text(c) => assert_eq!(c.file, "data.csv"),
                other => panic!("expected text config for {}, got {:?}", tag, other),
            }
        }
    }

    #[test]
    fn test_mysql_config_from_toml() {
        let config = BackendConfig::from_toml_str(
            r#"
            type = "mysql"
            db = "experiments"
            user = "lab"
            password = "hunter2"
            host = "db.internal"
            "#,
        )
        .unwrap();

        match config {
            BackendConfig::Mysql(c) => {
                assert_eq!(c.db, "experiments");
                assert_eq!(c.host, "db.internal");
            }
            other => panic!("expected mysql config, got {:?}", other),
        }
    }

    #[test]
    fn test_sheet_config_defaults() {
        let config = BackendConfig::from_toml_str(
            r#"
            type = "google"
            title = "Run Log"
            email = "lab@example.com"
            password = "hunter2"
            source = "tabgate-tests"
            "#,
        )
        .unwrap();

        match config {
            BackendConfig::Google(c) => {
                assert_eq!(c.sheet, 1);
                assert_eq!(c.key, None);
            }
            other => panic!("expected google config, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        assert!(BackendConfig::from_toml_str("type = \"mongo\"\n").is_err());
    }

    #[test]
    fn test_missing_parameter_fails_to_parse() {
        // mysql without a db name
        let result = BackendConfig::from_toml_str(
            "type = \"mysql\"\nuser = \"lab\"\npassword = \"x\"\nhost = \"h\"\n",
        );
        assert!(result.is_err());
    }
}
