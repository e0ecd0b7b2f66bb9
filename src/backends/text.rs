//! Delimited-text file adapter.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::backends::{BackendKind, Database};
use crate::error::Result;
use crate::value::{Row, Table, Value};

/// Options for the text backend
#[derive(Debug, Clone)]
pub struct TextOptions {
    /// Field separator (default: a single space)
    ///
    /// A `.csv` or `.tsv` filename suffix overrides this on every read and
    /// write, regardless of what is configured or passed per call.
    pub separator: String,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            separator: " ".to_string(),
        }
    }
}

impl TextOptions {
    /// Options with an explicit separator
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

/// Delimited text file backend
///
/// Rows are plain lines split on a separator. There is no header handling
/// and no quoting: a field containing the separator or a newline will not
/// survive a round trip.
pub struct TextAdapter {
    /// Path to the backing file
    path: PathBuf,
    /// Separator configuration
    options: TextOptions,
}

impl TextAdapter {
    /// Create an adapter bound to a file path
    ///
    /// The file does not have to exist yet; reads of a missing file fail
    /// with the underlying `NotFound` IO error, while writes create it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, TextOptions::default())
    }

    /// Create an adapter with custom options
    pub fn with_options(path: impl AsRef<Path>, options: TextOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Separator actually used for this file
    ///
    /// `.csv` forces a comma and `.tsv` a tab; any other suffix keeps the
    /// requested separator.
    fn effective_separator<'a>(&self, requested: &'a str) -> &'a str {
        match self.path.extension().and_then(OsStr::to_str) {
            Some("csv") => {
                if requested != "," {
                    debug!("{}: .csv suffix overrides separator", self.path.display());
                }
                ","
            }
            Some("tsv") => {
                if requested != "\t" {
                    debug!("{}: .tsv suffix overrides separator", self.path.display());
                }
                "\t"
            }
            _ => requested,
        }
    }

    /// Read the whole file using the configured separator
    pub fn read(&self) -> Result<Table> {
        let separator = self.options.separator.clone();
        self.read_with(&separator)
    }

    /// Read the whole file, splitting each line on `separator`
    ///
    /// Trailing `\r`, `\n` and `\t` are stripped from each line before
    /// splitting. Every field comes back as [`Value::Text`]; nothing is
    /// coerced.
    pub fn read_with(&self, separator: &str) -> Result<Table> {
        let separator = self.effective_separator(separator);
        let contents = fs::read_to_string(&self.path)?;

        Ok(contents
            .lines()
            .map(|line| {
                line.trim_end_matches(['\r', '\n', '\t'])
                    .split(separator)
                    .map(Value::from)
                    .collect::<Row>()
            })
            .collect())
    }

    /// Overwrite the file with the given rows using the configured separator
    pub fn write(&self, table: &Table) -> Result<()> {
        let separator = self.options.separator.clone();
        self.write_with(table, &separator)
    }

    /// Overwrite the file with the given rows
    ///
    /// Fields are joined with `separator` and rows with `\n`, without a
    /// trailing newline. The file is truncated first; there is no append
    /// mode.
    pub fn write_with(&self, table: &Table, separator: &str) -> Result<()> {
        let separator = self.effective_separator(separator);
        let contents = table
            .iter()
            .map(|r| {
                r.iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(separator)
            })
            .collect::<Vec<_>>()
            .join("\n");

        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Overwrite the file with a payload that is already one string
    ///
    /// The payload is written verbatim, with no separator or row handling.
    pub fn write_raw(&self, contents: &str) -> Result<()> {
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Database for TextAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Text
    }

    /// Read the whole file; `query` does not apply to this backend and is
    /// ignored
    fn read(&mut self, _query: &str) -> Result<Table> {
        TextAdapter::read(self)
    }

    fn write(&mut self, table: &Table) -> Result<()> {
        TextAdapter::write(self, table)
    }
}
