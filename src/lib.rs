//! # tabgate
//!
//! Uniform read/write access to heterogeneous tabular backends - treat a
//! delimited text file, a MySQL server or a remote spreadsheet as the same
//! kind of "database" without branching on backend type.
//!
//! ## Features
//!
//! - **Shared capability**: every backend implements the [`Database`]
//!   trait's read/write surface
//! - **Tag dispatch**: [`connect_tagged`] builds the right adapter from a
//!   type tag (`google`, `excel`/`text`/`csv`, `mysql`) and named
//!   parameters; unrecognized tags fail with [`Error::Unsupported`]
//! - **Config files**: [`BackendConfig`] is serde-tagged and loads from
//!   TOML, so deployments pick their backend without recompiling
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabgate::{connect, BackendConfig};
//!
//! let config = BackendConfig::from_toml_str(r#"
//!     type = "csv"
//!     file = "runs.csv"
//! "#)?;
//!
//! let mut db = connect(&config)?;
//! for row in db.read("")? {
//!     println!("{:?}", row);
//! }
//! ```
//!
//! All operations are synchronous and blocking; each adapter exclusively
//! owns one connection handle and releases it on drop.

pub mod backends;
pub mod config;
pub mod error;
pub mod factory;
pub mod value;

// Re-exports
pub use backends::{
    BackendKind, Database, MySqlAdapter, SheetAdapter, TextAdapter, TextOptions,
};
pub use config::{BackendConfig, MySqlConfig, SheetConfig, TextConfig};
pub use error::{Error, Result};
pub use factory::{connect, connect_tagged, Params};
pub use value::{row, Row, Table, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        // Verify the factory surface is accessible through the crate root
        let _: fn(&BackendConfig) -> Result<Box<dyn Database>> = connect;
        let _: fn(&str) -> Result<BackendKind> = BackendKind::from_tag;
        assert!(!VERSION.is_empty());
    }
}
