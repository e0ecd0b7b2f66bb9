//! Backend construction and tag dispatch.

use serde_json::{Map, Value as Json};

use crate::backends::{BackendKind, Database, MySqlAdapter, SheetAdapter, TextAdapter, TextOptions};
use crate::config::{BackendConfig, MySqlConfig, SheetConfig, TextConfig};
use crate::error::{Error, Result};

/// Loose string-keyed parameters for [`connect_tagged`]
pub type Params = Map<String, Json>;

/// Construct the backend a configuration names
///
/// The returned adapter owns its connection handle exclusively; dropping
/// the box releases the file handle, server connection or service session.
pub fn connect(config: &BackendConfig) -> Result<Box<dyn Database>> {
    match config {
        BackendConfig::Text(c) => {
            let options = c
                .separator
                .as_deref()
                .map(TextOptions::with_separator)
                .unwrap_or_default();
            Ok(Box::new(TextAdapter::with_options(&c.file, options)))
        }
        BackendConfig::Mysql(c) => Ok(Box::new(MySqlAdapter::connect(c)?)),
        BackendConfig::Google(c) => Ok(Box::new(SheetAdapter::connect(c)?)),
    }
}

/// Construct a backend from a type tag and loose named parameters
///
/// For callers that hold parameters as an untyped map (a parsed request,
/// a scripting bridge). Tags are matched case-insensitively; an
/// unrecognized tag fails with [`Error::Unsupported`], a missing or
/// wrong-shaped parameter with [`Error::TypeMismatch`].
pub fn connect_tagged(tag: &str, params: &Params) -> Result<Box<dyn Database>> {
    let kind = BackendKind::from_tag(tag)?;
    let config = config_from_params(kind, params)?;
    connect(&config)
}

/// Assemble a typed configuration from loose parameters
fn config_from_params(kind: BackendKind, params: &Params) -> Result<BackendConfig> {
    match kind {
        BackendKind::Text => Ok(BackendConfig::Text(TextConfig {
            file: str_param(params, "file")?,
            separator: opt_str_param(params, "separator")?,
        })),
        BackendKind::MySql => Ok(BackendConfig::Mysql(MySqlConfig {
            db: str_param(params, "db")?,
            user: str_param(params, "user")?,
            password: str_param(params, "password")?,
            host: str_param(params, "host")?,
        })),
        BackendKind::Spreadsheet => Ok(BackendConfig::Google(SheetConfig {
            title: str_param(params, "title")?,
            email: str_param(params, "email")?,
            password: str_param(params, "password")?,
            source: str_param(params, "source")?,
            key: opt_str_param(params, "key")?,
            sheet: sheet_param(params)?,
        })),
    }
}

fn str_param(params: &Params, key: &str) -> Result<String> {
    match params.get(key) {
        Some(Json::String(s)) => Ok(s.clone()),
        Some(other) => Err(Error::TypeMismatch(format!(
            "parameter `{}` must be a string, got {}",
            key, other
        ))),
        None => Err(Error::TypeMismatch(format!("missing parameter `{}`", key))),
    }
}

fn opt_str_param(params: &Params, key: &str) -> Result<Option<String>> {
    match params.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::TypeMismatch(format!(
            "parameter `{}` must be a string, got {}",
            key, other
        ))),
    }
}

fn sheet_param(params: &Params) -> Result<usize> {
    match params.get("sheet") {
        None => Ok(1),
        Some(value) => value
            .as_u64()
            .map(|i| i as usize)
            .ok_or_else(|| {
                Error::TypeMismatch(format!(
                    "parameter `sheet` must be a positive integer, got {}",
                    value
                ))
            }),
    }
}
