//! MySQL server adapter.
//!
//! Statements are passed to the server as literal strings; there is no
//! prepared-statement protocol and no escaping beyond what
//! [`sql_literal`] does for inserted fields. The caller is trusted with
//! the statement text.

use chrono::NaiveDate;
use log::debug;
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};

use crate::backends::{BackendKind, Database};
use crate::config::MySqlConfig;
use crate::error::{Error, Result};
use crate::value::{Row, Table, Value};

/// MySQL backend
///
/// Owns one connection for its whole lifetime; the connection is released
/// when the adapter drops, on every exit path.
pub struct MySqlAdapter {
    conn: Conn,
}

impl MySqlAdapter {
    /// Open a connection to the configured server
    pub fn connect(config: &MySqlConfig) -> Result<Self> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.db.clone()));

        let conn = Conn::new(opts).map_err(|e| {
            Error::Auth(format!(
                "MySQL connection to {} failed: {}",
                config.host, e
            ))
        })?;

        Ok(Self { conn })
    }

    /// Execute an arbitrary SQL statement
    ///
    /// No restriction on the kind of statement beyond those imposed by the
    /// SQL user. The statement commits on success; failures are wrapped
    /// with the statement text and never retried.
    pub fn execute(&mut self, statement: &str) -> Result<()> {
        debug!("executing: {}", statement);
        self.conn
            .query_drop(statement)
            .map_err(|e| Error::QueryFailed {
                statement: statement.to_string(),
                message: e.to_string(),
            })
    }

    /// Execute a statement and return all result rows
    pub fn read(&mut self, statement: &str) -> Result<Table> {
        debug!("querying: {}", statement);
        let rows: Vec<mysql::Row> =
            self.conn.query(statement).map_err(|e| Error::QueryFailed {
                statement: statement.to_string(),
                message: e.to_string(),
            })?;

        Ok(rows
            .into_iter()
            .map(|r| r.unwrap().into_iter().map(value_from_sql).collect())
            .collect())
    }

    /// Insert rows into a table, one `INSERT` statement per row
    ///
    /// Each row's statement commits on its own; a failure at row k leaves
    /// the first k-1 rows applied and performs no rollback.
    pub fn insert(&mut self, table: &str, rows: &Table) -> Result<()> {
        for r in rows {
            let statement = insert_statement(table, r);
            debug!("executing: {}", statement);
            self.conn
                .query_drop(&statement)
                .map_err(|e| Error::RowInsert {
                    table: table.to_string(),
                    row: render_row(r),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}

impl Database for MySqlAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::MySql
    }

    /// `query` is the SQL statement to run
    fn read(&mut self, query: &str) -> Result<Table> {
        MySqlAdapter::read(self, query)
    }

    /// The uniform write surface needs a target table, which this backend
    /// does not bind; use [`MySqlAdapter::insert`] instead
    fn write(&mut self, _table: &Table) -> Result<()> {
        Err(Error::Unsupported(
            "mysql write requires a table name; use MySqlAdapter::insert".to_string(),
        ))
    }
}

/// Build the `INSERT` statement for one row
fn insert_statement(table: &str, row: &Row) -> String {
    let vals = row.iter().map(sql_literal).collect::<Vec<_>>().join(",");
    format!("INSERT INTO {} VALUES ( {} )", table, vals)
}

/// Format one field as a SQL literal
///
/// Text and empty fields are double-quoted with embedded `"` doubled and
/// `\` doubled; numbers are emitted bare; dates as single-quoted ISO.
fn sql_literal(value: &Value) -> String {
    match value {
        Value::Text(s) => quote_text(s),
        Value::Empty => quote_text(""),
        Value::Int(i) => i.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
    }
}

fn quote_text(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\"").replace('\\', "\\\\"))
}

/// Plain-text rendering of a row for error messages
fn render_row(row: &Row) -> String {
    row.iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Map a driver value to a crate [`Value`]
///
/// Text columns get best-effort date coercion; everything else converts
/// directly. Unsigned columns saturate into `Int`, time columns fall back
/// to their text rendering.
fn value_from_sql(value: mysql::Value) -> Value {
    match value {
        mysql::Value::NULL => Value::Empty,
        mysql::Value::Bytes(bytes) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            match coerce_date(&text) {
                Some(d) => Value::Date(d),
                None => Value::Text(text),
            }
        }
        mysql::Value::Int(i) => Value::Int(i),
        mysql::Value::UInt(u) => Value::Int(i64::try_from(u).unwrap_or(i64::MAX)),
        mysql::Value::Float(x) => Value::Float(f64::from(x)),
        mysql::Value::Double(x) => Value::Float(x),
        mysql::Value::Date(y, m, d, 0, 0, 0, 0) => {
            NaiveDate::from_ymd_opt(i32::from(y), u32::from(m), u32::from(d))
                .map(Value::Date)
                .unwrap_or(Value::Empty)
        }
        mysql::Value::Date(y, m, d, h, min, s, _) => Value::Text(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            y, m, d, h, min, s
        )),
        mysql::Value::Time(neg, days, h, min, s, _) => Value::Text(format!(
            "{}{:02}:{:02}:{:02}",
            if neg { "-" } else { "" },
            u32::from(h) + days * 24,
            min,
            s
        )),
    }
}

/// Best-effort date coercion
///
/// A string containing exactly two `/` or exactly two `-` splits into
/// three numeric components taken as year, month, day. Anything else is
/// not date-like.
pub(crate) fn coerce_date(text: &str) -> Option<NaiveDate> {
    for sep in ['/', '-'] {
        if text.matches(sep).count() == 2 {
            let mut parts = text.splitn(3, sep);
            let y = parts.next()?.trim().parse::<i32>().ok()?;
            let m = parts.next()?.trim().parse::<u32>().ok()?;
            let d = parts.next()?.trim().parse::<u32>().ok()?;
            return NaiveDate::from_ymd_opt(y, m, d);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::row;

    #[test]
    fn test_sql_literal_quotes_text_and_empty() {
        assert_eq!(sql_literal(&Value::Text("abc".to_string())), "\"abc\"");
        assert_eq!(sql_literal(&Value::Empty), "\"\"");
    }

    #[test]
    fn test_sql_literal_doubles_embedded_quotes() {
        assert_eq!(
            sql_literal(&Value::Text("say \"hi\"".to_string())),
            "\"say \"\"hi\"\"\""
        );
    }

    #[test]
    fn test_sql_literal_doubles_backslashes() {
        assert_eq!(
            sql_literal(&Value::Text("a\\b".to_string())),
            "\"a\\\\b\""
        );
    }

    #[test]
    fn test_sql_literal_numbers_are_bare() {
        assert_eq!(sql_literal(&Value::Int(42)), "42");
        assert_eq!(sql_literal(&Value::Float(2.5)), "2.5");
        assert_eq!(sql_literal(&Value::Float(87.0)), "87");
    }

    #[test]
    fn test_sql_literal_dates_are_single_quoted() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(sql_literal(&Value::Date(d)), "'2020-01-02'");
    }

    #[test]
    fn test_insert_statement_names_table_and_orders_fields() {
        let r = vec![
            Value::Text("alice".to_string()),
            Value::Int(30),
            Value::Float(95.5),
        ];
        assert_eq!(
            insert_statement("people", &r),
            "INSERT INTO people VALUES ( \"alice\",30,95.5 )"
        );
    }

    #[test]
    fn test_coerce_date_accepts_both_separators() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(coerce_date("2020-01-02"), Some(expected));
        assert_eq!(coerce_date("2020/01/02"), Some(expected));
    }

    #[test]
    fn test_coerce_date_rejects_non_dates() {
        assert_eq!(coerce_date("abc"), None);
        assert_eq!(coerce_date("1-2"), None);
        assert_eq!(coerce_date("1-2-3-4"), None);
        assert_eq!(coerce_date("2020-13-01"), None);
        assert_eq!(coerce_date(""), None);
    }

    #[test]
    fn test_value_from_sql_maps_driver_values() {
        assert_eq!(value_from_sql(mysql::Value::NULL), Value::Empty);
        assert_eq!(value_from_sql(mysql::Value::Int(-3)), Value::Int(-3));
        assert_eq!(value_from_sql(mysql::Value::Double(1.5)), Value::Float(1.5));
        assert_eq!(
            value_from_sql(mysql::Value::Bytes(b"hello".to_vec())),
            Value::Text("hello".to_string())
        );
    }

    #[test]
    fn test_value_from_sql_coerces_date_like_text() {
        let expected = NaiveDate::from_ymd_opt(2019, 6, 30).unwrap();
        assert_eq!(
            value_from_sql(mysql::Value::Bytes(b"2019-06-30".to_vec())),
            Value::Date(expected)
        );
    }

    #[test]
    fn test_value_from_sql_maps_sql_dates() {
        let expected = NaiveDate::from_ymd_opt(2021, 12, 24).unwrap();
        assert_eq!(
            value_from_sql(mysql::Value::Date(2021, 12, 24, 0, 0, 0, 0)),
            Value::Date(expected)
        );
    }

    #[test]
    fn test_render_row_for_error_context() {
        assert_eq!(render_row(&row(["a", "1"])), "a, 1");
    }
}
