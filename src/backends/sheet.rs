//! Remote spreadsheet service adapter.
//!
//! Speaks the legacy gdata spreadsheet protocol: a ClientLogin token, then
//! JSON feeds (`alt=json`) for spreadsheet lookup, worksheet listing and
//! row data. The worksheet's list feed is fetched once at construction and
//! retained; `read` never goes back to the network.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value as Json;

use crate::backends::{BackendKind, Database};
use crate::config::SheetConfig;
use crate::error::{Error, Result};
use crate::value::{Row, Table, Value};

/// Default service endpoint for the feed API
pub const DEFAULT_FEED_URL: &str = "https://spreadsheets.google.com";

/// Default ClientLogin endpoint
pub const DEFAULT_LOGIN_URL: &str = "https://www.google.com/accounts/ClientLogin";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote spreadsheet backend
///
/// Read-only: the adapter exposes no write operation, and the uniform
/// [`Database::write`] surface fails with [`Error::Unsupported`].
pub struct SheetAdapter {
    /// Authenticated session, kept for the adapter's lifetime
    #[allow(dead_code)]
    client: Client,
    /// Worksheet list feed retained at construction
    entries: Vec<FeedEntry>,
}

impl SheetAdapter {
    /// Authenticate and bind to the configured spreadsheet and worksheet
    ///
    /// Resolution order: sign in, locate the spreadsheet (by URL key when
    /// configured, otherwise by exact title match taking the first hit),
    /// pick the worksheet at the 1-based `sheet` index, then fetch and
    /// retain its full row feed.
    pub fn connect(config: &SheetConfig) -> Result<Self> {
        Self::connect_to(config, DEFAULT_FEED_URL, DEFAULT_LOGIN_URL)
    }

    /// Connect against non-default service endpoints
    pub fn connect_to(config: &SheetConfig, feed_url: &str, login_url: &str) -> Result<Self> {
        let feed_url = feed_url.trim_end_matches('/');
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let token = login(&client, login_url, config)?;

        let spreadsheet_id = match &config.key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => lookup_spreadsheet(&client, &token, feed_url, &config.title)?,
        };

        let worksheets = fetch_feed(
            &client,
            &token,
            &format!("{}/feeds/worksheets/{}/private/full", feed_url, spreadsheet_id),
            &[],
        )?;
        let worksheet_id = select_worksheet(&worksheets, config.sheet)?;

        let rows = fetch_feed(
            &client,
            &token,
            &format!(
                "{}/feeds/list/{}/{}/private/full",
                feed_url, spreadsheet_id, worksheet_id
            ),
            &[],
        )?;
        debug!(
            "retained {} rows from worksheet {} of {}",
            rows.entry.len(),
            worksheet_id,
            spreadsheet_id
        );

        Ok(Self {
            client,
            entries: rows.entry,
        })
    }

    /// Column headers of the retained feed, in column-iteration order
    pub fn headers(&self) -> Vec<String> {
        self.entries
            .first()
            .map(|entry| entry.column_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Rows of the retained feed
    ///
    /// Each row carries the text values of its columns in the feed's
    /// column-iteration order; absent cells come back as [`Value::Empty`].
    pub fn read(&self) -> Table {
        self.entries.iter().map(FeedEntry::row).collect()
    }
}

impl Database for SheetAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Spreadsheet
    }

    /// Return the retained feed; `query` does not apply to this backend
    /// and is ignored
    fn read(&mut self, _query: &str) -> Result<Table> {
        Ok(SheetAdapter::read(self))
    }

    fn write(&mut self, _table: &Table) -> Result<()> {
        Err(Error::Unsupported(
            "the spreadsheet backend is read-only".to_string(),
        ))
    }
}

/// Sign in via ClientLogin and return the auth token
fn login(client: &Client, login_url: &str, config: &SheetConfig) -> Result<String> {
    let response = client
        .post(login_url)
        .form(&[
            ("accountType", "HOSTED_OR_GOOGLE"),
            ("Email", config.email.as_str()),
            ("Passwd", config.password.as_str()),
            ("service", "wise"),
            ("source", config.source.as_str()),
        ])
        .send()?;

    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(Error::Auth(format!(
            "sign-in rejected ({}): {}",
            status.as_u16(),
            body.trim()
        )));
    }

    body.lines()
        .find_map(|line| line.strip_prefix("Auth="))
        .map(str::to_string)
        .ok_or_else(|| Error::Auth("sign-in response carried no Auth token".to_string()))
}

/// Find a spreadsheet by exact title and return its id
fn lookup_spreadsheet(
    client: &Client,
    token: &str,
    feed_url: &str,
    title: &str,
) -> Result<String> {
    let feed = fetch_feed(
        client,
        token,
        &format!("{}/feeds/spreadsheets/private/full", feed_url),
        &[("title", title), ("title-exact", "true")],
    )?;

    if feed.entry.len() > 1 {
        warn!(
            "{} spreadsheets titled {:?}; taking the first",
            feed.entry.len(),
            title
        );
    }
    feed.entry
        .first()
        .map(FeedEntry::id_tail)
        .ok_or_else(|| Error::SpreadsheetNotFound(title.to_string()))
}

/// Pick the worksheet at a 1-based index and return its id
fn select_worksheet(feed: &Feed, sheet: usize) -> Result<String> {
    sheet
        .checked_sub(1)
        .and_then(|i| feed.entry.get(i))
        .map(FeedEntry::id_tail)
        .ok_or(Error::WorksheetOutOfRange(sheet))
}

/// Fetch a feed document as JSON
fn fetch_feed(client: &Client, token: &str, url: &str, query: &[(&str, &str)]) -> Result<Feed> {
    let response = client
        .get(url)
        .query(&[("alt", "json")])
        .query(query)
        .header(AUTHORIZATION, format!("GoogleLogin auth={}", token))
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(Error::Service {
            status: status.as_u16(),
            message,
        });
    }

    let doc: FeedDoc = response.json()?;
    Ok(doc.feed)
}

#[derive(Debug, Deserialize)]
struct FeedDoc {
    feed: Feed,
}

#[derive(Debug, Default, Deserialize)]
struct Feed {
    #[serde(default)]
    entry: Vec<FeedEntry>,
}

/// One feed entry: its id plus whatever other keys the service sent
///
/// List-feed entries carry one `gsx$<header>` key per column; the
/// iteration order of those keys is the feed's column order as parsed.
#[derive(Debug, Deserialize)]
struct FeedEntry {
    id: TextNode,
    #[serde(flatten)]
    fields: serde_json::Map<String, Json>,
}

#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$t")]
    value: String,
}

impl FeedEntry {
    /// Trailing path segment of the entry id (the spreadsheet/worksheet id)
    fn id_tail(&self) -> String {
        self.id
            .value
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Column headers present on this entry
    fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().filter_map(|k| k.strip_prefix("gsx$"))
    }

    /// Text values of this entry's columns
    fn row(&self) -> Row {
        self.fields
            .iter()
            .filter(|(key, _)| key.starts_with("gsx$"))
            .map(|(_, cell)| match cell.get("$t").and_then(Json::as_str) {
                Some(text) => Value::Text(text.to_string()),
                None => Value::Empty,
            })
            .collect()
    }
}
