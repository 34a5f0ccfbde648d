//! Google Sheets ledger
//!
//! Works on the first sheet of the spreadsheet. The spreadsheet is found by
//! name through the Drive API unless an explicit id is configured.

pub mod auth;

use std::time::Duration;

use async_trait::async_trait;
use netcloud_common::config::SheetsConfig;
use reqwest::{Response, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::ledger::{cell_a1, rows_to_records, Ledger, LedgerRow};
use crate::{Error, Result};

pub use auth::{ServiceAccountKey, TokenProvider};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// First sheet of the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Ledger backed by a Google spreadsheet
pub struct SheetsLedger {
    http: reqwest::Client,
    auth: TokenProvider,
    spreadsheet_id: String,
    sheet: SheetRef,
}

impl SheetsLedger {
    /// Authenticate, locate the spreadsheet and its first sheet
    pub async fn connect(config: &SheetsConfig) -> Result<Self> {
        let key = ServiceAccountKey::from_file(&config.credentials_file)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let auth = TokenProvider::new(http.clone(), key)?;

        let spreadsheet_id = match &config.spreadsheet_id {
            Some(id) => id.clone(),
            None => find_spreadsheet(&http, &auth, &config.spreadsheet_name).await?,
        };
        let sheet = first_sheet(&http, &auth, &spreadsheet_id).await?;

        info!(
            spreadsheet_id = %spreadsheet_id,
            sheet = %sheet.title,
            account = %auth.client_email(),
            "Connected to ledger spreadsheet"
        );

        Ok(Self {
            http,
            auth,
            spreadsheet_id,
            sheet,
        })
    }

    pub fn sheet(&self) -> &SheetRef {
        &self.sheet
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec![self.spreadsheet_id.as_str()];
        all.extend_from_slice(segments);
        api_url(SHEETS_API, &all)
    }

    async fn get_values(&self) -> Result<Vec<Vec<String>>> {
        let range = quoted_sheet(&self.sheet.title);
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(self.url(&["values", range.as_str()])?)
            .bearer_auth(token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?;
        let values: ValueRange = check(response).await?.json().await?;
        Ok(values.values)
    }
}

#[async_trait]
impl Ledger for SheetsLedger {
    async fn records(&self) -> Result<Vec<LedgerRow>> {
        rows_to_records(self.get_values().await?)
    }

    async fn update_range(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
        let range = sheet_range(&self.sheet.title, range);
        debug!(range = %range, "Updating ledger range");

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .put(self.url(&["values", range.as_str()])?)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": values,
            }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update_cell(&self, row: u32, col: u32, value: &str) -> Result<()> {
        self.update_range(&cell_a1(row, col), vec![vec![value.to_string()]])
            .await
    }

    async fn insert_blank_row(&self, row: u32) -> Result<()> {
        if row == 0 {
            return Err(Error::Sheets("row numbers start at 1".to_string()));
        }
        debug!(row, "Inserting blank ledger row");

        let token = self.auth.access_token().await?;
        let batch = format!("{}:batchUpdate", self.spreadsheet_id);
        let response = self
            .http
            .post(api_url(SHEETS_API, &[batch.as_str()])?)
            .bearer_auth(token)
            .json(&insert_row_request(self.sheet.id, row))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn find_spreadsheet(
    http: &reqwest::Client,
    auth: &TokenProvider,
    name: &str,
) -> Result<String> {
    let query = format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        name.replace('\\', "\\\\").replace('\'', "\\'"),
        SPREADSHEET_MIME
    );
    let token = auth.access_token().await?;
    let response = http
        .get(DRIVE_FILES_API)
        .bearer_auth(token)
        .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
        .send()
        .await?;
    let list: DriveFileList = check(response).await?.json().await?;

    list.files
        .into_iter()
        .next()
        .map(|f| f.id)
        .ok_or_else(|| {
            Error::Sheets(format!(
                "spreadsheet '{}' not found or not shared with the service account",
                name
            ))
        })
}

async fn first_sheet(
    http: &reqwest::Client,
    auth: &TokenProvider,
    spreadsheet_id: &str,
) -> Result<SheetRef> {
    let token = auth.access_token().await?;
    let response = http
        .get(api_url(SHEETS_API, &[spreadsheet_id])?)
        .bearer_auth(token)
        .query(&[("fields", "sheets.properties(sheetId,title,index)")])
        .send()
        .await?;
    let meta: SpreadsheetMeta = check(response).await?.json().await?;

    meta.sheets
        .into_iter()
        .map(|s| s.properties)
        .min_by_key(|p| p.index)
        .map(|p| SheetRef {
            id: p.sheet_id,
            title: p.title,
        })
        .ok_or_else(|| Error::Sheets(format!("spreadsheet {} has no sheets", spreadsheet_id)))
}

/// Map non-2xx responses to [`Error::Sheets`] with the response body
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Sheets(format!("{} {}", status, body)))
}

/// Base URL with percent-encoded path segments appended
fn api_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| Error::Sheets(format!("bad URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Sheets(format!("cannot append to {}", base)))?
        .extend(segments);
    Ok(url)
}

/// Sheet title as an A1 range prefix (`'My Sheet'`)
fn quoted_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range qualified with the sheet title
fn sheet_range(title: &str, range: &str) -> String {
    format!("{}!{}", quoted_sheet(title), range)
}

/// `batchUpdate` body inserting one empty row at 1-based `row`
fn insert_row_request(sheet_id: i64, row: u32) -> serde_json::Value {
    json!({
        "requests": [{
            "insertDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row - 1,
                    "endIndex": row,
                },
                "inheritFromBefore": row > 1,
            }
        }]
    })
}
