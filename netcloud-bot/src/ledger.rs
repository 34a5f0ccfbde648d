//! Spreadsheet ledger
//!
//! The ledger is a human-maintained catalog sheet with a fixed header row:
//!
//! | A  | B             | C             | D      | E     |
//! |----|---------------|---------------|--------|-------|
//! | N° | Titre du film | Lien Telegram | PUBLIÉ | Genre |
//!
//! The bot only appends rows and rewrites link cells. Column A is left to
//! the operators.

use async_trait::async_trait;

use crate::publisher::MessageId;
use crate::{Error, Result};

/// Expected header row, in column order
pub const HEADERS: [&str; 5] = ["N°", "Titre du film", "Lien Telegram", "PUBLIÉ", "Genre"];

/// 1-based column holding the Telegram link
pub const LINK_COLUMN: u32 = 3;

/// Sheet row of the first record (row 1 is the header)
pub const FIRST_RECORD_ROW: u32 = 2;

/// Value written into the PUBLIÉ column
pub const PUBLISHED_MARK: &str = "✅";

/// One record below the header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRow {
    /// 1-based sheet row number
    pub index: u32,
    pub number: String,
    pub title: String,
    pub link: String,
    pub published: String,
    pub genre: String,
}

/// Pass-through operations on the external spreadsheet
///
/// Errors propagate to the caller; nothing is retried here.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// All records below the header, blank rows included
    async fn records(&self) -> Result<Vec<LedgerRow>>;

    /// Row number for the next appended entry
    ///
    /// Trailing empty rows are not part of [`Ledger::records`], so the blank
    /// separator inserted below the previous entry is skipped explicitly.
    /// Blank rows are never reused.
    async fn next_row(&self) -> Result<u32> {
        Ok(append_row(&self.records().await?))
    }

    /// Overwrite a rectangular A1 range with row-major values
    async fn update_range(&self, range: &str, values: Vec<Vec<String>>) -> Result<()>;

    /// Overwrite a single cell (1-based row and column)
    async fn update_cell(&self, row: u32, col: u32, value: &str) -> Result<()>;

    /// Insert an empty row so that it becomes row `row`
    async fn insert_blank_row(&self, row: u32) -> Result<()>;
}

/// Row for a new entry given the current records
///
/// The first entry goes right below the header. Later entries leave one
/// blank row after the last record.
pub fn append_row(records: &[LedgerRow]) -> u32 {
    match records.last() {
        Some(last) => last.index + 2,
        None => FIRST_RECORD_ROW,
    }
}

/// Spreadsheet column letters for a 1-based column index
pub fn column_letter(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 reference for a single cell
pub fn cell_a1(row: u32, col: u32) -> String {
    format!("{}{}", column_letter(col), row)
}

/// Range covering the bot-managed columns (B..E) of one row
pub fn entry_range(row: u32) -> String {
    format!("B{row}:E{row}")
}

/// Values for a freshly announced title, in B..E order
pub fn entry_values(title: &str, link: &str, genre: &str) -> Vec<Vec<String>> {
    vec![vec![
        title.to_string(),
        link.to_string(),
        PUBLISHED_MARK.to_string(),
        genre.to_string(),
    ]]
}

/// Turn raw sheet values (header row first) into records
///
/// The header row must match [`HEADERS`]; short rows are padded with empty
/// cells. An entirely empty sheet has no records.
pub fn rows_to_records(values: Vec<Vec<String>>) -> Result<Vec<LedgerRow>> {
    let mut rows = values.into_iter();

    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };

    let header: Vec<&str> = header.iter().map(|h| h.trim()).collect();
    if header.len() < HEADERS.len() || header[..HEADERS.len()] != HEADERS {
        return Err(Error::Sheets(format!(
            "unexpected header row {:?}, expected {:?}",
            header, HEADERS
        )));
    }

    Ok(rows
        .enumerate()
        .map(|(i, cells)| {
            let cell = |c: usize| cells.get(c).cloned().unwrap_or_default();
            LedgerRow {
                index: FIRST_RECORD_ROW + i as u32,
                number: cell(0),
                title: cell(1),
                link: cell(2),
                published: cell(3),
                genre: cell(4),
            }
        })
        .collect())
}

/// Whether a link cell refers to exactly this message
///
/// `.../12` must not match a cell holding `.../123`.
pub fn link_refers_to(cell: &str, link: &str) -> bool {
    cell.match_indices(link).any(|(at, _)| {
        !cell[at + link.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// First record whose link cell points at `channel/message_id`
pub fn find_row_by_link(
    records: &[LedgerRow],
    channel: &str,
    message_id: MessageId,
) -> Option<u32> {
    let needle = format!("{}/{}", channel, message_id);
    records
        .iter()
        .find(|r| link_refers_to(&r.link, &needle))
        .map(|r| r.index)
}
