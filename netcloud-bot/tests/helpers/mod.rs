//! Recording fakes for the publisher and ledger seams

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use netcloud_bot::catalog::Catalog;
use netcloud_bot::ledger::{Ledger, LedgerRow, FIRST_RECORD_ROW};
use netcloud_bot::publisher::{Attachment, InboundPost, MessageId, Publisher};
use netcloud_bot::{Error, Result};
use netcloud_common::genre::TopicId;
use netcloud_common::TopicMap;

pub const CHANNEL: &str = "NetCloud_Films";
pub const STORAGE_CHAT: i64 = -1002314286062;

/// One outbound republish call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Poster {
        file_id: String,
        caption: String,
        topic: TopicId,
        message_id: MessageId,
    },
    Reply {
        media: Attachment,
        caption: String,
        reply_to: MessageId,
        message_id: MessageId,
    },
}

/// Publisher handing out increasing message ids from 100
#[derive(Default)]
pub struct FakePublisher {
    next_id: AtomicI64,
    pub sent: Mutex<Vec<Sent>>,
    pub fail_replies: AtomicBool,
    pub fail_posters: AtomicBool,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| matches!(s, Sent::Reply { .. }))
            .collect()
    }

    fn allocate(&self) -> MessageId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn publish_poster(
        &self,
        poster: &Attachment,
        caption: &str,
        topic: TopicId,
    ) -> Result<MessageId> {
        if self.fail_posters.load(Ordering::SeqCst) {
            return Err(Error::Telegram("sendPhoto failed (500): simulated".into()));
        }
        let message_id = self.allocate();
        self.sent.lock().unwrap().push(Sent::Poster {
            file_id: poster.file_id().to_string(),
            caption: caption.to_string(),
            topic,
            message_id,
        });
        Ok(message_id)
    }

    async fn publish_reply(
        &self,
        media: &Attachment,
        caption: &str,
        reply_to: MessageId,
    ) -> Result<MessageId> {
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(Error::Telegram("sendVideo failed (400): simulated".into()));
        }
        let message_id = self.allocate();
        self.sent.lock().unwrap().push(Sent::Reply {
            media: media.clone(),
            caption: caption.to_string(),
            reply_to,
            message_id,
        });
        Ok(message_id)
    }
}

/// In-memory sheet; `rows[0]` is sheet row 2 (first record)
#[derive(Default)]
pub struct FakeLedger {
    pub rows: Mutex<Vec<[String; 5]>>,
    pub writes: Mutex<Vec<String>>,
    pub fail_reads: AtomicBool,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<[String; 5]> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of calls that modified the sheet
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn slot(rows: &mut Vec<[String; 5]>, row: u32) -> &mut [String; 5] {
        let idx = (row - FIRST_RECORD_ROW) as usize;
        if rows.len() <= idx {
            rows.resize_with(idx + 1, Default::default);
        }
        &mut rows[idx]
    }
}

fn parse_row(a1: &str) -> u32 {
    a1.trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .split(':')
        .next()
        .unwrap()
        .parse()
        .unwrap()
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn records(&self) -> Result<Vec<LedgerRow>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Sheets("503 simulated".into()));
        }
        // Like the values API, trailing empty rows are not returned
        let rows = self.rows.lock().unwrap();
        let filled = rows
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_empty()))
            .map_or(0, |i| i + 1);
        Ok(rows[..filled]
            .iter()
            .enumerate()
            .map(|(i, r)| LedgerRow {
                index: FIRST_RECORD_ROW + i as u32,
                number: r[0].clone(),
                title: r[1].clone(),
                link: r[2].clone(),
                published: r[3].clone(),
                genre: r[4].clone(),
            })
            .collect())
    }

    async fn update_range(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
        // Only B..E single-row writes are issued by the catalog
        assert!(range.starts_with('B'), "unexpected range {range}");
        let mut rows = self.rows.lock().unwrap();
        let slot = Self::slot(&mut rows, parse_row(range));
        for (i, value) in values[0].iter().enumerate() {
            slot[i + 1] = value.clone();
        }
        self.writes.lock().unwrap().push(format!("update {range}"));
        Ok(())
    }

    async fn update_cell(&self, row: u32, col: u32, value: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        Self::slot(&mut rows, row)[(col - 1) as usize] = value.to_string();
        self.writes.lock().unwrap().push(format!("cell {row},{col}"));
        Ok(())
    }

    async fn insert_blank_row(&self, row: u32) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let idx = (row - FIRST_RECORD_ROW) as usize;
        if idx <= rows.len() {
            rows.insert(idx, Default::default());
        }
        self.writes.lock().unwrap().push(format!("insert {row}"));
        Ok(())
    }
}

pub fn catalog() -> Catalog<FakePublisher, FakeLedger> {
    Catalog::new(FakePublisher::new(), FakeLedger::new(), TopicMap::default(), CHANNEL)
}

pub fn poster(message_id: MessageId, caption: &str) -> InboundPost {
    InboundPost {
        chat_id: STORAGE_CHAT,
        message_id,
        text: Some(caption.to_string()),
        attachment: Some(Attachment::Photo(format!("photo-{message_id}"))),
    }
}

pub fn video(message_id: MessageId, caption: Option<&str>) -> InboundPost {
    InboundPost {
        chat_id: STORAGE_CHAT,
        message_id,
        text: caption.map(str::to_string),
        attachment: Some(Attachment::Video(format!("video-{message_id}"))),
    }
}

pub fn document(message_id: MessageId, caption: Option<&str>) -> InboundPost {
    InboundPost {
        chat_id: STORAGE_CHAT,
        message_id,
        text: caption.map(str::to_string),
        attachment: Some(Attachment::Document(format!("doc-{message_id}"))),
    }
}
