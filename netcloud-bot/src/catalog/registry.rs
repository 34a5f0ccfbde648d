//! Pending registry: announced titles still waiting for their video

use std::collections::HashMap;

use netcloud_common::Genre;

use crate::publisher::MessageId;

/// An announced title awaiting its video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEntry {
    pub genre: Genre,
    /// Destination message the video will reply to
    pub reference: MessageId,
}

/// Normalized title → pending entry, remembering insertion order
///
/// Order matters for videos posted without a caption, which are attributed
/// to the most recently announced title.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: HashMap<String, PendingEntry>,
    order: Vec<String>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `title`
    ///
    /// A replaced title moves to the most-recent position. Returns the entry
    /// it replaced, if any.
    pub fn upsert(&mut self, title: String, entry: PendingEntry) -> Option<PendingEntry> {
        let previous = self.entries.insert(title.clone(), entry);
        if previous.is_some() {
            self.order.retain(|t| t != &title);
        }
        self.order.push(title);
        previous
    }

    pub fn get(&self, title: &str) -> Option<&PendingEntry> {
        self.entries.get(title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.entries.contains_key(title)
    }

    pub fn remove(&mut self, title: &str) -> Option<PendingEntry> {
        let removed = self.entries.remove(title)?;
        self.order.retain(|t| t != title);
        Some(removed)
    }

    /// Most recently inserted title
    pub fn last_title(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }

    /// Titles in insertion order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
