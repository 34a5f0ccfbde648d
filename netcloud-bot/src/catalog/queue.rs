//! Videos that arrived before their announcement

use netcloud_common::normalize;

use crate::publisher::InboundPost;

/// A video post waiting for a matching announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedVideo {
    pub post: InboundPost,
    /// Caption as resolved when the video arrived
    pub caption: String,
}

/// Arrival-ordered queue of unmatched videos
#[derive(Debug, Default)]
pub struct VideoQueue {
    items: Vec<QueuedVideo>,
}

impl VideoQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, video: QueuedVideo) {
        self.items.push(video);
    }

    /// Remove and return the oldest video whose caption normalizes to `title`
    pub fn take_first_matching(&mut self, title: &str) -> Option<QueuedVideo> {
        let pos = self
            .items
            .iter()
            .position(|v| normalize(&v.caption) == title)?;
        Some(self.items.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedVideo> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
