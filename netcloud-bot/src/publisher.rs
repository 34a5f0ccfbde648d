//! Inbound posts and the outbound republish seam
//!
//! [`Publisher`] is implemented by the Telegram client in production and by
//! recording fakes in tests, so the catalog logic never talks to the network
//! directly.

use async_trait::async_trait;
use netcloud_common::genre::TopicId;

use crate::Result;

/// Platform message identifier
pub type MessageId = i64;

/// Media carried by a storage post, referenced by platform file id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Photo(String),
    Video(String),
    Document(String),
}

impl Attachment {
    pub fn file_id(&self) -> &str {
        match self {
            Attachment::Photo(id) | Attachment::Video(id) | Attachment::Document(id) => id,
        }
    }
}

/// What a storage post is, judged by its attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    /// Poster image with a caption
    Announcement,
    /// Video or generic file
    Video,
    /// Anything else (plain text, photo without caption, ...)
    Other,
}

/// A message received in the storage channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPost {
    pub chat_id: i64,
    pub message_id: MessageId,
    /// Text or media caption
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

impl InboundPost {
    pub fn kind(&self) -> PostKind {
        let has_text = self
            .text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());

        match &self.attachment {
            Some(Attachment::Photo(_)) if has_text => PostKind::Announcement,
            Some(Attachment::Video(_)) | Some(Attachment::Document(_)) => PostKind::Video,
            _ => PostKind::Other,
        }
    }
}

/// Outbound republish operations against the destination channel
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Post a poster with its caption under a genre topic
    async fn publish_poster(
        &self,
        poster: &Attachment,
        caption: &str,
        topic: TopicId,
    ) -> Result<MessageId>;

    /// Post media as a reply to an earlier destination message
    async fn publish_reply(
        &self,
        media: &Attachment,
        caption: &str,
        reply_to: MessageId,
    ) -> Result<MessageId>;
}

/// Public link to a message in a username-addressed channel
pub fn permalink(channel: &str, message_id: MessageId) -> String {
    format!("https://t.me/{}/{}", channel, message_id)
}
