//! Bot API wire types (only the fields the bot reads)

use serde::Deserialize;

use crate::publisher::{Attachment, InboundPost};

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub channel_post: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
    pub video: Option<FileRef>,
    pub document: Option<FileRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

/// Video / document descriptor
#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Subset of a sent message returned by `send*` methods
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

impl Message {
    /// Message text, or the caption for media messages
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// The media this message carries, if any
    ///
    /// Photos come in several sizes; the largest one is used.
    pub fn attachment(&self) -> Option<Attachment> {
        if let Some(photo) = self
            .photo
            .as_ref()
            .and_then(|sizes| sizes.iter().max_by_key(|s| u64::from(s.width) * u64::from(s.height)))
        {
            return Some(Attachment::Photo(photo.file_id.clone()));
        }
        if let Some(video) = &self.video {
            return Some(Attachment::Video(video.file_id.clone()));
        }
        self.document
            .as_ref()
            .map(|d| Attachment::Document(d.file_id.clone()))
    }

    pub fn to_post(&self) -> InboundPost {
        InboundPost {
            chat_id: self.chat.id,
            message_id: self.message_id,
            text: self.text_or_caption().map(str::to_string),
            attachment: self.attachment(),
        }
    }
}

impl Update {
    /// The message carried by this update, channel posts first
    pub fn into_message(self) -> Option<Message> {
        self.channel_post.or(self.message)
    }
}
