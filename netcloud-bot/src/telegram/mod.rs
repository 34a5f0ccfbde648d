//! Telegram Bot API client
//!
//! Long polling for inbound updates plus the `send*` calls used to republish
//! into the destination channel. Media is republished by `file_id`, so nothing
//! is downloaded or re-uploaded.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use netcloud_common::config::TelegramConfig;
use netcloud_common::genre::TopicId;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::publisher::{Attachment, MessageId, Publisher};
use crate::{Error, Result};

pub use types::{ApiResponse, Message, SentMessage, Update, User};

const USER_AGENT: &str = concat!("netcloud-bot/", env!("CARGO_PKG_VERSION"));

/// Headroom on top of the long-poll timeout before the HTTP request gives up
const POLL_GRACE: Duration = Duration::from_secs(15);

/// Bot API client bound to one bot token and destination channel
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    /// `{api_base}/bot{token}`
    endpoint: String,
    /// `@username` of the destination channel
    destination: String,
    poll_timeout: u64,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, bot_token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.poll_timeout_secs) + POLL_GRACE)
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", config.api_base.trim_end_matches('/'), bot_token),
            destination: format!("@{}", config.destination_channel.trim_start_matches('@')),
            poll_timeout: config.poll_timeout_secs,
        })
    }

    /// Call a Bot API method with a JSON body
    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        debug!(method, "Bot API call");

        let response: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(Error::Telegram(format!(
                "{} failed ({}): {}",
                method,
                response.error_code.unwrap_or_default(),
                response.description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }

    /// Identity of the bot, used as a startup token check
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({})).await
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": self.poll_timeout,
            "allowed_updates": ["message", "channel_post"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body).await
    }

    /// Plain text message to an arbitrary chat
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<MessageId> {
        let sent: SentMessage = self
            .call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(sent.message_id)
    }

    async fn send_media(&self, media: &Attachment, mut body: Value) -> Result<MessageId> {
        let (method, field) = media_method(media);
        body["chat_id"] = json!(self.destination);
        body[field] = json!(media.file_id());
        let sent: SentMessage = self.call(method, &body).await?;
        Ok(sent.message_id)
    }
}

/// Bot API send method and payload field for a kind of media
fn media_method(media: &Attachment) -> (&'static str, &'static str) {
    match media {
        Attachment::Photo(_) => ("sendPhoto", "photo"),
        Attachment::Video(_) => ("sendVideo", "video"),
        Attachment::Document(_) => ("sendDocument", "document"),
    }
}

#[async_trait]
impl Publisher for TelegramClient {
    async fn publish_poster(
        &self,
        poster: &Attachment,
        caption: &str,
        topic: TopicId,
    ) -> Result<MessageId> {
        self.send_media(
            poster,
            json!({ "caption": caption, "message_thread_id": topic }),
        )
        .await
    }

    async fn publish_reply(
        &self,
        media: &Attachment,
        caption: &str,
        reply_to: MessageId,
    ) -> Result<MessageId> {
        self.send_media(
            media,
            json!({
                "caption": caption,
                "reply_parameters": { "message_id": reply_to },
            }),
        )
        .await
    }
}
