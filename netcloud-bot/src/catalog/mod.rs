//! Announcement / video matching
//!
//! Storage posts come in two shapes: a poster with a `Titre - ` / `Genre - `
//! caption, and the movie file itself. Either may arrive first. Posters are
//! republished under their genre topic and recorded as pending; videos are
//! republished as a reply to the matching poster, or parked in the queue until
//! that poster shows up.
//!
//! All mutable matching state lives in [`CatalogState`], owned by the caller
//! and passed in by `&mut`. Handlers for one post run to completion before the
//! next post is handled, so no locking is involved.

pub mod announcement;
pub mod queue;
pub mod registry;

use netcloud_common::{normalize, Genre, TopicMap};
use tracing::{debug, error, info, warn};

use crate::ledger::{entry_range, entry_values, find_row_by_link, Ledger, LINK_COLUMN};
use crate::publisher::{permalink, InboundPost, MessageId, PostKind, Publisher};
use crate::{Error, Result};

pub use announcement::{parse_announcement, Announcement, Rejection};
pub use queue::{QueuedVideo, VideoQueue};
pub use registry::{PendingEntry, PendingRegistry};

/// Caption placeholder meaning "the movie announced last"
pub const SENTINEL_CAPTION: &str = "_";

/// In-memory matching state for one process run
#[derive(Debug, Default)]
pub struct CatalogState {
    pub registry: PendingRegistry,
    pub queue: VideoQueue,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of handling a poster post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementOutcome {
    Published {
        title: String,
        genre: Genre,
        reference: MessageId,
        /// Ledger row written for this title
        row: u32,
        /// Set when a queued video was matched and released
        released: Option<VideoOutcome>,
    },
    Rejected(Rejection),
}

/// Result of handling (or releasing) a video post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoOutcome {
    Published { title: String, message_id: MessageId },
    /// Publication failed; the title stays pending
    Failed { title: String },
    Queued { caption: String },
}

/// Result of routing one storage post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Announcement(AnnouncementOutcome),
    Video(VideoOutcome),
    Ignored,
}

/// Matching logic wired to a publisher and a ledger
pub struct Catalog<P, L> {
    publisher: P,
    ledger: L,
    topics: TopicMap,
    /// Destination channel username, used for permalinks
    channel: String,
}

impl<P: Publisher, L: Ledger> Catalog<P, L> {
    pub fn new(publisher: P, ledger: L, topics: TopicMap, channel: impl Into<String>) -> Self {
        Self {
            publisher,
            ledger,
            topics,
            channel: channel.into(),
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Dispatch a storage post by attachment type
    pub async fn handle_post(
        &self,
        state: &mut CatalogState,
        post: InboundPost,
    ) -> Result<PostOutcome> {
        match post.kind() {
            PostKind::Announcement => {
                debug!(message_id = post.message_id, "Poster post received");
                self.handle_announcement(state, &post)
                    .await
                    .map(PostOutcome::Announcement)
            }
            PostKind::Video => {
                debug!(message_id = post.message_id, "Video post received");
                Ok(PostOutcome::Video(self.handle_video(state, post).await))
            }
            PostKind::Other => {
                debug!(message_id = post.message_id, "Post has no usable media, ignored");
                Ok(PostOutcome::Ignored)
            }
        }
    }

    /// Republish a poster, record it as pending and release a queued video
    ///
    /// Malformed captions are rejected without any outbound call. Republish
    /// and ledger failures propagate.
    pub async fn handle_announcement(
        &self,
        state: &mut CatalogState,
        post: &InboundPost,
    ) -> Result<AnnouncementOutcome> {
        let text = post.text.as_deref().unwrap_or_default();
        let announcement = match parse_announcement(text) {
            Ok(a) => a,
            Err(rejection) => {
                warn!(
                    message_id = post.message_id,
                    reason = %rejection,
                    "Announcement rejected"
                );
                return Ok(AnnouncementOutcome::Rejected(rejection));
            }
        };
        let poster = post
            .attachment
            .as_ref()
            .ok_or(Error::MissingMedia(post.message_id))?;

        let Announcement {
            title,
            genre,
            caption,
        } = announcement;

        let topic = self.topics.topic_for(genre);
        let reference = self
            .publisher
            .publish_poster(poster, &caption, topic)
            .await?;

        if let Some(previous) = state
            .registry
            .upsert(title.clone(), PendingEntry { genre, reference })
        {
            warn!(
                title = %title,
                previous_reference = previous.reference,
                reference,
                "Title announced again while pending, previous entry replaced"
            );
        }

        let row = self.ledger.next_row().await?;
        let link = permalink(&self.channel, reference);
        self.ledger
            .update_range(&entry_range(row), entry_values(&title, &link, genre.label()))
            .await?;
        self.ledger.insert_blank_row(row + 1).await?;

        info!(
            title = %title,
            genre = %genre,
            topic,
            reference,
            row,
            "Poster published and recorded in ledger"
        );

        let released = match state.queue.take_first_matching(&title) {
            Some(queued) => {
                info!(title = %title, video_message_id = queued.post.message_id, "Releasing queued video");
                Some(self.publish_video(state, &queued.post, &title).await)
            }
            None => None,
        };

        Ok(AnnouncementOutcome::Published {
            title,
            genre,
            reference,
            row,
            released,
        })
    }

    /// Publish a video against its pending title, or queue it
    pub async fn handle_video(&self, state: &mut CatalogState, post: InboundPost) -> VideoOutcome {
        let raw = post.text.as_deref().map(str::trim).unwrap_or_default();

        // Resolve the placeholder before any normalization takes place
        let caption = if raw.is_empty() || raw == SENTINEL_CAPTION {
            state
                .registry
                .last_title()
                .map(str::to_string)
                .unwrap_or_else(|| raw.to_string())
        } else {
            raw.to_string()
        };

        let key = normalize(&caption);
        if !key.is_empty() && state.registry.contains(&key) {
            return self.publish_video(state, &post, &key).await;
        }

        info!(
            message_id = post.message_id,
            caption = %caption,
            queued = state.queue.len() + 1,
            "No pending title for video, queued"
        );
        state.queue.push(QueuedVideo {
            post,
            caption: caption.clone(),
        });
        VideoOutcome::Queued { caption }
    }

    /// Reply to the pending poster with the video and fix up the ledger link
    ///
    /// Failures are logged and swallowed; the title then stays pending.
    pub async fn publish_video(
        &self,
        state: &mut CatalogState,
        post: &InboundPost,
        title: &str,
    ) -> VideoOutcome {
        let entry = match state.registry.get(title) {
            Some(entry) => *entry,
            None => {
                error!(title = %title, "Video publication requested for a title that is not pending");
                return VideoOutcome::Failed {
                    title: title.to_string(),
                };
            }
        };

        info!(title = %title, reference = entry.reference, "Publishing video");
        match self.try_publish_video(post, title, entry).await {
            Ok(message_id) => {
                state.registry.remove(title);
                info!(title = %title, message_id, "Video published and ledger updated");
                VideoOutcome::Published {
                    title: title.to_string(),
                    message_id,
                }
            }
            Err(e) => {
                error!(title = %title, error = %e, "Failed to publish video");
                VideoOutcome::Failed {
                    title: title.to_string(),
                }
            }
        }
    }

    async fn try_publish_video(
        &self,
        post: &InboundPost,
        title: &str,
        entry: PendingEntry,
    ) -> Result<MessageId> {
        let media = post
            .attachment
            .as_ref()
            .ok_or(Error::MissingMedia(post.message_id))?;
        let caption = post.text.as_deref().unwrap_or_default().replace('_', "");

        let message_id = self
            .publisher
            .publish_reply(media, &caption, entry.reference)
            .await?;

        let records = self.ledger.records().await?;
        match find_row_by_link(&records, &self.channel, entry.reference) {
            Some(row) => {
                let link = permalink(&self.channel, message_id);
                self.ledger.update_cell(row, LINK_COLUMN, &link).await?;
            }
            None => warn!(
                title = %title,
                reference = entry.reference,
                "No ledger row links to the poster, link left unchanged"
            ),
        }

        Ok(message_id)
    }
}
