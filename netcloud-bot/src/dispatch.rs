//! Update dispatch loop
//!
//! Polls the Bot API and handles one update at a time, in arrival order. The
//! loop owns the [`CatalogState`]; nothing else touches it.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, CatalogState, PostOutcome};
use crate::ledger::Ledger;
use crate::publisher::{InboundPost, Publisher};
use crate::telegram::{TelegramClient, Update};
use crate::Result;

/// Reply to `/start`
pub const GREETING: &str = "👋 Bienvenue sur le bot NetCloud Films ! Envoyez un film dans le bon format pour qu'il soit publié.";

/// Pause after a failed `getUpdates` call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Where an update should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/start` command from any chat
    Start { chat_id: i64, sender: Option<i64> },
    /// Post in the storage channel
    Storage(InboundPost),
    Ignore,
}

/// Decide what to do with an update
pub fn route_update(update: Update, storage_chat_id: i64) -> Route {
    let Some(message) = update.into_message() else {
        return Route::Ignore;
    };

    if message.text.as_deref().is_some_and(is_start_command) {
        return Route::Start {
            chat_id: message.chat.id,
            sender: message.from.as_ref().map(|u| u.id),
        };
    }

    if message.chat.id == storage_chat_id {
        Route::Storage(message.to_post())
    } else {
        Route::Ignore
    }
}

/// `/start`, optionally addressed (`/start@bot`) or with a payload
fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    command == "/start" || command.starts_with("/start@")
}

/// Long-poll loop feeding storage posts into the catalog
pub struct Dispatcher<P, L> {
    telegram: TelegramClient,
    catalog: Catalog<P, L>,
    state: CatalogState,
    storage_chat_id: i64,
}

impl<P: Publisher, L: Ledger> Dispatcher<P, L> {
    pub fn new(telegram: TelegramClient, catalog: Catalog<P, L>, storage_chat_id: i64) -> Self {
        Self {
            telegram,
            catalog,
            state: CatalogState::new(),
            storage_chat_id,
        }
    }

    /// Poll forever; only returns if the task is dropped
    pub async fn run(mut self) -> Result<()> {
        let mut offset: Option<i64> = None;
        info!(storage_chat_id = self.storage_chat_id, "Listening for storage posts");

        loop {
            let updates = match self.telegram.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, retrying in {:?}", POLL_RETRY_DELAY);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                self.handle_update(update).await;
            }
        }
    }

    /// Handle one update; errors are logged and the update dropped
    pub async fn handle_update(&mut self, update: Update) {
        let update_id = update.update_id;
        match route_update(update, self.storage_chat_id) {
            Route::Start { chat_id, sender } => {
                if let Err(e) = self.telegram.send_message(chat_id, GREETING).await {
                    error!(chat_id, error = %e, "Failed to answer /start");
                } else {
                    info!(chat_id, sender = ?sender, "/start command handled");
                }
            }
            Route::Storage(post) => {
                info!(message_id = post.message_id, "New storage post received");
                match self.catalog.handle_post(&mut self.state, post).await {
                    Ok(PostOutcome::Ignored) => {}
                    Ok(outcome) => debug!(?outcome, "Storage post handled"),
                    Err(e) => error!(update_id, error = %e, "Storage post handler failed, post dropped"),
                }
                debug!(
                    pending = self.state.registry.len(),
                    queued = self.state.queue.len(),
                    "Catalog state"
                );
            }
            Route::Ignore => debug!(update_id, "Update ignored"),
        }
    }
}
