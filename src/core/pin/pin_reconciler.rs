// Keeps the single pinned status message in sync with the latest fetch.
//
// Two entry points:
// - `refresh` runs on every cycle. It edits the tracked message in place and
//   never creates, pins or persists anything. When the message can't be
//   found it logs and skips; the identity is left alone until the next `/pin`.
// - `create_and_track` runs for `/pin`. It posts and pins a new message,
//   unpins the old one on a best-effort basis, and persists the new identity.
//
// The identity is only ever replaced as a whole, after it has been persisted,
// so a concurrent `refresh` sees either the old pin or the new one.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use super::chat_gateway::{ChannelHandle, ChatError, ChatGateway, MessageHandle};
use super::pin_models::PinIdentity;
use super::pin_store::{PinStore, PinStoreError};
use crate::core::config::DisplayConfig;
use crate::core::status::status_renderer::render;
use crate::core::status::ServerStatus;

#[derive(Debug, Error)]
pub enum PinError {
    #[error("Failed to send status message: {0}")]
    Send(ChatError),
    #[error("Failed to pin status message: {0}")]
    Pin(ChatError),
    #[error("Failed to save pin data: {0}")]
    Store(#[from] PinStoreError),
}

/// What a scheduled refresh ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No pin has been created yet.
    Untracked,
    /// The guild, channel or pinned message could not be found.
    Unresolved,
    Updated,
    EditFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinOutcome {
    pub identity: PinIdentity,
    pub old_pin_removed: bool,
}

pub struct PinReconciler<G: ChatGateway, S: PinStore> {
    gateway: G,
    store: S,
    config: DisplayConfig,
    identity: RwLock<PinIdentity>,
    // `/pin` invocations run one at a time
    pin_lock: Mutex<()>,
}

impl<G: ChatGateway, S: PinStore> PinReconciler<G, S> {
    pub fn new(gateway: G, store: S, config: DisplayConfig, identity: PinIdentity) -> Self {
        Self {
            gateway,
            store,
            config,
            identity: RwLock::new(identity),
            pin_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    #[cfg(test)]
    pub(crate) async fn identity(&self) -> PinIdentity {
        self.identity.read().await.clone()
    }

    /// Guild, then channel, then pinned message. `None` as soon as one is missing.
    async fn resolve(&self, tracked: &MessageHandle) -> Result<Option<MessageHandle>, ChatError> {
        if !self.gateway.guild_exists(tracked.guild_id).await? {
            tracing::info!("Unable to find guild with id {}", tracked.guild_id);
            return Ok(None);
        }

        let Some(channel) = self
            .gateway
            .find_text_channel(tracked.guild_id, tracked.channel_id)
            .await?
        else {
            tracing::info!("Unable to find channel with id {}", tracked.channel_id);
            return Ok(None);
        };

        let message = self
            .gateway
            .find_pinned_message(&channel, tracked.message_id)
            .await?;
        if message.is_none() {
            tracing::info!("Unable to find pinned message {}", tracked.message_id);
        }
        Ok(message)
    }

    pub async fn refresh(&self, status: &ServerStatus, now: DateTime<Utc>) -> RefreshOutcome {
        let Some(tracked) = self.identity.read().await.tracked() else {
            tracing::debug!("No pinned message set, skipping pin update");
            return RefreshOutcome::Untracked;
        };

        let message = match self.resolve(&tracked).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                tracing::info!("Pinned message not found, could not update");
                return RefreshOutcome::Unresolved;
            }
            Err(e) => {
                tracing::warn!("Failed to look up pinned message: {}", e);
                return RefreshOutcome::Unresolved;
            }
        };

        let rendered = render(status, &self.config, now);
        match self.gateway.edit_status(&message, &rendered).await {
            Ok(()) => {
                tracing::info!(message_id = message.message_id, "Updated pin");
                RefreshOutcome::Updated
            }
            Err(e) => {
                tracing::error!("Pin update failed: {}", e);
                RefreshOutcome::EditFailed
            }
        }
    }

    pub async fn create_and_track(
        &self,
        status: &ServerStatus,
        target: &ChannelHandle,
        now: DateTime<Utc>,
    ) -> Result<PinOutcome, PinError> {
        let _guard = self.pin_lock.lock().await;
        let previous = self.identity.read().await.clone();

        let rendered = render(status, &self.config, now);
        let message = self
            .gateway
            .send_status(target, &rendered)
            .await
            .map_err(PinError::Send)?;
        self.gateway.pin(&message).await.map_err(PinError::Pin)?;

        tracing::info!(
            guild_id = message.guild_id,
            channel_id = message.channel_id,
            message_id = message.message_id,
            "Pinned new status message"
        );

        let old_pin_removed = match previous.tracked() {
            Some(old) => self.unpin_previous(&old).await,
            None => false,
        };

        let identity = PinIdentity::from(&message);
        self.store.save(&identity).await?;
        *self.identity.write().await = identity.clone();

        Ok(PinOutcome {
            identity,
            old_pin_removed,
        })
    }

    /// Never fails the surrounding `/pin`; the result only says whether it worked.
    async fn unpin_previous(&self, old: &MessageHandle) -> bool {
        let message = match self.resolve(old).await {
            Ok(Some(message)) => message,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Couldn't look up previous pinned message: {}", e);
                return false;
            }
        };

        match self.gateway.unpin(&message).await {
            Ok(()) => {
                tracing::info!("Removed old pinned message: {}", message.message_id);
                true
            }
            Err(e) => {
                tracing::warn!("Couldn't unpin previous message: {}", e);
                false
            }
        }
    }
}
