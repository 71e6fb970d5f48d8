// Presence updates: the short "Minecraft | 3/20" line next to the bot's name.
//
// Best-effort by contract. A failed presence push is logged and dropped; it
// never reaches the cycle that triggered it.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::DisplayConfig;
use crate::core::status::ServerStatus;

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("Presence rejected: {0}")]
    InvalidActivity(String),
}

/// Where presence updates go. `online = false` shows the bot as idle.
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn set_presence(&self, label: &str, online: bool) -> Result<(), PresenceError>;
}

/// `"<Display> | <count>/<max>"` when online, `"<Display> | Offline"` otherwise.
pub fn presence_label(status: &ServerStatus, config: &DisplayConfig) -> String {
    let info_text = match status.info() {
        Some(info) => format!("{}/{}", info.online_count(), info.max_players),
        None => "Offline".to_string(),
    };
    format!("{} | {}", config.display_name(), info_text)
}

pub struct PresenceUpdater<P: PresenceSink> {
    sink: P,
    config: DisplayConfig,
}

impl<P: PresenceSink> PresenceUpdater<P> {
    pub fn new(sink: P, config: DisplayConfig) -> Self {
        Self { sink, config }
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &P {
        &self.sink
    }

    pub async fn update(&self, status: &ServerStatus) {
        let label = presence_label(status, &self.config);
        let online = status.is_online();

        match self.sink.set_presence(&label, online).await {
            Ok(()) => tracing::info!(
                "Set presence to {} and status to {}",
                label,
                if online { "online" } else { "idle" }
            ),
            Err(e) => tracing::warn!("Failed to update presence: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::status_renderer::tests::{survival, test_config};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<(String, bool)>>,
        fail: bool,
    }

    #[async_trait]
    impl PresenceSink for RecordingSink {
        async fn set_presence(&self, label: &str, online: bool) -> Result<(), PresenceError> {
            self.calls.lock().unwrap().push((label.to_string(), online));
            if self.fail {
                return Err(PresenceError::InvalidActivity("too long".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn labels() {
        let config = test_config();
        assert_eq!(presence_label(&survival(), &config), "Minecraft | 2/20");
        assert_eq!(
            presence_label(&ServerStatus::Offline, &config),
            "Minecraft | Offline"
        );
    }

    #[tokio::test]
    async fn online_and_idle_states() {
        let updater = PresenceUpdater::new(RecordingSink::default(), test_config());
        updater.update(&survival()).await;
        updater.update(&ServerStatus::Offline).await;

        let calls = updater.sink.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("Minecraft | 2/20".to_string(), true),
                ("Minecraft | Offline".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let updater = PresenceUpdater::new(sink, test_config());
        updater.update(&ServerStatus::Offline).await;
        assert_eq!(updater.sink.calls.lock().unwrap().len(), 1);
    }
}
