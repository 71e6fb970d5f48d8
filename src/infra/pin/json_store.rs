use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;

use crate::core::pin::{PinIdentity, PinStore, PinStoreError};

/// JSON file store for the tracked pin.
///
/// One file can be shared by several bot processes: it holds an object keyed
/// by game name, and each process only ever reads and replaces its own key.
pub struct JsonPinStore {
    path: PathBuf,
    game: String,
}

impl JsonPinStore {
    pub fn new(path: impl AsRef<Path>, game: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            game: game.into(),
        }
    }

    async fn read_all(&self) -> Result<Option<Map<String, Value>>, PinStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path).await?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}

#[async_trait]
impl PinStore for JsonPinStore {
    async fn load(&self) -> Result<PinIdentity, PinStoreError> {
        let Some(mut all) = self.read_all().await? else {
            tracing::warn!("{} not found, using empty pin data", self.path.display());
            return Ok(PinIdentity::default());
        };

        match all.remove(&self.game) {
            Some(entry) => Ok(serde_json::from_value(entry)?),
            None => {
                tracing::warn!("No pin data found for {}, using empty pin data", self.game);
                Ok(PinIdentity::default())
            }
        }
    }

    async fn save(&self, identity: &PinIdentity) -> Result<(), PinStoreError> {
        // Other games' entries are kept; an unreadable file is started over
        let mut all = match self.read_all().await {
            Ok(Some(all)) => all,
            Ok(None) => Map::new(),
            Err(e) => {
                tracing::warn!("Replacing unreadable pin data file: {}", e);
                Map::new()
            }
        };
        all.insert(self.game.clone(), serde_json::to_value(identity)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Write-then-rename so a crash never leaves half a file behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&all)?).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn identity(message_id: u64) -> PinIdentity {
        PinIdentity {
            message_id: Some(message_id),
            guild_id: Some(1),
            channel_id: Some(2),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty_identity() {
        let dir = tempdir().unwrap();
        let store = JsonPinStore::new(dir.path().join("pinData.json"), "minecraft");
        assert_eq!(store.load().await.unwrap(), PinIdentity::default());
    }

    #[tokio::test]
    async fn test_json_persistence_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("pinData.json");

        let store = JsonPinStore::new(&path, "minecraft");
        store.save(&identity(42)).await.unwrap();

        // Reload from file
        let reopened = JsonPinStore::new(&path, "minecraft");
        assert_eq!(reopened.load().await.unwrap(), identity(42));
    }

    #[tokio::test]
    async fn games_share_one_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pinData.json");

        let minecraft = JsonPinStore::new(&path, "minecraft");
        let csgo = JsonPinStore::new(&path, "csgo");
        minecraft.save(&identity(1)).await.unwrap();
        csgo.save(&identity(2)).await.unwrap();
        minecraft.save(&identity(3)).await.unwrap();

        assert_eq!(minecraft.load().await.unwrap(), identity(3));
        assert_eq!(csgo.load().await.unwrap(), identity(2));
        assert_eq!(
            JsonPinStore::new(&path, "rust").load().await.unwrap(),
            PinIdentity::default()
        );
    }

    #[tokio::test]
    async fn reads_records_written_with_string_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pinData.json");
        std::fs::write(
            &path,
            r#"{"minecraft":{"id":"1187000000000000001","guildId":"900","channelId":"901"}}"#,
        )
        .unwrap();

        let loaded = JsonPinStore::new(&path, "minecraft").load().await.unwrap();
        assert_eq!(loaded.message_id, Some(1187000000000000001));
        assert!(loaded.is_tracking());
    }

    #[tokio::test]
    async fn corrupt_file_fails_load_but_not_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pinData.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonPinStore::new(&path, "minecraft");
        assert!(matches!(
            store.load().await,
            Err(PinStoreError::Serialization(_))
        ));

        store.save(&identity(5)).await.unwrap();
        assert_eq!(store.load().await.unwrap(), identity(5));
    }
}
