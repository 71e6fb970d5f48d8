use async_trait::async_trait;
use thiserror::Error;

use super::pin_models::PinIdentity;

#[derive(Debug, Error)]
pub enum PinStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for the tracked pin. Loaded once at startup, saved after each `/pin`.
#[async_trait]
pub trait PinStore: Send + Sync {
    async fn load(&self) -> Result<PinIdentity, PinStoreError>;
    async fn save(&self, identity: &PinIdentity) -> Result<(), PinStoreError>;
}
