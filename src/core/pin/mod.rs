pub mod chat_gateway;
pub mod pin_models;
pub mod pin_reconciler;
pub mod pin_store;

pub use chat_gateway::{ChannelHandle, ChatError, ChatGateway, MessageHandle};
pub use pin_models::PinIdentity;
pub use pin_reconciler::{PinError, PinOutcome, PinReconciler, RefreshOutcome};
pub use pin_store::{PinStore, PinStoreError};
