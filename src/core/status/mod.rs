pub mod status_fetcher;
pub mod status_models;
pub mod status_renderer;

pub use status_fetcher::{QueryError, StatusFetcher, StatusQuery};
pub use status_models::{ServerInfo, ServerStatus};
pub use status_renderer::{RenderedStatus, StatusColor};
