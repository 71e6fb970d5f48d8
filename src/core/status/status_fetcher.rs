// Status fetching: one bounded query, normalized to `ServerStatus`.
//
// The protocol work lives behind `StatusQuery` (see `infra::query`). This
// wrapper enforces the timeout and folds every failure into `Offline`, so
// callers never deal with query errors. There are no retries here; the next
// scheduled cycle is the retry.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::status_models::{ServerInfo, ServerStatus};
use crate::core::config::DisplayConfig;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Unsupported game type '{0}'")]
    UnsupportedGame(String),
}

/// A game-server query protocol. `port: None` means the protocol default
/// for `game`.
#[async_trait]
pub trait StatusQuery: Send + Sync {
    async fn query(
        &self,
        game: &str,
        host: &str,
        port: Option<u16>,
        timeout: Duration,
    ) -> Result<ServerInfo, QueryError>;
}

pub struct StatusFetcher<Q: StatusQuery> {
    query: Q,
    game: String,
    host: String,
    port: Option<u16>,
    timeout: Duration,
}

impl<Q: StatusQuery> StatusFetcher<Q> {
    pub fn new(query: Q, config: &DisplayConfig) -> Self {
        Self {
            query,
            game: config.game.clone(),
            host: config.host.clone(),
            port: config.port,
            timeout: config.query_timeout,
        }
    }

    /// Query the configured server. Always resolves, within the timeout.
    pub async fn fetch(&self) -> ServerStatus {
        let query = self
            .query
            .query(&self.game, &self.host, self.port, self.timeout);

        let result = match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout(self.timeout)),
        };

        match result {
            Ok(info) => {
                tracing::debug!(
                    game = %self.game,
                    players = info.online_count(),
                    max_players = info.max_players,
                    "Server answered status query"
                );
                ServerStatus::Online(info)
            }
            Err(err) => {
                tracing::debug!(game = %self.game, host = %self.host, "Status query failed: {}", err);
                ServerStatus::Offline
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::status_renderer::tests::test_config;
    use std::time::Instant;

    enum FakeQuery {
        Answer(ServerInfo),
        Fail,
        Hang,
    }

    #[async_trait]
    impl StatusQuery for FakeQuery {
        async fn query(
            &self,
            _: &str,
            _: &str,
            _: Option<u16>,
            _: Duration,
        ) -> Result<ServerInfo, QueryError> {
            match self {
                FakeQuery::Answer(info) => Ok(info.clone()),
                FakeQuery::Fail => Err(QueryError::Protocol("garbage".into())),
                FakeQuery::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(QueryError::Protocol("unreachable".into()))
                }
            }
        }
    }

    fn fetcher(query: FakeQuery) -> StatusFetcher<FakeQuery> {
        let mut config = test_config();
        config.query_timeout = Duration::from_millis(50);
        StatusFetcher::new(query, &config)
    }

    #[tokio::test]
    async fn answered_query_is_online() {
        let info = ServerInfo {
            name: "Lobby".into(),
            map: String::new(),
            max_players: 8,
            players: vec!["Steve".into()],
        };
        let status = fetcher(FakeQuery::Answer(info.clone())).fetch().await;
        assert_eq!(status, ServerStatus::Online(info));
    }

    #[tokio::test]
    async fn failed_query_is_offline() {
        assert_eq!(fetcher(FakeQuery::Fail).fetch().await, ServerStatus::Offline);
    }

    #[tokio::test]
    async fn hanging_query_is_cut_off_by_timeout() {
        let started = Instant::now();
        assert_eq!(fetcher(FakeQuery::Hang).fetch().await, ServerStatus::Offline);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
