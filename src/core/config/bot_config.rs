// Per-game bot configuration.
//
// `config.json` holds one entry per game under `gameConfigs`. A process is
// started with a game name and only that entry is validated and used, so a
// broken entry for another game never stops this one from starting.

use std::path::Path;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use super::duration::parse_duration;

/// Used when an entry does not set `queryTimeout`.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("No config entry found for game '{0}'")]
    UnknownGame(String),
    #[error("Invalid duration for {field}: '{value}'")]
    InvalidDuration { field: &'static str, value: String },
    #[error("Unknown time zone '{0}'")]
    InvalidTimeZone(String),
    #[error("Invalid application id '{0}'")]
    InvalidAppId(String),
    #[error("Missing Discord token: set `token` in the config or DISCORD_TOKEN")]
    MissingToken,
}

/// Settings the status core renders and polls with. Never mutated after load.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub game: String,
    pub host: String,
    pub port: Option<u16>,
    pub show_player_names: bool,
    pub show_map_field: bool,
    pub time_zone: Tz,
    pub pin_update_interval: Duration,
    pub query_timeout: Duration,
}

impl DisplayConfig {
    /// The game name with its first character upper-cased ("minecraft" -> "Minecraft").
    pub fn display_name(&self) -> String {
        let mut chars = self.game.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// `host[:port]`, leaving the port out when none (or 0) is configured.
    pub fn display_address(&self) -> String {
        match self.port {
            Some(port) if port != 0 => format!("{}:{}", self.host, port),
            _ => self.host.clone(),
        }
    }
}

/// Everything one bot process needs at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub display: DisplayConfig,
    /// Verbose (info-level) logging when true, warnings and errors only otherwise.
    pub logging: bool,
    pub token: Option<String>,
    pub app_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    game_configs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawGameConfig {
    game: String,
    host: String,
    port: Option<u16>,
    show_map_field: bool,
    show_player_names: bool,
    logging: bool,
    pin_update_interval: String,
    #[serde(default)]
    query_timeout: Option<String>,
    time_zone: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    app_id: Option<String>,
}

impl BotConfig {
    /// Read `path` and pick the entry for `game`.
    pub async fn load(path: impl AsRef<Path>, game: &str) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&text, game)
    }

    pub fn from_json_str(text: &str, game: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(text)?;

        let entry = file
            .game_configs
            .into_iter()
            .find(|entry| entry.get("game").and_then(|g| g.as_str()) == Some(game))
            .ok_or_else(|| ConfigError::UnknownGame(game.to_string()))?;

        let raw: RawGameConfig = serde_json::from_value(entry)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawGameConfig) -> Result<Self, ConfigError> {
        let pin_update_interval = parse_duration(&raw.pin_update_interval)
            .filter(|d| !d.is_zero())
            .ok_or_else(|| ConfigError::InvalidDuration {
                field: "pinUpdateInterval",
                value: raw.pin_update_interval.clone(),
            })?;

        let query_timeout = match raw.query_timeout {
            Some(value) => parse_duration(&value)
                .filter(|d| !d.is_zero())
                .ok_or(ConfigError::InvalidDuration {
                    field: "queryTimeout",
                    value,
                })?,
            None => DEFAULT_QUERY_TIMEOUT,
        };

        let time_zone: Tz = raw
            .time_zone
            .parse()
            .map_err(|_| ConfigError::InvalidTimeZone(raw.time_zone.clone()))?;

        let app_id = match raw.app_id {
            Some(id) => Some(
                id.parse::<u64>()
                    .ok()
                    .filter(|id| *id != 0)
                    .ok_or(ConfigError::InvalidAppId(id))?,
            ),
            None => None,
        };

        Ok(Self {
            display: DisplayConfig {
                game: raw.game,
                host: raw.host,
                port: raw.port,
                show_player_names: raw.show_player_names,
                show_map_field: raw.show_map_field,
                time_zone,
                pin_update_interval,
                query_timeout,
            },
            logging: raw.logging,
            token: raw.token.filter(|t| !t.trim().is_empty()),
            app_id,
        })
    }

    /// The token to log in with. An environment token beats the config file.
    pub fn resolve_token(&self, env_token: Option<String>) -> Result<String, ConfigError> {
        env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone())
            .ok_or(ConfigError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "gameConfigs": [
            {
                "game": "minecraft",
                "host": "mc.example.org",
                "port": null,
                "showMapField": false,
                "showPlayerNames": true,
                "logging": true,
                "pinUpdateInterval": "5m",
                "timeZone": "Europe/Helsinki",
                "token": "file-token",
                "appId": "123456789012345678"
            },
            {
                "game": "csgo",
                "host": "10.0.0.5",
                "port": 27016,
                "showMapField": true,
                "showPlayerNames": false,
                "logging": false,
                "pinUpdateInterval": "30 seconds",
                "queryTimeout": "1500ms",
                "timeZone": "UTC"
            },
            { "game": "broken" }
        ]
    }"#;

    #[test]
    fn picks_the_requested_game() {
        let config = BotConfig::from_json_str(SAMPLE, "csgo").unwrap();
        assert_eq!(config.display.host, "10.0.0.5");
        assert_eq!(config.display.port, Some(27016));
        assert_eq!(config.display.pin_update_interval, Duration::from_secs(30));
        assert_eq!(config.display.query_timeout, Duration::from_millis(1500));
        assert_eq!(config.display.time_zone, chrono_tz::UTC);
        assert!(config.token.is_none());
        assert!(config.app_id.is_none());
        assert!(!config.logging);
    }

    #[test]
    fn defaults_and_optional_fields() {
        let config = BotConfig::from_json_str(SAMPLE, "minecraft").unwrap();
        assert_eq!(config.display.port, None);
        assert_eq!(config.display.query_timeout, DEFAULT_QUERY_TIMEOUT);
        assert_eq!(config.display.time_zone, chrono_tz::Europe::Helsinki);
        assert_eq!(config.app_id, Some(123456789012345678));
        assert_eq!(config.display.display_name(), "Minecraft");
        assert_eq!(config.display.display_address(), "mc.example.org");
    }

    #[test]
    fn unknown_game_is_an_error() {
        let err = BotConfig::from_json_str(SAMPLE, "factorio").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownGame(game) if game == "factorio"));
    }

    #[test]
    fn incomplete_entry_fails_only_for_its_own_game() {
        assert!(matches!(
            BotConfig::from_json_str(SAMPLE, "broken"),
            Err(ConfigError::Parse(_))
        ));
        assert!(BotConfig::from_json_str(SAMPLE, "csgo").is_ok());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let extra = SAMPLE.replace("\"logging\": false,", "\"logging\": false, \"prefix\": \"!\",");
        assert!(matches!(
            BotConfig::from_json_str(&extra, "csgo"),
            Err(ConfigError::Parse(_))
        ));

        let bad_zone = SAMPLE.replace("\"UTC\"", "\"Mars/Olympus\"");
        assert!(matches!(
            BotConfig::from_json_str(&bad_zone, "csgo"),
            Err(ConfigError::InvalidTimeZone(_))
        ));

        let bad_interval = SAMPLE.replace("\"30 seconds\"", "\"whenever\"");
        assert!(matches!(
            BotConfig::from_json_str(&bad_interval, "csgo"),
            Err(ConfigError::InvalidDuration { field: "pinUpdateInterval", .. })
        ));
    }

    #[test]
    fn env_token_overrides_file_token() {
        let config = BotConfig::from_json_str(SAMPLE, "minecraft").unwrap();
        assert_eq!(config.resolve_token(Some("env".into())).unwrap(), "env");
        assert_eq!(config.resolve_token(None).unwrap(), "file-token");

        let no_token = BotConfig::from_json_str(SAMPLE, "csgo").unwrap();
        assert!(matches!(
            no_token.resolve_token(Some(" ".into())),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn display_address_includes_port_when_set() {
        let config = BotConfig::from_json_str(SAMPLE, "csgo").unwrap();
        assert_eq!(config.display.display_address(), "10.0.0.5:27016");
        assert_eq!(config.display.display_name(), "Csgo");
    }
}
