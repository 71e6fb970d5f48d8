// Turns a `ServerStatus` into the platform-neutral status card.
//
// Pure: no I/O and no clock reads. The caller passes `now`, so the only thing
// that changes between two renders of the same status is the footer.

use chrono::{DateTime, Utc};

use super::status_models::ServerStatus;
use crate::core::config::DisplayConfig;

/// Shown in place of an empty field value (Discord rejects empty fields).
pub const EMPTY_FIELD: &str = "\u{200b}";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusField {
    pub name: &'static str,
    pub value: String,
    pub inline: bool,
}

/// One rendering of the status card. Built fresh for every message write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatus {
    pub author: String,
    pub color: StatusColor,
    pub footer: String,
    pub fields: Vec<StatusField>,
}

impl RenderedStatus {
    #[cfg(test)]
    pub(crate) fn field(&self, name: &str) -> Option<&StatusField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `` `host[:port]` `` as shown in the IP field and the `/ip` reply.
pub fn display_ip(config: &DisplayConfig) -> String {
    format!("`{}`", config.display_address())
}

/// `count/max`, followed by `: a, b` when names are enabled and anyone is on.
pub fn players_summary(status: &ServerStatus, config: &DisplayConfig) -> Option<String> {
    let info = status.info()?;
    let mut summary = format!("{}/{}", info.online_count(), info.max_players);
    if config.show_player_names && !info.players.is_empty() {
        summary.push_str(": ");
        summary.push_str(&info.players.join(", "));
    }
    Some(summary)
}

pub fn format_timestamp(now: DateTime<Utc>, config: &DisplayConfig) -> String {
    now.with_timezone(&config.time_zone)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

pub fn render(status: &ServerStatus, config: &DisplayConfig, now: DateTime<Utc>) -> RenderedStatus {
    let mut fields = vec![StatusField {
        name: "Status",
        value: if status.is_online() {
            "✅ Online".to_string()
        } else {
            "❌ Offline".to_string()
        },
        inline: false,
    }];

    if let ServerStatus::Online(info) = status {
        fields.push(StatusField {
            name: "IP",
            value: display_ip(config),
            inline: false,
        });
        fields.push(StatusField {
            name: "Name",
            value: if info.name.is_empty() {
                EMPTY_FIELD.to_string()
            } else {
                info.name.clone()
            },
            inline: false,
        });

        if config.show_map_field && !info.map.is_empty() {
            fields.push(StatusField {
                name: "Map",
                value: info.map.clone(),
                inline: false,
            });
        }

        fields.push(StatusField {
            name: "Players",
            value: players_summary(status, config).unwrap_or_default(),
            inline: false,
        });
    }

    RenderedStatus {
        author: config.display_name(),
        color: if status.is_online() {
            StatusColor::Online
        } else {
            StatusColor::Offline
        },
        footer: format!("Last update: {}", format_timestamp(now, config)),
        fields,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::status::ServerInfo;
    use chrono::TimeZone;
    use std::time::Duration;

    pub(crate) fn test_config() -> DisplayConfig {
        DisplayConfig {
            game: "minecraft".into(),
            host: "play.example.org".into(),
            port: Some(25565),
            show_player_names: true,
            show_map_field: true,
            time_zone: chrono_tz::Europe::Helsinki,
            pin_update_interval: Duration::from_secs(300),
            query_timeout: Duration::from_secs(2),
        }
    }

    pub(crate) fn survival() -> ServerStatus {
        ServerStatus::Online(ServerInfo {
            name: "Survival".into(),
            map: "world".into(),
            max_players: 20,
            players: vec!["Alice".into(), "Bob".into()],
        })
    }

    fn noon_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn names(rendered: &RenderedStatus) -> Vec<&'static str> {
        rendered.fields.iter().map(|f| f.name).collect()
    }

    #[test]
    fn online_with_names_and_map() {
        let rendered = render(&survival(), &test_config(), noon_utc());

        assert_eq!(names(&rendered), vec!["Status", "IP", "Name", "Map", "Players"]);
        assert_eq!(rendered.field("Players").unwrap().value, "2/20: Alice, Bob");
        assert_eq!(rendered.field("Map").unwrap().value, "world");
        assert_eq!(rendered.field("IP").unwrap().value, "`play.example.org:25565`");
        assert_eq!(rendered.field("Status").unwrap().value, "✅ Online");
        assert_eq!(rendered.color, StatusColor::Online);
        assert_eq!(rendered.author, "Minecraft");
    }

    #[test]
    fn player_names_hidden_when_disabled() {
        let mut config = test_config();
        config.show_player_names = false;
        let rendered = render(&survival(), &config, noon_utc());
        assert_eq!(rendered.field("Players").unwrap().value, "2/20");
    }

    #[test]
    fn empty_server_has_no_name_suffix() {
        let status = ServerStatus::Online(ServerInfo {
            name: String::new(),
            map: String::new(),
            max_players: 10,
            players: vec![],
        });
        let rendered = render(&status, &test_config(), noon_utc());
        assert_eq!(rendered.field("Players").unwrap().value, "0/10");
        assert_eq!(rendered.field("Name").unwrap().value, EMPTY_FIELD);
        // Empty map is skipped even when the map field is enabled
        assert!(rendered.field("Map").is_none());
    }

    #[test]
    fn map_hidden_when_disabled() {
        let mut config = test_config();
        config.show_map_field = false;
        let rendered = render(&survival(), &config, noon_utc());
        assert_eq!(names(&rendered), vec!["Status", "IP", "Name", "Players"]);
    }

    #[test]
    fn offline_only_shows_status() {
        let rendered = render(&ServerStatus::Offline, &test_config(), noon_utc());
        assert_eq!(names(&rendered), vec!["Status"]);
        assert_eq!(rendered.field("Status").unwrap().value, "❌ Offline");
        assert_eq!(rendered.color, StatusColor::Offline);
    }

    #[test]
    fn ip_omits_missing_port() {
        let mut config = test_config();
        config.port = None;
        let rendered = render(&survival(), &config, noon_utc());
        assert_eq!(rendered.field("IP").unwrap().value, "`play.example.org`");
    }

    #[test]
    fn footer_uses_configured_time_zone() {
        let rendered = render(&ServerStatus::Offline, &test_config(), noon_utc());
        assert_eq!(rendered.footer, "Last update: 2024-01-15 14:00:00 +02:00");

        let mut config = test_config();
        config.time_zone = chrono_tz::America::New_York;
        let rendered = render(&ServerStatus::Offline, &config, noon_utc());
        assert_eq!(rendered.footer, "Last update: 2024-01-15 07:00:00 -05:00");
    }

    #[test]
    fn render_is_deterministic_for_a_fixed_clock() {
        let config = test_config();
        assert_eq!(
            render(&survival(), &config, noon_utc()),
            render(&survival(), &config, noon_utc())
        );
    }
}
