use serde::{Deserialize, Serialize};

use super::chat_gateway::MessageHandle;

/// The pinned status message this process keeps up to date.
///
/// All fields are `None` until someone runs `/pin`. Snowflakes are written to
/// disk as strings; plain numbers are accepted when reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinIdentity {
    #[serde(rename = "id", default, with = "snowflake")]
    pub message_id: Option<u64>,
    #[serde(default, with = "snowflake")]
    pub guild_id: Option<u64>,
    #[serde(default, with = "snowflake")]
    pub channel_id: Option<u64>,
}

impl PinIdentity {
    /// Only a fully populated identity points at a message.
    pub fn tracked(&self) -> Option<MessageHandle> {
        Some(MessageHandle {
            guild_id: self.guild_id?,
            channel_id: self.channel_id?,
            message_id: self.message_id?,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_tracking(&self) -> bool {
        self.tracked().is_some()
    }
}

impl From<&MessageHandle> for PinIdentity {
    fn from(message: &MessageHandle) -> Self {
        Self {
            message_id: Some(message.message_id),
            guild_id: Some(message.guild_id),
            channel_id: Some(message.channel_id),
        }
    }
}

mod snowflake {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<RawId>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawId::Number(id)) => Ok(Some(id)),
            Some(RawId::Text(text)) => text.parse().map(Some).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_snowflakes_as_strings() {
        let identity = PinIdentity {
            message_id: Some(3),
            guild_id: Some(1),
            channel_id: Some(2),
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "3", "guildId": "1", "channelId": "2" })
        );
    }

    #[test]
    fn reads_nulls_numbers_and_missing_keys() {
        let identity: PinIdentity =
            serde_json::from_str(r#"{ "id": null, "guildId": 10, "channelId": "20" }"#).unwrap();
        assert_eq!(identity.message_id, None);
        assert_eq!(identity.guild_id, Some(10));
        assert_eq!(identity.channel_id, Some(20));
        assert!(!identity.is_tracking());

        let empty: PinIdentity = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, PinIdentity::default());
    }

    #[test]
    fn partial_identity_is_not_tracked() {
        let identity = PinIdentity {
            message_id: Some(1),
            guild_id: None,
            channel_id: Some(2),
        };
        assert!(identity.tracked().is_none());
        assert!(!identity.is_tracking());
    }
}
