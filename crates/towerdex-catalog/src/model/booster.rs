use serde::{Deserialize, Serialize};
use towerdex_macros::Record;

use super::Collection;

/// A community member boosting the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Booster {
    #[record(String)]
    pub id: String,
    #[record(String)]
    pub discord_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(String)]
    pub discord_nickname: Option<String>,
    /// In-game player id.
    #[serde(alias = "ig_id")]
    #[record(String)]
    pub game_id: String,
    #[serde(default = "active_by_default")]
    #[record(Bool)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(Timestamp)]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(Timestamp)]
    pub updated_at: Option<i64>,
}

fn active_by_default() -> bool {
    true
}

impl Collection for Booster {
    const COLLECTION: &'static str = "boosters";
    const KIND: &'static str = "booster";
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerdex_query::{Record as _, Value};

    #[test]
    fn accepts_original_game_id_name() {
        let booster: Booster =
            serde_json::from_str(r#"{"id":"b1","discord_name":"Skyfall","ig_id":"88-1204"}"#)
                .unwrap();
        assert_eq!(booster.game_id, "88-1204");
        assert!(booster.active);
        assert_eq!(booster.field(Booster::DISCORD_NICKNAME), Value::None);
    }
}
