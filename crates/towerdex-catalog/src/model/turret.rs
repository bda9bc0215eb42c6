use serde::{Deserialize, Serialize};
use towerdex_query::{Number, Record, Value};

use super::Collection;

/// Combat stats of a turret.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurretStats {
    pub power: u32,
    pub defense: u32,
    pub range: u32,
    #[serde(rename = "fireRate")]
    pub fire_rate: f64,
}

/// A turret as served by the read-only API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<TurretStats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<String>,
}

impl Turret {
    pub const NAME: &'static str = "name";
    pub const TYPE: &'static str = "type";
    pub const TIER: &'static str = "tier";
    pub const DESCRIPTION: &'static str = "description";
    pub const ABILITIES: &'static str = "abilities";
    pub const POWER: &'static str = "stats.power";
    pub const DEFENSE: &'static str = "stats.defense";
    pub const RANGE: &'static str = "stats.range";
    pub const FIRE_RATE: &'static str = "stats.fire_rate";
}

impl Record for Turret {
    fn field(&self, name: &str) -> Value<'_> {
        let stat = |pick: fn(&TurretStats) -> Number| {
            self.stats
                .as_ref()
                .map_or(Value::None, |s| Value::Number(pick(s)))
        };
        match name {
            "id" => Value::String(&self.id),
            Self::NAME => Value::String(&self.name),
            Self::TYPE => Value::String(&self.kind),
            Self::TIER => self.tier.as_deref().map_or(Value::None, Value::String),
            Self::DESCRIPTION => Value::String(&self.description),
            Self::ABILITIES => Value::Tags(self.abilities.iter().map(String::as_str).collect()),
            Self::POWER => stat(|s| s.power.into()),
            Self::DEFENSE => stat(|s| s.defense.into()),
            Self::RANGE => stat(|s| s.range.into()),
            Self::FIRE_RATE => stat(|s| s.fire_rate.into()),
            _ => Value::None,
        }
    }
}

impl Collection for Turret {
    const COLLECTION: &'static str = "turrets";
    const KIND: &'static str = "turret";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_are_nested_fields() {
        let turret: Turret = serde_json::from_str(
            r#"{"id":"2","name":"Railgun","type":"Kinetic","description":"d","tier":"T2",
                "stats":{"power":15,"defense":3,"range":12,"fireRate":1.2},
                "abilities":["Armor Piercing","Charged Shot"]}"#,
        )
        .unwrap();
        assert_eq!(turret.field(Turret::POWER), Value::Number(Number::U64(15)));
        assert_eq!(turret.field(Turret::FIRE_RATE), Value::Number(Number::F64(1.2)));
        assert_eq!(turret.field(Turret::TYPE), Value::String("Kinetic"));
    }

    #[test]
    fn missing_stats_read_as_absent() {
        let turret: Turret =
            serde_json::from_str(r#"{"id":"9","name":"Decoy","type":"Kinetic","description":""}"#)
                .unwrap();
        assert_eq!(turret.field(Turret::POWER), Value::None);
        assert_eq!(turret.field(Turret::TIER), Value::None);
        assert_eq!(turret.field(Turret::ABILITIES), Value::Tags(vec![]));
    }
}
