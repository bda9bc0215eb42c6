use serde::{Deserialize, Serialize};
use towerdex_macros::Record;
use towerdex_query::TagMap;

use super::Collection;

/// A tower, the unit cards and chips apply to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Tower {
    #[record(String)]
    pub id: String,
    #[record(String)]
    pub name: String,
    /// Tower type, e.g. `Energy` or `Kinetic`.
    #[serde(rename = "type")]
    #[record(String, rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(String)]
    pub description: Option<String>,
}

impl Collection for Tower {
    const COLLECTION: &'static str = "towers";
    const KIND: &'static str = "tower";
}

/// Tower name to tower type, for "chips affecting any Energy tower" filters.
pub fn tower_types<'a, I>(towers: I) -> TagMap
where
    I: IntoIterator<Item = &'a Tower>,
{
    towers
        .into_iter()
        .map(|t| (t.name.clone(), t.kind.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerdex_query::{Record as _, Value};

    #[test]
    fn type_is_exposed_under_its_serde_name() {
        let tower: Tower =
            serde_json::from_str(r#"{"id":"t1","name":"Laser","type":"Energy"}"#).unwrap();
        assert_eq!(tower.field(Tower::TYPE), Value::String("Energy"));
        assert_eq!(tower.field(Tower::DESCRIPTION), Value::None);
    }

    #[test]
    fn type_map() {
        let towers = [
            Tower {
                id: "1".into(),
                name: "Laser".into(),
                kind: "Energy".into(),
                description: None,
            },
            Tower {
                id: "2".into(),
                name: "Railgun".into(),
                kind: "Kinetic".into(),
                description: None,
            },
        ];
        let map = tower_types(&towers);
        assert_eq!(map.get("Laser"), Some("Energy"));
        assert_eq!(map.get("Hive"), None);
    }
}
