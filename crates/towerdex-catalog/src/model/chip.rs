use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use towerdex_query::{Record, RecordTag, Value};

use super::{label_enum, Collection};

label_enum! {
    /// Equipment slot a chip can be socketed into.
    pub enum GearType: "gear type" {
        Armor => "Armor",
        Helmet => "Helmet",
        EnergyCore => "Energy Core",
        Boots => "Boots",
        Shield => "Shield",
        Weapon => "Weapon",
    }
}

label_enum! {
    /// Chip rarity, lowest first.
    pub enum ChipRarity: "rarity" {
        Common => "Common",
        Fine => "Fine",
        Rare => "Rare",
        Epic => "Epic",
        Legendary => "Legendary",
        Supreme => "Supreme",
        Ultimate => "Ultimate",
    }
}

/// Boost types offered when adding a chip.
pub const BOOST_TYPES: &[&str] = &[
    "Crit",
    "Crit DMG",
    "Tower Boost",
    "Tower Ability",
    "Tower DMG",
    "Fortress",
    "Conditional DMG",
    "Game Mechanic",
    "DMG Type",
];

/// A gear chip and its value at each rarity.
///
/// Values are free-form text stored exactly as entered (`"12%"`, `"+3"`,
/// `"x2 vs. flying"`). An empty value counts as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chip {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub compatible_gears: Vec<GearType>,
    /// Names of the towers the chip boosts.
    pub affected_towers: Vec<String>,
    pub boost_type: String,
    #[serde(default)]
    pub values: BTreeMap<ChipRarity, String>,
}

impl Chip {
    pub const ID: &'static str = "id";
    pub const NAME: &'static str = "name";
    pub const DESCRIPTION: &'static str = "description";
    pub const COMPATIBLE_GEARS: &'static str = "compatible_gears";
    pub const AFFECTED_TOWERS: &'static str = "affected_towers";
    pub const BOOST_TYPE: &'static str = "boost_type";
    /// Prefix of the per-rarity value fields, e.g. `values.Epic`.
    pub const VALUES_PREFIX: &'static str = "values.";

    /// Query field name of one rarity's value.
    pub fn value_field(rarity: ChipRarity) -> String {
        format!("{}{}", Self::VALUES_PREFIX, rarity)
    }

    /// The value at `rarity`, if set and non-empty.
    pub fn value(&self, rarity: ChipRarity) -> Option<&str> {
        self.values
            .get(&rarity)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Rarities with a value, lowest first.
    pub fn rarities(&self) -> impl Iterator<Item = (ChipRarity, &str)> + '_ {
        ChipRarity::ALL
            .iter()
            .filter_map(move |&r| self.value(r).map(|v| (r, v)))
    }
}

impl Record for Chip {
    fn field(&self, name: &str) -> Value<'_> {
        match name {
            Self::ID => Value::String(&self.id),
            Self::NAME => Value::String(&self.name),
            Self::DESCRIPTION => Value::String(&self.description),
            Self::COMPATIBLE_GEARS => {
                Value::Tags(self.compatible_gears.iter().map(RecordTag::tag).collect())
            }
            Self::AFFECTED_TOWERS => {
                Value::Tags(self.affected_towers.iter().map(String::as_str).collect())
            }
            Self::BOOST_TYPE => Value::String(&self.boost_type),
            other => other
                .strip_prefix(Self::VALUES_PREFIX)
                .and_then(|rarity| rarity.parse::<ChipRarity>().ok())
                .and_then(|rarity| self.value(rarity))
                .map_or(Value::None, Value::String),
        }
    }
}

impl Collection for Chip {
    const COLLECTION: &'static str = "chips";
    const KIND: &'static str = "chip";
}

impl Collection for GearType {
    const COLLECTION: &'static str = "gear_types";
    const KIND: &'static str = "gear type";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chip() -> Chip {
        serde_json::from_str(
            r#"{
                "id": "c1",
                "name": "Overcharge",
                "description": "More laser damage",
                "compatibleGears": ["Weapon", "Energy Core"],
                "affectedTowers": ["Laser", "Teslacoil"],
                "boostType": "Tower DMG",
                "values": {"Common": "5%", "Epic": "", "Legendary": "20%"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn gears_and_towers_are_tags() {
        let chip = chip();
        assert_eq!(
            chip.field(Chip::COMPATIBLE_GEARS),
            Value::Tags(vec!["Weapon", "Energy Core"])
        );
        assert_eq!(
            chip.field(Chip::AFFECTED_TOWERS),
            Value::Tags(vec!["Laser", "Teslacoil"])
        );
    }

    #[test]
    fn rarity_values_are_verbatim_and_empty_means_absent() {
        let chip = chip();
        assert_eq!(chip.field("values.Common"), Value::String("5%"));
        assert_eq!(chip.field(&Chip::value_field(ChipRarity::Legendary)), Value::String("20%"));
        assert_eq!(chip.field("values.Epic"), Value::None);
        assert_eq!(chip.field("values.Rare"), Value::None);
        assert_eq!(chip.field("values.Mythic"), Value::None);

        let rarities: Vec<ChipRarity> = chip.rarities().map(|(r, _)| r).collect();
        assert_eq!(rarities, [ChipRarity::Common, ChipRarity::Legendary]);
    }

    #[test]
    fn serializes_with_original_field_names() {
        let json = serde_json::to_value(chip()).unwrap();
        assert_eq!(json["boostType"], "Tower DMG");
        assert_eq!(json["compatibleGears"][1], "Energy Core");
    }
}
