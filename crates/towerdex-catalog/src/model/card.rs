use serde::{Deserialize, Serialize};
use towerdex_macros::Record;

use super::{label_enum, Collection};

label_enum! {
    /// Card rarity class.
    pub enum CardType: "card type" {
        Normal => "Normal",
        Chain => "Chain",
        Combo => "Combo",
        Elite => "Elite",
    }
}

label_enum! {
    /// Card and turret tier. Display order is the sort precedence.
    pub enum Tier: "tier" {
        T1 => "T1",
        T2 => "T2",
        T3 => "T3",
    }
}

/// An upgrade card for one or more towers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Card {
    #[record(String)]
    pub id: String,
    #[record(String)]
    pub name: String,
    #[serde(rename = "type")]
    #[record(Enum, rename = "type")]
    pub card_type: CardType,
    #[record(Enum)]
    pub tier: Tier,
    /// Names of the towers this card applies to.
    #[record(Tags)]
    pub towers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(String)]
    pub description: Option<String>,
    /// Second tower of a combo card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(String)]
    pub combo_tower: Option<String>,
    /// Card this one upgrades from, for chain cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(String)]
    pub parent_card: Option<String>,
}

impl Collection for Card {
    const COLLECTION: &'static str = "cards";
    const KIND: &'static str = "card";
}
