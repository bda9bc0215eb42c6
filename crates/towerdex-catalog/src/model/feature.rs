use serde::{Deserialize, Serialize};
use towerdex_macros::Record;

use super::{label_enum, Collection};

label_enum! {
    /// Roadmap state of a feature suggestion.
    pub enum FeatureStatus: "feature status" {
        Planned => "planned",
        InProgress => "in-progress",
        Considering => "considering",
    }
}

/// An upcoming feature users can vote on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct FeatureSuggestion {
    #[record(String)]
    pub id: String,
    #[record(String)]
    pub title: String,
    #[record(String)]
    pub description: String,
    #[serde(default)]
    #[record(Number)]
    pub votes: u32,
    #[record(Enum)]
    pub status: FeatureStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(Timestamp)]
    pub created_at: Option<i64>,
}

impl Collection for FeatureSuggestion {
    const COLLECTION: &'static str = "features";
    const KIND: &'static str = "feature";
}
