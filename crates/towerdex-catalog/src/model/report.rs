use serde::{Deserialize, Serialize};
use towerdex_macros::Record;

use super::{label_enum, Collection};

label_enum! {
    /// What a report is about.
    pub enum ReportType: "report type" {
        Suggestions => "suggestions",
        Translation => "translation",
        Optimisation => "optimisation",
        Other => "other",
    }
}

/// A user-submitted report or suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Report {
    #[record(String)]
    pub id: String,
    #[record(String)]
    pub title: String,
    #[record(String)]
    pub description: String,
    #[serde(rename = "type")]
    #[record(Enum, rename = "type")]
    pub kind: ReportType,
    #[serde(default)]
    #[record(Number)]
    pub votes: u32,
    /// Moderator who picked the report up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[record(String)]
    pub moderator: Option<String>,
    #[record(String)]
    pub user_id: String,
    /// Milliseconds since the Unix epoch.
    #[record(Timestamp)]
    pub created_at: i64,
    #[record(Timestamp)]
    pub updated_at: i64,
}

impl Collection for Report {
    const COLLECTION: &'static str = "reports";
    const KIND: &'static str = "report";
}
