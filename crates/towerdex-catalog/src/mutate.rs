//! The mutation gateway seam and its validated inputs.
//!
//! Inputs check themselves with `validate()` before a backend applies them,
//! so every [`Mutate`] implementation rejects the same bad forms.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::model::{Booster, Chip, ChipRarity, FeatureSuggestion, GearType, Report, ReportType};

pub const REPORT_TITLE_CHARS: (usize, usize) = (3, 100);
pub const REPORT_DESCRIPTION_CHARS: (usize, usize) = (10, 1000);
pub const DISCORD_NAME_MIN_CHARS: usize = 3;

/// Write operations on the catalog.
#[async_trait]
pub trait Mutate: Send + Sync {
    async fn create_chip(&self, chip: NewChip) -> Result<Chip>;
    async fn create_report(&self, user_id: &str, report: NewReport) -> Result<Report>;
    async fn update_report(&self, id: &str, update: ReportUpdate) -> Result<Report>;
    async fn delete_report(&self, id: &str) -> Result<()>;
    async fn create_booster(&self, booster: NewBooster) -> Result<Booster>;
    async fn update_booster(&self, discord_name: &str, update: BoosterUpdate) -> Result<Booster>;
    async fn upvote_feature(&self, id: &str) -> Result<FeatureSuggestion>;
    async fn upvote_report(&self, id: &str) -> Result<Report>;
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::invalid(field, "is required"));
    }
    Ok(())
}

fn require_chars(field: &'static str, value: &str, (min, max): (usize, usize)) -> Result<()> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(CatalogError::invalid(
            field,
            format!("must be {min} to {max} characters, got {len}"),
        ));
    }
    Ok(())
}

/// Form input for a new chip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChip {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub compatible_gears: Vec<GearType>,
    pub affected_towers: Vec<String>,
    pub boost_type: String,
    #[serde(default)]
    pub values: BTreeMap<ChipRarity, String>,
}

impl NewChip {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("boost type", &self.boost_type)?;
        if self.compatible_gears.is_empty() {
            return Err(CatalogError::invalid("compatible gears", "select at least one gear"));
        }
        if self.affected_towers.iter().all(|t| t.trim().is_empty()) {
            return Err(CatalogError::invalid("affected towers", "select at least one tower"));
        }
        if self.values.values().all(|v| v.trim().is_empty()) {
            return Err(CatalogError::invalid("values", "enter a value for at least one rarity"));
        }
        Ok(())
    }

    pub(crate) fn into_chip(self, id: String) -> Chip {
        Chip {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            compatible_gears: self.compatible_gears,
            affected_towers: self
                .affected_towers
                .into_iter()
                .filter(|t| !t.trim().is_empty())
                .collect(),
            boost_type: self.boost_type,
            values: self.values,
        }
    }
}

/// Form input for a new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ReportType,
}

impl NewReport {
    pub fn validate(&self) -> Result<()> {
        require_chars("title", &self.title, REPORT_TITLE_CHARS)?;
        require_chars("description", &self.description, REPORT_DESCRIPTION_CHARS)
    }

    pub(crate) fn into_report(self, id: String, user_id: &str, now: i64) -> Report {
        Report {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            kind: self.kind,
            votes: 0,
            moderator: None,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a report. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReportType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator: Option<String>,
}

impl ReportUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_chars("title", title, REPORT_TITLE_CHARS)?;
        }
        if let Some(description) = &self.description {
            require_chars("description", description, REPORT_DESCRIPTION_CHARS)?;
        }
        Ok(())
    }

    pub(crate) fn apply(self, report: &mut Report, now: i64) {
        if let Some(title) = self.title {
            report.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            report.description = description.trim().to_string();
        }
        if let Some(kind) = self.kind {
            report.kind = kind;
        }
        if let Some(moderator) = self.moderator {
            report.moderator = Some(moderator).filter(|m| !m.trim().is_empty());
        }
        report.updated_at = now;
    }
}

/// Form input for a new booster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooster {
    pub discord_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_nickname: Option<String>,
    #[serde(alias = "ig_id")]
    pub game_id: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

impl NewBooster {
    pub fn validate(&self) -> Result<()> {
        let len = self.discord_name.trim().chars().count();
        if len < DISCORD_NAME_MIN_CHARS {
            return Err(CatalogError::invalid(
                "discord name",
                format!("must be at least {DISCORD_NAME_MIN_CHARS} characters"),
            ));
        }
        require_text("game id", &self.game_id)
    }

    pub(crate) fn into_booster(self, id: String, now: i64) -> Booster {
        Booster {
            id,
            discord_name: self.discord_name.trim().to_string(),
            discord_nickname: self.discord_nickname.filter(|n| !n.trim().is_empty()),
            game_id: self.game_id.trim().to_string(),
            active: self.active,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Partial update of a booster, keyed by discord name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoosterUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_nickname: Option<String>,
    #[serde(default, alias = "ig_id", skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl BoosterUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(game_id) = &self.game_id {
            require_text("game id", game_id)?;
        }
        Ok(())
    }

    pub(crate) fn apply(self, booster: &mut Booster, now: i64) {
        if let Some(nickname) = self.discord_nickname {
            booster.discord_nickname = Some(nickname).filter(|n| !n.trim().is_empty());
        }
        if let Some(game_id) = self.game_id {
            booster.game_id = game_id.trim().to_string();
        }
        if let Some(active) = self.active {
            booster.active = active;
        }
        booster.updated_at = Some(now);
    }
}
