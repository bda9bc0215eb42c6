//! An in-process backend holding every collection in memory.
//!
//! Seeded from the bundled game data. Nothing is persisted.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::fetch::Fetch;
use crate::key::CollectionKey;
use crate::model::{
    Booster, Card, Chip, Collection, FeatureSuggestion, GearType, Report, Tower, Turret,
};
use crate::mutate::{
    new_id, now_millis, BoosterUpdate, Mutate, NewBooster, NewChip, NewReport, ReportUpdate,
};

/// Key segment listing every user's reports: `reports/all`.
pub const ALL_REPORTS: &str = "all";
/// Key segment preceding a user id: `reports/user/<id>`.
pub const USER_REPORTS: &str = "user";

#[derive(Debug, Default)]
struct Collections {
    towers: Vec<Tower>,
    cards: Vec<Card>,
    chips: Vec<Chip>,
    turrets: Vec<Turret>,
    gear_types: Vec<GearType>,
    features: Vec<FeatureSuggestion>,
    boosters: Vec<Booster>,
    reports: Vec<Report>,
}

fn parse<T: DeserializeOwned>(name: &str, json: &str) -> Result<Vec<T>> {
    serde_json::from_str(json)
        .map_err(|e| CatalogError::Backend(format!("bundled {name} data is invalid: {e}")))
}

/// The turret list shipped with the binary.
///
/// Served when the live catalog cannot be reached.
pub fn bundled_turrets() -> Result<Vec<Turret>> {
    parse("turrets", include_str!("../data/turrets.json"))
}

/// Every collection in one lock. Fetches clone a snapshot.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    collections: RwLock<Collections>,
    latency: Duration,
}

impl InMemoryBackend {
    /// An empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend loaded with the bundled game data.
    pub fn seeded() -> Result<Self> {
        let collections = Collections {
            towers: parse("towers", include_str!("../data/towers.json"))?,
            cards: parse("cards", include_str!("../data/cards.json"))?,
            chips: parse("chips", include_str!("../data/chips.json"))?,
            turrets: bundled_turrets()?,
            gear_types: GearType::ALL.to_vec(),
            features: parse("features", include_str!("../data/features.json"))?,
            boosters: parse("boosters", include_str!("../data/boosters.json"))?,
            reports: parse("reports", include_str!("../data/reports.json"))?,
        };
        info!(
            cards = collections.cards.len(),
            chips = collections.chips.len(),
            turrets = collections.turrets.len(),
            "seeded in-memory backend"
        );
        Ok(InMemoryBackend {
            collections: RwLock::new(collections),
            latency: Duration::ZERO,
        })
    }

    /// Delays every fetch by `latency`, to mimic a remote store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_boosters(self, boosters: Vec<Booster>) -> Self {
        self.collections.write().boosters = boosters;
        self
    }

    pub fn with_reports(self, reports: Vec<Report>) -> Self {
        self.collections.write().reports = reports;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn expect_root<T: Collection>(key: &CollectionKey) -> Result<()> {
    match key.segments() {
        [root] if root == T::COLLECTION => Ok(()),
        _ => Err(CatalogError::UnknownKey(key.to_string())),
    }
}

macro_rules! fetch_whole_collection {
    ($($ty:ty => $field:ident),+ $(,)?) => {
        $(
            #[async_trait]
            impl Fetch<$ty> for InMemoryBackend {
                async fn fetch(&self, key: &CollectionKey) -> Result<Vec<$ty>> {
                    expect_root::<$ty>(key)?;
                    self.simulate_latency().await;
                    Ok(self.collections.read().$field.clone())
                }
            }
        )+
    };
}

fetch_whole_collection! {
    Tower => towers,
    Card => cards,
    Chip => chips,
    Turret => turrets,
    GearType => gear_types,
    FeatureSuggestion => features,
    Booster => boosters,
}

#[async_trait]
impl Fetch<Report> for InMemoryBackend {
    async fn fetch(&self, key: &CollectionKey) -> Result<Vec<Report>> {
        let owner = match key.segments() {
            [root, all] if root == Report::COLLECTION && all == ALL_REPORTS => None,
            [root, scope, id] if root == Report::COLLECTION && scope == USER_REPORTS => {
                Some(id.clone())
            }
            _ => return Err(CatalogError::UnknownKey(key.to_string())),
        };
        self.simulate_latency().await;

        let collections = self.collections.read();
        Ok(collections
            .reports
            .iter()
            .filter(|r| owner.as_deref().map_or(true, |id| r.user_id == id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Mutate for InMemoryBackend {
    async fn create_chip(&self, chip: NewChip) -> Result<Chip> {
        chip.validate()?;
        let chip = chip.into_chip(new_id());
        self.collections.write().chips.push(chip.clone());
        debug!(chip = %chip.id, name = %chip.name, "created chip");
        Ok(chip)
    }

    async fn create_report(&self, user_id: &str, report: NewReport) -> Result<Report> {
        report.validate()?;
        let report = report.into_report(new_id(), user_id, now_millis());
        self.collections.write().reports.push(report.clone());
        debug!(report = %report.id, user = %user_id, "created report");
        Ok(report)
    }

    async fn update_report(&self, id: &str, update: ReportUpdate) -> Result<Report> {
        update.validate()?;
        let mut collections = self.collections.write();
        let report = collections
            .reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CatalogError::not_found(Report::KIND, id))?;
        update.apply(report, now_millis());
        debug!(report = %id, "updated report");
        Ok(report.clone())
    }

    async fn delete_report(&self, id: &str) -> Result<()> {
        let mut collections = self.collections.write();
        let before = collections.reports.len();
        collections.reports.retain(|r| r.id != id);
        if collections.reports.len() == before {
            return Err(CatalogError::not_found(Report::KIND, id));
        }
        debug!(report = %id, "deleted report");
        Ok(())
    }

    async fn create_booster(&self, booster: NewBooster) -> Result<Booster> {
        booster.validate()?;
        let mut collections = self.collections.write();
        let name = booster.discord_name.trim();
        if collections
            .boosters
            .iter()
            .any(|b| b.discord_name.eq_ignore_ascii_case(name))
        {
            return Err(CatalogError::invalid(
                "discord name",
                format!("'{name}' is already registered"),
            ));
        }
        let booster = booster.into_booster(new_id(), now_millis());
        collections.boosters.push(booster.clone());
        debug!(booster = %booster.id, "created booster");
        Ok(booster)
    }

    async fn update_booster(&self, discord_name: &str, update: BoosterUpdate) -> Result<Booster> {
        update.validate()?;
        let mut collections = self.collections.write();
        let booster = collections
            .boosters
            .iter_mut()
            .find(|b| b.discord_name.eq_ignore_ascii_case(discord_name.trim()))
            .ok_or_else(|| CatalogError::not_found(Booster::KIND, discord_name))?;
        update.apply(booster, now_millis());
        debug!(booster = %booster.id, "updated booster");
        Ok(booster.clone())
    }

    async fn upvote_feature(&self, id: &str) -> Result<FeatureSuggestion> {
        let mut collections = self.collections.write();
        let feature = collections
            .features
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| CatalogError::not_found(FeatureSuggestion::KIND, id))?;
        feature.votes = feature.votes.saturating_add(1);
        Ok(feature.clone())
    }

    async fn upvote_report(&self, id: &str) -> Result<Report> {
        let mut collections = self.collections.write();
        let report = collections
            .reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CatalogError::not_found(Report::KIND, id))?;
        report.votes = report.votes.saturating_add(1);
        Ok(report.clone())
    }
}
