//! The catalog handle the screens talk to.
//!
//! [`Catalog`] owns one [`QueryCache`] per collection, the mutation gateway
//! and the auth provider. Reads go through the caches; writes check the
//! current user's role, go to the gateway, then invalidate the collection
//! they touched.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use towerdex_query::TagMap;
use tracing::info;

use crate::auth::{Authenticate, User};
use crate::cache::{CacheStats, QueryCache, DEFAULT_STALE_TIME, LOOKUP_STALE_TIME};
use crate::error::{CatalogError, Result};
use crate::fetch::Fetch;
use crate::key::CollectionKey;
use crate::memory::{ALL_REPORTS, USER_REPORTS};
use crate::model::{
    tower_types, Booster, Card, Chip, Collection, FeatureSuggestion, GearType, Report, Tower,
    Turret,
};
use crate::mutate::{BoosterUpdate, Mutate, NewBooster, NewChip, NewReport, ReportUpdate};

/// Anything that can serve every collection and apply mutations.
pub trait Backend:
    Fetch<Tower>
    + Fetch<Card>
    + Fetch<Chip>
    + Fetch<Turret>
    + Fetch<GearType>
    + Fetch<FeatureSuggestion>
    + Fetch<Booster>
    + Fetch<Report>
    + Mutate
{
}

impl<B> Backend for B where
    B: Fetch<Tower>
        + Fetch<Card>
        + Fetch<Chip>
        + Fetch<Turret>
        + Fetch<GearType>
        + Fetch<FeatureSuggestion>
        + Fetch<Booster>
        + Fetch<Report>
        + Mutate
{
}

/// Freshness windows of the catalog caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Browsable collections.
    #[serde(with = "millis")]
    pub stale_time: Duration,
    /// Lookup tables: towers and gear types.
    #[serde(with = "millis")]
    pub lookup_stale_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            stale_time: DEFAULT_STALE_TIME,
            lookup_stale_time: LOOKUP_STALE_TIME,
        }
    }
}

/// Durations as whole milliseconds in config files.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

fn cache<T, B>(backend: &Arc<B>, stale_time: Duration) -> QueryCache<T>
where
    T: Collection,
    B: Fetch<T> + 'static,
{
    let fetcher: Arc<dyn Fetch<T>> = backend.clone();
    QueryCache::new(T::COLLECTION, fetcher, stale_time)
}

/// Cached, role-checked access to every collection.
#[derive(Clone)]
pub struct Catalog {
    towers: QueryCache<Tower>,
    cards: QueryCache<Card>,
    chips: QueryCache<Chip>,
    turrets: QueryCache<Turret>,
    gear_types: QueryCache<GearType>,
    features: QueryCache<FeatureSuggestion>,
    boosters: QueryCache<Booster>,
    reports: QueryCache<Report>,
    mutations: Arc<dyn Mutate>,
    auth: Arc<dyn Authenticate>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("cards", &self.cards)
            .field("chips", &self.chips)
            .field("reports", &self.reports)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    pub fn new<B>(backend: Arc<B>, auth: Arc<dyn Authenticate>, config: CacheConfig) -> Self
    where
        B: Backend + 'static,
    {
        Catalog {
            towers: cache(&backend, config.lookup_stale_time),
            cards: cache(&backend, config.stale_time),
            chips: cache(&backend, config.stale_time),
            turrets: cache(&backend, config.stale_time),
            gear_types: cache(&backend, config.lookup_stale_time),
            features: cache(&backend, config.stale_time),
            boosters: cache(&backend, config.stale_time),
            reports: cache(&backend, config.stale_time),
            mutations: backend,
            auth,
        }
    }

    pub fn auth(&self) -> &dyn Authenticate {
        self.auth.as_ref()
    }

    /// Logs the current user out and forgets their cached reports.
    pub async fn sign_out(&self) {
        let Some(user) = self.auth.current_user() else {
            return;
        };
        self.auth.logout().await;
        self.reports.remove(&user_reports_key(&user.id));
    }

    fn require_user(&self, action: &'static str) -> Result<User> {
        self.auth
            .current_user()
            .ok_or(CatalogError::Unauthenticated { action })
    }

    fn require_admin(&self, action: &'static str) -> Result<User> {
        let user = self.require_user(action)?;
        if !user.is_admin() {
            return Err(CatalogError::Unauthorized { action });
        }
        Ok(user)
    }

    pub async fn towers(&self) -> Result<Arc<Vec<Tower>>> {
        self.towers.get(&CollectionKey::collection(Tower::COLLECTION)).await
    }

    pub async fn cards(&self) -> Result<Arc<Vec<Card>>> {
        self.cards.get(&CollectionKey::collection(Card::COLLECTION)).await
    }

    pub async fn chips(&self) -> Result<Arc<Vec<Chip>>> {
        self.chips.get(&CollectionKey::collection(Chip::COLLECTION)).await
    }

    pub async fn turrets(&self) -> Result<Arc<Vec<Turret>>> {
        self.turrets.get(&CollectionKey::collection(Turret::COLLECTION)).await
    }

    pub async fn gear_types(&self) -> Result<Arc<Vec<GearType>>> {
        self.gear_types
            .get(&CollectionKey::collection(GearType::COLLECTION))
            .await
    }

    pub async fn features(&self) -> Result<Arc<Vec<FeatureSuggestion>>> {
        self.features
            .get(&CollectionKey::collection(FeatureSuggestion::COLLECTION))
            .await
    }

    pub async fn boosters(&self) -> Result<Arc<Vec<Booster>>> {
        self.boosters
            .get(&CollectionKey::collection(Booster::COLLECTION))
            .await
    }

    /// Every user's reports. Admin only.
    pub async fn all_reports(&self) -> Result<Arc<Vec<Report>>> {
        self.require_admin("listing all reports")?;
        self.reports.get(&all_reports_key()).await
    }

    /// The current user's reports.
    pub async fn my_reports(&self) -> Result<Arc<Vec<Report>>> {
        let user = self.require_user("listing your reports")?;
        self.reports.get(&user_reports_key(&user.id)).await
    }

    /// Tower name to tower type, for derived tower-type filters.
    pub async fn tower_types(&self) -> Result<TagMap> {
        Ok(tower_types(self.towers().await?.iter()))
    }

    pub async fn create_chip(&self, chip: NewChip) -> Result<Chip> {
        let user = self.require_admin("adding a chip")?;
        let chip = self.mutations.create_chip(chip).await?;
        info!(user = %user.id, chip = %chip.id, "chip added");
        self.chips.invalidate(&CollectionKey::collection(Chip::COLLECTION));
        Ok(chip)
    }

    pub async fn create_report(&self, report: NewReport) -> Result<Report> {
        let user = self.require_user("submitting a report")?;
        let report = self.mutations.create_report(&user.id, report).await?;
        info!(user = %user.id, report = %report.id, "report submitted");
        self.invalidate_reports();
        Ok(report)
    }

    pub async fn update_report(&self, id: &str, update: ReportUpdate) -> Result<Report> {
        let user = self.require_admin("editing a report")?;
        let report = self.mutations.update_report(id, update).await?;
        info!(user = %user.id, report = %id, "report updated");
        self.invalidate_reports();
        Ok(report)
    }

    pub async fn delete_report(&self, id: &str) -> Result<()> {
        let user = self.require_admin("deleting a report")?;
        self.mutations.delete_report(id).await?;
        info!(user = %user.id, report = %id, "report deleted");
        self.invalidate_reports();
        Ok(())
    }

    pub async fn upvote_report(&self, id: &str) -> Result<Report> {
        let report = self.mutations.upvote_report(id).await?;
        self.invalidate_reports();
        Ok(report)
    }

    pub async fn create_booster(&self, booster: NewBooster) -> Result<Booster> {
        let user = self.require_admin("adding a booster")?;
        let booster = self.mutations.create_booster(booster).await?;
        info!(user = %user.id, booster = %booster.id, "booster added");
        self.invalidate_boosters();
        Ok(booster)
    }

    pub async fn update_booster(&self, discord_name: &str, update: BoosterUpdate) -> Result<Booster> {
        let user = self.require_admin("editing a booster")?;
        let booster = self.mutations.update_booster(discord_name, update).await?;
        info!(user = %user.id, booster = %booster.id, "booster updated");
        self.invalidate_boosters();
        Ok(booster)
    }

    pub async fn upvote_feature(&self, id: &str) -> Result<FeatureSuggestion> {
        let feature = self.mutations.upvote_feature(id).await?;
        self.features
            .invalidate(&CollectionKey::collection(FeatureSuggestion::COLLECTION));
        Ok(feature)
    }

    fn invalidate_reports(&self) {
        self.reports
            .invalidate(&CollectionKey::collection(Report::COLLECTION));
    }

    fn invalidate_boosters(&self) {
        self.boosters
            .invalidate(&CollectionKey::collection(Booster::COLLECTION));
    }

    /// Marks every cached collection stale.
    pub fn invalidate_all(&self) {
        self.towers.invalidate_all();
        self.cards.invalidate_all();
        self.chips.invalidate_all();
        self.turrets.invalidate_all();
        self.gear_types.invalidate_all();
        self.features.invalidate_all();
        self.boosters.invalidate_all();
        self.reports.invalidate_all();
    }

    /// Counters of every cache, by collection name.
    pub fn cache_stats(&self) -> Vec<(&str, CacheStats)> {
        vec![
            (self.towers.name(), self.towers.stats()),
            (self.cards.name(), self.cards.stats()),
            (self.chips.name(), self.chips.stats()),
            (self.turrets.name(), self.turrets.stats()),
            (self.gear_types.name(), self.gear_types.stats()),
            (self.features.name(), self.features.stats()),
            (self.boosters.name(), self.boosters.stats()),
            (self.reports.name(), self.reports.stats()),
        ]
    }
}

/// Cache key of every user's reports.
pub fn all_reports_key() -> CollectionKey {
    CollectionKey::new([Report::COLLECTION, ALL_REPORTS])
}

/// Cache key of one user's reports.
pub fn user_reports_key(user_id: &str) -> CollectionKey {
    CollectionKey::new([Report::COLLECTION, USER_REPORTS, user_id])
}
