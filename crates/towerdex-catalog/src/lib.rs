//! # Towerdex Catalog
//!
//! Game catalog records and the services that fetch and change them.
//!
//! - [`model`]: typed records for every collection, each exposing its fields
//!   to `towerdex_query` through `Record`
//! - [`QueryCache`]: stale-while-revalidate cache with one in-flight fetch
//!   per [`CollectionKey`] and prefix invalidation
//! - [`Mutate`]: the write gateway, with validated inputs
//! - [`Authenticate`]: current user and login; [`InMemoryAuth`] keeps Argon2
//!   hashes
//! - [`InMemoryBackend`]: every collection in memory, seeded with game data
//! - [`Catalog`]: the handle the screens use, tying the above together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use towerdex_catalog::{CacheConfig, Catalog, InMemoryAuth, InMemoryBackend};
//!
//! # async fn demo() -> towerdex_catalog::Result<()> {
//! let backend = Arc::new(InMemoryBackend::seeded()?);
//! let catalog = Catalog::new(backend, Arc::new(InMemoryAuth::new()), CacheConfig::default());
//!
//! let cards = catalog.cards().await?;
//! let again = catalog.cards().await?; // served from cache
//! assert!(Arc::ptr_eq(&cards, &again));
//! # Ok(())
//! # }
//! ```

mod auth;
mod cache;
mod catalog;
mod error;
mod fetch;
mod key;
mod memory;
pub mod model;
mod mutate;

pub use auth::{Authenticate, InMemoryAuth, Role, User};
pub use cache::{CacheStats, QueryCache, DEFAULT_STALE_TIME, LOOKUP_STALE_TIME};
pub use catalog::{all_reports_key, user_reports_key, Backend, CacheConfig, Catalog};
pub use error::{CatalogError, Result};
pub use fetch::Fetch;
pub use key::CollectionKey;
pub use memory::{bundled_turrets, InMemoryBackend};
pub use model::{
    Booster, Card, CardType, Chip, ChipRarity, Collection, FeatureStatus, FeatureSuggestion,
    GearType, Report, ReportType, Tier, Tower, Turret, TurretStats,
};
pub use mutate::{
    BoosterUpdate, Mutate, NewBooster, NewChip, NewReport, ReportUpdate,
    DISCORD_NAME_MIN_CHARS, REPORT_DESCRIPTION_CHARS, REPORT_TITLE_CHARS,
};
