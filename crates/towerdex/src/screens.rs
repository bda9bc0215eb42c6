//! Query presets for each browsing screen.
//!
//! A screen's filter state is a plain struct; `query()` turns it into the
//! [`Query`] the screen runs over its cached collection. Unset filters are
//! `None` (or empty), which the engine reads as "match everything".

use towerdex_catalog::{
    Booster, Card, CardType, Chip, FeatureStatus, FeatureSuggestion, GearType, Report, ReportType,
    Tier, Turret,
};
use towerdex_query::{GroupKey, PrecedenceTable, Query, SortKey, TagMap};

/// Tier order used to sort and group cards and turrets.
pub fn tier_precedence() -> PrecedenceTable {
    PrecedenceTable::from_order(Tier::labels())
}

fn search_text(search: &Option<String>) -> String {
    search.clone().unwrap_or_default()
}

/// Filters of the card database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFilters {
    /// Towers to include; empty means every tower.
    pub towers: Vec<String>,
    pub card_type: Option<CardType>,
    pub tier: Option<Tier>,
    pub search: Option<String>,
    pub group_by_tier: bool,
}

impl CardFilters {
    pub fn query(&self) -> Query {
        let query = Query::new()
            .any_of(Card::TOWERS, &self.towers)
            .exact(Card::TYPE, self.card_type.map(CardType::as_str))
            .exact(Card::TIER, self.tier.map(Tier::as_str))
            .search(search_text(&self.search), [Card::NAME, Card::DESCRIPTION])
            .sort_precedence(Card::TIER, tier_precedence())
            .sort_asc(Card::NAME);
        if self.group_by_tier {
            query.group_by(GroupKey::new(Card::TIER).order(Tier::labels()))
        } else {
            query
        }
    }
}

/// Filters of the chip database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChipFilters {
    pub gear: Option<GearType>,
    /// A single affected tower.
    pub tower: Option<String>,
    /// Tower types, matched through the tower name to type mapping.
    pub tower_types: Vec<String>,
    pub boost_type: Option<String>,
    pub search: Option<String>,
}

impl ChipFilters {
    /// `tower_types` maps tower names to tower types for the type filter.
    pub fn query(&self, tower_types: TagMap) -> Query {
        Query::new()
            .exact(Chip::COMPATIBLE_GEARS, self.gear.map(GearType::as_str))
            .exact(Chip::AFFECTED_TOWERS, self.tower.as_deref())
            .any_of_mapped(Chip::AFFECTED_TOWERS, &self.tower_types, tower_types)
            .exact(Chip::BOOST_TYPE, self.boost_type.as_deref())
            .search(search_text(&self.search), [Chip::NAME, Chip::DESCRIPTION])
            .sort_asc(Chip::NAME)
    }
}

/// Filters of the turret list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurretFilters {
    pub kind: Option<String>,
    pub tier: Option<Tier>,
    pub search: Option<String>,
}

impl TurretFilters {
    pub fn query(&self) -> Query {
        Query::new()
            .exact(Turret::TYPE, self.kind.as_deref())
            .exact(Turret::TIER, self.tier.map(Tier::as_str))
            .search(
                search_text(&self.search),
                [Turret::NAME, Turret::DESCRIPTION, Turret::ABILITIES],
            )
            .sort_precedence(Turret::TIER, tier_precedence())
            .sort_asc(Turret::NAME)
    }
}

/// Filters of the booster roster.
#[derive(Debug, Clone, PartialEq)]
pub struct BoosterFilters {
    pub search: Option<String>,
    pub include_inactive: bool,
    /// 1-based page.
    pub page: usize,
}

impl Default for BoosterFilters {
    fn default() -> Self {
        BoosterFilters {
            search: None,
            include_inactive: false,
            page: 1,
        }
    }
}

impl BoosterFilters {
    pub fn query(&self, page_size: usize) -> Query {
        let query = Query::new()
            .search(
                search_text(&self.search),
                [
                    Booster::DISCORD_NAME,
                    Booster::DISCORD_NICKNAME,
                    Booster::GAME_ID,
                ],
            )
            .sort_key(SortKey::desc(Booster::ACTIVE))
            .sort_desc(Booster::DISCORD_NAME)
            .page(self.page, page_size);
        if self.include_inactive {
            query
        } else {
            query.exact(Booster::ACTIVE, true)
        }
    }
}

/// Filters of the report table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilters {
    pub kind: Option<ReportType>,
    pub search: Option<String>,
}

impl ReportFilters {
    pub fn query(&self) -> Query {
        Query::new()
            .exact(Report::TYPE, self.kind.map(ReportType::as_str))
            .search(search_text(&self.search), [Report::TITLE, Report::DESCRIPTION])
            .sort_desc(Report::CREATED_AT)
    }
}

/// Filters of the feature board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFilters {
    pub status: Option<FeatureStatus>,
}

impl FeatureFilters {
    pub fn query(&self) -> Query {
        Query::new()
            .exact(FeatureSuggestion::STATUS, self.status.map(FeatureStatus::as_str))
            .sort_desc(FeatureSuggestion::VOTES)
            .sort_asc(FeatureSuggestion::TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerdex_catalog::InMemoryBackend;
    use towerdex_catalog::{all_reports_key, CollectionKey, Fetch, Tower};
    use towerdex_query::Record as _;

    async fn load<T>(collection: &str) -> Vec<T>
    where
        InMemoryBackend: Fetch<T>,
    {
        load_key(&CollectionKey::collection(collection)).await
    }

    async fn load_key<T>(key: &CollectionKey) -> Vec<T>
    where
        InMemoryBackend: Fetch<T>,
    {
        let backend = InMemoryBackend::seeded().unwrap();
        Fetch::<T>::fetch(&backend, key).await.unwrap()
    }

    #[tokio::test]
    async fn cards_sort_by_tier_then_name() {
        let cards: Vec<Card> = load("cards").await;
        let filters = CardFilters {
            towers: vec!["Archer".into(), "Magic".into()],
            ..CardFilters::default()
        };
        let view = filters.query().run(&cards, Card::accessor);
        let names: Vec<&str> = view.records().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["Basic Shield", "Swift Arrow", "Arcane Blast", "Blazing Arrows"]
        );
    }

    #[tokio::test]
    async fn cards_group_by_tier() {
        let cards: Vec<Card> = load("cards").await;
        let filters = CardFilters {
            card_type: Some(CardType::Combo),
            group_by_tier: true,
            ..CardFilters::default()
        };
        let view = filters.query().run(&cards, Card::accessor);
        let groups = view.groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label.to_string(), "T3");
        let names: Vec<&str> = groups[0].records.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Frost Storm", "Frozen Cannon"]);
    }

    #[tokio::test]
    async fn chips_by_tower_type() {
        let chips: Vec<Chip> = load("chips").await;
        let towers: Vec<Tower> = load("towers").await;
        let types = towerdex_catalog::model::tower_types(&towers);

        let filters = ChipFilters {
            tower_types: vec!["Energy".into()],
            ..ChipFilters::default()
        };
        let view = filters.query(types.clone()).run(&chips, Chip::accessor);
        let names: Vec<&str> = view.records().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Fortress Treads", "Overcharge Core"]);

        let filters = ChipFilters {
            gear: Some(GearType::Weapon),
            tower: Some("Railgun".into()),
            ..ChipFilters::default()
        };
        let view = filters.query(types).run(&chips, Chip::accessor);
        let names: Vec<&str> = view.records().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Slug Accelerator"]);
    }

    #[tokio::test]
    async fn boosters_hide_inactive_and_page() {
        let boosters: Vec<Booster> = load("boosters").await;

        let view = BoosterFilters::default()
            .query(50)
            .run(&boosters, Booster::accessor);
        let names: Vec<&str> = view
            .records()
            .iter()
            .map(|b| b.discord_name.as_str())
            .collect();
        assert_eq!(names, ["Skyfall", "Ironclad"]);

        let filters = BoosterFilters {
            include_inactive: true,
            page: 2,
            ..BoosterFilters::default()
        };
        let view = filters.query(2).run(&boosters, Booster::accessor);
        assert_eq!(view.matched, 3);
        assert_eq!(view.page_count(2), 2);
        let names: Vec<&str> = view
            .records()
            .iter()
            .map(|b| b.discord_name.as_str())
            .collect();
        assert_eq!(names, ["Nova"]);
    }

    #[tokio::test]
    async fn reports_newest_first_and_features_by_votes() {
        let reports: Vec<Report> = load_key(&all_reports_key()).await;
        let view = ReportFilters::default().query().run(&reports, Report::accessor);
        let ids: Vec<&str> = view.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["r2", "r1"]);

        let features: Vec<FeatureSuggestion> = load("features").await;
        let view = FeatureFilters::default()
            .query()
            .run(&features, FeatureSuggestion::accessor);
        let ids: Vec<&str> = view.records().iter().map(|f| f.id.as_str()).collect();
        // f2 and f4 tie on votes; title breaks the tie.
        assert_eq!(ids, ["f3", "f1", "f2", "f4"]);
    }

    #[tokio::test]
    async fn turrets_filter_by_type() {
        let turrets: Vec<Turret> = load("turrets").await;
        let filters = TurretFilters {
            kind: Some("Energy".into()),
            ..TurretFilters::default()
        };
        let view = filters.query().run(&turrets, Turret::accessor);
        let names: Vec<&str> = view.records().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Laser", "Teslacoil"]);
    }
}
