//! End-to-end browsing scenarios over derived records.

use towerdex_macros::Record;
use towerdex_query::{
    Criterion, GroupKey, GroupLabel, PrecedenceTable, Query, Record as _, RecordEnum, SortKey,
    TagMap, Value,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tier {
    T1,
    T2,
    T3,
}

impl RecordEnum for Tier {
    fn label(&self) -> &'static str {
        match self {
            Tier::T1 => "T1",
            Tier::T2 => "T2",
            Tier::T3 => "T3",
        }
    }
}

#[derive(Debug, Record)]
struct Turret {
    #[record(String)]
    name: String,
    #[record(Enum)]
    tier: Tier,
}

#[derive(Debug, Record)]
struct Chip {
    #[record(String)]
    name: &'static str,
    #[record(Tags, rename = "compatibleGears")]
    compatible_gears: Vec<String>,
    #[record(Tags)]
    towers: Vec<&'static str>,
}

#[derive(Debug, Record)]
struct Booster {
    #[record(String)]
    discord_name: String,
    #[record(String)]
    discord_nickname: Option<String>,
    #[record(String)]
    game_id: String,
    #[record(Bool)]
    active: bool,
    #[record(Timestamp)]
    created_at: Option<i64>,
    #[record(skip)]
    #[allow(dead_code)]
    internal_note: String,
}

fn turret(name: &str, tier: Tier) -> Turret {
    Turret {
        name: name.to_string(),
        tier,
    }
}

fn chip(name: &'static str, gears: &[&str], towers: &[&'static str]) -> Chip {
    Chip {
        name,
        compatible_gears: gears.iter().map(|g| g.to_string()).collect(),
        towers: towers.to_vec(),
    }
}

fn booster(name: &str, nickname: Option<&str>, game_id: &str, active: bool) -> Booster {
    Booster {
        discord_name: name.to_string(),
        discord_nickname: nickname.map(str::to_string),
        game_id: game_id.to_string(),
        active,
        created_at: None,
        internal_note: String::new(),
    }
}

#[test]
fn tier_precedence_orders_turrets() {
    let turrets = vec![
        turret("Hive", Tier::T3),
        turret("Laser", Tier::T1),
        turret("Railgun", Tier::T2),
    ];
    let view = Query::new()
        .sort_precedence(
            Turret::TIER,
            PrecedenceTable::new([("T1", 0), ("T2", 1), ("T3", 2)]),
        )
        .run(&turrets, Turret::accessor);

    let names: Vec<&str> = view.records().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Laser", "Railgun", "Hive"]);
}

#[test]
fn unlisted_tier_sorts_after_listed_ones() {
    let turrets = vec![
        turret("Hive", Tier::T3),
        turret("Laser", Tier::T1),
        turret("Railgun", Tier::T2),
    ];
    let view = Query::new()
        .sort_precedence(Turret::TIER, PrecedenceTable::new([("T1", 0), ("T2", 1)]))
        .run(&turrets, Turret::accessor);

    let names: Vec<&str> = view.records().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Laser", "Railgun", "Hive"]);
}

#[test]
fn gear_dropdown_filters_chips() {
    let chips = vec![chip("A", &["Armor"], &[]), chip("B", &["Boots"], &[])];

    let armor = Query::new()
        .exact(Chip::COMPATIBLE_GEARS, "Armor")
        .run(&chips, Chip::accessor);
    let names: Vec<&str> = armor.records().iter().map(|c| c.name).collect();
    assert_eq!(names, ["A"]);

    let all = Query::new()
        .exact(Chip::COMPATIBLE_GEARS, "all")
        .run(&chips, Chip::accessor);
    let names: Vec<&str> = all.records().iter().map(|c| c.name).collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn tower_type_filter_goes_through_mapping() {
    let chips = vec![
        chip("Overcharge", &["Weapon"], &["Laser", "Teslacoil"]),
        chip("Slug", &["Weapon"], &["Railgun"]),
        chip("Swarm", &["Armor"], &["Hive"]),
    ];
    let kinds = TagMap::from_groups([
        ("Energy", vec!["Laser", "Teslacoil"]),
        ("Kinetic", vec!["Railgun"]),
        ("Biological", vec!["Hive"]),
    ]);

    let view = Query::new()
        .any_of_mapped(Chip::TOWERS, ["Kinetic", "Biological"], kinds)
        .run(&chips, Chip::accessor);
    let names: Vec<&str> = view.records().iter().map(|c| c.name).collect();
    assert_eq!(names, ["Slug", "Swarm"]);
}

#[test]
fn whitespace_search_returns_everything_in_order() {
    let boosters = vec![
        booster("Zed", None, "900", true),
        booster("Amy", Some("amz"), "100", false),
        booster("Kai", None, "500", true),
    ];
    let view = Query::new()
        .search(
            "  ",
            [
                Booster::DISCORD_NAME,
                Booster::DISCORD_NICKNAME,
                Booster::GAME_ID,
            ],
        )
        .run(&boosters, Booster::accessor);

    let names: Vec<&str> = view
        .records()
        .iter()
        .map(|b| b.discord_name.as_str())
        .collect();
    assert_eq!(names, ["Zed", "Amy", "Kai"]);
}

#[test]
fn booster_screen_search_and_order() {
    let boosters = vec![
        booster("Zed", None, "9001", true),
        booster("Amy", Some("zeta"), "1002", false),
        booster("Kai", None, "5003", true),
        booster("bob", None, "ZE-44", true),
    ];
    let view = Query::new()
        .search(
            "ze",
            [
                Booster::DISCORD_NAME,
                Booster::DISCORD_NICKNAME,
                Booster::GAME_ID,
            ],
        )
        .sort_key(SortKey::desc(Booster::ACTIVE))
        .sort_desc(Booster::DISCORD_NAME)
        .run(&boosters, Booster::accessor);

    let names: Vec<&str> = view
        .records()
        .iter()
        .map(|b| b.discord_name.as_str())
        .collect();
    // Active first, then names descending in byte order ("bob" > "Zed").
    assert_eq!(names, ["bob", "Zed", "Amy"]);
    assert_eq!(view.total, 4);
    assert_eq!(view.matched, 3);
}

#[test]
fn derived_fields_expose_absent_values() {
    let b = booster("Amy", None, "1", true);
    assert_eq!(b.field(Booster::DISCORD_NICKNAME), Value::None);
    assert_eq!(b.field(Booster::CREATED_AT), Value::None);
    assert_eq!(b.field("internal_note"), Value::None);
    assert_eq!(
        Booster::FIELDS,
        [
            "discord_name",
            "discord_nickname",
            "game_id",
            "active",
            "created_at"
        ]
    );
}

#[test]
fn cards_grouped_by_tier_keep_sorted_order() {
    let turrets = vec![
        turret("Teslacoil", Tier::T3),
        turret("Skyguard", Tier::T2),
        turret("Laser", Tier::T1),
        turret("Hive", Tier::T3),
        turret("Railgun", Tier::T2),
    ];
    let view = Query::new()
        .filter(Criterion::exact(Turret::TIER, "all"))
        .sort_asc(Turret::NAME)
        .group_by(GroupKey::new(Turret::TIER).order(["T1", "T2", "T3"]))
        .run(&turrets, Turret::accessor);

    let groups = view.groups().expect("grouped view");
    let labels: Vec<String> = groups.iter().map(|g| g.label.to_string()).collect();
    assert_eq!(labels, ["T1", "T2", "T3"]);
    let t3: Vec<&str> = groups[2].records.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(t3, ["Hive", "Teslacoil"]);
    assert!(groups.iter().all(|g| g.label != GroupLabel::Ungrouped));
}
