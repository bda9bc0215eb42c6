//! Plain-text tables for the `text` output mode.

use towerdex_catalog::{Booster, Card, Chip, FeatureSuggestion, Report, Turret};
use unicode_width::UnicodeWidthStr;

/// A record that renders as one table row.
pub trait Tabular {
    const HEADERS: &'static [&'static str];

    fn row(&self) -> Vec<String>;
}

/// Formats a millisecond timestamp as a UTC date.
pub fn format_date(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Renders rows as left-aligned columns separated by two spaces.
///
/// Widths are terminal columns, so wide (CJK) characters count double.
pub fn render<T: Tabular>(rows: &[&T]) -> String {
    let rows: Vec<Vec<String>> = rows.iter().map(|r| r.row()).collect();
    render_rows(T::HEADERS, &rows)
}

pub fn render_rows(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = line(headers.iter().copied(), &widths);
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut out = String::new();
    for (cell, width) in cells.zip(widths) {
        out.push_str(cell);
        let pad = width.saturating_sub(cell.width()) + 2;
        out.extend(std::iter::repeat(' ').take(pad));
    }
    out.trim_end().to_string()
}

impl Tabular for Card {
    const HEADERS: &'static [&'static str] = &["NAME", "TYPE", "TIER", "TOWERS", "DESCRIPTION"];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.card_type.to_string(),
            self.tier.to_string(),
            self.towers.join(", "),
            self.description.clone().unwrap_or_default(),
        ]
    }
}

impl Tabular for Chip {
    const HEADERS: &'static [&'static str] = &["NAME", "BOOST", "GEARS", "TOWERS", "VALUES"];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.boost_type.clone(),
            self.compatible_gears
                .iter()
                .map(|g| g.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            self.affected_towers.join(", "),
            self.rarities()
                .map(|(rarity, value)| format!("{rarity} {value}"))
                .collect::<Vec<_>>()
                .join(" / "),
        ]
    }
}

impl Tabular for Turret {
    const HEADERS: &'static [&'static str] =
        &["NAME", "TYPE", "TIER", "POWER", "DEFENSE", "RANGE", "FIRE RATE"];

    fn row(&self) -> Vec<String> {
        let stat = |f: fn(&towerdex_catalog::TurretStats) -> String| {
            self.stats.as_ref().map(f).unwrap_or_default()
        };
        vec![
            self.name.clone(),
            self.kind.clone(),
            self.tier.clone().unwrap_or_default(),
            stat(|s| s.power.to_string()),
            stat(|s| s.defense.to_string()),
            stat(|s| s.range.to_string()),
            stat(|s| format!("{:.1}", s.fire_rate)),
        ]
    }
}

impl Tabular for Booster {
    const HEADERS: &'static [&'static str] = &["DISCORD", "NICKNAME", "GAME ID", "ACTIVE", "SINCE"];

    fn row(&self) -> Vec<String> {
        vec![
            self.discord_name.clone(),
            self.discord_nickname.clone().unwrap_or_default(),
            self.game_id.clone(),
            if self.active { "yes" } else { "no" }.to_string(),
            self.created_at.map(format_date).unwrap_or_default(),
        ]
    }
}

impl Tabular for Report {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "TYPE", "VOTES", "MODERATOR", "CREATED"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.kind.to_string(),
            self.votes.to_string(),
            self.moderator.clone().unwrap_or_default(),
            format_date(self.created_at),
        ]
    }
}

impl Tabular for FeatureSuggestion {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "STATUS", "VOTES"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.status.to_string(),
            self.votes.to_string(),
        ]
    }
}
