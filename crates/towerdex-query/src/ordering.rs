//! Sort keys for ordering query results.
//!
//! Provides [`Dir`] for sort direction, [`PrecedenceTable`] for domain
//! orderings that are not alphabetic, and [`SortKey`] combining the two.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    /// Orients an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }
}

/// Explicit rank for each known value of a field.
///
/// ```
/// use towerdex_query::PrecedenceTable;
///
/// let tiers = PrecedenceTable::from_order(["T1", "T2", "T3"]);
/// assert_eq!(tiers.rank("T1"), Some(0));
/// assert_eq!(tiers.rank("T3"), Some(2));
/// assert_eq!(tiers.rank("T9"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecedenceTable {
    ranks: HashMap<String, u32>,
}

impl PrecedenceTable {
    /// Builds a table from explicit `(value, rank)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        PrecedenceTable {
            ranks: entries
                .into_iter()
                .map(|(value, rank)| (value.into(), rank))
                .collect(),
        }
    }

    /// Builds a table ranking values by their position in `order`.
    ///
    /// A value listed twice keeps its first position.
    pub fn from_order<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ranks = HashMap::new();
        for (position, value) in order.into_iter().enumerate() {
            ranks.entry(value.into()).or_insert(position as u32);
        }
        PrecedenceTable { ranks }
    }

    /// Rank of a value, or `None` if the table does not list it.
    pub fn rank(&self, value: &str) -> Option<u32> {
        self.ranks.get(value).copied()
    }
}

/// One key of a multi-key sort.
///
/// Missing values (`Value::None`) sort after present ones in both directions,
/// and a value a precedence table does not list sorts after every listed
/// value. Ties fall through to the next key; the sort itself is stable, so
/// records equal on every key keep their input order.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Natural ordering of the field's values.
    Field { field: String, dir: Dir },
    /// Ordering by rank from a precedence table.
    Precedence {
        field: String,
        table: PrecedenceTable,
        dir: Dir,
    },
}

impl SortKey {
    /// Ascending natural ordering.
    pub fn asc(field: impl Into<String>) -> Self {
        SortKey::Field {
            field: field.into(),
            dir: Dir::Asc,
        }
    }

    /// Descending natural ordering.
    pub fn desc(field: impl Into<String>) -> Self {
        SortKey::Field {
            field: field.into(),
            dir: Dir::Desc,
        }
    }

    /// Natural ordering with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        SortKey::Field {
            field: field.into(),
            dir,
        }
    }

    /// Precedence ordering, lowest rank first.
    pub fn precedence(field: impl Into<String>, table: PrecedenceTable) -> Self {
        SortKey::Precedence {
            field: field.into(),
            table,
            dir: Dir::Asc,
        }
    }

    /// Returns this key with the direction replaced.
    pub fn with_dir(self, dir: Dir) -> Self {
        match self {
            SortKey::Field { field, .. } => SortKey::Field { field, dir },
            SortKey::Precedence { field, table, .. } => SortKey::Precedence { field, table, dir },
        }
    }

    /// The field this key reads.
    pub fn field(&self) -> &str {
        match self {
            SortKey::Field { field, .. } | SortKey::Precedence { field, .. } => field,
        }
    }

    /// Compares two field values under this key.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Ordering {
        match self {
            SortKey::Field { dir, .. } => match (a.is_none(), b.is_none()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => dir.apply(compare_values(a, b)),
            },
            SortKey::Precedence { table, dir, .. } => {
                let rank_a = a.label().and_then(|label| table.rank(&label));
                let rank_b = b.label().and_then(|label| table.rank(&label));
                match (rank_a, rank_b) {
                    (Some(ra), Some(rb)) => dir.apply(ra.cmp(&rb)),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
        }
    }
}

/// Total ordering over two values.
///
/// Values of the same kind use their natural order (numbers across
/// representations, strings by code point, tag sets lexicographically).
/// Values of different kinds order by a fixed kind rank, with `None` last, so
/// a partially loaded record can never make the comparator inconsistent.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Tags(a), Value::Tags(b)) => a.cmp(b),
        _ => a.kind_rank().cmp(&b.kind_rank()),
    }
}

/// Compares two records using a list of sort keys.
///
/// The first key is the primary key, the second breaks its ties, and so on.
/// Returns `Equal` when every key ties.
pub fn compare_by_keys<T, F>(a: &T, b: &T, keys: &[SortKey], accessor: &F) -> Ordering
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    for key in keys {
        match key.compare(&accessor(a, key.field()), &accessor(b, key.field())) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Timestamp};
    use Ordering::{Equal, Greater, Less};

    fn s(text: &str) -> Value<'_> {
        Value::String(text)
    }

    #[test]
    fn same_kind_values_use_their_natural_order() {
        assert_eq!(compare_values(&s("Frost Storm"), &s("Fire Rain")), Greater);
        assert_eq!(
            compare_values(&Value::Number(Number::I64(63)), &Value::Number(Number::U64(42))),
            Greater
        );
        assert_eq!(
            compare_values(&Value::Timestamp(Timestamp(1)), &Value::Timestamp(Timestamp(2))),
            Less
        );
        assert_eq!(compare_values(&Value::Bool(false), &Value::Bool(true)), Less);
        assert_eq!(
            compare_values(&Value::Tags(vec!["Fire"]), &Value::Tags(vec!["Fire", "Ice"])),
            Less
        );
    }

    #[test]
    fn mixed_kinds_are_antisymmetric() {
        let kinds = [
            Value::Bool(true),
            Value::Number(Number::I64(1)),
            Value::Timestamp(Timestamp(1)),
            s("x"),
            Value::Tags(vec!["x"]),
            Value::None,
        ];
        for a in &kinds {
            for b in &kinds {
                assert_eq!(compare_values(a, b), compare_values(b, a).reverse());
            }
        }
    }

    #[test]
    fn missing_values_trail_in_either_direction() {
        for key in [SortKey::asc("tier"), SortKey::desc("tier")] {
            assert_eq!(key.compare(&Value::None, &s("T1")), Greater);
            assert_eq!(key.compare(&s("T1"), &Value::None), Less);
            assert_eq!(key.compare(&Value::None, &Value::None), Equal);
        }
        let votes = |n| Value::Number(Number::I64(n));
        assert_eq!(SortKey::desc("votes").compare(&votes(17), &votes(42)), Greater);
    }

    #[test]
    fn precedence_follows_the_table_not_the_alphabet() {
        let rarity = PrecedenceTable::from_order(["Common", "Rare", "Epic", "Legendary"]);
        let key = SortKey::precedence("rarity", rarity);
        assert_eq!(key.compare(&s("Legendary"), &s("Epic")), Greater);
        assert_eq!(key.clone().with_dir(Dir::Desc).compare(&s("Legendary"), &s("Epic")), Less);
    }

    #[test]
    fn unlisted_values_trail_listed_ones() {
        let key = SortKey::precedence("tier", PrecedenceTable::new([("T1", 0), ("T2", 1)]));
        assert_eq!(key.compare(&s("T3"), &s("T2")), Greater);
        assert_eq!(key.compare(&s("T3"), &s("T0")), Equal);

        let desc = key.with_dir(Dir::Desc);
        assert_eq!(desc.compare(&s("T3"), &s("T2")), Greater);
        assert_eq!(desc.compare(&Value::None, &s("T1")), Greater);
    }

    #[test]
    fn repeated_entries_keep_their_first_rank() {
        let table = PrecedenceTable::from_order(["T2", "T1", "T2"]);
        assert_eq!(table.rank("T2"), Some(0));
        assert_eq!(table.rank("T1"), Some(1));
    }

    #[test]
    fn later_keys_break_ties() {
        struct Feature {
            title: &'static str,
            votes: i64,
        }

        fn accessor<'a>(f: &'a Feature, field: &str) -> Value<'a> {
            match field {
                "title" => Value::String(f.title),
                "votes" => Value::Number(Number::I64(f.votes)),
                _ => Value::None,
            }
        }

        let chip_compare = Feature { title: "Chip comparison", votes: 17 };
        let calculator = Feature { title: "Turret calculator", votes: 17 };
        let dark_mode = Feature { title: "Dark mode", votes: 63 };
        let keys = [SortKey::desc("votes"), SortKey::asc("title")];

        assert_eq!(compare_by_keys(&dark_mode, &chip_compare, &keys, &accessor), Less);
        assert_eq!(compare_by_keys(&chip_compare, &calculator, &keys, &accessor), Less);
        assert_eq!(compare_by_keys(&calculator, &calculator, &keys, &accessor), Equal);
    }
}
