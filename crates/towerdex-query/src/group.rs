//! Partitioning an ordered result into labelled buckets.

use std::collections::HashMap;
use std::fmt;

use crate::value::Value;

/// Field and bucket order used to group records.
///
/// Buckets are emitted in the order given by [`GroupKey::order`]. Labels the
/// order does not list follow, in the order they were first seen. Records
/// whose field is absent land in a final [`GroupLabel::Ungrouped`] bucket.
/// A `Tags` field groups by its first tag.
///
/// ```
/// use towerdex_query::GroupKey;
///
/// let by_tier = GroupKey::new("tier").order(["T1", "T2", "T3"]);
/// assert_eq!(by_tier.field(), "tier");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupKey {
    field: String,
    order: Vec<String>,
}

impl GroupKey {
    /// Groups by `field`, buckets in first-seen order.
    pub fn new(field: impl Into<String>) -> Self {
        GroupKey {
            field: field.into(),
            order: Vec::new(),
        }
    }

    /// Sets the bucket order.
    pub fn order<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = labels.into_iter().map(Into::into).collect();
        self
    }

    /// The field grouped on.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The configured bucket order.
    pub fn label_order(&self) -> &[String] {
        &self.order
    }
}

/// Label of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupLabel {
    /// Records whose group field had this value.
    Named(String),
    /// Records whose group field was absent.
    Ungrouped,
}

impl GroupLabel {
    /// The label text, or `None` for the ungrouped bucket.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GroupLabel::Named(name) => Some(name),
            GroupLabel::Ungrouped => None,
        }
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::Named(name) => f.write_str(name),
            GroupLabel::Ungrouped => f.write_str("ungrouped"),
        }
    }
}

/// One bucket of grouped records, in their sorted order.
#[derive(Debug)]
pub struct Group<'a, T> {
    /// Bucket label.
    pub label: GroupLabel,
    /// Records in this bucket.
    pub records: Vec<&'a T>,
}

impl<'a, T> Group<'a, T> {
    /// Number of records in the bucket.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false` for groups produced by [`group`]; empty buckets are omitted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Clone for Group<'_, T> {
    fn clone(&self) -> Self {
        Group {
            label: self.label.clone(),
            records: self.records.clone(),
        }
    }
}

/// Partitions records into buckets without reordering them.
///
/// Every input record appears in exactly one bucket, and records inside a
/// bucket keep their input order. Empty buckets are never produced.
pub fn group<'a, T, I, F>(records: I, key: &GroupKey, accessor: F) -> Vec<Group<'a, T>>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    let mut named: Vec<Group<'a, T>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut ungrouped: Vec<&'a T> = Vec::new();

    for record in records {
        let label = accessor(record, &key.field).label().map(|l| l.into_owned());
        match label {
            None => ungrouped.push(record),
            Some(label) => match index.get(&label) {
                Some(&slot) => named[slot].records.push(record),
                None => {
                    index.insert(label.clone(), named.len());
                    named.push(Group {
                        label: GroupLabel::Named(label),
                        records: vec![record],
                    });
                }
            },
        }
    }

    let rank = |group: &Group<'a, T>| {
        group
            .label
            .as_str()
            .and_then(|label| key.order.iter().position(|o| o == label))
            .unwrap_or(usize::MAX)
    };
    // Stable: unlisted labels (all usize::MAX) stay in first-seen order.
    named.sort_by_key(|group| rank(group));

    if !ungrouped.is_empty() {
        named.push(Group {
            label: GroupLabel::Ungrouped,
            records: ungrouped,
        });
    }
    named
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Card {
        name: &'static str,
        tier: Option<&'static str>,
    }

    fn accessor<'a>(card: &'a Card, field: &str) -> Value<'a> {
        match field {
            "name" => Value::String(card.name),
            "tier" => card.tier.map_or(Value::None, Value::String),
            _ => Value::None,
        }
    }

    fn cards() -> Vec<Card> {
        vec![
            Card { name: "Fire Rain", tier: Some("T3") },
            Card { name: "Swift Arrow", tier: Some("T1") },
            Card { name: "Mystery", tier: None },
            Card { name: "Poison Cloud", tier: Some("T2") },
            Card { name: "Basic Shield", tier: Some("T1") },
            Card { name: "Prototype", tier: Some("T4") },
        ]
    }

    fn names<'a>(group: &Group<'a, Card>) -> Vec<&'a str> {
        group.records.iter().map(|c| c.name).collect()
    }

    #[test]
    fn buckets_follow_label_order() {
        let cards = cards();
        let groups = group(&cards, &GroupKey::new("tier").order(["T1", "T2", "T3"]), accessor);

        let labels: Vec<String> = groups.iter().map(|g| g.label.to_string()).collect();
        assert_eq!(labels, ["T1", "T2", "T3", "T4", "ungrouped"]);
        assert_eq!(names(&groups[0]), ["Swift Arrow", "Basic Shield"]);
        assert_eq!(names(&groups[4]), ["Mystery"]);
    }

    #[test]
    fn empty_buckets_are_omitted() {
        let cards: Vec<Card> = cards().into_iter().filter(|c| c.tier == Some("T1")).collect();
        let groups = group(&cards, &GroupKey::new("tier").order(["T1", "T2", "T3"]), accessor);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, GroupLabel::Named("T1".into()));
        assert!(groups.iter().all(|g| !g.is_empty()));
    }

    #[test]
    fn first_seen_order_without_label_order() {
        let cards = cards();
        let groups = group(&cards, &GroupKey::new("tier"), accessor);
        let labels: Vec<Option<&str>> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(
            labels,
            [Some("T3"), Some("T1"), Some("T2"), Some("T4"), None]
        );
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let cards: Vec<Card> = Vec::new();
        assert!(group(&cards, &GroupKey::new("tier"), accessor).is_empty());
    }
}
