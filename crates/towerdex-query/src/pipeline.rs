//! The individual engine stages.
//!
//! Each stage takes records by reference and returns a new `Vec` of
//! references; nothing is mutated. The stages compose in a fixed order:
//! `filter → search → sort → group`. [`Query::run`](crate::Query::run) chains
//! them, but each one is usable on its own.

use crate::criterion::Criterion;
use crate::ordering::{compare_by_keys, SortKey};
use crate::search::Search;
use crate::value::Value;

/// Keeps the records for which every criterion evaluates true.
///
/// Criteria are conjunctive, so their order does not affect the result. An
/// empty criteria list keeps everything.
pub fn filter<'a, T, I, F>(records: I, criteria: &[Criterion], accessor: F) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    let active: Vec<&Criterion> = criteria.iter().filter(|c| !c.is_match_all()).collect();
    records
        .into_iter()
        .filter(|record| active.iter().all(|c| c.matches(*record, &accessor)))
        .collect()
}

/// Keeps the records where any of `fields` contains `query`, ignoring case.
///
/// A blank query returns every record in its original order.
pub fn search<'a, T, I, F, S>(records: I, query: &str, fields: &[S], accessor: F) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    S: AsRef<str>,
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    let search = Search::new(query, fields.iter().map(|f| f.as_ref()));
    apply_search(records, &search, &accessor)
}

pub(crate) fn apply_search<'a, T, I, F>(records: I, search: &Search, accessor: &F) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    match search.needle() {
        None => records.into_iter().collect(),
        Some(needle) => records
            .into_iter()
            .filter(|record| search.matches_needle(*record, accessor, &needle))
            .collect(),
    }
}

/// Stable multi-key sort.
///
/// Keys apply in priority order; records equal on every key keep their input
/// order. With no keys the input order is returned unchanged.
pub fn sort<'a, T, I, F>(records: I, keys: &[SortKey], accessor: F) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    for<'b> F: Fn(&'b T, &str) -> Value<'b>,
{
    let mut sorted: Vec<&'a T> = records.into_iter().collect();
    if !keys.is_empty() {
        // `sort_by` is a stable sort.
        sorted.sort_by(|a, b| compare_by_keys(*a, *b, keys, &accessor));
    }
    sorted
}

/// Skips `offset` records and keeps at most `limit`.
pub fn paginate<'a, T>(records: Vec<&'a T>, offset: usize, limit: Option<usize>) -> Vec<&'a T> {
    let rest = records.into_iter().skip(offset);
    match limit {
        Some(limit) => rest.take(limit).collect(),
        None => rest.collect(),
    }
}
