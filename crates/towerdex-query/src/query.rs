//! Query builder and executor.
//!
//! The [`Query`] struct is a fluent builder that collects criteria, an
//! optional search, sort keys, pagination and grouping, and then runs them
//! against a collection as one fixed pipeline.

use crate::criterion::{Criterion, Operand, Selection, TagMap};
use crate::error::Result;
use crate::group::{group, Group, GroupKey};
use crate::op::Op;
use crate::ordering::{Dir, PrecedenceTable, SortKey};
use crate::pipeline::{apply_search, filter, paginate, sort};
use crate::search::Search;
use crate::value::Value;

/// A reusable view configuration over a collection.
///
/// Execution always runs the stages in the same order:
///
/// ```text
/// filter → search → sort → paginate → group
/// ```
///
/// Criteria are conjunctive. Builders never fail except [`Query::pattern`],
/// which compiles its regular expression up front.
///
/// # Example
///
/// ```
/// use towerdex_query::{Query, Value, PrecedenceTable, Rows};
///
/// struct Card { name: &'static str, tier: &'static str, towers: Vec<&'static str> }
///
/// fn accessor<'a>(card: &'a Card, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::String(card.name),
///         "tier" => Value::String(card.tier),
///         "towers" => Value::Tags(card.towers.clone()),
///         _ => Value::None,
///     }
/// }
///
/// let cards = vec![
///     Card { name: "Fire Rain", tier: "T3", towers: vec!["Fire"] },
///     Card { name: "Swift Arrow", tier: "T1", towers: vec!["Archer"] },
///     Card { name: "Ice Age", tier: "T2", towers: vec!["Ice", "Archer"] },
/// ];
///
/// let view = Query::new()
///     .any_of("towers", ["Archer"])
///     .sort_precedence("tier", PrecedenceTable::from_order(["T1", "T2", "T3"]))
///     .run(&cards, accessor);
///
/// assert_eq!(view.total, 3);
/// assert_eq!(view.matched, 2);
/// let names: Vec<&str> = view.records().iter().map(|c| c.name).collect();
/// assert_eq!(names, ["Swift Arrow", "Ice Age"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    criteria: Vec<Criterion>,
    search: Option<Search>,
    sort_keys: Vec<SortKey>,
    group_key: Option<GroupKey>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    /// Creates an empty query, which keeps every record in input order.
    pub fn new() -> Self {
        Query::default()
    }

    // ========================================================================
    // Criteria
    // ========================================================================

    /// Adds an arbitrary criterion.
    pub fn filter(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Adds an exact-match criterion. `"all"` restricts nothing.
    pub fn exact(self, field: &str, selection: impl Into<Selection>) -> Self {
        self.filter(Criterion::exact(field, selection))
    }

    /// Adds a set-membership criterion. An empty set restricts nothing.
    pub fn any_of<I, S>(self, field: &str, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter(Criterion::any_of(field, selected))
    }

    /// Adds a set-membership criterion evaluated through `map`.
    pub fn any_of_mapped<I, S>(self, field: &str, selected: I, map: TagMap) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter(Criterion::any_of_mapped(field, selected, map))
    }

    /// Adds a comparison criterion.
    pub fn compare(self, field: &str, op: Op, operand: impl Into<Operand>) -> Self {
        self.filter(Criterion::compare(field, op, operand))
    }

    /// Adds a regular-expression criterion.
    ///
    /// Returns an error if the pattern is invalid.
    pub fn pattern(self, field: &str, pattern: &str) -> Result<Self> {
        Ok(self.filter(Criterion::pattern(field, pattern)?))
    }

    /// Sets the free-text search. Replaces any earlier search.
    pub fn search<I, S>(mut self, text: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search = Some(Search::new(text, fields));
        self
    }

    // ========================================================================
    // Ordering and grouping
    // ========================================================================

    /// Appends a natural-order sort key.
    pub fn sort_by(mut self, field: &str, dir: Dir) -> Self {
        self.sort_keys.push(SortKey::new(field, dir));
        self
    }

    /// Appends an ascending sort key.
    pub fn sort_asc(self, field: &str) -> Self {
        self.sort_by(field, Dir::Asc)
    }

    /// Appends a descending sort key.
    pub fn sort_desc(self, field: &str) -> Self {
        self.sort_by(field, Dir::Desc)
    }

    /// Appends an ascending precedence-table sort key.
    pub fn sort_precedence(mut self, field: &str, table: PrecedenceTable) -> Self {
        self.sort_keys.push(SortKey::precedence(field, table));
        self
    }

    /// Appends a prepared sort key.
    pub fn sort_key(mut self, key: SortKey) -> Self {
        self.sort_keys.push(key);
        self
    }

    /// Groups the final rows.
    pub fn group_by(mut self, key: GroupKey) -> Self {
        self.group_key = Some(key);
        self
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Sets the maximum number of rows.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the number of rows to skip.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Selects a 1-based page of `per_page` rows. Page 0 is treated as page 1.
    pub fn page(self, page: usize, per_page: usize) -> Self {
        let skip = page.max(1).saturating_sub(1).saturating_mul(per_page);
        self.offset(skip).limit(per_page)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the criteria.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Returns the search, if set.
    pub fn get_search(&self) -> Option<&Search> {
        self.search.as_ref()
    }

    /// Returns the sort keys.
    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort_keys
    }

    /// Returns the group key, if set.
    pub fn group_key(&self) -> Option<&GroupKey> {
        self.group_key.as_ref()
    }

    /// Returns the limit, if set.
    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the offset, if set.
    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    /// Returns `true` if no criterion or search would restrict the result.
    pub fn is_unrestricted(&self) -> bool {
        self.criteria.iter().all(Criterion::is_match_all)
            && self.search.as_ref().map_or(true, Search::is_blank)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests a single record against the criteria and search.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.criteria.iter().all(|c| c.matches(item, &accessor))
            && self
                .search
                .as_ref()
                .map_or(true, |search| search.matches(item, &accessor))
    }

    /// Counts the records that match, ignoring pagination.
    pub fn count<'a, T, I, F>(&self, records: I, accessor: F) -> usize
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(*record, &accessor))
            .count()
    }

    /// Returns the first record that matches, in input order.
    pub fn find<'a, T, I, F>(&self, records: I, accessor: F) -> Option<&'a T>
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        records
            .into_iter()
            .find(|record| self.matches(*record, &accessor))
    }

    /// Runs the full pipeline.
    pub fn run<'a, T, I, F>(&self, records: I, accessor: F) -> View<'a, T>
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        let input: Vec<&'a T> = records.into_iter().collect();
        let total = input.len();

        let mut rows = filter(input, &self.criteria, &accessor);
        if let Some(search) = &self.search {
            rows = apply_search(rows, search, &accessor);
        }
        let matched = rows.len();

        let rows = sort(rows, &self.sort_keys, &accessor);
        let rows = paginate(rows, self.offset.unwrap_or(0), self.limit);

        let rows = match &self.group_key {
            Some(key) => Rows::Grouped(group(rows, key, &accessor)),
            None => Rows::Flat(rows),
        };

        View {
            total,
            matched,
            rows,
        }
    }
}

/// The result of [`Query::run`].
#[derive(Debug)]
pub struct View<'a, T> {
    /// Number of input records.
    pub total: usize,
    /// Number of records that passed filter and search, before pagination.
    pub matched: usize,
    /// The visible rows.
    pub rows: Rows<'a, T>,
}

/// Flat or grouped rows of a [`View`].
#[derive(Debug)]
pub enum Rows<'a, T> {
    Flat(Vec<&'a T>),
    Grouped(Vec<Group<'a, T>>),
}

impl<'a, T> View<'a, T> {
    /// All visible records in display order, flattening groups.
    pub fn records(&self) -> Vec<&'a T> {
        match &self.rows {
            Rows::Flat(rows) => rows.clone(),
            Rows::Grouped(groups) => groups
                .iter()
                .flat_map(|g| g.records.iter().copied())
                .collect(),
        }
    }

    /// The groups, if the query grouped its rows.
    pub fn groups(&self) -> Option<&[Group<'a, T>]> {
        match &self.rows {
            Rows::Grouped(groups) => Some(groups),
            Rows::Flat(_) => None,
        }
    }

    /// Number of visible records.
    pub fn len(&self) -> usize {
        match &self.rows {
            Rows::Flat(rows) => rows.len(),
            Rows::Grouped(groups) => groups.iter().map(Group::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pages of `per_page` rows needed for every matched record.
    pub fn page_count(&self, per_page: usize) -> usize {
        if per_page == 0 {
            return 0;
        }
        self.matched.div_ceil(per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupLabel;
    use crate::value::{Number, Timestamp};

    #[derive(Debug, PartialEq)]
    struct Report {
        title: &'static str,
        kind: &'static str,
        votes: i64,
        created_at: i64,
        moderator: Option<&'static str>,
    }

    fn accessor<'a>(r: &'a Report, field: &str) -> Value<'a> {
        match field {
            "title" => Value::String(r.title),
            "kind" => Value::String(r.kind),
            "votes" => Value::Number(Number::I64(r.votes)),
            "created_at" => Value::Timestamp(Timestamp::from_millis(r.created_at)),
            "moderator" => r.moderator.map_or(Value::None, Value::String),
            _ => Value::None,
        }
    }

    fn reports() -> Vec<Report> {
        vec![
            Report {
                title: "Typo in card text",
                kind: "translation",
                votes: 3,
                created_at: 3_000,
                moderator: Some("mod-1"),
            },
            Report {
                title: "Faster chip list",
                kind: "optimisation",
                votes: 12,
                created_at: 1_000,
                moderator: None,
            },
            Report {
                title: "Add dark mode",
                kind: "suggestions",
                votes: 12,
                created_at: 2_000,
                moderator: None,
            },
            Report {
                title: "Wrong tower icon",
                kind: "other",
                votes: 0,
                created_at: 4_000,
                moderator: Some("mod-2"),
            },
        ]
    }

    fn titles<'a>(rows: &[&'a Report]) -> Vec<&'a str> {
        rows.iter().map(|r| r.title).collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let reports = reports();
        let view = Query::new().run(&reports, accessor);
        assert_eq!(view.total, 4);
        assert_eq!(view.matched, 4);
        assert_eq!(view.records(), reports.iter().collect::<Vec<_>>());
        assert!(Query::new().is_unrestricted());
    }

    #[test]
    fn newest_first() {
        let reports = reports();
        let view = Query::new().sort_desc("created_at").run(&reports, accessor);
        assert_eq!(
            titles(&view.records()),
            [
                "Wrong tower icon",
                "Typo in card text",
                "Add dark mode",
                "Faster chip list"
            ]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let reports = reports();
        let view = Query::new().sort_desc("votes").run(&reports, accessor);
        assert_eq!(
            titles(&view.records()),
            [
                "Faster chip list",
                "Add dark mode",
                "Typo in card text",
                "Wrong tower icon"
            ]
        );
    }

    #[test]
    fn compare_and_exact_combine() {
        let reports = reports();
        let view = Query::new()
            .compare("votes", Op::Gte, 10i64)
            .exact("kind", "suggestions")
            .run(&reports, accessor);
        assert_eq!(titles(&view.records()), ["Add dark mode"]);
        assert_eq!(view.matched, 1);
    }

    #[test]
    fn all_sentinel_restricts_nothing() {
        let reports = reports();
        let query = Query::new().exact("kind", "all");
        assert!(query.is_unrestricted());
        assert_eq!(query.run(&reports, accessor).len(), 4);
    }

    #[test]
    fn pattern_requires_valid_regex() {
        assert!(Query::new().pattern("title", "(").is_err());

        let reports = reports();
        let query = Query::new().pattern("title", "^(Add|Wrong)").unwrap();
        assert_eq!(query.count(&reports, accessor), 2);
    }

    #[test]
    fn search_runs_after_filter() {
        let reports = reports();
        let view = Query::new()
            .compare("votes", Op::Lt, 5i64)
            .search("TOWER", ["title"])
            .run(&reports, accessor);
        assert_eq!(titles(&view.records()), ["Wrong tower icon"]);
    }

    #[test]
    fn pagination_after_sort() {
        let reports = reports();
        let query = Query::new().sort_asc("created_at").page(2, 3);
        let view = query.run(&reports, accessor);
        assert_eq!(view.matched, 4);
        assert_eq!(titles(&view.records()), ["Wrong tower icon"]);
        assert_eq!(view.page_count(3), 2);
        assert_eq!(query.get_offset(), Some(3));
        assert_eq!(query.get_limit(), Some(3));
    }

    #[test]
    fn page_zero_is_first_page() {
        let query = Query::new().page(0, 50);
        assert_eq!(query.get_offset(), Some(0));
        assert_eq!(query.get_limit(), Some(50));
    }

    #[test]
    fn grouping_keeps_sorted_order() {
        let reports = reports();
        let view = Query::new()
            .sort_asc("title")
            .group_by(GroupKey::new("moderator"))
            .run(&reports, accessor);

        let groups = view.groups().expect("grouped");
        let labels: Vec<&GroupLabel> = groups.iter().map(|g| &g.label).collect();
        assert_eq!(
            labels,
            [
                &GroupLabel::Named("mod-1".into()),
                &GroupLabel::Named("mod-2".into()),
                &GroupLabel::Ungrouped
            ]
        );
        assert_eq!(
            titles(&groups[2].records),
            ["Add dark mode", "Faster chip list"]
        );
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn find_and_matches() {
        let reports = reports();
        let query = Query::new().exact("kind", "other");
        let found = query.find(&reports, accessor).expect("found");
        assert_eq!(found.title, "Wrong tower icon");
        assert!(query.matches(found, accessor));
        assert!(!query.matches(&reports[0], accessor));
    }

    #[test]
    fn input_is_untouched() {
        let reports = reports();
        let before: Vec<&str> = reports.iter().map(|r| r.title).collect();
        let _ = Query::new().sort_desc("votes").run(&reports, accessor);
        let after: Vec<&str> = reports.iter().map(|r| r.title).collect();
        assert_eq!(before, after);
    }
}
