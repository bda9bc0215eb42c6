//! Filter criteria.
//!
//! A [`Criterion`] is a single predicate over a record. A query holds any
//! number of them and a record is kept only when every one evaluates true.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;

use crate::error::Result;
use crate::op::Op;
use crate::search::Search;
use crate::value::{Number, Timestamp, Value};

/// The sentinel a filter dropdown uses for "no restriction".
pub const MATCH_ALL: &str = "all";

/// A single filter predicate.
///
/// Criteria never fail at evaluation time. An absent field (`Value::None`) or
/// a value of the wrong kind simply does not match, except where the criterion
/// is in its match-all state (see [`Criterion::is_match_all`]).
#[derive(Debug, Clone)]
pub enum Criterion {
    /// Exact value equality. On a `Tags` field, matches when the set contains
    /// the value.
    Exact { field: String, selection: Selection },

    /// Set membership: the field (a tag set, or a scalar treated as a
    /// one-element set) must share at least one value with `selected`.
    /// An empty selection matches every record.
    AnyOf { field: String, selected: Vec<String> },

    /// Set membership evaluated through a mapping, e.g. tower name to tower
    /// type. Each field tag is looked up in `map`; unmapped tags are ignored.
    AnyOfMapped {
        field: String,
        selected: Vec<String>,
        map: TagMap,
    },

    /// Case-insensitive substring search over several fields.
    Search(Search),

    /// Ordered comparison against an operand of the same kind.
    Compare {
        field: String,
        op: Op,
        operand: Operand,
    },

    /// Regular-expression match on a string field.
    Pattern { field: String, regex: Regex },
}

impl Criterion {
    /// Exact-match criterion.
    ///
    /// ```
    /// use towerdex_query::{Criterion, Selection};
    ///
    /// // A dropdown left on "all" restricts nothing.
    /// assert!(Criterion::exact("tier", "all").is_match_all());
    /// assert!(!Criterion::exact("tier", "T2").is_match_all());
    /// assert!(Criterion::exact("tier", Selection::All).is_match_all());
    /// ```
    pub fn exact(field: impl Into<String>, selection: impl Into<Selection>) -> Self {
        Criterion::Exact {
            field: field.into(),
            selection: selection.into(),
        }
    }

    /// Set-membership criterion.
    pub fn any_of<I, S>(field: impl Into<String>, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criterion::AnyOf {
            field: field.into(),
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }

    /// Set-membership criterion through a tag mapping.
    pub fn any_of_mapped<I, S>(field: impl Into<String>, selected: I, map: TagMap) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criterion::AnyOfMapped {
            field: field.into(),
            selected: selected.into_iter().map(Into::into).collect(),
            map,
        }
    }

    /// Substring-search criterion.
    pub fn search<I, S>(text: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criterion::Search(Search::new(text, fields))
    }

    /// Comparison criterion.
    pub fn compare(field: impl Into<String>, op: Op, operand: impl Into<Operand>) -> Self {
        Criterion::Compare {
            field: field.into(),
            op,
            operand: operand.into(),
        }
    }

    /// Regular-expression criterion.
    ///
    /// Returns an error if the pattern does not compile.
    pub fn pattern(field: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Criterion::Pattern {
            field: field.into(),
            regex: Regex::new(pattern)?,
        })
    }

    /// The single field this criterion reads, if it reads exactly one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Criterion::Exact { field, .. }
            | Criterion::AnyOf { field, .. }
            | Criterion::AnyOfMapped { field, .. }
            | Criterion::Compare { field, .. }
            | Criterion::Pattern { field, .. } => Some(field),
            Criterion::Search(_) => None,
        }
    }

    /// Returns `true` if this criterion cannot exclude any record.
    pub fn is_match_all(&self) -> bool {
        match self {
            Criterion::Exact { selection, .. } => selection.is_all(),
            Criterion::AnyOf { selected, .. } | Criterion::AnyOfMapped { selected, .. } => {
                selected.is_empty()
            }
            Criterion::Search(search) => search.is_blank(),
            Criterion::Compare { .. } | Criterion::Pattern { .. } => false,
        }
    }

    /// Evaluates this criterion against a record.
    pub fn matches<T, F>(&self, item: &T, accessor: &F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        if self.is_match_all() {
            return true;
        }

        match self {
            Criterion::Search(search) => search.matches(item, accessor),
            Criterion::Exact { field, selection } => match selection {
                Selection::All => true,
                Selection::Only(operand) => match_exact(&accessor(item, field), operand),
            },
            Criterion::AnyOf { field, selected } => tags_of(&accessor(item, field))
                .iter()
                .any(|tag| selected.iter().any(|s| s == tag)),
            Criterion::AnyOfMapped {
                field,
                selected,
                map,
            } => tags_of(&accessor(item, field))
                .iter()
                .filter_map(|tag| map.get(tag))
                .any(|derived| selected.iter().any(|s| s == derived)),
            Criterion::Compare { field, op, operand } => operand
                .ordering(&accessor(item, field))
                .is_some_and(|ordering| op.eval_ordering(ordering)),
            Criterion::Pattern { field, regex } => accessor(item, field)
                .as_str()
                .is_some_and(|s| regex.is_match(s)),
        }
    }
}

fn match_exact(value: &Value<'_>, operand: &Operand) -> bool {
    match (value, operand) {
        (Value::Tags(tags), Operand::String(expected)) => tags.iter().any(|t| t == expected),
        _ => operand.ordering(value) == Some(Ordering::Equal),
    }
}

/// A value viewed as a set of labels.
fn tags_of<'a>(value: &Value<'a>) -> Vec<Cow<'a, str>> {
    match value {
        Value::Tags(tags) => tags.iter().map(|t| Cow::Borrowed(*t)).collect(),
        scalar => scalar.label().into_iter().collect(),
    }
}

/// What an exact-match criterion is bound to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    /// Match-all sentinel.
    #[default]
    All,
    /// A concrete value.
    Only(Operand),
}

impl Selection {
    /// A concrete selection.
    pub fn only(operand: impl Into<Operand>) -> Self {
        Selection::Only(operand.into())
    }

    /// Returns `true` for the match-all sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// Strings are read the way a dropdown reports them: `"all"` (any case) is the
/// match-all sentinel, anything else is a concrete value.
impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case(MATCH_ALL) {
            Selection::All
        } else {
            Selection::Only(Operand::String(s.to_string()))
        }
    }
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        Selection::from(s.as_str())
    }
}

impl From<&String> for Selection {
    fn from(s: &String) -> Self {
        Selection::from(s.as_str())
    }
}

impl From<bool> for Selection {
    fn from(b: bool) -> Self {
        Selection::Only(Operand::Bool(b))
    }
}

impl From<Operand> for Selection {
    fn from(operand: Operand) -> Self {
        Selection::Only(operand)
    }
}

/// `None` means nothing was selected, which matches everything.
impl<T: Into<Selection>> From<Option<T>> for Selection {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Selection::All, Into::into)
    }
}

/// Owned comparison value stored in a criterion.
///
/// Unlike [`Value`], which borrows from the record, an `Operand` owns its data
/// so it can live in a query definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
}

impl Operand {
    /// Orders a field value against this operand; `None` on kind mismatch or NaN.
    fn ordering(&self, value: &Value<'_>) -> Option<Ordering> {
        match (value, self) {
            (Value::String(s), Operand::String(o)) => Some((*s).cmp(o.as_str())),
            (Value::Number(n), Operand::Number(o)) => n.compare(*o),
            (Value::Timestamp(t), Operand::Timestamp(o)) => Some(t.cmp(o)),
            (Value::Bool(b), Operand::Bool(o)) => Some(b.cmp(o)),
            _ => None,
        }
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<Timestamp> for Operand {
    fn from(t: Timestamp) -> Self {
        Operand::Timestamp(t)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

macro_rules! operand_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Operand {
                fn from(n: $source) -> Self {
                    Operand::Number(Number::from(n))
                }
            }
        )*
    };
}

operand_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Mapping from a tag to a derived tag, used by [`Criterion::AnyOfMapped`].
///
/// ```
/// use towerdex_query::TagMap;
///
/// let kinds = TagMap::from_groups([
///     ("Energy", vec!["Laser", "Teslacoil"]),
///     ("Kinetic", vec!["Railgun"]),
/// ]);
/// assert_eq!(kinds.get("Laser"), Some("Energy"));
/// assert_eq!(kinds.get("Hive"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    map: HashMap<String, String>,
}

impl TagMap {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        TagMap::default()
    }

    /// Adds one mapping entry.
    pub fn with(mut self, tag: impl Into<String>, derived: impl Into<String>) -> Self {
        self.map.insert(tag.into(), derived.into());
        self
    }

    /// Builds a mapping from derived tag groups.
    pub fn from_groups<G, D, I, S>(groups: G) -> Self
    where
        G: IntoIterator<Item = (D, I)>,
        D: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = HashMap::new();
        for (derived, tags) in groups {
            let derived = derived.into();
            for tag in tags {
                map.insert(tag.into(), derived.clone());
            }
        }
        TagMap { map }
    }

    /// Looks up the derived tag.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.map.get(tag).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TagMap {
            map: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
