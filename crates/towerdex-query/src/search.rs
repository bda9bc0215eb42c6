//! Free-text search over one or more fields.

use crate::value::Value;

/// Case-insensitive substring search across a set of text fields.
///
/// A record matches when any of the named fields contains the search text.
/// `String` fields are searched directly and `Tags` fields match when any tag
/// contains the text; other kinds never match. Blank text (empty or only
/// whitespace) matches every record, so an untouched search box filters
/// nothing.
///
/// Surrounding whitespace in the text is ignored.
///
/// ```
/// use towerdex_query::{Search, Value};
///
/// struct Booster { discord_name: String, game_id: String }
///
/// fn accessor<'a>(b: &'a Booster, field: &str) -> Value<'a> {
///     match field {
///         "discord_name" => Value::String(&b.discord_name),
///         "game_id" => Value::String(&b.game_id),
///         _ => Value::None,
///     }
/// }
///
/// let booster = Booster { discord_name: "Skyfall".into(), game_id: "88-1204".into() };
/// let search = Search::new("SKY", ["discord_name", "game_id"]);
/// assert!(search.matches(&booster, &accessor));
/// assert!(Search::new("   ", ["discord_name"]).matches(&booster, &accessor));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Search {
    text: String,
    fields: Vec<String>,
}

impl Search {
    /// Creates a search for `text` over `fields`.
    pub fn new<I, S>(text: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Search {
            text: text.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The raw search text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The fields searched.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns `true` if the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Tests a single record.
    pub fn matches<T, F>(&self, item: &T, accessor: &F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        match self.needle() {
            None => true,
            Some(needle) => self.matches_needle(item, accessor, &needle),
        }
    }

    /// Lowercased, trimmed text, or `None` when blank.
    pub(crate) fn needle(&self) -> Option<String> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    pub(crate) fn matches_needle<T, F>(&self, item: &T, accessor: &F, needle: &str) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.fields
            .iter()
            .any(|field| value_contains(&accessor(item, field), needle))
    }
}

fn value_contains(value: &Value<'_>, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Tags(tags) => tags.iter().any(|t| t.to_lowercase().contains(needle)),
        _ => false,
    }
}
