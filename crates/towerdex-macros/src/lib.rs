//! Proc macros for towerdex.
//!
//! - [`Record`] - derive the `towerdex_query::Record` field accessor and
//!   field-name constants from struct annotations

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `towerdex_query::Record` for a struct.
///
/// Only annotated fields are exposed; unannotated fields are invisible to the
/// query engine (they read as `Value::None`).
///
/// # Field Attributes
///
/// | Attribute | Field type | Exposed as |
/// |-----------|------------|------------|
/// | `String` | `AsRef<str>` | `Value::String` |
/// | `Number` | any `Copy` integer or float | `Value::Number` |
/// | `Timestamp` | `RecordTimestamp` (`i64` / `u64` millis) | `Value::Timestamp` |
/// | `Enum` | `RecordEnum` | `Value::String` of the variant label |
/// | `Bool` | `bool` | `Value::Bool` |
/// | `Tags` | collection of `RecordTag` items | `Value::Tags` |
/// | `skip` | | not exposed |
/// | `rename = "..."` | | exposed under a different name |
///
/// `Option<_>` around any of these is exposed as `Value::None` when empty.
///
/// # Generated Code
///
/// 1. One constant per exposed field (`Card::TIER`, `Booster::DISCORD_NAME`)
/// 2. `FIELDS`, the list of exposed names
/// 3. `impl Record`
///
/// # Example
///
/// ```ignore
/// use towerdex_macros::Record;
/// use towerdex_query::{Query, Record as _};
///
/// #[derive(Record)]
/// struct Booster {
///     #[record(String)]
///     discord_name: String,
///     #[record(String)]
///     discord_nickname: Option<String>,
///     #[record(Bool)]
///     active: bool,
/// }
///
/// let boosters = vec![
///     Booster { discord_name: "Skyfall".into(), discord_nickname: None, active: true },
///     Booster { discord_name: "Nova".into(), discord_nickname: Some("sky".into()), active: false },
/// ];
///
/// let view = Query::new()
///     .search("sky", [Booster::DISCORD_NAME, Booster::DISCORD_NICKNAME])
///     .exact(Booster::ACTIVE, true)
///     .run(&boosters, Booster::accessor);
/// assert_eq!(view.len(), 1);
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
