//! towerdex-query - filter, search, sort and group in-memory record collections.
//!
//! The engine turns a collection of records plus a view configuration into an
//! ordered, optionally grouped, subset of references into that collection. It
//! is pure and synchronous: the input is never mutated, nothing is cached, and
//! no evaluation ever fails.
//!
//! - Criteria: exact match with an `"all"` sentinel, set membership (direct or
//!   through a tag mapping), comparisons, regular expressions
//! - Case-insensitive substring search across several fields
//! - Stable multi-key sorting with precedence tables
//! - Grouping into labelled buckets that never reorders rows
//!
//! # Quick Start
//!
//! ```rust
//! use towerdex_query::{Query, Value, PrecedenceTable};
//!
//! struct Turret {
//!     name: String,
//!     tier: String,
//! }
//!
//! fn accessor<'a>(turret: &'a Turret, field: &str) -> Value<'a> {
//!     match field {
//!         "name" => Value::String(&turret.name),
//!         "tier" => Value::String(&turret.tier),
//!         _ => Value::None,
//!     }
//! }
//!
//! let turrets = vec![
//!     Turret { name: "Hive".into(), tier: "T3".into() },
//!     Turret { name: "Laser".into(), tier: "T1".into() },
//!     Turret { name: "Railgun".into(), tier: "T2".into() },
//! ];
//!
//! let view = Query::new()
//!     .sort_precedence("tier", PrecedenceTable::from_order(["T1", "T2", "T3"]))
//!     .run(&turrets, accessor);
//!
//! let names: Vec<&str> = view.records().iter().map(|t| t.name.as_str()).collect();
//! assert_eq!(names, ["Laser", "Railgun", "Hive"]);
//! ```
//!
//! # Missing Values
//!
//! | Stage | Absent field (`Value::None`) |
//! |-------|------------------------------|
//! | filter | does not match, unless the criterion is match-all |
//! | search | that field does not match |
//! | sort | after every present value, in either direction |
//! | group | the trailing `Ungrouped` bucket |
//!
//! # Records
//!
//! Any `Fn(&T, &str) -> Value<'_>` works as an accessor. Types implementing
//! [`Record`] (usually via `#[derive(Record)]` from `towerdex-macros`) can pass
//! `T::accessor`.

mod criterion;
mod error;
mod group;
mod op;
mod ordering;
mod pipeline;
mod query;
mod record;
mod search;
mod value;

pub use criterion::{Criterion, Operand, Selection, TagMap, MATCH_ALL};
pub use error::{QueryError, Result};
pub use group::{group, Group, GroupKey, GroupLabel};
pub use op::Op;
pub use ordering::{compare_by_keys, compare_values, Dir, PrecedenceTable, SortKey};
pub use pipeline::{filter, paginate, search, sort};
pub use query::{Query, Rows, View};
pub use record::{Record, RecordEnum, RecordTag, RecordTimestamp};
pub use search::Search;
pub use value::{Number, Timestamp, Value};
