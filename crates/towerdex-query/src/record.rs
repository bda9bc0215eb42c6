//! The field-accessor interface records implement.
//!
//! The engine never inspects record types directly; it asks for one field at
//! a time through an accessor. [`Record`] is that accessor as a trait, usually
//! generated with `#[derive(Record)]` from `towerdex-macros`.

use crate::value::{Timestamp, Value};

/// A record the engine can filter, search, sort and group.
///
/// # Manual Implementation
///
/// ```
/// use towerdex_query::{Record, Value, Number};
///
/// struct Feature {
///     title: String,
///     votes: u32,
/// }
///
/// impl Record for Feature {
///     fn field(&self, name: &str) -> Value<'_> {
///         match name {
///             "title" => Value::String(&self.title),
///             "votes" => Value::Number(Number::U64(self.votes as u64)),
///             _ => Value::None,
///         }
///     }
/// }
///
/// let feature = Feature { title: "Dark mode".into(), votes: 12 };
/// assert_eq!(feature.field("title"), Value::String("Dark mode"));
/// assert!(feature.field("missing").is_none());
/// ```
pub trait Record {
    /// Returns the value of `name`, or [`Value::None`] for unknown or absent
    /// fields.
    fn field(&self, name: &str) -> Value<'_>;

    /// Accessor function suitable for the engine's free functions and
    /// [`Query::run`](crate::Query::run).
    fn accessor<'a>(item: &'a Self, name: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.field(name)
    }
}

/// Enums exposed to the engine by their display label.
///
/// Used by `#[record(Enum)]` fields. The label is what exact-match and
/// precedence tables compare against, so it should be stable.
///
/// ```
/// use towerdex_query::RecordEnum;
///
/// enum Tier { T1, T2, T3 }
///
/// impl RecordEnum for Tier {
///     fn label(&self) -> &'static str {
///         match self {
///             Tier::T1 => "T1",
///             Tier::T2 => "T2",
///             Tier::T3 => "T3",
///         }
///     }
/// }
///
/// assert_eq!(Tier::T2.label(), "T2");
/// ```
pub trait RecordEnum {
    /// Label of this variant.
    fn label(&self) -> &'static str;
}

/// Conversion to a [`Timestamp`], used by `#[record(Timestamp)]` fields.
pub trait RecordTimestamp {
    fn record_timestamp(&self) -> Timestamp;
}

impl RecordTimestamp for i64 {
    fn record_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl RecordTimestamp for u64 {
    fn record_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl RecordTimestamp for Timestamp {
    fn record_timestamp(&self) -> Timestamp {
        *self
    }
}

/// One element of a `#[record(Tags)]` collection.
pub trait RecordTag {
    fn tag(&self) -> &str;
}

impl RecordTag for String {
    fn tag(&self) -> &str {
        self
    }
}

impl RecordTag for &str {
    fn tag(&self) -> &str {
        self
    }
}

impl<E: RecordEnum> RecordTag for E {
    fn tag(&self) -> &str {
        self.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Booster {
        discord_name: String,
        active: bool,
        created_at: Option<i64>,
    }

    impl Record for Booster {
        fn field(&self, name: &str) -> Value<'_> {
            match name {
                "discord_name" => Value::String(&self.discord_name),
                "active" => Value::Bool(self.active),
                "created_at" => self
                    .created_at
                    .map_or(Value::None, |t| Value::Timestamp(t.record_timestamp())),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn manual_record_and_accessor_agree() {
        let booster = Booster {
            discord_name: "Skyfall".into(),
            active: true,
            created_at: Some(1_700_000_000_000),
        };
        assert_eq!(booster.field("discord_name"), Value::String("Skyfall"));
        assert_eq!(Booster::accessor(&booster, "active"), Value::Bool(true));
        assert_eq!(
            booster.field("created_at"),
            Value::Timestamp(Timestamp::from_millis(1_700_000_000_000))
        );
        assert_eq!(booster.field("nope"), Value::None);
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(42i64.record_timestamp(), Timestamp::from_millis(42));
        assert_eq!(42u64.record_timestamp(), Timestamp::from_millis(42));
        assert_eq!(u64::MAX.record_timestamp(), Timestamp::from_millis(i64::MAX));
    }

    #[test]
    fn enum_tags_use_labels() {
        #[derive(Clone, Copy)]
        enum Gear {
            Armor,
            EnergyCore,
        }

        impl RecordEnum for Gear {
            fn label(&self) -> &'static str {
                match self {
                    Gear::Armor => "Armor",
                    Gear::EnergyCore => "Energy Core",
                }
            }
        }

        let gears = [Gear::Armor, Gear::EnergyCore];
        let tags: Vec<&str> = gears.iter().map(RecordTag::tag).collect();
        assert_eq!(tags, ["Armor", "Energy Core"]);
    }
}
