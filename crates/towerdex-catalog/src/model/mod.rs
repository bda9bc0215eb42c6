//! Catalog records.
//!
//! Each collection is a typed struct exposing its fields to the query engine
//! through `towerdex_query::Record`. Most derive it; [`Chip`] and [`Turret`]
//! implement it by hand because they expose nested values.

/// Declares a closed set of labels as an enum.
///
/// Generates serde renames, `ALL`, `as_str`, `Display`, a case-insensitive
/// `FromStr`, and `RecordEnum` so the engine compares by label.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $kind:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Every label, in display order.
            pub fn labels() -> impl Iterator<Item = &'static str> {
                Self::ALL.iter().map(|v| v.as_str())
            }
        }

        impl ::towerdex_query::RecordEnum for $name {
            fn label(&self) -> &'static str {
                self.as_str()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::CatalogError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| $crate::CatalogError::Invalid {
                        field: $kind,
                        reason: format!(
                            "unknown value '{}', expected one of: {}",
                            wanted,
                            Self::labels().collect::<Vec<_>>().join(", ")
                        ),
                    })
            }
        }
    };
}

pub(crate) use label_enum;

mod booster;
mod card;
mod chip;
mod feature;
mod report;
mod tower;
mod turret;

pub use booster::Booster;
pub use card::{Card, CardType, Tier};
pub use chip::{Chip, ChipRarity, GearType, BOOST_TYPES};
pub use feature::{FeatureStatus, FeatureSuggestion};
pub use report::{Report, ReportType};
pub use tower::{tower_types, Tower};
pub use turret::{Turret, TurretStats};

/// A record type served as one named collection.
pub trait Collection: Clone + Send + Sync + 'static {
    /// Root segment of the collection's cache keys.
    const COLLECTION: &'static str;
    /// Human-readable singular, used in error messages.
    const KIND: &'static str;
}
