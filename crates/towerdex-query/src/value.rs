//! Field values as seen by the query engine.
//!
//! The [`Value`] enum represents the runtime value of a field extracted from a
//! record. It covers the shapes the browsing views need: text, numbers,
//! timestamps, booleans and tag sets.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Runtime value for comparison, borrowed from the source record.
///
/// Accessor functions return this type. A field that is absent, null or
/// unknown is reported as [`Value::None`]; the engine treats it as
/// non-matching when filtering, last when sorting, and ungrouped when grouping.
///
/// # Example
///
/// ```
/// use towerdex_query::{Number, Value};
///
/// struct Turret {
///     name: String,
///     range: u8,
///     abilities: Vec<String>,
/// }
///
/// fn accessor<'a>(turret: &'a Turret, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::String(&turret.name),
///         "range" => Value::Number(Number::U64(turret.range as u64)),
///         "abilities" => Value::Tags(turret.abilities.iter().map(String::as_str).collect()),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    String(&'a str),
    Number(Number),
    Timestamp(Timestamp),
    Bool(bool),
    /// A set of string tags, such as the towers a card applies to.
    Tags(Vec<&'a str>),
    /// Absent, null or unknown field.
    None,
}

impl<'a> Value<'a> {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The string, for `String` values only.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the textual label of a scalar value.
    ///
    /// Used wherever a value is looked up by name: precedence tables, group
    /// labels and set-membership on scalar fields. A tag set yields its first
    /// tag. `None` and empty tag sets have no label.
    pub fn label(&self) -> Option<Cow<'a, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(*s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Timestamp(t) => Some(Cow::Owned(t.as_millis().to_string())),
            Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Value::Tags(tags) => tags.first().map(|t| Cow::Borrowed(*t)),
            Value::None => None,
        }
    }

    /// Fixed rank of each value kind, used to order values of different kinds.
    pub(crate) fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::Timestamp(_) => 2,
            Value::String(_) => 3,
            Value::Tags(_) => 4,
            Value::None => 5,
        }
    }
}

/// A number that keeps integer precision. Vote counts and turret stats
/// stay integers, fire rates are floats, and the two still compare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    /// Ordering for comparison criteria: `None` when either side is NaN, so
    /// NaN never satisfies a predicate.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::F64(a), _) if a.is_nan() => None,
            (_, Number::F64(b)) if b.is_nan() => None,
            _ => Some(self.total_cmp(other)),
        }
    }

    /// Total ordering over numbers, used for sorting.
    ///
    /// Every comparison is exact, including an integer against a float, so
    /// the order stays transitive past 2^53. Zeroes of either sign are
    /// equal. NaN sorts by its sign: above everything, or below everything
    /// when negative.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a.cmp(&b),
            (Number::U64(a), Number::U64(b)) => a.cmp(&b),
            (Number::I64(a), Number::U64(b)) => i128::from(a).cmp(&i128::from(b)),
            (Number::U64(a), Number::I64(b)) => i128::from(a).cmp(&i128::from(b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b)),
            (Number::I64(a), Number::F64(b)) => int_float_cmp(i128::from(a), b),
            (Number::U64(a), Number::F64(b)) => int_float_cmp(i128::from(a), b),
            (Number::F64(a), Number::I64(b)) => int_float_cmp(i128::from(b), a).reverse(),
            (Number::F64(a), Number::U64(b)) => int_float_cmp(i128::from(b), a).reverse(),
        }
    }
}

/// 2^64, one past `u64::MAX`.
const ABOVE_U64: f64 = 18_446_744_073_709_551_616.0;
/// -2^63, `i64::MIN`.
const MIN_I64: f64 = -9_223_372_036_854_775_808.0;

/// Compares a 64-bit integer with a float without rounding either.
fn int_float_cmp(int: i128, float: f64) -> Ordering {
    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= ABOVE_U64 {
        return Ordering::Less;
    }
    if float < MIN_I64 {
        return Ordering::Greater;
    }
    // In range, the whole part converts exactly and the subtraction is exact.
    let whole = float.trunc();
    int.cmp(&(whole as i128))
        .then_with(|| 0.0_f64.partial_cmp(&(float - whole)).unwrap_or(Ordering::Equal))
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Milliseconds since the Unix epoch, the resolution report and booster
/// dates are stored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }
}
