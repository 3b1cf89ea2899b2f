//! Shared domain types.
//!
//! These are the values that flow between the timer, the argument projector and
//! the curve models:
//!
//! - call arguments (`Value`, `ArgKey`, `Arguments`)
//! - curve families (`CurveKind`)
//! - fitted parameters (`Parameters`, `FittedCurve`)

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

/// A logged call argument.
///
/// Only numeric variants can feed a regression directly; everything else has to
/// go through a transformer first (typically `Value::len`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Text(_) | Value::List(_) => None,
        }
    }

    /// Length of text or list values; `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.len()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! value_from_wide_uint {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                // Values past i64::MAX keep their magnitude as floats.
                i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
            }
        })*
    };
}

value_from_wide_uint!(u64, usize);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Addresses one argument slot: a positional index or a keyword name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKey {
    Index(usize),
    Name(String),
}

impl fmt::Display for ArgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKey::Index(i) => write!(f, "{i}"),
            ArgKey::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<usize> for ArgKey {
    fn from(i: usize) -> Self {
        ArgKey::Index(i)
    }
}

impl From<&str> for ArgKey {
    fn from(name: &str) -> Self {
        ArgKey::Name(name.to_string())
    }
}

impl From<String> for ArgKey {
    fn from(name: String) -> Self {
        ArgKey::Name(name)
    }
}

/// Positional and keyword arguments of one call, in call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    /// Keyword arguments in insertion order.
    pub named: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument. Re-setting a name keeps its original position.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.named.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// All slots as `(key, value)` pairs: positional first, then keywords.
    pub fn slots(&self) -> impl Iterator<Item = (ArgKey, &Value)> {
        self.positional
            .iter()
            .enumerate()
            .map(|(i, v)| (ArgKey::Index(i), v))
            .chain(self.named.iter().map(|(k, v)| (ArgKey::Name(k.clone()), v)))
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.positional {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        for (name, value) in &self.named {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// A registered curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    Exponential,
    Linear,
    Logarithmic,
    Polynomial,
}

impl CurveKind {
    /// Registration order. Automatic selection walks families in this order and
    /// keeps the first one on equal scores.
    pub const ALL: [CurveKind; 4] = [
        CurveKind::Exponential,
        CurveKind::Linear,
        CurveKind::Logarithmic,
        CurveKind::Polynomial,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CurveKind::Exponential => "Exponential",
            CurveKind::Linear => "Linear",
            CurveKind::Logarithmic => "Logarithmic",
            CurveKind::Polynomial => "Polynomial",
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurveKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownCurveType {
                name: s.to_string(),
                known: CurveKind::ALL.iter().map(|k| k.name().to_string()).collect(),
            })
    }
}

/// Which family to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveSelection {
    /// Try every registered family and keep the lowest score.
    #[default]
    Automatic,
    Family(CurveKind),
}

impl FromStr for CurveSelection {
    type Err = Error;

    /// `"any"` selects automatically; anything else must be a family name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("any") {
            Ok(CurveSelection::Automatic)
        } else {
            s.parse().map(CurveSelection::Family)
        }
    }
}

/// Named curve parameters in the order the model produced them.
///
/// Linear and polynomial models evaluate their coefficients positionally, so
/// order matters and is preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, f64)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A fitted curve: the family plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedCurve {
    pub kind: CurveKind,
    pub parameters: Parameters,
}

impl FittedCurve {
    /// Render the curve's equation with coefficients rounded to `rounding` digits.
    pub fn equation(&self, rounding: u32) -> String {
        self.kind.model().equation(&self.parameters, rounding)
    }

    /// Predict the time for a new set of arguments (no exclusion, no transformation).
    pub fn predict(&self, arguments: &Arguments) -> crate::error::Result<f64> {
        crate::models::predict_with(self.kind.model(), &self.parameters, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_display_like_a_call() {
        let args = Arguments::new().arg(5).arg("abc").named("k", 7);
        assert_eq!(args.to_string(), "5, abc, k=7");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn renaming_a_keyword_keeps_its_slot() {
        let args = Arguments::new().named("a", 1).named("b", 2).named("a", 3);
        let keys: Vec<_> = args.named.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(args.named[0].1, Value::Int(3));
    }

    #[test]
    fn selection_parses_any_and_family_names() {
        assert_eq!("any".parse::<CurveSelection>().unwrap(), CurveSelection::Automatic);
        assert_eq!(
            "Logarithmic".parse::<CurveSelection>().unwrap(),
            CurveSelection::Family(CurveKind::Logarithmic)
        );
        let err = "Cubic".parse::<CurveSelection>().unwrap_err();
        assert!(matches!(err, Error::UnknownCurveType { ref name, .. } if name == "Cubic"));
    }

    #[test]
    fn parameters_serialize_in_insertion_order() {
        let params: Parameters = [("b", 1.5), ("x_1", 2.0), ("x_0", 3.0)].into_iter().collect();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"b":1.5,"x_1":2.0,"x_0":3.0}"#);
        assert_eq!(params.get("x_0"), Some(3.0));
        assert_eq!(params.get("x_2"), None);
    }

    #[test]
    fn wide_unsigned_sizes_do_not_wrap() {
        assert_eq!(Value::from(20_000u64), Value::Int(20_000));
        assert_eq!(Value::from(7usize), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::Float(u64::MAX as f64));
        assert_eq!(Arguments::new().arg(3u64).positional[0].as_f64(), Some(3.0));
    }

    #[test]
    fn value_numeric_view() {
        assert_eq!(Value::from(3usize).as_f64(), Some(3.0));
        assert_eq!(Value::from(true).as_f64(), Some(1.0));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::from(vec![1, 2, 3]).len(), Some(3));
    }
}
