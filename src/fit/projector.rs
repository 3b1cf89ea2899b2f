//! Argument projection: logged call arguments -> numeric feature vectors.
//!
//! For every run we copy its arguments, apply transformers to the slots that are
//! not excluded, drop the excluded slots, and read the remainder as numbers:
//! positional arguments first (by index), then keyword arguments (insertion
//! order). Excluded slots are omitted, not zeroed.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::domain::{ArgKey, Arguments, Point, PointSet, Run, Value};
use crate::error::{Error, Result};

/// A value transformer, e.g. `|v| Value::from(v.len().unwrap_or(0))`.
pub type Transformer = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// Argument slots (positional indices and/or keyword names) left out of fitting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions(HashSet<ArgKey>);

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.insert(ArgKey::Index(index));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.insert(ArgKey::Name(name.into()));
        self
    }

    pub fn contains(&self, key: &ArgKey) -> bool {
        self.0.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<ArgKey>> FromIterator<K> for Exclusions {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// How argument values are transformed before they become features.
#[derive(Default)]
pub enum Transformers {
    #[default]
    None,
    /// One transformer applied to every non-excluded argument.
    Uniform(Transformer),
    /// Transformers for specific slots; other slots pass through unchanged.
    PerSlot(HashMap<ArgKey, Transformer>),
}

impl Transformers {
    pub fn uniform(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Transformers::Uniform(Box::new(f))
    }

    /// Add a transformer for one slot (switching to per-slot mode if needed).
    pub fn slot(self, key: impl Into<ArgKey>, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        let mut map = match self {
            Transformers::PerSlot(map) => map,
            Transformers::None | Transformers::Uniform(_) => HashMap::new(),
        };
        map.insert(key.into(), Box::new(f));
        Transformers::PerSlot(map)
    }

    /// A copy of `arguments` with every matching slot transformed.
    pub fn apply(&self, arguments: &Arguments) -> Arguments {
        let convert = |key: ArgKey, value: &Value| match self.for_slot(&key) {
            Some(f) => f(value),
            None => value.clone(),
        };
        Arguments {
            positional: arguments
                .positional
                .iter()
                .enumerate()
                .map(|(i, v)| convert(ArgKey::Index(i), v))
                .collect(),
            named: arguments
                .named
                .iter()
                .map(|(name, v)| (name.clone(), convert(ArgKey::Name(name.clone()), v)))
                .collect(),
        }
    }

    fn for_slot(&self, key: &ArgKey) -> Option<&Transformer> {
        match self {
            Transformers::None => None,
            Transformers::Uniform(f) => Some(f),
            Transformers::PerSlot(map) => map.get(key),
        }
    }
}

impl fmt::Debug for Transformers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformers::None => f.write_str("None"),
            Transformers::Uniform(_) => f.write_str("Uniform(..)"),
            Transformers::PerSlot(map) => f
                .debug_set()
                .entries(map.keys().map(|k| k.to_string()))
                .finish(),
        }
    }
}

/// The feature vector of one run and the slot behind each position.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub keys: Vec<ArgKey>,
    pub features: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct ArgumentProjector<'a> {
    exclude: &'a Exclusions,
    transformers: &'a Transformers,
}

impl<'a> ArgumentProjector<'a> {
    pub fn new(exclude: &'a Exclusions, transformers: &'a Transformers) -> Self {
        Self { exclude, transformers }
    }

    /// Project one run's arguments.
    pub fn project(&self, run: &Run) -> Result<Projection> {
        if !run.has_arguments() {
            return Err(Error::ArgumentsRequired);
        }

        let mut keys = Vec::with_capacity(run.arguments.len());
        let mut features = Vec::with_capacity(run.arguments.len());
        for (key, value) in run.arguments.slots() {
            if self.exclude.contains(&key) {
                continue;
            }
            let transformed = self.transformers.for_slot(&key).map(|f| f(value));
            let number = transformed
                .as_ref()
                .unwrap_or(value)
                .as_f64()
                .ok_or_else(|| Error::NonNumericArgument { slot: key.to_string() })?;
            keys.push(key);
            features.push(number);
        }

        Ok(Projection { keys, features })
    }

    /// Project every run into a point set.
    ///
    /// Feature names come from the first run and must be distinct: positional
    /// index `0` and keyword `"0"` would both be named `x_0`, which fails with
    /// `AmbiguousArgument`. Runs whose surviving slots differ
    /// are still included (arity checks happen in each model's `poll`), but we
    /// log it since coefficients would then mix unrelated arguments.
    pub fn point_set(&self, runs: &[Run]) -> Result<PointSet> {
        let mut keys: Option<Vec<ArgKey>> = None;
        let mut points = Vec::with_capacity(runs.len());

        for run in runs {
            let projection = self.project(run)?;
            if keys.is_none() {
                reject_colliding_names(&projection.keys)?;
                keys = Some(projection.keys);
            } else if keys.as_ref() != Some(&projection.keys) {
                tracing::warn!(
                    run = %run.label,
                    "argument slots differ from the first run; features may not line up"
                );
            }
            points.push(Point {
                features: projection.features,
                time: run.time,
            });
        }

        Ok(PointSet::new(keys.unwrap_or_default(), points))
    }
}

fn reject_colliding_names(keys: &[ArgKey]) -> Result<()> {
    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        let name = key.to_string();
        if !seen.insert(name.clone()) {
            return Err(Error::AmbiguousArgument { name });
        }
    }
    Ok(())
}
