//! Regression inputs produced by projecting run arguments.

use crate::domain::ArgKey;

/// One sample: the projected feature vector and the measured time.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub features: Vec<f64>,
    pub time: f64,
}

/// The samples handed to a curve model, plus the argument slot behind each
/// feature position (taken from the first run).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    keys: Vec<ArgKey>,
    points: Vec<Point>,
}

impl PointSet {
    pub fn new(keys: Vec<ArgKey>, points: Vec<Point>) -> Self {
        Self { keys, points }
    }

    /// Build a point set whose features are named `0, 1, …` (tests, synthetic data).
    pub fn from_points(points: Vec<Point>) -> Self {
        let arity = points.first().map_or(0, |p| p.features.len());
        Self {
            keys: (0..arity).map(ArgKey::Index).collect(),
            points,
        }
    }

    pub fn keys(&self) -> &[ArgKey] {
        &self.keys
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Parameter names for the feature positions: `x_<index>` or `x_<name>`.
    pub fn feature_names(&self) -> Vec<String> {
        self.keys.iter().map(|k| format!("x_{k}")).collect()
    }

    /// The shared feature arity, or `None` if the set is empty or arities differ.
    pub fn uniform_arity(&self) -> Option<usize> {
        let first = self.points.first()?.features.len();
        self.points
            .iter()
            .all(|p| p.features.len() == first)
            .then_some(first)
    }

    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time).collect()
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.points.iter().map(|p| p.features.clone()).collect()
    }
}
