//! The ordered table of curve families used by selection.

use crate::domain::{Arguments, CurveKind, Parameters};
use crate::error::{Error, Result};
use crate::models::model::{CurveModel, predict_with};

/// An immutable, ordered set of curve families.
///
/// Order is significant: automatic selection keeps the first family on equal
/// scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveRegistry {
    kinds: Vec<CurveKind>,
}

impl Default for CurveRegistry {
    fn default() -> Self {
        Self {
            kinds: CurveKind::ALL.to_vec(),
        }
    }
}

impl CurveRegistry {
    /// A registry restricted to `kinds`, in the given order (duplicates dropped).
    pub fn with_kinds(kinds: impl IntoIterator<Item = CurveKind>) -> Self {
        let mut out = Vec::new();
        for kind in kinds {
            if !out.contains(&kind) {
                out.push(kind);
            }
        }
        Self { kinds: out }
    }

    pub fn kinds(&self) -> &[CurveKind] {
        &self.kinds
    }

    pub fn contains(&self, kind: CurveKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static dyn CurveModel> + '_ {
        self.kinds.iter().map(|k| k.model())
    }

    /// Look up a registered family.
    pub fn get(&self, kind: CurveKind) -> Result<&'static dyn CurveModel> {
        if self.contains(kind) {
            Ok(kind.model())
        } else {
            Err(self.unknown(kind.name()))
        }
    }

    /// Look up a registered family by name.
    pub fn lookup(&self, name: &str) -> Result<&'static dyn CurveModel> {
        self.kinds
            .iter()
            .find(|k| k.name() == name)
            .map(|k| k.model())
            .ok_or_else(|| self.unknown(name))
    }

    /// Evaluate a named family with `parameters` at new call arguments.
    pub fn predict(&self, name: &str, parameters: &Parameters, arguments: &Arguments) -> Result<f64> {
        predict_with(self.lookup(name)?, parameters, arguments)
    }

    fn unknown(&self, name: &str) -> Error {
        Error::UnknownCurveType {
            name: name.to_string(),
            known: self.kinds.iter().map(|k| k.name().to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_is_registration_order() {
        let registry = CurveRegistry::default();
        let names: Vec<_> = registry.iter().map(|m| m.kind().name()).collect();
        assert_eq!(names, ["Exponential", "Linear", "Logarithmic", "Polynomial"]);
    }

    #[test]
    fn lookup_rejects_unregistered_names() {
        let registry = CurveRegistry::with_kinds([CurveKind::Linear, CurveKind::Linear]);
        assert_eq!(registry.kinds(), [CurveKind::Linear]);
        assert!(registry.lookup("Linear").is_ok());
        let err = registry.lookup("Exponential").unwrap_err();
        assert!(matches!(err, Error::UnknownCurveType { ref known, .. } if known == &["Linear"]));
        assert!(registry.get(CurveKind::Polynomial).is_err());
    }

    #[test]
    fn predict_by_name() {
        let params: Parameters = [("b", 1.0), ("x_0", 2.0), ("x_k", 3.0)].into_iter().collect();
        let args = Arguments::new().arg(10).named("k", 100);
        let y = CurveRegistry::default().predict("Linear", &params, &args).unwrap();
        assert!((y - 321.0).abs() < 1e-12);

        let err = CurveRegistry::default().predict("Cubic", &params, &args).unwrap_err();
        assert!(matches!(err, Error::UnknownCurveType { .. }));
    }
}
