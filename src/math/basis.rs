//! Second-degree polynomial basis expansion.
//!
//! For a feature vector `x = (x_0, …, x_{n-1})` the canonical generation order
//! is:
//!
//! - the constant term `1`
//! - every linear term `x_i`
//! - every product `x_i · x_j` with `i <= j` (squares included), row by row
//!
//! The constant term is carried by the intercept, so the helpers below only
//! produce the non-constant terms.

/// Number of non-constant terms for `n` features.
pub fn quadratic_term_count(n: usize) -> usize {
    n + n * (n + 1) / 2
}

/// Recover the feature count from a non-constant term count.
pub fn features_for_term_count(terms: usize) -> Option<usize> {
    (0..=terms).find(|&n| quadratic_term_count(n) == terms)
}

/// Expand `x` into the non-constant degree-2 terms.
pub fn quadratic_terms(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut out = Vec::with_capacity(quadratic_term_count(n));
    out.extend_from_slice(x);
    for i in 0..n {
        for j in i..n {
            out.push(x[i] * x[j]);
        }
    }
    out
}

/// Names for the terms produced by [`quadratic_terms`], given feature names.
pub fn quadratic_term_names(names: &[String]) -> Vec<String> {
    let n = names.len();
    let mut out = Vec::with_capacity(quadratic_term_count(n));
    out.extend(names.iter().cloned());
    for i in 0..n {
        for j in i..n {
            if i == j {
                out.push(format!("{}^2", names[i]));
            } else {
                out.push(format!("{}*{}", names[i], names[j]));
            }
        }
    }
    out
}
