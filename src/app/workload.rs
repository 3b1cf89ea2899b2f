//! Built-in workloads with known growth rates, used to exercise the fitter.

use std::hint::black_box;

use clap::ValueEnum;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Searches per `lookup` call; enough to make the log term visible.
const LOOKUPS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Workload {
    /// Sum a vector (linear).
    Sum,
    /// Sort a copy of a vector (n log n).
    Sort,
    /// Compare every pair of elements (quadratic).
    Pairs,
    /// Binary searches in a sorted vector (logarithmic).
    Lookup,
}

impl Workload {
    pub fn name(self) -> &'static str {
        match self {
            Workload::Sum => "sum",
            Workload::Sort => "sort",
            Workload::Pairs => "pairs",
            Workload::Lookup => "lookup",
        }
    }

    /// Input data for size `n`; identical for identical `(seed, n)`.
    pub fn input(self, n: u64, seed: u64) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(seed ^ n.rotate_left(17));
        let mut data: Vec<u64> = (0..n).map(|_| rng.gen_range(0..1_000_000)).collect();
        if self == Workload::Lookup {
            data.sort_unstable();
        }
        data
    }

    /// Run the workload once over `data`.
    pub fn execute(self, data: &[u64]) -> u64 {
        match self {
            Workload::Sum => data.iter().copied().fold(0u64, u64::wrapping_add),
            Workload::Sort => {
                let mut copy = data.to_vec();
                copy.sort_unstable();
                copy.first().copied().unwrap_or(0)
            }
            Workload::Pairs => {
                let mut count = 0u64;
                for (i, a) in data.iter().enumerate() {
                    for b in &data[i + 1..] {
                        if (a ^ b) & 1 == 0 {
                            count += 1;
                        }
                    }
                }
                count
            }
            Workload::Lookup => {
                let Some(&max) = data.last() else {
                    return 0;
                };
                let step = (max / LOOKUPS as u64).max(1);
                (0..LOOKUPS as u64)
                    .filter(|k| data.binary_search(&black_box(k * step)).is_ok())
                    .count() as u64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_reproducible() {
        assert_eq!(Workload::Sum.input(50, 7), Workload::Sum.input(50, 7));
        assert_ne!(Workload::Sum.input(50, 7), Workload::Sum.input(50, 8));
        assert_eq!(Workload::Sum.input(0, 7).len(), 0);
    }

    #[test]
    fn lookup_input_is_sorted() {
        let data = Workload::Lookup.input(200, 1);
        assert!(data.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn workloads_compute_expected_results() {
        let data = [3, 1, 2, 4];
        assert_eq!(Workload::Sum.execute(&data), 10);
        assert_eq!(Workload::Sort.execute(&data), 1);
        // Same-parity pairs: (3,1), (2,4).
        assert_eq!(Workload::Pairs.execute(&data), 2);
        assert_eq!(Workload::Lookup.execute(&[]), 0);
    }
}
