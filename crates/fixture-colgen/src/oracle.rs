// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Matching Oracles
//!
//! The pricing subproblem of one round is a maximum-weight perfect matching
//! on the complete graph of teams. A `MatchingOracle` returns a matching of
//! maximum cardinality and, among those, of maximum total weight.
//!
//! ## Implementations
//!
//! * **`BlossomOracle`**: Edmonds' blossom algorithm from the `mwmatching`
//!   crate, `O(n^3)` per call. The crate works on `i32` weights, so the `f64`
//!   weights are shifted to be positive and scaled by `2^28 / (max w - min w)`
//!   before rounding. Shifting every edge by the same amount does not change
//!   which matching of maximum cardinality is heaviest. Each weight is off by
//!   at most `(max w - min w) / 2^29` after rounding; a warning is logged when
//!   that error summed over `n / 2` pairs reaches the pricing tolerance.
//! * **`ExhaustiveOracle`**: Enumerates every matching. Only usable for tiny
//!   instances and meant for cross-checking the blossom oracle.

use fixedbitset::FixedBitSet;
use fixture_core::num::EPSILON;
use fixture_model::matchup::Match;
use log::warn;
use mwmatching::{Edges, Matching, SENTINEL};

/// Computes maximum-cardinality, maximum-weight matchings.
pub trait MatchingOracle {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Returns a matching of maximum cardinality on `num_teams` vertices
    /// whose edges are `edges`, with maximum total weight among those.
    ///
    /// Vertices without an incident edge stay unmatched. The returned pairs
    /// are disjoint; their order is unspecified.
    fn max_weight_matching(&mut self, num_teams: usize, edges: &[(Match, f64)]) -> Vec<Match>;
}

impl<O> MatchingOracle for Box<O>
where
    O: MatchingOracle + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn max_weight_matching(&mut self, num_teams: usize, edges: &[(Match, f64)]) -> Vec<Match> {
        (**self).max_weight_matching(num_teams, edges)
    }
}

/// Upper bound on a scaled weight, leaving headroom for the dual variables
/// of the blossom algorithm inside `i32`.
pub const MAX_SCALED_WEIGHT: f64 = (1u32 << 28) as f64;

/// A `MatchingOracle` backed by the blossom algorithm of `mwmatching`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlossomOracle;

impl BlossomOracle {
    /// Creates a new blossom oracle.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Returns the largest error rounding can add to the weight of a matching
    /// of `num_teams / 2` pairs over `edges`.
    pub fn rounding_error_bound(num_teams: usize, edges: &[(Match, f64)]) -> f64 {
        let (lo, hi) = Self::weight_range(edges);
        if hi > lo {
            (num_teams / 2) as f64 * (hi - lo) / (2.0 * MAX_SCALED_WEIGHT)
        } else {
            0.0
        }
    }

    fn weight_range(edges: &[(Match, f64)]) -> (f64, f64) {
        edges
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, w)| {
                (lo.min(w), hi.max(w))
            })
    }

    fn scaled_edges(edges: &[(Match, f64)]) -> Edges {
        let (lo, hi) = Self::weight_range(edges);
        let range = hi - lo;
        // A uniform graph maps every edge to weight 1.
        let scale = if range > 0.0 {
            MAX_SCALED_WEIGHT / range
        } else {
            0.0
        };

        edges
            .iter()
            .map(|&(m, w)| {
                let scaled = ((w - lo) * scale).round() as i32 + 1;
                (m.first().get(), m.second().get(), scaled)
            })
            .collect()
    }
}

impl MatchingOracle for BlossomOracle {
    fn name(&self) -> &str {
        "BlossomOracle"
    }

    fn max_weight_matching(&mut self, num_teams: usize, edges: &[(Match, f64)]) -> Vec<Match> {
        debug_assert!(
            edges.iter().all(|(m, _)| m.second().get() < num_teams),
            "called `BlossomOracle::max_weight_matching` with an edge outside the {} vertices",
            num_teams
        );
        if edges.is_empty() {
            return Vec::new();
        }
        let bound = Self::rounding_error_bound(num_teams, edges);
        if bound >= EPSILON {
            warn!(
                "blossom weight rounding may misjudge a matching by up to {:e}",
                bound
            );
        }

        let mate = Matching::new(Self::scaled_edges(edges))
            .max_cardinality()
            .solve();

        mate.iter()
            .enumerate()
            .filter(|&(v, &u)| u != SENTINEL && v < u)
            .filter_map(|(v, &u)| Match::new(v, u).ok())
            .collect()
    }
}

/// A `MatchingOracle` that enumerates every matching.
///
/// # Panics
///
/// `max_weight_matching` panics for more than `ExhaustiveOracle::MAX_TEAMS` vertices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveOracle;

impl ExhaustiveOracle {
    /// The largest vertex count the oracle accepts.
    pub const MAX_TEAMS: usize = 12;

    /// Creates a new exhaustive oracle.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

struct Enumeration {
    num_teams: usize,
    weights: Vec<Option<f64>>, // num_teams x num_teams, row major
    used: FixedBitSet,
    current: Vec<Match>,
    best: Vec<Match>,
    best_weight: f64,
}

impl Enumeration {
    fn search(&mut self, weight: f64) {
        let Some(v) = (0..self.num_teams).find(|&v| !self.used.contains(v)) else {
            let better = self.current.len() > self.best.len()
                || (self.current.len() == self.best.len() && weight > self.best_weight);
            if better {
                self.best.clone_from(&self.current);
                self.best_weight = weight;
            }
            return;
        };

        self.used.insert(v);
        for u in (v + 1)..self.num_teams {
            if self.used.contains(u) {
                continue;
            }
            let Some(w) = self.weights[v * self.num_teams + u] else {
                continue;
            };
            if let Ok(m) = Match::new(v, u) {
                self.used.insert(u);
                self.current.push(m);
                self.search(weight + w);
                self.current.pop();
                self.used.set(u, false);
            }
        }
        // v stays unmatched.
        self.search(weight);
        self.used.set(v, false);
    }
}

impl MatchingOracle for ExhaustiveOracle {
    fn name(&self) -> &str {
        "ExhaustiveOracle"
    }

    fn max_weight_matching(&mut self, num_teams: usize, edges: &[(Match, f64)]) -> Vec<Match> {
        assert!(
            num_teams <= Self::MAX_TEAMS,
            "called `ExhaustiveOracle::max_weight_matching` with {} vertices, at most {} are supported",
            num_teams,
            Self::MAX_TEAMS
        );

        let mut weights = vec![None; num_teams * num_teams];
        for &(m, w) in edges {
            weights[m.first().get() * num_teams + m.second().get()] = Some(w);
        }

        let mut enumeration = Enumeration {
            num_teams,
            weights,
            used: FixedBitSet::with_capacity(num_teams),
            current: Vec::with_capacity(num_teams / 2),
            best: Vec::new(),
            best_weight: f64::NEG_INFINITY,
        };
        enumeration.search(0.0);
        enumeration.best
    }
}

/// Returns the total weight of `matching` under `edges`, or `None` if it uses
/// a pair that is not an edge.
pub fn matching_weight(edges: &[(Match, f64)], matching: &[Match]) -> Option<f64> {
    matching
        .iter()
        .map(|m| edges.iter().find(|(e, _)| e == m).map(|&(_, w)| w))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(n: usize, weight: impl Fn(usize, usize) -> f64) -> Vec<(Match, f64)> {
        Match::all(n)
            .into_iter()
            .map(|m| (m, weight(m.first().get(), m.second().get())))
            .collect()
    }

    fn is_perfect(n: usize, matching: &[Match]) -> bool {
        let mut seen = FixedBitSet::with_capacity(n);
        for m in matching {
            if seen.put(m.first().get()) || seen.put(m.second().get()) {
                return false;
            }
        }
        seen.count_ones(..) == n
    }

    #[test]
    fn test_blossom_finds_heaviest_pairing_of_four() {
        let edges = complete(4, |i, j| match (i, j) {
            (0, 1) | (2, 3) => 1.0,
            _ => 0.0,
        });
        let mut matching = BlossomOracle::new().max_weight_matching(4, &edges);
        matching.sort();
        assert_eq!(
            matching,
            vec![Match::new(0, 1).unwrap(), Match::new(2, 3).unwrap()]
        );
    }

    #[test]
    fn test_blossom_prefers_cardinality_over_weight() {
        // The single heavy edge (1,2) would leave 0 and 3 unmatched.
        let edges = complete(4, |i, j| if (i, j) == (1, 2) { 10.0 } else { -1.0 });
        let matching = BlossomOracle::new().max_weight_matching(4, &edges);
        assert!(is_perfect(4, &matching));
    }

    #[test]
    fn test_blossom_handles_uniform_and_empty_graphs() {
        let edges = complete(6, |_, _| 0.0);
        assert!(is_perfect(6, &BlossomOracle::new().max_weight_matching(6, &edges)));
        assert!(BlossomOracle::new().max_weight_matching(6, &[]).is_empty());
    }

    #[test]
    fn test_exhaustive_matches_blossom_value() {
        for n in [2usize, 4, 6, 8] {
            for seed in 0..6u64 {
                // Cheap deterministic weights in [-2, 2].
                let edges = complete(n, |i, j| {
                    let h = (i as u64 * 31 + j as u64 * 17 + seed * 101) % 41;
                    h as f64 / 10.0 - 2.0
                });
                let exact = ExhaustiveOracle::new().max_weight_matching(n, &edges);
                let blossom = BlossomOracle::new().max_weight_matching(n, &edges);

                assert!(is_perfect(n, &exact));
                assert!(is_perfect(n, &blossom));
                let exact_weight = matching_weight(&edges, &exact).unwrap();
                let blossom_weight = matching_weight(&edges, &blossom).unwrap();
                assert!(
                    (exact_weight - blossom_weight).abs() < 1e-4,
                    "n = {}, seed = {}: exhaustive {} vs blossom {}",
                    n,
                    seed,
                    exact_weight,
                    blossom_weight
                );
            }
        }
    }

    #[test]
    fn test_oracles_agree_on_weights_below_tolerance() {
        for n in [4usize, 6, 8, 10] {
            for seed in 0..6u64 {
                // Weights around 0.5 that differ only in the seventh decimal.
                let edges = complete(n, |i, j| {
                    let h = (i as u64 * 37 + j as u64 * 11 + seed * 53) % 29;
                    0.5 + h as f64 * 1e-7
                });
                let exact = ExhaustiveOracle::new().max_weight_matching(n, &edges);
                let blossom = BlossomOracle::new().max_weight_matching(n, &edges);

                assert!(is_perfect(n, &blossom));
                let exact_weight = matching_weight(&edges, &exact).unwrap();
                let blossom_weight = matching_weight(&edges, &blossom).unwrap();
                assert!(
                    (exact_weight - blossom_weight).abs() < 1e-9,
                    "n = {}, seed = {}: exhaustive {} vs blossom {}",
                    n,
                    seed,
                    exact_weight,
                    blossom_weight
                );
            }
        }
    }

    #[test]
    fn test_rounding_error_bound_scales_with_range() {
        let narrow = complete(40, |i, j| if j == i + 1 { 0.5 } else { 0.0 });
        let bound = BlossomOracle::rounding_error_bound(40, &narrow);
        assert!(bound > 0.0 && bound < 1e-7, "bound = {}", bound);

        let wide = complete(40, |i, _| i as f64 * 1e3);
        assert!(BlossomOracle::rounding_error_bound(40, &wide) >= EPSILON);

        let uniform = complete(6, |_, _| 2.0);
        assert_eq!(BlossomOracle::rounding_error_bound(6, &uniform), 0.0);
    }

    #[test]
    fn test_oracles_agree_on_incomplete_graph() {
        // Only (0,1) and (0,2) remain; at most one pair can be matched.
        let edges = vec![
            (Match::new(0, 1).unwrap(), 1.0),
            (Match::new(0, 2).unwrap(), 3.0),
        ];
        let exact = ExhaustiveOracle::new().max_weight_matching(4, &edges);
        let blossom = BlossomOracle::new().max_weight_matching(4, &edges);
        assert_eq!(exact, vec![Match::new(0, 2).unwrap()]);
        assert_eq!(blossom, exact);
    }

    #[test]
    fn test_matching_weight_rejects_non_edges() {
        let edges = vec![(Match::new(0, 1).unwrap(), 1.5)];
        assert_eq!(matching_weight(&edges, &[Match::new(0, 1).unwrap()]), Some(1.5));
        assert_eq!(matching_weight(&edges, &[Match::new(2, 3).unwrap()]), None);
    }

    #[test]
    #[should_panic]
    fn test_exhaustive_rejects_large_graphs() {
        ExhaustiveOracle::new().max_weight_matching(14, &[]);
    }
}
