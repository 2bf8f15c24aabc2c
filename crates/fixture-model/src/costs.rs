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

//! The cost tensor of a tournament instance.
//!
//! `cost(i, j, r)` is the carry-over cost of letting teams `i` and `j` meet in
//! round `r`. The tensor is stored flattened as `r * n * n + i * n + j` with
//! both orderings of every pair present, so lookups never have to sort.

use crate::{
    error::ModelError,
    index::{RoundIndex, TeamIndex},
    matchup::{num_matches, Match},
    validate_num_teams,
};

#[inline(always)]
fn flatten_index(num_teams: usize, i: usize, j: usize, round: usize) -> usize {
    round * num_teams * num_teams + i * num_teams + j
}

// Only called with a validated team count, which keeps the product small.
#[inline]
fn tensor_len(num_teams: usize) -> usize {
    num_teams * num_teams * num_teams.saturating_sub(1)
}

/// The immutable, validated carry-over cost tensor.
///
/// Invariants, established by `CostTensorBuilder::build` and
/// `CostTensor::from_dense`:
/// - `num_teams` is positive and even;
/// - `cost(i, j, r) == cost(j, i, r)` for all `i`, `j`, `r`;
/// - `cost(i, i, r) == 0` for all `i`, `r`;
/// - every entry is finite.
#[derive(Clone, Debug, PartialEq)]
pub struct CostTensor {
    num_teams: usize,
    values: Vec<f64>, // len = num_teams * num_teams * num_rounds
}

impl CostTensor {
    /// Creates an all-zero tensor for `num_teams` teams.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NoTeams`, `ModelError::OddTeamCount`, or
    /// `ModelError::TooManyTeams`.
    pub fn zeros(num_teams: usize) -> Result<Self, ModelError> {
        validate_num_teams(num_teams)?;
        Ok(Self {
            num_teams,
            values: vec![0.0; tensor_len(num_teams)],
        })
    }

    /// Wraps a dense buffer laid out as `r * n * n + i * n + j`.
    ///
    /// # Errors
    ///
    /// Fails if the team count is odd or zero, if the buffer does not have
    /// exactly `n * n * (n - 1)` entries, or if it is asymmetric, has a
    /// non-zero diagonal, or contains a non-finite value.
    pub fn from_dense(num_teams: usize, values: Vec<f64>) -> Result<Self, ModelError> {
        validate_num_teams(num_teams)?;
        let expected = tensor_len(num_teams);
        if values.len() != expected {
            return Err(ModelError::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }

        let n = num_teams;
        for round in 0..n - 1 {
            for i in 0..n {
                let diagonal = values[flatten_index(n, i, i, round)];
                if diagonal != 0.0 {
                    return Err(ModelError::NonZeroDiagonal {
                        team: i,
                        round,
                        value: diagonal,
                    });
                }
                for j in (i + 1)..n {
                    let forward = values[flatten_index(n, i, j, round)];
                    let backward = values[flatten_index(n, j, i, round)];
                    if !forward.is_finite() || !backward.is_finite() {
                        return Err(ModelError::NonFinite {
                            i,
                            j,
                            round,
                            value: if forward.is_finite() { backward } else { forward },
                        });
                    }
                    if forward != backward {
                        return Err(ModelError::Asymmetric {
                            i,
                            j,
                            round,
                            forward,
                            backward,
                        });
                    }
                }
            }
        }

        Ok(Self { num_teams, values })
    }

    /// Returns the number of teams.
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    /// Returns the number of rounds, `num_teams - 1`.
    #[inline]
    pub fn num_rounds(&self) -> usize {
        self.num_teams - 1
    }

    /// Returns the number of unordered team pairs, `n (n - 1) / 2`.
    #[inline]
    pub fn num_matches(&self) -> usize {
        num_matches(self.num_teams)
    }

    /// Returns `cost(i, j, round)`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[inline]
    pub fn cost(&self, i: TeamIndex, j: TeamIndex, round: RoundIndex) -> f64 {
        debug_assert!(
            i.get() < self.num_teams && j.get() < self.num_teams,
            "called `CostTensor::cost` with team out of bounds: the team count is {} but the teams are {} and {}",
            self.num_teams,
            i.get(),
            j.get()
        );
        debug_assert!(
            round.get() < self.num_rounds(),
            "called `CostTensor::cost` with round out of bounds: the round count is {} but the round is {}",
            self.num_rounds(),
            round.get()
        );

        self.values[flatten_index(self.num_teams, i.get(), j.get(), round.get())]
    }

    /// Returns the cost of playing `m` in `round`.
    #[inline]
    pub fn match_cost(&self, m: Match, round: RoundIndex) -> f64 {
        self.cost(m.first(), m.second(), round)
    }

    /// Returns the number of `(pair, round)` cells with a non-zero cost.
    ///
    /// Each unordered pair is counted once per round.
    pub fn nonzero_count(&self) -> usize {
        self.cells().filter(|&(_, _, c)| c != 0.0).count()
    }

    /// Returns the sum of the costs of all `(pair, round)` cells.
    pub fn total(&self) -> f64 {
        self.cells().map(|(_, _, c)| c).sum()
    }

    /// Iterates over all `(match, round, cost)` cells, rounds outermost.
    pub fn cells(&self) -> impl Iterator<Item = (Match, RoundIndex, f64)> + '_ {
        let matches = Match::all(self.num_teams);
        RoundIndex::range(self.num_rounds()).flat_map(move |round| {
            matches
                .clone()
                .into_iter()
                .map(move |m| (m, round, self.match_cost(m, round)))
        })
    }

    /// Returns the raw flattened buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Mutable builder for a `CostTensor`.
///
/// Every write sets both orderings of the pair, so a built tensor is
/// symmetric by construction.
#[derive(Clone, Debug)]
pub struct CostTensorBuilder {
    num_teams: usize,
    values: Vec<f64>,
}

impl CostTensorBuilder {
    /// Creates a builder with all costs zero.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NoTeams`, `ModelError::OddTeamCount`, or
    /// `ModelError::TooManyTeams`.
    pub fn new(num_teams: usize) -> Result<Self, ModelError> {
        validate_num_teams(num_teams)?;
        Ok(Self {
            num_teams,
            values: vec![0.0; tensor_len(num_teams)],
        })
    }

    /// Returns the number of teams.
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    /// Sets `cost(i, j, round)` and `cost(j, i, round)` to `cost`.
    ///
    /// # Errors
    ///
    /// Fails if a team or the round is out of range, if `i == j`, or if `cost`
    /// is not finite.
    pub fn set_cost(
        &mut self,
        i: usize,
        j: usize,
        round: usize,
        cost: f64,
    ) -> Result<&mut Self, ModelError> {
        let n = self.num_teams;
        for team in [i, j] {
            if team >= n {
                return Err(ModelError::TeamOutOfRange { team, num_teams: n });
            }
        }
        if round >= n - 1 {
            return Err(ModelError::RoundOutOfRange {
                round,
                num_rounds: n - 1,
            });
        }
        if i == j {
            return Err(ModelError::SelfMatch(i));
        }
        if !cost.is_finite() {
            return Err(ModelError::NonFinite {
                i,
                j,
                round,
                value: cost,
            });
        }

        self.values[flatten_index(n, i, j, round)] = cost;
        self.values[flatten_index(n, j, i, round)] = cost;
        Ok(self)
    }

    /// Sets the cost of `m` in `round`.
    ///
    /// # Errors
    ///
    /// Fails if `m` or `round` is out of range, or if `cost` is not finite.
    #[inline]
    pub fn set_match_cost(
        &mut self,
        m: Match,
        round: RoundIndex,
        cost: f64,
    ) -> Result<&mut Self, ModelError> {
        self.set_cost(m.first().get(), m.second().get(), round.get(), cost)
    }

    /// Returns the cost currently stored for `(i, j, round)`, if in range.
    #[inline]
    pub fn get(&self, i: usize, j: usize, round: usize) -> Option<f64> {
        let n = self.num_teams;
        if i < n && j < n && round < n - 1 {
            Some(self.values[flatten_index(n, i, j, round)])
        } else {
            None
        }
    }

    /// Builds the immutable tensor.
    #[inline]
    pub fn build(self) -> CostTensor {
        CostTensor {
            num_teams: self.num_teams,
            values: self.values,
        }
    }
}

/// A named tournament instance: the unit a solve consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct TournamentInstance {
    name: String,
    costs: CostTensor,
}

impl TournamentInstance {
    /// Creates a new instance.
    #[inline]
    pub fn new(name: impl Into<String>, costs: CostTensor) -> Self {
        Self {
            name: name.into(),
            costs,
        }
    }

    /// Returns the instance name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cost tensor.
    #[inline]
    pub fn costs(&self) -> &CostTensor {
        &self.costs
    }

    /// Returns the number of teams.
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.costs.num_teams()
    }

    /// Returns the number of rounds.
    #[inline]
    pub fn num_rounds(&self) -> usize {
        self.costs.num_rounds()
    }
}

impl std::fmt::Display for TournamentInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} teams, {} rounds, {} non-zero cells)",
            self.name,
            self.num_teams(),
            self.num_rounds(),
            self.costs.nonzero_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ti(i: usize) -> TeamIndex {
        TeamIndex::new(i)
    }

    fn ri(r: usize) -> RoundIndex {
        RoundIndex::new(r)
    }

    #[test]
    fn test_zeros_has_expected_shape() {
        let costs = CostTensor::zeros(6).unwrap();
        assert_eq!(costs.num_teams(), 6);
        assert_eq!(costs.num_rounds(), 5);
        assert_eq!(costs.num_matches(), 15);
        assert_eq!(costs.as_slice().len(), 6 * 6 * 5);
        assert_eq!(costs.nonzero_count(), 0);
    }

    #[test]
    fn test_zeros_rejects_odd_team_count() {
        assert_eq!(CostTensor::zeros(5), Err(ModelError::OddTeamCount(5)));
        assert_eq!(CostTensor::zeros(0), Err(ModelError::NoTeams));
    }

    #[test]
    fn test_builder_writes_both_orderings() {
        let mut builder = CostTensorBuilder::new(4).unwrap();
        builder.set_cost(3, 1, 2, 2.5).unwrap();
        let costs = builder.build();

        assert_eq!(costs.cost(ti(1), ti(3), ri(2)), 2.5);
        assert_eq!(costs.cost(ti(3), ti(1), ri(2)), 2.5);
        assert_eq!(costs.cost(ti(1), ti(3), ri(1)), 0.0);
        assert_eq!(costs.match_cost(Match::new(1, 3).unwrap(), ri(2)), 2.5);
        assert_eq!(costs.nonzero_count(), 1);
        assert_eq!(costs.total(), 2.5);
    }

    #[test]
    fn test_builder_rejects_bad_arguments() {
        let mut builder = CostTensorBuilder::new(4).unwrap();
        assert_eq!(
            builder.set_cost(4, 0, 0, 1.0).err(),
            Some(ModelError::TeamOutOfRange { team: 4, num_teams: 4 })
        );
        assert_eq!(
            builder.set_cost(0, 1, 3, 1.0).err(),
            Some(ModelError::RoundOutOfRange { round: 3, num_rounds: 3 })
        );
        assert_eq!(builder.set_cost(2, 2, 0, 1.0).err(), Some(ModelError::SelfMatch(2)));
        assert!(matches!(
            builder.set_cost(0, 1, 0, f64::NAN).err(),
            Some(ModelError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_set_match_cost_keeps_entries_finite() {
        let mut builder = CostTensorBuilder::new(4).unwrap();
        let m = Match::new(0, 3).unwrap();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                builder.set_match_cost(m, ri(1), bad).err(),
                Some(ModelError::NonFinite { i: 0, j: 3, round: 1, .. })
            ));
        }
        assert_eq!(
            builder.set_match_cost(m, ri(3), 1.0).err(),
            Some(ModelError::RoundOutOfRange { round: 3, num_rounds: 3 })
        );

        builder.set_match_cost(m, ri(1), 4.0).unwrap();
        let costs = builder.build();
        assert_eq!(costs.cost(ti(3), ti(0), ri(1)), 4.0);
        assert!(costs.as_slice().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_rejects_too_many_teams() {
        let too_many = crate::MAX_TEAMS + 2;
        let expected = ModelError::TooManyTeams {
            num_teams: too_many,
            max: crate::MAX_TEAMS,
        };
        assert_eq!(CostTensorBuilder::new(too_many).err(), Some(expected.clone()));
        assert_eq!(CostTensor::zeros(too_many).err(), Some(expected.clone()));
        assert_eq!(CostTensor::from_dense(usize::MAX - 1, Vec::new()).err(), Some(
            ModelError::TooManyTeams {
                num_teams: usize::MAX - 1,
                max: crate::MAX_TEAMS,
            }
        ));
    }

    #[test]
    fn test_from_dense_validates_shape() {
        let err = CostTensor::from_dense(4, vec![0.0; 10]).unwrap_err();
        assert_eq!(err, ModelError::ShapeMismatch { expected: 48, actual: 10 });
    }

    #[test]
    fn test_from_dense_rejects_asymmetry() {
        let n = 4;
        let mut values = vec![0.0; n * n * (n - 1)];
        values[flatten_index(n, 0, 2, 1)] = 1.0;
        let err = CostTensor::from_dense(n, values).unwrap_err();
        assert!(matches!(err, ModelError::Asymmetric { i: 0, j: 2, round: 1, .. }));
    }

    #[test]
    fn test_from_dense_rejects_diagonal() {
        let n = 4;
        let mut values = vec![0.0; n * n * (n - 1)];
        values[flatten_index(n, 3, 3, 0)] = 1.0;
        let err = CostTensor::from_dense(n, values).unwrap_err();
        assert_eq!(
            err,
            ModelError::NonZeroDiagonal { team: 3, round: 0, value: 1.0 }
        );
    }

    #[test]
    fn test_from_dense_round_trips_builder_output() {
        let mut builder = CostTensorBuilder::new(6).unwrap();
        builder.set_cost(0, 5, 4, 1.0).unwrap();
        builder.set_cost(2, 3, 0, 3.0).unwrap();
        let built = builder.build();
        let dense = CostTensor::from_dense(6, built.as_slice().to_vec()).unwrap();
        assert_eq!(built, dense);
    }

    #[test]
    fn test_cells_enumerate_every_pair_and_round() {
        let costs = CostTensor::zeros(4).unwrap();
        let cells: Vec<_> = costs.cells().collect();
        assert_eq!(cells.len(), 6 * 3);
        assert_eq!(cells[0].0, Match::new(0, 1).unwrap());
        assert_eq!(cells[0].1, ri(0));
        assert_eq!(cells[6].1, ri(1));
    }

    #[test]
    fn test_instance_display() {
        let mut builder = CostTensorBuilder::new(4).unwrap();
        builder.set_cost(0, 1, 0, 1.0).unwrap();
        let instance = TournamentInstance::new("tiny", builder.build());
        assert_eq!(instance.num_teams(), 4);
        assert_eq!(
            format!("{}", instance),
            "tiny (4 teams, 3 rounds, 1 non-zero cells)"
        );
    }
}
