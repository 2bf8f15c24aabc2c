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

//! # The Pricing Engine
//!
//! `PricingEngine` generates the matching columns of the restricted master
//! problem. It is a passive state object: the caller solves the relaxation,
//! then calls `price_columns` with the master and the kind of dual
//! information the relaxation produced.
//!
//! ## Algorithm
//!
//! Each call reads `u_r` for every convexity constraint and `v_ij` for every
//! covering constraint, then solves one subproblem per round:
//!
//! ```raw
//! reduced cost:  max  u_r + sum_{ {i,j} in M } (v_ij - cost(i, j, r))
//! farkas:        max  u_r + sum_{ {i,j} in M } v_ij
//! ```
//!
//! over all perfect matchings `M` of the teams, which is a maximum-weight
//! perfect matching on the complete graph. A matching whose value is
//! positive (reduced cost) or non-negative (Farkas) is registered as a new
//! column with coefficient `1.0` in the round's convexity constraint and in
//! the covering constraint of each of its pairs.
//!
//! A call that adds no column is a proof: the relaxation is optimal
//! (reduced cost) or the master is infeasible (Farkas).
//!
//! ## Cancellation
//!
//! The `CancellationToken` is checked before each round. A round that has
//! started always finishes, so the master never sees half a column.

use crate::{
    cancel::CancellationToken,
    column::{ColumnError, ColumnIdGenerator, RoundMatching},
    duals::DualValues,
    master::{MasterError, MasterLayout, MasterProblem, PricingMode},
    oracle::MatchingOracle,
    stats::PricingStatistics,
};
use fixture_core::num::is_positive;
use fixture_model::{
    costs::CostTensor, index::RoundIndex, matchup::Match, validate_num_teams, ModelError,
};
use log::{debug, trace};
use rustc_hash::FxHashSet;
use std::time::Instant;
use thiserror::Error;

/// Errors that end a pricing call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// The engine was built from inconsistent or invalid data.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ModelError),
    /// A matching returned by the oracle is not a valid column.
    #[error("invalid column: {0}")]
    Column(#[from] ColumnError),
    /// The master rejected a column.
    #[error("master problem error: {0}")]
    Master(#[from] MasterError),
    /// The oracle returned a non-perfect matching on the complete graph.
    #[error(
        "round {round}: oracle returned {found} pair(s), expected a perfect matching of {expected}"
    )]
    ImperfectMatching {
        round: usize,
        found: usize,
        expected: usize,
    },
}

/// The result of one `price_columns` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PricingOutcome {
    /// Number of columns registered with the master.
    pub columns_added: usize,
    /// Number of round subproblems solved.
    pub rounds_priced: usize,
    /// `true` if cancellation stopped the call before the last round.
    pub cancelled: bool,
}

impl PricingOutcome {
    /// Returns `true` if every round was priced and none produced a column.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.columns_added == 0 && !self.cancelled
    }
}

impl std::fmt::Display for PricingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} column(s) from {} round(s){}",
            self.columns_added,
            self.rounds_priced,
            if self.cancelled { ", cancelled" } else { "" }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundResult {
    Added,
    Rejected,
    Duplicate,
    NoPairing,
}

/// Generates matching columns for one master problem.
#[derive(Debug)]
pub struct PricingEngine<O> {
    layout: MasterLayout,
    costs: CostTensor,
    matches: Vec<Match>, // dense match order
    oracle: O,
    columns: Vec<Vec<RoundMatching>>, // per round, append only
    ids: ColumnIdGenerator,
    iteration: u64,
    cancellation: CancellationToken,
    generated: Option<Vec<FxHashSet<Vec<Match>>>>, // per round, sorted pairs
    edges: Vec<(Match, f64)>,
    stats: PricingStatistics,
}

impl<O> PricingEngine<O>
where
    O: MatchingOracle,
{
    /// Creates an engine for a master whose constraints are `layout`.
    ///
    /// # Errors
    ///
    /// Fails with `PricingError::InvalidArgument` if the team count is odd or
    /// zero, or if `costs` does not have the shape of `layout`.
    pub fn new(costs: CostTensor, layout: MasterLayout, oracle: O) -> Result<Self, PricingError> {
        let num_teams = layout.num_teams();
        validate_num_teams(num_teams)?;
        if costs.num_teams() != num_teams {
            return Err(PricingError::InvalidArgument(ModelError::ShapeMismatch {
                expected: num_teams * num_teams * (num_teams - 1),
                actual: costs.as_slice().len(),
            }));
        }

        let num_rounds = layout.num_rounds();
        Ok(Self {
            matches: Match::all(num_teams),
            columns: vec![Vec::new(); num_rounds],
            edges: Vec::with_capacity(layout.num_matches()),
            layout,
            costs,
            oracle,
            ids: ColumnIdGenerator::new(),
            iteration: 0,
            cancellation: CancellationToken::new(),
            generated: None,
            stats: PricingStatistics::default(),
        })
    }

    /// Installs the master layout of `costs` on `master` and creates an engine for it.
    ///
    /// # Errors
    ///
    /// Fails with `PricingError::InvalidArgument` before touching `master` if
    /// the team count is odd or zero.
    pub fn install<M>(master: &mut M, costs: CostTensor, oracle: O) -> Result<Self, PricingError>
    where
        M: MasterProblem + ?Sized,
    {
        let layout = MasterLayout::install(master, costs.num_teams())?;
        Self::new(costs, layout, oracle)
    }

    /// Enables or disables per-round suppression of repeated matchings.
    #[inline]
    pub fn with_deduplication(mut self, yes: bool) -> Self {
        self.generated = if yes {
            Some(vec![FxHashSet::default(); self.layout.num_rounds()])
        } else {
            None
        };
        self
    }

    /// Sets the token that stops pricing between rounds.
    #[inline]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Returns the master layout.
    #[inline]
    pub fn layout(&self) -> &MasterLayout {
        &self.layout
    }

    /// Returns the cost tensor.
    #[inline]
    pub fn costs(&self) -> &CostTensor {
        &self.costs
    }

    /// Returns the oracle.
    #[inline]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Returns the columns generated for `round`, oldest first.
    #[inline]
    pub fn columns(&self, round: RoundIndex) -> &[RoundMatching] {
        &self.columns[round.get()]
    }

    /// Iterates over every generated column, round by round.
    #[inline]
    pub fn all_columns(&self) -> impl Iterator<Item = &RoundMatching> {
        self.columns.iter().flatten()
    }

    /// Returns the number of generated columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Returns the number of `price_columns` calls made so far.
    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Returns `true` if repeated matchings are suppressed.
    #[inline]
    pub fn is_deduplicating(&self) -> bool {
        self.generated.is_some()
    }

    /// Returns the cancellation token.
    #[inline]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns the counters collected so far.
    #[inline]
    pub fn statistics(&self) -> &PricingStatistics {
        &self.stats
    }

    /// Solves the pricing subproblem of every round and registers each
    /// improving matching as a new column of `master`.
    ///
    /// # Errors
    ///
    /// Fails if the oracle returns an invalid matching or `master` rejects a
    /// column. Columns registered before the error stay registered.
    pub fn price_columns<M>(
        &mut self,
        master: &mut M,
        mode: PricingMode,
    ) -> Result<PricingOutcome, PricingError>
    where
        M: MasterProblem + ?Sized,
    {
        let start = Instant::now();
        self.iteration += 1;
        match mode {
            PricingMode::ReducedCost => self.stats.reduced_cost_calls += 1,
            PricingMode::Farkas => self.stats.farkas_calls += 1,
        }

        let duals = DualValues::read(master, &self.layout, mode);
        let mut outcome = PricingOutcome::default();
        let result = self.price_rounds(master, &duals, &mut outcome);
        self.stats.pricing_duration += start.elapsed();
        result?;

        debug!("pricing call {} ({}): {}", self.iteration, mode, outcome);
        Ok(outcome)
    }

    fn price_rounds<M>(
        &mut self,
        master: &mut M,
        duals: &DualValues,
        outcome: &mut PricingOutcome,
    ) -> Result<(), PricingError>
    where
        M: MasterProblem + ?Sized,
    {
        for round in RoundIndex::range(self.layout.num_rounds()) {
            if self.cancellation.is_cancelled() {
                debug!(
                    "pricing call {} cancelled before round {}",
                    self.iteration,
                    round.get()
                );
                outcome.cancelled = true;
                break;
            }

            outcome.rounds_priced += 1;
            if self.price_round(master, duals, round)? == RoundResult::Added {
                outcome.columns_added += 1;
            }
        }
        Ok(())
    }

    #[inline]
    fn edge_weight(&self, duals: &DualValues, m: Match, round: RoundIndex) -> f64 {
        match duals.mode() {
            PricingMode::ReducedCost => duals.covering(m) - self.costs.match_cost(m, round),
            PricingMode::Farkas => duals.covering(m),
        }
    }

    fn price_round<M>(
        &mut self,
        master: &mut M,
        duals: &DualValues,
        round: RoundIndex,
    ) -> Result<RoundResult, PricingError>
    where
        M: MasterProblem + ?Sized,
    {
        let num_teams = self.layout.num_teams();
        self.stats.rounds_priced += 1;

        let mut edges = std::mem::take(&mut self.edges);
        edges.clear();
        let mut restricted = false;
        for &m in &self.matches {
            if master.is_pair_permitted(round, m) {
                edges.push((m, self.edge_weight(duals, m, round)));
            } else {
                restricted = true;
            }
        }
        let matching = self.oracle.max_weight_matching(num_teams, &edges);
        self.edges = edges;

        if matching.len() * 2 != num_teams {
            if restricted {
                trace!(
                    "round {}: no perfect matching under branching restrictions",
                    round.get()
                );
                self.stats.rounds_without_pairing += 1;
                return Ok(RoundResult::NoPairing);
            }
            return Err(PricingError::ImperfectMatching {
                round: round.get(),
                found: matching.len(),
                expected: num_teams / 2,
            });
        }

        let value = duals.convexity(round)
            + matching
                .iter()
                .map(|&m| self.edge_weight(duals, m, round))
                .sum::<f64>();
        let accepted = match duals.mode() {
            PricingMode::ReducedCost => is_positive(value),
            PricingMode::Farkas => value >= 0.0,
        };
        trace!(
            "round {}: subproblem value {:.6}, {}",
            round.get(),
            value,
            if accepted { "accepted" } else { "rejected" }
        );
        if !accepted {
            return Ok(RoundResult::Rejected);
        }

        if let Some(generated) = self.generated.as_mut() {
            let mut key = matching.clone();
            key.sort_unstable();
            if !generated[round.get()].insert(key) {
                trace!("round {}: matching already generated", round.get());
                self.stats.duplicates_suppressed += 1;
                return Ok(RoundResult::Duplicate);
            }
        }

        let id = self.ids.next_id();
        let mut column = RoundMatching::from_matches(id, round, num_teams, matching)?;
        let objective = column.objective(&self.costs);

        let mut coefficients = Vec::with_capacity(1 + num_teams / 2);
        coefficients.push((self.layout.convexity(round), 1.0));
        coefficients.extend(
            column
                .matches()
                .iter()
                .map(|&m| (self.layout.covering(m), 1.0)),
        );
        let variable = master.register_column(round, &coefficients, objective)?;
        column.attach_variable(variable)?;

        debug!("adding variable for matching {}: {}", id.get(), column);
        self.columns[round.get()].push(column);
        self.stats.columns_added += 1;
        Ok(RoundResult::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        master::RestrictedMaster,
        oracle::{BlossomOracle, ExhaustiveOracle},
    };
    use fixture_model::{costs::CostTensorBuilder, index::TeamIndex, sampling::sample_costs};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn m(i: usize, j: usize) -> Match {
        Match::new(i, j).unwrap()
    }

    fn ri(r: usize) -> RoundIndex {
        RoundIndex::new(r)
    }

    #[test]
    fn test_new_rejects_mismatched_costs() {
        let mut master = RestrictedMaster::new();
        let layout = MasterLayout::install(&mut master, 4).unwrap();
        let costs = CostTensor::zeros(6).unwrap();

        let err = PricingEngine::new(costs, layout, BlossomOracle::new()).unwrap_err();
        assert_eq!(
            err,
            PricingError::InvalidArgument(ModelError::ShapeMismatch {
                expected: 48,
                actual: 180
            })
        );
    }

    #[test]
    fn test_single_round_scenario() {
        init_logger();
        let mut master = RestrictedMaster::new();
        let costs = CostTensor::zeros(4).unwrap();
        let mut engine =
            PricingEngine::install(&mut master, costs, ExhaustiveOracle::new()).unwrap();
        let layout = engine.layout().clone();

        // Round 1 is the only round whose convexity dual keeps it attractive.
        master.set_dual(layout.covering(m(0, 1)), 1.0).unwrap();
        master.set_dual(layout.covering(m(2, 3)), 1.0).unwrap();
        for r in [0, 2] {
            master.set_dual(layout.convexity(ri(r)), -2.0).unwrap();
        }

        let outcome = engine
            .price_columns(&mut master, PricingMode::ReducedCost)
            .unwrap();
        assert_eq!(outcome.columns_added, 1);
        assert_eq!(outcome.rounds_priced, 3);
        assert!(!outcome.cancelled);

        let column = &engine.columns(ri(1))[0];
        assert_eq!(column.sorted_matches(), vec![m(0, 1), m(2, 3)]);
        assert_eq!(master.variable_objective(column.variable().unwrap()), Some(0.0));
    }

    #[test]
    fn test_columns_partition_all_teams() {
        init_logger();
        let mut master = RestrictedMaster::new();
        let costs = sample_costs(10, 0.4, 9).unwrap();
        let mut engine = PricingEngine::install(&mut master, costs, BlossomOracle::new()).unwrap();

        engine.price_columns(&mut master, PricingMode::Farkas).unwrap();
        assert_eq!(engine.num_columns(), 9);
        for column in engine.all_columns() {
            assert!(column.is_perfect(), "column {:?} is not a perfect matching", column);
            for t in TeamIndex::range(10) {
                assert!(column.opponent(t).is_some());
            }
        }
    }

    #[test]
    fn test_deduplication_suppresses_repeats() {
        let costs = CostTensor::zeros(4).unwrap();

        let mut plain_master = RestrictedMaster::new();
        let mut plain =
            PricingEngine::install(&mut plain_master, costs.clone(), ExhaustiveOracle::new())
                .unwrap();
        let mut dedup_master = RestrictedMaster::new();
        let mut dedup =
            PricingEngine::install(&mut dedup_master, costs, ExhaustiveOracle::new())
                .unwrap()
                .with_deduplication(true);
        assert!(dedup.is_deduplicating());

        for _ in 0..2 {
            plain.price_columns(&mut plain_master, PricingMode::Farkas).unwrap();
            dedup.price_columns(&mut dedup_master, PricingMode::Farkas).unwrap();
        }

        assert_eq!(plain.num_columns(), 6);
        assert_eq!(dedup.num_columns(), 3);
        assert_eq!(dedup.statistics().duplicates_suppressed, 3);
        assert_eq!(dedup_master.num_variables(), 3);
    }

    #[test]
    fn test_statistics_track_calls() {
        let mut master = RestrictedMaster::new();
        let costs = CostTensor::zeros(4).unwrap();
        let mut engine = PricingEngine::install(&mut master, costs, BlossomOracle::new()).unwrap();

        engine.price_columns(&mut master, PricingMode::Farkas).unwrap();
        engine.price_columns(&mut master, PricingMode::ReducedCost).unwrap();

        let stats = engine.statistics();
        assert_eq!(engine.iteration(), 2);
        assert_eq!(stats.farkas_calls, 1);
        assert_eq!(stats.reduced_cost_calls, 1);
        assert_eq!(stats.rounds_priced, 6);
        assert_eq!(stats.columns_added, 3);
    }

    #[test]
    fn test_column_ids_are_unique_and_increasing() {
        let mut master = RestrictedMaster::new();
        let mut builder = CostTensorBuilder::new(6).unwrap();
        builder.set_cost(0, 1, 0, 1.0).unwrap();
        let mut engine =
            PricingEngine::install(&mut master, builder.build(), BlossomOracle::new()).unwrap();

        engine.price_columns(&mut master, PricingMode::Farkas).unwrap();
        engine.price_columns(&mut master, PricingMode::Farkas).unwrap();
        let ids: Vec<usize> = engine.all_columns().map(|c| c.id().get()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 10);
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }
}
