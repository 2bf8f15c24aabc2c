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

//! # Column Generation Driver
//!
//! `ColumnGenerationSolver` runs the column generation loop at the root node
//! of a branch-and-price search: it alternates between the host re-solving the
//! restricted master and the `PricingEngine` adding columns, until pricing
//! proves optimality or infeasibility or a limit is hit.
//!
//! ## Loop
//!
//! - If the cancellation token is set, stop with `Aborted(Interrupted)`.
//! - If the iteration limit is reached, stop with `Aborted(IterationLimit)`.
//! - Solve the relaxation:
//!   - `Optimal`: run reduced-cost pricing; no new column proves optimality.
//!   - `Infeasible`: run Farkas pricing; no new column proves infeasibility.
//!   - `Unbounded` and `TimeLimit` end the solve.
//!
//! Host and pricing errors end the solve with `SolveStatus::Error`. The solver
//! never retries; the caller resubmits the instance.
//!
//! ## Usage
//!
//! ```rust
//! use fixture_colgen::cancel::CancellationToken;
//! use fixture_solver::{record::Variant, solver::SolverBuilder};
//!
//! let token = CancellationToken::new();
//! let solver = SolverBuilder::new()
//!     .with_iteration_limit(1000)
//!     .with_deduplication(true)
//!     .with_cancellation(token.clone())
//!     .with_variant(Variant::Matching)
//!     .build();
//!
//! assert_eq!(solver.iteration_limit(), Some(1000));
//! // let outcome = solver.solve(&instance, &mut host, BlossomOracle::new());
//! ```

use crate::{
    host::{RelaxationHost, RelaxationStatus},
    record::Variant,
    result::{AbortReason, SolveOutcome, SolveStatus, SolverStatistics, SolverStatisticsBuilder},
};
use fixture_colgen::{
    cancel::CancellationToken,
    master::PricingMode,
    oracle::MatchingOracle,
    pricing::{PricingEngine, PricingOutcome},
};
use fixture_model::costs::TournamentInstance;
use log::{info, warn};
use std::time::Instant;

/// Runs column generation against a `RelaxationHost`.
#[derive(Debug, Clone)]
pub struct ColumnGenerationSolver {
    iteration_limit: Option<u64>,
    deduplication: bool,
    cancellation: CancellationToken,
    variant: Variant,
}

enum Step {
    Continue,
    Stop(SolveStatus),
}

impl ColumnGenerationSolver {
    /// Returns the maximum number of relaxation solves, if any.
    #[inline]
    pub fn iteration_limit(&self) -> Option<u64> {
        self.iteration_limit
    }

    /// Returns `true` if the pricing engine suppresses repeated matchings.
    #[inline]
    pub fn is_deduplicating(&self) -> bool {
        self.deduplication
    }

    /// Returns the token that stops the solve.
    #[inline]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns the variant label reported in result records.
    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Solves the column generation of `instance` on `host`.
    ///
    /// The master layout is installed on `host` first, so `host` must not
    /// hold constraints of another instance.
    pub fn solve<H, O>(
        &self,
        instance: &TournamentInstance,
        host: &mut H,
        oracle: O,
    ) -> SolveOutcome
    where
        H: RelaxationHost + ?Sized,
        O: MatchingOracle,
    {
        let start_time = Instant::now();
        info!(
            "solving '{}' with {} teams using {} ({})",
            instance.name(),
            instance.num_teams(),
            oracle.name(),
            self.variant
        );

        let installed = PricingEngine::install(&mut *host, instance.costs().clone(), oracle);
        let mut engine = match installed {
            Ok(engine) => engine
                .with_deduplication(self.deduplication)
                .with_cancellation(self.cancellation.clone()),
            Err(e) => {
                warn!("could not set up pricing for '{}': {}", instance.name(), e);
                let stats = self.build_statistics::<O>(start_time, 0, None);
                return SolveOutcome::new(
                    SolveStatus::Error(e.to_string()),
                    None,
                    instance.num_teams(),
                    self.variant,
                    stats,
                );
            }
        };

        let mut iterations = 0u64;
        let mut objective = None;
        let status = loop {
            if self.cancellation.is_cancelled() {
                break SolveStatus::Aborted(AbortReason::Interrupted);
            }
            if self.iteration_limit.is_some_and(|limit| iterations >= limit) {
                break SolveStatus::Aborted(AbortReason::IterationLimit);
            }
            iterations += 1;

            let relaxation = match host.solve_relaxation() {
                Ok(status) => status,
                Err(e) => break SolveStatus::Error(e.to_string()),
            };

            let step = match relaxation {
                RelaxationStatus::Optimal => {
                    objective = Some(host.objective_value());
                    let priced = engine.price_columns(&mut *host, PricingMode::ReducedCost);
                    Self::after_pricing(priced, SolveStatus::Optimal)
                }
                RelaxationStatus::Infeasible => {
                    objective = None;
                    let priced = engine.price_columns(&mut *host, PricingMode::Farkas);
                    Self::after_pricing(priced, SolveStatus::Infeasible)
                }
                RelaxationStatus::Unbounded => Step::Stop(SolveStatus::Unbounded),
                RelaxationStatus::TimeLimit => {
                    Step::Stop(SolveStatus::Aborted(AbortReason::TimeLimit))
                }
            };
            if let Step::Stop(status) = step {
                break status;
            }
        };

        let stats = self.build_statistics(start_time, iterations, Some(&engine));
        match &status {
            SolveStatus::Error(message) => {
                warn!("solve of '{}' failed: {}", instance.name(), message)
            }
            _ => info!(
                "finished '{}': {} after {} iteration(s), {} column(s), {:.3} secs",
                instance.name(),
                status,
                iterations,
                stats.columns_generated,
                stats.solve_duration.as_secs_f64()
            ),
        }

        SolveOutcome::new(status, objective, instance.num_teams(), self.variant, stats)
    }

    fn after_pricing<E>(priced: Result<PricingOutcome, E>, proven: SolveStatus) -> Step
    where
        E: std::fmt::Display,
    {
        match priced {
            Ok(outcome) if outcome.cancelled => {
                Step::Stop(SolveStatus::Aborted(AbortReason::Interrupted))
            }
            Ok(outcome) if outcome.columns_added == 0 => Step::Stop(proven),
            Ok(_) => Step::Continue,
            Err(e) => Step::Stop(SolveStatus::Error(e.to_string())),
        }
    }

    fn build_statistics<O>(
        &self,
        start_time: Instant,
        iterations: u64,
        engine: Option<&PricingEngine<O>>,
    ) -> SolverStatistics
    where
        O: MatchingOracle,
    {
        let builder = SolverStatisticsBuilder::new().master_iterations(iterations);
        let builder = match engine.map(PricingEngine::statistics) {
            Some(pricing) => builder
                .pricing_rounds(pricing.reduced_cost_calls)
                .farkas_rounds(pricing.farkas_calls)
                .columns_generated(pricing.columns_added),
            None => builder,
        };
        builder.solve_duration(start_time.elapsed()).build()
    }
}

/// Builder for `ColumnGenerationSolver`.
#[derive(Debug, Clone)]
pub struct SolverBuilder {
    iteration_limit: Option<u64>,
    deduplication: bool,
    cancellation: CancellationToken,
    variant: Variant,
}

impl Default for SolverBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBuilder {
    /// Creates a builder without limits, deduplication off, and a fresh token.
    #[inline]
    pub fn new() -> Self {
        Self {
            iteration_limit: None,
            deduplication: false,
            cancellation: CancellationToken::new(),
            variant: Variant::Matching,
        }
    }

    /// Limits the number of relaxation solves.
    #[inline]
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Enables or disables per-round suppression of repeated matchings.
    #[inline]
    pub fn with_deduplication(mut self, yes: bool) -> Self {
        self.deduplication = yes;
        self
    }

    /// Sets the token that stops the solve.
    #[inline]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Sets the variant label reported in result records.
    #[inline]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    #[inline]
    pub fn build(self) -> ColumnGenerationSolver {
        ColumnGenerationSolver {
            iteration_limit: self.iteration_limit,
            deduplication: self.deduplication,
            cancellation: self.cancellation,
            variant: self.variant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let solver = SolverBuilder::new().build();
        assert_eq!(solver.iteration_limit(), None);
        assert!(!solver.is_deduplicating());
        assert!(!solver.cancellation_token().is_cancelled());
        assert_eq!(solver.variant(), Variant::Matching);
    }

    #[test]
    fn test_builder_shares_the_token() {
        let token = CancellationToken::new();
        let solver = SolverBuilder::new()
            .with_cancellation(token.clone())
            .with_iteration_limit(5)
            .with_variant(Variant::Traditional)
            .build();

        token.cancel();
        assert!(solver.cancellation_token().is_cancelled());
        assert_eq!(solver.iteration_limit(), Some(5));
        assert_eq!(solver.variant(), Variant::Traditional);
    }
}
