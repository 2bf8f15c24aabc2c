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

use crate::record::{ResultRecord, Variant};

/// Why a solve stopped without a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// The cancellation token was set.
    Interrupted,
    /// The host hit its time limit.
    TimeLimit,
    /// The driver hit its iteration limit.
    IterationLimit,
}

impl AbortReason {
    /// Returns the single-word status label used in result records.
    #[inline]
    pub fn label(&self) -> &'static str {
        match self {
            AbortReason::Interrupted => "userinterrupt",
            AbortReason::TimeLimit => "timelimit",
            AbortReason::IterationLimit => "iterlimit",
        }
    }
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::Interrupted => write!(f, "interrupted"),
            AbortReason::TimeLimit => write!(f, "time limit"),
            AbortReason::IterationLimit => write!(f, "iteration limit"),
        }
    }
}

/// The terminal status of a column generation solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// No column prices out at an optimal relaxation.
    Optimal,
    /// Farkas pricing found no column for an infeasible relaxation.
    Infeasible,
    /// The host reported an unbounded relaxation.
    Unbounded,
    /// The solve stopped early.
    Aborted(AbortReason),
    /// The host or the pricing engine failed. The string describes the error.
    Error(String),
}

impl SolveStatus {
    /// Returns the single-word status label used in result records.
    #[inline]
    pub fn label(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Aborted(reason) => reason.label(),
            SolveStatus::Error(_) => ResultRecord::ERROR_STATUS,
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::Unbounded => write!(f, "Unbounded"),
            SolveStatus::Aborted(reason) => write!(f, "Aborted: {}", reason),
            SolveStatus::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Statistics collected by a `ColumnGenerationSolver` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Number of relaxation solves.
    pub master_iterations: u64,
    /// Number of reduced-cost pricing calls.
    pub pricing_rounds: u64,
    /// Number of Farkas pricing calls.
    pub farkas_rounds: u64,
    /// Number of columns registered with the master.
    pub columns_generated: u64,
    /// Total duration of the solve.
    pub solve_duration: std::time::Duration,
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solver Statistics:")?;
        writeln!(f, "  Master Iterations: {}", self.master_iterations)?;
        writeln!(f, "  Pricing Rounds: {}", self.pricing_rounds)?;
        writeln!(f, "  Farkas Rounds: {}", self.farkas_rounds)?;
        writeln!(f, "  Columns Generated: {}", self.columns_generated)?;
        writeln!(
            f,
            "  Solve Duration (secs): {:.3}",
            self.solve_duration.as_secs_f64()
        )
    }
}

/// Builder for `SolverStatistics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatisticsBuilder {
    master_iterations: u64,
    pricing_rounds: u64,
    farkas_rounds: u64,
    columns_generated: u64,
    solve_duration: std::time::Duration,
}

impl Default for SolverStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverStatisticsBuilder {
    /// Creates a new `SolverStatisticsBuilder` with all counters zero.
    #[inline]
    pub fn new() -> Self {
        Self {
            master_iterations: 0,
            pricing_rounds: 0,
            farkas_rounds: 0,
            columns_generated: 0,
            solve_duration: std::time::Duration::ZERO,
        }
    }

    /// Sets the number of relaxation solves.
    #[inline]
    pub fn master_iterations(mut self, iterations: u64) -> Self {
        self.master_iterations = iterations;
        self
    }

    /// Sets the number of reduced-cost pricing calls.
    #[inline]
    pub fn pricing_rounds(mut self, rounds: u64) -> Self {
        self.pricing_rounds = rounds;
        self
    }

    /// Sets the number of Farkas pricing calls.
    #[inline]
    pub fn farkas_rounds(mut self, rounds: u64) -> Self {
        self.farkas_rounds = rounds;
        self
    }

    /// Sets the number of generated columns.
    #[inline]
    pub fn columns_generated(mut self, columns: u64) -> Self {
        self.columns_generated = columns;
        self
    }

    /// Sets the total solve duration.
    #[inline]
    pub fn solve_duration(mut self, duration: std::time::Duration) -> Self {
        self.solve_duration = duration;
        self
    }

    /// Builds the `SolverStatistics` instance.
    #[inline]
    pub fn build(self) -> SolverStatistics {
        SolverStatistics {
            master_iterations: self.master_iterations,
            pricing_rounds: self.pricing_rounds,
            farkas_rounds: self.farkas_rounds,
            columns_generated: self.columns_generated,
            solve_duration: self.solve_duration,
        }
    }
}

/// The outcome of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    status: SolveStatus,
    objective: Option<f64>,
    num_teams: usize,
    variant: Variant,
    statistics: SolverStatistics,
}

impl SolveOutcome {
    /// Creates an outcome for a solve of `num_teams` teams.
    #[inline]
    pub fn new(
        status: SolveStatus,
        objective: Option<f64>,
        num_teams: usize,
        variant: Variant,
        statistics: SolverStatistics,
    ) -> Self {
        Self {
            status,
            objective,
            num_teams,
            variant,
            statistics,
        }
    }

    /// Returns how the solve ended.
    #[inline]
    pub fn status(&self) -> &SolveStatus {
        &self.status
    }

    /// The objective of the last optimal relaxation, if there was one.
    #[inline]
    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// Returns the number of teams of the solved instance.
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    /// Returns the variant label of the solve.
    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the counters collected during the solve.
    #[inline]
    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    /// Returns `true` if the relaxation was proven optimal.
    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal)
    }

    /// Returns `true` if a host or pricing error ended the solve.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.status, SolveStatus::Error(_))
    }

    /// Converts the outcome into the result record of the instance sampled
    /// with `seed` and `ratio`.
    ///
    /// An error outcome yields the `ResultRecord::error` sentinel.
    pub fn to_record(&self, seed: u64, ratio: f64) -> ResultRecord {
        if self.is_error() {
            return ResultRecord::error(self.num_teams, ratio, seed, self.variant);
        }
        ResultRecord {
            num_teams: self.num_teams,
            ratio,
            seed,
            variant: self.variant,
            objective: self.objective.unwrap_or(-1.0),
            status: self.status.label().to_owned(),
            seconds: self.statistics.solve_duration.as_secs_f64(),
        }
    }
}

impl std::fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.objective {
            Some(objective) => writeln!(f, "{} (objective={})", self.status, objective)?,
            None => writeln!(f, "{}", self.status)?,
        }
        write!(f, "{}", self.statistics)
    }
}
