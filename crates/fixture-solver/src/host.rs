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

use fixture_colgen::master::MasterProblem;
use thiserror::Error;

/// The status of one relaxation solve reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelaxationStatus {
    /// The relaxation was solved to optimality; ordinary duals are available.
    Optimal,
    /// The relaxation is infeasible; a Farkas ray is available.
    Infeasible,
    /// The relaxation is unbounded.
    Unbounded,
    /// The host stopped on its own time limit.
    TimeLimit,
}

impl std::fmt::Display for RelaxationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelaxationStatus::Optimal => write!(f, "Optimal"),
            RelaxationStatus::Infeasible => write!(f, "Infeasible"),
            RelaxationStatus::Unbounded => write!(f, "Unbounded"),
            RelaxationStatus::TimeLimit => write!(f, "Time Limit"),
        }
    }
}

/// A failure of the host solver. Never retried by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host failed to solve the relaxation.
    #[error("host solver failed: {0}")]
    Failed(String),
    /// The host reported numerical trouble it could not recover from.
    #[error("numerical trouble in host solver: {0}")]
    Numerical(String),
}

/// A host LP solver that owns the restricted master and can re-solve it.
///
/// After `solve_relaxation` returns `Optimal` the host must answer
/// `MasterProblem::dual` in `PricingMode::ReducedCost`; after `Infeasible`
/// in `PricingMode::Farkas`.
pub trait RelaxationHost: MasterProblem {
    /// Re-solves the relaxation over the columns registered so far.
    fn solve_relaxation(&mut self) -> Result<RelaxationStatus, HostError>;

    /// Returns the objective value of the last optimal relaxation.
    fn objective_value(&self) -> f64;
}
