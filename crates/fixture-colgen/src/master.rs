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

//! # The Master Problem Boundary
//!
//! The restricted master problem of the column generation holds one
//! convexity constraint per round,
//!
//! ```raw
//! sum_{c in columns(r)} x_c = 1            for every round r
//! ```
//!
//! and one covering constraint per unordered pair of teams,
//!
//! ```raw
//! sum_{c contains {i,j}} x_c = 1           for every pair {i, j}
//! ```
//!
//! Every column has coefficient `1.0` in each constraint it touches. The host
//! LP or MIP solver owns the actual storage and the search; the engine only
//! sees it through the `MasterProblem` trait.
//!
//! `RestrictedMaster` is an in-memory implementation of the trait. It keeps the
//! coefficient lists and the dual values a host last reported, and is what the
//! driver loop and the tests run against.

use fixture_core::index::{TypedIndex, TypedIndexTag};
use fixture_model::{index::RoundIndex, matchup::Match, validate_num_teams, ModelError};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// A tag type for constraint handles.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ConstraintHandleTag;

impl TypedIndexTag for ConstraintHandleTag {
    const NAME: &'static str = "ConstraintHandle";
}

/// A handle to a constraint of the master problem.
pub type ConstraintHandle = TypedIndex<ConstraintHandleTag>;

/// A tag type for variable handles.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VariableHandleTag;

impl TypedIndexTag for VariableHandleTag {
    const NAME: &'static str = "VariableHandle";
}

/// A handle to a variable (column) of the master problem.
pub type VariableHandle = TypedIndex<VariableHandleTag>;

/// Which dual information pricing reads from the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PricingMode {
    /// Ordinary LP duals of a feasible relaxation.
    ReducedCost,
    /// The Farkas ray certifying an infeasible relaxation.
    Farkas,
}

impl std::fmt::Display for PricingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingMode::ReducedCost => write!(f, "ReducedCost"),
            PricingMode::Farkas => write!(f, "Farkas"),
        }
    }
}

/// The role of a master constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Exactly one column of the round is selected.
    Convexity(RoundIndex),
    /// The pair meets in exactly one round.
    Covering(Match),
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintKind::Convexity(round) => write!(f, "convexity[{}]", round.get()),
            ConstraintKind::Covering(m) => write!(f, "covering{}", m),
        }
    }
}

/// Errors reported by a master problem when a column is registered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MasterError {
    /// The handle does not name a constraint of this master.
    #[error("unknown constraint {0}")]
    UnknownConstraint(ConstraintHandle),
    /// A coefficient that is zero or not finite.
    #[error("invalid coefficient {coefficient} for constraint {constraint}")]
    InvalidCoefficient {
        constraint: ConstraintHandle,
        coefficient: f64,
    },
    /// The objective coefficient of a column is not finite.
    #[error("invalid objective coefficient {0}")]
    InvalidObjective(f64),
}

/// The operations the pricing engine needs from a host solver.
pub trait MasterProblem {
    /// Adds the convexity constraint of `round` and returns its handle.
    fn add_convexity_constraint(&mut self, round: RoundIndex) -> ConstraintHandle;

    /// Adds the covering constraint of the pair `m` and returns its handle.
    fn add_covering_constraint(&mut self, m: Match) -> ConstraintHandle;

    /// Returns the dual or Farkas value of a constraint, or `None` when the
    /// constraint is not active in the current relaxation.
    fn dual(&self, constraint: ConstraintHandle, mode: PricingMode) -> Option<f64>;

    /// Returns `false` if branching decisions forbid the pair `m` in `round`.
    #[inline]
    fn is_pair_permitted(&self, _round: RoundIndex, _m: Match) -> bool {
        true
    }

    /// Adds a new variable with the given constraint coefficients and objective.
    fn register_column(
        &mut self,
        round: RoundIndex,
        coefficients: &[(ConstraintHandle, f64)],
        objective: f64,
    ) -> Result<VariableHandle, MasterError>;
}

/// The handles of all constraints the pricing engine reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterLayout {
    num_teams: usize,
    convexity: Vec<ConstraintHandle>, // len = num_rounds
    covering: Vec<ConstraintHandle>,  // len = num_matches, dense match order
}

impl MasterLayout {
    /// Creates every convexity and covering constraint of a `num_teams`
    /// tournament on `master`: rounds first, then pairs in dense order.
    ///
    /// # Errors
    ///
    /// Fails before touching `master` if `num_teams` is zero or odd.
    pub fn install<M>(master: &mut M, num_teams: usize) -> Result<Self, ModelError>
    where
        M: MasterProblem + ?Sized,
    {
        validate_num_teams(num_teams)?;

        let convexity = RoundIndex::range(num_teams - 1)
            .map(|round| master.add_convexity_constraint(round))
            .collect();
        let covering = Match::all(num_teams)
            .into_iter()
            .map(|m| master.add_covering_constraint(m))
            .collect();

        Ok(Self {
            num_teams,
            convexity,
            covering,
        })
    }

    /// Returns the number of teams.
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    /// Returns the number of rounds.
    #[inline]
    pub fn num_rounds(&self) -> usize {
        self.convexity.len()
    }

    /// Returns the number of covering constraints.
    #[inline]
    pub fn num_matches(&self) -> usize {
        self.covering.len()
    }

    /// Returns the convexity constraint of `round`.
    ///
    /// # Panics
    ///
    /// Panics if `round` is out of bounds.
    #[inline]
    pub fn convexity(&self, round: RoundIndex) -> ConstraintHandle {
        debug_assert!(
            round.get() < self.convexity.len(),
            "called `MasterLayout::convexity` with round out of bounds: the len is {} but the index is {}",
            self.convexity.len(),
            round.get()
        );
        self.convexity[round.get()]
    }

    /// Returns the covering constraint of the pair `m`.
    ///
    /// # Panics
    ///
    /// Panics if `m` is out of bounds.
    #[inline]
    pub fn covering(&self, m: Match) -> ConstraintHandle {
        let index = m.dense_index(self.num_teams);
        debug_assert!(
            index < self.covering.len(),
            "called `MasterLayout::covering` with match out of bounds: the len is {} but the index is {}",
            self.covering.len(),
            index
        );
        self.covering[index]
    }

    /// Returns the convexity constraints indexed by round.
    #[inline]
    pub fn convexity_constraints(&self) -> &[ConstraintHandle] {
        &self.convexity
    }

    /// Returns the covering constraints in dense match order.
    #[inline]
    pub fn covering_constraints(&self) -> &[ConstraintHandle] {
        &self.covering
    }
}

#[derive(Debug, Clone)]
struct ConstraintRow {
    kind: ConstraintKind,
    entries: Vec<(VariableHandle, f64)>,
    dual: f64,
    farkas: f64,
    active: bool,
}

#[derive(Debug, Clone)]
struct MasterVariable {
    round: RoundIndex,
    objective: f64,
    constraints: Vec<ConstraintHandle>,
}

/// An in-memory master problem.
///
/// Stores every constraint row with its `(variable, coefficient)` entries,
/// every registered variable, the dual and Farkas values last written by the
/// host, and the pairs forbidden by branching. Constraints start active with
/// all dual values zero.
#[derive(Debug, Clone, Default)]
pub struct RestrictedMaster {
    rows: Vec<ConstraintRow>,
    variables: Vec<MasterVariable>,
    forbidden: FxHashSet<(RoundIndex, Match)>,
}

impl RestrictedMaster {
    /// Creates an empty master.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of constraints.
    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of registered variables.
    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    fn row(&self, constraint: ConstraintHandle) -> Result<&ConstraintRow, MasterError> {
        self.rows
            .get(constraint.get())
            .ok_or(MasterError::UnknownConstraint(constraint))
    }

    #[inline]
    fn row_mut(&mut self, constraint: ConstraintHandle) -> Result<&mut ConstraintRow, MasterError> {
        self.rows
            .get_mut(constraint.get())
            .ok_or(MasterError::UnknownConstraint(constraint))
    }

    /// Returns the role of a constraint.
    #[inline]
    pub fn constraint_kind(
        &self,
        constraint: ConstraintHandle,
    ) -> Result<ConstraintKind, MasterError> {
        Ok(self.row(constraint)?.kind)
    }

    /// Returns the `(variable, coefficient)` entries of a constraint.
    #[inline]
    pub fn entries(
        &self,
        constraint: ConstraintHandle,
    ) -> Result<&[(VariableHandle, f64)], MasterError> {
        Ok(&self.row(constraint)?.entries)
    }

    /// Returns the round a variable was registered for.
    #[inline]
    pub fn variable_round(&self, variable: VariableHandle) -> Option<RoundIndex> {
        self.variables.get(variable.get()).map(|v| v.round)
    }

    /// Returns the objective coefficient of a variable.
    #[inline]
    pub fn variable_objective(&self, variable: VariableHandle) -> Option<f64> {
        self.variables.get(variable.get()).map(|v| v.objective)
    }

    /// Returns the constraints a variable has a coefficient in.
    #[inline]
    pub fn variable_constraints(&self, variable: VariableHandle) -> Option<&[ConstraintHandle]> {
        self.variables
            .get(variable.get())
            .map(|v| v.constraints.as_slice())
    }

    /// Iterates over all registered variables.
    #[inline]
    pub fn variables(&self) -> impl ExactSizeIterator<Item = VariableHandle> {
        VariableHandle::range(self.variables.len())
    }

    /// Sets the ordinary dual value of a constraint.
    pub fn set_dual(
        &mut self,
        constraint: ConstraintHandle,
        value: f64,
    ) -> Result<(), MasterError> {
        self.row_mut(constraint)?.dual = value;
        Ok(())
    }

    /// Sets the Farkas ray value of a constraint.
    pub fn set_farkas(
        &mut self,
        constraint: ConstraintHandle,
        value: f64,
    ) -> Result<(), MasterError> {
        self.row_mut(constraint)?.farkas = value;
        Ok(())
    }

    /// Resets every dual and Farkas value to zero.
    pub fn clear_duals(&mut self) {
        for row in &mut self.rows {
            row.dual = 0.0;
            row.farkas = 0.0;
        }
    }

    /// Marks a constraint as active or inactive in the current relaxation.
    pub fn set_active(
        &mut self,
        constraint: ConstraintHandle,
        active: bool,
    ) -> Result<(), MasterError> {
        self.row_mut(constraint)?.active = active;
        Ok(())
    }

    /// Forbids the pair `m` from meeting in `round`.
    #[inline]
    pub fn forbid_pair(&mut self, round: RoundIndex, m: Match) {
        self.forbidden.insert((round, m));
    }

    /// Lifts every branching restriction.
    #[inline]
    pub fn clear_forbidden(&mut self) {
        self.forbidden.clear();
    }

    fn push_row(&mut self, kind: ConstraintKind) -> ConstraintHandle {
        let handle = ConstraintHandle::new(self.rows.len());
        self.rows.push(ConstraintRow {
            kind,
            entries: Vec::new(),
            dual: 0.0,
            farkas: 0.0,
            active: true,
        });
        handle
    }
}

impl MasterProblem for RestrictedMaster {
    fn add_convexity_constraint(&mut self, round: RoundIndex) -> ConstraintHandle {
        self.push_row(ConstraintKind::Convexity(round))
    }

    fn add_covering_constraint(&mut self, m: Match) -> ConstraintHandle {
        self.push_row(ConstraintKind::Covering(m))
    }

    fn dual(&self, constraint: ConstraintHandle, mode: PricingMode) -> Option<f64> {
        let row = self.rows.get(constraint.get())?;
        if !row.active {
            return None;
        }
        Some(match mode {
            PricingMode::ReducedCost => row.dual,
            PricingMode::Farkas => row.farkas,
        })
    }

    fn is_pair_permitted(&self, round: RoundIndex, m: Match) -> bool {
        !self.forbidden.contains(&(round, m))
    }

    fn register_column(
        &mut self,
        round: RoundIndex,
        coefficients: &[(ConstraintHandle, f64)],
        objective: f64,
    ) -> Result<VariableHandle, MasterError> {
        if !objective.is_finite() {
            return Err(MasterError::InvalidObjective(objective));
        }
        // Validate everything first so a rejected column leaves no partial rows.
        for &(constraint, coefficient) in coefficients {
            self.row(constraint)?;
            if coefficient == 0.0 || !coefficient.is_finite() {
                return Err(MasterError::InvalidCoefficient {
                    constraint,
                    coefficient,
                });
            }
        }

        let variable = VariableHandle::new(self.variables.len());
        for &(constraint, coefficient) in coefficients {
            self.rows[constraint.get()].entries.push((variable, coefficient));
        }
        self.variables.push(MasterVariable {
            round,
            objective,
            constraints: coefficients.iter().map(|&(c, _)| c).collect(),
        });
        Ok(variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ri(r: usize) -> RoundIndex {
        RoundIndex::new(r)
    }

    fn m(i: usize, j: usize) -> Match {
        Match::new(i, j).unwrap()
    }

    #[test]
    fn test_install_creates_rounds_then_pairs() {
        let mut master = RestrictedMaster::new();
        let layout = MasterLayout::install(&mut master, 4).unwrap();

        assert_eq!(layout.num_rounds(), 3);
        assert_eq!(layout.num_matches(), 6);
        assert_eq!(master.num_constraints(), 3 + 6);
        assert_eq!(
            master.constraint_kind(layout.convexity(ri(2))).unwrap(),
            ConstraintKind::Convexity(ri(2))
        );
        assert_eq!(
            master.constraint_kind(layout.covering(m(1, 3))).unwrap(),
            ConstraintKind::Covering(m(1, 3))
        );
        assert_eq!(layout.covering(m(0, 1)).get(), 3);
    }

    #[test]
    fn test_install_rejects_odd_team_count() {
        let mut master = RestrictedMaster::new();
        assert_eq!(
            MasterLayout::install(&mut master, 5),
            Err(ModelError::OddTeamCount(5))
        );
        assert_eq!(master.num_constraints(), 0);
    }

    #[test]
    fn test_register_column_appends_entries() {
        let mut master = RestrictedMaster::new();
        let layout = MasterLayout::install(&mut master, 4).unwrap();
        let coefficients = [
            (layout.convexity(ri(0)), 1.0),
            (layout.covering(m(0, 1)), 1.0),
            (layout.covering(m(2, 3)), 1.0),
        ];
        let variable = master.register_column(ri(0), &coefficients, 2.0).unwrap();

        assert_eq!(variable.get(), 0);
        assert_eq!(master.num_variables(), 1);
        assert_eq!(master.variable_round(variable), Some(ri(0)));
        assert_eq!(master.variable_objective(variable), Some(2.0));
        assert_eq!(
            master.entries(layout.covering(m(2, 3))).unwrap(),
            &[(variable, 1.0)]
        );
        assert!(master.entries(layout.covering(m(0, 2))).unwrap().is_empty());
    }

    #[test]
    fn test_register_column_rejects_unknown_constraint_atomically() {
        let mut master = RestrictedMaster::new();
        let layout = MasterLayout::install(&mut master, 4).unwrap();
        let bogus = ConstraintHandle::new(99);
        let coefficients = [(layout.convexity(ri(0)), 1.0), (bogus, 1.0)];

        assert_eq!(
            master.register_column(ri(0), &coefficients, 0.0),
            Err(MasterError::UnknownConstraint(bogus))
        );
        assert_eq!(master.num_variables(), 0);
        assert!(master.entries(layout.convexity(ri(0))).unwrap().is_empty());
    }

    #[test]
    fn test_register_column_rejects_bad_coefficients() {
        let mut master = RestrictedMaster::new();
        let layout = MasterLayout::install(&mut master, 2).unwrap();
        let c = layout.convexity(ri(0));

        assert!(matches!(
            master.register_column(ri(0), &[(c, f64::NAN)], 0.0),
            Err(MasterError::InvalidCoefficient { .. })
        ));
        assert!(matches!(
            master.register_column(ri(0), &[(c, 0.0)], 0.0),
            Err(MasterError::InvalidCoefficient { .. })
        ));
        assert!(matches!(
            master.register_column(ri(0), &[(c, 1.0)], f64::INFINITY),
            Err(MasterError::InvalidObjective(_))
        ));
    }

    #[test]
    fn test_duals_respect_mode_and_activity() {
        let mut master = RestrictedMaster::new();
        let layout = MasterLayout::install(&mut master, 4).unwrap();
        let c = layout.covering(m(0, 1));

        master.set_dual(c, 1.5).unwrap();
        master.set_farkas(c, -2.0).unwrap();
        assert_eq!(master.dual(c, PricingMode::ReducedCost), Some(1.5));
        assert_eq!(master.dual(c, PricingMode::Farkas), Some(-2.0));

        master.set_active(c, false).unwrap();
        assert_eq!(master.dual(c, PricingMode::ReducedCost), None);

        master.set_active(c, true).unwrap();
        master.clear_duals();
        assert_eq!(master.dual(c, PricingMode::ReducedCost), Some(0.0));
        assert_eq!(master.dual(ConstraintHandle::new(500), PricingMode::Farkas), None);
        assert_eq!(
            master.set_dual(ConstraintHandle::new(500), 1.0),
            Err(MasterError::UnknownConstraint(ConstraintHandle::new(500)))
        );
    }

    #[test]
    fn test_forbidden_pairs() {
        let mut master = RestrictedMaster::new();
        master.forbid_pair(ri(1), m(0, 3));

        assert!(!master.is_pair_permitted(ri(1), m(0, 3)));
        assert!(master.is_pair_permitted(ri(0), m(0, 3)));
        assert!(master.is_pair_permitted(ri(1), m(0, 2)));

        master.clear_forbidden();
        assert!(master.is_pair_permitted(ri(1), m(0, 3)));
    }
}
