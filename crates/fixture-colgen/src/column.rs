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

//! Matching columns.
//!
//! A `RoundMatching` is one complete pairing of all teams for one round:
//! the column the pricing engine adds to the master. Pairs are added one at a
//! time and the opponent array rejects a team getting a second opponent, so a
//! column is a partial pairing at every step and a perfect one once `n / 2`
//! pairs are in.

use crate::master::VariableHandle;
use fixedbitset::FixedBitSet;
use fixture_core::index::{TypedIndex, TypedIndexTag};
use fixture_model::{
    costs::CostTensor,
    index::{RoundIndex, TeamIndex},
    matchup::{sort_match, Match},
};
use thiserror::Error;

/// A tag type for column ids.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ColumnIdTag;

impl TypedIndexTag for ColumnIdTag {
    const NAME: &'static str = "ColumnId";
}

/// The id of a generated column, unique within one engine.
pub type ColumnId = TypedIndex<ColumnIdTag>;

/// A monotonically increasing source of column ids.
///
/// Each engine owns its own generator, so ids are unique per solve and
/// independent solves never share state.
#[derive(Debug, Clone, Default)]
pub struct ColumnIdGenerator {
    next: usize,
}

impl ColumnIdGenerator {
    /// Creates a generator whose first id is 0.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id.
    #[inline]
    pub fn next_id(&mut self) -> ColumnId {
        let id = ColumnId::new(self.next);
        self.next += 1;
        id
    }

    /// Returns the number of ids handed out so far.
    #[inline]
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Errors raised while assembling a column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// A team of the new pair already has an opponent in this round.
    #[error("team {team} already plays {opponent} in column {column}")]
    Conflict {
        column: ColumnId,
        team: usize,
        opponent: usize,
    },
    /// A master variable was attached a second time.
    #[error("column {0} already has a master variable attached")]
    AlreadyAttached(ColumnId),
    /// A pair of a team with itself.
    #[error("team {0} cannot play against itself")]
    SelfMatch(usize),
    /// A team index is not below the number of teams.
    #[error("team index {team} out of range for {num_teams} teams")]
    TeamOutOfRange { team: usize, num_teams: usize },
}

/// A pairing of teams for one round, the column of the master problem.
///
/// Equality, ordering, and hashing are by id only.
#[derive(Clone)]
pub struct RoundMatching {
    id: ColumnId,
    round: RoundIndex,
    opponents: Vec<Option<TeamIndex>>, // len = num_teams
    matches: Vec<Match>,
    variable: Option<VariableHandle>,
}

impl RoundMatching {
    /// Creates an empty matching for `round` among `num_teams` teams.
    pub fn new(id: ColumnId, round: RoundIndex, num_teams: usize) -> Self {
        Self {
            id,
            round,
            opponents: vec![None; num_teams],
            matches: Vec::with_capacity(num_teams / 2),
            variable: None,
        }
    }

    /// Creates a matching from a list of pairs, added in order.
    ///
    /// # Errors
    ///
    /// Returns the first error `add_match` reports.
    pub fn from_matches<I>(
        id: ColumnId,
        round: RoundIndex,
        num_teams: usize,
        matches: I,
    ) -> Result<Self, ColumnError>
    where
        I: IntoIterator<Item = Match>,
    {
        let mut column = Self::new(id, round, num_teams);
        for m in matches {
            column.add_match(m.first(), m.second())?;
        }
        Ok(column)
    }

    /// Adds the pair `{i, j}`.
    ///
    /// # Errors
    ///
    /// Fails with `ColumnError::Conflict` if either team already has an
    /// opponent, and with `SelfMatch` or `TeamOutOfRange` for a malformed
    /// pair. The matching is unchanged on error.
    pub fn add_match(&mut self, i: TeamIndex, j: TeamIndex) -> Result<(), ColumnError> {
        let num_teams = self.opponents.len();
        for team in [i, j] {
            if team.get() >= num_teams {
                return Err(ColumnError::TeamOutOfRange {
                    team: team.get(),
                    num_teams,
                });
            }
        }
        let m = sort_match(i, j).map_err(|_| ColumnError::SelfMatch(i.get()))?;
        for team in [i, j] {
            if let Some(opponent) = self.opponents[team.get()] {
                return Err(ColumnError::Conflict {
                    column: self.id,
                    team: team.get(),
                    opponent: opponent.get(),
                });
            }
        }

        self.opponents[i.get()] = Some(j);
        self.opponents[j.get()] = Some(i);
        self.matches.push(m);
        Ok(())
    }

    /// Attaches the master variable of this column.
    ///
    /// # Errors
    ///
    /// Fails with `ColumnError::AlreadyAttached` if a variable is attached already.
    pub fn attach_variable(&mut self, handle: VariableHandle) -> Result<(), ColumnError> {
        if self.variable.is_some() {
            return Err(ColumnError::AlreadyAttached(self.id));
        }
        self.variable = Some(handle);
        Ok(())
    }

    /// Returns `true` if the pair `{i, j}` plays in this matching.
    #[inline]
    pub fn contains_pair(&self, i: TeamIndex, j: TeamIndex) -> bool {
        i != j && self.opponent(i) == Some(j)
    }

    /// Returns the opponent of `team`, if it has one yet.
    #[inline]
    pub fn opponent(&self, team: TeamIndex) -> Option<TeamIndex> {
        self.opponents.get(team.get()).copied().flatten()
    }

    /// Returns the set of teams that have an opponent.
    pub fn covered_teams(&self) -> FixedBitSet {
        let mut covered = FixedBitSet::with_capacity(self.opponents.len());
        for m in &self.matches {
            covered.insert(m.first().get());
            covered.insert(m.second().get());
        }
        covered
    }

    /// Returns `true` if every team has exactly one opponent.
    #[inline]
    pub fn is_perfect(&self) -> bool {
        self.covered_teams().count_ones(..) == self.opponents.len()
    }

    /// Returns the pairs in the order they were added.
    #[inline]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Returns the pairs in ascending order.
    pub fn sorted_matches(&self) -> Vec<Match> {
        let mut matches = self.matches.clone();
        matches.sort_unstable();
        matches
    }

    /// Returns `sum cost(i, j, round)` over the pairs of this matching.
    pub fn objective(&self, costs: &CostTensor) -> f64 {
        self.matches
            .iter()
            .map(|&m| costs.match_cost(m, self.round))
            .sum()
    }

    /// Returns the id of this column.
    #[inline]
    pub fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the round this column schedules.
    #[inline]
    pub fn round(&self) -> RoundIndex {
        self.round
    }

    /// Returns the number of teams.
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.opponents.len()
    }

    /// Returns the attached master variable.
    #[inline]
    pub fn variable(&self) -> Option<VariableHandle> {
        self.variable
    }
}

impl PartialEq for RoundMatching {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RoundMatching {}

impl PartialOrd for RoundMatching {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RoundMatching {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::hash::Hash for RoundMatching {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for RoundMatching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundMatching")
            .field("id", &self.id.get())
            .field("round", &self.round.get())
            .field("matches", &self.matches)
            .field("variable", &self.variable.map(|v| v.get()))
            .finish()
    }
}

impl std::fmt::Display for RoundMatching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (k, m) in self.matches.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", m)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_model::costs::CostTensorBuilder;

    fn ti(i: usize) -> TeamIndex {
        TeamIndex::new(i)
    }

    fn column(n: usize) -> RoundMatching {
        RoundMatching::new(ColumnId::new(0), RoundIndex::new(0), n)
    }

    #[test]
    fn test_contains_pair_only_for_added_pairs() {
        let n = 8;
        let added = [(0, 5), (1, 2), (3, 7), (4, 6)];
        let mut c = column(n);
        for &(i, j) in &added {
            c.add_match(ti(i), ti(j)).unwrap();
        }
        assert!(c.is_perfect());

        for i in 0..n {
            for j in 0..n {
                let expected = added
                    .iter()
                    .any(|&(a, b)| (a, b) == (i, j) || (b, a) == (i, j));
                assert_eq!(
                    c.contains_pair(ti(i), ti(j)),
                    expected,
                    "wrong containment for ({}, {})",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_add_match_rejects_conflict() {
        let mut c = column(4);
        c.add_match(ti(0), ti(1)).unwrap();
        let err = c.add_match(ti(2), ti(1)).unwrap_err();
        assert_eq!(
            err,
            ColumnError::Conflict {
                column: ColumnId::new(0),
                team: 1,
                opponent: 0
            }
        );
        // Unchanged after the failed insertion.
        assert_eq!(c.matches().len(), 1);
        assert_eq!(c.opponent(ti(2)), None);
        assert!(!c.is_perfect());
    }

    #[test]
    fn test_add_match_rejects_malformed_pairs() {
        let mut c = column(4);
        assert_eq!(c.add_match(ti(2), ti(2)), Err(ColumnError::SelfMatch(2)));
        assert_eq!(
            c.add_match(ti(0), ti(4)),
            Err(ColumnError::TeamOutOfRange { team: 4, num_teams: 4 })
        );
    }

    #[test]
    fn test_attach_variable_once() {
        let mut c = column(2);
        assert_eq!(c.variable(), None);
        c.attach_variable(VariableHandle::new(7)).unwrap();
        assert_eq!(c.variable(), Some(VariableHandle::new(7)));
        assert_eq!(
            c.attach_variable(VariableHandle::new(8)),
            Err(ColumnError::AlreadyAttached(ColumnId::new(0)))
        );
        assert_eq!(c.variable(), Some(VariableHandle::new(7)));
    }

    #[test]
    fn test_identity_is_by_id() {
        let round = RoundIndex::new(1);
        let pairs = [Match::new(0, 1).unwrap(), Match::new(2, 3).unwrap()];
        let a = RoundMatching::from_matches(ColumnId::new(3), round, 4, pairs).unwrap();
        let b = RoundMatching::from_matches(ColumnId::new(4), round, 4, pairs).unwrap();
        let c = RoundMatching::new(ColumnId::new(3), RoundIndex::new(0), 4);

        assert_ne!(a, b);
        assert_eq!(a, c);
        assert!(a < b);
    }

    #[test]
    fn test_objective_sums_costs_of_its_round() {
        let mut builder = CostTensorBuilder::new(4).unwrap();
        builder.set_cost(0, 1, 2, 1.0).unwrap();
        builder.set_cost(2, 3, 2, 0.5).unwrap();
        builder.set_cost(0, 1, 0, 9.0).unwrap();
        let costs = builder.build();

        let pairs = [Match::new(3, 2).unwrap(), Match::new(1, 0).unwrap()];
        let c =
            RoundMatching::from_matches(ColumnId::new(0), RoundIndex::new(2), 4, pairs).unwrap();
        assert_eq!(c.objective(&costs), 1.5);
        assert_eq!(c.sorted_matches(), vec![Match::new(0, 1).unwrap(), Match::new(2, 3).unwrap()]);
        assert_eq!(format!("{}", c), "[(2,3), (0,1)]");
    }

    #[test]
    fn test_id_generator_is_monotonic() {
        let mut ids = ColumnIdGenerator::new();
        assert_eq!(ids.next_id(), ColumnId::new(0));
        assert_eq!(ids.next_id(), ColumnId::new(1));
        assert_eq!(ids.issued(), 2);
    }
}
