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

//! Canonical unordered team pairs.
//!
//! A `Match` is stored as `(first, second)` with `first < second`, so the
//! pairs `{3, 1}` and `{1, 3}` are the same value. Matches of an `n`-team
//! tournament have a dense index in lexicographic order:
//!
//! ```raw
//! (0,1) (0,2) ... (0,n-1) (1,2) ... (n-2,n-1)
//!   0     1        n-2    n-1        n(n-1)/2 - 1
//! ```
//!
//! This is the order in which covering constraints are created and in which
//! the sampler numbers its cells.

use crate::{error::ModelError, index::TeamIndex};

/// An unordered pair of distinct teams, canonicalized to `(min, max)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Match {
    first: TeamIndex,
    second: TeamIndex,
}

/// Canonicalizes the unordered pair `{i, j}`.
///
/// # Errors
///
/// Returns `ModelError::SelfMatch` if `i == j`.
///
/// ```rust
/// use fixture_model::matchup::sort_match;
/// use fixture_model::index::TeamIndex;
///
/// let m = sort_match(TeamIndex::new(3), TeamIndex::new(1)).unwrap();
/// assert_eq!((m.first().get(), m.second().get()), (1, 3));
/// assert!(sort_match(TeamIndex::new(2), TeamIndex::new(2)).is_err());
/// ```
#[inline]
pub fn sort_match(i: TeamIndex, j: TeamIndex) -> Result<Match, ModelError> {
    match i.cmp(&j) {
        std::cmp::Ordering::Less => Ok(Match { first: i, second: j }),
        std::cmp::Ordering::Greater => Ok(Match { first: j, second: i }),
        std::cmp::Ordering::Equal => Err(ModelError::SelfMatch(i.get())),
    }
}

/// Returns the number of unordered pairs among `num_teams` teams.
#[inline]
pub const fn num_matches(num_teams: usize) -> usize {
    num_teams * num_teams.saturating_sub(1) / 2
}

impl Match {
    /// Creates a match from raw team numbers.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::SelfMatch` if `i == j`.
    #[inline]
    pub fn new(i: usize, j: usize) -> Result<Self, ModelError> {
        sort_match(TeamIndex::new(i), TeamIndex::new(j))
    }

    /// The smaller team of the pair.
    #[inline]
    pub fn first(&self) -> TeamIndex {
        self.first
    }

    /// The larger team of the pair.
    #[inline]
    pub fn second(&self) -> TeamIndex {
        self.second
    }

    /// Returns the dense lexicographic index of this match among `num_teams` teams.
    ///
    /// ```rust
    /// use fixture_model::matchup::Match;
    ///
    /// assert_eq!(Match::new(0, 1).unwrap().dense_index(4), 0);
    /// assert_eq!(Match::new(1, 2).unwrap().dense_index(4), 3);
    /// assert_eq!(Match::new(2, 3).unwrap().dense_index(4), 5);
    /// ```
    #[inline]
    pub fn dense_index(&self, num_teams: usize) -> usize {
        let i = self.first.get();
        let j = self.second.get();
        debug_assert!(
            j < num_teams,
            "called `Match::dense_index` with team out of bounds: the team count is {} but the team is {}",
            num_teams,
            j
        );
        i * num_teams - i * (i + 1) / 2 + (j - i - 1)
    }

    /// Returns every match among `num_teams` teams in dense index order.
    pub fn all(num_teams: usize) -> Vec<Match> {
        let mut matches = Vec::with_capacity(num_matches(num_teams));
        for i in 0..num_teams {
            for j in (i + 1)..num_teams {
                matches.push(Match {
                    first: TeamIndex::new(i),
                    second: TeamIndex::new(j),
                });
            }
        }
        matches
    }
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.first.get(), self.second.get())
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.first.get(), self.second.get())
    }
}
