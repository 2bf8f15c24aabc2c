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

//! # Fixture Model
//!
//! **The problem data of a carry-over minimal single round-robin tournament.**
//!
//! A tournament with an even number `n` of teams is played over `n - 1`
//! rounds; in every round each team plays exactly one opponent, and over the
//! whole tournament every pair of teams meets exactly once. The cost of
//! scheduling the pair `{i, j}` in round `r` is `cost(i, j, r)`, and a
//! schedule is judged by the sum of the costs of the matches it places.
//!
//! ## Architecture
//!
//! * **`index`**: Typed wrappers (`TeamIndex`, `RoundIndex`) so team and round
//!   indices cannot be swapped.
//! * **`matchup`**: The canonical unordered pair `Match` and its dense,
//!   lexicographic indexing.
//! * **`costs`**: The immutable `CostTensor`, its `CostTensorBuilder`, and the
//!   named `TournamentInstance`.
//! * **`sampling`**: The deterministic random cost generator used for
//!   reproducible experiments and fixtures.
//! * **`loading`** / **`writing`**: The whitespace-separated `.srr` instance
//!   format.
//! * **`error`**: `ModelError`, raised for every malformed argument.
//!
//! ## Design Philosophy
//!
//! Instances are validated once, when they are built. A `CostTensor` that
//! exists is symmetric, has a zero diagonal, and has an even team count, so
//! nothing downstream has to check again.

pub mod costs;
pub mod error;
pub mod index;
pub mod loading;
pub mod matchup;
pub mod sampling;
pub mod writing;

pub use error::ModelError;

/// The largest supported number of teams. The cost tensor of `MAX_TEAMS`
/// teams holds about 134 million entries.
pub const MAX_TEAMS: usize = 512;

/// Checks that `num_teams` admits a round-robin schedule: positive, even,
/// and at most `MAX_TEAMS`.
///
/// ```rust
/// use fixture_model::{validate_num_teams, ModelError, MAX_TEAMS};
/// assert!(validate_num_teams(6).is_ok());
/// assert_eq!(validate_num_teams(5), Err(ModelError::OddTeamCount(5)));
/// assert_eq!(validate_num_teams(0), Err(ModelError::NoTeams));
/// assert_eq!(
///     validate_num_teams(MAX_TEAMS + 2),
///     Err(ModelError::TooManyTeams { num_teams: MAX_TEAMS + 2, max: MAX_TEAMS })
/// );
/// ```
#[inline]
pub fn validate_num_teams(num_teams: usize) -> Result<(), ModelError> {
    if num_teams == 0 {
        return Err(ModelError::NoTeams);
    }
    if num_teams % 2 == 1 {
        return Err(ModelError::OddTeamCount(num_teams));
    }
    if num_teams > MAX_TEAMS {
        return Err(ModelError::TooManyTeams {
            num_teams,
            max: MAX_TEAMS,
        });
    }
    Ok(())
}
