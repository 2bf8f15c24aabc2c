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

use thiserror::Error;

/// Raised for every argument that does not describe a valid tournament.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The tournament has no teams.
    #[error("number of teams must be positive")]
    NoTeams,
    /// An odd number of teams admits no perfect pairing.
    #[error("number of teams must be even, got {0}")]
    OddTeamCount(usize),
    /// The cost tensor of this many teams would not fit in memory.
    #[error("{num_teams} teams exceed the supported maximum of {max}")]
    TooManyTeams { num_teams: usize, max: usize },
    /// A match was requested between a team and itself.
    #[error("team {0} cannot play against itself")]
    SelfMatch(usize),
    /// A team index is not below the number of teams.
    #[error("team index {team} out of range for {num_teams} teams")]
    TeamOutOfRange { team: usize, num_teams: usize },
    /// A round index is not below the number of rounds.
    #[error("round index {round} out of range for {num_rounds} rounds")]
    RoundOutOfRange { round: usize, num_rounds: usize },
    /// A dense cost buffer has the wrong number of entries.
    #[error("cost tensor has {actual} entries, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    /// `cost(i, j, r)` and `cost(j, i, r)` differ.
    #[error("cost({i},{j},{round}) = {forward} differs from cost({j},{i},{round}) = {backward}")]
    Asymmetric {
        i: usize,
        j: usize,
        round: usize,
        forward: f64,
        backward: f64,
    },
    /// A team has a non-zero cost against itself.
    #[error("cost({team},{team},{round}) = {value} must be zero")]
    NonZeroDiagonal { team: usize, round: usize, value: f64 },
    /// A cost entry is NaN or infinite.
    #[error("cost({i},{j},{round}) = {value} is not finite")]
    NonFinite {
        i: usize,
        j: usize,
        round: usize,
        value: f64,
    },
    /// A sampling ratio outside `[0, 1]`.
    #[error("ratio {0} must lie in [0, 1]")]
    RatioOutOfRange(f64),
}
