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

//! Deterministic random cost tensors.
//!
//! `sample_costs(n, ratio, seed)` marks `round(ratio * nmatches * nrounds)`
//! distinct `(pair, round)` cells with cost 1 and leaves every other cell 0.
//! The cells are drawn uniformly without replacement with a partial
//! Fisher-Yates shuffle driven by `ChaCha8Rng`. All draws are taken over
//! `u64` ranges, so the same `(n, ratio, seed)` yields a bit-identical tensor
//! on every platform.

use crate::{
    costs::{CostTensor, CostTensorBuilder},
    error::ModelError,
    index::RoundIndex,
    matchup::{num_matches, Match},
    validate_num_teams,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Returns the number of cells `sample_costs` marks for the given arguments.
///
/// # Errors
///
/// Fails for a zero or odd team count and for a ratio outside `[0, 1]`.
///
/// ```rust
/// use fixture_model::sampling::selected_cell_count;
///
/// // 4 teams: 6 pairs times 3 rounds = 18 cells.
/// assert_eq!(selected_cell_count(4, 0.5).unwrap(), 9);
/// assert_eq!(selected_cell_count(4, 0.0).unwrap(), 0);
/// assert_eq!(selected_cell_count(4, 1.0).unwrap(), 18);
/// ```
pub fn selected_cell_count(num_teams: usize, ratio: f64) -> Result<usize, ModelError> {
    validate_num_teams(num_teams)?;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(ModelError::RatioOutOfRange(ratio));
    }
    let num_cells = num_matches(num_teams) * (num_teams - 1);
    let selected = (ratio * num_cells as f64).round() as usize;
    Ok(selected.min(num_cells))
}

/// Samples a symmetric 0/1 cost tensor.
///
/// Cell `k` of the `nmatches * nrounds` cells is the pair with dense index
/// `k % nmatches` in round `k / nmatches`.
///
/// # Errors
///
/// Fails for a zero or odd team count and for a ratio outside `[0, 1]`
/// (including NaN).
pub fn sample_costs(num_teams: usize, ratio: f64, seed: u64) -> Result<CostTensor, ModelError> {
    let selected = selected_cell_count(num_teams, ratio)?;
    let matches = Match::all(num_teams);
    let num_cells = matches.len() * (num_teams - 1);

    let mut cells: Vec<u64> = (0..num_cells as u64).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for k in 0..selected {
        let pick = rng.random_range(k as u64..num_cells as u64) as usize;
        cells.swap(k, pick);
    }

    let mut builder = CostTensorBuilder::new(num_teams)?;
    for &cell in &cells[..selected] {
        let cell = cell as usize;
        let m = matches[cell % matches.len()];
        let round = RoundIndex::new(cell / matches.len());
        builder.set_match_cost(m, round, 1.0)?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_cell_count_rounds_half_up() {
        // 6 teams: 15 pairs times 5 rounds = 75 cells.
        assert_eq!(selected_cell_count(6, 0.1).unwrap(), 8); // 7.5
        assert_eq!(selected_cell_count(6, 0.2).unwrap(), 15);
    }

    #[test]
    fn test_selected_cell_count_rejects_bad_ratio() {
        assert_eq!(
            selected_cell_count(6, 1.5),
            Err(ModelError::RatioOutOfRange(1.5))
        );
        assert!(matches!(
            selected_cell_count(6, -0.1),
            Err(ModelError::RatioOutOfRange(_))
        ));
        assert!(selected_cell_count(6, f64::NAN).is_err());
    }

    #[test]
    fn test_sample_costs_rejects_odd_team_count() {
        assert_eq!(sample_costs(7, 0.5, 1), Err(ModelError::OddTeamCount(7)));
    }

    #[test]
    fn test_sample_costs_is_deterministic() {
        let a = sample_costs(8, 0.3, 42).unwrap();
        let b = sample_costs(8, 0.3, 42).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_sample_costs_depends_on_seed() {
        let a = sample_costs(10, 0.5, 1).unwrap();
        let b = sample_costs(10, 0.5, 2).unwrap();
        assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_sample_costs_marks_expected_number_of_cells() {
        for (n, ratio) in [(4usize, 0.25), (6, 0.5), (8, 0.1), (12, 0.9)] {
            let costs = sample_costs(n, ratio, 7).unwrap();
            let expected = selected_cell_count(n, ratio).unwrap();
            assert_eq!(costs.nonzero_count(), expected, "n = {}, ratio = {}", n, ratio);
            assert_eq!(costs.total(), expected as f64);
        }
    }

    #[test]
    fn test_sample_costs_extremes() {
        assert_eq!(sample_costs(6, 0.0, 3).unwrap().nonzero_count(), 0);
        assert_eq!(sample_costs(6, 1.0, 3).unwrap().nonzero_count(), 75);
    }
}
