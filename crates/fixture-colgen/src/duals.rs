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

use crate::master::{ConstraintHandle, MasterLayout, MasterProblem, PricingMode};
use fixture_core::num::snap_to_zero;
use fixture_model::{index::RoundIndex, matchup::Match};

/// The dual values of one pricing call.
///
/// `u_r` is the value of the convexity constraint of round `r` and `v_ij`
/// the value of the covering constraint of the pair `{i, j}`. Inactive
/// constraints read as 0 and magnitudes below `EPSILON` are snapped to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct DualValues {
    mode: PricingMode,
    num_teams: usize,
    convexity: Vec<f64>, // u_r, len = num_rounds
    covering: Vec<f64>,  // v_ij, dense match order
}

impl DualValues {
    /// Reads every value of `layout` from `master`.
    pub fn read<M>(master: &M, layout: &MasterLayout, mode: PricingMode) -> Self
    where
        M: MasterProblem + ?Sized,
    {
        let value =
            |constraint: ConstraintHandle| master.dual(constraint, mode).map_or(0.0, snap_to_zero);
        Self {
            mode,
            num_teams: layout.num_teams(),
            convexity: layout.convexity_constraints().iter().copied().map(value).collect(),
            covering: layout.covering_constraints().iter().copied().map(value).collect(),
        }
    }

    /// Returns the mode the values were read in.
    #[inline]
    pub fn mode(&self) -> PricingMode {
        self.mode
    }

    /// Returns `u_r`.
    #[inline]
    pub fn convexity(&self, round: RoundIndex) -> f64 {
        self.convexity[round.get()]
    }

    /// Returns `v_ij`.
    #[inline]
    pub fn covering(&self, m: Match) -> f64 {
        self.covering[m.dense_index(self.num_teams)]
    }
}
