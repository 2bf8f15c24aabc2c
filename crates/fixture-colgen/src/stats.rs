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

/// Counters collected by a `PricingEngine` over its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PricingStatistics {
    /// Number of reduced-cost pricing calls.
    pub reduced_cost_calls: u64,
    /// Number of Farkas pricing calls.
    pub farkas_calls: u64,
    /// Number of round subproblems solved.
    pub rounds_priced: u64,
    /// Number of columns registered with the master.
    pub columns_added: u64,
    /// Number of improving matchings dropped because the round already had them.
    pub duplicates_suppressed: u64,
    /// Number of rounds in which branching left no perfect matching.
    pub rounds_without_pairing: u64,
    /// Total time spent inside pricing calls.
    pub pricing_duration: std::time::Duration,
}

impl std::fmt::Display for PricingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pricing Statistics:")?;
        writeln!(f, "  Reduced-Cost Calls: {}", self.reduced_cost_calls)?;
        writeln!(f, "  Farkas Calls: {}", self.farkas_calls)?;
        writeln!(f, "  Rounds Priced: {}", self.rounds_priced)?;
        writeln!(f, "  Columns Added: {}", self.columns_added)?;
        writeln!(f, "  Duplicates Suppressed: {}", self.duplicates_suppressed)?;
        writeln!(f, "  Rounds Without Pairing: {}", self.rounds_without_pairing)?;
        writeln!(
            f,
            "  Pricing Duration (secs): {:.3}",
            self.pricing_duration.as_secs_f64()
        )
    }
}
