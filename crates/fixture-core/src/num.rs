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

//! Numeric tolerance used by pricing.
//!
//! Dual values coming back from an LP host carry round-off noise. Every
//! comparison the pricing engine makes against zero goes through the helpers
//! here so that the same threshold is applied everywhere.

/// Absolute tolerance for dual values and reduced costs.
pub const EPSILON: f64 = 1e-6;

/// Returns `0.0` when `|value| < EPSILON`, otherwise `value` unchanged.
///
/// ```rust
/// use fixture_core::num::snap_to_zero;
/// assert_eq!(snap_to_zero(5e-7), 0.0);
/// assert_eq!(snap_to_zero(-5e-7), 0.0);
/// assert_eq!(snap_to_zero(0.25), 0.25);
/// ```
#[inline]
pub fn snap_to_zero(value: f64) -> f64 {
    if value.abs() < EPSILON {
        0.0
    } else {
        value
    }
}

/// Returns `true` iff `value > EPSILON`.
#[inline]
pub fn is_positive(value: f64) -> bool {
    value > EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_keeps_boundary_value() {
        // Exactly EPSILON is not below the threshold.
        assert_eq!(snap_to_zero(EPSILON), EPSILON);
        assert_eq!(snap_to_zero(-EPSILON), -EPSILON);
        assert_eq!(snap_to_zero(0.0), 0.0);
    }

    #[test]
    fn test_is_positive_is_strict() {
        assert!(!is_positive(0.0));
        assert!(!is_positive(EPSILON));
        assert!(is_positive(2.0 * EPSILON));
        assert!(!is_positive(-1.0));
    }
}
