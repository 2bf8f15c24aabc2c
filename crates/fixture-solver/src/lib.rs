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

//! # Fixture Solver
//!
//! **The column generation loop and its result records.**
//!
//! `fixture-colgen` supplies the pricing engine; this crate drives it against
//! a host LP solver until the restricted master is proven optimal or
//! infeasible, and turns the outcome into the fixed-field records used by
//! experiment batches.
//!
//! ## Architecture
//!
//! * **`host`**: The `RelaxationHost` trait a host LP solver implements on top
//!   of `MasterProblem`.
//! * **`solver`**: `ColumnGenerationSolver` and its `SolverBuilder`.
//! * **`result`**: `SolveStatus`, `SolveOutcome`, and `SolverStatistics`.
//! * **`record`**: `ResultRecord` with its text format, and `Variant`.

pub mod host;
pub mod record;
pub mod result;
pub mod solver;
