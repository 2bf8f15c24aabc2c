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

//! # Fixture Column Generation
//!
//! **Column generation over round matchings for carry-over minimal round-robin schedules.**
//!
//! A single round-robin schedule is a choice of one perfect matching of the
//! teams per round such that every pair meets exactly once. This crate
//! models the schedule as a set-partitioning master problem whose columns are
//! `(round, matching)` pairs and generates those columns on demand.
//!
//! ## Architecture
//!
//! * **`master`**: The `MasterProblem` trait a host LP solver implements, the
//!   `MasterLayout` of convexity and covering constraints, and the in-memory
//!   `RestrictedMaster`.
//! * **`column`**: `RoundMatching`, the column entity, and its per-engine ids.
//! * **`oracle`**: The `MatchingOracle` trait with the blossom and exhaustive
//!   implementations.
//! * **`duals`**: The snapped dual values of one pricing call.
//! * **`pricing`**: `PricingEngine`, which solves one matching subproblem per
//!   round and registers every improving matching with the master.
//! * **`cancel`** / **`stats`**: Cooperative cancellation and counters.
//!
//! ## Example
//!
//! ```rust
//! use fixture_colgen::{
//!     master::{PricingMode, RestrictedMaster},
//!     oracle::BlossomOracle,
//!     pricing::PricingEngine,
//! };
//! use fixture_model::sampling::sample_costs;
//!
//! let costs = sample_costs(6, 0.5, 1).unwrap();
//! let mut master = RestrictedMaster::new();
//! let mut engine = PricingEngine::install(&mut master, costs, BlossomOracle::new()).unwrap();
//!
//! // An empty master is infeasible; Farkas pricing seeds one column per round.
//! let outcome = engine.price_columns(&mut master, PricingMode::Farkas).unwrap();
//! assert_eq!(outcome.columns_added, 5);
//! assert_eq!(master.num_variables(), 5);
//! ```

pub mod cancel;
pub mod column;
pub mod duals;
pub mod master;
pub mod oracle;
pub mod pricing;
pub mod stats;
