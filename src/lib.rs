// Copyright 2022 the modd developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # MODD
//! MODD compiles multi-objective combinatorial optimization problems into
//! exact layered decision diagrams and extracts the pareto frontier of all
//! objective vectors reachable by root-to-terminal paths. You describe your
//! problem as a dynamic program (see `Problem`): a state, a transition
//! function producing the successor state and the arc weight vector for
//! every feasible decision, and a variable order. The library does the
//! rest: breadth-first compilation with per-layer state merging, structural
//! reduction to the canonical diagram, and frontier propagation -- top-down,
//! bottom-up, or meeting in the middle with the dynamic layer cutset.
//!
//! The engine is always framed as a maximization: minimization problems
//! simply negate their coefficients in the model (the shipped set covering,
//! absolute value and TSP models do exactly that).
//!
//! ## Quick Example
//! The following solves the bi-objective knapsack with two items of weight
//! one, a capacity of one, and profit vectors (5, 1) and (1, 5). The exact
//! frontier holds three points: take nothing, take the first item, or take
//! the second one.
//!
//! ```
//! use modd::*;
//!
//! // 1. Describe the instance
//! let problem = Knapsack::new(
//!     vec![vec![5, 1], vec![1, 5]], // profit vectors, one per item
//!     vec![vec![1, 1]],             // one weight constraint
//!     vec![1],                      // its capacity
//! );
//!
//! // 2. Compile it into an exact decision diagram and reduce it
//! let mut dd = problem.generate_exact();
//! reduce(&mut dd);
//!
//! // 3. Extract the pareto frontier (here: with the plain top-down sweep)
//! let mut stats = SweepStats::default();
//! let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
//!
//! let mut points: Vec<Vec<isize>> = frontier.iter().map(|p| p.to_vec()).collect();
//! points.sort();
//! assert_eq!(vec![vec![0, 0], vec![1, 5], vec![5, 1]], points);
//! ```
//!
//! ## Going further
//! For larger instances, plug a per-layer dominance filter into the sweep
//! (`KnapsackDominance`, `SetPackingDominance`, `SetCoveringDominance`) to
//! discard dominated partial frontiers early, or switch to
//! `pareto_frontier_dynamic_layer_cutset` to bound the peak memory of the
//! sweep. The `models` module shows, one problem family at a time, how the
//! `Problem` contract is meant to be implemented.

mod abstraction;
mod common;
mod implementation;
pub mod models;

pub use abstraction::*;
pub use common::*;
pub use implementation::*;
pub use models::*;
