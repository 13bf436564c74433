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

//! This module defines the abstraction of an intra-layer dominance filter.
//!
//! The pareto frontier attached to each node is dominance-free *within that
//! node* by construction. A `LayerDominance` filter goes one step further
//! and discards points of one node's frontier that are dominated by points
//! of a *sibling* node whose future feasible extensions are provably a
//! superset of the first node's (as witnessed by the dominance keys the
//! problem recorded on the nodes).

use crate::{Diagram, ParetoFrontier, SweepStats};

/// A problem-specific heuristic invoked right after the frontiers of one
/// layer have been computed by a top-down sweep. Implementations are free to
/// be *partial*: they may discard any point that some sibling dominates, but
/// they need not find them all. Partiality never affects the final frontier,
/// it only leaves more points alive in intermediate layers.
pub trait LayerDominance {
    /// Prune the frontiers of all nodes of `layer`. `frontiers[i]` is the
    /// frontier of node `i` of that layer (entries may be `None` for nodes
    /// whose frontier has already been recycled). The number of points
    /// discarded must be accounted in `stats.points_filtered`.
    fn filter_layer(
        &self,
        dd: &Diagram,
        layer: usize,
        frontiers: &mut [Option<ParetoFrontier>],
        stats: &mut SweepStats,
    );
}
