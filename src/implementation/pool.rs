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

//! This module provides the frontier pool: a free list that recycles pareto
//! frontiers across the layers of one propagation sweep. A sweep churns
//! through one frontier per node and layer; recycling the buffers instead of
//! reallocating them is what keeps the sweeps allocation-quiet.

use crate::ParetoFrontier;

/// A free list of recyclable frontiers, all sharing one objective count.
/// The pool is exclusively owned by a single propagation call and passed
/// down by mutable borrow; it is never shared.
#[derive(Debug)]
pub struct FrontierPool {
    /// Number of objectives of every frontier handed out by this pool.
    nb_objectives: usize,
    /// The recycled frontiers.
    free: Vec<ParetoFrontier>,
}

impl FrontierPool {
    /// Creates a pool handing out frontiers of `nb_objectives` coordinates.
    pub fn new(nb_objectives: usize) -> Self {
        Self {
            nb_objectives,
            free: vec![],
        }
    }

    /// Creates a pool with room reserved for `size` recycled frontiers
    /// (typically the width of the diagram about to be swept).
    pub fn with_capacity(nb_objectives: usize, size: usize) -> Self {
        Self {
            nb_objectives,
            free: Vec::with_capacity(size),
        }
    }

    /// Pops a recycled frontier, or allocates a fresh one when the free list
    /// is empty. The returned frontier is always empty.
    pub fn request(&mut self) -> ParetoFrontier {
        match self.free.pop() {
            Some(mut frontier) => {
                frontier.clear();
                frontier
            }
            None => ParetoFrontier::new(self.nb_objectives),
        }
    }

    /// Returns a frontier to the free list.
    pub fn release(&mut self, frontier: ParetoFrontier) {
        debug_assert_eq!(frontier.nb_objectives(), self.nb_objectives);
        self.free.push(frontier);
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
