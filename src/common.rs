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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client code is likely to work with.

use std::time::Duration;

use bit_set::BitSet;

// ----------------------------------------------------------------------------
// --- VARIABLE ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes a variable from the optimization problem at hand.
/// In this case, each variable is assumed to be identified with an integer
/// ranging from 0 until `problem.nb_variables()`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Variable(pub usize);
impl Variable {
    #[inline]
    /// This function returns the id (numeric value) of the variable.
    ///
    /// # Examples:
    /// ```
    /// # use modd::Variable;
    /// assert_eq!(0, Variable(0).id());
    /// assert_eq!(1, Variable(1).id());
    /// assert_eq!(2, Variable(2).id());
    /// assert_eq!(3, Variable(3).id());
    /// ```
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- DOMINANCE KEY ----------------------------------------------------------
// ----------------------------------------------------------------------------
/// A cheap partial-order proxy attached to the nodes of a decision diagram.
/// It is what the intra-layer dominance filters compare in order to decide
/// which sibling nodes may possibly dominate one another. Problems that do
/// not enable any dominance filter simply return `DomKey::None`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DomKey {
    /// No key: the node never takes part in intra-layer dominance filtering.
    None,
    /// A scalar key. For the knapsack family this is the minimum cumulative
    /// weight used on any path from the root to the node: a node can only be
    /// dominated by a sibling having used less (or as much) capacity.
    Scalar(isize),
    /// A set key. For set packing this is the set of items that may still be
    /// selected; for set covering, the set of constraints left to cover.
    Set(BitSet),
}

// ----------------------------------------------------------------------------
// --- SWEEP STATS ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Plain counters collected while a pareto sweep runs. These are bookkeeping
/// only: none of the algorithms take decisions based on them.
#[derive(Debug, Clone, Default)]
pub struct SweepStats {
    /// Total time spent inside the intra-layer dominance filter.
    pub filter_time: Duration,
    /// Number of frontier points discarded by the dominance filter.
    pub points_filtered: usize,
    /// The layer where the top-down and bottom-up boundaries met
    /// (dynamic layer cutset only).
    pub layer_coupling: usize,
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_var {
    use crate::Variable;

    #[test]
    fn test_var_id() {
        assert_eq!(0, Variable(0).id());
        assert_eq!(1, Variable(1).id());
        assert_eq!(2, Variable(2).id());
        assert_eq!(3, Variable(3).id());
    }
}
