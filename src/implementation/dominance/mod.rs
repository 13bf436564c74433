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

//! This module (and its submodules) provides the problem-specific intra-layer
//! dominance filters. Each one compares a node's frontier against a handful
//! of "candidate dominating" siblings chosen through a cheap partial-order
//! proxy (the dominance key recorded on the nodes), and tombstones the
//! points some sibling weakly dominates.
//!
//! The filters are deliberately partial: probing only the nearest candidates
//! trades a little filtering power for a lot of speed, and any point left
//! unfiltered here is pruned at the terminal merge anyway.

mod knapsack;
mod setcovering;
mod setpacking;

pub use knapsack::*;
pub use setcovering::*;
pub use setpacking::*;

use crate::{Node, ParetoFrontier};

/// Mutably borrows frontier `i` together with an immutable view of frontier
/// `j` out of the same layer slice.
fn pair_mut(
    frontiers: &mut [Option<ParetoFrontier>],
    i: usize,
    j: usize,
) -> (&mut ParetoFrontier, &ParetoFrontier) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = frontiers.split_at_mut(j);
        (
            left[i].as_mut().expect("frontier of node under filter"),
            right[0].as_ref().expect("frontier of candidate node"),
        )
    } else {
        let (left, right) = frontiers.split_at_mut(i);
        (
            right[0].as_mut().expect("frontier of node under filter"),
            left[j].as_ref().expect("frontier of candidate node"),
        )
    }
}

/// Tombstones every live point of `target` that some live point of `by`
/// weakly dominates, and returns how many were marked. The caller compacts.
fn mark_dominated_points(target: &mut ParetoFrontier, by: &ParetoFrontier) -> usize {
    let nobjs = target.nb_objectives();
    let mut point = vec![0isize; nobjs];
    let mut marked = 0;
    for s1 in 0..target.n_rows() {
        if !target.is_live(s1) {
            continue;
        }
        point.copy_from_slice(target.point(s1));
        let dominated = (0..by.n_rows()).any(|s2| {
            by.is_live(s2) && by.point(s2).iter().zip(point.iter()).all(|(a, b)| a >= b)
        });
        if dominated {
            target.mark_dead(s1);
            marked += 1;
        }
    }
    marked
}

/// True when the only relation between the two nodes is "both are the sole
/// child of the same parent, through complementary arc labels". That pairing
/// can never yield a useful dominance, so the filters skip it outright.
fn complementary_single_parents(a: &Node, b: &Node) -> bool {
    if a.nb_incoming_arcs() != 1 || b.nb_incoming_arcs() != 1 {
        return false;
    }
    let zero_one = match (a.preds(0).first(), b.preds(1).first()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    };
    let one_zero = match (a.preds(1).first(), b.preds(0).first()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    };
    zero_one || one_zero
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
