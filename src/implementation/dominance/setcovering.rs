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

//! Intra-layer dominance filter for set covering.

use bit_set::BitSet;

use super::{complementary_single_parents, mark_dominated_points, pair_mut};
use crate::{Diagram, LayerDominance, ParetoFrontier, SweepStats};

/// Set covering sibling filter. Every node carries the set of constraints
/// left to cover; a node with a *smaller* uncovered set can dominate one
/// with a larger set (fewer obligations left means at least as many feasible
/// completions). The filter builds the full pairwise subset graph of the
/// layer and probes every candidate pair it admits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetCoveringDominance;

impl LayerDominance for SetCoveringDominance {
    fn filter_layer(
        &self,
        dd: &Diagram,
        layer: usize,
        frontiers: &mut [Option<ParetoFrontier>],
        stats: &mut SweepStats,
    ) {
        let n = dd.layer(layer).len();
        if n <= 1 {
            return;
        }

        // may_dominate[j][i]: node j's uncovered set is a subset of node i's
        let mut may_dominate = vec![vec![false; n]; n];
        for i in 0..n - 1 {
            for j in i + 1..n {
                if key_of(dd, layer, i).is_subset(key_of(dd, layer, j)) {
                    may_dominate[i][j] = true;
                }
                if key_of(dd, layer, j).is_subset(key_of(dd, layer, i)) {
                    may_dominate[j][i] = true;
                }
            }
        }

        for i in 0..n {
            let mut marked = 0;
            for (j, row) in may_dominate.iter().enumerate() {
                if !row[i] {
                    continue;
                }
                if complementary_single_parents(dd.node(layer, i), dd.node(layer, j)) {
                    continue;
                }
                let (target, by) = pair_mut(frontiers, i, j);
                marked += mark_dominated_points(target, by);
            }
            if marked > 0 {
                frontiers[i]
                    .as_mut()
                    .expect("frontier of filtered node")
                    .remove_dominated();
                stats.points_filtered += marked;
            }
        }
    }
}

fn key_of<'a>(dd: &'a Diagram, layer: usize, pos: usize) -> &'a BitSet {
    dd.node(layer, pos)
        .key_set
        .as_ref()
        .expect("set covering dominance requires bitset keys on every node")
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_setcovering_dominance {
    use bit_set::BitSet;

    use super::*;

    fn set_of(bits: &[usize]) -> BitSet {
        bits.iter().copied().collect()
    }

    #[test]
    fn a_node_with_fewer_obligations_dominates() {
        let mut dd = Diagram::new(3, 2, 2);
        let r0 = dd.add_node(0);
        let r1 = dd.add_node(0);
        let ahead = dd.add_node(1);
        let behind = dd.add_node(1);
        let t = dd.add_node(2);
        dd.add_arc(0, r0, 0, ahead, vec![0, 0]);
        dd.add_arc(0, r1, 0, behind, vec![0, 0]);
        dd.add_arc(1, ahead, 0, t, vec![0, 0]);
        dd.add_arc(1, behind, 0, t, vec![0, 0]);
        // `ahead` still has to cover {2}, `behind` has to cover {1, 2}
        dd.node_mut(1, ahead).key_set = Some(set_of(&[2]));
        dd.node_mut(1, behind).key_set = Some(set_of(&[1, 2]));

        // negated (maximization-framed) costs: larger is better
        let mut f_ahead = ParetoFrontier::new(2);
        f_ahead.add(&[-1, -1]);
        let mut f_behind = ParetoFrontier::new(2);
        f_behind.add(&[-2, -2]); // dominated by ahead's (-1, -1)
        f_behind.add(&[-1, -3]); // dominated as well
        f_behind.add(&[0, -9]); // survives
        let mut frontiers = vec![Some(f_ahead), Some(f_behind)];
        let mut stats = SweepStats::default();
        SetCoveringDominance.filter_layer(&dd, 1, &mut frontiers, &mut stats);
        assert_eq!(2, stats.points_filtered);
        let behind = frontiers[1].as_ref().unwrap();
        assert_eq!(vec![&[0, -9][..]], behind.iter().collect::<Vec<_>>());
        // the dominating node itself is untouched
        assert_eq!(1, frontiers[0].as_ref().unwrap().get_num_sols());
    }

    #[test]
    fn incomparable_sets_are_never_probed() {
        let mut dd = Diagram::new(3, 2, 2);
        let r0 = dd.add_node(0);
        let r1 = dd.add_node(0);
        let a = dd.add_node(1);
        let b = dd.add_node(1);
        let t = dd.add_node(2);
        dd.add_arc(0, r0, 0, a, vec![0, 0]);
        dd.add_arc(0, r1, 0, b, vec![0, 0]);
        dd.add_arc(1, a, 0, t, vec![0, 0]);
        dd.add_arc(1, b, 0, t, vec![0, 0]);
        dd.node_mut(1, a).key_set = Some(set_of(&[1]));
        dd.node_mut(1, b).key_set = Some(set_of(&[2]));

        let mut f_a = ParetoFrontier::new(2);
        f_a.add(&[5, 5]);
        let mut f_b = ParetoFrontier::new(2);
        f_b.add(&[1, 1]);
        let mut frontiers = vec![Some(f_a), Some(f_b)];
        let mut stats = SweepStats::default();
        SetCoveringDominance.filter_layer(&dd, 1, &mut frontiers, &mut stats);
        assert_eq!(0, stats.points_filtered);
    }
}
