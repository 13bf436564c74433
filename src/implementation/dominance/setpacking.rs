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

//! Intra-layer dominance filter for set packing / independent set.

use bit_set::BitSet;

use super::{complementary_single_parents, mark_dominated_points, pair_mut};
use crate::{Diagram, LayerDominance, ParetoFrontier, SweepStats};

/// Set packing sibling filter. Every node carries the set of items that may
/// still be selected; node A can only be dominated by node B when A's set is
/// a subset of B's (a superset of future choices yields a superset of
/// achievable objective vectors). Rather than building the full pairwise
/// subset graph, the nodes are bucketed by popcount and each node only
/// probes the next non-empty larger bucket, stopping at the first candidate
/// whose set passes the subset test.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetPackingDominance;

impl LayerDominance for SetPackingDominance {
    fn filter_layer(
        &self,
        dd: &Diagram,
        layer: usize,
        frontiers: &mut [Option<ParetoFrontier>],
        stats: &mut SweepStats,
    ) {
        let nodes = dd.layer(layer);
        if nodes.len() <= 1 {
            return;
        }

        // bucket the nodes by the size of their still-selectable set; at
        // least one variable has been branched on, so the popcount is
        // strictly below the number of variables
        let mut buckets: Vec<Vec<usize>> = vec![vec![]; dd.nb_layers() - 1];
        for pos in 0..nodes.len() {
            buckets[key_of(dd, layer, pos).len()].push(pos);
        }

        for b1 in 0..buckets.len() - 1 {
            if buckets[b1].len() <= 1 {
                continue;
            }
            for idx in 0..buckets[b1].len() {
                let pos1 = buckets[b1][idx];
                let mut marked = 0;
                'probe: for level in buckets.iter().skip(b1 + 1) {
                    for &pos2 in level {
                        let k1 = key_of(dd, layer, pos1);
                        let k2 = key_of(dd, layer, pos2);
                        // different smallest elements: cannot be a subset pair
                        if k1.iter().next() != k2.iter().next() {
                            continue;
                        }
                        if complementary_single_parents(dd.node(layer, pos1), dd.node(layer, pos2))
                        {
                            continue;
                        }
                        if !k1.is_subset(k2) {
                            continue;
                        }
                        // first candidate found: filter against it and stop
                        let (target, by) = pair_mut(frontiers, pos1, pos2);
                        marked += mark_dominated_points(target, by);
                        break 'probe;
                    }
                    // only the next non-empty bucket is ever probed
                    if !level.is_empty() {
                        break;
                    }
                }
                if marked > 0 {
                    frontiers[pos1]
                        .as_mut()
                        .expect("frontier of filtered node")
                        .remove_dominated();
                    stats.points_filtered += marked;
                }
            }
        }
    }
}

fn key_of<'a>(dd: &'a Diagram, layer: usize, pos: usize) -> &'a BitSet {
    dd.node(layer, pos)
        .key_set
        .as_ref()
        .expect("set packing dominance requires bitset keys on every node")
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_setpacking_dominance {
    use bit_set::BitSet;

    use super::*;

    fn set_of(bits: &[usize]) -> BitSet {
        bits.iter().copied().collect()
    }

    /// Two siblings from distinct parents in a 4-variable universe: the node
    /// whose selectable set is a subset of its sibling's can be filtered.
    fn setup() -> (Diagram, Vec<Option<ParetoFrontier>>) {
        let mut dd = Diagram::new(5, 2, 2);
        let r0 = dd.add_node(0);
        let r1 = dd.add_node(0);
        let small = dd.add_node(1);
        let big = dd.add_node(1);
        let other = dd.add_node(1);
        let t = dd.add_node(2);
        dd.add_arc(0, r0, 0, small, vec![0, 0]);
        dd.add_arc(0, r1, 0, big, vec![0, 0]);
        dd.add_arc(0, r1, 1, other, vec![0, 0]);
        dd.add_arc(1, small, 0, t, vec![0, 0]);
        dd.add_arc(1, big, 0, t, vec![0, 0]);
        dd.add_arc(1, other, 0, t, vec![0, 0]);
        dd.node_mut(1, small).key_set = Some(set_of(&[1, 2]));
        dd.node_mut(1, big).key_set = Some(set_of(&[1, 2, 3]));
        dd.node_mut(1, other).key_set = Some(set_of(&[2, 3]));

        let mut f_small = ParetoFrontier::new(2);
        f_small.add(&[2, 2]); // dominated by big's (3, 3)
        f_small.add(&[0, 9]); // survives
        let mut f_big = ParetoFrontier::new(2);
        f_big.add(&[3, 3]);
        let mut f_other = ParetoFrontier::new(2);
        f_other.add(&[1, 1]);
        (dd, vec![Some(f_small), Some(f_big), Some(f_other)])
    }

    #[test]
    fn a_subset_node_is_filtered_by_its_superset_sibling() {
        let (dd, mut frontiers) = setup();
        let mut stats = SweepStats::default();
        SetPackingDominance.filter_layer(&dd, 1, &mut frontiers, &mut stats);
        assert_eq!(1, stats.points_filtered);
        let small = frontiers[0].as_ref().unwrap();
        assert_eq!(vec![&[0, 9][..]], small.iter().collect::<Vec<_>>());
        // `other` is in the same bucket as `small` but is not a subset of
        // anything: untouched
        assert_eq!(1, frontiers[2].as_ref().unwrap().get_num_sols());
    }

    #[test]
    fn nodes_with_different_smallest_elements_are_never_probed() {
        let (mut dd, mut frontiers) = setup();
        // shift small's set so its first element no longer matches big's
        dd.node_mut(1, 0).key_set = Some(set_of(&[2, 3]));
        let mut stats = SweepStats::default();
        SetPackingDominance.filter_layer(&dd, 1, &mut frontiers, &mut stats);
        assert_eq!(0, stats.points_filtered);
    }
}
