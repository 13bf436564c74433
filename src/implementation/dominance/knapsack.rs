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

//! Intra-layer dominance filter for the knapsack family.

use super::{complementary_single_parents, mark_dominated_points, pair_mut};
use crate::{Diagram, LayerDominance, ParetoFrontier, SweepStats};

/// Knapsack sibling filter. Nodes are ordered by their minimum cumulative
/// weight, largest first: a node can only be dominated by a sibling that
/// used *less or equal* capacity, since smaller usage implies a superset of
/// future feasible extensions. Each node is probed against its 2 nearest
/// candidates in that order only -- not every candidate -- so the filter is
/// partial by design.
#[derive(Debug, Default, Clone, Copy)]
pub struct KnapsackDominance;

impl LayerDominance for KnapsackDominance {
    fn filter_layer(
        &self,
        dd: &Diagram,
        layer: usize,
        frontiers: &mut [Option<ParetoFrontier>],
        stats: &mut SweepStats,
    ) {
        if dd.layer(layer).len() <= 1 {
            return;
        }

        // sort the nodes by min weight, from largest to smallest;
        // nodes whose frontier is already empty have nothing to filter
        let mut order: Vec<(usize, isize)> = dd
            .layer(layer)
            .iter()
            .enumerate()
            .filter(|(pos, _)| {
                frontiers[*pos]
                    .as_ref()
                    .map(|f| !f.is_empty())
                    .unwrap_or(false)
            })
            .map(|(pos, node)| (pos, node.min_weight))
            .collect();
        order.sort_by(|a, b| b.1.cmp(&a.1));

        for i in 0..order.len().saturating_sub(1) {
            let pos1 = order[i].0;
            let mut marked = 0;
            // probing only the 2 nearest lighter siblings is a chosen
            // speed/completeness trade-off, not an exhaustive scan
            for &(pos2, _) in order.iter().take((i + 3).min(order.len())).skip(i + 1) {
                if complementary_single_parents(dd.node(layer, pos1), dd.node(layer, pos2)) {
                    continue;
                }
                let (target, by) = pair_mut(frontiers, pos1, pos2);
                marked += mark_dominated_points(target, by);
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

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_knapsack_dominance {
    use super::*;

    /// One layer with two siblings reached from distinct parents: the
    /// heavier node (larger min weight) carries a point that the lighter
    /// sibling dominates.
    fn setup() -> (Diagram, Vec<Option<ParetoFrontier>>) {
        let mut dd = Diagram::new(3, 2, 2);
        let r0 = dd.add_node(0);
        let r1 = dd.add_node(0);
        let light = dd.add_node(1);
        let heavy = dd.add_node(1);
        let t = dd.add_node(2);
        dd.add_arc(0, r0, 0, light, vec![0, 0]);
        dd.add_arc(0, r1, 0, heavy, vec![0, 0]);
        dd.add_arc(1, light, 0, t, vec![0, 0]);
        dd.add_arc(1, heavy, 0, t, vec![0, 0]);
        dd.node_mut(1, light).min_weight = 2;
        dd.node_mut(1, heavy).min_weight = 5;

        let mut f_light = ParetoFrontier::new(2);
        f_light.add(&[4, 4]);
        let mut f_heavy = ParetoFrontier::new(2);
        f_heavy.add(&[3, 3]); // dominated by the light sibling's (4, 4)
        f_heavy.add(&[1, 9]); // not dominated
        let frontiers = vec![Some(f_light), Some(f_heavy)];
        (dd, frontiers)
    }

    #[test]
    fn a_heavier_node_is_filtered_by_its_lighter_sibling() {
        let (dd, mut frontiers) = setup();
        let mut stats = SweepStats::default();
        KnapsackDominance.filter_layer(&dd, 1, &mut frontiers, &mut stats);
        assert_eq!(1, stats.points_filtered);
        let heavy = frontiers[1].as_ref().unwrap();
        assert_eq!(1, heavy.get_num_sols());
        assert_eq!(vec![&[1, 9][..]], heavy.iter().collect::<Vec<_>>());
        // the lighter node (last in the ordering) is never a target
        assert_eq!(1, frontiers[0].as_ref().unwrap().get_num_sols());
    }

    #[test]
    fn complementary_children_of_one_parent_are_skipped() {
        let mut dd = Diagram::new(3, 2, 2);
        let root = dd.add_node(0);
        let a = dd.add_node(1);
        let b = dd.add_node(1);
        let t = dd.add_node(2);
        dd.add_arc(0, root, 0, a, vec![0, 0]);
        dd.add_arc(0, root, 1, b, vec![0, 0]);
        dd.add_arc(1, a, 0, t, vec![0, 0]);
        dd.add_arc(1, b, 0, t, vec![0, 0]);
        dd.node_mut(1, a).min_weight = 0;
        dd.node_mut(1, b).min_weight = 3;

        let mut f_a = ParetoFrontier::new(2);
        f_a.add(&[9, 9]);
        let mut f_b = ParetoFrontier::new(2);
        f_b.add(&[1, 1]); // would be dominated, but the pairing is elided
        let mut frontiers = vec![Some(f_a), Some(f_b)];
        let mut stats = SweepStats::default();
        KnapsackDominance.filter_layer(&dd, 1, &mut frontiers, &mut stats);
        assert_eq!(0, stats.points_filtered);
        assert_eq!(1, frontiers[1].as_ref().unwrap().get_num_sols());
    }
}
