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

//! This module provides the pareto propagation engine, the algorithmic heart
//! of the library. All three modes share one combination rule: the frontier
//! of a node is the dominance-filtered union, over its incoming arcs, of the
//! predecessor frontiers shifted by the arc weights.
//!
//! - the **top-down** sweep walks the layers in increasing order and reads
//!   the answer off the terminal;
//! - the **bottom-up** sweep is its mirror image over outgoing arcs and
//!   reads the answer off the root;
//! - the **dynamic layer cutset** keeps a shrinking boundary on both sides,
//!   always expands the cheaper one, and when the boundaries meet it
//!   convolutes, node by node, the frontier of everything above with the
//!   frontier of everything below.
//!
//! The three modes provably return the same point set; the cutset mode
//! trades a final convolution for never holding two full frontier layers of
//! the same side at once.

use std::time::Instant;

use binary_heap_plus::BinaryHeap;
use compare::Compare;
use derive_builder::Builder;
use log::debug;

use crate::{Diagram, FrontierPool, LayerDominance, ParetoFrontier, SweepStats};

// ----------------------------------------------------------------------------
// --- SWEEP PARAMETERS -------------------------------------------------------
// ----------------------------------------------------------------------------
/// The tunable knobs of the sweeps. The defaults replicate the behavior the
/// algorithms were validated with; both knobs are heuristics and affect
/// performance only, never the computed frontier.
#[derive(Debug, Clone, Builder)]
pub struct SweepParams {
    /// Multiplier applied to the bottom-up boundary value when the dynamic
    /// cutset decides which side to expand next. Values above 1 bias the
    /// race toward finishing the top-down half first, whose per-point cost
    /// model is cheaper.
    #[builder(default = "1.5")]
    pub bottomup_bias: f64,
    /// Number of points pre-allocated in the frontier accumulating the
    /// coupling-layer convolutions.
    #[builder(default = "10_000")]
    pub convolution_reserve: usize,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            bottomup_bias: 1.5,
            convolution_reserve: 10_000,
        }
    }
}

// ----------------------------------------------------------------------------
// --- TOP-DOWN ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Computes the pareto frontier of the diagram with a plain top-down sweep.
/// After each layer is computed the optional dominance `filter` prunes
/// points between sibling nodes, then the previous layer's frontiers return
/// to the pool. The terminal's frontier is the answer.
pub fn pareto_frontier_topdown(
    dd: &Diagram,
    filter: Option<&dyn LayerDominance>,
    stats: &mut SweepStats,
) -> ParetoFrontier {
    stats.filter_time = Default::default();
    stats.points_filtered = 0;

    let nb_layers = dd.nb_layers();
    let mut pool = FrontierPool::with_capacity(dd.nb_objectives(), dd.get_width());
    let mut frontiers = empty_frontiers(dd);

    let mut root = pool.request();
    root.add(&vec![0; dd.nb_objectives()]);
    frontiers[0][0] = Some(root);

    for l in 1..nb_layers {
        expand_layer_topdown(dd, l, &mut frontiers, &mut pool);
        debug!(
            "layer {}: {} nodes, {} points",
            l,
            dd.layer(l).len(),
            frontiers[l].iter().flatten().map(|f| f.get_num_sols()).sum::<usize>()
        );
        if let Some(filter) = filter {
            let begin = Instant::now();
            filter.filter_layer(dd, l, &mut frontiers[l], stats);
            stats.filter_time += begin.elapsed();
        }
        release_layer(&mut frontiers[l - 1], &mut pool);
    }

    frontiers[nb_layers - 1][0].take().unwrap()
}

// ----------------------------------------------------------------------------
// --- BOTTOM-UP --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Computes the pareto frontier with the symmetric bottom-up sweep: each
/// node merges the frontiers of its arc targets shifted by its own arc
/// weights, and the root's frontier is the answer. This is also how the
/// "reachable-to-terminal" half of the cutset mode is obtained.
pub fn pareto_frontier_bottomup(dd: &Diagram, stats: &mut SweepStats) -> ParetoFrontier {
    stats.filter_time = Default::default();
    stats.points_filtered = 0;

    let nb_layers = dd.nb_layers();
    let mut pool = FrontierPool::with_capacity(dd.nb_objectives(), dd.get_width());
    let mut frontiers = empty_frontiers(dd);

    let mut terminal = pool.request();
    terminal.add(&vec![0; dd.nb_objectives()]);
    frontiers[nb_layers - 1][0] = Some(terminal);

    for l in (0..nb_layers - 1).rev() {
        expand_layer_bottomup(dd, l, &mut frontiers, &mut pool);
        release_layer(&mut frontiers[l + 1], &mut pool);
    }

    frontiers[0][0].take().unwrap()
}

// ----------------------------------------------------------------------------
// --- DYNAMIC LAYER CUTSET ---------------------------------------------------
// ----------------------------------------------------------------------------
/// Computes the pareto frontier by meeting in the middle: a top-down and a
/// bottom-up boundary start at the root and terminal layers, and each step
/// expands whichever boundary currently has the lower value (the bottom-up
/// value being inflated by `params.bottomup_bias`). When both boundaries
/// point at the same layer -- the coupling layer -- every node there holds
/// the frontier of all paths from the root and the frontier of all paths to
/// the terminal; the answer is the union of their convolutions, accumulated
/// in descending order of frontier sizes so that large contributions seed
/// the dominance pruning early.
pub fn pareto_frontier_dynamic_layer_cutset(
    dd: &Diagram,
    filter: Option<&dyn LayerDominance>,
    params: &SweepParams,
    stats: &mut SweepStats,
) -> ParetoFrontier {
    stats.filter_time = Default::default();
    stats.points_filtered = 0;

    let nb_layers = dd.nb_layers();
    let zero = vec![0isize; dd.nb_objectives()];
    let mut pool = FrontierPool::with_capacity(dd.nb_objectives(), dd.get_width());
    let mut down = empty_frontiers(dd);
    let mut up = empty_frontiers(dd);

    let mut root = pool.request();
    root.add(&zero);
    down[0][0] = Some(root);
    let mut terminal = pool.request();
    terminal.add(&zero);
    up[nb_layers - 1][0] = Some(terminal);

    let mut layer_topdown = 0;
    let mut layer_bottomup = nb_layers - 1;
    let mut val_topdown = 0.0;
    let mut val_bottomup = 0.0;

    while layer_topdown != layer_bottomup {
        if val_topdown <= val_bottomup {
            layer_topdown += 1;
            expand_layer_topdown(dd, layer_topdown, &mut down, &mut pool);
            release_layer(&mut down[layer_topdown - 1], &mut pool);
            val_topdown = dd
                .layer(layer_topdown)
                .iter()
                .zip(down[layer_topdown].iter())
                .map(|(node, f)| topdown_value(node, f.as_ref().unwrap()))
                .sum();
            if let Some(filter) = filter {
                let begin = Instant::now();
                filter.filter_layer(dd, layer_topdown, &mut down[layer_topdown], stats);
                stats.filter_time += begin.elapsed();
            }
        } else {
            layer_bottomup -= 1;
            expand_layer_bottomup(dd, layer_bottomup, &mut up, &mut pool);
            release_layer(&mut up[layer_bottomup + 1], &mut pool);
            val_bottomup = params.bottomup_bias
                * dd.layer(layer_bottomup)
                    .iter()
                    .zip(up[layer_bottomup].iter())
                    .map(|(node, f)| bottomup_value(node, f.as_ref().unwrap()))
                    .sum::<f64>();
        }
        debug!(
            "boundaries: td={} (value {}), bu={} (value {})",
            layer_topdown, val_topdown, layer_bottomup, val_bottomup
        );
    }

    stats.layer_coupling = layer_topdown;

    // coupling: convolute both halves of every cutset node, biggest first
    let coupling = layer_topdown;
    let sizes: Vec<usize> = (0..dd.layer(coupling).len())
        .map(|pos| {
            down[coupling][pos].as_ref().unwrap().get_num_sols()
                + up[coupling][pos].as_ref().unwrap().get_num_sols()
        })
        .collect();
    let order: Vec<usize> = (0..sizes.len()).collect();
    let mut heap = BinaryHeap::from_vec_cmp(order, CouplingOrder { sizes: &sizes });

    let mut frontier = ParetoFrontier::new(dd.nb_objectives());
    frontier.reserve(params.convolution_reserve);
    while let Some(pos) = heap.pop() {
        let above = down[coupling][pos].as_ref().unwrap();
        let below = up[coupling][pos].as_ref().unwrap();
        frontier.convolute(above, below);
    }
    frontier
}

/// Orders coupling-layer nodes by the total size of their two frontiers
/// (used as a max-heap comparator, so bigger pops first).
struct CouplingOrder<'a> {
    sizes: &'a [usize],
}
impl Compare<usize> for CouplingOrder<'_> {
    fn compare(&self, a: &usize, b: &usize) -> std::cmp::Ordering {
        self.sizes[*a].cmp(&self.sizes[*b])
    }
}

// ----------------------------------------------------------------------------
// --- SHARED LAYER EXPANSION -------------------------------------------------
// ----------------------------------------------------------------------------
fn empty_frontiers(dd: &Diagram) -> Vec<Vec<Option<ParetoFrontier>>> {
    (0..dd.nb_layers())
        .map(|l| (0..dd.layer(l).len()).map(|_| None).collect())
        .collect()
}

fn release_layer(layer: &mut [Option<ParetoFrontier>], pool: &mut FrontierPool) {
    for slot in layer.iter_mut() {
        if let Some(frontier) = slot.take() {
            pool.release(frontier);
        }
    }
}

/// Computes the top frontier of every node of layer `l` from the already
/// computed frontiers of layer `l - 1`. Labels are visited in decreasing
/// order (one-arcs before zero-arcs); this only decides which point stands
/// as the representative on exact ties, never the point set itself.
fn expand_layer_topdown(
    dd: &Diagram,
    l: usize,
    frontiers: &mut [Vec<Option<ParetoFrontier>>],
    pool: &mut FrontierPool,
) {
    let mut level: Vec<Option<ParetoFrontier>> = Vec::with_capacity(dd.layer(l).len());
    for node in dd.layer(l).iter() {
        let mut frontier = pool.request();
        for label in (0..dd.nb_labels()).rev() {
            for &pred in node.preds(label) {
                let arc = dd.node(l - 1, pred).arc(label).unwrap();
                frontier.merge(frontiers[l - 1][pred].as_ref().unwrap(), &arc.weights);
            }
        }
        level.push(Some(frontier));
    }
    frontiers[l] = level;
}

/// Computes the bottom frontier of every node of layer `l` from the already
/// computed frontiers of layer `l + 1`.
fn expand_layer_bottomup(
    dd: &Diagram,
    l: usize,
    frontiers: &mut [Vec<Option<ParetoFrontier>>],
    pool: &mut FrontierPool,
) {
    let mut level: Vec<Option<ParetoFrontier>> = Vec::with_capacity(dd.layer(l).len());
    for node in dd.layer(l).iter() {
        let mut frontier = pool.request();
        for label in (0..dd.nb_labels()).rev() {
            if let Some(arc) = node.arc(label) {
                frontier.merge(frontiers[l + 1][arc.target].as_ref().unwrap(), &arc.weights);
            }
        }
        level.push(Some(frontier));
    }
    frontiers[l] = level;
}

/// Value of one node for the top-down side of the race: its frontier size
/// counted once per outgoing arc (the work its points will cause next).
fn topdown_value(node: &crate::Node, frontier: &ParetoFrontier) -> f64 {
    (frontier.get_num_sols() * node.nb_outgoing_arcs()) as f64
}

/// Value of one node for the bottom-up side: its frontier size counted once
/// per incoming arc (the bias multiplier is applied by the caller).
fn bottomup_value(node: &crate::Node, frontier: &ParetoFrontier) -> f64 {
    (frontier.get_num_sols() * node.nb_incoming_arcs()) as f64
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_pareto {
    use crate::*;

    /// The two-item bi-objective knapsack with capacity 1: item 0 yields
    /// (5, 1), item 1 yields (1, 5), and taking both is infeasible.
    /// Layer 1 has one node per residual state; both collapse on the
    /// terminal.
    fn two_item_knapsack() -> Diagram {
        let mut dd = Diagram::new(3, 2, 2);
        let root = dd.add_node(0);
        let skip = dd.add_node(1);
        let take = dd.add_node(1);
        let t = dd.add_node(2);
        dd.add_arc(0, root, 0, skip, vec![0, 0]);
        dd.add_arc(0, root, 1, take, vec![5, 1]);
        dd.add_arc(1, skip, 0, t, vec![0, 0]);
        dd.add_arc(1, skip, 1, t, vec![1, 5]);
        dd.add_arc(1, take, 0, t, vec![0, 0]);
        dd
    }

    fn sorted_points(frontier: &ParetoFrontier) -> Vec<Vec<isize>> {
        let mut points: Vec<Vec<isize>> = frontier.iter().map(|p| p.to_vec()).collect();
        points.sort();
        points
    }

    #[test]
    fn topdown_finds_the_expected_biobjective_frontier() {
        let dd = two_item_knapsack();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        assert_eq!(
            vec![vec![0, 0], vec![1, 5], vec![5, 1]],
            sorted_points(&frontier)
        );
        assert!(frontier.check_consistency());
    }

    #[test]
    fn bottomup_agrees_with_topdown() {
        let dd = two_item_knapsack();
        let mut stats = SweepStats::default();
        let top = pareto_frontier_topdown(&dd, None, &mut stats);
        let bottom = pareto_frontier_bottomup(&dd, &mut stats);
        assert_eq!(sorted_points(&top), sorted_points(&bottom));
    }

    #[test]
    fn dynamic_cutset_agrees_with_topdown() {
        let dd = two_item_knapsack();
        let mut stats = SweepStats::default();
        let top = pareto_frontier_topdown(&dd, None, &mut stats);
        let cut = pareto_frontier_dynamic_layer_cutset(
            &dd,
            None,
            &SweepParams::default(),
            &mut stats,
        );
        assert_eq!(sorted_points(&top), sorted_points(&cut));
        assert!(stats.layer_coupling < dd.nb_layers());
    }

    #[test]
    fn the_three_modes_agree_on_a_wider_diagram() {
        // a 4-layer diagram with shared interior nodes and uneven weights
        let mut dd = Diagram::new(4, 2, 2);
        let root = dd.add_node(0);
        let a = dd.add_node(1);
        let b = dd.add_node(1);
        let c = dd.add_node(2);
        let d = dd.add_node(2);
        let t = dd.add_node(3);
        dd.add_arc(0, root, 0, a, vec![0, 0]);
        dd.add_arc(0, root, 1, b, vec![3, 1]);
        dd.add_arc(1, a, 0, c, vec![0, 0]);
        dd.add_arc(1, a, 1, d, vec![1, 3]);
        dd.add_arc(1, b, 0, c, vec![2, 0]);
        dd.add_arc(1, b, 1, d, vec![0, 2]);
        dd.add_arc(2, c, 0, t, vec![0, 0]);
        dd.add_arc(2, c, 1, t, vec![1, 1]);
        dd.add_arc(2, d, 0, t, vec![0, 0]);

        let mut stats = SweepStats::default();
        let top = pareto_frontier_topdown(&dd, None, &mut stats);
        let bottom = pareto_frontier_bottomup(&dd, &mut stats);
        let cut = pareto_frontier_dynamic_layer_cutset(
            &dd,
            None,
            &SweepParams::default(),
            &mut stats,
        );
        assert_eq!(sorted_points(&top), sorted_points(&bottom));
        assert_eq!(sorted_points(&top), sorted_points(&cut));
        assert!(top.check_consistency());
    }

    #[test]
    fn sweep_params_build_with_defaults() {
        let params = SweepParamsBuilder::default().build().unwrap();
        assert_eq!(1.5, params.bottomup_bias);
        assert_eq!(10_000, params.convolution_reserve);
        let params = SweepParamsBuilder::default()
            .bottomup_bias(2.0)
            .build()
            .unwrap();
        assert_eq!(2.0, params.bottomup_bias);
    }
}
