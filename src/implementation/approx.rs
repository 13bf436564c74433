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

//! This module provides the approximate top-down sweep. Instead of one exact
//! frontier, every node carries two bounded sets: **T**, feasible points
//! found so far, and **S**, a relaxed over-approximation of the points that
//! were evicted to keep T small. Together they bracket the exact frontier:
//! every exact point is weakly dominated by some point of T or S.
//!
//! Keeping the sets small also enables a structural simplification: an arc
//! whose shifted source sets are strictly dominated by the target's T set
//! cannot carry any useful path and is removed, along with the nodes this
//! leaves dangling. A symmetric bottom-up sweep brackets the completions
//! below each node instead.

use log::debug;

use crate::{Diagram, FrontierPool, ParetoFrontier};

/// What the approximate sweep hands back.
#[derive(Debug)]
pub struct ApproxOutcome {
    /// The T set of the terminal: feasible, dominance-free points.
    pub feasible: ParetoFrontier,
    /// The S set of the terminal: the relaxed cover of everything evicted.
    pub relaxed: ParetoFrontier,
    /// Number of arcs removed because they were strictly dominated.
    pub arcs_removed: usize,
    /// Number of nodes pruned by the dangling cleanup that followed.
    pub nodes_removed: usize,
}

/// Runs the approximate top-down sweep, bounding every node's T set by
/// `t_max` points and its S set by `s_max` points. The diagram is mutated:
/// strictly dominated arcs are removed and the nodes left dangling pruned.
pub fn approximate_pareto_frontier_topdown(
    dd: &mut Diagram,
    t_max: usize,
    s_max: usize,
) -> ApproxOutcome {
    assert!(t_max >= 1 && s_max >= 1);
    let nb_layers = dd.nb_layers();
    let nobjs = dd.nb_objectives();
    let mut pool = FrontierPool::with_capacity(nobjs, 2 * dd.get_width());

    let mut t_sets: Vec<Vec<Option<ParetoFrontier>>> = (0..nb_layers)
        .map(|l| (0..dd.layer(l).len()).map(|_| None).collect())
        .collect();
    let mut s_sets = t_sets.clone();

    // the S set of the root is a valid empty relaxation; its T set holds the
    // zero vector
    let mut root_t = pool.request();
    root_t.add(&vec![0; nobjs]);
    t_sets[0][0] = Some(root_t);
    s_sets[0][0] = Some(pool.request());

    let mut arcs_removed = 0;

    for l in 1..nb_layers {
        debug!("approximating layer {} ({} nodes)", l, dd.layer(l).len());
        for pos in 0..dd.layer(l).len() {
            let mut ft = pool.request();
            let mut fs = pool.request();

            // both sets merge every incoming arc, one-arcs first
            for label in (0..dd.nb_labels()).rev() {
                for &pred in dd.node(l, pos).preds(label) {
                    let weights = dd.node(l - 1, pred).arc(label).unwrap().weights.clone();
                    ft.merge(t_sets[l - 1][pred].as_ref().unwrap(), &weights);
                    fs.merge(s_sets[l - 1][pred].as_ref().unwrap(), &weights);
                }
            }

            // S points already dominated by a feasible T point are useless
            let mut purged = 0;
            for sj in 0..fs.n_rows() {
                if !fs.is_live(sj) {
                    continue;
                }
                let covered = (0..ft.n_rows()).any(|ti| {
                    ft.point(ti)
                        .iter()
                        .zip(fs.point(sj).iter())
                        .all(|(t, s)| t >= s)
                });
                if covered {
                    fs.mark_dead(sj);
                    purged += 1;
                }
            }
            if purged > 0 {
                fs.remove_dominated();
            }

            // an incoming arc whose shifted source sets are strictly below
            // every feasible point of this node carries no useful path
            for label in 0..dd.nb_labels() {
                let mut arc_index = 0;
                while arc_index < dd.node(l, pos).preds(label).len() {
                    let pred = dd.node(l, pos).preds(label)[arc_index];
                    let weights = dd.node(l - 1, pred).arc(label).unwrap().weights.clone();
                    let prev_t = t_sets[l - 1][pred].as_ref().unwrap();
                    let prev_s = s_sets[l - 1][pred].as_ref().unwrap();
                    let strictly_dominated = strictly_below(prev_t, &weights, &ft)
                        && strictly_below(prev_s, &weights, &ft);
                    if strictly_dominated {
                        arcs_removed += 1;
                        dd.node_mut(l - 1, pred).arcs[label] = None;
                        dd.node_mut(l, pos).preds[label].swap_remove(arc_index);
                    } else {
                        arc_index += 1;
                    }
                }
            }

            if ft.get_num_sols() > t_max {
                relax_t(&mut ft, &mut fs, t_max);
            }
            if fs.get_num_sols() > s_max {
                relax_s(&mut fs, s_max);
            }

            t_sets[l][pos] = Some(ft);
            s_sets[l][pos] = Some(fs);
        }

        for slot in t_sets[l - 1].iter_mut().chain(s_sets[l - 1].iter_mut()) {
            if let Some(frontier) = slot.take() {
                pool.release(frontier);
            }
        }
    }

    let feasible = t_sets[nb_layers - 1][0].take().unwrap();
    let relaxed = s_sets[nb_layers - 1][0].take().unwrap();

    let mut nodes_removed = 0;
    if arcs_removed > 0 {
        let before = dd.get_num_nodes();
        dd.remove_dangling_nodes();
        nodes_removed = before - dd.get_num_nodes();
    }

    ApproxOutcome {
        feasible,
        relaxed,
        arcs_removed,
        nodes_removed,
    }
}

/// Runs the symmetric approximate sweep from the terminal up to the root:
/// every node brackets the completions below it between a T and an S set of
/// at most `t_max` and `s_max` points, and outgoing arcs whose shifted
/// target sets are strictly dominated by the node's T set are removed.
pub fn approximate_pareto_frontier_bottomup(
    dd: &mut Diagram,
    t_max: usize,
    s_max: usize,
) -> ApproxOutcome {
    assert!(t_max >= 1 && s_max >= 1);
    let nb_layers = dd.nb_layers();
    let nobjs = dd.nb_objectives();
    let mut pool = FrontierPool::with_capacity(nobjs, 2 * dd.get_width());

    let mut t_sets: Vec<Vec<Option<ParetoFrontier>>> = (0..nb_layers)
        .map(|l| (0..dd.layer(l).len()).map(|_| None).collect())
        .collect();
    let mut s_sets = t_sets.clone();

    let mut terminal_t = pool.request();
    terminal_t.add(&vec![0; nobjs]);
    t_sets[nb_layers - 1][0] = Some(terminal_t);
    s_sets[nb_layers - 1][0] = Some(pool.request());

    let mut arcs_removed = 0;

    for l in (0..nb_layers - 1).rev() {
        debug!("approximating layer {} ({} nodes)", l, dd.layer(l).len());
        for pos in 0..dd.layer(l).len() {
            let mut ft = pool.request();
            let mut fs = pool.request();

            for label in (0..dd.nb_labels()).rev() {
                if let Some(arc) = dd.node(l, pos).arc(label) {
                    ft.merge(t_sets[l + 1][arc.target].as_ref().unwrap(), &arc.weights);
                    fs.merge(s_sets[l + 1][arc.target].as_ref().unwrap(), &arc.weights);
                }
            }

            let mut purged = 0;
            for sj in 0..fs.n_rows() {
                if !fs.is_live(sj) {
                    continue;
                }
                let covered = (0..ft.n_rows()).any(|ti| {
                    ft.point(ti)
                        .iter()
                        .zip(fs.point(sj).iter())
                        .all(|(t, s)| t >= s)
                });
                if covered {
                    fs.mark_dead(sj);
                    purged += 1;
                }
            }
            if purged > 0 {
                fs.remove_dominated();
            }

            // an outgoing arc whose shifted target sets are strictly below
            // every feasible point of this node carries no useful path
            for label in 0..dd.nb_labels() {
                let (target, weights) = match dd.node(l, pos).arc(label) {
                    Some(arc) => (arc.target, arc.weights.clone()),
                    None => continue,
                };
                let below_t = t_sets[l + 1][target].as_ref().unwrap();
                let below_s = s_sets[l + 1][target].as_ref().unwrap();
                if strictly_below(below_t, &weights, &ft) && strictly_below(below_s, &weights, &ft)
                {
                    arcs_removed += 1;
                    dd.remove_arc(l, pos, label);
                }
            }

            if ft.get_num_sols() > t_max {
                relax_t(&mut ft, &mut fs, t_max);
            }
            if fs.get_num_sols() > s_max {
                relax_s(&mut fs, s_max);
            }

            t_sets[l][pos] = Some(ft);
            s_sets[l][pos] = Some(fs);
        }

        for slot in t_sets[l + 1].iter_mut().chain(s_sets[l + 1].iter_mut()) {
            if let Some(frontier) = slot.take() {
                pool.release(frontier);
            }
        }
    }

    let feasible = t_sets[0][0].take().unwrap();
    let relaxed = s_sets[0][0].take().unwrap();

    let mut nodes_removed = 0;
    if arcs_removed > 0 {
        let before = dd.get_num_nodes();
        dd.remove_dangling_nodes();
        nodes_removed = before - dd.get_num_nodes();
    }

    ApproxOutcome {
        feasible,
        relaxed,
        arcs_removed,
        nodes_removed,
    }
}

/// True iff every point of `source`, shifted by `weights`, is strictly below
/// every point of `target` in every coordinate. Vacuously true when either
/// set is empty.
fn strictly_below(source: &ParetoFrontier, weights: &[isize], target: &ParetoFrontier) -> bool {
    source.iter().all(|point| {
        target.iter().all(|goal| {
            point
                .iter()
                .zip(weights.iter())
                .zip(goal.iter())
                .all(|((p, w), g)| p + w < *g)
        })
    })
}

/// Shrinks the T set to its `t_max` best points (by coordinate sum); the
/// evicted points move into the S set, which keeps the bracket valid.
fn relax_t(t: &mut ParetoFrontier, s: &mut ParetoFrontier, t_max: usize) {
    t.sort_rows_by_sum_desc();
    for i in t_max..t.n_rows() {
        s.add(t.point(i));
    }
    t.truncate_rows(t_max);
}

/// Shrinks the S set to `s_max` points: the overflow collapses into its
/// ideal completion (the coordinatewise maximum), a single point that
/// weakly dominates everything it replaces.
fn relax_s(s: &mut ParetoFrontier, s_max: usize) {
    s.sort_rows_by_sum_desc();
    let mut ideal: Vec<isize> = s.point(s_max - 1).to_vec();
    for i in s_max..s.n_rows() {
        for (o, coord) in ideal.iter_mut().enumerate() {
            *coord = (*coord).max(s.point(i)[o]);
        }
    }
    s.truncate_rows(s_max - 1);
    s.add(&ideal);
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
