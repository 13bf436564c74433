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

//! The multi-objective (multi-constraint) binary knapsack model.
//!
//! The state of a node is the vector of cumulative weights used on each
//! constraint; a one-arc is feasible as long as no constraint exceeds its
//! capacity. Since the state is exactly the cumulative usage, every path to
//! a node uses the same capacity, which is what makes the scalar dominance
//! key sound.

use crate::{compile_exact, Diagram, DomKey, Problem, Transition, Variable};

/// A multi-objective knapsack instance. Maximization: all objective
/// coefficients are taken as-is.
#[derive(Debug, Clone)]
pub struct Knapsack {
    /// Objective coefficients, indexed `[variable][objective]`.
    obj_coeffs: Vec<Vec<isize>>,
    /// Constraint coefficients, indexed `[constraint][variable]`.
    weights: Vec<Vec<isize>>,
    /// Right-hand side of each constraint.
    capacities: Vec<isize>,
    /// Variable order used for compilation (identity unless reset).
    order: Vec<usize>,
}

impl Knapsack {
    pub fn new(
        obj_coeffs: Vec<Vec<isize>>,
        weights: Vec<Vec<isize>>,
        capacities: Vec<isize>,
    ) -> Self {
        let nb_vars = obj_coeffs.len();
        assert!(nb_vars >= 1);
        assert_eq!(weights.len(), capacities.len());
        assert!(weights.iter().all(|row| row.len() == nb_vars));
        let nb_objs = obj_coeffs[0].len();
        assert!(obj_coeffs.iter().all(|row| row.len() == nb_objs));
        Self {
            obj_coeffs,
            weights,
            capacities,
            order: (0..nb_vars).collect(),
        }
    }

    /// Overrides the variable order used at compilation time.
    pub fn reset_order(&mut self, order: Vec<usize>) {
        assert_eq!(order.len(), self.nb_variables());
        let mut seen = vec![false; order.len()];
        for &v in &order {
            assert!(!seen[v], "the variable order must be a permutation");
            seen[v] = true;
        }
        self.order = order;
    }

    /// Compiles the instance into its exact decision diagram.
    pub fn generate_exact(&self) -> Diagram {
        compile_exact(self)
    }

    /// Recomputes the minimum cumulative first-constraint weight of every
    /// node, top-down. The compiler records the exact value at construction
    /// time, but reduction merges nodes with different usages: the scratch
    /// must be refreshed before the knapsack dominance filter runs again.
    pub fn update_node_weights(&self, dd: &mut Diagram) {
        dd.node_mut(0, 0).min_weight = 0;
        for l in 1..dd.nb_layers() {
            let item = self.weights[0][dd.var(l - 1).id()];
            for pos in 0..dd.layer(l).len() {
                let mut min_weight = isize::MAX;
                for &pred in dd.node(l, pos).preds(0) {
                    min_weight = min_weight.min(dd.node(l - 1, pred).min_weight);
                }
                for &pred in dd.node(l, pos).preds(1) {
                    min_weight = min_weight.min(dd.node(l - 1, pred).min_weight + item);
                }
                dd.node_mut(l, pos).min_weight = min_weight;
            }
        }
    }
}

impl Problem for Knapsack {
    type State = Vec<isize>;

    fn nb_variables(&self) -> usize {
        self.obj_coeffs.len()
    }

    fn nb_objectives(&self) -> usize {
        self.obj_coeffs[0].len()
    }

    fn initial_state(&self) -> Self::State {
        vec![0; self.capacities.len()]
    }

    fn next_variable(
        &self,
        layer: usize,
        _states: &mut dyn Iterator<Item = &Self::State>,
    ) -> Variable {
        Variable(self.order[layer])
    }

    fn transition(
        &self,
        state: &Self::State,
        _layer: usize,
        var: Variable,
        label: usize,
    ) -> Option<Transition<Self::State>> {
        if label == 0 {
            return Some(Transition {
                state: state.clone(),
                weights: vec![0; self.nb_objectives()],
            });
        }
        let item = var.id();
        let mut next = state.clone();
        for (used, (row, capa)) in next
            .iter_mut()
            .zip(self.weights.iter().zip(self.capacities.iter()))
        {
            *used += row[item];
            if *used > *capa {
                return None;
            }
        }
        Some(Transition {
            state: next,
            weights: self.obj_coeffs[item].clone(),
        })
    }

    fn dominance_key(&self, state: &Self::State) -> DomKey {
        DomKey::Scalar(state[0])
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_knapsack {
    use crate::*;

    /// 3 items, weights [2, 3, 4], values [3, 4, 5], capacity 5.
    fn single_objective() -> Knapsack {
        Knapsack::new(
            vec![vec![3], vec![4], vec![5]],
            vec![vec![2, 3, 4]],
            vec![5],
        )
    }

    /// 2 items of weight 1 with capacity 1, objectives (5, 1) and (1, 5).
    fn bi_objective() -> Knapsack {
        Knapsack::new(vec![vec![5, 1], vec![1, 5]], vec![vec![1, 1]], vec![1])
    }

    fn sorted_points(frontier: &ParetoFrontier) -> Vec<Vec<isize>> {
        let mut points: Vec<Vec<isize>> = frontier.iter().map(|p| p.to_vec()).collect();
        points.sort();
        points
    }

    #[test]
    fn the_single_objective_scenario_has_the_expected_shape_and_optimum() {
        let problem = single_objective();
        let mut dd = problem.generate_exact();
        // root layer, two interior layers, terminal layer
        assert_eq!(4, dd.nb_layers());
        assert_eq!(1, dd.layer(0).len());
        assert_eq!(1, dd.layer(3).len());

        reduce(&mut dd);
        assert!(dd.get_width() <= 3);

        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        // the optimum takes items 1 and 2 (weights 2 + 3, value 3 + 4)
        assert_eq!(vec![vec![7]], sorted_points(&frontier));
    }

    #[test]
    fn the_bi_objective_scenario_yields_exactly_three_points() {
        let problem = bi_objective();
        let dd = problem.generate_exact();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        assert_eq!(
            vec![vec![0, 0], vec![1, 5], vec![5, 1]],
            sorted_points(&frontier)
        );
    }

    #[test]
    fn all_three_sweep_modes_agree_with_and_without_the_filter() {
        let problem = Knapsack::new(
            vec![
                vec![3, 8],
                vec![7, 2],
                vec![5, 5],
                vec![2, 9],
                vec![9, 1],
                vec![4, 4],
            ],
            vec![vec![3, 5, 4, 2, 6, 3]],
            vec![11],
        );
        let mut dd = problem.generate_exact();
        reduce(&mut dd);
        problem.update_node_weights(&mut dd);

        let params = SweepParams::default();
        let mut stats = SweepStats::default();
        let plain = pareto_frontier_topdown(&dd, None, &mut stats);
        let filter = KnapsackDominance;
        let filtered = pareto_frontier_topdown(&dd, Some(&filter), &mut stats);
        let bottom = pareto_frontier_bottomup(&dd, &mut stats);
        let cutset = pareto_frontier_dynamic_layer_cutset(&dd, None, &params, &mut stats);
        let cutset_filtered =
            pareto_frontier_dynamic_layer_cutset(&dd, Some(&filter), &params, &mut stats);

        let expected = sorted_points(&plain);
        assert_eq!(expected, sorted_points(&filtered));
        assert_eq!(expected, sorted_points(&bottom));
        assert_eq!(expected, sorted_points(&cutset));
        assert_eq!(expected, sorted_points(&cutset_filtered));
        assert!(plain.check_consistency());
    }

    #[test]
    fn the_frontier_matches_a_bruteforce_enumeration() {
        let problem = Knapsack::new(
            vec![vec![4, 1], vec![2, 6], vec![3, 3], vec![5, 2]],
            vec![vec![2, 3, 1, 4], vec![1, 1, 2, 1]],
            vec![6, 3],
        );
        let dd = problem.generate_exact();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);

        // enumerate the 2^4 assignments by hand
        let mut feasible_points = vec![];
        for mask in 0..16usize {
            let mut usage = [0isize; 2];
            let mut value = [0isize; 2];
            for item in 0..4 {
                if mask & (1 << item) != 0 {
                    usage[0] += problem.weights[0][item];
                    usage[1] += problem.weights[1][item];
                    value[0] += problem.obj_coeffs[item][0];
                    value[1] += problem.obj_coeffs[item][1];
                }
            }
            if usage[0] <= 6 && usage[1] <= 3 {
                feasible_points.push(value.to_vec());
            }
        }
        let mut reference: Vec<Vec<isize>> = feasible_points
            .iter()
            .filter(|p| {
                !feasible_points
                    .iter()
                    .any(|q| *q != **p && q.iter().zip(p.iter()).all(|(a, b)| a >= b))
            })
            .cloned()
            .collect();
        reference.sort();
        reference.dedup();

        assert_eq!(reference, sorted_points(&frontier));
    }

    #[test]
    fn reduction_merges_nodes_and_update_node_weights_keeps_the_minimum() {
        let problem = single_objective();
        let mut dd = problem.generate_exact();
        reduce(&mut dd);
        problem.update_node_weights(&mut dd);
        // the root uses no capacity and interior minima never decrease
        assert_eq!(0, dd.get_root().min_weight);
        for l in 1..dd.nb_layers() {
            for node in dd.layer(l) {
                assert!(node.min_weight >= 0);
            }
        }
    }

    #[test]
    fn a_reset_order_compiles_to_an_equivalent_frontier() {
        let mut problem = single_objective();
        problem.reset_order(vec![2, 0, 1]);
        let dd = problem.generate_exact();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        assert_eq!(vec![vec![7]], sorted_points(&frontier));
    }
}
