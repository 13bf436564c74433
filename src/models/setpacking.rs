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

//! The multi-objective set packing model.
//!
//! Set packing reduces to independent set on its conflict graph: two
//! variables conflict when some constraint contains them both, and a
//! feasible packing is exactly an independent set of that graph. The
//! reduction reuses the `IndepSet` model (and its dynamic variable order)
//! unchanged.

use crate::models::{Graph, IndepSet};

/// A multi-objective set packing instance: at most one selected variable
/// per constraint. Maximization.
#[derive(Debug, Clone)]
pub struct SetPacking {
    nb_vars: usize,
    /// Objective coefficients, indexed `[objective][variable]`.
    objs: Vec<Vec<isize>>,
    /// The variables of each constraint.
    vars_cons: Vec<Vec<usize>>,
}

impl SetPacking {
    pub fn new(nb_vars: usize, objs: Vec<Vec<isize>>, vars_cons: Vec<Vec<usize>>) -> Self {
        assert!(objs.iter().all(|row| row.len() == nb_vars));
        Self {
            nb_vars,
            objs,
            vars_cons,
        }
    }

    /// Builds the conflict graph: two variables are adjacent when some
    /// constraint contains them both.
    pub fn conflict_graph(&self) -> Graph {
        let mut graph = Graph::new(self.nb_vars);
        for cons in &self.vars_cons {
            for (at, &v) in cons.iter().enumerate() {
                for &w in cons.iter().skip(at + 1) {
                    graph.add_edge(v, w);
                }
            }
        }
        graph
    }

    /// Builds the associated independent set instance over the conflict
    /// graph of the constraints.
    pub fn to_indepset(&self) -> IndepSet {
        IndepSet::new(&self.conflict_graph(), self.objs.clone())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_setpacking {
    use crate::*;

    fn sorted_points(frontier: &ParetoFrontier) -> Vec<Vec<isize>> {
        let mut points: Vec<Vec<isize>> = frontier.iter().map(|p| p.to_vec()).collect();
        points.sort();
        points
    }

    #[test]
    fn the_conflict_graph_joins_covariables() {
        let problem = SetPacking::new(
            4,
            vec![vec![1, 1, 1, 1]],
            vec![vec![0, 1, 2], vec![2, 3]],
        );
        let graph = problem.conflict_graph();
        assert_eq!(4, graph.n_edges());
        assert!(graph.is_adj(0, 1));
        assert!(graph.is_adj(0, 2));
        assert!(graph.is_adj(1, 2));
        assert!(graph.is_adj(2, 3));
        assert!(!graph.is_adj(0, 3));
    }

    #[test]
    fn a_packing_is_an_independent_set_of_the_conflict_graph() {
        // 4 variables, constraints {0, 1}, {1, 2}, {2, 3}
        let problem = SetPacking::new(
            4,
            vec![vec![3, 2, 2, 3], vec![1, 4, 4, 1]],
            vec![vec![0, 1], vec![1, 2], vec![2, 3]],
        );
        let indepset = problem.to_indepset();
        let dd = indepset.generate_exact();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        // best packings: {0, 3} -> (6, 2), {0, 2} / {1, 3} -> (5, 5)
        assert_eq!(vec![vec![5, 5], vec![6, 2]], sorted_points(&frontier));
    }

    #[test]
    fn the_subset_bucket_filter_preserves_the_frontier() {
        let problem = SetPacking::new(
            5,
            vec![vec![2, 3, 1, 4, 2], vec![4, 1, 3, 1, 2]],
            vec![vec![0, 1, 2], vec![2, 3], vec![3, 4]],
        );
        let dd = problem.to_indepset().generate_exact();
        let mut stats = SweepStats::default();
        let plain = pareto_frontier_topdown(&dd, None, &mut stats);
        let filter = SetPackingDominance;
        let filtered = pareto_frontier_topdown(&dd, Some(&filter), &mut stats);
        let params = SweepParams::default();
        let cutset =
            pareto_frontier_dynamic_layer_cutset(&dd, Some(&filter), &params, &mut stats);
        assert_eq!(sorted_points(&plain), sorted_points(&filtered));
        assert_eq!(sorted_points(&plain), sorted_points(&cutset));
    }
}
