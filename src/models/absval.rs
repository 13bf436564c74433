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

//! The absolute-value model: minimize, per objective `o`, the deviation
//! `|sum of selected coefficients - b[o]|` under a cardinality bound on the
//! number of selected variables.
//!
//! The state tracks the running (signed) deviation per objective plus the
//! selection count. Arc weights are the *incremental* change of the
//! absolute deviation, negated for the maximization framing; the constant
//! deviation of the empty selection is folded into the first layer's arcs
//! so that path sums telescope into `-|total deviation|`.

use crate::{compile_exact, Diagram, Problem, Transition, Variable};

/// An absolute-value instance. Minimization (weights are negated).
#[derive(Debug, Clone)]
pub struct AbsVal {
    nb_vars: usize,
    /// Coefficients, indexed `[objective][variable]`.
    a: Vec<Vec<isize>>,
    /// Per-objective targets.
    b: Vec<isize>,
    /// Maximum number of selected variables.
    cardinality: usize,
    /// Variable order used for compilation (identity unless reset).
    order: Vec<usize>,
}

impl AbsVal {
    pub fn new(nb_vars: usize, a: Vec<Vec<isize>>, b: Vec<isize>, cardinality: usize) -> Self {
        assert_eq!(a.len(), b.len());
        assert!(a.iter().all(|row| row.len() == nb_vars));
        Self {
            nb_vars,
            a,
            b,
            cardinality,
            order: (0..nb_vars).collect(),
        }
    }

    /// Overrides the variable order used at compilation time.
    pub fn reset_order(&mut self, order: Vec<usize>) {
        assert_eq!(order.len(), self.nb_vars);
        self.order = order;
    }

    /// Compiles the instance into its exact decision diagram.
    pub fn generate_exact(&self) -> Diagram {
        compile_exact(self)
    }
}

impl Problem for AbsVal {
    /// Running deviations per objective, then the selection count.
    type State = Vec<isize>;

    fn nb_variables(&self) -> usize {
        self.nb_vars
    }

    fn nb_objectives(&self) -> usize {
        self.b.len()
    }

    fn initial_state(&self) -> Self::State {
        let mut state: Vec<isize> = self.b.iter().map(|target| -target).collect();
        state.push(0);
        state
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
        layer: usize,
        var: Variable,
        label: usize,
    ) -> Option<Transition<Self::State>> {
        let nobjs = self.nb_objectives();
        let j = var.id();
        if label == 0 {
            let weights = if layer == 0 {
                // fold the constant deviation of the empty selection in
                state[..nobjs].iter().map(|s| -s.abs()).collect()
            } else {
                vec![0; nobjs]
            };
            return Some(Transition {
                state: state.clone(),
                weights,
            });
        }
        if (state[nobjs] + 1) as usize > self.cardinality {
            return None;
        }
        let mut next = state.clone();
        let mut weights = Vec::with_capacity(nobjs);
        for o in 0..nobjs {
            let shifted = state[o] + self.a[o][j];
            let delta = shifted.abs() - state[o].abs();
            weights.push(if layer == 0 {
                // incremental change plus the folded constant
                -(delta + state[o].abs())
            } else {
                -delta
            });
            next[o] = shifted;
        }
        next[nobjs] += 1;
        Some(Transition {
            state: next,
            weights,
        })
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_absval {
    use crate::*;

    fn sorted_points(frontier: &ParetoFrontier) -> Vec<Vec<isize>> {
        let mut points: Vec<Vec<isize>> = frontier.iter().map(|p| p.to_vec()).collect();
        points.sort();
        points
    }

    /// Brute-force reference: enumerate every selection within the
    /// cardinality bound and keep the non-dominated negated deviations.
    fn bruteforce(problem: &AbsVal, nb_vars: usize, cardinality: usize) -> Vec<Vec<isize>> {
        let nobjs = problem.b.len();
        let mut points: Vec<Vec<isize>> = vec![];
        for mask in 0..(1usize << nb_vars) {
            if mask.count_ones() as usize > cardinality {
                continue;
            }
            let point: Vec<isize> = (0..nobjs)
                .map(|o| {
                    let sum: isize = (0..nb_vars)
                        .filter(|v| mask & (1 << v) != 0)
                        .map(|v| problem.a[o][v])
                        .sum();
                    -(sum - problem.b[o]).abs()
                })
                .collect();
            points.push(point);
        }
        let mut frontier: Vec<Vec<isize>> = points
            .iter()
            .filter(|p| {
                !points
                    .iter()
                    .any(|q| q != *p && q.iter().zip(p.iter()).all(|(a, b)| a >= b))
            })
            .cloned()
            .collect();
        frontier.sort();
        frontier.dedup();
        frontier
    }

    #[test]
    fn path_sums_telescope_into_the_negated_total_deviation() {
        let problem = AbsVal::new(3, vec![vec![2, -3, 1], vec![1, 1, 1]], vec![1, 2], 2);
        let dd = problem.generate_exact();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        assert_eq!(bruteforce(&problem, 3, 2), sorted_points(&frontier));
    }

    #[test]
    fn the_cardinality_bound_is_enforced() {
        // with a bound of 1, the selection {0, 1} reaching deviation 0 is
        // out of reach
        let problem = AbsVal::new(2, vec![vec![1, 1]], vec![2], 1);
        let dd = problem.generate_exact();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        assert_eq!(vec![vec![-1]], sorted_points(&frontier));
    }

    #[test]
    fn all_three_sweep_modes_agree() {
        let problem = AbsVal::new(
            4,
            vec![vec![3, -2, 1, 2], vec![-1, 2, 2, -3]],
            vec![2, -1],
            3,
        );
        let dd = problem.generate_exact();
        let params = SweepParams::default();
        let mut stats = SweepStats::default();
        let top = pareto_frontier_topdown(&dd, None, &mut stats);
        let bottom = pareto_frontier_bottomup(&dd, &mut stats);
        let cutset = pareto_frontier_dynamic_layer_cutset(&dd, None, &params, &mut stats);
        assert_eq!(sorted_points(&top), sorted_points(&bottom));
        assert_eq!(sorted_points(&top), sorted_points(&cutset));
    }
}
