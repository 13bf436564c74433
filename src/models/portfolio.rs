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

//! The portfolio optimization model: up to four objectives over a knapsack
//! budget -- expected return (maximized) and up to three risk terms whose
//! concave transforms (square, cube and fourth root of the accumulated
//! risk) are charged incrementally on the arcs, negated where the term is
//! to be minimized.
//!
//! The state accumulates the raw risk terms plus the budget used; since the
//! transforms are concave, the incremental charge depends on the
//! accumulator, which is why the weights are computed per node rather than
//! per layer. The fractional transforms are truncated toward zero to fit
//! the integral objective type.

use crate::{compile_exact, Diagram, Problem, Transition, Variable};

/// A portfolio optimization instance with 1 to 4 objectives.
#[derive(Debug, Clone)]
pub struct Portfolio {
    nb_objectives: usize,
    /// Expected return per asset (objective 0).
    mu: Vec<isize>,
    /// Variance contribution per asset (objective 1, minimized).
    sigma_sq: Vec<isize>,
    /// Skew contribution per asset (objective 2, maximized).
    gamma_cube: Vec<isize>,
    /// Kurtosis contribution per asset (objective 3, minimized).
    beta_fourth: Vec<isize>,
    /// Budget usage per asset and total budget.
    a: Vec<isize>,
    b: isize,
}

impl Portfolio {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nb_objectives: usize,
        mu: Vec<isize>,
        sigma_sq: Vec<isize>,
        gamma_cube: Vec<isize>,
        beta_fourth: Vec<isize>,
        a: Vec<isize>,
        b: isize,
    ) -> Self {
        assert!((1..=4).contains(&nb_objectives));
        let nb_vars = mu.len();
        assert!(nb_vars >= 1);
        assert_eq!(a.len(), nb_vars);
        assert!(nb_objectives < 2 || sigma_sq.len() == nb_vars);
        assert!(nb_objectives < 3 || gamma_cube.len() == nb_vars);
        assert!(nb_objectives < 4 || beta_fourth.len() == nb_vars);
        Self {
            nb_objectives,
            mu,
            sigma_sq,
            gamma_cube,
            beta_fourth,
            a,
            b,
        }
    }

    /// Compiles the instance into its exact decision diagram.
    pub fn generate_exact(&self) -> Diagram {
        compile_exact(self)
    }
}

impl Problem for Portfolio {
    /// Risk accumulators (one per risk objective), then the budget used.
    type State = Vec<isize>;

    fn nb_variables(&self) -> usize {
        self.mu.len()
    }

    fn nb_objectives(&self) -> usize {
        self.nb_objectives
    }

    fn initial_state(&self) -> Self::State {
        vec![0; self.nb_objectives]
    }

    fn transition(
        &self,
        state: &Self::State,
        _layer: usize,
        var: Variable,
        label: usize,
    ) -> Option<Transition<Self::State>> {
        let nobjs = self.nb_objectives;
        if label == 0 {
            return Some(Transition {
                state: state.clone(),
                weights: vec![0; nobjs],
            });
        }
        let j = var.id();
        if state[nobjs - 1] + self.a[j] > self.b {
            return None;
        }
        let mut weights = vec![0; nobjs];
        weights[0] = self.mu[j];
        if nobjs >= 2 {
            let acc = state[0] as f64;
            let grown = (state[0] + self.sigma_sq[j]) as f64;
            weights[1] = -(grown.sqrt() - acc.sqrt()) as isize;
        }
        if nobjs >= 3 {
            let acc = state[1] as f64;
            let grown = (state[1] + self.gamma_cube[j]) as f64;
            weights[2] = (grown.cbrt() - acc.cbrt()) as isize;
        }
        if nobjs >= 4 {
            let acc = state[2] as f64;
            let grown = (state[2] + self.beta_fourth[j]) as f64;
            weights[3] = -(grown.powf(0.25) - acc.powf(0.25)) as isize;
        }
        let mut next = state.clone();
        next[nobjs - 1] += self.a[j];
        if nobjs >= 2 {
            next[0] += self.sigma_sq[j];
        }
        if nobjs >= 3 {
            next[1] += self.gamma_cube[j];
        }
        if nobjs >= 4 {
            next[2] += self.beta_fourth[j];
        }
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
mod test_portfolio {
    use crate::*;

    fn sorted_points(frontier: &ParetoFrontier) -> Vec<Vec<isize>> {
        let mut points: Vec<Vec<isize>> = frontier.iter().map(|p| p.to_vec()).collect();
        points.sort();
        points
    }

    #[test]
    fn a_single_objective_portfolio_is_a_knapsack_on_returns() {
        let problem = Portfolio::new(
            1,
            vec![6, 10, 12],
            vec![],
            vec![],
            vec![],
            vec![1, 2, 3],
            5,
        );
        let dd = problem.generate_exact();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        // budget 5 fits assets {1, 2} for a return of 22
        assert_eq!(vec![vec![22]], sorted_points(&frontier));
    }

    #[test]
    fn the_risk_charge_depends_on_the_accumulated_variance() {
        let problem = Portfolio::new(
            2,
            vec![4, 4],
            vec![9, 16],
            vec![],
            vec![],
            vec![1, 1],
            2,
        );
        // taking asset 0 first charges -3 (sqrt 9); asset 1 on top charges
        // -(sqrt 25 - sqrt 9) = -2, so both assets cost -5 in total
        let dd = problem.generate_exact();
        let mut stats = SweepStats::default();
        let frontier = pareto_frontier_topdown(&dd, None, &mut stats);
        let points = sorted_points(&frontier);
        assert!(points.contains(&vec![8, -5]));
        assert!(points.contains(&vec![0, 0]));
    }

    #[test]
    fn all_three_sweep_modes_agree() {
        let problem = Portfolio::new(
            2,
            vec![5, 3, 8, 2],
            vec![4, 1, 9, 2],
            vec![],
            vec![],
            vec![2, 1, 3, 1],
            4,
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
