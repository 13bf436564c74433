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

//! The multi-objective set covering model.
//!
//! The state of a node is the set of constraints left to cover. Selecting a
//! variable clears every constraint containing it; skipping a variable is
//! only feasible while no uncovered constraint depends on it as its last
//! remaining chance. The state is additionally closed under *absorption*:
//! once every remaining variable of constraint `i` also appears in
//! constraint `k`, covering `i` necessarily covers `k`, so `k` can be
//! dropped from the state -- a preprocessing table computed per variable
//! makes that closure a handful of mask intersections.
//!
//! Set covering minimizes positive costs; the model negates them so the
//! engine can keep its maximization framing.

use bit_set::BitSet;

use crate::{compile_exact, Diagram, DomKey, Problem, Transition, Variable};

/// A multi-objective set covering instance: every constraint must contain
/// at least one selected variable. Minimization (coefficients are negated
/// on the arcs).
#[derive(Debug, Clone)]
pub struct SetCovering {
    nb_vars: usize,
    nb_cons: usize,
    /// Positive cost coefficients, indexed `[objective][variable]`.
    objs: Vec<Vec<isize>>,
    /// Absorption masks: when constraint `c` is still uncovered after
    /// branching variable `j`, intersecting the state with
    /// `clauses_var_cons[j][c]` drops every constraint it absorbs.
    clauses_var_cons: Vec<Vec<BitSet>>,
    /// Whether the absorption mask of (variable, constraint) clears
    /// anything at all.
    cons_needs_checking: Vec<Vec<bool>>,
    /// One-arc masks: clears every constraint containing the variable.
    mask_set_one: Vec<BitSet>,
    /// `last_cons[j]`: the constraints whose last remaining variable is `j`
    /// (skipping `j` while one of them is uncovered is infeasible).
    last_cons: Vec<BitSet>,
}

impl SetCovering {
    pub fn new(
        nb_vars: usize,
        nb_cons: usize,
        objs: Vec<Vec<isize>>,
        vars_cons: Vec<Vec<usize>>,
    ) -> Self {
        assert!(objs.iter().all(|row| row.len() == nb_vars));
        assert_eq!(vars_cons.len(), nb_cons);

        // constraints per variable
        let mut cons_var: Vec<Vec<usize>> = vec![vec![]; nb_vars];
        for (c, vars) in vars_cons.iter().enumerate() {
            for &v in vars {
                cons_var[v].push(c);
            }
        }

        // variables still in each constraint, progressively stripped of the
        // already-branched ones (the variable order is the input order)
        let mut vars_in_cons: Vec<BitSet> = vars_cons
            .iter()
            .map(|vars| vars.iter().copied().collect())
            .collect();

        let full: BitSet = (0..nb_cons).collect();
        let mut clauses_var_cons = vec![vec![]; nb_vars];
        let mut cons_needs_checking = vec![vec![]; nb_vars];
        for j in 0..nb_vars {
            for &c in &cons_var[j] {
                vars_in_cons[c].remove(j);
            }
            for i in 0..nb_cons {
                let mut mask = full.clone();
                for k in 0..nb_cons {
                    if k != i && vars_in_cons[i].is_subset(&vars_in_cons[k]) {
                        mask.remove(k);
                    }
                }
                cons_needs_checking[j].push(mask.len() < nb_cons);
                clauses_var_cons[j].push(mask);
            }
        }

        let mut mask_set_one: Vec<BitSet> = vec![full; nb_vars];
        for (j, mask) in mask_set_one.iter_mut().enumerate() {
            for &c in &cons_var[j] {
                mask.remove(c);
            }
        }

        let mut last_cons: Vec<BitSet> = vec![BitSet::with_capacity(nb_cons); nb_vars];
        for (c, vars) in vars_cons.iter().enumerate() {
            let last = *vars.iter().max().expect("a constraint without variables");
            last_cons[last].insert(c);
        }

        Self {
            nb_vars,
            nb_cons,
            objs,
            clauses_var_cons,
            cons_needs_checking,
            mask_set_one,
            last_cons,
        }
    }

    /// Compiles the instance into its exact decision diagram.
    pub fn generate_exact(&self) -> Diagram {
        compile_exact(self)
    }
}

impl Problem for SetCovering {
    type State = BitSet;

    fn nb_variables(&self) -> usize {
        self.nb_vars
    }

    fn nb_objectives(&self) -> usize {
        self.objs.len()
    }

    fn initial_state(&self) -> Self::State {
        (0..self.nb_cons).collect()
    }

    fn transition(
        &self,
        state: &Self::State,
        _layer: usize,
        var: Variable,
        label: usize,
    ) -> Option<Transition<Self::State>> {
        let j = var.id();
        if label == 1 {
            let mut next = state.clone();
            next.intersect_with(&self.mask_set_one[j]);
            Some(Transition {
                state: next,
                weights: self.objs.iter().map(|row| -row[j]).collect(),
            })
        } else {
            // an uncovered constraint whose last chance was j forbids skipping
            if !self.last_cons[j].is_disjoint(state) {
                return None;
            }
            let mut next = state.clone();
            for c in state.iter() {
                if self.cons_needs_checking[j][c] {
                    next.intersect_with(&self.clauses_var_cons[j][c]);
                }
            }
            Some(Transition {
                state: next,
                weights: vec![0; self.nb_objectives()],
            })
        }
    }

    fn dominance_key(&self, state: &Self::State) -> DomKey {
        DomKey::Set(state.clone())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
