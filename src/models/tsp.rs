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

//! The multi-objective TSP model, compiled as a multi-valued diagram: the
//! arc label is the city visited next. The state is the set of visited
//! cities plus the last one; the first layer fixes city 0 as the start, and
//! the last layer closes the tour back to it. Distances are negated for the
//! maximization framing.

use bit_set::BitSet;

use crate::{compile_exact, Diagram, Problem, Transition, Variable};

/// The state of a partial tour.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TspState {
    /// Cities already visited.
    visited: BitSet,
    /// The city the tour currently stands on (`None` before the start).
    last: Option<usize>,
}

/// A multi-objective TSP instance. Minimization (distances are negated).
#[derive(Debug, Clone)]
pub struct Tsp {
    nb_cities: usize,
    /// Distance matrices, indexed `[objective][from][to]`.
    objs: Vec<Vec<Vec<isize>>>,
}

impl Tsp {
    pub fn new(nb_cities: usize, objs: Vec<Vec<Vec<isize>>>) -> Self {
        assert!(nb_cities >= 2);
        assert!(!objs.is_empty());
        assert!(objs
            .iter()
            .all(|m| m.len() == nb_cities && m.iter().all(|row| row.len() == nb_cities)));
        Self { nb_cities, objs }
    }

    /// Compiles the instance into its exact decision diagram.
    pub fn generate_exact(&self) -> Diagram {
        compile_exact(self)
    }

    fn leg_weights(&self, from: usize, to: usize) -> Vec<isize> {
        self.objs.iter().map(|m| -m[from][to]).collect()
    }
}

impl Problem for Tsp {
    type State = TspState;

    /// One decision fixing the start, one per remaining city, and one
    /// closing leg back to the start.
    fn nb_variables(&self) -> usize {
        self.nb_cities + 1
    }

    fn nb_objectives(&self) -> usize {
        self.objs.len()
    }

    fn nb_labels(&self) -> usize {
        self.nb_cities
    }

    fn initial_state(&self) -> Self::State {
        TspState {
            visited: BitSet::with_capacity(self.nb_cities),
            last: None,
        }
    }

    fn transition(
        &self,
        state: &Self::State,
        layer: usize,
        _var: Variable,
        label: usize,
    ) -> Option<Transition<Self::State>> {
        if layer == 0 {
            // the tour starts at city 0, at no cost
            if label != 0 {
                return None;
            }
            let mut visited = state.visited.clone();
            visited.insert(0);
            return Some(Transition {
                state: TspState {
                    visited,
                    last: Some(0),
                },
                weights: vec![0; self.nb_objectives()],
            });
        }
        let last = state.last.expect("a started tour has a current city");
        if layer == self.nb_cities {
            // closing leg back to the start
            if label != 0 {
                return None;
            }
            return Some(Transition {
                state: state.clone(),
                weights: self.leg_weights(last, 0),
            });
        }
        if state.visited.contains(label) {
            return None;
        }
        let mut visited = state.visited.clone();
        visited.insert(label);
        Some(Transition {
            state: TspState {
                visited,
                last: Some(label),
            },
            weights: self.leg_weights(last, label),
        })
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
