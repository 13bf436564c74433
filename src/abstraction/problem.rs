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

//! This module defines the `Problem` abstraction: the sole contract a problem
//! family must fulfill for the generic compiler to turn it into a layered
//! decision diagram. When that contract is seen as a labeled transition
//! system, one diagram layer materializes one application of the transition
//! function to every reachable state.

use std::hash::Hash;

use crate::{DomKey, Variable};

/// The outcome of one feasible application of the transition function: the
/// successor state, along with the vector of objective weights (one entry
/// per objective) carried by the corresponding arc.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transition<S> {
    /// The state reached when the decision labeled by the arc is made.
    pub state: S,
    /// The objective weights of the arc. The propagation engine is always
    /// framed as a maximization: minimization problems negate their
    /// coefficients here, in the model, never in the engine.
    pub weights: Vec<isize>,
}

/// This trait defines the "contract" of what defines an optimization problem
/// compilable into an exact decision diagram. An implementation of this trait
/// effectively defines a DP formulation of the problem being solved.
///
/// The compiler is completely generic over this trait: the five problem
/// families shipped in `modd::models` are nothing but implementations of it,
/// and clients may add their own without touching the engine.
pub trait Problem {
    /// The DP model of the problem manipulates a state which is user-defined.
    /// Any type implementing Problem must thus specify the type of its state.
    /// States are deduplicated within a layer through hashing, never through
    /// identity, which is what keeps the diagram width bounded.
    type State: Eq + Hash + Clone;

    /// Any problem bears on a number of variables $x_0, x_1, ..., x_{n-1}$.
    /// This method returns the value of the number $n$. The compiled diagram
    /// has $n + 1$ layers.
    fn nb_variables(&self) -> usize;

    /// The number of objectives of the problem; this is the length of every
    /// arc weight vector and of every pareto frontier point.
    fn nb_objectives(&self) -> usize;

    /// The number of arc labels of the diagram: 2 for a binary (BDD) model,
    /// or the domain size for a multi-valued (MDD) model.
    fn nb_labels(&self) -> usize {
        2
    }

    /// This method returns the initial state of the problem (the state of
    /// the root node).
    fn initial_state(&self) -> Self::State;

    /// The transition function. Given a `state` sitting in layer `layer`,
    /// applies the decision `[[ var = label ]]` and yields the successor
    /// state along with the arc weight vector, or `None` when the decision
    /// is infeasible (in which case no arc is emitted at all -- this is the
    /// normal data-driven branch, not an error).
    fn transition(
        &self,
        state: &Self::State,
        layer: usize,
        var: Variable,
        label: usize,
    ) -> Option<Transition<Self::State>>;

    /// The variable branched on at the given layer. The states constitutive
    /// of the layer are made accessible to this method as an iterator so that
    /// a problem may implement a dynamic ordering heuristic (e.g. pick the
    /// variable occurring in the fewest live states). The default is the
    /// natural input order.
    fn next_variable(
        &self,
        layer: usize,
        _states: &mut dyn Iterator<Item = &Self::State>,
    ) -> Variable {
        Variable(layer)
    }

    /// The dominance key recorded on the node standing for `state`, used by
    /// the intra-layer dominance filters. Only problems that enable such a
    /// filter need to return something other than `DomKey::None`.
    fn dominance_key(&self, _state: &Self::State) -> DomKey {
        DomKey::None
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
