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

//! This module provides the generic breadth-first compiler: the single piece
//! of code that turns any `Problem` into an exact layered decision diagram.
//!
//! The compilation proceeds layer by layer. Two state->node maps are kept,
//! one for the layer being expanded and one for the layer being built, and
//! they are swapped at every layer boundary. A successor state that is
//! already present in the next-layer map reuses the existing node: this is
//! the dynamic-programming state merging that keeps the diagram width
//! bounded, and it is decided by state hashing, never by identity.

use std::collections::hash_map::Entry;
use std::hash::Hash;

use fxhash::FxHashMap;
use log::debug;

use crate::{Diagram, Problem};

/// The pair of state->node maps that the compiler ping-pongs between: one
/// holds the layer currently being expanded, the other collects the layer
/// being built. Swapping them at each layer boundary recycles the buffers
/// instead of reallocating them.
struct StateBuffers<S> {
    current: FxHashMap<S, usize>,
    next: FxHashMap<S, usize>,
}

impl<S: Eq + Hash> StateBuffers<S> {
    fn new() -> Self {
        Self {
            current: FxHashMap::default(),
            next: FxHashMap::default(),
        }
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

/// Compiles the given problem into its exact decision diagram: one layer per
/// decision plus the terminal layer, a single root holding the initial state,
/// and a single terminal every last-layer transition collapses onto.
/// Infeasible transitions simply emit no arc (a node whose every transition
/// is infeasible ends up dangling and can be pruned afterwards).
pub fn compile_exact<P: Problem>(problem: &P) -> Diagram {
    let nb_vars = problem.nb_variables();
    assert!(nb_vars >= 1);
    let mut dd = Diagram::new(nb_vars + 1, problem.nb_labels(), problem.nb_objectives());
    let mut buffers = StateBuffers::new();

    let root = dd.add_node(0);
    let initial = problem.initial_state();
    let root_key = problem.dominance_key(&initial);
    dd.set_dom_key(0, root, root_key);
    buffers.current.insert(initial, root);

    let terminal = dd.add_node(nb_vars);

    for layer in 0..nb_vars {
        let var = problem.next_variable(layer, &mut buffers.current.keys());
        dd.set_var(layer, var);
        debug!("layer {}: {} states", layer, buffers.current.len());

        if layer < nb_vars - 1 {
            buffers.next.clear();
            for (state, src) in buffers.current.drain() {
                for label in 0..dd.nb_labels() {
                    if let Some(tr) = problem.transition(&state, layer, var, label) {
                        let dst = match buffers.next.entry(tr.state) {
                            Entry::Occupied(entry) => *entry.get(),
                            Entry::Vacant(entry) => {
                                let pos = dd.add_node(layer + 1);
                                let key = problem.dominance_key(entry.key());
                                dd.set_dom_key(layer + 1, pos, key);
                                entry.insert(pos);
                                pos
                            }
                        };
                        dd.add_arc_fast(layer, src, label, dst, tr.weights);
                    }
                }
            }
            buffers.swap();
        } else {
            // last layer: every successor collapses onto the terminal
            for (state, src) in buffers.current.drain() {
                for label in 0..dd.nb_labels() {
                    if let Some(tr) = problem.transition(&state, layer, var, label) {
                        dd.add_arc_fast(layer, src, label, terminal, tr.weights);
                    }
                }
            }
        }
    }

    dd.update_incoming_arcsets();
    dd
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
