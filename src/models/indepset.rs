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

//! The multi-objective (maximum weighted) independent set model.
//!
//! The state of a node is the set of vertices that may still be selected.
//! Selecting a vertex removes it and its whole neighborhood from the set;
//! skipping it removes the vertex alone. The variable order is dynamic: each
//! layer branches on the vertex occurring in the fewest live states, which
//! empirically keeps the layers narrow.

use std::cell::RefCell;

use bit_set::BitSet;

use crate::{compile_exact, Diagram, DomKey, Problem, Transition, Variable};

// ----------------------------------------------------------------------------
// --- GRAPH ------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A simple undirected graph over vertices `0..n_vertices`, stored as
/// adjacency bitsets.
#[derive(Debug, Clone)]
pub struct Graph {
    n_vertices: usize,
    n_edges: usize,
    adj: Vec<BitSet>,
}

impl Graph {
    pub fn new(n_vertices: usize) -> Self {
        assert!(n_vertices >= 1);
        Self {
            n_vertices,
            n_edges: 0,
            adj: vec![BitSet::with_capacity(n_vertices); n_vertices],
        }
    }

    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    pub fn n_edges(&self) -> usize {
        self.n_edges
    }

    /// Adds the undirected edge {v, w}; re-adding an edge is a no-op.
    pub fn add_edge(&mut self, v: usize, w: usize) {
        assert!(v != w);
        if self.adj[v].insert(w) {
            self.adj[w].insert(v);
            self.n_edges += 1;
        }
    }

    pub fn is_adj(&self, v: usize, w: usize) -> bool {
        self.adj[v].contains(w)
    }
}

// ----------------------------------------------------------------------------
// --- INDEPENDENT SET --------------------------------------------------------
// ----------------------------------------------------------------------------
/// A multi-objective independent set instance over a simple undirected
/// graph. Maximization: vertex weights are taken as-is.
#[derive(Debug)]
pub struct IndepSet {
    nb_vertices: usize,
    /// Vertex weights, indexed `[objective][vertex]`.
    objs: Vec<Vec<isize>>,
    /// Complement adjacency masks: `adj_compl[v]` has a bit for every
    /// vertex that is neither `v` nor one of its neighbors.
    adj_compl: Vec<BitSet>,
    /// Vertices not yet branched on, mutated by the ordering heuristic.
    active: RefCell<Vec<usize>>,
    /// Occurrence-count scratch of the ordering heuristic.
    counts: RefCell<Vec<usize>>,
}

impl IndepSet {
    pub fn new(graph: &Graph, objs: Vec<Vec<isize>>) -> Self {
        let nb_vertices = graph.n_vertices();
        assert!(objs.iter().all(|row| row.len() == nb_vertices));
        let mut adj_compl: Vec<BitSet> =
            vec![(0..nb_vertices).collect(); nb_vertices];
        // a vertex is considered adjacent to itself
        for (v, mask) in adj_compl.iter_mut().enumerate() {
            mask.remove(v);
            for w in graph.adj[v].iter() {
                mask.remove(w);
            }
        }
        Self {
            nb_vertices,
            objs,
            adj_compl,
            active: RefCell::new(vec![]),
            counts: RefCell::new(vec![]),
        }
    }

    /// Convenience constructor from an explicit edge list.
    pub fn from_edges(nb_vertices: usize, objs: Vec<Vec<isize>>, edges: &[(usize, usize)]) -> Self {
        let mut graph = Graph::new(nb_vertices);
        for &(v, w) in edges {
            graph.add_edge(v, w);
        }
        Self::new(&graph, objs)
    }

    /// Compiles the instance into its exact decision diagram.
    pub fn generate_exact(&self) -> Diagram {
        compile_exact(self)
    }
}

impl Problem for IndepSet {
    type State = BitSet;

    fn nb_variables(&self) -> usize {
        self.nb_vertices
    }

    fn nb_objectives(&self) -> usize {
        self.objs.len()
    }

    fn initial_state(&self) -> Self::State {
        (0..self.nb_vertices).collect()
    }

    /// Branches on the still-active vertex occurring in the fewest states of
    /// the layer, breaking ties by smallest index.
    fn next_variable(
        &self,
        layer: usize,
        states: &mut dyn Iterator<Item = &Self::State>,
    ) -> Variable {
        let mut active = self.active.borrow_mut();
        if layer == 0 {
            *active = (0..self.nb_vertices).collect();
        }
        let mut counts = self.counts.borrow_mut();
        counts.clear();
        counts.resize(self.nb_vertices, 0);
        for state in states {
            for v in state.iter() {
                counts[v] += 1;
            }
        }
        // fewest occurrences first, smallest vertex on ties
        let mut best = 0;
        for at in 1..active.len() {
            if (counts[active[at]], active[at]) < (counts[active[best]], active[best]) {
                best = at;
            }
        }
        let vertex = active.swap_remove(best);
        Variable(vertex)
    }

    fn transition(
        &self,
        state: &Self::State,
        _layer: usize,
        var: Variable,
        label: usize,
    ) -> Option<Transition<Self::State>> {
        let vertex = var.id();
        if label == 0 {
            let mut next = state.clone();
            next.remove(vertex);
            Some(Transition {
                state: next,
                weights: vec![0; self.nb_objectives()],
            })
        } else if state.contains(vertex) {
            let mut next = state.clone();
            next.remove(vertex);
            next.intersect_with(&self.adj_compl[vertex]);
            Some(Transition {
                state: next,
                weights: self.objs.iter().map(|row| row[vertex]).collect(),
            })
        } else {
            None
        }
    }

    fn dominance_key(&self, state: &Self::State) -> DomKey {
        DomKey::Set(state.clone())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
