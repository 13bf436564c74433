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

//! This module provides the layered decision diagram substrate: the graph of
//! nodes and weighted labeled arcs that the compiler builds, the reduction
//! and the dominance filters mutate, and the pareto sweeps traverse.
//!
//! The diagram is an arena: it owns every node, grouped by layer, and a node
//! is addressed by its `(layer, position)` pair. The position within the
//! layer vector *is* the node index, so reindexing after a structural change
//! boils down to compacting the layer vectors and remapping the stored arc
//! targets -- which is exactly what the bulk removal operations do.

use std::fmt;

use bit_set::BitSet;

use crate::{DomKey, Variable};

// ----------------------------------------------------------------------------
// --- ARC --------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One labeled arc of the diagram. The label is implicit (it is the slot the
/// arc occupies in its source node), the target is the index of a node in the
/// *next* layer, and the weight vector holds one entry per objective.
#[derive(Debug, Clone)]
pub struct Arc {
    /// Index of the target node within the next layer.
    pub target: usize,
    /// Objective weights carried by the arc.
    pub weights: Box<[isize]>,
}

// ----------------------------------------------------------------------------
// --- NODE -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One node of the diagram. A node holds at most one outgoing arc per label,
/// the reverse adjacency (the positions of its predecessors in the previous
/// layer, per label), and the optional dominance scratch recorded by the
/// compiler for the intra-layer filters.
#[derive(Debug, Clone)]
pub struct Node {
    /// Outgoing arcs, one optional slot per label.
    pub(crate) arcs: Vec<Option<Arc>>,
    /// Incoming adjacency: `preds[label]` lists the positions (in the
    /// previous layer) of the nodes reaching this one through `label`.
    pub(crate) preds: Vec<Vec<usize>>,
    /// Minimum cumulative weight over all root paths (knapsack dominance
    /// scratch; meaningless unless the model maintains it).
    pub min_weight: isize,
    /// Bitset dominance scratch: the still-selectable items (set packing) or
    /// the still-uncovered constraints (set covering).
    pub key_set: Option<BitSet>,
}

impl Node {
    fn new(nb_labels: usize) -> Self {
        Self {
            arcs: vec![None; nb_labels],
            preds: vec![vec![]; nb_labels],
            min_weight: 0,
            key_set: None,
        }
    }

    /// The outgoing arc labeled `label`, if any.
    pub fn arc(&self, label: usize) -> Option<&Arc> {
        self.arcs[label].as_ref()
    }

    /// The positions of the predecessors reaching this node through `label`.
    pub fn preds(&self, label: usize) -> &[usize] {
        &self.preds[label]
    }

    /// Number of outgoing arcs actually present.
    pub fn nb_outgoing_arcs(&self) -> usize {
        self.arcs.iter().filter(|arc| arc.is_some()).count()
    }

    /// Total number of incoming arcs, all labels together.
    pub fn nb_incoming_arcs(&self) -> usize {
        self.preds.iter().map(|list| list.len()).sum()
    }
}

// ----------------------------------------------------------------------------
// --- DIAGRAM ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The decision diagram in itself: an ordered sequence of layers, each owning
/// its nodes. Layer 0 holds the root at position 0; the last layer holds the
/// terminal at position 0 once the diagram is well formed.
#[derive(Debug, Clone)]
pub struct Diagram {
    /// Number of objectives of every arc weight vector.
    nb_objectives: usize,
    /// Number of arc labels (2 for a BDD, the domain size for an MDD).
    nb_labels: usize,
    /// The layers, each a vector of nodes.
    pub(crate) layers: Vec<Vec<Node>>,
    /// The variable branched on between layer `l` and layer `l + 1`.
    var_layer: Vec<Variable>,
}

impl Diagram {
    /// Creates an empty diagram with `nb_layers` layers.
    pub fn new(nb_layers: usize, nb_labels: usize, nb_objectives: usize) -> Self {
        assert!(nb_layers >= 2);
        assert!(nb_labels >= 1);
        Self {
            nb_objectives,
            nb_labels,
            layers: vec![vec![]; nb_layers],
            var_layer: (0..nb_layers - 1).map(Variable).collect(),
        }
    }

    /// Number of layers (number of decision variables + 1).
    pub fn nb_layers(&self) -> usize {
        self.layers.len()
    }

    /// Number of arc labels.
    pub fn nb_labels(&self) -> usize {
        self.nb_labels
    }

    /// Number of objectives carried on every arc.
    pub fn nb_objectives(&self) -> usize {
        self.nb_objectives
    }

    /// The variable branched on between layers `layer` and `layer + 1`.
    pub fn var(&self, layer: usize) -> Variable {
        self.var_layer[layer]
    }

    pub(crate) fn set_var(&mut self, layer: usize, var: Variable) {
        self.var_layer[layer] = var;
    }

    /// Appends a new node to the given layer and returns its position.
    pub fn add_node(&mut self, layer: usize) -> usize {
        let nb_labels = self.nb_labels;
        let nodes = &mut self.layers[layer];
        nodes.push(Node::new(nb_labels));
        nodes.len() - 1
    }

    /// The nodes of one layer.
    pub fn layer(&self, layer: usize) -> &[Node] {
        &self.layers[layer]
    }

    /// One node, addressed by its (layer, position) pair.
    pub fn node(&self, layer: usize, pos: usize) -> &Node {
        &self.layers[layer][pos]
    }

    pub(crate) fn node_mut(&mut self, layer: usize, pos: usize) -> &mut Node {
        &mut self.layers[layer][pos]
    }

    /// The root node (layer 0, position 0).
    pub fn get_root(&self) -> &Node {
        &self.layers[0][0]
    }

    /// The terminal node (last layer, position 0).
    pub fn get_terminal(&self) -> &Node {
        &self.layers[self.layers.len() - 1][0]
    }

    /// Records the dominance scratch of one node.
    pub(crate) fn set_dom_key(&mut self, layer: usize, pos: usize, key: DomKey) {
        let node = &mut self.layers[layer][pos];
        match key {
            DomKey::None => {}
            DomKey::Scalar(weight) => node.min_weight = weight,
            DomKey::Set(set) => node.key_set = Some(set),
        }
    }

    /// Adds (or overwrites) the arc labeled `label` from node `src` of layer
    /// `layer` to node `dst` of the next layer, maintaining the reverse
    /// adjacency of `dst`.
    pub fn add_arc(&mut self, layer: usize, src: usize, label: usize, dst: usize, weights: Vec<isize>) {
        self.add_arc_fast(layer, src, label, dst, weights);
        self.layers[layer + 1][dst].preds[label].push(src);
    }

    /// Same as `add_arc` but skips the reverse-adjacency bookkeeping. Used
    /// during bulk construction and reconciled afterwards by a single
    /// `update_incoming_arcsets` pass.
    pub fn add_arc_fast(&mut self, layer: usize, src: usize, label: usize, dst: usize, weights: Vec<isize>) {
        debug_assert!(layer + 1 < self.layers.len());
        debug_assert!(dst < self.layers[layer + 1].len());
        debug_assert!(label < self.nb_labels);
        debug_assert_eq!(weights.len(), self.nb_objectives);
        self.layers[layer][src].arcs[label] = Some(Arc {
            target: dst,
            weights: weights.into_boxed_slice(),
        });
    }

    /// Removes the arc labeled `label` leaving node `src` of layer `layer`,
    /// unhooking it from the target's reverse adjacency.
    pub fn remove_arc(&mut self, layer: usize, src: usize, label: usize) {
        if let Some(arc) = self.layers[layer][src].arcs[label].take() {
            let preds = &mut self.layers[layer + 1][arc.target].preds[label];
            if let Some(at) = preds.iter().position(|&p| p == src) {
                preds.swap_remove(at);
            }
        }
    }

    /// Unhooks a node from all its predecessors and successors, leaving an
    /// empty shell in its layer. The layer-list compaction is deferred to the
    /// caller (or to `remove_dangling_nodes`) so that bulk removals pay the
    /// reindexing cost only once.
    pub fn detach_node(&mut self, layer: usize, pos: usize) {
        for label in 0..self.nb_labels {
            let preds = std::mem::take(&mut self.layers[layer][pos].preds[label]);
            for p in preds {
                self.layers[layer - 1][p].arcs[label] = None;
            }
            if let Some(arc) = self.layers[layer][pos].arcs[label].take() {
                let preds = &mut self.layers[layer + 1][arc.target].preds[label];
                if let Some(at) = preds.iter().position(|&p| p == pos) {
                    preds.swap_remove(at);
                }
            }
        }
    }

    /// Rebuilds every node's predecessor lists from the outgoing arcs.
    pub fn update_incoming_arcsets(&mut self) {
        for layer in &mut self.layers {
            for node in layer.iter_mut() {
                for preds in node.preds.iter_mut() {
                    preds.clear();
                }
            }
        }
        for l in 0..self.layers.len() - 1 {
            let (head, tail) = self.layers.split_at_mut(l + 1);
            let current = &head[l];
            let next = &mut tail[0];
            for (pos, node) in current.iter().enumerate() {
                for (label, slot) in node.arcs.iter().enumerate() {
                    if let Some(arc) = slot {
                        next[arc.target].preds[label].push(pos);
                    }
                }
            }
        }
    }

    /// Removes every interior node from which the terminal is unreachable:
    /// a single backward sweep marks each node dead iff all its present
    /// outgoing arcs lead to dead nodes or it has none; dead interior nodes
    /// are then compacted away (the root and terminal layers are preserved
    /// unconditionally) and all arc targets remapped.
    pub fn remove_dangling_nodes(&mut self) {
        let last = self.layers.len() - 1;
        let mut alive: Vec<Vec<bool>> = self.layers.iter().map(|l| vec![false; l.len()]).collect();
        for a in alive[last].iter_mut() {
            *a = true;
        }
        for l in (0..last).rev() {
            for (pos, node) in self.layers[l].iter().enumerate() {
                alive[l][pos] = node
                    .arcs
                    .iter()
                    .flatten()
                    .any(|arc| alive[l + 1][arc.target]);
            }
        }
        // root and terminal survive no matter what
        for a in alive[0].iter_mut() {
            *a = true;
        }
        self.compact(&alive);
    }

    /// Drops the nodes whose keep flag is false, remaps every arc target
    /// accordingly (arcs to dropped nodes vanish), and rebuilds the
    /// predecessor lists.
    pub(crate) fn compact(&mut self, keep: &[Vec<bool>]) {
        let remap: Vec<Vec<Option<usize>>> = keep
            .iter()
            .map(|layer| {
                let mut next = 0;
                layer
                    .iter()
                    .map(|&kept| {
                        if kept {
                            next += 1;
                            Some(next - 1)
                        } else {
                            None
                        }
                    })
                    .collect()
            })
            .collect();
        for (l, layer) in self.layers.iter_mut().enumerate() {
            let mut pos = 0;
            layer.retain(|_| {
                let kept = keep[l][pos];
                pos += 1;
                kept
            });
        }
        for l in 0..self.layers.len() - 1 {
            for node in self.layers[l].iter_mut() {
                for slot in node.arcs.iter_mut() {
                    if let Some(arc) = slot {
                        match remap[l + 1][arc.target] {
                            Some(target) => arc.target = target,
                            None => *slot = None,
                        }
                    }
                }
            }
        }
        self.update_incoming_arcsets();
    }

    /// The width of the diagram (size of its largest layer).
    pub fn get_width(&self) -> usize {
        self.layers.iter().map(|l| l.len()).max().unwrap_or(0)
    }

    /// The total number of nodes of the diagram.
    pub fn get_num_nodes(&self) -> usize {
        self.layers.iter().map(|l| l.len()).sum()
    }

    /// Structural sanity check: arc targets are in bounds and the reverse
    /// adjacency mirrors the arcs exactly. Meant for tests and debugging.
    pub fn check_consistency(&self) -> bool {
        let last = self.layers.len() - 1;
        for l in 0..last {
            for (pos, node) in self.layers[l].iter().enumerate() {
                for (label, slot) in node.arcs.iter().enumerate() {
                    if let Some(arc) = slot {
                        if arc.target >= self.layers[l + 1].len() {
                            return false;
                        }
                        let mirrored = self.layers[l + 1][arc.target].preds[label]
                            .iter()
                            .filter(|&&p| p == pos)
                            .count();
                        if mirrored != 1 {
                            return false;
                        }
                    }
                }
            }
        }
        for l in 1..=last {
            for (pos, node) in self.layers[l].iter().enumerate() {
                for (label, preds) in node.preds.iter().enumerate() {
                    for &p in preds {
                        if p >= self.layers[l - 1].len() {
                            return false;
                        }
                        match &self.layers[l - 1][p].arcs[label] {
                            Some(arc) if arc.target == pos => {}
                            _ => return false,
                        }
                    }
                }
            }
        }
        true
    }
}

/// Prints the diagram layer by layer, one node per line with its outgoing
/// arcs and their weight vectors. Debugging aid for small diagrams.
impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (l, layer) in self.layers.iter().enumerate() {
            writeln!(f, "layer {l}")?;
            for (pos, node) in layer.iter().enumerate() {
                write!(f, "  {pos}")?;
                for (label, slot) in node.arcs.iter().enumerate() {
                    if let Some(arc) = slot {
                        write!(f, " --{label}--> {} {:?}", arc.target, arc.weights)?;
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_diagram {
    use crate::Diagram;

    /// Builds the little diamond used by most tests:
    /// root -> {a, b} -> terminal, all arcs carrying the given weight.
    fn diamond() -> Diagram {
        let mut dd = Diagram::new(3, 2, 1);
        let root = dd.add_node(0);
        let a = dd.add_node(1);
        let b = dd.add_node(1);
        let t = dd.add_node(2);
        dd.add_arc(0, root, 0, a, vec![0]);
        dd.add_arc(0, root, 1, b, vec![1]);
        dd.add_arc(1, a, 0, t, vec![0]);
        dd.add_arc(1, b, 0, t, vec![0]);
        dd
    }

    #[test]
    fn nodes_are_indexed_by_their_position_in_the_layer() {
        let mut dd = Diagram::new(3, 2, 1);
        assert_eq!(0, dd.add_node(1));
        assert_eq!(1, dd.add_node(1));
        assert_eq!(0, dd.add_node(0));
    }

    #[test]
    fn width_is_the_size_of_the_largest_layer() {
        let dd = diamond();
        assert_eq!(2, dd.get_width());
        assert_eq!(4, dd.get_num_nodes());
    }

    #[test]
    fn arcs_and_reverse_adjacency_stay_in_sync() {
        let dd = diamond();
        assert!(dd.check_consistency());
        assert_eq!(&[0][..], dd.node(1, 0).preds(0));
        assert_eq!(&[0][..], dd.node(1, 1).preds(1));
        assert_eq!(2, dd.get_terminal().nb_incoming_arcs());
    }

    #[test]
    fn fast_arcs_are_reconciled_by_update_incoming_arcsets() {
        let mut dd = Diagram::new(3, 2, 1);
        let root = dd.add_node(0);
        let a = dd.add_node(1);
        let t = dd.add_node(2);
        dd.add_arc_fast(0, root, 1, a, vec![3]);
        dd.add_arc_fast(1, a, 0, t, vec![0]);
        assert!(dd.node(1, a).preds(1).is_empty());
        dd.update_incoming_arcsets();
        assert!(dd.check_consistency());
        assert_eq!(&[root][..], dd.node(1, a).preds(1));
    }

    #[test]
    fn removing_an_arc_unhooks_the_reverse_adjacency() {
        let mut dd = diamond();
        dd.remove_arc(0, 0, 1);
        assert!(dd.node(0, 0).arc(1).is_none());
        assert!(dd.node(1, 1).preds(1).is_empty());
        assert!(dd.check_consistency());
    }

    #[test]
    fn disconnecting_an_interior_node_makes_it_dangling() {
        let mut dd = diamond();
        // node b of layer 1 loses its only outgoing arc
        dd.remove_arc(1, 1, 0);
        dd.remove_dangling_nodes();
        assert_eq!(1, dd.layer(0).len());
        assert_eq!(1, dd.layer(1).len());
        assert_eq!(1, dd.layer(2).len());
        assert!(dd.check_consistency());
        // the arc from the root to the removed node vanished with it
        assert!(dd.get_root().arc(1).is_none());
        assert!(dd.get_root().arc(0).is_some());
    }

    #[test]
    fn dangling_removal_propagates_to_nodes_left_without_successors() {
        // root -> a -> b -> terminal plus a direct root -> c -> terminal path
        let mut dd = Diagram::new(4, 2, 1);
        let root = dd.add_node(0);
        let a = dd.add_node(1);
        let c = dd.add_node(1);
        let b = dd.add_node(2);
        let d = dd.add_node(2);
        let t = dd.add_node(3);
        dd.add_arc(0, root, 0, a, vec![0]);
        dd.add_arc(0, root, 1, c, vec![0]);
        dd.add_arc(1, a, 0, b, vec![0]);
        dd.add_arc(1, c, 0, d, vec![0]);
        dd.add_arc(2, b, 0, t, vec![0]);
        dd.add_arc(2, d, 0, t, vec![0]);
        // cut b -> terminal: b dies, and a transitively follows
        dd.remove_arc(2, b, 0);
        dd.remove_dangling_nodes();
        assert_eq!(1, dd.layer(1).len());
        assert_eq!(1, dd.layer(2).len());
        assert_eq!(1, dd.layer(0).len());
        assert_eq!(1, dd.layer(3).len());
        assert!(dd.check_consistency());
    }

    #[test]
    fn display_mentions_every_layer_and_arc() {
        let text = diamond().to_string();
        assert!(text.contains("layer 0"));
        assert!(text.contains("layer 2"));
        assert!(text.contains("--1--> 1"));
    }

    #[test]
    fn detaching_a_node_leaves_an_unreferenced_shell() {
        let mut dd = diamond();
        dd.detach_node(1, 1);
        assert!(dd.get_root().arc(1).is_none());
        assert_eq!(1, dd.get_terminal().nb_incoming_arcs());
        assert_eq!(0, dd.node(1, 1).nb_outgoing_arcs());
        assert_eq!(0, dd.node(1, 1).nb_incoming_arcs());
        assert!(dd.check_consistency());
    }
}
