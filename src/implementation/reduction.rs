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

//! This module provides the structural reduction of a compiled diagram:
//! the bottom-up merging of nodes that are provably interchangeable because
//! they have the same successor for every label. For a fixed variable order
//! this produces the canonical reduced diagram, and running it twice in a
//! row changes nothing.
//!
//! The equivalence key is the tuple of successor positions only; arc weights
//! are assumed to be determined by (layer, label) -- which holds for every
//! model whose one-arc weights are the per-layer objective coefficients.
//! A debug assertion verifies that assumption on every merge.

use fxhash::FxHashMap;

use crate::Diagram;

/// Reduces the diagram in place: within each layer, from the last-but-one up
/// to the root, nodes sharing the full tuple of successor positions are
/// merged onto one representative (every predecessor arc of a duplicate is
/// redirected to the representative), and nodes without any successor are
/// removed outright. One final pass rebuilds the predecessor lists from the
/// surviving arcs.
pub fn reduce(dd: &mut Diagram) {
    let nb_layers = dd.nb_layers();
    for l in (0..nb_layers - 1).rev() {
        let n = dd.layers[l].len();
        // old position -> representative old position (None: node is dropped)
        let mut rep: Vec<Option<usize>> = vec![None; n];
        let mut groups: FxHashMap<Vec<Option<usize>>, usize> = FxHashMap::default();
        for pos in 0..n {
            let node = &dd.layers[l][pos];
            if node.arcs.iter().all(|slot| slot.is_none()) {
                continue;
            }
            let key: Vec<Option<usize>> = node
                .arcs
                .iter()
                .map(|slot| slot.as_ref().map(|arc| arc.target))
                .collect();
            let kept = *groups.entry(key).or_insert(pos);
            debug_assert!(equivalent_arcs(dd, l, kept, pos));
            rep[pos] = Some(kept);
        }

        // compact the layer, keeping only the representatives
        let keep: Vec<bool> = (0..n).map(|pos| rep[pos] == Some(pos)).collect();
        let mut new_pos: Vec<Option<usize>> = vec![None; n];
        let mut next = 0;
        for pos in 0..n {
            if keep[pos] {
                new_pos[pos] = Some(next);
                next += 1;
            }
        }

        // redirect the arcs of the previous layer onto the representatives
        if l > 0 {
            for node in dd.layers[l - 1].iter_mut() {
                for slot in node.arcs.iter_mut() {
                    if let Some(arc) = slot {
                        match rep[arc.target].and_then(|r| new_pos[r]) {
                            Some(target) => arc.target = target,
                            None => *slot = None,
                        }
                    }
                }
            }
        }

        let mut pos = 0;
        dd.layers[l].retain(|_| {
            let kept = keep[pos];
            pos += 1;
            kept
        });
    }

    // predecessor lists were left stale on purpose: one single rebuild
    dd.update_incoming_arcsets();
}

/// Merged nodes must agree on their arcs, weights included (the equivalence
/// key only looks at the targets).
fn equivalent_arcs(dd: &Diagram, layer: usize, a: usize, b: usize) -> bool {
    let na = &dd.layers[layer][a];
    let nb = &dd.layers[layer][b];
    na.arcs.iter().zip(nb.arcs.iter()).all(|(x, y)| match (x, y) {
        (None, None) => true,
        (Some(x), Some(y)) => x.target == y.target && x.weights == y.weights,
        _ => false,
    })
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
