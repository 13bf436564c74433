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

//! This module provides the pareto frontier: a mutable, dominance-pruned
//! collection of objective vectors. It is the value every propagation sweep
//! computes per node and ultimately returns for the whole diagram.
//!
//! Dominance is always framed as a maximization: a point `p` weakly dominates
//! `q` iff `p[o] >= q[o]` for every objective `o`. Minimization problems
//! negate their coefficients at the modeling layer, so the engine never needs
//! to know about objective senses.

use std::fmt;

/// A dominance-free set of objective vectors.
///
/// Points are stored back to back in one flat buffer with a stride of
/// `nb_objectives`, and logically removed points are tracked in a parallel
/// tombstone bitmap until the next compaction. The bitmap replaces the
/// "magic sentinel" style of lazy deletion: an objective value can never be
/// mistaken for a tombstone.
#[derive(Debug, Clone)]
pub struct ParetoFrontier {
    /// Number of objectives, i.e. length of each stored point.
    nb_objectives: usize,
    /// Flat array of points (stride = `nb_objectives`).
    sols: Vec<isize>,
    /// Tombstones: `dead[i]` marks point `i` as logically removed, pending
    /// the next call to `remove_dominated`.
    dead: Vec<bool>,
}

impl ParetoFrontier {
    /// Creates an empty frontier whose points all have `nb_objectives`
    /// coordinates.
    pub fn new(nb_objectives: usize) -> Self {
        assert!(nb_objectives > 0);
        Self {
            nb_objectives,
            sols: vec![],
            dead: vec![],
        }
    }

    /// The number of coordinates of every point of this frontier.
    pub fn nb_objectives(&self) -> usize {
        self.nb_objectives
    }

    /// The number of points currently stored (tombstoned points included
    /// until the next compaction).
    pub fn get_num_sols(&self) -> usize {
        self.sols.len() / self.nb_objectives
    }

    /// True iff the frontier holds no point at all.
    pub fn is_empty(&self) -> bool {
        self.sols.is_empty()
    }

    /// Forgets every point of this frontier (the buffers are kept, which is
    /// what makes recycling frontiers through a pool worthwhile).
    pub fn clear(&mut self) {
        self.sols.clear();
        self.dead.clear();
    }

    /// Pre-allocates room for `nb_points` points.
    pub fn reserve(&mut self, nb_points: usize) {
        self.sols.reserve(nb_points * self.nb_objectives);
        self.dead.reserve(nb_points);
    }

    /// Iterates over the live points of this frontier.
    pub fn iter(&self) -> impl Iterator<Item = &[isize]> + '_ {
        self.sols
            .chunks_exact(self.nb_objectives)
            .zip(self.dead.iter())
            .filter(|(_, dead)| !**dead)
            .map(|(point, _)| point)
    }

    /// Inserts one point, maintaining the dominance-free invariant: the point
    /// is discarded if some stored point weakly dominates it; otherwise it
    /// replaces the first stored point it weakly dominates and tombstones any
    /// further one, and is appended when it dominates none.
    pub fn add(&mut self, elem: &[isize]) {
        debug_assert_eq!(elem.len(), self.nb_objectives);
        let nobjs = self.nb_objectives;
        let mut must_add = true;
        let mut modified = false;
        for i in 0..self.dead.len() {
            if self.dead[i] {
                continue;
            }
            let (dominates, dominated) = self.compare_row(i, elem);
            if dominated {
                // the new point brings nothing: nothing needs to be done
                return;
            } else if dominates {
                if must_add {
                    // the point has not been stored yet: overwrite in place
                    self.sols[i * nobjs..(i + 1) * nobjs].copy_from_slice(elem);
                    must_add = false;
                } else {
                    self.dead[i] = true;
                    modified = true;
                }
            }
        }
        if must_add {
            self.sols.extend_from_slice(elem);
            self.dead.push(false);
        }
        if modified {
            self.remove_dominated();
        }
    }

    /// Merges another frontier into this one, with every incoming point
    /// shifted by `shift` (typically the weight vector of the arc being
    /// traversed). Incoming points are only compared against the points that
    /// were present when the merge started: the points of one frontier are
    /// mutually non-dominated, and they remain so under a common shift.
    pub fn merge(&mut self, other: &ParetoFrontier, shift: &[isize]) {
        debug_assert_eq!(self.nb_objectives, other.nb_objectives);
        debug_assert_eq!(shift.len(), self.nb_objectives);
        let nobjs = self.nb_objectives;
        // only the rows present at entry take part in the comparisons
        let end = self.dead.len();
        let mut aux = vec![0isize; nobjs];
        for j in 0..other.dead.len() {
            if other.dead[j] {
                continue;
            }
            for (o, aux_o) in aux.iter_mut().enumerate() {
                *aux_o = other.sols[j * nobjs + o] + shift[o];
            }
            let mut must_add = true;
            for i in 0..end {
                if self.dead[i] {
                    continue;
                }
                let (dominates, dominated) = self.compare_row(i, &aux);
                if dominated {
                    must_add = false;
                    break;
                } else if dominates {
                    if must_add {
                        self.sols[i * nobjs..(i + 1) * nobjs].copy_from_slice(&aux);
                        must_add = false;
                    } else {
                        self.dead[i] = true;
                    }
                }
            }
            if must_add {
                self.sols.extend_from_slice(&aux);
                self.dead.push(false);
            }
        }
        self.remove_dominated();
    }

    /// Convolutes two frontiers into this one: inserts the whole pairwise sum
    /// set `{a + b : a in fa, b in fb}`, dominance-filtered. Iterating the
    /// smaller frontier keeps the outer loop short.
    pub fn convolute(&mut self, fa: &ParetoFrontier, fb: &ParetoFrontier) {
        debug_assert_eq!(fa.nb_objectives, fb.nb_objectives);
        let (outer, inner) = if fa.get_num_sols() < fb.get_num_sols() {
            (fa, fb)
        } else {
            (fb, fa)
        };
        let mut point = vec![0isize; self.nb_objectives];
        for j in 0..outer.dead.len() {
            if outer.dead[j] {
                continue;
            }
            point.copy_from_slice(outer.point(j));
            self.merge(inner, &point);
        }
    }

    /// Compacts the frontier, dropping every tombstoned point.
    pub fn remove_dominated(&mut self) {
        if !self.dead.iter().any(|dead| *dead) {
            return;
        }
        let nobjs = self.nb_objectives;
        let mut live = 0;
        for row in 0..self.dead.len() {
            if !self.dead[row] {
                if live != row {
                    self.sols.copy_within(row * nobjs..(row + 1) * nobjs, live * nobjs);
                }
                live += 1;
            }
        }
        self.sols.truncate(live * nobjs);
        self.dead.clear();
        self.dead.resize(live, false);
    }

    /// The sum of every coordinate of every live point. A cheap scalar
    /// summary used by ordering heuristics.
    pub fn get_sum(&self) -> isize {
        self.iter().flatten().sum()
    }

    /// Checks the dominance-free invariant: no live point weakly dominates
    /// another. Meant for tests and debug assertions.
    pub fn check_consistency(&self) -> bool {
        let points: Vec<&[isize]> = self.iter().collect();
        for (i, p) in points.iter().enumerate() {
            for q in points.iter().skip(i + 1) {
                let dominates = p.iter().zip(q.iter()).all(|(a, b)| a >= b);
                let dominated = p.iter().zip(q.iter()).all(|(a, b)| a <= b);
                if dominates || dominated {
                    return false;
                }
            }
        }
        true
    }

    /// Compares the stored row `i` against `elem`; yields
    /// `(elem weakly dominates row, elem weakly dominated by row)`.
    #[inline]
    fn compare_row(&self, i: usize, elem: &[isize]) -> (bool, bool) {
        let nobjs = self.nb_objectives;
        let base = i * nobjs;
        let mut dominates = true;
        let mut dominated = true;
        for o in 0..nobjs {
            let cur = self.sols[base + o];
            dominates &= elem[o] >= cur;
            dominated &= elem[o] <= cur;
            if !(dominates || dominated) {
                break;
            }
        }
        (dominates, dominated)
    }

    // --- raw row access for the filters and relaxation policies -------------

    /// Total number of rows, tombstoned ones included.
    pub(crate) fn n_rows(&self) -> usize {
        self.dead.len()
    }

    /// The `i`-th row (which may be tombstoned).
    pub(crate) fn point(&self, i: usize) -> &[isize] {
        &self.sols[i * self.nb_objectives..(i + 1) * self.nb_objectives]
    }

    /// Whether the `i`-th row is still live.
    pub(crate) fn is_live(&self, i: usize) -> bool {
        !self.dead[i]
    }

    /// Tombstones the `i`-th row (compacted away by `remove_dominated`).
    pub(crate) fn mark_dead(&mut self, i: usize) {
        self.dead[i] = true;
    }

    /// Drops every row from `len` onwards. Only meaningful on a compacted
    /// frontier.
    pub(crate) fn truncate_rows(&mut self, len: usize) {
        if len < self.dead.len() {
            self.sols.truncate(len * self.nb_objectives);
            self.dead.truncate(len);
        }
    }

    /// Reorders the (compacted) rows by decreasing coordinate sum.
    pub(crate) fn sort_rows_by_sum_desc(&mut self) {
        let mut rows: Vec<Vec<isize>> = self.iter().map(|p| p.to_vec()).collect();
        rows.sort_by_key(|row| std::cmp::Reverse(row.iter().sum::<isize>()));
        self.sols.clear();
        self.dead.clear();
        for row in rows {
            self.sols.extend_from_slice(&row);
            self.dead.push(false);
        }
    }
}

/// Prints one point per line, as a parenthesized coordinate tuple.
impl fmt::Display for ParetoFrontier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for point in self.iter() {
            write!(f, "(")?;
            for (o, coord) in point.iter().enumerate() {
                if o > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{coord}")?;
            }
            writeln!(f, ")")?;
        }
        Ok(())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_frontier {
    use rand::prelude::*;

    use crate::ParetoFrontier;

    #[test]
    fn a_new_frontier_is_empty() {
        let f = ParetoFrontier::new(2);
        assert!(f.is_empty());
        assert_eq!(0, f.get_num_sols());
    }

    #[test]
    fn adding_a_dominated_point_is_a_noop() {
        let mut f = ParetoFrontier::new(2);
        f.add(&[5, 5]);
        f.add(&[3, 4]);
        assert_eq!(1, f.get_num_sols());
        assert_eq!(vec![&[5, 5][..]], f.iter().collect::<Vec<_>>());
    }

    #[test]
    fn adding_a_dominating_point_replaces_the_dominated_ones() {
        let mut f = ParetoFrontier::new(2);
        f.add(&[1, 4]);
        f.add(&[4, 1]);
        f.add(&[5, 5]); // dominates both
        assert_eq!(1, f.get_num_sols());
        assert_eq!(vec![&[5, 5][..]], f.iter().collect::<Vec<_>>());
    }

    #[test]
    fn adding_an_equal_point_is_a_noop() {
        let mut f = ParetoFrontier::new(2);
        f.add(&[2, 3]);
        f.add(&[2, 3]);
        assert_eq!(1, f.get_num_sols());
    }

    #[test]
    fn incomparable_points_coexist() {
        let mut f = ParetoFrontier::new(2);
        f.add(&[1, 4]);
        f.add(&[4, 1]);
        f.add(&[2, 2]);
        assert_eq!(3, f.get_num_sols());
        assert!(f.check_consistency());
    }

    #[test]
    fn the_frontier_remains_dominance_free_under_random_insertions() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut f = ParetoFrontier::new(3);
            for _ in 0..100 {
                let p = [
                    rng.gen_range(-20..20),
                    rng.gen_range(-20..20),
                    rng.gen_range(-20..20),
                ];
                f.add(&p);
            }
            assert!(f.check_consistency());
        }
    }

    #[test]
    fn merge_shifts_every_incoming_point() {
        let mut a = ParetoFrontier::new(2);
        a.add(&[0, 0]);
        let mut b = ParetoFrontier::new(2);
        b.add(&[1, 2]);
        b.add(&[2, 1]);
        a.merge(&b, &[10, 10]);
        let mut pts: Vec<Vec<isize>> = a.iter().map(|p| p.to_vec()).collect();
        pts.sort();
        assert_eq!(vec![vec![11, 12], vec![12, 11]], pts);
    }

    #[test]
    fn merge_agrees_with_the_bruteforce_reference() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let xs = random_points(&mut rng, 15);
            let ys = random_points(&mut rng, 15);
            let shift = [rng.gen_range(-5..5), rng.gen_range(-5..5)];

            let mut a = frontier_of(&xs);
            let b = frontier_of(&ys);

            let mut union: Vec<Vec<isize>> = a.iter().map(|p| p.to_vec()).collect();
            for p in b.iter() {
                union.push(vec![p[0] + shift[0], p[1] + shift[1]]);
            }
            let mut reference = bruteforce_closure(&union);
            reference.sort();

            a.merge(&b, &shift);
            let mut actual: Vec<Vec<isize>> = a.iter().map(|p| p.to_vec()).collect();
            actual.sort();

            assert_eq!(reference, actual);
            assert!(a.check_consistency());
        }
    }

    #[test]
    fn convolute_agrees_with_the_bruteforce_pairwise_sums() {
        let mut rng = StdRng::seed_from_u64(19);
        for _ in 0..100 {
            let xs = random_points(&mut rng, 20);
            let ys = random_points(&mut rng, 20);
            let a = frontier_of(&xs);
            let b = frontier_of(&ys);

            let mut conv = ParetoFrontier::new(2);
            conv.convolute(&a, &b);
            let mut actual: Vec<Vec<isize>> = conv.iter().map(|p| p.to_vec()).collect();
            actual.sort();

            let mut sums = vec![];
            for p in a.iter() {
                for q in b.iter() {
                    sums.push(vec![p[0] + q[0], p[1] + q[1]]);
                }
            }
            let mut reference = bruteforce_closure(&sums);
            reference.sort();

            assert_eq!(reference, actual);
            assert!(conv.check_consistency());
        }
    }

    #[test]
    fn convoluting_with_an_empty_frontier_yields_nothing() {
        let mut a = ParetoFrontier::new(2);
        a.add(&[1, 1]);
        let b = ParetoFrontier::new(2);
        let mut conv = ParetoFrontier::new(2);
        conv.convolute(&a, &b);
        assert!(conv.is_empty());
    }

    #[test]
    fn get_sum_totals_every_live_coordinate() {
        let mut f = ParetoFrontier::new(2);
        f.add(&[1, 4]);
        f.add(&[4, 1]);
        assert_eq!(10, f.get_sum());
    }

    #[test]
    fn clearing_forgets_everything() {
        let mut f = ParetoFrontier::new(2);
        f.add(&[1, 4]);
        f.clear();
        assert!(f.is_empty());
        f.add(&[0, 0]);
        assert_eq!(1, f.get_num_sols());
    }

    #[test]
    fn display_prints_one_point_per_line() {
        let mut f = ParetoFrontier::new(2);
        f.add(&[1, 4]);
        f.add(&[4, 1]);
        assert_eq!("(1,4)\n(4,1)\n", f.to_string());
    }

    #[test]
    fn compaction_drops_tombstoned_rows() {
        let mut f = ParetoFrontier::new(2);
        f.add(&[1, 4]);
        f.add(&[4, 1]);
        f.add(&[2, 2]);
        f.mark_dead(1);
        f.remove_dominated();
        assert_eq!(2, f.get_num_sols());
        let mut pts: Vec<Vec<isize>> = f.iter().map(|p| p.to_vec()).collect();
        pts.sort();
        assert_eq!(vec![vec![1, 4], vec![2, 2]], pts);
    }

    /// Reference dominance filter: keeps the points of `points` that no other
    /// point weakly dominates (duplicates collapse onto one representative).
    fn bruteforce_closure(points: &[Vec<isize>]) -> Vec<Vec<isize>> {
        let mut keep: Vec<Vec<isize>> = vec![];
        for p in points {
            if keep.contains(p) {
                continue;
            }
            let dominated = points
                .iter()
                .any(|q| q != p && q.iter().zip(p.iter()).all(|(a, b)| a >= b));
            if !dominated {
                keep.push(p.clone());
            }
        }
        keep
    }

    fn random_points(rng: &mut StdRng, n: usize) -> Vec<Vec<isize>> {
        (0..n)
            .map(|_| vec![rng.gen_range(-10..10), rng.gen_range(-10..10)])
            .collect()
    }

    fn frontier_of(points: &[Vec<isize>]) -> ParetoFrontier {
        let mut f = ParetoFrontier::new(2);
        for p in points {
            f.add(p);
        }
        f
    }
}
