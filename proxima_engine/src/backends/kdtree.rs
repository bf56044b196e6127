// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kd-tree backend generic over scalar `T: Scalar` and dimension `D`.
//!
//! Records are partitioned in place: every node owns a contiguous range of the arena, split at
//! the median of the node's widest axis until a range fits in a leaf. Node bounds prune every
//! query, and a node whose bounds are fully accepted contributes its whole range at once.

use core::cmp::Ordering;
use core::fmt::Debug;

use crate::engine::{Engine, EngineOptions, PeriodicStatus, periodic_extent};
use crate::metric::{
    dist_sq, max_dist_sq_to_bounds, min_dist_sq_to_bounds, min_periodic_dist_sq_to_bounds,
    periodic_dist_sq, radius_sq,
};
use crate::results::ResultBuffer;
use crate::types::{Bounds, Record, Scalar};

/// Kd-tree over an owned record arena.
pub struct KdTree<T: Scalar, const D: usize> {
    leaf_size: usize,
    records: Vec<Record<T, D>>,
    nodes: Vec<Node<T, D>>,
    root: Option<NodeIdx>,
    extent: Option<Bounds<T, D>>,
    generation: u64,
}

#[derive(Clone, Debug)]
struct Node<T, const D: usize> {
    bounds: Bounds<T, D>,
    start: usize,
    end: usize,
    children: Option<(NodeIdx, NodeIdx)>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

/// How a node's bounds relate to a query region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Coverage {
    Disjoint,
    Partial,
    Contained,
}

impl<T: Scalar, const D: usize> Debug for KdTree<T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KdTree")
            .field("dim", &D)
            .field("leaf_size", &self.leaf_size)
            .field("records", &self.records.len())
            .field("nodes", &self.nodes.len())
            .field("extent", &self.extent)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, const D: usize> KdTree<T, D> {
    /// Depth of the deepest leaf (0 for an empty tree).
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((i, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some((l, r)) = self.nodes[i.get()].children {
                stack.push((l, depth + 1));
                stack.push((r, depth + 1));
            }
        }
        deepest
    }

    fn build(&mut self) {
        self.nodes.clear();
        self.root = None;
        if !self.records.is_empty() {
            self.nodes
                .reserve(2 * self.records.len().div_ceil(self.leaf_size));
            self.root = Some(self.build_range(0, self.records.len()));
        }
        self.extent = self.root.map(|r| self.nodes[r.get()].bounds);
    }

    fn build_range(&mut self, start: usize, end: usize) -> NodeIdx {
        let bounds = Bounds::of_records(&self.records[start..end])
            .unwrap_or_else(|| Bounds::uniform(T::zero(), T::zero()));
        let idx = NodeIdx::new(self.nodes.len());
        self.nodes.push(Node {
            bounds,
            start,
            end,
            children: None,
        });
        let count = end - start;
        if count > self.leaf_size {
            let axis = bounds.widest_axis();
            let mid = count / 2;
            self.records[start..end].select_nth_unstable_by(mid, |a, b| {
                a.coords[axis]
                    .partial_cmp(&b.coords[axis])
                    .unwrap_or(Ordering::Equal)
            });
            let left = self.build_range(start, start + mid);
            let right = self.build_range(start + mid, end);
            self.nodes[idx.get()].children = Some((left, right));
        }
        idx
    }

    /// Collect slots of every record accepted by `accept`, pruning with `coverage`.
    fn collect(
        &self,
        results: &mut ResultBuffer,
        coverage: impl Fn(&Bounds<T, D>) -> Coverage,
        accept: impl Fn(&[T; D]) -> bool,
    ) {
        results.begin(self.generation);
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = &self.nodes[i.get()];
            match coverage(&n.bounds) {
                Coverage::Disjoint => {}
                Coverage::Contained => results.extend_range(n.start, n.end),
                Coverage::Partial => match n.children {
                    Some((l, r)) => {
                        stack.push(r);
                        stack.push(l);
                    }
                    None => {
                        for slot in n.start..n.end {
                            if accept(&self.records[slot].coords) {
                                results.push(slot);
                            }
                        }
                    }
                },
            }
        }
    }
}

impl<T: Scalar, const D: usize> Engine<T, D> for KdTree<T, D> {
    fn init(records: Vec<Record<T, D>>, options: &EngineOptions) -> Self {
        let mut tree = Self {
            leaf_size: options.leaf_size.max(1),
            records,
            nodes: Vec::new(),
            root: None,
            extent: None,
            generation: 1,
        };
        tree.build();
        tree
    }

    fn rebuild(&mut self, records: Option<Vec<Record<T, D>>>) {
        if let Some(records) = records {
            self.records = records;
        }
        self.build();
        self.generation += 1;
    }

    fn rebuild_boundaries(&mut self) {
        // Children always sit after their parent in the arena.
        for i in (0..self.nodes.len()).rev() {
            let n = &self.nodes[i];
            let bounds = match n.children {
                Some((l, r)) => self.nodes[l.get()]
                    .bounds
                    .union(&self.nodes[r.get()].bounds),
                None => Bounds::of_records(&self.records[n.start..n.end]).unwrap_or(n.bounds),
            };
            self.nodes[i].bounds = bounds;
        }
        self.extent = self.root.map(|r| self.nodes[r.get()].bounds);
    }

    fn set_minmax(&mut self, min: T, max: T) {
        self.extent = Some(Bounds::uniform(min, max));
    }

    fn records(&self) -> &[Record<T, D>] {
        &self.records
    }

    fn extent(&self) -> Option<&Bounds<T, D>> {
        self.extent.as_ref()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn find_sphere(&self, results: &mut ResultBuffer, center: &[T; D], r: T) {
        let Some(r2) = radius_sq(r) else {
            results.begin(self.generation);
            return;
        };
        self.collect(
            results,
            |b| {
                if min_dist_sq_to_bounds(center, b) > r2 {
                    Coverage::Disjoint
                } else if max_dist_sq_to_bounds(center, b) <= r2 {
                    Coverage::Contained
                } else {
                    Coverage::Partial
                }
            },
            |p| dist_sq(p, center) <= r2,
        );
    }

    fn find_sphere_periodic(
        &self,
        results: &mut ResultBuffer,
        center: &[T; D],
        r: T,
    ) -> PeriodicStatus {
        let Some(extent) = periodic_extent(self.extent.as_ref()) else {
            self.find_sphere(results, center, r);
            return PeriodicStatus::Unwrapped;
        };
        let Some(r2) = radius_sq(r) else {
            results.begin(self.generation);
            return PeriodicStatus::Wrapped;
        };
        self.collect(
            results,
            |b| {
                if min_periodic_dist_sq_to_bounds(center, b, &extent) > r2 {
                    Coverage::Disjoint
                } else {
                    Coverage::Partial
                }
            },
            |p| periodic_dist_sq(p, center, &extent) <= r2,
        );
        PeriodicStatus::Wrapped
    }

    fn find_inside_of_box(&self, results: &mut ResultBuffer, bounds: &Bounds<T, D>) {
        self.collect(
            results,
            |b| {
                if !bounds.intersects(b) {
                    Coverage::Disjoint
                } else if bounds.contains_bounds(b) {
                    Coverage::Contained
                } else {
                    Coverage::Partial
                }
            },
            |p| bounds.contains(p),
        );
    }

    fn find_outside_of_box(&self, results: &mut ResultBuffer, bounds: &Bounds<T, D>) {
        self.collect(
            results,
            |b| {
                if bounds.contains_bounds(b) {
                    Coverage::Disjoint
                } else if !bounds.intersects(b) {
                    Coverage::Contained
                } else {
                    Coverage::Partial
                }
            },
            |p| !bounds.contains(p),
        );
    }

    fn find_next_closest_distance(
        &self,
        results: &mut ResultBuffer,
        center: &[T; D],
    ) -> Option<T> {
        results.begin(self.generation);
        let root = self.root?;
        let mut best: Option<(usize, f64)> = None;
        let mut stack = vec![(root, 0.0)];
        while let Some((i, lower)) = stack.pop() {
            if let Some((_, b)) = best
                && lower >= b
            {
                continue;
            }
            let n = &self.nodes[i.get()];
            match n.children {
                Some((l, r)) => {
                    let dl = min_dist_sq_to_bounds(center, &self.nodes[l.get()].bounds);
                    let dr = min_dist_sq_to_bounds(center, &self.nodes[r.get()].bounds);
                    // Visit the closer child first.
                    if dl <= dr {
                        stack.push((r, dr));
                        stack.push((l, dl));
                    } else {
                        stack.push((l, dl));
                        stack.push((r, dr));
                    }
                }
                None => {
                    for slot in n.start..n.end {
                        let d2 = dist_sq(&self.records[slot].coords, center);
                        if best.map(|(_, b)| d2 < b).unwrap_or(true) {
                            best = Some((slot, d2));
                        }
                    }
                }
            }
        }
        let (slot, d2) = best?;
        results.push(slot);
        Some(T::narrow(d2.sqrt()))
    }
}
