// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine trait: the call contract every spatial backend implements.

use core::fmt::Debug;

use crate::results::ResultBuffer;
use crate::types::{Bounds, Record, Scalar};

/// Build-time options shared by all backends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EngineOptions {
    /// Maximum number of records per kd-tree leaf. Ignored by linear-scan backends.
    pub leaf_size: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { leaf_size: 16 }
    }
}

/// Outcome of a periodic sphere query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeriodicStatus {
    /// Distances were wrapped with the engine extent.
    Wrapped,
    /// Some axis had no positive extent; the query ran without wraparound.
    Unwrapped,
}

/// Spatial engine over an owned arena of `D`-dimensional records.
///
/// Every query first calls [`ResultBuffer::begin`] with [`Engine::generation`], then pushes the
/// arena slots of the matching records. Slots are only meaningful until the next `rebuild`.
pub trait Engine<T: Scalar, const D: usize>: Debug + Send {
    /// Build the engine over `records`, taking ownership of the arena.
    fn init(records: Vec<Record<T, D>>, options: &EngineOptions) -> Self
    where
        Self: Sized;

    /// Replace the arena with `records`, or re-index the current arena if `None`.
    ///
    /// Bumps the generation and resets the extent to the tight bounds of the points.
    fn rebuild(&mut self, records: Option<Vec<Record<T, D>>>);

    /// Recompute bounding volumes from current point positions without changing structure.
    fn rebuild_boundaries(&mut self);

    /// Set the engine extent to `[min, max]` on every axis (used for periodic wraparound).
    fn set_minmax(&mut self, min: T, max: T);

    /// The record arena, in engine order.
    fn records(&self) -> &[Record<T, D>];

    /// Current extent, if any points or an explicit extent exist.
    fn extent(&self) -> Option<&Bounds<T, D>>;

    /// Counter bumped by every rebuild.
    fn generation(&self) -> u64;

    /// Records within Euclidean distance `r` of `center` (inclusive).
    fn find_sphere(&self, results: &mut ResultBuffer, center: &[T; D], r: T);

    /// Records within distance `r` of `center`, wrapping each axis over the engine extent.
    fn find_sphere_periodic(
        &self,
        results: &mut ResultBuffer,
        center: &[T; D],
        r: T,
    ) -> PeriodicStatus;

    /// Records whose every coordinate lies within `bounds`.
    fn find_inside_of_box(&self, results: &mut ResultBuffer, bounds: &Bounds<T, D>);

    /// Records with at least one coordinate outside `bounds`.
    fn find_outside_of_box(&self, results: &mut ResultBuffer, bounds: &Bounds<T, D>);

    /// Distance from `center` to the nearest record, or `None` for an empty arena.
    ///
    /// The slot of one nearest record is left in `results`; which one wins a tie is unspecified.
    fn find_next_closest_distance(&self, results: &mut ResultBuffer, center: &[T; D])
    -> Option<T>;
}

/// Periodic extent derived from engine bounds, or `None` if any axis is degenerate.
pub(crate) fn periodic_extent<T: Scalar, const D: usize>(
    bounds: Option<&Bounds<T, D>>,
) -> Option<[f64; D]> {
    let ext = bounds?.extent();
    ext.iter().all(|&e| e > 0.0).then_some(ext)
}
