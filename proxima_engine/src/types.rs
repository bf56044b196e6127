// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive point types and helpers.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Display};

/// Floating-point precision of an engine's point records.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precision {
    /// 32-bit coordinates.
    Single,
    /// 64-bit coordinates.
    Double,
}

impl Precision {
    /// Short tag used in engine names: `f32` or `f64`.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Single => "f32",
            Self::Double => "f64",
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Numeric scalar abstraction for point coordinates.
///
/// Distances are always accumulated in `f64` (the widened accumulator), so `f32` and `f64`
/// engines share one metric implementation and only differ in storage.
pub trait Scalar: Copy + PartialOrd + Debug + Default + Send + Sync + 'static {
    /// Precision tag for this scalar.
    const PRECISION: Precision;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Convert to the `f64` accumulator.
    fn widen(v: Self) -> f64;

    /// Convert an accumulator value back to the scalar (may round).
    fn narrow(v: f64) -> Self;
}

impl Scalar for f32 {
    const PRECISION: Precision = Precision::Single;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn widen(v: Self) -> f64 {
        f64::from(v)
    }

    #[inline]
    fn narrow(v: f64) -> Self {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Narrowing to single precision is the documented contract of `narrow`."
        )]
        let out = v as Self;
        out
    }
}

impl Scalar for f64 {
    const PRECISION: Precision = Precision::Double;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn widen(v: Self) -> f64 {
        v
    }

    #[inline]
    fn narrow(v: f64) -> Self {
        v
    }
}

/// A point record: a stored identifier followed by `D` coordinates.
///
/// The layout is `{ id: i64, coords: [T; D] }`, naturally aligned and contiguous in an arena.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Record<T, const D: usize> {
    /// Identifier assigned when the dataset was built.
    pub id: i64,
    /// Coordinates.
    pub coords: [T; D],
}

impl<T, const D: usize> Record<T, D> {
    /// Create a new record.
    pub const fn new(id: i64, coords: [T; D]) -> Self {
        Self { id, coords }
    }
}

/// Axis-aligned box in `D` dimensions, inclusive on both ends.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds<T, const D: usize> {
    /// Minimum corner.
    pub lo: [T; D],
    /// Maximum corner.
    pub hi: [T; D],
}

impl<T, const D: usize> Bounds<T, D> {
    /// Create a box from its corners.
    pub const fn new(lo: [T; D], hi: [T; D]) -> Self {
        Self { lo, hi }
    }
}

impl<T: Scalar, const D: usize> Bounds<T, D> {
    /// The same `[min, max]` interval on every axis.
    pub fn uniform(min: T, max: T) -> Self {
        Self {
            lo: [min; D],
            hi: [max; D],
        }
    }

    /// A degenerate box around a single point.
    pub fn point(p: &[T; D]) -> Self {
        Self { lo: *p, hi: *p }
    }

    /// Tight bounds of a set of records. Returns `None` if empty.
    pub fn of_records(records: &[Record<T, D>]) -> Option<Self> {
        let (first, rest) = records.split_first()?;
        let mut acc = Self::point(&first.coords);
        for r in rest {
            acc.extend(&r.coords);
        }
        Some(acc)
    }

    /// Grow the box to include `p`.
    pub fn extend(&mut self, p: &[T; D]) {
        for d in 0..D {
            self.lo[d] = min_t(self.lo[d], p[d]);
            self.hi[d] = max_t(self.hi[d], p[d]);
        }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        for d in 0..D {
            out.lo[d] = min_t(self.lo[d], other.lo[d]);
            out.hi[d] = max_t(self.hi[d], other.hi[d]);
        }
        out
    }

    /// Whether `p` lies inside the box on every axis (inclusive).
    pub fn contains(&self, p: &[T; D]) -> bool {
        (0..D).all(|d| le(self.lo[d], p[d]) && le(p[d], self.hi[d]))
    }

    /// Whether `other` lies entirely within this box.
    pub fn contains_bounds(&self, other: &Self) -> bool {
        (0..D).all(|d| le(self.lo[d], other.lo[d]) && le(other.hi[d], self.hi[d]))
    }

    /// Whether the two boxes share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        (0..D).all(|d| le(self.lo[d], other.hi[d]) && le(other.lo[d], self.hi[d]))
    }

    /// Per-axis extent `hi - lo`, widened.
    pub fn extent(&self) -> [f64; D] {
        let mut out = [0.0; D];
        for d in 0..D {
            out[d] = T::widen(self.hi[d]) - T::widen(self.lo[d]);
        }
        out
    }

    /// Index of the axis with the largest extent.
    pub fn widest_axis(&self) -> usize {
        let ext = self.extent();
        let mut best = 0;
        for d in 1..D {
            if ext[d] > ext[best] {
                best = d;
            }
        }
        best
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}
