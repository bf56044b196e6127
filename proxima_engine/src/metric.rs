// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Euclidean and periodic (wraparound) metrics, accumulated in `f64`.
//!
//! Backends and brute-force helpers share these functions so that every path agrees on the
//! exact inclusion test `dist² ≤ r²`.

use crate::types::{Bounds, Scalar};

/// Squared Euclidean distance between two coordinate slices of equal length.
#[inline]
pub fn dist_sq<T: Scalar>(a: &[T], b: &[T]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "coordinate lengths must match");
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = T::widen(x) - T::widen(y);
            d * d
        })
        .sum()
}

/// Squared search radius, or `None` when `r` is negative or NaN and nothing can match.
#[inline]
pub fn radius_sq<T: Scalar>(r: T) -> Option<f64> {
    let r = T::widen(r);
    if r.is_nan() || r < 0.0 {
        None
    } else {
        Some(r * r)
    }
}

/// Fold a raw per-axis delta into `[-extent/2, extent/2]` by one period.
///
/// A delta whose magnitude exceeds half the extent has the full extent subtracted or added.
#[inline]
pub fn wrap_delta(delta: f64, extent: f64) -> f64 {
    let half = extent * 0.5;
    if delta > half {
        delta - extent
    } else if delta < -half {
        delta + extent
    } else {
        delta
    }
}

/// Squared distance with per-axis wraparound over `extent`.
#[inline]
pub fn periodic_dist_sq<T: Scalar>(a: &[T], b: &[T], extent: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "coordinate lengths must match");
    debug_assert_eq!(a.len(), extent.len(), "extent must cover every axis");
    a.iter()
        .zip(b)
        .zip(extent)
        .map(|((&x, &y), &e)| {
            let d = wrap_delta(T::widen(x) - T::widen(y), e);
            d * d
        })
        .sum()
}

/// Smallest magnitude in the delta interval `[lo, hi]` (zero if it straddles zero).
#[inline]
fn abs_min(lo: f64, hi: f64) -> f64 {
    if lo > 0.0 {
        lo
    } else if hi < 0.0 {
        -hi
    } else {
        0.0
    }
}

// Bounds helpers form deltas as `bound - center`, the same operation order the point
// metrics use, so rounding can never make a bound disagree with a contained point.

/// Lower bound of the squared distance from `c` to any point of `b`.
pub fn min_dist_sq_to_bounds<T: Scalar, const D: usize>(c: &[T; D], b: &Bounds<T, D>) -> f64 {
    let mut acc = 0.0;
    for d in 0..D {
        let cd = T::widen(c[d]);
        let g = abs_min(T::widen(b.lo[d]) - cd, T::widen(b.hi[d]) - cd);
        acc += g * g;
    }
    acc
}

/// Upper bound of the squared distance from `c` to any point of `b`.
pub fn max_dist_sq_to_bounds<T: Scalar, const D: usize>(c: &[T; D], b: &Bounds<T, D>) -> f64 {
    let mut acc = 0.0;
    for d in 0..D {
        let cd = T::widen(c[d]);
        let far = (T::widen(b.lo[d]) - cd)
            .abs()
            .max((T::widen(b.hi[d]) - cd).abs());
        acc += far * far;
    }
    acc
}

/// Lower bound of the wrapped squared distance from `c` to any point of `b`.
///
/// A wrapped delta is the raw delta shifted by at most one period, so each axis takes the
/// smallest magnitude over the raw delta interval and its two shifted images.
pub fn min_periodic_dist_sq_to_bounds<T: Scalar, const D: usize>(
    c: &[T; D],
    b: &Bounds<T, D>,
    extent: &[f64; D],
) -> f64 {
    let mut acc = 0.0;
    for d in 0..D {
        let cd = T::widen(c[d]);
        let (lo, hi, e) = (T::widen(b.lo[d]) - cd, T::widen(b.hi[d]) - cd, extent[d]);
        let g = abs_min(lo, hi)
            .min(abs_min(lo - e, hi - e))
            .min(abs_min(lo + e, hi + e));
        acc += g * g;
    }
    acc
}
