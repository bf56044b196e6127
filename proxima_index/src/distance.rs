// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Standalone distance helpers that need no index.

use proxima_engine::Scalar;
use proxima_engine::metric::{dist_sq, periodic_dist_sq};

use crate::dataset::PointDataset;
use crate::error::{Error, Result};

fn same_len<T>(a: &[T], b: &[T]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

/// Euclidean distance between two points.
pub fn distance<T: Scalar>(a: &[T], b: &[T]) -> Result<T> {
    same_len(a, b)?;
    Ok(T::narrow(dist_sq(a, b).sqrt()))
}

/// Distance between two points in a cube of side `box_size`, taking the nearest periodic
/// image on each axis.
///
/// A non-positive `box_size` gives the plain Euclidean distance.
pub fn periodic_distance<T: Scalar>(a: &[T], b: &[T], box_size: T) -> Result<T> {
    same_len(a, b)?;
    let d2 = match wrap_extent(box_size, a.len()) {
        Some(extent) => periodic_dist_sq(a, b, &extent),
        None => dist_sq(a, b),
    };
    Ok(T::narrow(d2.sqrt()))
}

fn wrap_extent<T: Scalar>(box_size: T, dim: usize) -> Option<Vec<f64>> {
    let size = T::widen(box_size);
    (size > 0.0).then(|| vec![size; dim])
}

/// Distance from `center` to every point of `dataset`, in dataset order.
///
/// A positive `box_size` wraps each axis over `[0, box_size)`; `None` or a non-positive size
/// gives plain Euclidean distances.
pub fn distances<T: Scalar>(
    center: &[T],
    dataset: &PointDataset<T>,
    box_size: Option<T>,
) -> Result<Vec<T>> {
    if center.len() != dataset.dim() {
        return Err(Error::DimensionMismatch {
            expected: dataset.dim(),
            got: center.len(),
        });
    }
    let extent = box_size.and_then(|size| wrap_extent(size, center.len()));
    Ok(dataset
        .points()
        .map(|p| {
            let d2 = match &extent {
                Some(extent) => periodic_dist_sq(p, center, extent),
                None => dist_sq(p, center),
            };
            T::narrow(d2.sqrt())
        })
        .collect())
}
