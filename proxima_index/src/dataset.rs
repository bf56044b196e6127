// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point datasets: validated coordinates plus per-point identifiers.

use proxima_engine::{Precision, Record, Scalar};

use crate::error::{Error, Result};

/// An ordered set of `N` points of fixed dimension and precision.
///
/// Coordinates are stored row-major (`N × dim`). Identifiers default to ordinal positions
/// `0..N` and travel with each point into the engine, so query results report them rather
/// than the engine's internal order.
#[derive(Clone, Debug, PartialEq)]
pub struct PointDataset<T> {
    dim: usize,
    ids: Vec<i64>,
    coords: Vec<T>,
}

impl<T: Scalar> PointDataset<T> {
    /// Build from a flat row-major buffer and its `shape`, which must be `[N, dim]`.
    pub fn from_flat(coords: Vec<T>, shape: &[usize]) -> Result<Self> {
        let &[n, dim] = shape else {
            return Err(Error::shape(format!(
                "expected a rank-2 array, got rank {}",
                shape.len()
            )));
        };
        check_dim(dim)?;
        if n.checked_mul(dim) != Some(coords.len()) {
            return Err(Error::shape(format!(
                "shape [{n}, {dim}] does not match {} coordinates",
                coords.len()
            )));
        }
        Ok(Self {
            dim,
            ids: ordinal_ids(n)?,
            coords,
        })
    }

    /// Build from rows of equal length.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::shape("cannot infer a dimension from zero rows"));
        };
        let dim = first.as_ref().len();
        check_dim(dim)?;
        let mut coords = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(Error::shape(format!(
                    "row {i} has {} coordinates, expected {dim}",
                    row.len()
                )));
            }
            coords.extend_from_slice(row);
        }
        Ok(Self {
            dim,
            ids: ordinal_ids(rows.len())?,
            coords,
        })
    }

    /// Build from fixed-size points.
    pub fn from_points<const D: usize>(points: &[[T; D]]) -> Result<Self> {
        check_dim(D)?;
        Ok(Self {
            dim: D,
            ids: ordinal_ids(points.len())?,
            coords: points.iter().flatten().copied().collect(),
        })
    }

    /// Build from prepacked records, keeping their identifiers verbatim.
    pub fn from_records<const D: usize>(records: &[Record<T, D>]) -> Result<Self> {
        check_dim(D)?;
        Ok(Self {
            dim: D,
            ids: records.iter().map(|r| r.id).collect(),
            coords: records.iter().flat_map(|r| r.coords).collect(),
        })
    }

    /// Replace the identifiers with an explicit sequence of length `N`.
    pub fn with_ids(mut self, ids: Vec<i64>) -> Result<Self> {
        if ids.len() != self.len() {
            return Err(Error::shape(format!(
                "{} identifiers supplied for {} points",
                ids.len(),
                self.len()
            )));
        }
        self.ids = ids;
        Ok(self)
    }

    /// Reset identifiers to ordinal positions `0..N`.
    pub fn with_ordinal_ids(mut self) -> Result<Self> {
        self.ids = ordinal_ids(self.len())?;
        Ok(self)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the dataset holds no points.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Coordinates per point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Precision of the stored coordinates.
    pub fn precision(&self) -> Precision {
        T::PRECISION
    }

    /// Identifiers in point order.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    /// Flat row-major coordinates.
    pub fn coords(&self) -> &[T] {
        &self.coords
    }

    /// Coordinates of point `i`.
    pub fn point(&self, i: usize) -> Option<&[T]> {
        self.coords.chunks_exact(self.dim).nth(i)
    }

    /// Iterate over point coordinates in order.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        self.coords.chunks_exact(self.dim)
    }

    /// Pack into fixed-stride records for a `D`-dimensional engine.
    pub(crate) fn to_records<const D: usize>(&self) -> Result<Vec<Record<T, D>>> {
        if self.dim != D {
            return Err(Error::DimensionMismatch {
                expected: D,
                got: self.dim,
            });
        }
        let mut out = Vec::with_capacity(self.len());
        for (&id, row) in self.ids.iter().zip(self.coords.chunks_exact(D)) {
            let mut coords = [T::zero(); D];
            coords.copy_from_slice(row);
            out.push(Record::new(id, coords));
        }
        Ok(out)
    }
}

impl PointDataset<f32> {
    /// Widen to double precision, keeping identifiers.
    pub fn to_double(&self) -> PointDataset<f64> {
        PointDataset {
            dim: self.dim,
            ids: self.ids.clone(),
            coords: self.coords.iter().map(|&c| f64::from(c)).collect(),
        }
    }
}

#[cfg(feature = "kurbo")]
impl PointDataset<f64> {
    /// Pack 2D `kurbo` points.
    pub fn from_kurbo_points(points: &[kurbo::Point]) -> Result<Self> {
        Ok(Self {
            dim: 2,
            ids: ordinal_ids(points.len())?,
            coords: points.iter().flat_map(|p| [p.x, p.y]).collect(),
        })
    }
}

fn check_dim(dim: usize) -> Result<()> {
    if dim < 2 {
        return Err(Error::shape(format!(
            "trailing dimension must be at least 2, got {dim}"
        )));
    }
    Ok(())
}

fn ordinal_ids(n: usize) -> Result<Vec<i64>> {
    let n = i64::try_from(n).map_err(|_| Error::shape(format!("{n} points exceed the id range")))?;
    Ok((0..n).collect())
}
