// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proxima Index: scoped proximity queries over low-dimensional point sets.
//!
//! - [`PointDataset`]: validated `N × dim` coordinates (`f32` or `f64`) with per-point ids.
//! - [`specialize()`]: resolves `(dim, precision)` plus an [`IndexConfig`] to a compiled
//!   [`EngineVariant`], shared process-wide.
//! - [`IndexHandle`]: a built index, only reachable inside [`IndexHandle::scoped`].
//! - Queries: [`sphere`](IndexHandle::sphere), [`sphere_periodic`](IndexHandle::sphere_periodic),
//!   [`query_box`](IndexHandle::query_box), and
//!   [`nearest_distance`](IndexHandle::nearest_distance), decoded as selected by [`Output`].
//!
//! Supported dimensions are `2..=`[`MAX_DIM`].
//!
//! # Example
//!
//! ```rust
//! use proxima_index::{IndexHandle, Output, PointDataset};
//!
//! let points = PointDataset::from_points(&[
//!     [0.0_f64, 0.0, 0.0],
//!     [0.5, 0.0, 0.0],
//!     [4.0, 4.0, 4.0],
//! ])?;
//!
//! let (mut near, nearest) = IndexHandle::scoped(&points, |index| {
//!     let near = index.sphere(&[0.0, 0.0, 0.0], 1.0, Output::Ids)?.into_ids();
//!     let nearest = index.nearest_distance(&[4.0, 4.0, 3.0])?;
//!     Ok::<_, proxima_index::Error>((near.unwrap_or_default(), nearest))
//! })?;
//! near.sort();
//! assert_eq!(near, [0, 1]);
//! assert_eq!(nearest, Some(1.0));
//! # Ok::<(), proxima_index::Error>(())
//! ```
//!
//! ## Features
//!
//! - `kurbo`: build 2D datasets from `kurbo::Point`s.

mod config;
mod dataset;
mod decode;
mod distance;
mod error;
mod handle;
mod query;
mod specialize;

pub use proxima_engine::{Precision, Scalar};

pub use config::{BackendKind, BuildFailurePolicy, IndexConfig};
pub use dataset::PointDataset;
pub use decode::{Output, PointRef, QueryResult};
pub use distance::{distance, distances, periodic_distance};
pub use error::{Error, Result};
pub use handle::{HandleState, IndexHandle};
pub use specialize::{EngineKey, EngineVariant, MAX_DIM, registered_keys, specialize};
