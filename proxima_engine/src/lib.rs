// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proxima Engine: the spatial engine behind Proxima's proximity queries.
//!
//! An engine owns an arena of fixed-stride point records (`{ id: i64, coords: [T; D] }`) and
//! answers sphere, periodic sphere, box, and nearest-distance queries into a reusable
//! [`ResultBuffer`]. Results are slots (indices into the arena), never addresses.
//!
//! Engines are generic over the scalar `T` (`f32` or `f64`) and the dimension `D`, so every
//! `(dimension, precision)` variant is monomorphized at compile time. Higher layers
//! (see `proxima_index`) pick a variant at run time and decode results.
//!
//! Backends are pluggable via the [`Engine`] trait:
//!
//! - [`KdTree`] (default): median split on the widest axis, bounds pruning.
//! - [`FlatScan`]: linear scans; simplest, and the reference behavior for tests.
//!
//! # Example
//!
//! ```rust
//! use proxima_engine::{Engine, EngineOptions, KdTree, Record, ResultBuffer};
//!
//! let records = vec![
//!     Record::new(10, [0.0_f64, 0.0]),
//!     Record::new(11, [1.0, 0.0]),
//!     Record::new(12, [5.0, 5.0]),
//! ];
//! let tree = KdTree::init(records, &EngineOptions::default());
//! let mut results = ResultBuffer::new();
//! tree.find_sphere(&mut results, &[0.0, 0.0], 1.5);
//!
//! let mut ids: Vec<i64> = results
//!     .slots()
//!     .iter()
//!     .map(|&s| tree.records()[s].id)
//!     .collect();
//! ids.sort();
//! assert_eq!(ids, [10, 11]);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs in coordinates. Distances are accumulated in `f64` for both
//! precisions and compared as `dist² ≤ r²`.

pub mod backends;
pub mod engine;
pub mod metric;
pub mod results;
pub mod types;

pub use backends::flatscan::FlatScan;
pub use backends::kdtree::KdTree;
pub use engine::{Engine, EngineOptions, PeriodicStatus};
pub use results::ResultBuffer;
pub use types::{Bounds, Precision, Record, Scalar};
