// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations of [`Engine`](crate::Engine).
//!
//! - `kdtree`: median-split kd-tree with bounds pruning (the default).
//! - `flatscan`: flat arena with linear scans (small, simple, the reference behavior).
//!
//! Both backends share the metric code in [`metric`](crate::metric), so for the same arena they
//! return the same set of records for every query; only the order of slots may differ.

pub mod flatscan;
pub mod kdtree;
