// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index configuration.

use core::fmt::{self, Display};

use proxima_engine::EngineOptions;

/// Spatial strategy behind an index.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    /// Median-split kd-tree.
    #[default]
    KdTree,
    /// Linear scan over the arena.
    FlatScan,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::KdTree => "kdtree",
            Self::FlatScan => "flat",
        })
    }
}

/// What to do when an engine variant cannot be built.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BuildFailurePolicy {
    /// Report [`Error::EngineBuild`](crate::Error::EngineBuild).
    #[default]
    Fatal,
    /// Fall back to any variant already published for the same dimension and precision,
    /// logging a warning; report the build error only if none exists.
    UseCached,
}

/// Configuration for opening an index.
///
/// ```
/// use proxima_index::{BackendKind, BuildFailurePolicy, IndexConfig};
///
/// let config = IndexConfig::default()
///     .with_backend(BackendKind::KdTree)
///     .with_leaf_size(32)
///     .with_build_failure_policy(BuildFailurePolicy::UseCached);
/// assert_eq!(config.leaf_size, 32);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Backend to specialize.
    pub backend: BackendKind,
    /// Maximum records per kd-tree leaf; must be positive for [`BackendKind::KdTree`].
    pub leaf_size: usize,
    /// Policy applied when the requested variant cannot be built.
    pub on_build_failure: BuildFailurePolicy,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            leaf_size: EngineOptions::default().leaf_size,
            on_build_failure: BuildFailurePolicy::default(),
        }
    }
}

impl IndexConfig {
    /// Select the backend.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the kd-tree leaf size.
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Set the build failure policy.
    pub fn with_build_failure_policy(mut self, policy: BuildFailurePolicy) -> Self {
        self.on_build_failure = policy;
        self
    }

    /// Leaf size as it participates in the engine key (zero for linear scans).
    pub(crate) fn effective_leaf_size(&self) -> usize {
        match self.backend {
            BackendKind::KdTree => self.leaf_size,
            BackendKind::FlatScan => 0,
        }
    }
}
