// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index handles and their scoped lifecycle.

use core::fmt::{self, Debug};
use std::sync::Arc;

use proxima_engine::{ResultBuffer, Scalar};
use tracing::debug;

use crate::config::IndexConfig;
use crate::dataset::PointDataset;
use crate::error::{Error, Result};
use crate::specialize::{DynEngine, EngineKey, EngineVariant, specialize};

/// Lifecycle state of an [`IndexHandle`].
///
/// The tree is built before the handle exists, so a handle starts out Open.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// Holding a tree and a result buffer.
    Open,
    /// Resources released; every further operation fails.
    Freed,
}

/// A built index bound to one engine variant.
///
/// Handles only exist inside [`IndexHandle::scoped`] and [`IndexHandle::scoped_with`], which
/// release the tree on every exit path. The handle owns a single result buffer that each query
/// overwrites, and decoded results borrow the handle, so a result cannot outlive the next
/// query, a rebuild, or a free.
pub struct IndexHandle<T: Scalar> {
    state: HandleState,
    variant: Arc<EngineVariant<T>>,
    dim: usize,
    tree: Option<Box<dyn DynEngine<T>>>,
    results: Option<ResultBuffer>,
}

impl<T: Scalar> Debug for IndexHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexHandle")
            .field("state", &self.state)
            .field("key", &self.variant.key())
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> IndexHandle<T> {
    /// Build an index over `dataset` with the default configuration and run `f` against it.
    ///
    /// See [`IndexHandle::scoped_with`].
    pub fn scoped<R, E, F>(dataset: &PointDataset<T>, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Self) -> Result<R, E>,
        E: From<Error>,
    {
        Self::scoped_with(dataset, &IndexConfig::default(), f)
    }

    /// Build an index over `dataset` and run `f` against it.
    ///
    /// The engine variant is resolved from the dataset's dimension and precision. The tree is
    /// freed when `f` returns, whether it succeeded or not; if `f` panics, dropping the handle
    /// frees it during unwinding. An error from `f` takes precedence over an error from the
    /// release.
    ///
    /// ```
    /// use proxima_index::{IndexHandle, Output, PointDataset};
    ///
    /// let points = PointDataset::from_points(&[[0.0_f64, 0.0], [3.0, 4.0]])?;
    /// let near = IndexHandle::scoped(&points, |index| {
    ///     let found = index.query_radius(&[0.0, 0.0], 5.0, false, Output::Ids)?;
    ///     Ok::<_, proxima_index::Error>(found.into_ids())
    /// })?;
    /// assert_eq!(near, Some(vec![0, 1]));
    /// # Ok::<(), proxima_index::Error>(())
    /// ```
    pub fn scoped_with<R, E, F>(
        dataset: &PointDataset<T>,
        config: &IndexConfig,
        f: F,
    ) -> Result<R, E>
    where
        F: FnOnce(&mut Self) -> Result<R, E>,
        E: From<Error>,
    {
        let mut handle = Self::open(dataset, config)?;
        let out = f(&mut handle);
        let released = handle.release();
        let value = out?;
        released?;
        Ok(value)
    }

    fn open(dataset: &PointDataset<T>, config: &IndexConfig) -> Result<Self> {
        let variant = specialize::<T>(dataset.dim(), config)?;
        let tree = variant.open(dataset)?;
        debug!(key = %variant.key(), points = dataset.len(), "index opened");
        Ok(Self {
            state: HandleState::Open,
            variant,
            dim: dataset.dim(),
            tree: Some(tree),
            results: Some(ResultBuffer::new()),
        })
    }

    /// Free on scope exit unless the caller already did.
    fn release(&mut self) -> Result<()> {
        if self.state == HandleState::Open {
            self.free()
        } else {
            Ok(())
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Dimension the handle is bound to.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Key of the bound engine variant.
    pub fn key(&self) -> EngineKey {
        self.variant.key()
    }

    /// Number of points in the arena.
    pub fn num_points(&self) -> Result<usize> {
        self.check_open("num_points")?;
        Ok(self.tree.as_ref().map_or(0, |t| t.arena_len()))
    }

    /// Number of result slots currently allocated.
    pub fn num_allocated_results(&self) -> Result<usize> {
        self.check_open("num_allocated_results")?;
        Ok(self
            .results
            .as_ref()
            .map_or(0, ResultBuffer::num_allocated_points))
    }

    /// Rebuild the tree, over `dataset` if given or over the current points otherwise.
    ///
    /// `dataset` may hold a different number of points but must match the bound dimension.
    pub fn rebuild(&mut self, dataset: Option<&PointDataset<T>>) -> Result<()> {
        if let Some(ds) = dataset
            && ds.dim() != self.dim
        {
            self.check_open("rebuild")?;
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: ds.dim(),
            });
        }
        let key = self.variant.key();
        let tree = self.tree_mut("rebuild")?;
        tree.rebuild(dataset)?;
        debug!(
            %key,
            points = tree.arena_len(),
            generation = tree.generation(),
            "index rebuilt"
        );
        Ok(())
    }

    /// Recompute bounding volumes from the current point positions.
    pub fn rebuild_boundaries(&mut self) -> Result<()> {
        self.tree_mut("rebuild_boundaries")?.rebuild_boundaries();
        Ok(())
    }

    /// Set the extent to `[min, max]` on every axis; periodic queries wrap over it.
    pub fn set_boundaries(&mut self, min: T, max: T) -> Result<()> {
        self.tree_mut("set_boundaries")?.set_minmax(min, max);
        Ok(())
    }

    /// Drop stored matches and release the result allocation.
    pub fn clear_results(&mut self) -> Result<()> {
        self.check_open("clear_results")?;
        if let Some(results) = self.results.as_mut() {
            results.clear();
        }
        Ok(())
    }

    /// Release the result buffer and the tree. A second call fails.
    pub fn free(&mut self) -> Result<()> {
        self.check_open("free")?;
        self.free_resources();
        Ok(())
    }

    fn free_resources(&mut self) {
        self.results = None;
        self.tree = None;
        self.state = HandleState::Freed;
        debug!(key = %self.variant.key(), "index freed");
    }

    fn check_open(&self, operation: &'static str) -> Result<()> {
        match self.state {
            HandleState::Open => Ok(()),
            HandleState::Freed => Err(Error::UseAfterFree { operation }),
        }
    }

    fn tree_mut(&mut self, operation: &'static str) -> Result<&mut dyn DynEngine<T>> {
        self.check_open(operation)?;
        match self.tree.as_deref_mut() {
            Some(tree) => Ok(tree),
            None => Err(Error::UseAfterFree { operation }),
        }
    }

    /// Tree and result buffer of an open handle.
    pub(crate) fn parts(
        &mut self,
        operation: &'static str,
    ) -> Result<(&dyn DynEngine<T>, &mut ResultBuffer)> {
        self.check_open(operation)?;
        match (self.tree.as_deref(), self.results.as_mut()) {
            (Some(tree), Some(results)) => Ok((tree, results)),
            _ => Err(Error::UseAfterFree { operation }),
        }
    }
}

impl<T: Scalar> Drop for IndexHandle<T> {
    fn drop(&mut self) {
        if self.state == HandleState::Open {
            self.free_resources();
        }
    }
}
