// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by datasets, the specializer, and index handles.

use crate::specialize::EngineKey;

/// Errors raised by Proxima index operations.
///
/// Validation errors are raised at the point of detection. [`Error::UseAfterFree`] and
/// [`Error::Marshaling`] signal broken invariants and are never recovered internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input coordinates are not a well-formed `N × dim` array.
    #[error("malformed point input: {detail}")]
    Shape {
        /// What was wrong with the input.
        detail: String,
    },

    /// A dataset or query point does not match the dimension of the bound engine.
    #[error("dimension mismatch: engine is bound to dim {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension of the bound engine.
        expected: usize,
        /// Dimension supplied by the caller.
        got: usize,
    },

    /// An operation was issued on a freed handle, including a second `free`.
    #[error("`{operation}` called on a freed index handle")]
    UseAfterFree {
        /// The rejected operation.
        operation: &'static str,
    },

    /// A result buffer could not be mapped back onto the record arena.
    #[error("result buffer does not describe the bound arena: {detail}")]
    Marshaling {
        /// Which check failed.
        detail: String,
    },

    /// No engine variant could be produced for the key and no fallback was allowed.
    #[error("failed to build engine `{key}`: {reason}")]
    EngineBuild {
        /// The requested variant.
        key: EngineKey,
        /// Why the build failed.
        reason: String,
    },

    /// A published engine variant exists but cannot be used for this request.
    #[error("failed to load engine `{key}`: {reason}")]
    EngineLoad {
        /// The requested variant.
        key: EngineKey,
        /// Why loading failed.
        reason: String,
    },
}

impl Error {
    /// True for errors that signal a broken invariant rather than bad input.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UseAfterFree { .. } | Self::Marshaling { .. })
    }

    pub(crate) fn shape(detail: impl Into<String>) -> Self {
        Self::Shape {
            detail: detail.into(),
        }
    }

    pub(crate) fn marshaling(detail: impl Into<String>) -> Self {
        Self::Marshaling {
            detail: detail.into(),
        }
    }
}

/// Result alias used throughout this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
