// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proxima FoF: Friends-of-Friends clustering on top of Proxima range queries.
//!
//! Two points are friends when they lie within the linking length of each other; groups are
//! the connected components of that relation. The clusterer runs one range query per point
//! against a single shared index and merges labels as chains are discovered, so every point
//! reachable through a chain of friends ends up with the same label.
//!
//! ```rust
//! use proxima_fof::FriendsOfFriends;
//! use proxima_index::PointDataset;
//!
//! // A chain: the ends are 2.0 apart but linked through the middle point.
//! let points = PointDataset::from_points(&[[0.0_f64, 0.0], [1.0, 0.0], [2.0, 0.0], [9.0, 9.0]])?;
//! let groups = FriendsOfFriends::new(1.5).run(&points)?;
//! assert_eq!(groups.labels(), &[0, 0, 0, 1]);
//! assert_eq!(groups.num_groups(), 2);
//! # Ok::<(), proxima_fof::FofError>(())
//! ```

mod groups;

pub use groups::Groups;

use proxima_index::{Error, IndexConfig, IndexHandle, Output, PointDataset, Scalar};
use tracing::debug;

/// Errors raised by [`FriendsOfFriends::run`].
#[derive(Debug, thiserror::Error)]
pub enum FofError {
    /// The linking length is not a positive number.
    #[error("linking length must be positive, got {0}")]
    InvalidLinkingLength(f64),
    /// The periodic box size is not a positive number.
    #[error("periodic box size must be positive, got {0}")]
    InvalidBoxSize(f64),
    /// The underlying index failed.
    #[error(transparent)]
    Index(#[from] Error),
}

const UNASSIGNED: usize = usize::MAX;

/// Friends-of-Friends clusterer.
#[derive(Copy, Clone, Debug)]
pub struct FriendsOfFriends<T> {
    linking_length: T,
    periodic_box: Option<T>,
    config: IndexConfig,
}

impl<T: Scalar> FriendsOfFriends<T> {
    /// Clusterer linking points within `linking_length` of each other.
    pub fn new(linking_length: T) -> Self {
        Self {
            linking_length,
            periodic_box: None,
            config: IndexConfig::default(),
        }
    }

    /// Wrap every axis over `[0, size)`. Points are expected to lie inside the box.
    pub fn with_periodic_box(mut self, size: T) -> Self {
        self.periodic_box = Some(size);
        self
    }

    /// Index configuration used for the range queries.
    pub fn with_config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    /// Label every point of `dataset`.
    ///
    /// Identifiers carried by `dataset` are ignored; points are grouped by position and
    /// labels follow dataset order.
    pub fn run(&self, dataset: &PointDataset<T>) -> Result<Groups, FofError> {
        let ll = T::widen(self.linking_length);
        if ll.is_nan() || ll <= 0.0 {
            return Err(FofError::InvalidLinkingLength(ll));
        }
        if let Some(size) = self.periodic_box.map(T::widen)
            && (size.is_nan() || size <= 0.0)
        {
            return Err(FofError::InvalidBoxSize(size));
        }
        if dataset.is_empty() {
            return Ok(Groups::default());
        }

        let points = dataset.clone().with_ordinal_ids()?;
        let n = points.len();
        let periodic = self.periodic_box.is_some();
        let mut merges = 0_usize;

        let raw = IndexHandle::scoped_with(&points, &self.config, |index| {
            if let Some(size) = self.periodic_box {
                index.set_boundaries(T::zero(), size)?;
            }
            let mut labels = vec![UNASSIGNED; n];
            let mut friends: Vec<usize> = Vec::new();
            let mut seen: Vec<usize> = Vec::new();
            for (i, center) in points.points().enumerate() {
                let ids = index
                    .query_radius(center, self.linking_length, periodic, Output::Ids)?
                    .into_ids()
                    .unwrap_or_default();
                friends.clear();
                for id in ids {
                    friends.push(ordinal(id, n)?);
                }

                seen.clear();
                seen.extend(
                    friends
                        .iter()
                        .map(|&f| labels[f])
                        .filter(|&l| l != UNASSIGNED),
                );
                seen.sort_unstable();
                seen.dedup();

                if let &[only] = seen.as_slice() {
                    for &f in &friends {
                        labels[f] = only;
                    }
                    continue;
                }
                for &f in &friends {
                    labels[f] = i;
                }
                if !seen.is_empty() {
                    merges += 1;
                    for l in &mut labels {
                        if seen.binary_search(l).is_ok() {
                            *l = i;
                        }
                    }
                }
            }
            Ok::<_, FofError>(labels)
        })?;

        let groups = Groups::compact(raw);
        debug!(
            points = n,
            groups = groups.num_groups(),
            merges,
            periodic,
            "friends-of-friends complete"
        );
        Ok(groups)
    }
}

/// Map a query result id back to a point ordinal.
fn ordinal(id: i64, n: usize) -> Result<usize, Error> {
    usize::try_from(id)
        .ok()
        .filter(|&i| i < n)
        .ok_or_else(|| Error::Marshaling {
            detail: format!("id {id} is not an ordinal of {n} points"),
        })
}

/// Label `dataset` with Friends-of-Friends groups.
///
/// Shorthand for [`FriendsOfFriends`] with the default index configuration.
pub fn find_friends_of_friends<T: Scalar>(
    dataset: &PointDataset<T>,
    linking_length: T,
    periodic_box_size: Option<T>,
) -> Result<Groups, FofError> {
    let mut fof = FriendsOfFriends::new(linking_length);
    if let Some(size) = periodic_box_size {
        fof = fof.with_periodic_box(size);
    }
    fof.run(dataset)
}
