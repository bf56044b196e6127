// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compacted group labels.

/// Group label of every point, compacted to `0..num_groups`.
///
/// Groups are numbered in the order of the raw label that formed them, which is the ordinal of
/// the point that opened the group's surviving label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Groups {
    labels: Vec<usize>,
    num_groups: usize,
}

impl Groups {
    /// Compact arbitrary raw labels into `0..G`, preserving the order of the raw values.
    pub(crate) fn compact(raw: Vec<usize>) -> Self {
        let mut distinct = raw.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let labels = raw
            .iter()
            .map(|l| distinct.binary_search(l).unwrap_or_default())
            .collect();
        Self {
            labels,
            num_groups: distinct.len(),
        }
    }

    /// Label of each point, in dataset order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of distinct groups.
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// Number of labeled points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no points were labeled.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of points in each group, indexed by label.
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_groups];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }

    /// Ordinals of the points carrying `label`, ascending.
    pub fn members(&self, label: usize) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |&(_, &l)| l == label)
            .map(|(i, _)| i)
    }

    /// Take the label vector.
    pub fn into_labels(self) -> Vec<usize> {
        self.labels
    }
}
