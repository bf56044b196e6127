// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable query result buffer.

/// Result buffer filled by every engine query.
///
/// Holds slots (indices into the engine's record arena), never addresses. Each query stamps
/// the buffer with the engine generation it ran against, so a reader can tell whether the
/// arena has been rebuilt since.
#[derive(Clone, Debug, Default)]
pub struct ResultBuffer {
    slots: Vec<usize>,
    generation: u64,
}

impl ResultBuffer {
    /// Create an empty buffer with no allocation.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: 0,
        }
    }

    /// Start a new query: drop previous matches, keep the allocation.
    pub fn begin(&mut self, generation: u64) {
        self.slots.clear();
        self.generation = generation;
    }

    /// Append a matched slot.
    #[inline]
    pub fn push(&mut self, slot: usize) {
        self.slots.push(slot);
    }

    /// Append a contiguous run of matched slots.
    #[inline]
    pub fn extend_range(&mut self, start: usize, end: usize) {
        self.slots.extend(start..end);
    }

    /// Drop matches and release the allocation.
    pub fn clear(&mut self) {
        self.slots = Vec::new();
        self.generation = 0;
    }

    /// Number of matched points.
    pub fn num_points(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots the buffer can hold without reallocating.
    pub fn num_allocated_points(&self) -> usize {
        self.slots.capacity()
    }

    /// Matched slots of the last query.
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Engine generation the buffer was last filled against.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
