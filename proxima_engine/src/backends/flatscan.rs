// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat arena backend with linear scans. Small and simple; the reference for other backends.

use core::fmt::Debug;

use crate::engine::{Engine, EngineOptions, PeriodicStatus, periodic_extent};
use crate::metric::{dist_sq, periodic_dist_sq, radius_sq};
use crate::results::ResultBuffer;
use crate::types::{Bounds, Record, Scalar};

/// Linear-scan backend.
pub struct FlatScan<T: Scalar, const D: usize> {
    records: Vec<Record<T, D>>,
    extent: Option<Bounds<T, D>>,
    generation: u64,
}

impl<T: Scalar, const D: usize> Debug for FlatScan<T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatScan")
            .field("dim", &D)
            .field("records", &self.records.len())
            .field("extent", &self.extent)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<T: Scalar, const D: usize> Engine<T, D> for FlatScan<T, D> {
    fn init(records: Vec<Record<T, D>>, _options: &EngineOptions) -> Self {
        let extent = Bounds::of_records(&records);
        Self {
            records,
            extent,
            generation: 1,
        }
    }

    fn rebuild(&mut self, records: Option<Vec<Record<T, D>>>) {
        if let Some(records) = records {
            self.records = records;
        }
        self.extent = Bounds::of_records(&self.records);
        self.generation += 1;
    }

    fn rebuild_boundaries(&mut self) {
        self.extent = Bounds::of_records(&self.records);
    }

    fn set_minmax(&mut self, min: T, max: T) {
        self.extent = Some(Bounds::uniform(min, max));
    }

    fn records(&self) -> &[Record<T, D>] {
        &self.records
    }

    fn extent(&self) -> Option<&Bounds<T, D>> {
        self.extent.as_ref()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn find_sphere(&self, results: &mut ResultBuffer, center: &[T; D], r: T) {
        results.begin(self.generation);
        let Some(r2) = radius_sq(r) else {
            return;
        };
        for (i, rec) in self.records.iter().enumerate() {
            if dist_sq(&rec.coords, center) <= r2 {
                results.push(i);
            }
        }
    }

    fn find_sphere_periodic(
        &self,
        results: &mut ResultBuffer,
        center: &[T; D],
        r: T,
    ) -> PeriodicStatus {
        let Some(extent) = periodic_extent(self.extent.as_ref()) else {
            self.find_sphere(results, center, r);
            return PeriodicStatus::Unwrapped;
        };
        results.begin(self.generation);
        let Some(r2) = radius_sq(r) else {
            return PeriodicStatus::Wrapped;
        };
        for (i, rec) in self.records.iter().enumerate() {
            if periodic_dist_sq(&rec.coords, center, &extent) <= r2 {
                results.push(i);
            }
        }
        PeriodicStatus::Wrapped
    }

    fn find_inside_of_box(&self, results: &mut ResultBuffer, bounds: &Bounds<T, D>) {
        results.begin(self.generation);
        for (i, rec) in self.records.iter().enumerate() {
            if bounds.contains(&rec.coords) {
                results.push(i);
            }
        }
    }

    fn find_outside_of_box(&self, results: &mut ResultBuffer, bounds: &Bounds<T, D>) {
        results.begin(self.generation);
        for (i, rec) in self.records.iter().enumerate() {
            if !bounds.contains(&rec.coords) {
                results.push(i);
            }
        }
    }

    fn find_next_closest_distance(
        &self,
        results: &mut ResultBuffer,
        center: &[T; D],
    ) -> Option<T> {
        results.begin(self.generation);
        let mut best: Option<(usize, f64)> = None;
        for (i, rec) in self.records.iter().enumerate() {
            let d2 = dist_sq(&rec.coords, center);
            if best.map(|(_, b)| d2 < b).unwrap_or(true) {
                best = Some((i, d2));
            }
        }
        let (slot, d2) = best?;
        results.push(slot);
        Some(T::narrow(d2.sqrt()))
    }
}
