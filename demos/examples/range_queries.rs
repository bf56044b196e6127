// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Range queries.
//!
//! Index a small 3D point set, run sphere, periodic sphere, box, and nearest-distance queries,
//! then rebuild over a different set of points.
//!
//! Run:
//! - `RUST_LOG=proxima_index=trace cargo run -p proxima_demos --example range_queries`

use proxima_index::{Error, IndexHandle, Output, PointDataset, QueryResult};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let points = PointDataset::from_points(&[
        [0.05_f64, 0.50, 0.50],
        [0.95, 0.50, 0.50],
        [0.50, 0.50, 0.50],
        [0.55, 0.52, 0.49],
        [0.20, 0.80, 0.10],
    ])?
    .with_ids(vec![100, 101, 102, 103, 104])?;

    IndexHandle::scoped(&points, |index| {
        println!("engine: {}", index.key());

        let near = index.sphere(&[0.5, 0.5, 0.5], 0.1, Output::Ids)?;
        println!("within 0.1 of the center: {near:?}");

        // Wrap over the unit cube: 0.05 and 0.95 are 0.1 apart across the x edge.
        index.set_boundaries(0.0, 1.0)?;
        let wrapped = index.query_radius(&[0.0, 0.5, 0.5], 0.1, true, Output::Ids)?;
        println!("periodic neighbors of the x edge: {wrapped:?}");
        assert_eq!(wrapped.len(), 2, "both edge points should wrap");

        if let QueryResult::Both(ids, coords) =
            index.query_box(&[0.4, 0.4, 0.4], &[0.6, 0.6, 0.6], true, Output::Both)?
        {
            for (id, c) in ids.iter().zip(coords) {
                println!("inside box: {id} at {c:?}");
            }
        }
        let outside = index.query_box(&[0.4, 0.4, 0.4], &[0.6, 0.6, 0.6], false, Output::Count)?;
        println!("outside box: {} points", outside.len());

        let d = index.nearest_distance(&[0.2, 0.8, 0.0])?;
        println!("nearest distance: {d:?}");

        index.rebuild(Some(&PointDataset::from_points(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]])?))?;
        println!("after rebuild: {} points", index.num_points()?);
        Ok(())
    })
}
