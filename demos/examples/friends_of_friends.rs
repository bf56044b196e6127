// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Friends-of-Friends.
//!
//! Label three filaments in a periodic unit square. One filament crosses the x edge and is
//! only found whole when the box wraps.
//!
//! Run:
//! - `RUST_LOG=proxima_fof=debug cargo run -p proxima_demos --example friends_of_friends`

use kurbo::Point;
use proxima_fof::{FofError, FriendsOfFriends};
use proxima_index::PointDataset;
use tracing_subscriber::EnvFilter;

fn filament(from: Point, to: Point, n: usize) -> impl Iterator<Item = Point> {
    (0..n).map(move |i| from.lerp(to, i as f64 / (n - 1) as f64))
}

fn main() -> Result<(), FofError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let points: Vec<Point> = filament(Point::new(0.1, 0.1), Point::new(0.4, 0.4), 40)
        .chain(filament(Point::new(0.6, 0.2), Point::new(0.6, 0.8), 60))
        // Crosses x = 1 and continues at x = 0.
        .chain(filament(Point::new(0.85, 0.9), Point::new(0.99, 0.9), 15))
        .chain(filament(Point::new(0.0, 0.9), Point::new(0.15, 0.9), 15))
        .collect();
    let dataset = PointDataset::from_kurbo_points(&points)?;

    let fof = FriendsOfFriends::new(0.02);
    let plain = fof.run(&dataset)?;
    let wrapped = fof.with_periodic_box(1.0).run(&dataset)?;

    println!("open box:     {} groups, sizes {:?}", plain.num_groups(), plain.group_sizes());
    println!("periodic box: {} groups, sizes {:?}", wrapped.num_groups(), wrapped.group_sizes());
    assert_eq!(plain.num_groups(), 4, "the edge filament splits without wrapping");
    assert_eq!(wrapped.num_groups(), 3, "wrapping joins the edge filament");
    Ok(())
}
