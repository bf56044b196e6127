// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Queries on an open [`IndexHandle`].

use proxima_engine::{PeriodicStatus, Scalar};
use tracing::trace;

use crate::decode::{Output, QueryResult, decode};
use crate::error::Result;
use crate::handle::IndexHandle;

impl<T: Scalar> IndexHandle<T> {
    /// Points within Euclidean distance `r` of `center`, boundary included.
    ///
    /// A negative or NaN `r` matches nothing.
    pub fn sphere(&mut self, center: &[T], r: T, output: Output) -> Result<QueryResult<'_, T>> {
        let (tree, results) = self.parts("sphere")?;
        tree.find_sphere(results, center, r)?;
        trace!(matched = results.num_points(), "sphere query");
        decode(tree, results, output)
    }

    /// Points within distance `r` of `center`, wrapping each axis over the index extent.
    ///
    /// The extent is the tight bounds of the points unless set with
    /// [`IndexHandle::set_boundaries`]. If any axis has no positive extent the query runs
    /// without wraparound.
    pub fn sphere_periodic(
        &mut self,
        center: &[T],
        r: T,
        output: Output,
    ) -> Result<QueryResult<'_, T>> {
        let (tree, results) = self.parts("sphere_periodic")?;
        let status = tree.find_sphere_periodic(results, center, r)?;
        if status == PeriodicStatus::Unwrapped {
            trace!("degenerate extent, periodic query ran without wraparound");
        }
        trace!(matched = results.num_points(), "periodic sphere query");
        decode(tree, results, output)
    }

    /// Points within `r` of `center`, periodic or not.
    pub fn query_radius(
        &mut self,
        center: &[T],
        r: T,
        periodic: bool,
        output: Output,
    ) -> Result<QueryResult<'_, T>> {
        if periodic {
            self.sphere_periodic(center, r, output)
        } else {
            self.sphere(center, r, output)
        }
    }

    /// Points inside the closed box `[lo, hi]` when `inside`, or outside it otherwise.
    ///
    /// A box with `lo > hi` on some axis contains nothing.
    pub fn query_box(
        &mut self,
        lo: &[T],
        hi: &[T],
        inside: bool,
        output: Output,
    ) -> Result<QueryResult<'_, T>> {
        let (tree, results) = self.parts("query_box")?;
        tree.find_box(results, lo, hi, inside)?;
        trace!(inside, matched = results.num_points(), "box query");
        decode(tree, results, output)
    }

    /// Distance from `center` to the nearest point, or `None` if the index is empty.
    pub fn nearest_distance(&mut self, center: &[T]) -> Result<Option<T>> {
        let (tree, results) = self.parts("nearest_distance")?;
        let d = tree.find_next_closest_distance(results, center)?;
        trace!(found = d.is_some(), "nearest distance query");
        Ok(d)
    }
}

#[cfg(test)]
mod tests {
    use proxima_engine::metric::{dist_sq, periodic_dist_sq};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{BackendKind, Error, IndexConfig, IndexHandle, Output, PointDataset, QueryResult};

    fn random_points<const D: usize>(n: usize, seed: u64) -> Vec<[f64; D]> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| core::array::from_fn(|_| rng.r#gen::<f64>()))
            .collect()
    }

    fn sorted<T>(result: QueryResult<'_, T>) -> Vec<i64> {
        let mut ids = result.into_ids().unwrap();
        ids.sort_unstable();
        ids
    }

    fn configs() -> [IndexConfig; 3] {
        [
            IndexConfig::default(),
            IndexConfig::default().with_leaf_size(1),
            IndexConfig::default().with_backend(BackendKind::FlatScan),
        ]
    }

    #[test]
    fn sphere_matches_brute_force() {
        let pts = random_points::<3>(1000, 1);
        let ds = PointDataset::from_points(&pts).unwrap();
        let center = [0.5, 0.5, 0.5];
        let r: f64 = 0.2;
        let want: Vec<i64> = (0..pts.len())
            .filter(|&i| dist_sq(&pts[i], &center) <= r * r)
            .map(|i| i as i64)
            .collect();
        assert!(!want.is_empty());
        for config in configs() {
            let got = IndexHandle::scoped_with(&ds, &config, |index| {
                index.query_radius(&center, r, false, Output::Ids).map(sorted)
            })
            .unwrap();
            assert_eq!(got, want, "{config:?}");
        }
    }

    #[test]
    fn single_precision_sphere_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(2);
        let pts: Vec<[f32; 2]> = (0..500)
            .map(|_| [rng.r#gen::<f32>(), rng.r#gen::<f32>()])
            .collect();
        let ds = PointDataset::from_points(&pts).unwrap();
        let center = [0.3_f32, 0.7];
        let r = 0.15_f32;
        let r2 = f64::from(r) * f64::from(r);
        let want: Vec<i64> = (0..pts.len())
            .filter(|&i| dist_sq(&pts[i], &center) <= r2)
            .map(|i| i as i64)
            .collect();
        let got = IndexHandle::scoped(&ds, |index| {
            index.sphere(&center, r, Output::Ids).map(sorted)
        })
        .unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn periodic_sphere_wraps_over_set_boundaries() {
        let pts = random_points::<3>(5000, 3);
        let ds = PointDataset::from_points(&pts).unwrap();
        let center = [0.02, 0.98, 0.5];
        let r: f64 = 0.15;
        let extent = [1.0; 3];
        let want: Vec<i64> = (0..pts.len())
            .filter(|&i| periodic_dist_sq(&pts[i], &center, &extent) <= r * r)
            .map(|i| i as i64)
            .collect();
        let plain = (0..pts.len())
            .filter(|&i| dist_sq(&pts[i], &center) <= r * r)
            .count();
        assert!(want.len() > plain, "center near a corner must gain wrapped neighbors");
        for config in configs() {
            let got = IndexHandle::scoped_with(&ds, &config, |index| {
                index.set_boundaries(0.0, 1.0)?;
                index.query_radius(&center, r, true, Output::Ids).map(sorted)
            })
            .unwrap();
            assert_eq!(got, want, "{config:?}");
        }
    }

    #[test]
    fn negative_radius_is_an_empty_sphere() {
        let ds = PointDataset::from_points(&[[0.0_f64, 0.0], [0.3, 0.0], [5.0, 5.0]]).unwrap();
        for config in configs() {
            IndexHandle::scoped_with(&ds, &config, |index| {
                assert!(index.sphere(&[0.0, 0.0], -0.5, Output::Count)?.is_empty());
                assert!(index.query_radius(&[0.0, 0.0], -0.5, true, Output::Ids)?.is_empty());
                // Zero radius still matches the coincident point.
                assert_eq!(index.sphere(&[0.0, 0.0], 0.0, Output::Ids).map(sorted)?, vec![0]);
                Ok::<_, Error>(())
            })
            .unwrap();
        }
    }

    #[test]
    fn periodic_on_degenerate_extent_is_plain_sphere() {
        // All points share y = 0, so the y extent is zero.
        let ds = PointDataset::from_points(&[[0.0_f64, 0.0], [0.5, 0.0], [1.0, 0.0]]).unwrap();
        let got = IndexHandle::scoped(&ds, |index| {
            index.sphere_periodic(&[0.0, 0.0], 0.1, Output::Ids).map(sorted)
        })
        .unwrap();
        assert_eq!(got, vec![0]);
    }

    #[test]
    fn rebuild_boundaries_drops_explicit_extent() {
        let ds = PointDataset::from_points(&[[0.0_f64, 0.0], [1.0, 1.0], [3.9, 2.0]]).unwrap();
        IndexHandle::scoped(&ds, |index| {
            index.set_boundaries(0.0, 4.0)?;
            // Wraps across x with the explicit [0, 4] extent.
            assert_eq!(
                index.sphere_periodic(&[0.0, 2.0], 0.2, Output::Ids).map(sorted)?,
                vec![2]
            );
            index.rebuild_boundaries()?;
            // Tight extent is 3.9 x 2: point 2 now sits on an image of the center, and
            // point 0 is one period away along y.
            assert_eq!(
                index.sphere_periodic(&[0.0, 2.0], 0.2, Output::Ids).map(sorted)?,
                vec![0, 2]
            );
            Ok::<_, Error>(())
        })
        .unwrap();
    }

    #[test]
    fn box_partitions_points() {
        let pts = random_points::<4>(600, 4);
        let ds = PointDataset::from_points(&pts).unwrap();
        let lo = [0.2, 0.1, 0.0, 0.3];
        let hi = [0.8, 0.7, 0.9, 1.0];
        let inside = |p: &[f64; 4]| (0..4).all(|k| lo[k] <= p[k] && p[k] <= hi[k]);
        let want_in: Vec<i64> = (0..pts.len())
            .filter(|&i| inside(&pts[i]))
            .map(|i| i as i64)
            .collect();
        for config in configs() {
            let (got_in, got_out) = IndexHandle::scoped_with(&ds, &config, |index| {
                let got_in = index.query_box(&lo, &hi, true, Output::Ids).map(sorted)?;
                let got_out = index.query_box(&lo, &hi, false, Output::Ids).map(sorted)?;
                Ok::<_, Error>((got_in, got_out))
            })
            .unwrap();
            assert_eq!(got_in, want_in, "{config:?}");
            assert_eq!(got_in.len() + got_out.len(), pts.len(), "{config:?}");
            assert!(got_out.iter().all(|id| got_in.binary_search(id).is_err()));
        }
    }

    #[test]
    fn inverted_box_is_empty() {
        let ds = PointDataset::from_points(&random_points::<2>(50, 5)).unwrap();
        IndexHandle::scoped(&ds, |index| {
            assert!(index.query_box(&[0.9, 0.0], &[0.1, 1.0], true, Output::Ids)?.is_empty());
            assert_eq!(index.query_box(&[0.9, 0.0], &[0.1, 1.0], false, Output::Count)?.len(), 50);
            Ok::<_, Error>(())
        })
        .unwrap();
    }

    #[test]
    fn nearest_distance_matches_brute_force() {
        let pts = random_points::<5>(700, 6);
        let ds = PointDataset::from_points(&pts).unwrap();
        let queries = random_points::<5>(20, 7);
        for config in configs() {
            IndexHandle::scoped_with(&ds, &config, |index| {
                for query in &queries {
                    let want = pts
                        .iter()
                        .map(|p| dist_sq(p, query))
                        .fold(f64::INFINITY, f64::min)
                        .sqrt();
                    let got = index.nearest_distance(query)?.unwrap();
                    assert!((got - want).abs() < 1e-12, "{config:?}: {got} vs {want}");
                }
                Ok::<_, Error>(())
            })
            .unwrap();
        }
    }

    #[test]
    fn nearest_on_empty_index_is_none() {
        let ds = PointDataset::<f64>::from_flat(Vec::new(), &[0, 3]).unwrap();
        let got = IndexHandle::scoped(&ds, |index| index.nearest_distance(&[0.0, 0.0, 0.0])).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn results_carry_caller_ids() {
        let pts = random_points::<3>(300, 8);
        let ids: Vec<i64> = (0..300).map(|i| 1_000_000 - 7 * i).collect();
        let ds = PointDataset::from_points(&pts)
            .unwrap()
            .with_ids(ids.clone())
            .unwrap();
        let center = [0.4, 0.4, 0.4];
        let r: f64 = 0.25;
        let mut want: Vec<i64> = (0..pts.len())
            .filter(|&i| dist_sq(&pts[i], &center) <= r * r)
            .map(|i| ids[i])
            .collect();
        want.sort_unstable();
        let got = IndexHandle::scoped(&ds, |index| {
            index.sphere(&center, r, Output::Raw).map(sorted)
        })
        .unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn output_shapes_are_aligned() {
        let pts = random_points::<2>(200, 9);
        let ds = PointDataset::from_points(&pts).unwrap();
        IndexHandle::scoped(&ds, |index| {
            let center = [0.5, 0.5];
            let n = index.sphere(&center, 0.3, Output::Count)?.len();
            let QueryResult::Both(ids, coords) = index.sphere(&center, 0.3, Output::Both)? else {
                panic!("expected ids and coords");
            };
            assert_eq!(ids.len(), n);
            for (id, c) in ids.iter().zip(&coords) {
                let i = usize::try_from(*id).unwrap();
                assert_eq!(*c, &pts[i][..]);
            }
            let QueryResult::Raw(raw) = index.sphere(&center, 0.3, Output::Raw)? else {
                panic!("expected raw records");
            };
            assert_eq!(raw.len(), n);
            Ok::<_, Error>(())
        })
        .unwrap();
    }

    #[test]
    fn wrong_center_dimension_is_rejected() {
        let ds = PointDataset::from_points(&random_points::<3>(10, 10)).unwrap();
        IndexHandle::scoped(&ds, |index| {
            let err = index.sphere(&[0.0, 0.0], 1.0, Output::Ids).unwrap_err();
            assert!(matches!(err, Error::DimensionMismatch { expected: 3, got: 2 }));
            assert!(index.query_box(&[0.0; 3], &[1.0; 4], true, Output::Ids).is_err());
            assert!(index.nearest_distance(&[0.0; 4]).is_err());
            Ok::<_, Error>(())
        })
        .unwrap();
    }

    #[test]
    fn every_supported_dimension_opens() {
        fn check<const D: usize>() {
            let ds = PointDataset::from_points(&random_points::<D>(40, D as u64)).unwrap();
            let n = IndexHandle::scoped(&ds, |index| {
                index.sphere(&[0.5; D], 10.0, Output::Count).map(|r| r.len())
            })
            .unwrap();
            assert_eq!(n, 40);
        }
        check::<2>();
        check::<3>();
        check::<4>();
        check::<5>();
        check::<6>();
        check::<7>();
        check::<8>();
    }
}
