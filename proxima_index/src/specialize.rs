// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine specialization: resolve a `(dimension, precision)` pair to a monomorphized engine.
//!
//! Every supported dimension is compiled for both precisions and both backends. Resolving a
//! key picks the matching constructor and publishes it in a process-wide registry, so repeated
//! requests share one [`EngineVariant`]. Publication is insert-if-absent under a write lock:
//! a request that loses the race loads the variant that won it.

use core::any::Any;
use core::fmt::{self, Debug, Display};
use core::marker::PhantomData;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use proxima_engine::{
    Bounds, Engine, EngineOptions, FlatScan, KdTree, PeriodicStatus, Precision, ResultBuffer,
    Scalar,
};
use tracing::{debug, warn};

use crate::config::{BackendKind, BuildFailurePolicy, IndexConfig};
use crate::dataset::PointDataset;
use crate::decode::PointRef;
use crate::error::{Error, Result};

/// Largest dimension with a compiled specialization. The smallest is 2.
pub const MAX_DIM: usize = 8;

/// Identity of an engine variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineKey {
    /// Coordinates per point.
    pub dim: usize,
    /// Coordinate precision.
    pub precision: Precision,
    /// Spatial strategy.
    pub backend: BackendKind,
    /// Kd-tree leaf size; zero for linear scans.
    pub leaf_size: usize,
}

impl EngineKey {
    /// Key for a dimension, precision, and configuration.
    pub fn new(dim: usize, precision: Precision, config: &IndexConfig) -> Self {
        Self {
            dim,
            precision,
            backend: config.backend,
            leaf_size: config.effective_leaf_size(),
        }
    }
}

impl Display for EngineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proxima_{}d_{}_{}", self.dim, self.precision, self.backend)?;
        if self.backend == BackendKind::KdTree {
            write!(f, "{}", self.leaf_size)?;
        }
        Ok(())
    }
}

pub(crate) type OpenFn<T> = fn(&PointDataset<T>, &EngineOptions) -> Result<Box<dyn DynEngine<T>>>;

/// A published engine variant: the monomorphized constructor for one [`EngineKey`].
pub struct EngineVariant<T: Scalar> {
    key: EngineKey,
    options: EngineOptions,
    open: OpenFn<T>,
}

impl<T: Scalar> Debug for EngineVariant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineVariant")
            .field("key", &self.key)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> EngineVariant<T> {
    /// The key this variant was published under.
    pub fn key(&self) -> EngineKey {
        self.key
    }

    /// Build options passed to the engine on open.
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Allocate an engine over `dataset`.
    pub(crate) fn open(&self, dataset: &PointDataset<T>) -> Result<Box<dyn DynEngine<T>>> {
        (self.open)(dataset, &self.options)
    }
}

/// Dimension-erased view of a specialized engine.
///
/// Slices crossing this boundary are checked against the compiled dimension.
pub(crate) trait DynEngine<T: Scalar>: Debug + Send {
    fn dim(&self) -> usize;
    fn arena_len(&self) -> usize;
    fn generation(&self) -> u64;
    fn record(&self, slot: usize) -> Option<PointRef<'_, T>>;
    fn rebuild(&mut self, dataset: Option<&PointDataset<T>>) -> Result<()>;
    fn rebuild_boundaries(&mut self);
    fn set_minmax(&mut self, min: T, max: T);
    fn find_sphere(&self, results: &mut ResultBuffer, center: &[T], r: T) -> Result<()>;
    fn find_sphere_periodic(
        &self,
        results: &mut ResultBuffer,
        center: &[T],
        r: T,
    ) -> Result<PeriodicStatus>;
    fn find_box(&self, results: &mut ResultBuffer, lo: &[T], hi: &[T], inside: bool)
    -> Result<()>;
    fn find_next_closest_distance(
        &self,
        results: &mut ResultBuffer,
        center: &[T],
    ) -> Result<Option<T>>;
}

#[derive(Debug)]
struct Specialized<T, const D: usize, E> {
    engine: E,
    _coords: PhantomData<[T; D]>,
}

impl<T: Scalar, const D: usize, E: Engine<T, D>> Specialized<T, D, E> {
    fn fixed(p: &[T]) -> Result<[T; D]> {
        <[T; D]>::try_from(p).map_err(|_| Error::DimensionMismatch {
            expected: D,
            got: p.len(),
        })
    }
}

impl<T: Scalar, const D: usize, E: Engine<T, D>> DynEngine<T> for Specialized<T, D, E> {
    fn dim(&self) -> usize {
        D
    }

    fn arena_len(&self) -> usize {
        self.engine.records().len()
    }

    fn generation(&self) -> u64 {
        self.engine.generation()
    }

    fn record(&self, slot: usize) -> Option<PointRef<'_, T>> {
        self.engine.records().get(slot).map(|r| PointRef {
            id: r.id,
            coords: &r.coords,
        })
    }

    fn rebuild(&mut self, dataset: Option<&PointDataset<T>>) -> Result<()> {
        let records = dataset.map(PointDataset::to_records::<D>).transpose()?;
        self.engine.rebuild(records);
        Ok(())
    }

    fn rebuild_boundaries(&mut self) {
        self.engine.rebuild_boundaries();
    }

    fn set_minmax(&mut self, min: T, max: T) {
        self.engine.set_minmax(min, max);
    }

    fn find_sphere(&self, results: &mut ResultBuffer, center: &[T], r: T) -> Result<()> {
        self.engine.find_sphere(results, &Self::fixed(center)?, r);
        Ok(())
    }

    fn find_sphere_periodic(
        &self,
        results: &mut ResultBuffer,
        center: &[T],
        r: T,
    ) -> Result<PeriodicStatus> {
        Ok(self
            .engine
            .find_sphere_periodic(results, &Self::fixed(center)?, r))
    }

    fn find_box(
        &self,
        results: &mut ResultBuffer,
        lo: &[T],
        hi: &[T],
        inside: bool,
    ) -> Result<()> {
        let bounds = Bounds::new(Self::fixed(lo)?, Self::fixed(hi)?);
        if inside {
            self.engine.find_inside_of_box(results, &bounds);
        } else {
            self.engine.find_outside_of_box(results, &bounds);
        }
        Ok(())
    }

    fn find_next_closest_distance(
        &self,
        results: &mut ResultBuffer,
        center: &[T],
    ) -> Result<Option<T>> {
        Ok(self
            .engine
            .find_next_closest_distance(results, &Self::fixed(center)?))
    }
}

fn open_specialized<T, const D: usize, E>(
    dataset: &PointDataset<T>,
    options: &EngineOptions,
) -> Result<Box<dyn DynEngine<T>>>
where
    T: Scalar,
    E: Engine<T, D> + 'static,
{
    let records = dataset.to_records::<D>()?;
    Ok(Box::new(Specialized::<T, D, E> {
        engine: E::init(records, options),
        _coords: PhantomData,
    }))
}

macro_rules! specialized {
    ($backend:ident, $dim:expr) => {
        match $dim {
            2 => Some(open_specialized::<T, 2, $backend<T, 2>> as OpenFn<T>),
            3 => Some(open_specialized::<T, 3, $backend<T, 3>> as OpenFn<T>),
            4 => Some(open_specialized::<T, 4, $backend<T, 4>> as OpenFn<T>),
            5 => Some(open_specialized::<T, 5, $backend<T, 5>> as OpenFn<T>),
            6 => Some(open_specialized::<T, 6, $backend<T, 6>> as OpenFn<T>),
            7 => Some(open_specialized::<T, 7, $backend<T, 7>> as OpenFn<T>),
            8 => Some(open_specialized::<T, 8, $backend<T, 8>> as OpenFn<T>),
            _ => None,
        }
    };
}

/// Pick the compiled constructor for `key`, or explain why none exists.
fn build<T: Scalar>(key: &EngineKey) -> Result<OpenFn<T>, String> {
    if key.backend == BackendKind::KdTree && key.leaf_size == 0 {
        return Err("kd-tree leaf size must be positive".into());
    }
    let open = match key.backend {
        BackendKind::KdTree => specialized!(KdTree, key.dim),
        BackendKind::FlatScan => specialized!(FlatScan, key.dim),
    };
    open.ok_or_else(|| {
        format!(
            "no specialization compiled for dim {} (supported: 2..={MAX_DIM})",
            key.dim
        )
    })
}

type Published = Arc<dyn Any + Send + Sync>;

static REGISTRY: LazyLock<RwLock<HashMap<EngineKey, Published>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

fn load<T: Scalar>(key: EngineKey, published: Published) -> Result<Arc<EngineVariant<T>>> {
    published
        .downcast::<EngineVariant<T>>()
        .map_err(|_| Error::EngineLoad {
            key,
            reason: format!("published variant is not a {} engine", T::PRECISION),
        })
}

/// Resolve the engine variant for `dim` points of scalar `T` under `config`.
///
/// Repeated calls with the same key return the same [`Arc`]. If the variant cannot be built,
/// [`BuildFailurePolicy::UseCached`] falls back to any published variant of the same dimension
/// and precision.
pub fn specialize<T: Scalar>(dim: usize, config: &IndexConfig) -> Result<Arc<EngineVariant<T>>> {
    let key = EngineKey::new(dim, T::PRECISION, config);
    let open = match build::<T>(&key) {
        Ok(open) => open,
        Err(reason) => return fallback(key, reason, config.on_build_failure),
    };

    if let Some(found) = REGISTRY.read().get(&key).cloned() {
        return load(key, found);
    }

    let variant = EngineVariant {
        key,
        options: EngineOptions {
            leaf_size: key.leaf_size.max(1),
        },
        open,
    };
    let published = match REGISTRY.write().entry(key) {
        Entry::Occupied(e) => e.get().clone(),
        Entry::Vacant(e) => {
            debug!(%key, "publishing engine variant");
            e.insert(Arc::new(variant)).clone()
        }
    };
    load(key, published)
}

fn fallback<T: Scalar>(
    key: EngineKey,
    reason: String,
    policy: BuildFailurePolicy,
) -> Result<Arc<EngineVariant<T>>> {
    if policy == BuildFailurePolicy::UseCached {
        let cached = REGISTRY
            .read()
            .iter()
            .filter(|(k, _)| k.dim == key.dim && k.precision == key.precision)
            .min_by_key(|(k, _)| **k)
            .map(|(k, v)| (*k, v.clone()));
        if let Some((cached_key, published)) = cached {
            warn!(
                requested = %key,
                fallback = %cached_key,
                %reason,
                "engine build failed, using cached variant"
            );
            return load(cached_key, published);
        }
    }
    Err(Error::EngineBuild { key, reason })
}

/// Keys currently published in the process-wide registry, sorted.
pub fn registered_keys() -> Vec<EngineKey> {
    let mut keys: Vec<_> = REGISTRY.read().keys().copied().collect();
    keys.sort_unstable();
    keys
}
