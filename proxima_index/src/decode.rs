// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Result decoding: map a query's slot buffer onto views of the record arena.
//!
//! Decoding never copies coordinates. Every returned view borrows the engine arena, so the
//! borrow checker rejects any rebuild or free while a decoded result is alive.

use proxima_engine::{ResultBuffer, Scalar};

use crate::error::{Error, Result};
use crate::specialize::DynEngine;

/// Shape of a decoded query result.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Output {
    /// Only the number of matches.
    Count,
    /// Identifiers of the matches.
    #[default]
    Ids,
    /// Coordinate views of the matches.
    Coords,
    /// Identifiers and coordinate views, index-aligned.
    Both,
    /// Per-match record views.
    Raw,
}

/// Borrowed view of one arena record.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointRef<'a, T> {
    /// Identifier carried by the record.
    pub id: i64,
    /// Coordinates of the record, borrowed from the arena.
    pub coords: &'a [T],
}

/// A decoded query result, in the order the engine reported matches.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryResult<'a, T> {
    /// See [`Output::Count`].
    Count(usize),
    /// See [`Output::Ids`].
    Ids(Vec<i64>),
    /// See [`Output::Coords`].
    Coords(Vec<&'a [T]>),
    /// See [`Output::Both`].
    Both(Vec<i64>, Vec<&'a [T]>),
    /// See [`Output::Raw`].
    Raw(Vec<PointRef<'a, T>>),
}

impl<'a, T> QueryResult<'a, T> {
    /// Number of matches.
    pub fn len(&self) -> usize {
        match self {
            Self::Count(n) => *n,
            Self::Ids(ids) | Self::Both(ids, _) => ids.len(),
            Self::Coords(coords) => coords.len(),
            Self::Raw(points) => points.len(),
        }
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifiers, if this output carries them.
    pub fn into_ids(self) -> Option<Vec<i64>> {
        match self {
            Self::Ids(ids) | Self::Both(ids, _) => Some(ids),
            Self::Raw(points) => Some(points.into_iter().map(|p| p.id).collect()),
            Self::Count(_) | Self::Coords(_) => None,
        }
    }

    /// Coordinate views, if this output carries them.
    pub fn into_coords(self) -> Option<Vec<&'a [T]>> {
        match self {
            Self::Coords(coords) | Self::Both(_, coords) => Some(coords),
            Self::Raw(points) => Some(points.into_iter().map(|p| p.coords).collect()),
            Self::Count(_) | Self::Ids(_) => None,
        }
    }
}

/// Decode `results` against the arena of `engine`.
///
/// [`Output::Count`] only reads the buffer length. Every other shape first checks that the
/// buffer was filled against the current generation and that each slot lies in the arena.
pub(crate) fn decode<'a, T: Scalar>(
    engine: &'a dyn DynEngine<T>,
    results: &ResultBuffer,
    output: Output,
) -> Result<QueryResult<'a, T>> {
    if output == Output::Count {
        return Ok(QueryResult::Count(results.num_points()));
    }
    if results.generation() != engine.generation() {
        return Err(Error::marshaling(format!(
            "buffer filled at generation {}, engine is at {}",
            results.generation(),
            engine.generation()
        )));
    }

    let mut points = Vec::with_capacity(results.num_points());
    for &slot in results.slots() {
        let point = engine.record(slot).ok_or_else(|| {
            Error::marshaling(format!(
                "slot {slot} outside an arena of {} records",
                engine.arena_len()
            ))
        })?;
        points.push(point);
    }

    Ok(match output {
        Output::Count => QueryResult::Count(points.len()),
        Output::Ids => QueryResult::Ids(points.iter().map(|p| p.id).collect()),
        Output::Coords => QueryResult::Coords(points.iter().map(|p| p.coords).collect()),
        Output::Both => QueryResult::Both(
            points.iter().map(|p| p.id).collect(),
            points.iter().map(|p| p.coords).collect(),
        ),
        Output::Raw => QueryResult::Raw(points),
    })
}
