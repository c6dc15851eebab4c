/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements neighbour search over a set of centroids with k-nearest, ball, and box modes.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # search
//!
//! [`NeighborSearch`] answers "find up to `K` neighbours of this point" over a
//! fixed candidate set, optionally restricted by an availability mask.
//!
//! - Without a neighbourhood it is a `K`-nearest query under the metric.
//! - With a [`Neighborhood::Ball`] it returns every candidate within the radius
//!   under the metric.
//! - With a [`Neighborhood::Box`] it returns every candidate inside the
//!   axis-aligned box centred on the query.
//!
//! Ball and box results that exceed `K` are truncated nearest-first, with ties
//! in distance broken by ascending candidate index. Results are always written
//! to a caller-owned [`NeighborBuffer`], nearest-first.

mod kdtree;
mod rtree;

use crate::{
    anisotropy::{Anisotropy, AnisotropyTransform},
    error::{GeoStatsError, Result},
};
use faer::{Mat, RowRef};
use kdtree::{DistanceMetric, KDTree};
use log::warn;
use rtree::NdPointTree;
use serde::{Deserialize, Serialize};

pub use kdtree::Neighbour;

/// Distance used to rank candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Metric {
    #[default]
    Euclidean,

    /// Maximum absolute coordinate difference.
    Chebyshev,

    /// Sum of absolute coordinate differences.
    Manhattan,

    /// Euclidean distance after rotating and rescaling into the anisotropy frame.
    Anisotropic(Anisotropy),
}

/// Shape restricting candidates around the query point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Neighborhood {
    /// Candidates within `radius` of the query, measured with the search metric.
    Ball { radius: f64 },

    /// Candidates inside the axis-aligned box `query ± half_widths`.
    Box { half_widths: Vec<f64> },
}

/// Neighbour search parameters for one variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Fewest neighbours that make a location solvable.
    pub min_neighbors: usize,

    /// Most neighbours used per location. `None` means every candidate.
    pub max_neighbors: Option<usize>,

    /// Optional shape restricting the candidates.
    pub neighborhood: Option<Neighborhood>,

    /// Metric used for ranking and for ball radii.
    pub metric: Metric,
}

impl Default for SearchSpec {
    fn default() -> Self {
        Self {
            min_neighbors: 1,
            max_neighbors: None,
            neighborhood: None,
            metric: Metric::Euclidean,
        }
    }
}

impl SearchSpec {
    /// Validates the search for `num_candidates` points in `dimension` dimensions
    /// and returns it with `max_neighbors` clamped to the candidate count.
    ///
    /// `min_neighbors > max_neighbors` is an error. `max_neighbors` above the
    /// candidate count is clamped with a warning. `min_neighbors` above the
    /// candidate count is accepted with a warning; every location then falls back.
    pub fn resolve(&self, variable: &str, num_candidates: usize, dimension: usize) -> Result<Self> {
        if let Some(max) = self.max_neighbors {
            if self.min_neighbors > max {
                return Err(GeoStatsError::configuration(
                    variable,
                    format!(
                        "min_neighbors ({}) exceeds max_neighbors ({})",
                        self.min_neighbors, max
                    ),
                ));
            }
        }

        match &self.neighborhood {
            Some(Neighborhood::Ball { radius }) => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err(GeoStatsError::configuration(
                        variable,
                        "ball radius must be finite and positive",
                    ));
                }
            }
            Some(Neighborhood::Box { half_widths }) => {
                if half_widths.len() != dimension {
                    return Err(GeoStatsError::configuration(
                        variable,
                        format!(
                            "box neighbourhood has {} half widths for {} dimensions",
                            half_widths.len(),
                            dimension
                        ),
                    ));
                }
                if dimension > 3 {
                    return Err(GeoStatsError::configuration(
                        variable,
                        "box neighbourhoods support at most 3 dimensions",
                    ));
                }
                if half_widths.iter().any(|w| !(w.is_finite() && *w > 0.0)) {
                    return Err(GeoStatsError::configuration(
                        variable,
                        "box half widths must be finite and positive",
                    ));
                }
            }
            None => {}
        }

        if let Metric::Anisotropic(anisotropy) = &self.metric {
            if anisotropy.dimension() != dimension {
                return Err(GeoStatsError::configuration(
                    variable,
                    format!(
                        "{}D anisotropy used with {}D data",
                        anisotropy.dimension(),
                        dimension
                    ),
                ));
            }
            if !anisotropy.is_valid() {
                return Err(GeoStatsError::configuration(
                    variable,
                    "anisotropy ratios must be finite and positive",
                ));
            }
        }

        let mut resolved = self.clone();
        let max = self.max_neighbors.unwrap_or(num_candidates);
        if max > num_candidates {
            warn!(
                "variable `{}`: max_neighbors ({}) exceeds the {} candidates, clamping",
                variable, max, num_candidates
            );
        }
        resolved.max_neighbors = Some(max.min(num_candidates));

        if self.min_neighbors > num_candidates {
            warn!(
                "variable `{}`: min_neighbors ({}) exceeds the {} candidates, every location will fall back",
                variable, self.min_neighbors, num_candidates
            );
        }

        Ok(resolved)
    }
}

/// Per-worker scratch space for neighbour queries.
///
/// Reused across queries to avoid reallocation. Never share one buffer
/// between concurrent workers.
#[derive(Debug, Clone, Default)]
pub struct NeighborBuffer {
    neighbours: Vec<Neighbour>,
    query: Vec<f64>,
    transformed: Vec<f64>,
    located: Vec<usize>,
}

impl NeighborBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Neighbours found by the last query, nearest-first.
    pub fn neighbours(&self) -> &[Neighbour] {
        &self.neighbours
    }

    /// Candidate indices found by the last query, nearest-first.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.neighbours.iter().map(|n| n.index)
    }

    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }
}

/// A reusable search index over a fixed set of candidate centroids.
///
/// Read-only after construction, so one instance can serve concurrent queries
/// as long as every worker brings its own [`NeighborBuffer`].
pub struct NeighborSearch {
    spec: SearchSpec,
    k: usize,
    dimension: usize,
    kdtree: KDTree,
    metric: DistanceMetric,
    transform: Option<AnisotropyTransform>,
    rtree: Option<NdPointTree>,
}

impl NeighborSearch {
    /// Builds the index over the rows of `centroids`.
    ///
    /// The search is resolved against the candidate count first; see
    /// [`SearchSpec::resolve`].
    pub fn build(variable: &str, centroids: &Mat<f64>, spec: &SearchSpec) -> Result<Self> {
        let (num_candidates, dimension) = centroids.shape();
        let spec = spec.resolve(variable, num_candidates, dimension)?;
        let k = spec.max_neighbors.unwrap_or(num_candidates);

        let (metric, transform) = match &spec.metric {
            Metric::Euclidean => (DistanceMetric::Euclidean, None),
            Metric::Chebyshev => (DistanceMetric::InfinityNorm, None),
            Metric::Manhattan => (DistanceMetric::Manhattan, None),
            Metric::Anisotropic(anisotropy) => (
                DistanceMetric::Euclidean,
                Some(AnisotropyTransform::new(anisotropy)),
            ),
        };

        // Anisotropic distances are Euclidean in the transformed frame, so the
        // KD-tree is built there.
        let kdtree = match &transform {
            Some(t) => KDTree::new(&t.apply_rows(centroids)),
            None => KDTree::new(centroids),
        };

        let rtree = match &spec.neighborhood {
            Some(Neighborhood::Box { .. }) => Some(NdPointTree::new(centroids).ok_or_else(|| {
                GeoStatsError::configuration(variable, "box neighbourhoods support at most 3 dimensions")
            })?),
            _ => None,
        };

        Ok(Self {
            spec,
            k,
            dimension,
            kdtree,
            metric,
            transform,
            rtree,
        })
    }

    /// The resolved spec, with `max_neighbors` clamped to the candidate count.
    pub fn spec(&self) -> &SearchSpec {
        &self.spec
    }

    /// Upper bound on the number of neighbours any query returns.
    pub fn max_neighbors(&self) -> usize {
        self.k
    }

    pub fn num_candidates(&self) -> usize {
        self.kdtree.len()
    }

    /// Finds up to `K` neighbours of `point`, writing them nearest-first to
    /// `buffer`, and returns how many were found.
    ///
    /// When `mask` is given only candidates with `mask[i] == true` are
    /// considered. Finding fewer than `K` is a normal outcome.
    pub fn search(
        &self,
        point: RowRef<'_, f64>,
        mask: Option<&[bool]>,
        buffer: &mut NeighborBuffer,
    ) -> usize {
        buffer.neighbours.clear();
        if self.k == 0 {
            return 0;
        }

        buffer.query.clear();
        buffer.query.extend(point.iter().copied());

        buffer.transformed.clear();
        buffer.transformed.resize(self.dimension, 0.0);
        match &self.transform {
            Some(t) => t.apply(&buffer.query, &mut buffer.transformed),
            None => buffer.transformed.copy_from_slice(&buffer.query),
        }

        match &self.spec.neighborhood {
            None => {
                self.kdtree.k_nearest(
                    &buffer.transformed,
                    self.k,
                    self.metric,
                    mask,
                    &mut buffer.neighbours,
                );
            }
            Some(Neighborhood::Ball { radius }) => {
                self.kdtree.radius_search(
                    &buffer.transformed,
                    *radius,
                    self.metric,
                    mask,
                    &mut buffer.neighbours,
                );
                buffer.neighbours.sort_unstable();
                buffer.neighbours.truncate(self.k);
            }
            Some(Neighborhood::Box { half_widths }) => {
                if let Some(rtree) = &self.rtree {
                    buffer.located.clear();
                    rtree.locate_in_box(&buffer.query, half_widths, &mut buffer.located);

                    for &index in buffer.located.iter() {
                        if mask.map_or(true, |m| m[index]) {
                            buffer.neighbours.push(Neighbour {
                                distance: self
                                    .metric
                                    .distance(&buffer.transformed, self.kdtree.point(index)),
                                index,
                            });
                        }
                    }
                    buffer.neighbours.sort_unstable();
                    buffer.neighbours.truncate(self.k);
                }
            }
        }

        buffer.neighbours.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::{mat, Row};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn spec(max: Option<usize>, neighborhood: Option<Neighborhood>, metric: Metric) -> SearchSpec {
        SearchSpec {
            min_neighbors: 0,
            max_neighbors: max,
            neighborhood,
            metric,
        }
    }

    fn line(n: usize) -> Mat<f64> {
        Mat::from_fn(n, 1, |i, _| i as f64)
    }

    #[test]
    fn never_returns_more_than_max_neighbors() {
        let mut rng = StdRng::seed_from_u64(11);
        let points = Mat::from_fn(500, 2, |_, _| rng.random_range(0.0..10.0));
        let mask = (0..500).map(|i| i % 2 == 1).collect::<Vec<_>>();
        let mut buffer = NeighborBuffer::new();

        let specs = [
            spec(Some(8), None, Metric::Euclidean),
            spec(Some(8), Some(Neighborhood::Ball { radius: 3.0 }), Metric::Chebyshev),
            spec(
                Some(8),
                Some(Neighborhood::Box { half_widths: vec![2.0, 1.0] }),
                Metric::Manhattan,
            ),
        ];

        for s in specs.iter() {
            let search = NeighborSearch::build("z", &points, s).unwrap();
            for _ in 0..50 {
                let q = Row::from_fn(2, |_| rng.random_range(0.0..10.0));
                let found = search.search(q.as_ref(), Some(&mask), &mut buffer);
                assert!(found <= 8);
                assert_eq!(found, buffer.len());
                assert!(buffer.indices().all(|i| mask[i]));
            }
        }
    }

    #[test]
    fn ball_truncation_is_nearest_first_with_index_ties() {
        let points = line(11);
        let search = NeighborSearch::build(
            "z",
            &points,
            &spec(Some(3), Some(Neighborhood::Ball { radius: 4.0 }), Metric::Euclidean),
        )
        .unwrap();
        let mut buffer = NeighborBuffer::new();

        let q = mat![[5.0f64]];
        let found = search.search(q.row(0), None, &mut buffer);
        assert_eq!(found, 3);
        // 5 is nearest, then 4 and 6 tie and the smaller index wins the tie.
        assert_eq!(buffer.indices().collect::<Vec<_>>(), vec![5, 4, 6]);
    }

    #[test]
    fn box_selects_only_points_inside() {
        let points = mat![[0.0, 0.0], [2.0, 0.1], [0.1, 2.0], [1.0, 1.0f64]];
        let search = NeighborSearch::build(
            "z",
            &points,
            &spec(None, Some(Neighborhood::Box { half_widths: vec![2.5, 0.5] }), Metric::Euclidean),
        )
        .unwrap();
        let mut buffer = NeighborBuffer::new();

        let q = mat![[0.0, 0.0f64]];
        search.search(q.row(0), None, &mut buffer);
        assert_eq!(buffer.indices().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn anisotropy_prefers_the_major_axis() {
        // One point along x, one along y, both at distance 2.
        let points = mat![[2.0, 0.0], [0.0, 2.0f64]];
        let anisotropic = Metric::Anisotropic(Anisotropy::Two {
            rotation_angle: -90.0,
            major_ratio: 4.0,
            minor_ratio: 1.0,
        });
        let search = NeighborSearch::build("z", &points, &spec(Some(1), None, anisotropic)).unwrap();
        let mut buffer = NeighborBuffer::new();

        let q = mat![[0.0, 0.0f64]];
        search.search(q.row(0), None, &mut buffer);
        assert_eq!(buffer.indices().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn max_above_candidates_is_clamped() {
        let resolved = spec(Some(50), None, Metric::Euclidean)
            .resolve("z", 10, 1)
            .unwrap();
        assert_eq!(resolved.max_neighbors, Some(10));

        let unbounded = spec(None, None, Metric::Euclidean).resolve("z", 10, 1).unwrap();
        assert_eq!(unbounded.max_neighbors, Some(10));
    }

    #[test]
    fn min_above_max_is_a_configuration_error() {
        let mut s = spec(Some(2), None, Metric::Euclidean);
        s.min_neighbors = 3;
        assert!(matches!(
            s.resolve("z", 10, 1),
            Err(GeoStatsError::Configuration { .. })
        ));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let s = spec(None, Some(Neighborhood::Box { half_widths: vec![1.0] }), Metric::Euclidean);
        assert!(s.resolve("z", 10, 2).is_err());

        let s = spec(None, Some(Neighborhood::Ball { radius: -1.0 }), Metric::Euclidean);
        assert!(s.resolve("z", 10, 2).is_err());

        let s = spec(None, None, Metric::Anisotropic(Anisotropy::One { major_ratio: 2.0 }));
        assert!(s.resolve("z", 10, 2).is_err());
    }

    #[test]
    fn zero_max_neighbors_finds_nothing() {
        let search = NeighborSearch::build("z", &line(5), &spec(Some(0), None, Metric::Euclidean))
            .unwrap();
        let mut buffer = NeighborBuffer::new();
        let q = mat![[2.0f64]];
        assert_eq!(search.search(q.row(0), None, &mut buffer), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn spec_round_trips_through_json() {
        let s = SearchSpec {
            min_neighbors: 2,
            max_neighbors: Some(16),
            neighborhood: Some(Neighborhood::Ball { radius: 25.0 }),
            metric: Metric::Anisotropic(Anisotropy::Two {
                rotation_angle: 45.0,
                major_ratio: 1.0,
                minor_ratio: 0.5,
            }),
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: SearchSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
