/////////////////////////////////////////////////////////////////////////////////////////////
//
// Maps data samples onto the elements of a simulation domain.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    domain::Domain,
    error::{GeoStatsError, Result},
    search::{NeighborBuffer, NeighborSearch, SearchSpec},
    table::SampleSet,
};
use serde::{Deserialize, Serialize};

/// How samples are assigned to the elements of the simulation domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mapping {
    /// Each sample goes to its nearest element. When several samples share an
    /// element the closest wins, then the one listed first.
    #[default]
    Nearest,

    /// Sample `i` of the data domain goes to element `i`. Requires both
    /// domains to have the same number of elements.
    Copy,
}

impl Mapping {
    /// Returns `(element, sample)` pairs, `sample` indexing into `samples.values`.
    pub(crate) fn map(
        &self,
        variable: &str,
        samples: &SampleSet,
        data_domain: &dyn Domain,
        target: &dyn Domain,
    ) -> Result<Vec<(usize, usize)>> {
        match self {
            Mapping::Copy => {
                if data_domain.num_elements() != target.num_elements() {
                    return Err(GeoStatsError::DimensionMismatch {
                        expected: target.num_elements(),
                        found: data_domain.num_elements(),
                    });
                }
                Ok(samples
                    .indices
                    .iter()
                    .enumerate()
                    .map(|(s, &element)| (element, s))
                    .collect())
            }
            Mapping::Nearest => {
                let spec = SearchSpec {
                    min_neighbors: 1,
                    max_neighbors: Some(1),
                    ..SearchSpec::default()
                };
                let search = NeighborSearch::build(variable, &target.centroids(), &spec)?;
                let mut buffer = NeighborBuffer::new();

                let mut best: Vec<Option<(f64, usize)>> = vec![None; target.num_elements()];
                for s in 0..samples.len() {
                    if search.search(samples.locations.row(s), None, &mut buffer) == 0 {
                        continue;
                    }
                    let nearest = buffer.neighbours()[0];
                    let replace = match best[nearest.index] {
                        Some((distance, _)) => nearest.distance < distance,
                        None => true,
                    };
                    if replace {
                        best[nearest.index] = Some((nearest.distance, s));
                    }
                }

                Ok(best
                    .into_iter()
                    .enumerate()
                    .filter_map(|(element, slot)| slot.map(|(_, s)| (element, s)))
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{CartesianGrid, PointSet},
        table::{SampleTable, SpatialData},
    };

    #[test]
    fn nearest_mapping_keeps_the_closest_sample() {
        let table = SampleTable::new()
            .with_values("z", &[10.0, 20.0, 30.0, 40.0])
            .unwrap();
        let data = SpatialData::new(
            PointSet::from_coords(&[[0.4], [0.1], [2.9], [1.5]]),
            table,
        )
        .unwrap();
        let grid = CartesianGrid::unit(&[4]).unwrap();
        let samples = data.samples("z").unwrap();

        let mapped = Mapping::Nearest
            .map("z", &samples, data.domain(), &grid)
            .unwrap();

        // Samples 0 and 1 both fall on element 0, and 1 is closer. Sample 3 is
        // equidistant from elements 1 and 2 and goes to the lower index.
        assert_eq!(mapped, vec![(0, 1), (1, 3), (3, 2)]);
    }

    #[test]
    fn copy_mapping_uses_sample_indices() {
        let table = SampleTable::new()
            .with_column("z", vec![Some(1.0), None, Some(3.0)])
            .unwrap();
        let data = SpatialData::new(PointSet::from_coords(&[[0.0], [1.0], [2.0]]), table).unwrap();
        let samples = data.samples("z").unwrap();

        let grid = CartesianGrid::unit(&[3]).unwrap();
        assert_eq!(
            Mapping::Copy.map("z", &samples, data.domain(), &grid).unwrap(),
            vec![(0, 0), (2, 1)]
        );

        let smaller = CartesianGrid::unit(&[2]).unwrap();
        assert!(matches!(
            Mapping::Copy.map("z", &samples, data.domain(), &smaller),
            Err(GeoStatsError::DimensionMismatch { .. })
        ));
    }
}
