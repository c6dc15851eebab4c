/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares estimation problems, solutions, and the estimator trait.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # estimation
//!
//! Estimators predict every variable of a [`SpatialData`] at every element
//! of a target [`Domain`]. Locations that cannot be estimated are reported as
//! missing (`None`) rather than failing the solve.

mod idw;
mod kriging;

pub use idw::IdwEstimator;
pub use kriging::{KrigingEstimator, KrigingPreproc};

use crate::{
    domain::Domain,
    error::{GeoStatsError, Result},
    table::SpatialData,
};
use std::collections::BTreeMap;

/// Georeferenced data to be estimated at the elements of a target domain.
pub struct EstimationProblem<'a> {
    data: &'a SpatialData,
    domain: &'a dyn Domain,
}

impl<'a> EstimationProblem<'a> {
    /// # Errors
    /// [`GeoStatsError::DimensionMismatch`] if the data and target domains
    /// have different embedding dimensions.
    pub fn new(data: &'a SpatialData, domain: &'a dyn Domain) -> Result<Self> {
        let expected = domain.embedding_dimension();
        let found = data.domain().embedding_dimension();
        if expected != found {
            return Err(GeoStatsError::DimensionMismatch { expected, found });
        }
        Ok(Self { data, domain })
    }

    pub fn data(&self) -> &SpatialData {
        self.data
    }

    pub fn domain(&self) -> &dyn Domain {
        self.domain
    }
}

/// Estimated mean and variance of one variable, aligned with the target domain.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedField {
    pub mean: Vec<Option<f64>>,

    /// `None` where the location is missing, or for estimators without a
    /// variance.
    pub variance: Vec<Option<f64>>,

    /// Locations without enough neighbours.
    pub missing: usize,

    /// Locations whose local system was degenerate.
    pub degenerate: usize,
}

impl EstimatedField {
    pub(crate) fn with_len(n: usize) -> Self {
        Self {
            mean: vec![None; n],
            variance: vec![None; n],
            missing: 0,
            degenerate: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Estimated fields keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimationSolution {
    pub fields: BTreeMap<String, EstimatedField>,
}

impl EstimationSolution {
    pub fn get(&self, variable: &str) -> Option<&EstimatedField> {
        self.fields.get(variable)
    }
}

/// Solves an [`EstimationProblem`] for every configured variable.
pub trait Estimator {
    fn solve(&self, problem: &EstimationProblem<'_>) -> Result<EstimationSolution>;
}

/// Result of estimating a single location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Outcome {
    Estimated { mean: f64, variance: Option<f64> },
    Missing,
    Degenerate,
}

impl Outcome {
    /// Writes the outcome for element `index` into `field`.
    pub(crate) fn record(self, index: usize, field: &mut EstimatedField) {
        match self {
            Outcome::Estimated { mean, variance } => {
                field.mean[index] = Some(mean);
                field.variance[index] = variance;
            }
            Outcome::Missing => field.missing += 1,
            Outcome::Degenerate => field.degenerate += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::PointSet, table::SampleTable};

    #[test]
    fn embedding_dimensions_must_agree() {
        let table = SampleTable::new().with_values("z", &[1.0, 2.0]).unwrap();
        let data = SpatialData::new(PointSet::from_coords(&[[0.0], [1.0]]), table).unwrap();
        let target = PointSet::from_coords(&[[0.0, 0.0]]);

        assert!(matches!(
            EstimationProblem::new(&data, &target),
            Err(GeoStatsError::DimensionMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn outcomes_are_recorded() {
        let mut field = EstimatedField::with_len(3);
        Outcome::Estimated { mean: 1.0, variance: Some(0.5) }.record(0, &mut field);
        Outcome::Missing.record(1, &mut field);
        Outcome::Degenerate.record(2, &mut field);

        assert_eq!(field.mean, vec![Some(1.0), None, None]);
        assert_eq!(field.variance, vec![Some(0.5), None, None]);
        assert_eq!((field.missing, field.degenerate), (1, 1));
    }
}
