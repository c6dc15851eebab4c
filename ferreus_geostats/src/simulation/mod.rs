/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the simulation problem, conditional model traits, and marginal distributions.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # simulation
//!
//! Sequential conditional simulation draws random fields that honour the
//! data and the spatial structure of a [`ConditionalModel`].
//!
//! [`SequentialSimulator`] is the generic algorithm: visit the domain along a
//! [`Path`](crate::Path), fit the model to the already simulated neighbours of
//! each location, and draw from the resulting conditional distribution. When a
//! location has too few neighbours, or the fitted model is degenerate, the
//! value is drawn from the variable's [`Marginal`] instead.
//!
//! [`SequentialGaussianSimulator`] plugs Kriging in as the conditional model.

mod mapping;
mod sequential;
mod sgs;

pub use mapping::Mapping;
pub use sequential::SequentialSimulator;
pub use sgs::SequentialGaussianSimulator;

use crate::{
    domain::Domain,
    error::{GeoStatsError, Result},
    model::KrigingModel,
    system::FittedSystem,
    table::SpatialData,
};
use faer::{Mat, RowRef};
use rand::distr::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;

/// A model fitted to one set of neighbours.
pub trait FittedDistribution {
    type Dist: Distribution<f64>;

    /// Whether the fit can produce conditional distributions.
    fn status(&self) -> bool;

    /// Conditional distribution at `point`, `None` if it cannot be formed.
    fn conditional(&self, point: RowRef<'_, f64>) -> Option<Self::Dist>;
}

/// Fits local conditional distributions from neighbouring values.
pub trait ConditionalModel: Send + Sync {
    type Fitted: FittedDistribution;

    fn fit(&self, locations: Mat<f64>, values: Vec<f64>) -> Self::Fitted;
}

impl FittedDistribution for FittedSystem {
    type Dist = Normal<f64>;

    fn status(&self) -> bool {
        FittedSystem::status(self)
    }

    fn conditional(&self, point: RowRef<'_, f64>) -> Option<Normal<f64>> {
        self.predict_distribution(point)
    }
}

impl ConditionalModel for KrigingModel {
    type Fitted = FittedSystem;

    fn fit(&self, locations: Mat<f64>, values: Vec<f64>) -> FittedSystem {
        KrigingModel::fit(self, locations, values)
    }
}

/// Distribution used when a location cannot be conditioned on its neighbours.
#[derive(Clone, Debug)]
pub enum Marginal {
    Normal(Normal<f64>),
    Uniform {
        low: f64,
        high: f64,
        distribution: Uniform<f64>,
    },
    /// Resamples the given values with replacement.
    Empirical(Vec<f64>),
}

impl Marginal {
    pub fn normal(mean: f64, std_dev: f64) -> Result<Self> {
        if !(mean.is_finite() && std_dev.is_finite()) {
            return Err(GeoStatsError::InvalidDistribution(
                "normal parameters must be finite".into(),
            ));
        }
        if std_dev < 0.0 {
            return Err(GeoStatsError::InvalidDistribution(format!(
                "normal standard deviation must be non-negative, got {std_dev}"
            )));
        }
        Normal::new(mean, std_dev)
            .map(Marginal::Normal)
            .map_err(|e| GeoStatsError::InvalidDistribution(e.to_string()))
    }

    pub fn uniform(low: f64, high: f64) -> Result<Self> {
        let distribution = Uniform::new(low, high)
            .map_err(|e| GeoStatsError::InvalidDistribution(e.to_string()))?;
        Ok(Marginal::Uniform {
            low,
            high,
            distribution,
        })
    }

    pub fn empirical(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return Err(GeoStatsError::InvalidDistribution(
                "empirical values must be non-empty and finite".into(),
            ));
        }
        Ok(Marginal::Empirical(values))
    }

    pub fn mean(&self) -> f64 {
        match self {
            Marginal::Normal(normal) => normal.mean(),
            Marginal::Uniform { low, high, .. } => 0.5 * (low + high),
            Marginal::Empirical(values) => values.iter().sum::<f64>() / values.len() as f64,
        }
    }

    pub fn std_dev(&self) -> f64 {
        match self {
            Marginal::Normal(normal) => normal.std_dev(),
            Marginal::Uniform { low, high, .. } => (high - low) / 12f64.sqrt(),
            Marginal::Empirical(values) => {
                let mean = self.mean();
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / values.len() as f64;
                variance.sqrt()
            }
        }
    }
}

impl Distribution<f64> for Marginal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Marginal::Normal(normal) => normal.sample(rng),
            Marginal::Uniform { distribution, .. } => distribution.sample(rng),
            Marginal::Empirical(values) => values[rng.random_range(0..values.len())],
        }
    }
}

/// Georeferenced data to be simulated over the elements of a target domain.
pub struct SimulationProblem<'a> {
    data: &'a SpatialData,
    domain: &'a dyn Domain,
}

impl<'a> SimulationProblem<'a> {
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

/// Realizations keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSolution {
    /// `realizations[variable][r][i]` is the value of element `i` in realization `r`.
    pub realizations: BTreeMap<String, Vec<Vec<f64>>>,

    /// Number of locations drawn from the marginal, per realization.
    pub fallbacks: BTreeMap<String, Vec<usize>>,
}

impl SimulationSolution {
    pub fn get(&self, variable: &str) -> Option<&[Vec<f64>]> {
        self.realizations.get(variable).map(Vec::as_slice)
    }
}
