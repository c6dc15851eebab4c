/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies per-variable parameters for the Kriging and inverse distance estimators.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies per-variable parameters for the Kriging and inverse distance estimators.
use crate::{
    drift::DriftFn,
    linalg::Factorization,
    model::{KrigingModel, KrigingVariant},
    search::{Metric, Neighborhood, SearchSpec},
    error::Result,
};
use ferreus_geostats_utils::Variogram;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kriging parameters for one variable.
///
/// The variant is resolved from the optional fields once, during
/// preprocessing:
/// - any `drifts` give External Drift Kriging,
/// - else a `degree` gives Universal Kriging with a polynomial drift,
/// - else a `mean` gives Simple Kriging,
/// - else Ordinary Kriging.
///
/// Should be built with [`KrigingParams::builder`].
#[derive(Clone)]
pub struct KrigingParams {
    pub variogram: Arc<dyn Variogram>,
    pub mean: Option<f64>,
    pub degree: Option<usize>,
    pub drifts: Vec<DriftFn>,
    pub search: SearchSpec,
    pub factorization: Option<Factorization>,
}

impl fmt::Debug for KrigingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KrigingParams")
            .field("variogram", &self.variogram)
            .field("mean", &self.mean)
            .field("degree", &self.degree)
            .field("drifts", &self.drifts.len())
            .field("search", &self.search)
            .field("factorization", &self.factorization)
            .finish()
    }
}

impl KrigingParams {
    /// Returns a builder for the given variogram.
    ///
    /// # Example
    /// ```
    /// use ferreus_geostats::KrigingParams;
    /// use ferreus_geostats_utils::models::SphericalVariogram;
    ///
    /// let params = KrigingParams::builder(SphericalVariogram { sill: 1.0, range: 50.0, nugget: 0.1 })
    ///     .max_neighbors(16)
    ///     .min_neighbors(4)
    ///     .build();
    ///
    /// assert_eq!(params.search.max_neighbors, Some(16));
    /// ```
    pub fn builder(variogram: impl Variogram + 'static) -> KrigingParamsBuilder {
        KrigingParamsBuilder::new(Arc::new(variogram))
    }

    /// Builder starting from an already shared variogram.
    pub fn builder_shared(variogram: Arc<dyn Variogram>) -> KrigingParamsBuilder {
        KrigingParamsBuilder::new(variogram)
    }

    pub fn variant(&self) -> KrigingVariant {
        KrigingVariant::resolve(self.mean, self.degree, &self.drifts)
    }

    /// Resolves and validates the model for `dimension`-dimensional data.
    pub fn model(&self, variable: &str, dimension: usize) -> Result<KrigingModel> {
        KrigingModel::new(
            variable,
            self.variogram.clone(),
            self.variant(),
            self.factorization,
            dimension,
        )
    }
}

/// A convenience builder for constructing [`KrigingParams`].
#[derive(Clone)]
pub struct KrigingParamsBuilder {
    params: KrigingParams,
}

impl KrigingParamsBuilder {
    fn new(variogram: Arc<dyn Variogram>) -> Self {
        Self {
            params: KrigingParams {
                variogram,
                mean: None,
                degree: None,
                drifts: Vec::new(),
                search: SearchSpec::default(),
                factorization: None,
            },
        }
    }

    /// Sets a known mean (Simple Kriging).
    pub fn mean(mut self, mean: f64) -> Self {
        self.params.mean = Some(mean);
        self
    }

    /// Sets the polynomial drift degree (Universal Kriging).
    pub fn degree(mut self, degree: usize) -> Self {
        self.params.degree = Some(degree);
        self
    }

    /// Adds an external drift function.
    pub fn drift<F>(mut self, drift: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.params.drifts.push(Arc::new(drift));
        self
    }

    /// Replaces the whole search spec.
    pub fn search(mut self, search: SearchSpec) -> Self {
        self.params.search = search;
        self
    }

    pub fn min_neighbors(mut self, min_neighbors: usize) -> Self {
        self.params.search.min_neighbors = min_neighbors;
        self
    }

    pub fn max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.params.search.max_neighbors = Some(max_neighbors);
        self
    }

    pub fn neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.params.search.neighborhood = Some(neighborhood);
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.params.search.metric = metric;
        self
    }

    pub fn factorization(mut self, factorization: Factorization) -> Self {
        self.params.factorization = Some(factorization);
        self
    }

    pub fn build(self) -> KrigingParams {
        self.params
    }
}

/// Inverse distance weighting parameters for one variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdwParams {
    /// Distance exponent `p` of the weights `1 / dᵖ`.
    pub power: f64,
    pub search: SearchSpec,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 2.0,
            search: SearchSpec::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferreus_geostats_utils::{VariogramParams, VariogramType};

    #[test]
    fn builder_fills_the_search_spec() {
        let variogram = VariogramParams::builder(VariogramType::Exponential)
            .range(20.0)
            .build()
            .unwrap();
        let params = KrigingParams::builder(variogram)
            .min_neighbors(2)
            .max_neighbors(12)
            .neighborhood(Neighborhood::Ball { radius: 30.0 })
            .degree(1)
            .build();

        assert_eq!(params.search.min_neighbors, 2);
        assert_eq!(params.search.max_neighbors, Some(12));
        assert!(matches!(params.variant(), KrigingVariant::Universal { degree: 1 }));
    }

    #[test]
    fn drift_functions_win_over_a_mean() {
        let variogram = VariogramParams::builder(VariogramType::Spherical)
            .build()
            .unwrap();
        let params = KrigingParams::builder(variogram)
            .mean(3.0)
            .drift(|x| x[0] * x[0])
            .build();
        assert!(matches!(params.variant(), KrigingVariant::ExternalDrift { .. }));
        assert!(params.model("z", 1).is_ok());
    }

    #[test]
    fn idw_params_round_trip_through_json() {
        let params = IdwParams {
            power: 3.0,
            search: SearchSpec {
                max_neighbors: Some(8),
                ..SearchSpec::default()
            },
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: IdwParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
