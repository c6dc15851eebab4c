/////////////////////////////////////////////////////////////////////////////////////////////
//
// Resolves Kriging variants and fits covariance systems for a validated variogram.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    drift::{DriftBasis, DriftFn},
    error::{GeoStatsError, Result},
    linalg::Factorization,
    system::FittedSystem,
};
use faer::Mat;
use ferreus_geostats_utils::Variogram;
use std::fmt;
use std::sync::Arc;

/// The flavour of Kriging used for one variable.
#[derive(Clone)]
pub enum KrigingVariant {
    /// Known constant mean, no drift.
    Simple { mean: f64 },

    /// Unknown constant mean.
    Ordinary,

    /// Polynomial drift of total degree `<= degree`.
    Universal { degree: usize },

    /// The constant term plus user supplied drift functions.
    ExternalDrift { drifts: Vec<DriftFn> },
}

impl fmt::Debug for KrigingVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KrigingVariant::Simple { mean } => write!(f, "Simple {{ mean: {} }}", mean),
            KrigingVariant::Ordinary => write!(f, "Ordinary"),
            KrigingVariant::Universal { degree } => write!(f, "Universal {{ degree: {} }}", degree),
            KrigingVariant::ExternalDrift { drifts } => {
                write!(f, "ExternalDrift {{ {} drifts }}", drifts.len())
            }
        }
    }
}

impl KrigingVariant {
    /// Picks the variant from optional parameters.
    ///
    /// Drift functions take precedence over a polynomial degree, which takes
    /// precedence over a known mean. With none of them the variant is Ordinary.
    pub fn resolve(mean: Option<f64>, degree: Option<usize>, drifts: &[DriftFn]) -> Self {
        if !drifts.is_empty() {
            KrigingVariant::ExternalDrift {
                drifts: drifts.to_vec(),
            }
        } else if let Some(degree) = degree {
            KrigingVariant::Universal { degree }
        } else if let Some(mean) = mean {
            KrigingVariant::Simple { mean }
        } else {
            KrigingVariant::Ordinary
        }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            KrigingVariant::Simple { .. } => "simple",
            KrigingVariant::Ordinary => "ordinary",
            KrigingVariant::Universal { .. } => "universal",
            KrigingVariant::ExternalDrift { .. } => "external drift",
        }
    }
}

/// A validated variogram, variant, and factorization for one variable.
///
/// Fitting is cheap to repeat; each call builds an independent
/// [`FittedSystem`] for the given neighbours.
#[derive(Clone)]
pub struct KrigingModel {
    variogram: Arc<dyn Variogram>,
    variant: KrigingVariant,
    factorization: Factorization,
    basis: DriftBasis,
}

impl fmt::Debug for KrigingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KrigingModel")
            .field("variogram", &self.variogram)
            .field("variant", &self.variant)
            .field("factorization", &self.factorization)
            .finish()
    }
}

impl KrigingModel {
    /// Validates the combination for `dimension`-dimensional data.
    ///
    /// Without an explicit factorization, stationary variograms use
    /// [`Factorization::Cholesky`] and non-stationary ones [`Factorization::Lu`].
    ///
    /// # Errors
    /// [`GeoStatsError::Configuration`] for Simple Kriging or a Cholesky
    /// factorization with a non-stationary variogram, or a non-finite mean.
    pub fn new(
        variable: &str,
        variogram: Arc<dyn Variogram>,
        variant: KrigingVariant,
        factorization: Option<Factorization>,
        dimension: usize,
    ) -> Result<Self> {
        let stationary = variogram.is_stationary();

        if let KrigingVariant::Simple { mean } = variant {
            if !stationary {
                return Err(GeoStatsError::configuration(
                    variable,
                    "simple Kriging requires a stationary variogram",
                ));
            }
            if !mean.is_finite() {
                return Err(GeoStatsError::configuration(
                    variable,
                    "simple Kriging mean must be finite",
                ));
            }
        }

        let factorization = match (factorization, stationary) {
            (Some(Factorization::Cholesky), false) => {
                return Err(GeoStatsError::configuration(
                    variable,
                    "Cholesky factorization requires a stationary variogram",
                ));
            }
            (Some(f), _) => f,
            (None, true) => Factorization::Cholesky,
            (None, false) => Factorization::Lu,
        };

        let basis = match &variant {
            KrigingVariant::Simple { .. } => DriftBasis::Zero,
            KrigingVariant::Ordinary => DriftBasis::Constant,
            KrigingVariant::Universal { degree } => DriftBasis::polynomial(dimension, *degree),
            KrigingVariant::ExternalDrift { drifts } => DriftBasis::External {
                functions: drifts.clone().into(),
            },
        };

        Ok(Self {
            variogram,
            variant,
            factorization,
            basis,
        })
    }

    pub fn variogram(&self) -> &Arc<dyn Variogram> {
        &self.variogram
    }

    pub fn variant(&self) -> &KrigingVariant {
        &self.variant
    }

    pub fn factorization(&self) -> Factorization {
        self.factorization
    }

    /// Mean of Simple Kriging, `None` for the other variants.
    pub fn simple_mean(&self) -> Option<f64> {
        match self.variant {
            KrigingVariant::Simple { mean } => Some(mean),
            _ => None,
        }
    }

    /// Builds and factorizes the system for the given neighbours.
    pub fn fit(&self, locations: Mat<f64>, values: Vec<f64>) -> FittedSystem {
        FittedSystem::build(
            self.variogram.clone(),
            self.basis.clone(),
            self.simple_mean(),
            self.factorization,
            locations,
            values,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;
    use ferreus_geostats_utils::models::{GaussianVariogram, PowerVariogram};

    fn gaussian() -> Arc<dyn Variogram> {
        Arc::new(GaussianVariogram {
            sill: 1.0,
            range: 10.0,
            nugget: 0.0,
        })
    }

    fn power() -> Arc<dyn Variogram> {
        Arc::new(PowerVariogram {
            scaling: 1.0,
            exponent: 1.5,
            nugget: 0.0,
        })
    }

    #[test]
    fn variant_precedence() {
        let drift: DriftFn = Arc::new(|x: &[f64]| x[0]);

        assert!(matches!(
            KrigingVariant::resolve(Some(1.0), Some(1), &[drift.clone()]),
            KrigingVariant::ExternalDrift { .. }
        ));
        assert!(matches!(
            KrigingVariant::resolve(Some(1.0), Some(1), &[]),
            KrigingVariant::Universal { degree: 1 }
        ));
        assert!(matches!(
            KrigingVariant::resolve(Some(1.0), None, &[]),
            KrigingVariant::Simple { .. }
        ));
        assert!(matches!(
            KrigingVariant::resolve(None, None, &[]),
            KrigingVariant::Ordinary
        ));
    }

    #[test]
    fn default_factorization_follows_stationarity() {
        let stationary = KrigingModel::new("z", gaussian(), KrigingVariant::Ordinary, None, 2).unwrap();
        assert_eq!(stationary.factorization(), Factorization::Cholesky);

        let intrinsic = KrigingModel::new("z", power(), KrigingVariant::Ordinary, None, 2).unwrap();
        assert_eq!(intrinsic.factorization(), Factorization::Lu);
    }

    #[test]
    fn non_stationary_restrictions() {
        let simple = KrigingModel::new("z", power(), KrigingVariant::Simple { mean: 0.0 }, None, 1);
        assert!(matches!(simple, Err(GeoStatsError::Configuration { .. })));

        let cholesky = KrigingModel::new(
            "z",
            power(),
            KrigingVariant::Ordinary,
            Some(Factorization::Cholesky),
            1,
        );
        assert!(matches!(cholesky, Err(GeoStatsError::Configuration { .. })));
    }

    #[test]
    fn universal_drift_reproduces_a_linear_trend() {
        let model = KrigingModel::new(
            "z",
            gaussian(),
            KrigingVariant::Universal { degree: 1 },
            None,
            1,
        )
        .unwrap();
        let system = model.fit(mat![[0.0], [2.0], [5.0], [9.0f64]], vec![1.0, 5.0, 11.0, 19.0]);
        assert!(system.status());

        // Far outside the data the estimate follows the fitted trend 2x + 1.
        let (mean, _) = system.predict(mat![[40.0f64]].row(0)).unwrap();
        assert!((mean - 81.0).abs() < 1e-6);
    }
}
