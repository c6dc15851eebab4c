/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds, factorizes, and evaluates Kriging covariance systems.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # system
//!
//! A [`FittedSystem`] is a factorized Kriging system for one set of
//! neighbours. It is built once and can then answer any number of point
//! predictions against the same neighbours.
//!
//! For stationary variograms the system is assembled from covariances
//! `C(h) = sill − γ(h)`. For non-stationary variograms the generalized
//! covariance `−γ(h)` is used instead, which is only admissible together with
//! at least a constant drift term.

use crate::{
    common,
    drift::DriftBasis,
    linalg::{Factorization, SystemFactor},
};
use faer::{Mat, RowRef};
use ferreus_geostats_utils::{get_covariance_matrix_symmetric, get_distance_sq, Variogram};
use rand_distr::Normal;
use std::sync::Arc;

/// Queries closer than this to a sample return the sample value exactly.
const COINCIDENT_DISTANCE: f64 = 1e-12;

/// Covariance or generalized covariance used to fill the system.
#[inline(always)]
fn system_value(stationary: bool) -> impl Fn(&dyn Variogram, f64) -> f64 {
    move |variogram: &dyn Variogram, lag: f64| match stationary {
        true => variogram.covariance(lag),
        false => -variogram.evaluate(lag),
    }
}

/// A factorized Kriging system over a fixed set of neighbours.
///
/// `status() == false` marks a degenerate system: no neighbours, fewer
/// neighbours than drift terms, a failed factorization, or one too
/// ill-conditioned to trust. Degenerate systems never produce a prediction.
///
/// Zero-nugget Gaussian variograms make the covariance of many closely spaced
/// neighbours numerically singular, so such systems are degenerate and callers
/// fall back. Fewer neighbours or a small nugget avoid this.
pub struct FittedSystem {
    factor: Option<SystemFactor>,
    variogram: Arc<dyn Variogram>,
    locations: Mat<f64>,
    values: Vec<f64>,
    basis: DriftBasis,
    simple_mean: Option<f64>,
    stationary: bool,
    translation_factor: Vec<f64>,
    scale_factor: Vec<f64>,
}

impl FittedSystem {
    /// Assembles and factorizes the system for `locations` with `values`.
    ///
    /// `simple_mean` selects Simple Kriging and must be paired with
    /// [`DriftBasis::Zero`].
    pub(crate) fn build(
        variogram: Arc<dyn Variogram>,
        basis: DriftBasis,
        simple_mean: Option<f64>,
        factorization: Factorization,
        locations: Mat<f64>,
        values: Vec<f64>,
    ) -> Self {
        let stationary = variogram.is_stationary();
        let (translation_factor, scale_factor) = common::get_unit_cube_scaling_factors(&locations);

        let n = locations.nrows();
        let factor = match n == 0 || n < basis.num_terms() {
            true => None,
            false => {
                let c = get_covariance_matrix_symmetric(
                    &locations,
                    variogram.as_ref(),
                    system_value(stationary),
                );
                let f = match basis.num_terms() {
                    0 => None,
                    _ => Some(basis.evaluate(&locations, &translation_factor, &scale_factor)),
                };
                SystemFactor::new(factorization, &c, f.as_ref())
            }
        };

        Self {
            factor,
            variogram,
            locations,
            values,
            basis,
            simple_mean,
            stationary,
            translation_factor,
            scale_factor,
        }
    }

    /// Whether the system can be used for prediction.
    pub fn status(&self) -> bool {
        self.factor.is_some()
    }

    /// Number of neighbours in the system.
    pub fn num_neighbours(&self) -> usize {
        self.values.len()
    }

    /// Kriging mean and variance at `point`.
    ///
    /// Returns `None` when the system is degenerate or the solve produced
    /// non-finite values. The variance is clamped at zero.
    pub fn predict(&self, point: RowRef<'_, f64>) -> Option<(f64, f64)> {
        let factor = self.factor.as_ref()?;

        for (i, value) in self.values.iter().enumerate() {
            let d2 = get_distance_sq(point, self.locations.row(i));
            if d2 <= COINCIDENT_DISTANCE * COINCIDENT_DISTANCE {
                return Some((*value, 0.0));
            }
        }

        let n = self.locations.nrows();
        let value = system_value(self.stationary);
        let variogram = self.variogram.as_ref();

        let c0 = Mat::<f64>::from_fn(n, 1, |i, _| {
            value(variogram, get_distance_sq(point, self.locations.row(i)).sqrt())
        });

        let num_terms = self.basis.num_terms();
        let mut f0 = Mat::<f64>::zeros(num_terms, 1);
        if num_terms > 0 {
            let mut scratch = Vec::with_capacity(point.ncols());
            let mut terms = vec![0.0; num_terms];
            self.basis.evaluate_into(
                point,
                &self.translation_factor,
                &self.scale_factor,
                &mut scratch,
                &mut terms,
            );
            for (j, t) in terms.into_iter().enumerate() {
                f0[(j, 0)] = t;
            }
        }

        let (lambda, mu) = factor.solve(&c0, &f0);

        let mean = match self.simple_mean {
            Some(m) => {
                m + (0..n)
                    .map(|i| lambda[(i, 0)] * (self.values[i] - m))
                    .sum::<f64>()
            }
            None => (0..n).map(|i| lambda[(i, 0)] * self.values[i]).sum::<f64>(),
        };

        let c00 = value(variogram, 0.0);
        let lambda_c0 = (0..n).map(|i| lambda[(i, 0)] * c0[(i, 0)]).sum::<f64>();
        let mu_f0 = (0..num_terms).map(|j| mu[(j, 0)] * f0[(j, 0)]).sum::<f64>();
        let variance = (c00 - lambda_c0 - mu_f0).max(0.0);

        match mean.is_finite() && variance.is_finite() {
            true => Some((mean, variance)),
            false => None,
        }
    }

    /// Conditional Gaussian distribution at `point`, `Normal(mean, sqrt(variance))`.
    pub fn predict_distribution(&self, point: RowRef<'_, f64>) -> Option<Normal<f64>> {
        let (mean, variance) = self.predict(point)?;
        Normal::new(mean, variance.sqrt()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;
    use ferreus_geostats_utils::models::{
        ExponentialVariogram, GaussianVariogram, PowerVariogram, SphericalVariogram,
    };

    fn gaussian() -> Arc<dyn Variogram> {
        Arc::new(GaussianVariogram {
            sill: 1.0,
            range: 35.0,
            nugget: 0.0,
        })
    }

    fn line_data() -> (Mat<f64>, Vec<f64>) {
        (mat![[0.0], [50.0], [99.0f64]], vec![1.0, 0.0, 1.0])
    }

    #[test]
    fn ordinary_kriging_is_exact_at_data() {
        let (locations, values) = line_data();
        let system = FittedSystem::build(
            gaussian(),
            DriftBasis::Constant,
            None,
            Factorization::Cholesky,
            locations.clone(),
            values.clone(),
        );
        assert!(system.status());

        for i in 0..3 {
            let (mean, variance) = system.predict(locations.row(i)).unwrap();
            assert!((mean - values[i]).abs() < 1e-10);
            assert!(variance.abs() < 1e-10);
        }
    }

    #[test]
    fn off_data_predictions_are_bounded_by_the_sill() {
        let (locations, values) = line_data();
        let system = FittedSystem::build(
            Arc::new(SphericalVariogram {
                sill: 2.0,
                range: 30.0,
                nugget: 0.0,
            }),
            DriftBasis::Constant,
            None,
            Factorization::Cholesky,
            locations,
            values,
        );

        let q = mat![[25.0f64]];
        let (mean, variance) = system.predict(q.row(0)).unwrap();
        assert!(mean > 0.0 && mean < 1.0);
        assert!(variance > 0.0);

        // Far from every sample the variance exceeds the sill (the mean is estimated).
        let far = mat![[1000.0f64]];
        let (_, far_variance) = system.predict(far.row(0)).unwrap();
        assert!(far_variance > 2.0);
        assert!(far_variance > variance);
    }

    #[test]
    fn simple_kriging_reverts_to_the_mean() {
        let (locations, values) = line_data();
        let system = FittedSystem::build(
            Arc::new(ExponentialVariogram {
                sill: 1.0,
                range: 10.0,
                nugget: 0.0,
            }),
            DriftBasis::Zero,
            Some(0.5),
            Factorization::Cholesky,
            locations,
            values,
        );

        let far = mat![[10_000.0f64]];
        let (mean, variance) = system.predict(far.row(0)).unwrap();
        assert!((mean - 0.5).abs() < 1e-9);
        assert!((variance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cholesky_and_lu_give_the_same_prediction() {
        let locations = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 2.0], [3.0, 1.0], [2.0, 2.5f64]];
        let values = vec![1.0, 2.0, 0.5, 3.0, 1.5];
        let build = |factorization| {
            FittedSystem::build(
                Arc::new(ExponentialVariogram {
                    sill: 1.0,
                    range: 4.0,
                    nugget: 0.1,
                }),
                DriftBasis::polynomial(2, 1),
                None,
                factorization,
                locations.clone(),
                values.clone(),
            )
        };
        let chol = build(Factorization::Cholesky);
        let lu = build(Factorization::Lu);

        let q = mat![[1.2, 1.1f64]];
        let (m1, v1) = chol.predict(q.row(0)).unwrap();
        let (m2, v2) = lu.predict(q.row(0)).unwrap();
        assert!((m1 - m2).abs() < 1e-8);
        assert!((v1 - v2).abs() < 1e-8);
    }

    #[test]
    fn intrinsic_model_solves_with_lu() {
        let (locations, values) = line_data();
        let system = FittedSystem::build(
            Arc::new(PowerVariogram {
                scaling: 1.0,
                exponent: 1.0,
                nugget: 0.0,
            }),
            DriftBasis::Constant,
            None,
            Factorization::Lu,
            locations,
            values,
        );
        assert!(system.status());

        // A linear variogram interpolates linearly between neighbours.
        let q = mat![[25.0f64]];
        let (mean, variance) = system.predict(q.row(0)).unwrap();
        assert!(mean > 0.0 && mean < 1.0);
        assert!(variance > 0.0);
    }

    #[test]
    fn degenerate_systems_report_status() {
        let empty = FittedSystem::build(
            gaussian(),
            DriftBasis::Constant,
            None,
            Factorization::Cholesky,
            Mat::zeros(0, 1),
            Vec::new(),
        );
        assert!(!empty.status());
        assert!(empty.predict(mat![[0.0f64]].row(0)).is_none());

        // Three terms cannot be identified from two samples.
        let underdetermined = FittedSystem::build(
            gaussian(),
            DriftBasis::polynomial(1, 2),
            None,
            Factorization::Cholesky,
            mat![[0.0], [1.0f64]],
            vec![1.0, 2.0],
        );
        assert!(!underdetermined.status());

        // Two samples at the same location.
        let duplicated = FittedSystem::build(
            gaussian(),
            DriftBasis::Constant,
            None,
            Factorization::Cholesky,
            mat![[0.0], [0.0], [5.0f64]],
            vec![1.0, 2.0, 3.0],
        );
        assert!(!duplicated.status());
        assert!(duplicated.predict_distribution(mat![[2.0f64]].row(0)).is_none());
    }

    #[test]
    fn distribution_matches_prediction() {
        use rand_distr::Distribution;

        let (locations, values) = line_data();
        let system = FittedSystem::build(
            gaussian(),
            DriftBasis::Constant,
            None,
            Factorization::Cholesky,
            locations,
            values,
        );
        let q = mat![[20.0f64]];
        let (mean, variance) = system.predict(q.row(0)).unwrap();
        let normal = system.predict_distribution(q.row(0)).unwrap();
        assert!((normal.mean() - mean).abs() < 1e-12);
        assert!((normal.std_dev() - variance.sqrt()).abs() < 1e-12);

        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(3);
        assert!(normal.sample(&mut rng).is_finite());
    }
}
