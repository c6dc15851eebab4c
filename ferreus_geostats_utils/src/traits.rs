/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the variogram trait consumed by the Kriging systems and the shared
// parameter conversion trait.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::variogram_params::VariogramParams;
use std::fmt::Debug;

/// An isotropic variogram model `γ(h)` of lag distance `h`.
///
/// Implementations follow the convention `γ(0) = 0`; a nugget shows up as a
/// discontinuity immediately away from the origin. For stationary models the
/// covariance is recovered with the sill-minus-variogram rule
/// `C(h) = sill − γ(h)`.
pub trait Variogram: Send + Sync + Debug {
    /// Semivariance at lag `h`.
    fn evaluate(&self, lag: f64) -> f64;

    /// Asymptotic value at large lags. Infinite for non-stationary models.
    fn sill(&self) -> f64;

    /// Semivariance jump at the origin.
    fn nugget(&self) -> f64;

    /// Practical range. Infinite for non-stationary models.
    fn range(&self) -> f64;

    /// Whether the model has a finite sill and therefore an associated covariance.
    fn is_stationary(&self) -> bool {
        true
    }

    /// Covariance at lag `h`, `sill − γ(h)`.
    #[inline(always)]
    fn covariance(&self, lag: f64) -> f64 {
        self.sill() - self.evaluate(lag)
    }
}

/// Converts a shared [`VariogramParams`] configuration into a concrete model type.
pub trait VariogramFromParams: Sized {
    /// Constructs `Self` from a set of uniform variogram parameters.
    fn from_params(p: &VariogramParams) -> Self;
}
