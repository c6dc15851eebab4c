/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides parameter and builder types for configuring variogram models.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::utils::VariogramType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a [`VariogramParamsBuilder`] is finalised with values that do not
/// describe a valid model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VariogramError {
    #[error("invalid variogram parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Defines the [`VariogramType`] to use, along with its structural parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VariogramParams {
    /// VariogramType enum variant to use.
    pub variogram_type: VariogramType,

    /// Total sill, the semivariance approached at large lags (nugget included).
    ///
    /// For the power model this is the scaling factor `c` in `c h^α`.
    pub sill: f64,

    /// Practical range. Lags beyond it are essentially uncorrelated.
    ///
    /// Ignored by the nugget and power models.
    pub range: f64,

    /// Discontinuity at the origin. Must not exceed the sill for bounded models.
    pub nugget: f64,

    /// Exponent `α` of the power model, in `(0, 2)`.
    pub exponent: f64,
}

impl VariogramParams {
    /// Begins building a [`VariogramParams`] instance for the given model type.
    pub fn builder(variogram_type: VariogramType) -> VariogramParamsBuilder {
        VariogramParamsBuilder {
            variogram_type,
            sill: 1.0,
            range: 1.0,
            nugget: 0.0,
            exponent: 1.0,
        }
    }
}

/// Builder for [`VariogramParams`] that provides sensible defaults.
#[derive(Debug, Clone, Copy)]
pub struct VariogramParamsBuilder {
    variogram_type: VariogramType,
    sill: f64,
    range: f64,
    nugget: f64,
    exponent: f64,
}

impl VariogramParamsBuilder {
    /// Sets the `sill` parameter on the builder.
    pub fn sill(mut self, v: f64) -> Self {
        self.sill = v;
        self
    }

    /// Sets the `range` parameter on the builder.
    pub fn range(mut self, v: f64) -> Self {
        self.range = v;
        self
    }

    /// Sets the `nugget` parameter on the builder.
    pub fn nugget(mut self, v: f64) -> Self {
        self.nugget = v;
        self
    }

    /// Sets the `exponent` parameter on the builder. Only read by the power model.
    pub fn exponent(mut self, v: f64) -> Self {
        self.exponent = v;
        self
    }

    /// Finalises the builder into a [`VariogramParams`] value.
    pub fn build(self) -> Result<VariogramParams, VariogramError> {
        let invalid = |name: &'static str, reason: &str| VariogramError::InvalidParameter {
            name,
            reason: reason.to_string(),
        };

        if !(self.nugget.is_finite() && self.nugget >= 0.0) {
            return Err(invalid("nugget", "must be finite and non-negative"));
        }

        match self.variogram_type {
            VariogramType::Nugget => {}
            VariogramType::Power => {
                if !(self.sill.is_finite() && self.sill > 0.0) {
                    return Err(invalid("sill", "power scaling must be positive"));
                }
                if !(self.exponent > 0.0 && self.exponent < 2.0) {
                    return Err(invalid("exponent", "must lie in (0, 2)"));
                }
            }
            _ => {
                if !(self.range.is_finite() && self.range > 0.0) {
                    return Err(invalid("range", "must be finite and positive"));
                }
                if !(self.sill.is_finite() && self.sill > 0.0) {
                    return Err(invalid("sill", "must be finite and positive"));
                }
                if self.nugget > self.sill {
                    return Err(invalid("nugget", "cannot exceed the sill"));
                }
            }
        }

        Ok(VariogramParams {
            variogram_type: self.variogram_type,
            sill: self.sill,
            range: self.range,
            nugget: self.nugget,
            exponent: self.exponent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nugget_above_sill() {
        let result = VariogramParams::builder(VariogramType::Spherical)
            .sill(1.0)
            .nugget(1.5)
            .range(10.0)
            .build();

        assert!(matches!(
            result,
            Err(VariogramError::InvalidParameter { name: "nugget", .. })
        ));
    }

    #[test]
    fn rejects_non_positive_range() {
        let result = VariogramParams::builder(VariogramType::Gaussian)
            .range(0.0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn power_exponent_must_be_below_two() {
        let result = VariogramParams::builder(VariogramType::Power)
            .exponent(2.0)
            .build();
        assert!(matches!(
            result,
            Err(VariogramError::InvalidParameter { name: "exponent", .. })
        ));
    }

    #[test]
    fn params_round_trip_through_json() {
        let params = VariogramParams::builder(VariogramType::Exponential)
            .sill(2.5)
            .range(40.0)
            .nugget(0.5)
            .build()
            .unwrap();

        let json = serde_json::to_string(&params).unwrap();
        let back: VariogramParams = serde_json::from_str(&json).unwrap();

        assert!(matches!(back.variogram_type, VariogramType::Exponential));
        assert_eq!(back.sill, 2.5);
        assert_eq!(back.range, 40.0);
        assert_eq!(back.nugget, 0.5);
    }
}
