/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error type shared by the estimation and simulation solvers.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use ferreus_geostats_utils::VariogramError;
use thiserror::Error;

/// Errors raised while preparing or loading a geostatistical problem.
///
/// All of these surface during preprocessing, before any location is visited.
/// A singular or ill-conditioned local Kriging system is *not* an error; it is
/// reported through [`FittedSystem::status`](crate::FittedSystem::status) and
/// handled by the caller's fallback.
#[derive(Debug, Error)]
pub enum GeoStatsError {
    /// The variable has no non-missing samples.
    #[error("variable `{variable}` has no non-missing samples")]
    InsufficientData { variable: String },

    /// The per-variable parameters are inconsistent or unsupported.
    #[error("invalid configuration for variable `{variable}`: {reason}")]
    Configuration { variable: String, reason: String },

    /// The requested variable is not a column of the sample table.
    #[error("variable `{0}` is not present in the sample table")]
    UnknownVariable(String),

    /// Two collaborating collections disagree on a size or dimension.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Parameters of a marginal distribution are invalid.
    #[error("invalid marginal distribution: {0}")]
    InvalidDistribution(String),

    #[error(transparent)]
    Variogram(#[from] VariogramError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A table cell could not be read as a number.
    #[error("could not parse `{value}` in column `{column}` as a number")]
    Parse { column: String, value: String },
}

impl GeoStatsError {
    pub(crate) fn configuration(variable: &str, reason: impl Into<String>) -> Self {
        GeoStatsError::Configuration {
            variable: variable.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeoStatsError>;
