/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports variogram models, parameter types, and helper functions used across the
// ferreus_geostats crates.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the `ferreus_geostats` crate
//!
//! Provides the [`Variogram`] trait consumed by the Kriging systems, a registry of
//! theoretical variogram models, and small matrix/distance helpers built on
//! [`faer`](https://docs.rs/faer/latest/faer/).
//!
//! # Examples
//!
//! ```
//! use ferreus_geostats_utils::{Variogram, VariogramParams, VariogramType};
//!
//! let gaussian = VariogramParams::builder(VariogramType::Gaussian)
//!     .sill(2.0)
//!     .range(35.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(gaussian.evaluate(0.0), 0.0);
//! assert!((gaussian.covariance(0.0) - 2.0).abs() < 1e-12);
//! assert!(gaussian.is_stationary());
//! ```
mod traits;
mod variograms;
mod variogram_params;
mod utils;

/// Implemented theoretical variogram models.
pub mod models {
    pub use super::variograms::*;
}

pub use {
    traits::{Variogram, VariogramFromParams},
    variogram_params::{VariogramError, VariogramParams, VariogramParamsBuilder},
    utils::{
        VariogramType, get_covariance_matrix_symmetric,
        get_distance, get_distance_sq, get_pointarray_extents, select_mat_rows,
        variogram_gamma,
    },
};
