/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for Kriging estimation and
// sequential conditional simulation.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Neighbourhood Kriging and sequential conditional simulation.
//!
//! Given scattered measurements of one or more variables, this crate predicts
//! their values, with uncertainty, at unobserved locations, or draws random
//! realizations of the whole field that honour the data and its spatial
//! structure.
//!
//! The engine is built from a few pieces:
//!
//! - **Neighbour search** - [`NeighborSearch`] answers K-nearest, metric ball
//!   and axis-aligned box queries over a KD-tree or R-tree, optionally
//!   restricted by an availability mask.
//! - **Covariance systems** - [`FittedSystem`] assembles and factorizes the
//!   Simple, Ordinary, Universal or External Drift Kriging system for one set
//!   of neighbours, using either Cholesky with a Schur complement or a
//!   partial-pivot LU.
//! - **Estimation** - [`KrigingEstimator`] solves every target location, either
//!   with one global system (exact mode) or a fresh local system per location.
//!   [`IdwEstimator`] shares the same search.
//! - **Simulation** - [`SequentialSimulator`] is the generic sequential
//!   algorithm over any [`ConditionalModel`]. [`SequentialGaussianSimulator`]
//!   uses Kriging as the conditional model.
//!
//! Query locations and realizations are processed in parallel with `rayon`.
//! Simulation takes an explicit random generator, so a seed fully determines
//! the realizations.
//!
//! # Features
//! - Supports 1D, 2D, and 3D input domains (box neighbourhoods and anisotropy
//!   up to 3D, K-nearest and ball searches in any dimension)
//! - Stationary and intrinsic (power) variogram models from
//!   [`ferreus_geostats_utils`]
//! - Sample tables with missing values, loadable from CSV
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra
//!
//! # Examples
//!
//! ```
//! use ferreus_geostats::{
//!     CartesianGrid, KrigingParams, PointSet, SampleTable, SequentialGaussianSimulator,
//!     SimulationProblem, SpatialData,
//! };
//! use ferreus_geostats_utils::models::ExponentialVariogram;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let table = SampleTable::new().with_values("grade", &[1.2, 0.4, 2.1]).unwrap();
//! let data = SpatialData::new(
//!     PointSet::from_coords(&[[2.0, 3.0], [10.0, 8.0], [17.0, 1.0]]),
//!     table,
//! )
//! .unwrap();
//! let grid = CartesianGrid::new(&[20, 10], &[0.0, 0.0], &[1.0, 1.0]).unwrap();
//!
//! let variogram = ExponentialVariogram { sill: 1.0, range: 12.0, nugget: 0.05 };
//! let sgs = SequentialGaussianSimulator::new()
//!     .variable("grade", KrigingParams::builder(variogram).max_neighbors(12).build());
//!
//! let problem = SimulationProblem::new(&data, &grid).unwrap();
//! let solution = sgs.solve(&problem, 3, &mut StdRng::seed_from_u64(42)).unwrap();
//!
//! assert_eq!(solution.get("grade").unwrap().len(), 3);
//! ```
pub mod progress;

pub mod config;

mod anisotropy;

mod common;

mod domain;

mod drift;

mod error;

mod estimation;

mod linalg;

mod model;

mod path;

mod search;

mod simulation;

mod system;

mod table;

pub use {
    anisotropy::Anisotropy,
    common::generate_random_points,
    config::{IdwParams, KrigingParams, KrigingParamsBuilder},
    domain::{CartesianGrid, Domain, PointSet},
    drift::DriftFn,
    error::{GeoStatsError, Result},
    estimation::{
        EstimatedField, EstimationProblem, EstimationSolution, Estimator, IdwEstimator,
        KrigingEstimator, KrigingPreproc,
    },
    linalg::Factorization,
    model::{KrigingModel, KrigingVariant},
    path::Path,
    search::{Metric, NeighborBuffer, NeighborSearch, Neighborhood, Neighbour, SearchSpec},
    simulation::{
        ConditionalModel, FittedDistribution, Mapping, Marginal, SequentialGaussianSimulator,
        SequentialSimulator, SimulationProblem, SimulationSolution,
    },
    system::FittedSystem,
    table::{SampleSet, SampleTable, SpatialData},
};
