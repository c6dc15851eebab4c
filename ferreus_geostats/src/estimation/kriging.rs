/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements Kriging estimation in exact (global) and local (moving neighbourhood) modes.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use super::{EstimatedField, EstimationProblem, EstimationSolution, Estimator, Outcome};
use crate::{
    config::KrigingParams,
    error::{GeoStatsError, Result},
    model::KrigingModel,
    path::Path,
    progress::{emit, ProgressMsg, ProgressSink},
    search::{NeighborBuffer, NeighborSearch},
    system::FittedSystem,
    table::SampleSet,
};
use faer::RowRef;
use ferreus_geostats_utils::select_mat_rows;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Kriging estimator over any number of variables.
///
/// Each variable is solved in one of two modes:
/// - *exact*, when the search is unbounded (no `max_neighbors`, or one at
///   least the sample count) and has no neighbourhood: a single system over
///   every sample is factorized once and reused for all locations;
/// - *local* otherwise: each location searches its own neighbours and fits a
///   fresh system. Locations with fewer than `min_neighbors` neighbours, and
///   those whose system is degenerate, are reported as missing.
///
/// # Example
/// ```
/// use ferreus_geostats::{
///     CartesianGrid, EstimationProblem, KrigingEstimator, KrigingParams, PointSet, SampleTable,
///     SpatialData,
/// };
/// use ferreus_geostats_utils::models::GaussianVariogram;
///
/// let table = SampleTable::new().with_values("z", &[1.0, 0.0, 1.0]).unwrap();
/// let data = SpatialData::new(PointSet::from_coords(&[[0.0], [50.0], [99.0]]), table).unwrap();
/// let grid = CartesianGrid::unit(&[100]).unwrap();
///
/// let estimator = KrigingEstimator::new().variable(
///     "z",
///     KrigingParams::builder(GaussianVariogram { sill: 1.0, range: 35.0, nugget: 0.0 }).build(),
/// );
/// let problem = EstimationProblem::new(&data, &grid).unwrap();
/// let solution = estimator.solve(&problem).unwrap();
///
/// let z = solution.get("z").unwrap();
/// assert!((z.mean[0].unwrap() - 1.0).abs() < 1e-9);
/// ```
#[derive(Clone, Default)]
pub struct KrigingEstimator {
    variables: BTreeMap<String, KrigingParams>,
    path: Path,
    seed: Option<u64>,
    progress_sink: Option<Arc<dyn ProgressSink>>,
}

/// Per-variable state shared read-only by every query of a solve.
pub struct KrigingPreproc {
    variables: BTreeMap<String, VariablePreproc>,
}

impl KrigingPreproc {
    /// Whether `variable` is estimated with one global system.
    pub fn is_exact(&self, variable: &str) -> Option<bool> {
        self.variables
            .get(variable)
            .map(|p| matches!(p.mode, KrigingMode::Exact(_)))
    }
}

struct VariablePreproc {
    model: KrigingModel,
    samples: SampleSet,
    mode: KrigingMode,
}

enum KrigingMode {
    Exact(FittedSystem),
    Local {
        search: NeighborSearch,
        min_neighbors: usize,
    },
}

impl KrigingEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the parameters of `variable`.
    pub fn variable(mut self, variable: &str, params: KrigingParams) -> Self {
        self.variables.insert(variable.to_string(), params);
        self
    }

    /// Sets the traversal order of the target domain.
    pub fn path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Seeds the generator used by [`Path::Random`].
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    /// Validates every variable and builds its search index or global system.
    ///
    /// All configuration and data errors surface here, before any location
    /// is visited.
    pub fn preprocess(&self, problem: &EstimationProblem<'_>) -> Result<KrigingPreproc> {
        let dimension = problem.data().domain().embedding_dimension();
        let mut variables = BTreeMap::new();

        for (name, params) in self.variables.iter() {
            let samples = problem.data().samples(name)?;
            let model = params.model(name, dimension)?;
            let n = samples.len();

            let spec = &params.search;
            let exact = spec.neighborhood.is_none()
                && spec.max_neighbors.map_or(true, |max| max >= n)
                && spec.min_neighbors <= n;

            let mode = match exact {
                true => {
                    spec.resolve(name, n, dimension)?;
                    KrigingMode::Exact(model.fit(samples.locations.clone(), samples.values.clone()))
                }
                false => {
                    // Resolved once inside `build`.
                    let search = NeighborSearch::build(name, &samples.locations, spec)?;
                    let min_neighbors = search.spec().min_neighbors;
                    KrigingMode::Local {
                        search,
                        min_neighbors,
                    }
                }
            };

            debug!(
                "variable `{}`: {} Kriging over {} samples in {} mode",
                name,
                model.variant().name(),
                n,
                match exact {
                    true => "exact",
                    false => "local",
                }
            );

            variables.insert(
                name.clone(),
                VariablePreproc {
                    model,
                    samples,
                    mode,
                },
            );
        }

        Ok(KrigingPreproc { variables })
    }

    /// Mean and variance of `variable` at `point`, `None` when the location
    /// is missing.
    pub fn estimate(
        &self,
        point: RowRef<'_, f64>,
        variable: &str,
        preproc: &KrigingPreproc,
        buffer: &mut NeighborBuffer,
    ) -> Result<Option<(f64, f64)>> {
        let prep = preproc
            .variables
            .get(variable)
            .ok_or_else(|| GeoStatsError::UnknownVariable(variable.to_string()))?;

        Ok(match Self::estimate_outcome(point, prep, buffer) {
            Outcome::Estimated { mean, variance } => Some((mean, variance.unwrap_or(0.0))),
            Outcome::Missing | Outcome::Degenerate => None,
        })
    }

    fn estimate_outcome(
        point: RowRef<'_, f64>,
        prep: &VariablePreproc,
        buffer: &mut NeighborBuffer,
    ) -> Outcome {
        let predicted = match &prep.mode {
            KrigingMode::Exact(system) => system.predict(point),
            KrigingMode::Local {
                search,
                min_neighbors,
            } => {
                let found = search.search(point, None, buffer);
                if found < *min_neighbors {
                    return Outcome::Missing;
                }

                let indices = buffer.indices().collect::<Vec<_>>();
                let locations = select_mat_rows(&prep.samples.locations, &indices);
                let values = indices.iter().map(|&i| prep.samples.values[i]).collect();
                prep.model.fit(locations, values).predict(point)
            }
        };

        match predicted {
            Some((mean, variance)) => Outcome::Estimated {
                mean,
                variance: Some(variance),
            },
            None => Outcome::Degenerate,
        }
    }

    /// Estimates every configured variable at every element of the target domain.
    pub fn solve(&self, problem: &EstimationProblem<'_>) -> Result<EstimationSolution> {
        let preproc = self.preprocess(problem)?;

        let n = problem.domain().num_elements();
        let centroids = problem.domain().centroids();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let order = self.path.traverse(n, &mut rng);

        let mut solution = EstimationSolution::default();

        for (name, prep) in preproc.variables.iter() {
            emit(
                &self.progress_sink,
                ProgressMsg::VariableStarted {
                    variable: name.clone(),
                    num_locations: n,
                },
            );

            let outcomes = order
                .par_iter()
                .map_init(NeighborBuffer::new, |buffer, &i| {
                    (i, Self::estimate_outcome(centroids.row(i), prep, buffer))
                })
                .collect::<Vec<_>>();

            let mut field = EstimatedField::with_len(n);
            for (i, outcome) in outcomes {
                outcome.record(i, &mut field);
            }

            debug!(
                "variable `{}`: {} locations, {} missing, {} degenerate",
                name, n, field.missing, field.degenerate
            );
            emit(
                &self.progress_sink,
                ProgressMsg::EstimationFinished {
                    variable: name.clone(),
                    missing: field.missing,
                    degenerate: field.degenerate,
                },
            );

            solution.fields.insert(name.clone(), field);
        }

        Ok(solution)
    }
}

impl Estimator for KrigingEstimator {
    fn solve(&self, problem: &EstimationProblem<'_>) -> Result<EstimationSolution> {
        KrigingEstimator::solve(self, problem)
    }
}
