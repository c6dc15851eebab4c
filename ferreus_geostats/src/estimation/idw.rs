/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements inverse distance weighting over the shared neighbour search.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use super::{EstimatedField, EstimationProblem, EstimationSolution, Estimator, Outcome};
use crate::{
    config::IdwParams,
    error::{GeoStatsError, Result},
    progress::{emit, ProgressMsg, ProgressSink},
    search::{NeighborBuffer, NeighborSearch},
    table::SampleSet,
};
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Neighbours closer than this are treated as coincident with the query.
const COINCIDENT_DISTANCE: f64 = 1e-12;

/// Inverse distance weighting estimator.
///
/// Estimates `Σ wᵢ zᵢ / Σ wᵢ` with `wᵢ = 1 / dᵢᵖ` over the neighbours found
/// by the search, with distances measured in the search metric. A neighbour
/// coincident with the query returns its value. No variance is reported.
#[derive(Clone, Default)]
pub struct IdwEstimator {
    variables: BTreeMap<String, IdwParams>,
    progress_sink: Option<Arc<dyn ProgressSink>>,
}

struct IdwPreproc {
    power: f64,
    min_neighbors: usize,
    samples: SampleSet,
    search: NeighborSearch,
}

impl IdwEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the parameters of `variable`.
    pub fn variable(mut self, variable: &str, params: IdwParams) -> Self {
        self.variables.insert(variable.to_string(), params);
        self
    }

    pub fn progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    fn preprocess(&self, problem: &EstimationProblem<'_>) -> Result<BTreeMap<String, IdwPreproc>> {
        let mut variables = BTreeMap::new();

        for (name, params) in self.variables.iter() {
            if !(params.power.is_finite() && params.power > 0.0) {
                return Err(GeoStatsError::configuration(
                    name,
                    "IDW power must be finite and positive",
                ));
            }

            let samples = problem.data().samples(name)?;
            let search = NeighborSearch::build(name, &samples.locations, &params.search)?;

            variables.insert(
                name.clone(),
                IdwPreproc {
                    power: params.power,
                    min_neighbors: search.spec().min_neighbors,
                    samples,
                    search,
                },
            );
        }

        Ok(variables)
    }

    fn estimate_outcome(
        point: faer::RowRef<'_, f64>,
        prep: &IdwPreproc,
        buffer: &mut NeighborBuffer,
    ) -> Outcome {
        let found = prep.search.search(point, None, buffer);
        if found < prep.min_neighbors || found == 0 {
            return Outcome::Missing;
        }

        let mut weighted = 0.0;
        let mut total = 0.0;
        for neighbour in buffer.neighbours() {
            let value = prep.samples.values[neighbour.index];
            if neighbour.distance <= COINCIDENT_DISTANCE {
                return Outcome::Estimated {
                    mean: value,
                    variance: None,
                };
            }
            let w = neighbour.distance.powf(-prep.power);
            weighted += w * value;
            total += w;
        }

        match total > 0.0 && (weighted / total).is_finite() {
            true => Outcome::Estimated {
                mean: weighted / total,
                variance: None,
            },
            false => Outcome::Degenerate,
        }
    }

    /// Estimates every configured variable at every element of the target domain.
    pub fn solve(&self, problem: &EstimationProblem<'_>) -> Result<EstimationSolution> {
        let preproc = self.preprocess(problem)?;
        let n = problem.domain().num_elements();
        let centroids = problem.domain().centroids();

        let mut solution = EstimationSolution::default();

        for (name, prep) in preproc.iter() {
            emit(
                &self.progress_sink,
                ProgressMsg::VariableStarted {
                    variable: name.clone(),
                    num_locations: n,
                },
            );

            let outcomes = (0..n)
                .into_par_iter()
                .map_init(NeighborBuffer::new, |buffer, i| {
                    (i, Self::estimate_outcome(centroids.row(i), prep, buffer))
                })
                .collect::<Vec<_>>();

            let mut field = EstimatedField::with_len(n);
            for (i, outcome) in outcomes {
                outcome.record(i, &mut field);
            }

            debug!(
                "variable `{}`: IDW over {} samples, {} missing",
                name,
                prep.samples.len(),
                field.missing
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

impl Estimator for IdwEstimator {
    fn solve(&self, problem: &EstimationProblem<'_>) -> Result<EstimationSolution> {
        IdwEstimator::solve(self, problem)
    }
}
