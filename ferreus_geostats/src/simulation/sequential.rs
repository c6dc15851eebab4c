/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the generic path-based sequential conditional simulation algorithm.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use super::{
    ConditionalModel, FittedDistribution, Mapping, Marginal, SimulationProblem, SimulationSolution,
};
use crate::{
    error::Result,
    path::Path,
    progress::{emit, ProgressMsg, ProgressSink},
    search::{NeighborBuffer, NeighborSearch, SearchSpec},
};
use faer::Mat;
use ferreus_geostats_utils::select_mat_rows;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Distribution;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Conditional model, search, and marginal of one simulated variable.
struct SimulatedVariable<M> {
    model: M,
    search: SearchSpec,
    marginal: Marginal,
}

/// Everything a realization of one variable reads, built once per solve.
struct RealizationSetup<'a, M> {
    variable: &'a str,
    model: &'a M,
    marginal: &'a Marginal,
    search: NeighborSearch,
    min_neighbors: usize,
    centroids: &'a Mat<f64>,
    /// `(element, value)` pairs fixed by the data.
    conditioning: Vec<(usize, f64)>,
}

/// Sequential conditional simulation over a generic [`ConditionalModel`].
///
/// For each realization the elements mapped to data are fixed first. The
/// remaining elements are visited in path order, and each one is drawn from
/// the model fitted to its already simulated neighbours, or from the marginal
/// when that is not possible. Every simulated value joins the conditioning set
/// of the elements visited after it.
///
/// Realizations run in parallel. Each owns a generator derived from the
/// caller's generator before any parallel work starts, so results depend only
/// on the caller's seed.
pub struct SequentialSimulator<M> {
    variables: BTreeMap<String, SimulatedVariable<M>>,
    path: Path,
    mapping: Mapping,
    progress_sink: Option<Arc<dyn ProgressSink>>,
}

impl<M> Default for SequentialSimulator<M> {
    fn default() -> Self {
        Self {
            variables: BTreeMap::new(),
            path: Path::default(),
            mapping: Mapping::default(),
            progress_sink: None,
        }
    }
}

impl<M: ConditionalModel> SequentialSimulator<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable.
    pub fn variable(mut self, variable: &str, model: M, search: SearchSpec, marginal: Marginal) -> Self {
        self.variables.insert(
            variable.to_string(),
            SimulatedVariable {
                model,
                search,
                marginal,
            },
        );
        self
    }

    pub fn path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    pub fn mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    /// Simulates `num_realizations` realizations of every variable.
    pub fn solve<R: Rng>(
        &self,
        problem: &SimulationProblem<'_>,
        num_realizations: usize,
        rng: &mut R,
    ) -> Result<SimulationSolution> {
        let centroids = problem.domain().centroids();

        let mut setups = Vec::with_capacity(self.variables.len());
        for (name, variable) in self.variables.iter() {
            let samples = problem.data().samples(name)?;
            let mapped = self.mapping.map(
                name,
                &samples,
                problem.data().domain(),
                problem.domain(),
            )?;
            let search = NeighborSearch::build(name, &centroids, &variable.search)?;

            setups.push(RealizationSetup {
                variable: name.as_str(),
                model: &variable.model,
                marginal: &variable.marginal,
                min_neighbors: search.spec().min_neighbors,
                search,
                centroids: &centroids,
                conditioning: mapped
                    .into_iter()
                    .map(|(element, s)| (element, samples.values[s]))
                    .collect(),
            });
        }

        // One stream per (variable, realization), drawn in a fixed order.
        let streams = setups
            .iter()
            .map(|_| {
                (0..num_realizations)
                    .map(|_| StdRng::from_rng(&mut *rng))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let mut solution = SimulationSolution::default();

        for (setup, streams) in setups.iter().zip(streams) {
            emit(
                &self.progress_sink,
                ProgressMsg::VariableStarted {
                    variable: setup.variable.to_string(),
                    num_locations: centroids.nrows(),
                },
            );

            let results = streams
                .into_par_iter()
                .enumerate()
                .map(|(realization, mut stream)| {
                    let (values, fallbacks) = self.realize(setup, &mut stream);
                    emit(
                        &self.progress_sink,
                        ProgressMsg::RealizationFinished {
                            variable: setup.variable.to_string(),
                            realization,
                            fallbacks,
                        },
                    );
                    (values, fallbacks)
                })
                .collect::<Vec<_>>();

            let (realizations, fallbacks): (Vec<_>, Vec<_>) = results.into_iter().unzip();
            debug!(
                "variable `{}`: {} realizations, {} conditioning elements, {} marginal draws",
                setup.variable,
                num_realizations,
                setup.conditioning.len(),
                fallbacks.iter().sum::<usize>()
            );

            solution
                .realizations
                .insert(setup.variable.to_string(), realizations);
            solution
                .fallbacks
                .insert(setup.variable.to_string(), fallbacks);
        }

        Ok(solution)
    }

    /// Runs one realization, returning its values and the number of marginal draws.
    fn realize(&self, setup: &RealizationSetup<'_, M>, rng: &mut StdRng) -> (Vec<f64>, usize) {
        let n = setup.centroids.nrows();
        let mut values = vec![0.0; n];
        let mut simulated = vec![false; n];
        for &(element, value) in setup.conditioning.iter() {
            values[element] = value;
            simulated[element] = true;
        }

        let order = self.path.traverse(n, rng);
        let mut buffer = NeighborBuffer::new();
        let mut fallbacks = 0usize;

        for &element in order.iter() {
            if simulated[element] {
                continue;
            }
            let point = setup.centroids.row(element);

            let found = setup.search.search(point, Some(&simulated), &mut buffer);
            let conditional = match found == 0 || found < setup.min_neighbors {
                true => None,
                false => {
                    let indices = buffer.indices().collect::<Vec<_>>();
                    let locations = select_mat_rows(setup.centroids, &indices);
                    let neighbour_values = indices.iter().map(|&i| values[i]).collect();
                    let fitted = setup.model.fit(locations, neighbour_values);
                    match fitted.status() {
                        true => fitted.conditional(point),
                        false => None,
                    }
                }
            };

            values[element] = match conditional {
                Some(distribution) => distribution.sample(rng),
                None => {
                    fallbacks += 1;
                    setup.marginal.sample(rng)
                }
            };
            simulated[element] = true;
        }

        (values, fallbacks)
    }
}
