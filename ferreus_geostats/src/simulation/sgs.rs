/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements Sequential Gaussian Simulation with Kriging as the conditional model.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use super::{Mapping, Marginal, SequentialSimulator, SimulationProblem, SimulationSolution};
use crate::{
    config::KrigingParams,
    error::{GeoStatsError, Result},
    model::KrigingModel,
    path::Path,
    progress::ProgressSink,
};
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sequential Gaussian Simulation.
///
/// Each location is drawn from the Kriging distribution
/// `Normal(mean, sqrt(variance))` fitted to its simulated neighbours. The
/// default marginal is `Normal(m, sqrt(sill))`, where `m` is the Simple
/// Kriging mean when one is given and the sample mean otherwise. Variables
/// with a non-stationary variogram need an explicit marginal.
#[derive(Clone, Default)]
pub struct SequentialGaussianSimulator {
    variables: BTreeMap<String, (KrigingParams, Option<Marginal>)>,
    path: Path,
    mapping: Mapping,
    progress_sink: Option<Arc<dyn ProgressSink>>,
}

impl SequentialGaussianSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable using the default marginal.
    pub fn variable(mut self, variable: &str, params: KrigingParams) -> Self {
        self.variables.insert(variable.to_string(), (params, None));
        self
    }

    /// Adds or replaces a variable with an explicit marginal.
    pub fn variable_with_marginal(
        mut self,
        variable: &str,
        params: KrigingParams,
        marginal: Marginal,
    ) -> Self {
        self.variables
            .insert(variable.to_string(), (params, Some(marginal)));
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

    /// Resolves every variable into the generic simulator.
    pub fn simulator(
        &self,
        problem: &SimulationProblem<'_>,
    ) -> Result<SequentialSimulator<KrigingModel>> {
        let dimension = problem.data().domain().embedding_dimension();

        let mut simulator = SequentialSimulator::new()
            .path(self.path)
            .mapping(self.mapping);
        if let Some(sink) = &self.progress_sink {
            simulator = simulator.progress_sink(sink.clone());
        }

        for (name, (params, marginal)) in self.variables.iter() {
            let model = params.model(name, dimension)?;

            let marginal = match marginal {
                Some(marginal) => marginal.clone(),
                None => {
                    if !model.variogram().is_stationary() {
                        return Err(GeoStatsError::configuration(
                            name,
                            "a non-stationary variogram needs an explicit marginal",
                        ));
                    }
                    let mean = match model.simple_mean() {
                        Some(mean) => mean,
                        None => problem.data().samples(name)?.mean(),
                    };
                    Marginal::normal(mean, model.variogram().sill().sqrt())?
                }
            };

            simulator = simulator.variable(name, model, params.search.clone(), marginal);
        }

        Ok(simulator)
    }

    /// Simulates `num_realizations` realizations of every variable.
    pub fn solve<R: Rng>(
        &self,
        problem: &SimulationProblem<'_>,
        num_realizations: usize,
        rng: &mut R,
    ) -> Result<SimulationSolution> {
        self.simulator(problem)?.solve(problem, num_realizations, rng)
    }
}
