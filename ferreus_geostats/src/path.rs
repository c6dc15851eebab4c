/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the traversal orders used to visit domain locations.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Order in which the elements of a domain are visited.
///
/// Estimation results do not depend on the path. Simulation results do, since
/// every simulated value conditions the ones visited after it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Path {
    /// `0, 1, ..., n - 1`.
    #[default]
    Linear,

    /// Linear order starting at `offset` and wrapping around.
    Shifted { offset: usize },

    /// A uniformly random permutation drawn from the supplied generator.
    Random,
}

impl Path {
    /// Returns the visiting order of `n` elements.
    ///
    /// Only [`Path::Random`] draws from `rng`.
    pub fn traverse<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<usize> {
        match *self {
            Path::Linear => (0..n).collect(),
            Path::Shifted { offset } => match n {
                0 => Vec::new(),
                _ => (0..n).map(|i| (i + offset) % n).collect(),
            },
            Path::Random => {
                let mut order = (0..n).collect::<Vec<_>>();
                order.shuffle(rng);
                order
            }
        }
    }
}
