/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines anisotropic rotation and scaling transforms applied before neighbour search.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{mat, Mat};
use serde::{Deserialize, Serialize};

/// Geometric anisotropy expressed as principal directions and axis ratios.
///
/// Distances are measured after rotating into the principal frame and dividing
/// each axis by its ratio, so a larger ratio stretches the search along that
/// axis. Ratios are relative; the major axis usually carries `1.0`.
///
/// **Note:** All angles are specified in **degrees**.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Anisotropy {
    /// 1D anisotropy, a plain rescaling of the single axis.
    One { major_ratio: f64 },

    /// 2D anisotropy in the XY plane.
    Two {
        /// Rotation angle of the major axis from +X (positive = clockwise).
        rotation_angle: f64,
        major_ratio: f64,
        minor_ratio: f64,
    },

    /// 3D anisotropy using dip direction, dip and pitch, applied as a
    /// Z-X-Z′ rotation sequence with the left-hand rule.
    Three {
        dip: f64,
        dip_direction: f64,
        pitch: f64,
        major_ratio: f64,
        semi_major_ratio: f64,
        minor_ratio: f64,
    },
}

impl Anisotropy {
    /// Number of axes the anisotropy is defined for.
    pub fn dimension(&self) -> usize {
        match self {
            Anisotropy::One { .. } => 1,
            Anisotropy::Two { .. } => 2,
            Anisotropy::Three { .. } => 3,
        }
    }

    fn ratios(&self) -> Vec<f64> {
        match *self {
            Anisotropy::One { major_ratio } => vec![major_ratio],
            Anisotropy::Two {
                major_ratio,
                minor_ratio,
                ..
            } => vec![major_ratio, minor_ratio],
            Anisotropy::Three {
                major_ratio,
                semi_major_ratio,
                minor_ratio,
                ..
            } => vec![major_ratio, semi_major_ratio, minor_ratio],
        }
    }

    /// Whether every ratio is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.ratios().iter().all(|r| r.is_finite() && *r > 0.0)
    }

    /// Linear map `M` such that anisotropic distance is `‖M (a − b)‖`.
    ///
    /// Points are treated as column vectors.
    pub fn matrix(&self) -> Mat<f64> {
        let rotation = match *self {
            Anisotropy::One { .. } => mat![[1.0]],
            Anisotropy::Two { rotation_angle, .. } => {
                // Negated so world coordinates unwind into the local frame.
                let r = -rotation_angle.to_radians();
                mat![[r.cos(), r.sin()], [-r.sin(), r.cos()]]
            }
            Anisotropy::Three {
                dip,
                dip_direction,
                pitch,
                ..
            } => {
                let dipr = -dip.to_radians();
                let dipdirr = -dip_direction.to_radians();
                let pitchr = -pitch.to_radians();

                let rot_z = mat![
                    [dipdirr.cos(), dipdirr.sin(), 0.0],
                    [-dipdirr.sin(), dipdirr.cos(), 0.0],
                    [0.0, 0.0, 1.0],
                ];
                let rot_x = mat![
                    [1.0, 0.0, 0.0],
                    [0.0, dipr.cos(), dipr.sin()],
                    [0.0, -dipr.sin(), dipr.cos()],
                ];
                let rot_z_2 = mat![
                    [pitchr.cos(), pitchr.sin(), 0.0],
                    [-pitchr.sin(), pitchr.cos(), 0.0],
                    [0.0, 0.0, 1.0],
                ];

                rot_z_2 * rot_x * rot_z
            }
        };

        let ratios = self.ratios();
        let scale = Mat::from_fn(ratios.len(), ratios.len(), |i, j| match i == j {
            true => 1.0 / ratios[i],
            false => 0.0,
        });

        scale * rotation
    }
}

/// Applies a precomputed anisotropy matrix to coordinates.
#[derive(Clone, Debug)]
pub(crate) struct AnisotropyTransform {
    matrix: Mat<f64>,
}

impl AnisotropyTransform {
    pub(crate) fn new(anisotropy: &Anisotropy) -> Self {
        Self {
            matrix: anisotropy.matrix(),
        }
    }

    /// Writes `M x` into `out`.
    #[inline]
    pub(crate) fn apply(&self, x: &[f64], out: &mut [f64]) {
        for (i, o) in out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (j, xj) in x.iter().enumerate() {
                acc += self.matrix[(i, j)] * xj;
            }
            *o = acc;
        }
    }

    /// Transforms every row of `points`.
    pub(crate) fn apply_rows(&self, points: &Mat<f64>) -> Mat<f64> {
        // Rows are points, so the map is applied as `X Mᵀ`.
        points.as_ref() * self.matrix.transpose()
    }
}
