/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates the constant, polynomial, and external drift bases of the Kriging systems.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::common;
use faer::{Mat, RowRef};
use std::fmt;
use std::sync::Arc;

/// A user supplied drift function `f(x)` evaluated on raw coordinates.
pub type DriftFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Exponents of every monomial of total degree `<= degree` in `dim` variables.
///
/// Terms are ordered by total degree and, within a degree, lexicographically
/// by the variables they multiply, e.g. `[1, x, y, x², xy, y²]` in 2D.
pub(crate) fn monomial_exponents(dim: usize, degree: usize) -> Vec<Vec<usize>> {
    let mut terms = vec![vec![0; dim]];
    let mut combinations: Vec<Vec<usize>> = vec![Vec::new()];

    for _ in 0..degree {
        let mut next = Vec::new();
        for combination in combinations.iter() {
            let start = combination.last().copied().unwrap_or(0);
            for axis in start..dim {
                let mut extended = combination.clone();
                extended.push(axis);
                next.push(extended);
            }
        }

        for combination in next.iter() {
            let mut exponents = vec![0; dim];
            for &axis in combination {
                exponents[axis] += 1;
            }
            terms.push(exponents);
        }
        combinations = next;
    }

    terms
}

/// The drift terms `F` augmenting a Kriging system.
#[derive(Clone)]
pub(crate) enum DriftBasis {
    /// No drift, as in Simple Kriging.
    Zero,

    /// The constant term of Ordinary Kriging.
    Constant,

    /// Monomials evaluated on coordinates scaled into `[-1, 1]^d`.
    Polynomial { exponents: Arc<[Vec<usize>]> },

    /// The constant term followed by one column per external function.
    External { functions: Arc<[DriftFn]> },
}

impl fmt::Debug for DriftBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftBasis::Zero => write!(f, "Zero"),
            DriftBasis::Constant => write!(f, "Constant"),
            DriftBasis::Polynomial { exponents } => {
                write!(f, "Polynomial({} terms)", exponents.len())
            }
            DriftBasis::External { functions } => {
                write!(f, "External({} functions)", functions.len())
            }
        }
    }
}

impl DriftBasis {
    pub(crate) fn polynomial(dim: usize, degree: usize) -> Self {
        DriftBasis::Polynomial {
            exponents: monomial_exponents(dim, degree).into(),
        }
    }

    /// Number of drift columns.
    pub(crate) fn num_terms(&self) -> usize {
        match self {
            DriftBasis::Zero => 0,
            DriftBasis::Constant => 1,
            DriftBasis::Polynomial { exponents } => exponents.len(),
            DriftBasis::External { functions } => 1 + functions.len(),
        }
    }

    /// Writes the drift terms of `point` into `out`.
    ///
    /// `translation_factor` and `scale_factor` map coordinates into the unit
    /// cube and are only used by polynomial terms.
    pub(crate) fn evaluate_into(
        &self,
        point: RowRef<'_, f64>,
        translation_factor: &[f64],
        scale_factor: &[f64],
        scratch: &mut Vec<f64>,
        out: &mut [f64],
    ) {
        match self {
            DriftBasis::Zero => {}
            DriftBasis::Constant => out[0] = 1.0,
            DriftBasis::Polynomial { exponents } => {
                scratch.clear();
                scratch.resize(point.ncols(), 0.0);
                common::scale_point(point, translation_factor, scale_factor, scratch);

                for (o, term) in out.iter_mut().zip(exponents.iter()) {
                    *o = term
                        .iter()
                        .zip(scratch.iter())
                        .map(|(&e, x)| x.powi(e as i32))
                        .product();
                }
            }
            DriftBasis::External { functions } => {
                scratch.clear();
                scratch.extend(point.iter().copied());

                out[0] = 1.0;
                for (o, function) in out[1..].iter_mut().zip(functions.iter()) {
                    *o = function(scratch);
                }
            }
        }
    }

    /// Drift matrix `F` with one row per point.
    pub(crate) fn evaluate(
        &self,
        points: &Mat<f64>,
        translation_factor: &[f64],
        scale_factor: &[f64],
    ) -> Mat<f64> {
        let num_terms = self.num_terms();
        let mut drift = Mat::<f64>::zeros(points.nrows(), num_terms);
        let mut scratch = Vec::with_capacity(points.ncols());
        let mut row = vec![0.0; num_terms];

        for i in 0..points.nrows() {
            self.evaluate_into(
                points.row(i),
                translation_factor,
                scale_factor,
                &mut scratch,
                &mut row,
            );
            for (j, value) in row.iter().enumerate() {
                drift[(i, j)] = *value;
            }
        }

        drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{mat, utils::approx::*};

    fn run_case(points: Mat<f64>, basis: DriftBasis, expected: Mat<f64>) {
        let d = points.ncols();
        let translation_factor = vec![0.0; d];
        let scale_factor = vec![1.0; d];

        let drift = basis.evaluate(&points, &translation_factor, &scale_factor);

        assert_eq!(drift.ncols(), basis.num_terms());
        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0 * 2.0);
        assert!(&drift ~ &expected);
    }

    #[test]
    fn constant_drift() {
        let points = mat![[1.0, 2.0], [3.0, 4.0f64]];
        run_case(points, DriftBasis::Constant, mat![[1.0], [1.0f64]]);
    }

    #[test]
    fn linear_drift_2d() {
        let points = mat![[1.0, 2.0], [3.0, 4.0f64]];
        // Basis: [1, x, y]
        let expected = mat![[1.0, 1.0, 2.0], [1.0, 3.0, 4.0f64]];
        run_case(points, DriftBasis::polynomial(2, 1), expected);
    }

    #[test]
    fn quadratic_drift_2d() {
        let points = mat![[1.0, 2.0], [3.0, 4.0f64]];
        // Basis: [1, x, y, x^2, x*y, y^2]
        let expected = mat![
            [1.0, 1.0, 2.0, 1.0, 2.0, 4.0],
            [1.0, 3.0, 4.0, 9.0, 12.0, 16.0f64],
        ];
        run_case(points, DriftBasis::polynomial(2, 2), expected);
    }

    #[test]
    fn quadratic_drift_3d() {
        let points = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0f64]];
        // Basis: [1, x, y, z, x^2, x*y, x*z, y^2, y*z, z^2]
        let expected = mat![
            [1.0, 1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 4.0, 6.0, 9.0],
            [1.0, 4.0, 5.0, 6.0, 16.0, 20.0, 24.0, 25.0, 30.0, 36.0f64],
        ];
        run_case(points, DriftBasis::polynomial(3, 2), expected);
    }

    #[test]
    fn cubic_term_count() {
        // (d + k)! / (d! k!) with d = 2, k = 3
        assert_eq!(monomial_exponents(2, 3).len(), 10);
        assert_eq!(monomial_exponents(3, 0), vec![vec![0, 0, 0]]);
    }

    #[test]
    fn external_drift_prepends_constant() {
        let points = mat![[1.0, 2.0], [3.0, 4.0f64]];
        let sum: DriftFn = Arc::new(|x: &[f64]| x.iter().sum());
        let basis = DriftBasis::External {
            functions: vec![sum].into(),
        };
        let expected = mat![[1.0, 3.0], [1.0, 7.0f64]];
        run_case(points, basis, expected);
    }

    #[test]
    fn polynomial_terms_use_scaled_coordinates() {
        let points = mat![[10.0f64], [20.0]];
        let drift = DriftBasis::polynomial(1, 1).evaluate(&points, &[15.0], &[5.0]);
        assert_eq!(drift, mat![[1.0, -1.0], [1.0, 1.0f64]]);
    }
}
