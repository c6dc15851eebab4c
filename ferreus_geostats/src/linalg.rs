/////////////////////////////////////////////////////////////////////////////////////////////
//
// Adds the factorizations used to solve Kriging systems, with conditioning checks.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{
    linalg::solvers::{Llt, PartialPivLu, Solve},
    Mat, MatRef, Side,
};
use serde::{Deserialize, Serialize};

/// Smallest accepted value of `(min diag(L) / max diag(L))²`, an estimate of
/// the reciprocal condition number of an LLᵀ factor.
///
/// Systems below this lose most significant digits of their weights. Smooth
/// zero-nugget models (Gaussian, cubic) over closely spaced neighbours
/// usually fail the LLᵀ itself before reaching this check; a small nugget
/// keeps them factorizable.
const RCOND_THRESHOLD: f64 = 1e-13;

/// Largest accepted error when the LU factor reproduces a known solution.
const LU_PROBE_TOLERANCE: f64 = 1e-6;

/// How a Kriging system is factorized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Factorization {
    /// LLᵀ of the covariance block, then LLᵀ of the drift Schur complement.
    /// Requires a stationary variogram.
    Cholesky,

    /// Partial-pivot LU of the full augmented system.
    Lu,
}

/// A factorized system.
///
/// Solves `[C F; Fᵀ 0] [λ; μ] = [c0; f0]`, or `C λ = c0` without drift.
pub(crate) enum SystemFactor {
    Cholesky {
        llt: Llt<f64>,
        drift: Option<SchurFactor>,
    },
    Lu {
        lu: PartialPivLu<f64>,
        num_points: usize,
    },
}

/// Factor of `S = Fᵀ C⁻¹ F`, with `W = C⁻¹ F` kept for back substitution.
pub(crate) struct SchurFactor {
    f: Mat<f64>,
    w: Mat<f64>,
    llt: Llt<f64>,
}

fn is_finite(m: MatRef<'_, f64>) -> bool {
    m.col_iter().all(|c| c.iter().all(|v| v.is_finite()))
}

fn well_conditioned(l: MatRef<'_, f64>) -> bool {
    let n = l.nrows();
    if n == 0 {
        return true;
    }

    let mut min = f64::INFINITY;
    let mut max = 0.0f64;
    for i in 0..n {
        let d = l[(i, i)].abs();
        min = min.min(d);
        max = max.max(d);
    }

    max.is_finite() && max > 0.0 && (min / max).powi(2) > RCOND_THRESHOLD
}

impl SystemFactor {
    /// Factorizes the system with covariance block `c` and optional drift `f`.
    ///
    /// Returns `None` when the factorization fails or the system is too
    /// ill-conditioned to trust.
    pub(crate) fn new(factorization: Factorization, c: &Mat<f64>, f: Option<&Mat<f64>>) -> Option<Self> {
        if !is_finite(c.as_ref()) || f.is_some_and(|f| !is_finite(f.as_ref())) {
            return None;
        }

        match factorization {
            Factorization::Cholesky => Self::cholesky(c, f),
            Factorization::Lu => Self::lu(c, f),
        }
    }

    fn cholesky(c: &Mat<f64>, f: Option<&Mat<f64>>) -> Option<Self> {
        let llt = c.llt(Side::Lower).ok()?;
        if !well_conditioned(llt.L()) {
            return None;
        }

        let drift = match f {
            Some(f) if f.ncols() > 0 => {
                let w = llt.solve(f.as_ref());
                let schur = f.transpose() * w.as_ref();
                let schur_llt = schur.llt(Side::Lower).ok()?;
                if !well_conditioned(schur_llt.L()) {
                    return None;
                }
                Some(SchurFactor {
                    f: f.clone(),
                    w,
                    llt: schur_llt,
                })
            }
            _ => None,
        };

        Some(SystemFactor::Cholesky { llt, drift })
    }

    fn lu(c: &Mat<f64>, f: Option<&Mat<f64>>) -> Option<Self> {
        let n = c.nrows();
        let p = f.map_or(0, |f| f.ncols());

        let mut a = Mat::<f64>::zeros(n + p, n + p);
        a.submatrix_mut(0, 0, n, n).copy_from(c.as_ref());
        if let Some(f) = f {
            a.submatrix_mut(0, n, n, p).copy_from(f.as_ref());
            a.submatrix_mut(n, 0, p, n).copy_from(f.transpose());
        }

        let lu = a.partial_piv_lu();

        // Singular systems surface as a factor that cannot reproduce a known
        // solution, so solve for the all-ones vector and compare.
        let ones = Mat::<f64>::from_fn(n + p, 1, |_, _| 1.0);
        let b = a.as_ref() * ones.as_ref();
        let x = lu.solve(b.as_ref());
        let max_error = (0..n + p)
            .map(|i| (x[(i, 0)] - 1.0).abs())
            .fold(0.0f64, |acc, e| match e.is_nan() {
                true => f64::INFINITY,
                false => acc.max(e),
            });
        if !(max_error.is_finite() && max_error < LU_PROBE_TOLERANCE) {
            return None;
        }

        Some(SystemFactor::Lu { lu, num_points: n })
    }

    /// Solves for the Kriging weights `λ` and the drift multipliers `μ`.
    ///
    /// `c0` is `(n, 1)` and `f0` is `(p, 1)`. `μ` is empty without drift.
    pub(crate) fn solve(&self, c0: &Mat<f64>, f0: &Mat<f64>) -> (Mat<f64>, Mat<f64>) {
        match self {
            SystemFactor::Cholesky { llt, drift } => {
                let a = llt.solve(c0.as_ref());
                match drift {
                    Some(schur) => {
                        let rhs = schur.f.transpose() * a.as_ref() - f0.as_ref();
                        let mu = schur.llt.solve(rhs.as_ref());
                        let lambda = a - schur.w.as_ref() * mu.as_ref();
                        (lambda, mu)
                    }
                    None => (a, Mat::<f64>::zeros(0, 1)),
                }
            }
            SystemFactor::Lu { lu, num_points } => {
                let n = *num_points;
                let p = f0.nrows();
                let mut rhs = Mat::<f64>::zeros(n + p, 1);
                rhs.submatrix_mut(0, 0, n, 1).copy_from(c0.as_ref());
                rhs.submatrix_mut(n, 0, p, 1).copy_from(f0.as_ref());

                let x = lu.solve(rhs.as_ref());
                let (lambda, mu) = x.as_ref().split_at_row(n);
                (lambda.to_owned(), mu.to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{mat, utils::approx::*};

    /// Deterministic SPD matrix: A = M Mᵀ + alpha I.
    fn make_spd(n: usize, alpha: f64) -> Mat<f64> {
        let m = Mat::<f64>::from_fn(n, n, |i, j| {
            let x = (i as f64 + 1.0) * (j as f64 + 2.0);
            (x.sin() + 2.0 * x.cos()) / (1.0 + (i + j + 1) as f64)
        });
        let mut a = m.as_ref() * m.transpose();
        for i in 0..n {
            a[(i, i)] += alpha;
        }
        a
    }

    fn augmented(c: &Mat<f64>, f: &Mat<f64>) -> Mat<f64> {
        let (n, p) = f.shape();
        let mut a = Mat::<f64>::zeros(n + p, n + p);
        a.submatrix_mut(0, 0, n, n).copy_from(c.as_ref());
        a.submatrix_mut(0, n, n, p).copy_from(f.as_ref());
        a.submatrix_mut(n, 0, p, n).copy_from(f.transpose());
        a
    }

    #[test]
    fn cholesky_and_lu_agree_on_augmented_systems() {
        let n = 6;
        let c = make_spd(n, 0.5);
        let f = Mat::<f64>::from_fn(n, 2, |i, j| match j {
            0 => 1.0,
            _ => i as f64,
        });
        let c0 = Mat::<f64>::from_fn(n, 1, |i, _| 1.0 / (1.0 + i as f64));
        let f0 = mat![[1.0], [2.5f64]];

        let chol = SystemFactor::new(Factorization::Cholesky, &c, Some(&f)).unwrap();
        let lu = SystemFactor::new(Factorization::Lu, &c, Some(&f)).unwrap();

        let (l1, m1) = chol.solve(&c0, &f0);
        let (l2, m2) = lu.solve(&c0, &f0);

        let approx_eq = CwiseMat(ApproxEq::eps() * 1e6);
        assert!(&l1 ~ &l2);
        assert!(&m1 ~ &m2);

        // The solution satisfies the full system.
        let mut x = Mat::<f64>::zeros(n + 2, 1);
        x.submatrix_mut(0, 0, n, 1).copy_from(l1.as_ref());
        x.submatrix_mut(n, 0, 2, 1).copy_from(m1.as_ref());
        let lhs = augmented(&c, &f).as_ref() * x.as_ref();
        let mut rhs = Mat::<f64>::zeros(n + 2, 1);
        rhs.submatrix_mut(0, 0, n, 1).copy_from(c0.as_ref());
        rhs.submatrix_mut(n, 0, 2, 1).copy_from(f0.as_ref());
        assert!(&lhs ~ &rhs);
    }

    #[test]
    fn cholesky_without_drift_solves_c() {
        let c = make_spd(4, 1.0);
        let c0 = Mat::<f64>::from_fn(4, 1, |i, _| i as f64);
        let factor = SystemFactor::new(Factorization::Cholesky, &c, None).unwrap();
        let (lambda, mu) = factor.solve(&c0, &Mat::zeros(0, 1));

        assert_eq!(mu.nrows(), 0);
        let approx_eq = CwiseMat(ApproxEq::eps() * 1e4);
        let reproduced = c.as_ref() * lambda.as_ref();
        assert!(&reproduced ~ &c0);
    }

    #[test]
    fn singular_systems_are_rejected() {
        // Two identical rows.
        let c = mat![[1.0, 1.0, 0.5], [1.0, 1.0, 0.5], [0.5, 0.5, 1.0f64]];
        assert!(SystemFactor::new(Factorization::Cholesky, &c, None).is_none());
        assert!(SystemFactor::new(Factorization::Lu, &c, None).is_none());
    }

    #[test]
    fn drift_that_cannot_be_identified_is_rejected() {
        // Two drift columns that are multiples of each other.
        let c = make_spd(4, 1.0);
        let f = Mat::<f64>::from_fn(4, 2, |_, j| (j + 1) as f64);
        assert!(SystemFactor::new(Factorization::Cholesky, &c, Some(&f)).is_none());
    }

    #[test]
    fn non_finite_entries_are_rejected() {
        let c = mat![[1.0, f64::NAN], [f64::NAN, 1.0f64]];
        assert!(SystemFactor::new(Factorization::Lu, &c, None).is_none());
    }
}
