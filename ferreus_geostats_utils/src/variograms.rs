/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the concrete theoretical variogram models.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{Variogram, VariogramFromParams, VariogramParams};

/// Lags below this are treated as the origin, where `γ(0) = 0`.
const ZERO_LAG: f64 = 1e-15;

/// Gaussian model, `γ(h) = n + (s − n)(1 − exp(−3 (h/a)²))`.
#[derive(Clone, Debug, Copy)]
pub struct GaussianVariogram {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl GaussianVariogram {
    #[inline(always)]
    pub fn gamma(&self, h: f64) -> f64 {
        if h < ZERO_LAG {
            return 0.0;
        }
        let hr = h / self.range;
        self.nugget + (self.sill - self.nugget) * (1.0 - (-3.0 * hr * hr).exp())
    }
}

impl Variogram for GaussianVariogram {
    #[inline(always)]
    fn evaluate(&self, lag: f64) -> f64 {
        self.gamma(lag)
    }

    fn sill(&self) -> f64 {
        self.sill
    }

    fn nugget(&self) -> f64 {
        self.nugget
    }

    fn range(&self) -> f64 {
        self.range
    }
}

impl VariogramFromParams for GaussianVariogram {
    #[inline(always)]
    fn from_params(p: &VariogramParams) -> Self {
        GaussianVariogram {
            sill: p.sill,
            range: p.range,
            nugget: p.nugget,
        }
    }
}

/// Exponential model, `γ(h) = n + (s − n)(1 − exp(−3 h/a))`.
#[derive(Clone, Debug, Copy)]
pub struct ExponentialVariogram {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl ExponentialVariogram {
    #[inline(always)]
    pub fn gamma(&self, h: f64) -> f64 {
        if h < ZERO_LAG {
            return 0.0;
        }
        self.nugget + (self.sill - self.nugget) * (1.0 - (-3.0 * h / self.range).exp())
    }
}

impl Variogram for ExponentialVariogram {
    #[inline(always)]
    fn evaluate(&self, lag: f64) -> f64 {
        self.gamma(lag)
    }

    fn sill(&self) -> f64 {
        self.sill
    }

    fn nugget(&self) -> f64 {
        self.nugget
    }

    fn range(&self) -> f64 {
        self.range
    }
}

impl VariogramFromParams for ExponentialVariogram {
    #[inline(always)]
    fn from_params(p: &VariogramParams) -> Self {
        ExponentialVariogram {
            sill: p.sill,
            range: p.range,
            nugget: p.nugget,
        }
    }
}

/// Spherical model, reaching the sill exactly at the range.
///
/// `γ(h) = n + (s − n)(1.5 h/a − 0.5 (h/a)³)` for `h < a`, `s` otherwise.
#[derive(Clone, Debug, Copy)]
pub struct SphericalVariogram {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl SphericalVariogram {
    #[inline(always)]
    pub fn gamma(&self, h: f64) -> f64 {
        if h < ZERO_LAG {
            return 0.0;
        }
        if h >= self.range {
            return self.sill;
        }
        let hr = h / self.range;
        self.nugget + (self.sill - self.nugget) * (1.5 * hr - 0.5 * hr * hr * hr)
    }
}

impl Variogram for SphericalVariogram {
    #[inline(always)]
    fn evaluate(&self, lag: f64) -> f64 {
        self.gamma(lag)
    }

    fn sill(&self) -> f64 {
        self.sill
    }

    fn nugget(&self) -> f64 {
        self.nugget
    }

    fn range(&self) -> f64 {
        self.range
    }
}

impl VariogramFromParams for SphericalVariogram {
    #[inline(always)]
    fn from_params(p: &VariogramParams) -> Self {
        SphericalVariogram {
            sill: p.sill,
            range: p.range,
            nugget: p.nugget,
        }
    }
}

/// Cubic model, smooth at the origin and reaching the sill at the range.
#[derive(Clone, Debug, Copy)]
pub struct CubicVariogram {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl CubicVariogram {
    #[inline(always)]
    pub fn gamma(&self, h: f64) -> f64 {
        if h < ZERO_LAG {
            return 0.0;
        }
        if h >= self.range {
            return self.sill;
        }
        let t = h / self.range;
        let t2 = t * t;
        let t3 = t2 * t;
        let t5 = t3 * t2;
        let t7 = t5 * t2;
        let shape = 7.0 * t2 - 8.75 * t3 + 3.5 * t5 - 0.75 * t7;
        self.nugget + (self.sill - self.nugget) * shape
    }
}

impl Variogram for CubicVariogram {
    #[inline(always)]
    fn evaluate(&self, lag: f64) -> f64 {
        self.gamma(lag)
    }

    fn sill(&self) -> f64 {
        self.sill
    }

    fn nugget(&self) -> f64 {
        self.nugget
    }

    fn range(&self) -> f64 {
        self.range
    }
}

impl VariogramFromParams for CubicVariogram {
    #[inline(always)]
    fn from_params(p: &VariogramParams) -> Self {
        CubicVariogram {
            sill: p.sill,
            range: p.range,
            nugget: p.nugget,
        }
    }
}

/// Pure nugget effect. Spatially uncorrelated noise with variance `n`.
#[derive(Clone, Debug, Copy)]
pub struct NuggetVariogram {
    pub nugget: f64,
}

impl NuggetVariogram {
    #[inline(always)]
    pub fn gamma(&self, h: f64) -> f64 {
        match h < ZERO_LAG {
            true => 0.0,
            false => self.nugget,
        }
    }
}

impl Variogram for NuggetVariogram {
    #[inline(always)]
    fn evaluate(&self, lag: f64) -> f64 {
        self.gamma(lag)
    }

    fn sill(&self) -> f64 {
        self.nugget
    }

    fn nugget(&self) -> f64 {
        self.nugget
    }

    fn range(&self) -> f64 {
        0.0
    }
}

impl VariogramFromParams for NuggetVariogram {
    #[inline(always)]
    fn from_params(p: &VariogramParams) -> Self {
        NuggetVariogram { nugget: p.nugget }
    }
}

/// Power model, `γ(h) = n + c h^α` with `0 < α < 2`.
///
/// Unbounded, so it has no sill and no covariance. Only usable with
/// Kriging variants that carry at least a constant drift.
#[derive(Clone, Debug, Copy)]
pub struct PowerVariogram {
    pub scaling: f64,
    pub exponent: f64,
    pub nugget: f64,
}

impl PowerVariogram {
    #[inline(always)]
    pub fn gamma(&self, h: f64) -> f64 {
        if h < ZERO_LAG {
            return 0.0;
        }
        self.nugget + self.scaling * h.powf(self.exponent)
    }
}

impl Variogram for PowerVariogram {
    #[inline(always)]
    fn evaluate(&self, lag: f64) -> f64 {
        self.gamma(lag)
    }

    fn sill(&self) -> f64 {
        f64::INFINITY
    }

    fn nugget(&self) -> f64 {
        self.nugget
    }

    fn range(&self) -> f64 {
        f64::INFINITY
    }

    fn is_stationary(&self) -> bool {
        false
    }
}

impl VariogramFromParams for PowerVariogram {
    #[inline(always)]
    fn from_params(p: &VariogramParams) -> Self {
        PowerVariogram {
            scaling: p.sill,
            exponent: p.exponent,
            nugget: p.nugget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn origin_is_zero_for_every_model() {
        assert_eq!(GaussianVariogram { sill: 1.0, range: 10.0, nugget: 0.2 }.gamma(0.0), 0.0);
        assert_eq!(ExponentialVariogram { sill: 1.0, range: 10.0, nugget: 0.2 }.gamma(0.0), 0.0);
        assert_eq!(SphericalVariogram { sill: 1.0, range: 10.0, nugget: 0.2 }.gamma(0.0), 0.0);
        assert_eq!(CubicVariogram { sill: 1.0, range: 10.0, nugget: 0.2 }.gamma(0.0), 0.0);
        assert_eq!(NuggetVariogram { nugget: 0.2 }.gamma(0.0), 0.0);
        assert_eq!(PowerVariogram { scaling: 1.0, exponent: 1.5, nugget: 0.2 }.gamma(0.0), 0.0);
    }

    #[test]
    fn nugget_appears_just_off_the_origin() {
        let g = GaussianVariogram { sill: 1.0, range: 10.0, nugget: 0.25 };
        assert!((g.gamma(1e-9) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn bounded_models_reach_the_sill_at_the_range() {
        let s = SphericalVariogram { sill: 3.0, range: 10.0, nugget: 0.0 };
        assert!((s.gamma(10.0) - 3.0).abs() < TOL);
        assert!((s.gamma(25.0) - 3.0).abs() < TOL);

        let c = CubicVariogram { sill: 3.0, range: 10.0, nugget: 0.0 };
        assert!((c.gamma(10.0 - 1e-9) - 3.0).abs() < 1e-6);
        assert!((c.gamma(11.0) - 3.0).abs() < TOL);
    }

    #[test]
    fn asymptotic_models_reach_95_percent_at_the_practical_range() {
        let g = GaussianVariogram { sill: 1.0, range: 35.0, nugget: 0.0 };
        assert!((g.gamma(35.0) - (1.0 - (-3.0f64).exp())).abs() < TOL);

        let e = ExponentialVariogram { sill: 1.0, range: 35.0, nugget: 0.0 };
        assert!((e.gamma(35.0) - (1.0 - (-3.0f64).exp())).abs() < TOL);
    }

    #[test]
    fn models_are_monotone_non_decreasing() {
        let models: Vec<Box<dyn Variogram>> = vec![
            Box::new(GaussianVariogram { sill: 2.0, range: 7.0, nugget: 0.1 }),
            Box::new(ExponentialVariogram { sill: 2.0, range: 7.0, nugget: 0.1 }),
            Box::new(SphericalVariogram { sill: 2.0, range: 7.0, nugget: 0.1 }),
            Box::new(CubicVariogram { sill: 2.0, range: 7.0, nugget: 0.1 }),
            Box::new(PowerVariogram { scaling: 0.5, exponent: 1.2, nugget: 0.1 }),
        ];

        for model in models.iter() {
            let mut last = 0.0;
            for k in 1..200 {
                let value = model.evaluate(k as f64 * 0.1);
                assert!(value + TOL >= last, "{:?} decreased at lag {}", model, k as f64 * 0.1);
                last = value;
            }
        }
    }

    #[test]
    fn covariance_is_sill_minus_variogram() {
        let g = GaussianVariogram { sill: 2.0, range: 5.0, nugget: 0.0 };
        assert!((g.covariance(0.0) - 2.0).abs() < TOL);
        assert!((g.covariance(3.0) - (2.0 - g.gamma(3.0))).abs() < TOL);
    }

    #[test]
    fn power_model_is_not_stationary() {
        let p = PowerVariogram { scaling: 1.0, exponent: 1.0, nugget: 0.0 };
        assert!(!p.is_stationary());
        assert!(p.sill().is_infinite());
        assert!((p.gamma(4.0) - 4.0).abs() < TOL);
    }
}
