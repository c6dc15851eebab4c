/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies general-purpose utilities for matrices, distances, and variogram dispatch.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{Variogram, VariogramParams};
use faer::{Mat, RowRef};
use serde::{Deserialize, Serialize};

/// Returns an owned `Mat<T>` from a subset of row indices.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use ferreus_geostats_utils::select_mat_rows;
///
/// let matrix = mat![
///     [0.0, 1.0],
///     [1.0, 1.0],
///     [2.0, 2.0],
///     [3.0, 3.0f64],
/// ];
///
/// let sub_matrix = select_mat_rows(&matrix, &[0usize, 2]);
///
/// assert_eq!(
///     sub_matrix,
///     mat![
///         [0.0, 1.0],
///         [2.0, 2.0f64],
///     ]
/// );
/// ```
#[inline(always)]
pub fn select_mat_rows<T>(existing_mat: &Mat<T>, row_indices: &[usize]) -> Mat<T>
where
    T: Clone,
{
    Mat::from_fn(row_indices.len(), existing_mat.ncols(), |i, j| {
        existing_mat.get(row_indices[i], j).clone()
    })
}

/// Computes the axis aligned bounding box (AABB) extents of a matrix of points.
///
/// The result is arranged as `[min_0, ..., min_n, max_0, ..., max_n]`. An empty
/// matrix yields an empty vector.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use ferreus_geostats_utils::get_pointarray_extents;
///
/// let points = mat![
///     [1.0, 2.0],
///     [3.0, -1.0],
///     [0.5, 4.0f64]
/// ];
/// assert_eq!(get_pointarray_extents(&points), vec![0.5, -1.0, 3.0, 4.0]);
/// ```
#[inline(always)]
pub fn get_pointarray_extents<T>(points: &Mat<T>) -> Vec<T>
where
    T: PartialOrd + Clone,
{
    let (nrows, ncols) = points.shape();
    if nrows == 0 {
        return Vec::new();
    }

    let mut extents: Vec<T> = Vec::with_capacity(2 * ncols);
    for col in 0..ncols {
        extents.push(points.get(0, col).clone());
    }
    for col in 0..ncols {
        extents.push(points.get(0, col).clone());
    }

    for row in points.row_iter() {
        for (col, item) in row.iter().enumerate() {
            if item < &extents[col] {
                extents[col] = item.clone();
            }
            if item > &extents[col + ncols] {
                extents[col + ncols] = item.clone();
            }
        }
    }

    extents
}

/// Calculates the squared euclidean distance between two points.
#[inline(always)]
pub fn get_distance_sq(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist
}

/// Calculates the euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use ferreus_geostats_utils::get_distance;
///
/// let points = mat![
///     [1.0, 2.0],
///     [4.0, 6.0],
/// ];
///
/// assert_eq!(get_distance(points.row(0), points.row(1)), 5.0);
/// ```
#[inline(always)]
pub fn get_distance(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    get_distance_sq(target, source).sqrt()
}

/// Builds the symmetric matrix of `value(γ(‖x_i − x_j‖))` among a single set
/// of points, evaluating each pair only once.
///
/// `value` chooses between covariance and generalized covariance so the same
/// routine fills both stationary and intrinsic systems.
#[inline(always)]
pub fn get_covariance_matrix_symmetric<F>(
    points: &Mat<f64>,
    variogram: &dyn Variogram,
    value: F,
) -> Mat<f64>
where
    F: Fn(&dyn Variogram, f64) -> f64,
{
    let n = points.nrows();

    let mut matrix = Mat::<f64>::zeros(n, n);

    for j in 0..n {
        let source_row = points.row(j);

        for i in j..n {
            let target_row = points.row(i);
            let v = value(variogram, get_distance(target_row, source_row));

            matrix[(i, j)] = v;
            matrix[(j, i)] = v;
        }
    }

    matrix
}

// Dispatcher generated from the variogram registry below.
// Assumes each model type implements `VariogramFromParams::from_params(&VariogramParams)`.
macro_rules! for_each_variogram {
    ( registry = [ $( ($V:ident, $Vty:path) ),* $(,)? ] ) => {

        /// Runtime variogram selector built from the variogram registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum VariogramType {
            $( $V, )*
        }

        impl VariogramType {
            /// Every registered model, in registry order.
            pub const ALL: &'static [VariogramType] = &[ $( VariogramType::$V, )* ];
        }

        /// Evaluates the selected variogram model at lag `h`.
        #[inline(always)]
        pub fn variogram_gamma(
            h: f64,
            params: &VariogramParams,
        ) -> f64 {
            match params.variogram_type {
                $(
                    VariogramType::$V => {
                        let v = <$Vty as crate::VariogramFromParams>::from_params(params);
                        v.gamma(h)
                    }
                ),*
            }
        }

        /// Lets a plain [`VariogramParams`] stand in wherever a model is required.
        impl Variogram for VariogramParams {
            #[inline(always)]
            fn evaluate(&self, lag: f64) -> f64 {
                variogram_gamma(lag, self)
            }

            fn sill(&self) -> f64 {
                match self.variogram_type {
                    $(
                        VariogramType::$V => {
                            <$Vty as crate::VariogramFromParams>::from_params(self).sill()
                        }
                    ),*
                }
            }

            fn nugget(&self) -> f64 {
                self.nugget
            }

            fn range(&self) -> f64 {
                match self.variogram_type {
                    $(
                        VariogramType::$V => {
                            <$Vty as crate::VariogramFromParams>::from_params(self).range()
                        }
                    ),*
                }
            }

            fn is_stationary(&self) -> bool {
                match self.variogram_type {
                    $(
                        VariogramType::$V => {
                            <$Vty as crate::VariogramFromParams>::from_params(self).is_stationary()
                        }
                    ),*
                }
            }
        }
    };
}

for_each_variogram! {
    registry = [
        (Gaussian,    crate::models::GaussianVariogram),
        (Exponential, crate::models::ExponentialVariogram),
        (Spherical,   crate::models::SphericalVariogram),
        (Cubic,       crate::models::CubicVariogram),
        (Nugget,      crate::models::NuggetVariogram),
        (Power,       crate::models::PowerVariogram),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    fn gaussian() -> VariogramParams {
        VariogramParams::builder(VariogramType::Gaussian)
            .sill(1.0)
            .range(10.0)
            .build()
            .unwrap()
    }

    #[test]
    fn symmetric_matrix_matches_pairwise_values() {
        let points = mat![[0.0, 0.0], [3.0, 4.0], [1.0, -2.0], [7.5, 0.5f64]];
        let params = gaussian();
        let cov = |v: &dyn Variogram, h: f64| v.covariance(h);

        let sym = get_covariance_matrix_symmetric(&points, &params, cov);

        for i in 0..4 {
            for j in 0..4 {
                let expected = params.covariance(get_distance(points.row(i), points.row(j)));
                assert!((sym[(i, j)] - expected).abs() < 1e-14);
                assert!((sym[(i, j)] - sym[(j, i)]).abs() < 1e-14);
            }
            assert!((sym[(i, i)] - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn dispatch_matches_concrete_model() {
        let params = gaussian();
        let model = crate::models::GaussianVariogram { sill: 1.0, range: 10.0, nugget: 0.0 };
        for k in 0..20 {
            let h = k as f64 * 0.75;
            assert_eq!(variogram_gamma(h, &params), model.gamma(h));
        }
    }

    #[test]
    fn power_params_are_not_stationary() {
        let params = VariogramParams::builder(VariogramType::Power)
            .exponent(1.5)
            .build()
            .unwrap();
        assert!(!params.is_stationary());
        assert!(gaussian().is_stationary());
    }

    #[test]
    fn extents_of_empty_matrix_are_empty() {
        let points = Mat::<f64>::zeros(0, 3);
        assert!(get_pointarray_extents(&points).is_empty());
    }

    #[test]
    fn registry_lists_every_model() {
        assert_eq!(VariogramType::ALL.len(), 6);
        assert!(VariogramType::ALL.contains(&VariogramType::Cubic));
    }
}
