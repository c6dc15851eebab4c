/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for random point generation and coordinate scaling.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Mat, RowRef};
use ferreus_geostats_utils::get_pointarray_extents;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a matrix of random points in the unit hypercube.
///
/// # Parameters
/// - `n`: Number of points to generate (rows in the output matrix).
/// - `d`: Number of spatial dimensions per point (columns in the output matrix).
/// - `seed`: Optional random seed. With `Some(seed)` the same points are
///   generated on every run; with `None` the generator is seeded from the
///   operating system's randomness source.
///
/// # Example
/// ```
/// use ferreus_geostats::generate_random_points;
///
/// let pts = generate_random_points(100, 3, Some(42));
/// assert_eq!(pts.ncols(), 3);
/// ```
pub fn generate_random_points(n: usize, d: usize, seed: Option<u64>) -> Mat<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    Mat::from_fn(n, d, |_, _| rng.random_range(0.0..1.0))
}

/// Compute translation and scale factors mapping points into `[-1, 1]^d`.
///
/// The translation is the midpoint of each coordinate range and the scale
/// is half the range, with zeros replaced by `1.0`.
pub(crate) fn get_unit_cube_scaling_factors(point_locations: &Mat<f64>) -> (Vec<f64>, Vec<f64>) {
    let dimensions = point_locations.ncols();
    let extents = get_pointarray_extents(point_locations);

    if extents.is_empty() {
        return (vec![0.0; dimensions], vec![1.0; dimensions]);
    }

    let translation_factor = (0..dimensions)
        .map(|d| (extents[d + dimensions] + extents[d]) / 2.0)
        .collect::<Vec<_>>();

    let scale_factor = (0..dimensions)
        .map(|d| match (extents[d + dimensions] - extents[d]) / 2.0 {
            s if s == 0.0 => 1.0,
            s => s,
        })
        .collect::<Vec<_>>();

    (translation_factor, scale_factor)
}

/// Writes `(x - translation_factor[d]) / scale_factor[d]` for each coordinate of
/// `point` into `out`.
#[inline(always)]
pub(crate) fn scale_point(
    point: RowRef<'_, f64>,
    translation_factor: &[f64],
    scale_factor: &[f64],
    out: &mut [f64],
) {
    for (col_idx, (o, x)) in out.iter_mut().zip(point.iter()).enumerate() {
        *o = (x - translation_factor[col_idx]) / scale_factor[col_idx];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn seeded_points_are_reproducible() {
        let a = generate_random_points(20, 2, Some(7));
        let b = generate_random_points(20, 2, Some(7));
        assert_eq!(a, b);
        assert!(a.col_iter().all(|c| c.iter().all(|v| (0.0..1.0).contains(v))));
    }

    #[test]
    fn scaling_maps_extents_onto_the_unit_cube() {
        let points = mat![[0.0, 5.0], [10.0, 5.0], [4.0, 5.0f64]];
        let (translation, scale) = get_unit_cube_scaling_factors(&points);

        assert_eq!(translation, vec![5.0, 5.0]);
        // Flat axis keeps a unit scale.
        assert_eq!(scale, vec![5.0, 1.0]);

        let mut out = [0.0; 2];
        scale_point(points.row(0), &translation, &scale, &mut out);
        assert_eq!(out, [-1.0, 0.0]);
        scale_point(points.row(1), &translation, &scale, &mut out);
        assert_eq!(out, [1.0, 0.0]);
    }
}
