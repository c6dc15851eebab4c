/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the geospatial domain abstraction along with point-set and Cartesian grid domains.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # domain
//!
//! A [`Domain`] is an ordered, immutable collection of elements, each with a
//! centroid in `d`-dimensional space and a stable integer index. Estimation
//! results and realizations are dense arrays aligned to these indices.

use crate::error::{GeoStatsError, Result};
use faer::{Mat, Row};

/// An ordered collection of spatial elements.
pub trait Domain: Send + Sync {
    /// Number of elements in the domain.
    fn num_elements(&self) -> usize;

    /// Number of coordinates of each centroid.
    fn embedding_dimension(&self) -> usize;

    /// Centroid of element `index`.
    fn centroid(&self, index: usize) -> Row<f64>;

    /// All centroids stacked as an `(n, d)` matrix.
    fn centroids(&self) -> Mat<f64> {
        let n = self.num_elements();
        let d = self.embedding_dimension();
        let mut centroids = Mat::<f64>::zeros(n, d);
        for i in 0..n {
            let c = self.centroid(i);
            for j in 0..d {
                centroids[(i, j)] = c[j];
            }
        }
        centroids
    }
}

/// A domain made of arbitrary points, one element per matrix row.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Mat<f64>,
}

impl PointSet {
    pub fn new(points: Mat<f64>) -> Self {
        Self { points }
    }

    /// Builds a point set from a slice of coordinate tuples.
    pub fn from_coords<const D: usize>(coords: &[[f64; D]]) -> Self {
        Self {
            points: Mat::from_fn(coords.len(), D, |i, j| coords[i][j]),
        }
    }

    pub fn points(&self) -> &Mat<f64> {
        &self.points
    }
}

impl Domain for PointSet {
    fn num_elements(&self) -> usize {
        self.points.nrows()
    }

    fn embedding_dimension(&self) -> usize {
        self.points.ncols()
    }

    fn centroid(&self, index: usize) -> Row<f64> {
        self.points.row(index).to_owned()
    }

    fn centroids(&self) -> Mat<f64> {
        self.points.clone()
    }
}

/// A regular grid of cells in 1D, 2D or 3D.
///
/// `origin` is the centroid of the first cell. Elements are numbered with the
/// first axis varying fastest, so in 2D index `i + nx * j` is cell `(i, j)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianGrid {
    dims: Vec<usize>,
    origin: Vec<f64>,
    spacing: Vec<f64>,
}

impl CartesianGrid {
    /// Creates a grid with `dims[k]` cells of width `spacing[k]` along axis `k`.
    pub fn new(dims: &[usize], origin: &[f64], spacing: &[f64]) -> Result<Self> {
        if origin.len() != dims.len() {
            return Err(GeoStatsError::DimensionMismatch {
                expected: dims.len(),
                found: origin.len(),
            });
        }
        if spacing.len() != dims.len() {
            return Err(GeoStatsError::DimensionMismatch {
                expected: dims.len(),
                found: spacing.len(),
            });
        }
        if dims.is_empty() || dims.len() > 3 {
            return Err(GeoStatsError::configuration(
                "grid",
                format!("grids must have 1 to 3 axes, got {}", dims.len()),
            ));
        }
        if spacing.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(GeoStatsError::configuration(
                "grid",
                "cell spacing must be finite and positive",
            ));
        }

        Ok(Self {
            dims: dims.to_vec(),
            origin: origin.to_vec(),
            spacing: spacing.to_vec(),
        })
    }

    /// A grid of unit cells whose first centroid sits at the origin.
    pub fn unit(dims: &[usize]) -> Result<Self> {
        let origin = vec![0.0; dims.len()];
        let spacing = vec![1.0; dims.len()];
        Self::new(dims, &origin, &spacing)
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Index of the cell whose extent contains `point`, if any.
    pub fn locate(&self, point: &[f64]) -> Option<usize> {
        if point.len() != self.dims.len() {
            return None;
        }
        let mut index = 0usize;
        let mut stride = 1usize;
        for (k, &x) in point.iter().enumerate() {
            let cell = ((x - self.origin[k]) / self.spacing[k] + 0.5).floor();
            if !(cell >= 0.0 && cell < self.dims[k] as f64) {
                return None;
            }
            index += cell as usize * stride;
            stride *= self.dims[k];
        }
        Some(index)
    }
}

impl Domain for CartesianGrid {
    fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    fn embedding_dimension(&self) -> usize {
        self.dims.len()
    }

    fn centroid(&self, index: usize) -> Row<f64> {
        let mut coords = Vec::with_capacity(self.dims.len());
        let mut remainder = index;
        for k in 0..self.dims.len() {
            let i = remainder % self.dims[k];
            remainder /= self.dims[k];
            coords.push(self.origin[k] + self.spacing[k] * i as f64);
        }
        Row::from_fn(coords.len(), |k| coords[k])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_numbers_first_axis_fastest() {
        let grid = CartesianGrid::new(&[3, 2], &[10.0, 20.0], &[1.0, 5.0]).unwrap();
        assert_eq!(grid.num_elements(), 6);

        let c = grid.centroid(4);
        assert_eq!(c[0], 11.0);
        assert_eq!(c[1], 25.0);

        let all = grid.centroids();
        assert_eq!(all.nrows(), 6);
        assert_eq!(all[(2, 0)], 12.0);
        assert_eq!(all[(2, 1)], 20.0);
    }

    #[test]
    fn locate_inverts_centroid() {
        let grid = CartesianGrid::new(&[4, 3, 2], &[0.0, 0.0, 0.0], &[2.0, 1.0, 0.5]).unwrap();
        for i in 0..grid.num_elements() {
            let c = grid.centroid(i);
            let point: Vec<f64> = c.iter().copied().collect();
            assert_eq!(grid.locate(&point), Some(i));
        }
        assert_eq!(grid.locate(&[-5.0, 0.0, 0.0]), None);
    }

    #[test]
    fn grid_rejects_mismatched_inputs() {
        assert!(CartesianGrid::new(&[3, 3], &[0.0], &[1.0, 1.0]).is_err());
        assert!(CartesianGrid::new(&[3], &[0.0], &[0.0]).is_err());
        assert!(CartesianGrid::new(&[2, 2, 2, 2], &[0.0; 4], &[1.0; 4]).is_err());
    }

    #[test]
    fn point_set_exposes_rows() {
        let points = PointSet::from_coords(&[[0.0, 1.0], [2.0, 3.0]]);
        assert_eq!(points.num_elements(), 2);
        assert_eq!(points.embedding_dimension(), 2);
        assert_eq!(points.centroid(1)[1], 3.0);
    }
}
