/////////////////////////////////////////////////////////////////////////////////////////////
//
// Wraps the `rstar` crate to answer axis-aligned box queries over point centroids.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # rtree
//!
//! Wrapper module for the rstar crate.
//!
//! Stores centroids as indexed points so box neighbourhoods can be answered
//! with envelope queries.

use faer::Mat;
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};

// rstar doesn't support 1D natively, so 1D points are embedded in 2D with a
// zero y component and queried with a y range straddling zero.
type IndexedPoint<const D: usize> = GeomWithData<[f64; D], usize>;

#[derive(Clone)]
pub(crate) enum NdPointTree {
    D1(RTree<IndexedPoint<2>>), // 1D embedded in 2D
    D2(RTree<IndexedPoint<2>>),
    D3(RTree<IndexedPoint<3>>),
}

impl NdPointTree {
    /// Bulk loads the rows of `points`. Returns `None` for more than three dimensions.
    pub(crate) fn new(points: &Mat<f64>) -> Option<Self> {
        let n = points.nrows();
        match points.ncols() {
            1 => {
                let items = (0..n)
                    .map(|i| GeomWithData::new([points[(i, 0)], 0.0], i))
                    .collect::<Vec<_>>();
                Some(NdPointTree::D1(RTree::bulk_load(items)))
            }
            2 => {
                let items = (0..n)
                    .map(|i| GeomWithData::new([points[(i, 0)], points[(i, 1)]], i))
                    .collect::<Vec<_>>();
                Some(NdPointTree::D2(RTree::bulk_load(items)))
            }
            3 => {
                let items = (0..n)
                    .map(|i| {
                        GeomWithData::new([points[(i, 0)], points[(i, 1)], points[(i, 2)]], i)
                    })
                    .collect::<Vec<_>>();
                Some(NdPointTree::D3(RTree::bulk_load(items)))
            }
            _ => None,
        }
    }

    /// Appends the index of every point inside the closed box
    /// `center ± half_widths` to `out`.
    pub(crate) fn locate_in_box(&self, center: &[f64], half_widths: &[f64], out: &mut Vec<usize>) {
        match self {
            NdPointTree::D1(tree) => {
                let envelope = AABB::from_corners(
                    [center[0] - half_widths[0], -0.5],
                    [center[0] + half_widths[0], 0.5],
                );
                out.extend(tree.locate_in_envelope(&envelope).map(|item| item.data));
            }
            NdPointTree::D2(tree) => {
                let envelope = envelope_nd::<2>(center, half_widths);
                out.extend(tree.locate_in_envelope(&envelope).map(|item| item.data));
            }
            NdPointTree::D3(tree) => {
                let envelope = envelope_nd::<3>(center, half_widths);
                out.extend(tree.locate_in_envelope(&envelope).map(|item| item.data));
            }
        }
    }
}

fn envelope_nd<const D: usize>(center: &[f64], half_widths: &[f64]) -> AABB<[f64; D]> {
    let mut mins = [0.0; D];
    let mut maxs = [0.0; D];
    for k in 0..D {
        mins[k] = center[k] - half_widths[k];
        maxs[k] = center[k] + half_widths[k];
    }
    AABB::from_corners(mins, maxs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    fn located(tree: &NdPointTree, center: &[f64], half_widths: &[f64]) -> Vec<usize> {
        let mut out = Vec::new();
        tree.locate_in_box(center, half_widths, &mut out);
        out.sort_unstable();
        out
    }

    #[test]
    fn box_query_1d() {
        let points = mat![[0.0], [1.0], [2.0], [5.0f64]];
        let tree = NdPointTree::new(&points).unwrap();
        assert_eq!(located(&tree, &[1.0], &[1.0]), vec![0, 1, 2]);
        assert_eq!(located(&tree, &[10.0], &[1.0]), Vec::<usize>::new());
    }

    #[test]
    fn box_query_2d_includes_boundary() {
        let points = mat![[0.0, 0.0], [1.0, 0.0], [1.0, 2.0], [3.0, 3.0f64]];
        let tree = NdPointTree::new(&points).unwrap();
        assert_eq!(located(&tree, &[0.5, 0.5], &[0.5, 0.5]), vec![0, 1]);
        assert_eq!(located(&tree, &[1.0, 1.0], &[0.5, 1.0]), vec![1, 2]);
    }

    #[test]
    fn box_query_3d() {
        let points = mat![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [4.0, 4.0, 4.0f64]];
        let tree = NdPointTree::new(&points).unwrap();
        assert_eq!(located(&tree, &[0.5, 0.5, 0.5], &[0.5, 0.5, 0.5]), vec![0, 1]);
    }

    #[test]
    fn four_dimensions_are_unsupported() {
        let points = Mat::<f64>::zeros(3, 4);
        assert!(NdPointTree::new(&points).is_none());
    }
}
