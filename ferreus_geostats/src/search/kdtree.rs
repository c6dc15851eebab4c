/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides a KD-tree with masked k-nearest and radius queries for neighbour search.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Coordinate-wise distances the tree can prune with.
///
/// Each of these is bounded below by the absolute difference along any single
/// axis, which is what the splitting-plane test relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DistanceMetric {
    Euclidean,
    InfinityNorm,
    Manhattan,
}

impl DistanceMetric {
    #[inline(always)]
    pub(crate) fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let pairs = a.iter().zip(b.iter());
        match self {
            DistanceMetric::Euclidean => pairs.map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt(),
            DistanceMetric::InfinityNorm => {
                pairs.map(|(x, y)| (x - y).abs()).fold(0.0_f64, f64::max)
            }
            DistanceMetric::Manhattan => pairs.map(|(x, y)| (x - y).abs()).sum(),
        }
    }
}

/// A candidate returned by a search, ordered by distance then index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    pub distance: f64,
    pub index: usize,
}

impl Eq for Neighbour {}

impl PartialOrd for Neighbour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbour {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}

#[derive(Debug, Clone)]
struct Node {
    index: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// A static KD-tree over the rows of a point matrix.
///
/// Nodes live in a flat vector with the root at position 0, and point
/// coordinates are copied into one row-major buffer.
#[derive(Debug, Clone)]
pub(crate) struct KDTree {
    nodes: Vec<Node>,
    coords: Vec<f64>,
    dim: usize,
}

impl KDTree {
    pub(crate) fn new(points: &Mat<f64>) -> Self {
        let (n, dim) = points.shape();
        let mut coords = Vec::with_capacity(n * dim);
        for i in 0..n {
            for j in 0..dim {
                coords.push(points[(i, j)]);
            }
        }

        let mut tree = KDTree {
            nodes: Vec::with_capacity(n),
            coords,
            dim,
        };

        let mut indices = (0..n).collect::<Vec<_>>();
        if dim > 0 {
            tree.build_tree(&mut indices, 0);
        }
        tree
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    pub(crate) fn point(&self, index: usize) -> &[f64] {
        &self.coords[index * self.dim..(index + 1) * self.dim]
    }

    fn build_tree(&mut self, indices: &mut [usize], depth: usize) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }

        let axis = depth % self.dim;
        let mid = indices.len() / 2;
        {
            let coords = &self.coords;
            let dim = self.dim;
            indices.select_nth_unstable_by(mid, |&a, &b| {
                coords[a * dim + axis].total_cmp(&coords[b * dim + axis])
            });
        }

        let node_index = self.nodes.len();
        self.nodes.push(Node {
            index: indices[mid],
            left: None,
            right: None,
        });

        let (lower, rest) = indices.split_at_mut(mid);
        let left = self.build_tree(lower, depth + 1);
        let right = self.build_tree(&mut rest[1..], depth + 1);
        self.nodes[node_index].left = left;
        self.nodes[node_index].right = right;

        Some(node_index)
    }

    /// Collects every admissible point within `radius` of `target`, unordered.
    pub(crate) fn radius_search(
        &self,
        target: &[f64],
        radius: f64,
        metric: DistanceMetric,
        mask: Option<&[bool]>,
        result: &mut Vec<Neighbour>,
    ) {
        if self.nodes.is_empty() || radius < 0.0 {
            return;
        }
        self.radius_search_impl(0, target, radius, 0, metric, mask, result);
    }

    #[allow(clippy::too_many_arguments)]
    fn radius_search_impl(
        &self,
        node_index: usize,
        target: &[f64],
        radius: f64,
        depth: usize,
        metric: DistanceMetric,
        mask: Option<&[bool]>,
        result: &mut Vec<Neighbour>,
    ) {
        let node = &self.nodes[node_index];
        let point = self.point(node.index);

        if mask.map_or(true, |m| m[node.index]) {
            let distance = metric.distance(target, point);
            if distance <= radius {
                result.push(Neighbour {
                    distance,
                    index: node.index,
                });
            }
        }

        let axis = depth % self.dim;
        let diff = target[axis] - point[axis];

        let (near, far) = match diff < 0.0 {
            true => (node.left, node.right),
            false => (node.right, node.left),
        };

        if let Some(near) = near {
            self.radius_search_impl(near, target, radius, depth + 1, metric, mask, result);
        }
        if let Some(far) = far {
            if diff.abs() <= radius {
                self.radius_search_impl(far, target, radius, depth + 1, metric, mask, result);
            }
        }
    }

    /// Finds the `k` admissible points nearest to `target`.
    ///
    /// Ties in distance are broken by ascending index. The result is written
    /// to `result` nearest-first.
    pub(crate) fn k_nearest(
        &self,
        target: &[f64],
        k: usize,
        metric: DistanceMetric,
        mask: Option<&[bool]>,
        result: &mut Vec<Neighbour>,
    ) {
        result.clear();
        if k == 0 || self.nodes.is_empty() {
            return;
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.k_nearest_impl(0, target, k, 0, metric, mask, &mut heap);

        result.extend(heap.into_sorted_vec());
    }

    #[allow(clippy::too_many_arguments)]
    fn k_nearest_impl(
        &self,
        node_index: usize,
        target: &[f64],
        k: usize,
        depth: usize,
        metric: DistanceMetric,
        mask: Option<&[bool]>,
        heap: &mut BinaryHeap<Neighbour>,
    ) {
        let node = &self.nodes[node_index];
        let point = self.point(node.index);

        if mask.map_or(true, |m| m[node.index]) {
            let candidate = Neighbour {
                distance: metric.distance(target, point),
                index: node.index,
            };
            // The heap top is the worst neighbour kept so far.
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }

        let axis = depth % self.dim;
        let diff = target[axis] - point[axis];

        let (near, far) = match diff < 0.0 {
            true => (node.left, node.right),
            false => (node.right, node.left),
        };

        if let Some(near) = near {
            self.k_nearest_impl(near, target, k, depth + 1, metric, mask, heap);
        }

        if let Some(far) = far {
            // `<=` keeps equidistant points with smaller indices reachable.
            let reachable = heap.len() < k
                || heap.peek().is_some_and(|worst| diff.abs() <= worst.distance);
            if reachable {
                self.k_nearest_impl(far, target, k, depth + 1, metric, mask, heap);
            }
        }
    }
}
