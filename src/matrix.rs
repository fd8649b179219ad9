//! Dense cost matrices and the pairwise cache used by the network builder.

use std::collections::HashMap;

use serde::Serialize;

/// Row-major `rows x cols` cost table. Rows are agents, columns are tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    pub fn new(rows: usize, cols: usize, fill: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
        }
    }

    /// Builds a matrix from nested rows. Returns `None` for ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        let n = rows.len();
        Some(Self {
            rows: n,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    /// Copy grown to `size x size`, new cells set to `fill`.
    pub fn padded_square(&self, fill: f64) -> Self {
        let size = self.rows.max(self.cols);
        let mut padded = Self::new(size, size, fill);
        for i in 0..self.rows {
            for j in 0..self.cols {
                padded.set(i, j, self.get(i, j));
            }
        }
        padded
    }
}

/// Costs between node indices, stored once per unordered pair.
#[derive(Debug, Clone, Default)]
pub struct PairCache {
    costs: HashMap<(usize, usize), f64>,
}

impl PairCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches the upper triangle of a square matrix.
    pub fn from_upper_triangle(matrix: &DistanceMatrix) -> Self {
        let mut cache = Self::new();
        for i in 0..matrix.rows() {
            for j in (i + 1)..matrix.cols() {
                cache.insert(i, j, matrix.get(i, j));
            }
        }
        cache
    }

    pub fn insert(&mut self, a: usize, b: usize, cost: f64) {
        self.costs.insert(key(a, b), cost);
    }

    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        self.costs.get(&key(a, b)).copied()
    }

    /// Cost lookup for the network builder: zero on the diagonal, infinite
    /// for pairs that were never cached.
    pub fn cost(&self, a: usize, b: usize) -> f64 {
        if a == b {
            return 0.0;
        }
        self.get(a, b).unwrap_or(f64::INFINITY)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

fn key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}
