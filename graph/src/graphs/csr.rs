/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Compressed sparse row matrices of doubles.

use itertools::Itertools;
use std::ops::Range;

/// A sparse matrix in compressed sparse row (CSR) format.
///
/// The nonzero cells of row *i* are stored at positions
/// `offsets[i]..offsets[i + 1]` of the `indices` (column) and `values`
/// arrays, with column indices in strictly increasing order.
///
/// Rows are the unit of access: the matrix is meant to be multiplied by a
/// dense vector one block of rows at a time (see [`mul_rows`](Self::mul_rows)),
/// so that no row is ever expanded to a dense vector.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    num_cols: usize,
    offsets: Box<[usize]>,
    indices: Box<[usize]>,
    values: Box<[f64]>,
}

impl CsrMatrix {
    /// Creates a matrix with the given shape and no nonzero cells.
    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_cols,
            offsets: vec![0; num_rows + 1].into_boxed_slice(),
            indices: Box::default(),
            values: Box::default(),
        }
    }

    /// Creates a matrix from a list of `(row, column)` cells.
    ///
    /// Each occurrence of a cell adds one to its value: a cell appearing
    /// three times will contain 3.0. The list needs not be sorted.
    ///
    /// # Panics
    ///
    /// Panics if a cell lies outside the given shape.
    pub fn from_cells(num_rows: usize, num_cols: usize, mut cells: Vec<(usize, usize)>) -> Self {
        cells.sort_unstable();

        let mut offsets = vec![0; num_rows + 1];
        let mut indices = Vec::with_capacity(cells.len());
        let mut values = Vec::with_capacity(cells.len());

        for (count, (row, col)) in cells.into_iter().dedup_with_count() {
            assert!(
                row < num_rows && col < num_cols,
                "Cell ({row}, {col}) out of bounds for a {num_rows} × {num_cols} matrix"
            );
            offsets[row + 1] += 1;
            indices.push(col);
            values.push(count as f64);
        }

        for i in 0..num_rows {
            offsets[i + 1] += offsets[i];
        }

        Self {
            num_cols,
            offsets: offsets.into_boxed_slice(),
            indices: indices.into_boxed_slice(),
            values: values.into_boxed_slice(),
        }
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns the number of columns.
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Returns the number of stored (nonzero) cells.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Returns the column indices and the values of the nonzero cells of a
    /// row.
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let range = self.offsets[row]..self.offsets[row + 1];
        (&self.indices[range.clone()], &self.values[range])
    }

    /// Returns the sum of each column.
    pub fn col_sums(&self) -> Box<[f64]> {
        let mut sums = vec![0.0; self.num_cols].into_boxed_slice();
        for (&col, &value) in self.indices.iter().zip(self.values.iter()) {
            sums[col] += value;
        }
        sums
    }

    /// Multiplies in place each column *j* by `factors[j]`, that is, replaces
    /// this matrix *M* with *M* diag(`factors`).
    ///
    /// # Panics
    ///
    /// Panics if the length of `factors` is not the number of columns.
    pub fn scale_cols(&mut self, factors: &[f64]) {
        assert_eq!(
            factors.len(),
            self.num_cols,
            "The number of factors ({}) does not match the number of columns ({})",
            factors.len(),
            self.num_cols
        );
        for (&col, value) in self.indices.iter().zip(self.values.iter_mut()) {
            *value *= factors[col];
        }
    }

    /// Multiplies the rows in `rows` by `x`, storing the result in `out`.
    ///
    /// After the call, `out[k]` contains the dot product of row
    /// `rows.start + k` with `x`. Only the nonzero cells of the rows are
    /// visited.
    ///
    /// # Panics
    ///
    /// Panics if `out` is not as long as `rows`, or if `x` is not as long as
    /// the number of columns.
    pub fn mul_rows(&self, rows: Range<usize>, x: &[f64], out: &mut [f64]) {
        assert_eq!(rows.len(), out.len());
        assert_eq!(x.len(), self.num_cols);
        for (row, y) in rows.zip(out.iter_mut()) {
            let (indices, values) = self.row(row);
            *y = indices
                .iter()
                .zip(values)
                .map(|(&col, &value)| value * x[col])
                .sum();
        }
    }
}
