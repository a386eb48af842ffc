/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Column-normalized transition operators.
//!
//! If *A* is the adjacency matrix of a graph (with multiplicities) and
//! *A*ᵀ its transpose, the transition operator is
//!
//! > *T* = *A*ᵀ diag(1 / **o**),
//!
//! where **o** is the vector of outdegrees (column sums of *A*ᵀ) in which
//! the zero outdegrees of dangling nodes have been replaced by one. Every
//! column of *T* associated with a non-dangling node sums to one, whereas
//! columns associated with dangling nodes are zero: the rank of dangling
//! nodes must be redistributed separately.
//!
//! Row *t* of *T* contains the fraction of the rank of each predecessor of
//! *t* that flows into *t*, so *T* **x** is the contribution of arcs to the
//! next PageRank approximation.

use crate::graphs::csr::CsrMatrix;
use dsi_progress_logger::{ProgressLog, no_logging};
use std::ops::Range;

/// A column-normalized sparse transition operator, together with the
/// outdegrees and the dangling nodes of the underlying graph.
#[derive(Debug, Clone)]
pub struct Transition {
    matrix: CsrMatrix,
    outdegrees: Box<[f64]>,
    dangling: Box<[bool]>,
    num_dangling: usize,
}

impl Transition {
    /// Builds the transition operator from the transpose of the adjacency
    /// matrix of a graph.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    pub fn new(transpose: CsrMatrix) -> Self {
        Self::with_logging(transpose, no_logging![])
    }

    /// Builds the transition operator from the transpose of the adjacency
    /// matrix of a graph, logging progress.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    pub fn with_logging(mut transpose: CsrMatrix, pl: &mut impl ProgressLog) -> Self {
        assert_eq!(
            transpose.num_rows(),
            transpose.num_cols(),
            "The transpose of an adjacency matrix must be square"
        );

        pl.info(format_args!("Computing outdegrees..."));
        let mut outdegrees = transpose.col_sums();
        let dangling: Box<[bool]> = outdegrees.iter().map(|&d| d == 0.0).collect();
        let num_dangling = dangling.iter().filter(|&&d| d).count();
        log::info!("{} dangling nodes", num_dangling);

        for d in outdegrees.iter_mut() {
            if *d == 0.0 {
                *d = 1.0;
            }
        }

        pl.info(format_args!("Normalizing columns..."));
        let inv_outdegrees: Box<[f64]> = outdegrees.iter().map(|&d| 1.0 / d).collect();
        transpose.scale_cols(&inv_outdegrees);

        Self {
            matrix: transpose,
            outdegrees,
            dangling,
            num_dangling,
        }
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.matrix.num_rows()
    }

    /// Returns the number of distinct arcs, that is, the number of nonzero
    /// cells of the operator.
    pub fn num_arcs(&self) -> usize {
        self.matrix.nnz()
    }

    /// Returns the normalized matrix.
    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    /// Returns the outdegrees used as divisors.
    ///
    /// Outdegrees are sums of arc multiplicities. The outdegree of a dangling
    /// node is reported as one, which is the divisor used for its (empty)
    /// column.
    pub fn outdegrees(&self) -> &[f64] {
        &self.outdegrees
    }

    /// Returns a mask that is true at dangling nodes.
    pub fn dangling(&self) -> &[bool] {
        &self.dangling
    }

    /// Returns the number of dangling nodes.
    pub fn num_dangling(&self) -> usize {
        self.num_dangling
    }

    /// Applies the rows of the operator in `rows` to `x`, storing the result
    /// in `out`.
    ///
    /// See [`CsrMatrix::mul_rows`].
    pub fn mul_rows(&self, rows: Range<usize>, x: &[f64], out: &mut [f64]) {
        self.matrix.mul_rows(rows, x, out);
    }
}
