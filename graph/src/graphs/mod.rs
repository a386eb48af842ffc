/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Sparse graph representations.
//!
//! Graphs are never stored as dense matrices: [`csr::CsrMatrix`] keeps only
//! the nonzero cells, and [`edge_list::EdgeList`] loads a plain edge list
//! directly into the _transpose_ of the adjacency matrix, so that row *t*
//! lists the predecessors of *t*.

pub mod csr;
pub mod edge_list;

pub mod prelude {
    pub use super::csr::CsrMatrix;
    pub use super::edge_list::{EdgeList, EdgeListError, EdgeListGraph};
}
