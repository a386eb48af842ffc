/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Ranking of nodes.

pub mod pagerank;
pub mod top;

pub use pagerank::{PageRank, State, pagerank};
pub use top::{Ranked, top_k};
