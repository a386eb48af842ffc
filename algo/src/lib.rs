/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

pub mod rank;

pub mod prelude {
    pub use crate::rank::pagerank::preds;
    pub use crate::rank::{PageRank, Ranked, State, pagerank, top_k};
}
