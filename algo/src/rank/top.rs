/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Selection and serialization of the top-ranked nodes.
//!
//! Nodes are ordered by decreasing score, and nodes with the same score by
//! increasing identifier, so the order is total and the output deterministic.
//!
//! Rankings are serialized as text, one node per line, in the form
//! `<node> <score>` with the score printed with eight decimal digits.

use dary_heap::QuaternaryHeap;
use std::cmp::{Ordering, Reverse};
use std::io::{BufRead, Write};
use thiserror::Error;

/// The default number of nodes in a ranking.
pub const DEFAULT_K: usize = 100;

/// The number of decimal digits used when writing scores.
pub const PRECISION: usize = 8;

/// A node together with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub node: usize,
    pub score: f64,
}

impl Ranked {
    /// Compares by rank: a node is greater if its score is higher or, for
    /// equal scores, if its identifier is smaller.
    fn cmp_rank(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Heap wrapper ordering nodes by rank.
#[derive(Debug, Clone, Copy)]
struct ByRank(Ranked);

impl PartialEq for ByRank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByRank {}

impl PartialOrd for ByRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp_rank(&other.0)
    }
}

/// Returns the `k` top-ranked nodes, best first.
///
/// If there are fewer than `k` nodes, all nodes are returned. The selection
/// uses a heap of size `k`, so it needs O(`k`) memory regardless of the
/// length of `rank`.
///
/// # Examples
///
/// ```
/// use sparserank_algo::rank::top::top_k;
///
/// let top = top_k(&[0.1, 0.4, 0.1, 0.4], 3);
/// let nodes: Vec<_> = top.iter().map(|r| r.node).collect();
/// assert_eq!(nodes, [1, 3, 0]);
/// ```
pub fn top_k(rank: &[f64], k: usize) -> Vec<Ranked> {
    if k == 0 {
        return Vec::new();
    }
    // A min-heap of the best nodes seen so far: the root is the worst of them
    let mut heap = QuaternaryHeap::with_capacity(k.min(rank.len()));
    for (node, &score) in rank.iter().enumerate() {
        let candidate = Reverse(ByRank(Ranked { node, score }));
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(mut worst) = heap.peek_mut() {
            if candidate < *worst {
                *worst = candidate;
            }
        }
    }

    let mut top: Vec<Ranked> = heap
        .into_vec()
        .into_iter()
        .map(|Reverse(ByRank(ranked))| ranked)
        .collect();
    top.sort_unstable_by(|a, b| b.cmp_rank(a));
    top
}

/// Writes a ranking, one `<node> <score>` line per node.
pub fn write_top(mut writer: impl Write, top: &[Ranked]) -> std::io::Result<()> {
    for ranked in top {
        writeln!(writer, "{} {:.*}", ranked.node, PRECISION, ranked.score)?;
    }
    writer.flush()
}

/// Errors that can happen while reading a ranking.
#[derive(Error, Debug)]
pub enum ReadTopError {
    #[error("Could not read line {line} of the ranking")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line} of the ranking should contain a node and a score, but it is {content:?}")]
    Malformed { line: usize, content: String },
}

/// Reads a ranking written by [`write_top`].
///
/// Node and score can be separated by any amount of whitespace (including
/// TABs, as in rankings written by other tools), and blank lines are skipped.
pub fn read_top(reader: impl BufRead) -> Result<Vec<Ranked>, ReadTopError> {
    let mut top = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.map_err(|source| ReadTopError::Io {
            line: line_num,
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let parsed = match (fields.next(), fields.next(), fields.next()) {
            (Some(node), Some(score), None) => node
                .parse::<usize>()
                .ok()
                .zip(score.parse::<f64>().ok())
                .map(|(node, score)| Ranked { node, score }),
            _ => None,
        };
        top.push(parsed.ok_or_else(|| ReadTopError::Malformed {
            line: line_num,
            content: line.clone(),
        })?);
    }
    Ok(top)
}
