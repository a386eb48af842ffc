/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Loading of graphs from plain edge lists.
//!
//! An edge list is a text file in which each line contains two nonnegative
//! integers separated by whitespace, the source and the target of an arc:
//!
//! ```text
//! 0 1
//! 1 2
//! 2 0
//! ```
//!
//! Node identifiers need not be contiguous: the number of nodes is the
//! largest identifier plus one, and missing identifiers become isolated
//! nodes. Duplicate arcs are kept and accumulate their multiplicity.
//!
//! Blank lines are skipped; any other line that does not consist of exactly
//! two nonnegative integers makes the whole load fail, so a partial graph is
//! never returned.

use crate::graphs::csr::CsrMatrix;
use dsi_progress_logger::ProgressLog;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can happen while loading an edge list.
#[derive(Error, Debug)]
pub enum EdgeListError {
    /// The edge list could not be opened.
    #[error("Could not open edge list {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading a line failed.
    #[error("Could not read line {line} of the edge list")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    /// A line does not contain exactly two nonnegative integers.
    #[error(
        "Line {line} of the edge list should contain two nonnegative integers separated by whitespace, but it is {content:?}"
    )]
    Malformed { line: usize, content: String },
    /// A node identifier is too large to be counted.
    #[error("Line {line} of the edge list contains node {node}, which is too large")]
    NodeTooLarge { line: usize, node: usize },
}

/// A graph loaded from an edge list, stored as the transpose of its
/// adjacency matrix.
///
/// Row *t* of the [transpose](Self::transpose) contains, for each source *s*
/// of an arc *s* → *t*, the number of times the arc appears in the list.
#[derive(Debug, Clone)]
pub struct EdgeListGraph {
    transpose: CsrMatrix,
    num_arcs: usize,
}

impl EdgeListGraph {
    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.transpose.num_rows()
    }

    /// Returns the number of arcs read, duplicates included.
    pub fn num_arcs(&self) -> usize {
        self.num_arcs
    }

    /// Returns the number of distinct arcs.
    pub fn num_distinct_arcs(&self) -> usize {
        self.transpose.nnz()
    }

    /// Returns the transpose of the adjacency matrix.
    pub fn transpose(&self) -> &CsrMatrix {
        &self.transpose
    }

    /// Consumes the graph, returning the transpose of its adjacency matrix.
    pub fn into_transpose(self) -> CsrMatrix {
        self.transpose
    }
}

/// Loader for edge lists.
///
/// # Examples
///
/// ```
/// use dsi_progress_logger::no_logging;
/// use sparserank::graphs::edge_list::EdgeList;
///
/// // Node 3 is not mentioned, but node 4 is, so there are five nodes
/// let graph = EdgeList::new()
///     .load_from_reader("0 1\n0 4\n0 1\n".as_bytes(), no_logging![])
///     .unwrap();
/// assert_eq!(graph.num_nodes(), 5);
/// assert_eq!(graph.num_arcs(), 3);
/// assert_eq!(graph.num_distinct_arcs(), 2);
/// // Row 1 of the transpose holds the predecessors of node 1
/// assert_eq!(graph.transpose().row(1), (&[0][..], &[2.0][..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    num_nodes: Option<usize>,
}

impl EdgeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of nodes of the graph.
    ///
    /// This is useful to add isolated nodes at the end of the graph. If the
    /// value is smaller than the number of nodes inferred from the arcs, it
    /// is ignored and a warning is logged.
    pub fn num_nodes(&mut self, num_nodes: Option<usize>) -> &mut Self {
        self.num_nodes = num_nodes;
        self
    }

    /// Loads the edge list stored at the given path.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        pl: &mut impl ProgressLog,
    ) -> Result<EdgeListGraph, EdgeListError> {
        let path = path.as_ref();
        log::info!("Loading edge list from {}", path.display());
        let file = File::open(path).map_err(|source| EdgeListError::Open {
            path: path.to_owned(),
            source,
        })?;
        self.load_from_reader(BufReader::new(file), pl)
    }

    /// Loads an edge list from a reader.
    pub fn load_from_reader(
        &self,
        reader: impl BufRead,
        pl: &mut impl ProgressLog,
    ) -> Result<EdgeListGraph, EdgeListError> {
        pl.item_name("arc");
        pl.expected_updates(None);
        pl.start("Reading arcs...");

        // Cells of the transpose, that is, (target, source) pairs
        let mut cells = Vec::new();
        let mut num_nodes = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line_num = line_num + 1;
            let line = line.map_err(|source| EdgeListError::Io {
                line: line_num,
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let (src, dst) = parse_arc(&line).ok_or_else(|| EdgeListError::Malformed {
                line: line_num,
                content: line.clone(),
            })?;
            let max_node = src.max(dst);
            let end = max_node
                .checked_add(1)
                .ok_or(EdgeListError::NodeTooLarge {
                    line: line_num,
                    node: max_node,
                })?;
            num_nodes = num_nodes.max(end);
            cells.push((dst, src));
            pl.light_update();
        }
        pl.done();

        if let Some(user_num_nodes) = self.num_nodes {
            if user_num_nodes < num_nodes {
                log::warn!(
                    "The requested number of nodes ({}) is smaller than the number of nodes found in the arcs ({}): ignoring it",
                    user_num_nodes,
                    num_nodes
                );
            } else {
                num_nodes = user_num_nodes;
            }
        }

        let num_arcs = cells.len();
        pl.info(format_args!("Building the transposed adjacency matrix..."));
        let transpose = CsrMatrix::from_cells(num_nodes, num_nodes, cells);

        log::info!(
            "Nodes: {} Arcs: {} Distinct arcs: {}",
            num_nodes,
            num_arcs,
            transpose.nnz()
        );

        Ok(EdgeListGraph {
            transpose,
            num_arcs,
        })
    }
}

/// Parses a line containing exactly two whitespace-separated nonnegative
/// integers.
fn parse_arc(line: &str) -> Option<(usize, usize)> {
    let mut fields = line.split_whitespace();
    let src = fields.next()?.parse().ok()?;
    let dst = fields.next()?.parse().ok()?;
    match fields.next() {
        None => Some((src, dst)),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arc() {
        assert_eq!(parse_arc("3 4"), Some((3, 4)));
        assert_eq!(parse_arc("  3\t\t4  "), Some((3, 4)));
        assert_eq!(parse_arc("3"), None);
        assert_eq!(parse_arc("3 4 5"), None);
        assert_eq!(parse_arc("3 -4"), None);
        assert_eq!(parse_arc("3 x"), None);
        assert_eq!(parse_arc("3.0 4"), None);
    }
}
