/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::GlobalArgs;
use anyhow::{Context, Result, ensure};
use clap::Args;
use sparserank_algo::rank::top::{Ranked, read_top};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
#[command(name = "top", about = "Compares two rankings, reporting how many nodes they share, how many positions agree, and the maximum score difference on shared nodes.", long_about = None)]
pub struct CliArgs {
    /// The first ranking.
    pub first: PathBuf,
    /// The second ranking.
    pub second: PathBuf,

    #[arg(long, default_value_t = 1E-6)]
    /// The maximum admissible absolute score difference.
    pub tolerance: f64,

    #[arg(long)]
    /// Fail if the rankings have different nodes or lengths, or if a score
    /// difference exceeds the tolerance.
    pub strict: bool,
}

/// The result of the comparison of two rankings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// The lengths of the two rankings.
    pub lens: (usize, usize),
    /// The number of distinct nodes appearing in both rankings.
    pub overlap: usize,
    /// The number of positions containing the same node.
    pub same_position: usize,
    /// The maximum absolute score difference of nodes appearing in both
    /// rankings.
    pub max_score_diff: f64,
}

pub fn main(_global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let first = load(&args.first)?;
    let second = load(&args.second)?;
    let cmp = compare(&first, &second);

    log::info!(
        "Lengths: {} and {}; overlap: {}; same position: {}; max score difference: {:e}",
        cmp.lens.0,
        cmp.lens.1,
        cmp.overlap,
        cmp.same_position,
        cmp.max_score_diff
    );

    if args.strict {
        ensure!(
            cmp.lens.0 == cmp.lens.1 && cmp.overlap == cmp.lens.0,
            "The rankings {} and {} contain different nodes",
            args.first.display(),
            args.second.display()
        );
        ensure!(
            cmp.max_score_diff <= args.tolerance,
            "The maximum score difference {:e} exceeds the tolerance {:e}",
            cmp.max_score_diff,
            args.tolerance
        );
    }
    Ok(())
}

fn load(path: &Path) -> Result<Vec<Ranked>> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    read_top(BufReader::new(file)).with_context(|| format!("Could not read {}", path.display()))
}

/// Compares two rankings.
pub fn compare(first: &[Ranked], second: &[Ranked]) -> Comparison {
    let scores: HashMap<usize, f64> = second.iter().map(|r| (r.node, r.score)).collect();

    let mut seen = HashSet::new();
    let mut overlap = 0;
    let mut max_score_diff: f64 = 0.0;
    for ranked in first {
        if let Some(&score) = scores.get(&ranked.node) {
            max_score_diff = max_score_diff.max((ranked.score - score).abs());
            if seen.insert(ranked.node) {
                overlap += 1;
            }
        }
    }

    let same_position = first
        .iter()
        .zip(second)
        .filter(|(a, b)| a.node == b.node)
        .count();

    Comparison {
        lens: (first.len(), second.len()),
        overlap,
        same_position,
        max_score_diff,
    }
}
