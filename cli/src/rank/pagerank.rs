/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{GlobalArgs, create_parent_dir};
use anyhow::{Context, Result, ensure};
use clap::Parser;
use dsi_progress_logger::{ProgressLog, progress_logger};
use predicates::prelude::*;
use sparserank::prelude::*;
use sparserank_algo::rank::pagerank::preds::{L1Norm, L2Norm};
use sparserank_algo::rank::pagerank::{PageRank, State};
use sparserank_algo::rank::top::{self, top_k, write_top};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// The norm used to measure the difference between successive
/// approximations.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default)]
pub enum Norm {
    /// The ℓ₁ norm.
    #[default]
    L1,
    /// The ℓ₂ norm.
    L2,
}

#[derive(Parser, Debug)]
#[command(
    name = "pagerank",
    about = "Computes PageRank using a block-chunked sparse power iteration and stores the top-ranked nodes.",
    long_about = None
)]
pub struct CliArgs {
    #[arg(default_value = "Data.txt")]
    /// The edge list, one "<source> <target>" arc per line.
    pub input: PathBuf,

    #[arg(short, long, default_value = "Res.txt")]
    /// Where to store the top-ranked nodes, one "<node> <score>" pair per line.
    pub output: PathBuf,

    #[arg(short, long, default_value_t = PageRank::DEFAULT_ALPHA)]
    /// The damping factor α (must be in the interval (0 . . 1)).
    pub alpha: f64,

    #[arg(short, long, default_value_t = L1Norm::DEFAULT_THRESHOLD)]
    /// The error threshold to stop.
    pub threshold: f64,

    #[arg(long, value_enum, default_value_t = Norm::L1)]
    /// The norm compared with the threshold.
    pub norm: Norm,

    #[arg(short, long, default_value_t = PageRank::DEFAULT_BLOCK_SIZE)]
    /// The number of consecutive rows multiplied together.
    pub block_size: usize,

    #[arg(long, default_value_t = PageRank::DEFAULT_MAX_ITER)]
    /// Maximum number of iterations.
    pub max_iter: usize,

    #[arg(long)]
    /// A damping factor replacing α from iteration max-iter / 2 onwards.
    pub late_alpha: Option<f64>,

    #[arg(short = 'k', long, default_value_t = top::DEFAULT_K)]
    /// The number of top-ranked nodes to store.
    pub top: usize,

    #[arg(short, long)]
    /// The number of nodes, if larger than the largest node in the edge list
    /// plus one.
    pub num_nodes: Option<usize>,
}

fn check_damping(name: &str, alpha: f64) -> Result<()> {
    ensure!(
        alpha > 0.0 && alpha < 1.0,
        "The {} must be in (0 . . 1), got {}",
        name,
        alpha
    );
    Ok(())
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    check_damping("damping factor", args.alpha)?;
    if let Some(late_alpha) = args.late_alpha {
        check_damping("late damping factor", late_alpha)?;
    }
    ensure!(args.block_size > 0, "The block size must be positive");

    let predicate = match args.norm {
        Norm::L1 => L1Norm::try_from(args.threshold)?.boxed(),
        Norm::L2 => L2Norm::try_from(args.threshold)?.boxed(),
    };

    let mut pl = progress_logger![];
    pl.display_memory(true);
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let graph = EdgeList::new()
        .num_nodes(args.num_nodes)
        .load(&args.input, &mut pl)
        .with_context(|| format!("Could not load the graph from {}", args.input.display()))?;
    let transition = Transition::with_logging(graph.into_transpose(), &mut pl);

    let mut pr = PageRank::new(&transition);
    pr.alpha(args.alpha)
        .late_alpha(args.late_alpha)
        .block_size(args.block_size)
        .max_iter(args.max_iter);

    let state = pr.run_with_logging(predicate, &mut pl);
    log::info!(
        "Completed after {} iteration(s) ({}), ℓ₁ delta = {}",
        pr.iterations(),
        state,
        pr.l1_delta()
    );
    if state == State::MaxIterationsReached {
        log::warn!("The ranking is based on a non-converged approximation");
    }

    store_top(&args.output, &top_k(pr.rank(), args.top))
}

fn store_top(path: &Path, top: &[top::Ranked]) -> Result<()> {
    create_parent_dir(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Could not create {}", path.display()))?;
    log::info!("Storing the top {} nodes at {}", top.len(), path.display());
    write_top(BufWriter::new(file), top)
        .with_context(|| format!("Could not write to {}", path.display()))
}

