/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::GlobalArgs;
use anyhow::{Context, Result, ensure};
use clap::Parser;
use dsi_progress_logger::{ProgressLog, progress_logger};
use sparserank::prelude::*;
use sparserank_algo::rank::pagerank::preds::L1Norm;
use sparserank_algo::rank::pagerank::{PageRank, State};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(
    name = "sweep",
    about = "Benchmarks PageRank on a grid of damping factors and block sizes.",
    long_about = None
)]
pub struct CliArgs {
    /// The edge list, one "<source> <target>" arc per line.
    pub input: PathBuf,

    #[arg(long, value_delimiter = ',', default_values_t = [0.85])]
    /// Comma-separated damping factors.
    pub alphas: Vec<f64>,

    #[arg(long, value_delimiter = ',', default_values_t = [PageRank::DEFAULT_BLOCK_SIZE])]
    /// Comma-separated block sizes.
    pub block_sizes: Vec<usize>,

    #[arg(short, long, default_value_t = L1Norm::DEFAULT_THRESHOLD)]
    /// The ℓ₁ error threshold to stop.
    pub threshold: f64,

    #[arg(long, default_value_t = PageRank::DEFAULT_MAX_ITER)]
    /// Maximum number of iterations.
    pub max_iter: usize,

    #[arg(short = 'R', long, default_value_t = 1)]
    /// Number of repeats for each combination of parameters.
    pub repeats: usize,
}

/// The outcome of the runs with a given combination of parameters.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    pub alpha: f64,
    pub block_size: usize,
    pub iterations: usize,
    pub state: State,
    pub mean: Duration,
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    ensure!(args.repeats > 0, "The number of repeats must be positive");
    for &alpha in &args.alphas {
        ensure!(
            alpha > 0.0 && alpha < 1.0,
            "The damping factor must be in (0 . . 1), got {}",
            alpha
        );
    }
    ensure!(
        args.block_sizes.iter().all(|&b| b > 0),
        "Block sizes must be positive"
    );

    let mut pl = progress_logger![];
    pl.display_memory(true);
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let graph = EdgeList::new()
        .load(&args.input, &mut pl)
        .with_context(|| format!("Could not load the graph from {}", args.input.display()))?;
    let transition = Transition::with_logging(graph.into_transpose(), &mut pl);

    sweep(&transition, &args)?;
    Ok(())
}

/// Returns the mean duration of `repeats` runs taking `total` overall.
fn mean(total: Duration, repeats: usize) -> Duration {
    total.div_f64(repeats as f64)
}

/// Runs the solver on every combination of parameters, logging and
/// returning the measurements.
pub fn sweep(transition: &Transition, args: &CliArgs) -> Result<Vec<Measurement>> {
    let mut pl = progress_logger![];
    pl.item_name("run")
        .expected_updates(Some(
            args.alphas.len() * args.block_sizes.len() * args.repeats,
        ));
    pl.start("Sweeping...");

    let mut measurements = Vec::new();
    for &alpha in &args.alphas {
        for &block_size in &args.block_sizes {
            let mut total = Duration::ZERO;
            let mut iterations = 0;
            let mut state = State::Initialized;
            for _ in 0..args.repeats {
                let mut pr = PageRank::new(transition);
                pr.alpha(alpha)
                    .block_size(block_size)
                    .max_iter(args.max_iter);
                let predicate = L1Norm::try_from(args.threshold)?;
                let start = Instant::now();
                state = pr.run(predicate);
                total += start.elapsed();
                iterations = pr.iterations();
                pl.update();
            }
            let mean_time = mean(total, args.repeats);
            log::info!(
                "alpha={} block_size={} iterations={} state={} mean_time={:?}",
                alpha,
                block_size,
                iterations,
                state,
                mean_time
            );
            measurements.push(Measurement {
                alpha,
                block_size,
                iterations,
                state,
                mean: mean_time,
            });
        }
    }
    pl.done();
    Ok(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsi_progress_logger::no_logging;

    fn args(alphas: Vec<f64>, block_sizes: Vec<usize>, repeats: usize) -> CliArgs {
        CliArgs {
            input: PathBuf::new(),
            alphas,
            block_sizes,
            threshold: L1Norm::DEFAULT_THRESHOLD,
            max_iter: 1000,
            repeats,
        }
    }

    #[test]
    fn test_sweep_grid() -> Result<()> {
        // A 3-cycle plus the dangling node 3
        let graph = EdgeList::new()
            .load_from_reader("0 1\n1 2\n2 0\n2 3\n".as_bytes(), no_logging![])?;
        let transition = Transition::new(graph.into_transpose());

        let measurements = sweep(&transition, &args(vec![0.5, 0.85], vec![1, 2, 350], 2))?;
        assert_eq!(measurements.len(), 6);

        let grid: Vec<_> = measurements
            .iter()
            .map(|m| (m.alpha, m.block_size))
            .collect();
        assert_eq!(
            grid,
            [
                (0.5, 1),
                (0.5, 2),
                (0.5, 350),
                (0.85, 1),
                (0.85, 2),
                (0.85, 350)
            ]
        );

        for m in &measurements {
            assert_eq!(m.state, State::Converged);
            assert!(m.iterations > 1);
        }
        // The block size does not change the computation
        for row in measurements.chunks(3) {
            assert!(row.iter().all(|m| m.iterations == row[0].iterations));
        }
        // A smaller damping factor converges faster
        assert!(measurements[0].iterations < measurements[3].iterations);

        // The iterations match a direct run of the solver
        let mut pr = PageRank::new(&transition);
        pr.alpha(0.85).max_iter(1000);
        pr.run(L1Norm::default());
        assert_eq!(measurements[3].iterations, pr.iterations());
        Ok(())
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Duration::from_secs(3), 2), Duration::from_millis(1500));
        // Repeat counts that do not fit a u32
        assert_eq!(
            mean(Duration::from_secs(1 << 32), 1 << 32),
            Duration::from_secs(1)
        );
        assert!(mean(Duration::from_secs(8), 1 << 33) < Duration::from_micros(1));
    }
}
