/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Block-chunked sparse PageRank.
//!
//! This implementation runs the classical power method on a sparse
//! [transition operator](Transition), never materializing the dense *n* × *n*
//! Google matrix, nor any dense row of the adjacency matrix.
//!
//! # The formula
//!
//! If we denote with *T* the column-normalized transpose of the adjacency
//! matrix of the graph (with zero columns for dangling nodes), with **d** the
//! characteristic vector of dangling nodes, and with α the damping factor,
//! each iteration computes
//!
//! > **x**⁽*ᵗ* ⁺ ¹⁾ = α *T* **x**⁽*ᵗ*⁾ + (1 − α) / *n* + α (**d** · **x**⁽*ᵗ*⁾) / *n*,
//!
//! starting from the uniform vector **x**⁽⁰⁾ = **1** / *n*. The second term is
//! the random jump; the third one, the _leak_, redistributes uniformly the rank
//! that dangling nodes would otherwise destroy. As a consequence, the rank
//! vector remains stochastic after every iteration.
//!
//! # Blocks
//!
//! The product *T* **x** is computed one block of consecutive rows at a time
//! (350 rows by default, see [`block_size`](PageRank::block_size)): each block
//! reads the immutable operator and the immutable current approximation and
//! writes a disjoint segment of the next approximation. Smaller blocks bound
//! the transient working set more tightly at the cost of more loop overhead;
//! the block size does not change the result.
//!
//! # Stopping criteria
//!
//! The [`run`](PageRank::run) method accepts a composable [`Predicate`] that
//! is evaluated after each iteration on the ℓ₁ and ℓ₂ norms of the difference
//! between successive approximations (see [`preds`]). When the predicate is
//! satisfied the computation is [converged](State::Converged), and the rank
//! vector holds the approximation _preceding_ the one that satisfied the
//! predicate, which is discarded. Independently,
//! the computation stops after [`max_iter`](PageRank::max_iter) iterations
//! (100 by default) in the [`MaxIterationsReached`](State::MaxIterationsReached)
//! state, leaving the last approximation in the rank vector.
//!
//! # Damping decay
//!
//! Optionally, a [late damping factor](PageRank::late_alpha) can replace α
//! during the second half of the iteration budget. A smaller damping factor
//! makes the iteration contract faster, at the price of computing a slightly
//! different vector. The option is disabled by default.

pub mod preds {
    //! Predicates implementing stopping conditions.
    //!
    //! The implementation of [PageRank](super::PageRank) requires a
    //! [predicate](Predicate) to decide when the computation has converged.
    //! This module provides predicates on the ℓ₁ and ℓ₂ norms of the
    //! difference between successive approximations: they evaluate to true if
    //! the computation should be stopped.
    //!
    //! You can combine the predicates using the `and` and `or` methods provided
    //! by the [`Predicate`] trait.
    //!
    //! # Examples
    //! ```
    //! # fn main() -> Result<(), Box<dyn std::error::Error>> {
    //! use predicates::prelude::*;
    //! use sparserank_algo::rank::pagerank::preds::{L1Norm, L2Norm};
    //!
    //! let mut predicate = L1Norm::try_from(1E-6)?.boxed();
    //! predicate = predicate.and(L2Norm::try_from(1E-7)?).boxed();
    //! #     Ok(())
    //! # }
    //! ```

    use anyhow::ensure;
    use predicates::{Predicate, reflection::PredicateReflection};
    use std::fmt::Display;

    #[doc(hidden)]
    /// This structure is passed to stopping predicates to provide the
    /// information that is needed to evaluate them.
    #[derive(Debug)]
    pub struct PredParams {
        pub iteration: usize,
        pub l1_delta: f64,
        pub l2_delta: f64,
    }

    fn check_threshold(threshold: f64) -> anyhow::Result<f64> {
        ensure!(!threshold.is_nan());
        ensure!(threshold > 0.0, "The threshold must be positive");
        Ok(threshold)
    }

    /// Stops when the ℓ₁ norm of the difference between successive
    /// approximations falls below a given threshold.
    #[derive(Debug, Clone)]
    pub struct L1Norm {
        threshold: f64,
    }

    impl L1Norm {
        pub const DEFAULT_THRESHOLD: f64 = 1E-6;
    }

    impl TryFrom<Option<f64>> for L1Norm {
        type Error = anyhow::Error;
        fn try_from(threshold: Option<f64>) -> anyhow::Result<Self> {
            Ok(match threshold {
                Some(threshold) => L1Norm {
                    threshold: check_threshold(threshold)?,
                },
                None => Self::default(),
            })
        }
    }

    impl TryFrom<f64> for L1Norm {
        type Error = anyhow::Error;
        fn try_from(threshold: f64) -> anyhow::Result<Self> {
            Some(threshold).try_into()
        }
    }

    impl Default for L1Norm {
        fn default() -> Self {
            L1Norm {
                threshold: Self::DEFAULT_THRESHOLD,
            }
        }
    }

    impl Display for L1Norm {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(ℓ₁ norm: {})", self.threshold))
        }
    }

    impl PredicateReflection for L1Norm {}
    impl Predicate<PredParams> for L1Norm {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.l1_delta < self.threshold
        }
    }

    /// Stops when the ℓ₂ norm of the difference between successive
    /// approximations falls below a given threshold.
    #[derive(Debug, Clone)]
    pub struct L2Norm {
        threshold: f64,
    }

    impl L2Norm {
        pub const DEFAULT_THRESHOLD: f64 = 1E-6;
    }

    impl TryFrom<Option<f64>> for L2Norm {
        type Error = anyhow::Error;
        fn try_from(threshold: Option<f64>) -> anyhow::Result<Self> {
            Ok(match threshold {
                Some(threshold) => L2Norm {
                    threshold: check_threshold(threshold)?,
                },
                None => Self::default(),
            })
        }
    }

    impl TryFrom<f64> for L2Norm {
        type Error = anyhow::Error;
        fn try_from(threshold: f64) -> anyhow::Result<Self> {
            Some(threshold).try_into()
        }
    }

    impl Default for L2Norm {
        fn default() -> Self {
            L2Norm {
                threshold: Self::DEFAULT_THRESHOLD,
            }
        }
    }

    impl Display for L2Norm {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(ℓ₂ norm: {})", self.threshold))
        }
    }

    impl PredicateReflection for L2Norm {}
    impl Predicate<PredParams> for L2Norm {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.l2_delta < self.threshold
        }
    }
}

/// The state of a PageRank computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The computation has not been run yet.
    Initialized,
    /// The computation is running.
    Iterating,
    /// The stopping predicate was satisfied.
    Converged,
    /// The maximum number of iterations was reached before the stopping
    /// predicate was satisfied.
    MaxIterationsReached,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Initialized => f.write_str("initialized"),
            State::Iterating => f.write_str("iterating"),
            State::Converged => f.write_str("converged"),
            State::MaxIterationsReached => f.write_str("maximum number of iterations reached"),
        }
    }
}

use dsi_progress_logger::{ProgressLog, no_logging};
use kahan::KahanSum;
use predicates::Predicate;
use sparserank::transition::Transition;

/// Computes PageRank using a block-chunked sparse power iteration.
///
/// The struct is configured via setters and then executed via
/// [`run`](Self::run). After completion the rank vector is available via the
/// [`rank`](Self::rank) method.
///
/// # Examples
///
/// ```
/// use dsi_progress_logger::no_logging;
/// use sparserank::prelude::*;
/// use sparserank_algo::rank::pagerank::{PageRank, State, preds};
///
/// // 0 → 1, 0 → 2, 1 → 2, 2 → 0, 3 → 0, 4 → 3
/// let graph = EdgeList::new()
///     .load_from_reader("0 1\n0 2\n1 2\n2 0\n3 0\n4 3\n".as_bytes(), no_logging![])
///     .unwrap();
/// let transition = Transition::new(graph.into_transpose());
///
/// let mut pr = PageRank::new(&transition);
/// pr.alpha(0.85).block_size(2);
/// let state = pr.run(preds::L1Norm::try_from(1E-9).unwrap());
///
/// assert_eq!(state, State::Converged);
/// assert_eq!(pr.rank().len(), 5);
/// assert!((pr.rank().iter().sum::<f64>() - 1.0).abs() < 1E-9);
/// ```
pub struct PageRank<'a> {
    transition: &'a Transition,
    alpha: f64,
    late_alpha: Option<f64>,
    block_size: usize,
    max_iter: usize,

    rank: Box<[f64]>,
    state: State,
    iteration: usize,
    l1_delta: f64,
    leak: f64,
}

impl std::fmt::Debug for PageRank<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRank")
            .field("alpha", &self.alpha)
            .field("late_alpha", &self.late_alpha)
            .field("block_size", &self.block_size)
            .field("max_iter", &self.max_iter)
            .field("state", &self.state)
            .field("iteration", &self.iteration)
            .field("l1_delta", &self.l1_delta)
            .finish_non_exhaustive()
    }
}

impl<'a> PageRank<'a> {
    pub const DEFAULT_ALPHA: f64 = 0.85;
    pub const DEFAULT_BLOCK_SIZE: usize = 350;
    pub const DEFAULT_MAX_ITER: usize = 100;

    /// Creates a new PageRank computation on the given transition operator.
    pub fn new(transition: &'a Transition) -> Self {
        let n = transition.num_nodes();
        Self {
            transition,
            alpha: Self::DEFAULT_ALPHA,
            late_alpha: None,
            block_size: Self::DEFAULT_BLOCK_SIZE,
            max_iter: Self::DEFAULT_MAX_ITER,
            rank: vec![0.0; n].into_boxed_slice(),
            state: State::Initialized,
            iteration: 0,
            l1_delta: f64::INFINITY,
            leak: 0.0,
        }
    }

    fn assert_damping(alpha: f64) {
        assert!(
            alpha > 0.0 && alpha < 1.0,
            "The damping factor must be in (0 . . 1), got {alpha}"
        );
    }

    /// Sets the damping factor α.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is not in the interval (0 . . 1).
    pub fn alpha(&mut self, alpha: f64) -> &mut Self {
        Self::assert_damping(alpha);
        self.alpha = alpha;
        self
    }

    /// Sets a damping factor replacing α from iteration
    /// [`max_iter`](Self::max_iter) / 2 onwards.
    ///
    /// Pass `None` to use α for the whole computation (the default).
    ///
    /// # Panics
    ///
    /// Panics if `late_alpha` is not in the interval (0 . . 1).
    pub fn late_alpha(&mut self, late_alpha: Option<f64>) -> &mut Self {
        if let Some(late_alpha) = late_alpha {
            Self::assert_damping(late_alpha);
        }
        self.late_alpha = late_alpha;
        self
    }

    /// Sets the number of consecutive rows processed together.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn block_size(&mut self, block_size: usize) -> &mut Self {
        assert!(block_size > 0, "The block size must be positive");
        self.block_size = block_size;
        self
    }

    /// Sets the maximum number of iterations.
    pub fn max_iter(&mut self, max_iter: usize) -> &mut Self {
        self.max_iter = max_iter;
        self
    }

    /// Returns the rank vector.
    ///
    /// After calling [`run`](Self::run), this contains the computed PageRank
    /// values. If the computation converged after *t* iterations, these are
    /// the values after *t* − 1 iterations.
    pub fn rank(&self) -> &[f64] {
        &self.rank
    }

    /// Consumes the computation, returning the rank vector.
    pub fn into_rank(self) -> Box<[f64]> {
        self.rank
    }

    /// Returns the state of the computation.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the number of iterations performed by the last call to
    /// [`run`](Self::run).
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Returns the ℓ₁ norm of the difference between the last two
    /// approximations.
    pub fn l1_delta(&self) -> f64 {
        self.l1_delta
    }

    /// Returns the rank leaked by dangling nodes and redistributed to each
    /// node during the last iteration, that is, α (**d** · **x**) / *n*.
    pub fn leak(&self) -> f64 {
        self.leak
    }

    /// Returns the damping factor used at the given (zero-based) iteration.
    fn alpha_at(&self, iteration: usize) -> f64 {
        match self.late_alpha {
            Some(late_alpha) if iteration >= self.max_iter / 2 => late_alpha,
            _ => self.alpha,
        }
    }

    /// Runs the PageRank computation until the given predicate is satisfied
    /// or the maximum number of iterations is reached.
    pub fn run(&mut self, predicate: impl Predicate<preds::PredParams>) -> State {
        self.run_with_logging(predicate, no_logging![])
    }

    /// Runs the PageRank computation until the given predicate is satisfied
    /// or the maximum number of iterations is reached, logging progress.
    ///
    /// `pl` counts iterations; its options will be preserved, making thus
    /// possible to customize the logs.
    pub fn run_with_logging(
        &mut self,
        predicate: impl Predicate<preds::PredParams>,
        pl: &mut impl ProgressLog,
    ) -> State {
        let n = self.transition.num_nodes();
        self.iteration = 0;
        self.l1_delta = f64::INFINITY;
        self.leak = 0.0;

        if n == 0 {
            self.state = State::Converged;
            return self.state;
        }

        log::info!("Alpha: {}", self.alpha);
        if let Some(late_alpha) = self.late_alpha {
            log::info!(
                "Late alpha: {} (from iteration {})",
                late_alpha,
                self.max_iter / 2 + 1
            );
        }
        log::info!("Block size: {}", self.block_size);
        log::info!("Stopping criterion: {} (max iter: {})", predicate, self.max_iter);

        self.rank.fill(1.0 / n as f64);
        let mut next = vec![0.0; n].into_boxed_slice();
        self.state = State::Iterating;

        pl.item_name("iteration");
        pl.expected_updates(Some(self.max_iter));
        pl.start(format!(
            "Computing PageRank (alpha={}, block size={})...",
            self.alpha, self.block_size
        ));

        loop {
            if self.iteration >= self.max_iter {
                self.state = State::MaxIterationsReached;
                log::warn!(
                    "No convergence after {} iterations (ℓ₁ delta = {}): returning the last approximation",
                    self.iteration,
                    self.l1_delta
                );
                break;
            }

            let alpha = self.alpha_at(self.iteration);
            self.leak = self.step(alpha, &mut next);

            let mut l1_delta: KahanSum<f64> = KahanSum::new();
            let mut l2_delta: KahanSum<f64> = KahanSum::new();
            for (&x, &y) in self.rank.iter().zip(next.iter()) {
                let diff = y - x;
                l1_delta += diff.abs();
                l2_delta += diff * diff;
            }
            self.l1_delta = l1_delta.sum();
            let l2_delta = l2_delta.sum().sqrt();

            self.iteration += 1;

            log::info!(
                "Iteration {}: ℓ₁ delta = {}, ℓ₂ delta = {}",
                self.iteration,
                self.l1_delta,
                l2_delta
            );
            pl.update_and_display();

            // On convergence the current approximation is kept
            if predicate.eval(&preds::PredParams {
                iteration: self.iteration,
                l1_delta: self.l1_delta,
                l2_delta,
            }) {
                self.state = State::Converged;
                break;
            }

            std::mem::swap(&mut self.rank, &mut next);
        }

        pl.done();
        self.state
    }

    /// Computes the next approximation from the current rank vector into
    /// `next`, returning the leak.
    fn step(&self, alpha: f64, next: &mut [f64]) -> f64 {
        let n = self.rank.len();
        let jump = (1.0 - alpha) / n as f64;

        for (block, out) in next.chunks_mut(self.block_size).enumerate() {
            let start = block * self.block_size;
            self.transition
                .mul_rows(start..start + out.len(), &self.rank, out);
            for x in out.iter_mut() {
                *x = alpha * *x + jump;
            }
        }

        let mut dangling_rank: KahanSum<f64> = KahanSum::new();
        for (&x, &dangling) in self.rank.iter().zip(self.transition.dangling()) {
            if dangling {
                dangling_rank += x;
            }
        }
        let leak = alpha * dangling_rank.sum() / n as f64;
        for x in next.iter_mut() {
            *x += leak;
        }
        leak
    }
}

/// Computes PageRank with an ℓ₁ stopping threshold, returning the rank
/// vector.
///
/// This is a convenience function for drivers running many computations
/// with different parameters: it is equivalent to configuring a
/// [`PageRank`] with the given parameters and running it with an
/// [`L1Norm`](preds::L1Norm) predicate.
pub fn pagerank(
    transition: &Transition,
    alpha: f64,
    max_iter: usize,
    tolerance: f64,
    block_size: usize,
) -> anyhow::Result<Box<[f64]>> {
    let predicate = preds::L1Norm::try_from(tolerance)?;
    let mut pr = PageRank::new(transition);
    pr.alpha(alpha).max_iter(max_iter).block_size(block_size);
    pr.run(predicate);
    Ok(pr.into_rank())
}
