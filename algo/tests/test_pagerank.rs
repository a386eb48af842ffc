/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use dsi_progress_logger::no_logging;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sparserank::prelude::*;
use sparserank_algo::rank::pagerank::{PageRank, State, pagerank, preds};

fn transition(arcs: &str) -> Transition {
    let g = EdgeList::new()
        .load_from_reader(arcs.as_bytes(), no_logging![])
        .unwrap();
    Transition::new(g.into_transpose())
}

/// Builds the transition operator of a graph made of a *k*-clique (nodes
/// 0..*k*) and a directed *p*-cycle (nodes *k*..*k* + *p*) with optional
/// bridge arcs between node *k* − 1 and node *k*.
///
/// The bridge type is one of:
/// - `"bi"`:      arcs *k* − 1 → *k* and *k* → *k* − 1
/// - `"back"`:    arc *k* → *k* − 1 only
/// - `"forward"`: arc *k* − 1 → *k* only
/// - `"none"`:    no bridge
fn clique_cycle(p: usize, k: usize, bridge: &str) -> Transition {
    let n = p + k;
    // (target, source) cells of the transposed adjacency matrix
    let mut cells = Vec::new();

    for i in 0..k {
        for j in 0..k {
            if i != j {
                cells.push((i, j));
            }
        }
    }

    // Arc k + i → k + (i + 1) % p
    for i in 0..p {
        cells.push((k + (i + 1) % p, k + i));
    }

    match bridge {
        "bi" => {
            cells.push((k - 1, k));
            cells.push((k, k - 1));
        }
        "back" => {
            cells.push((k - 1, k));
        }
        "forward" => {
            cells.push((k, k - 1));
        }
        "none" => {}
        _ => panic!("Unknown bridge type: {bridge}"),
    }

    Transition::new(CsrMatrix::from_cells(n, n, cells))
}

/// Returns the 𝓁-∞ distance (maximum absolute difference) between two vectors.
fn l_inf_distance(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn assert_stochastic(rank: &[f64]) {
    assert!(rank.iter().all(|&x| x >= 0.0));
    let sum: f64 = rank.iter().sum();
    assert!((sum - 1.0).abs() < 1E-6, "The rank sums to {sum}");
}

/// Runs to (numerical) convergence.
fn exact(t: &Transition, alpha: f64) -> PageRank<'_> {
    let mut pr = PageRank::new(t);
    pr.alpha(alpha).max_iter(10_000);
    assert_eq!(
        pr.run(preds::L1Norm::try_from(1E-12).unwrap()),
        State::Converged
    );
    pr
}

#[test]
fn test_empty() {
    let t = transition("");
    let mut pr = PageRank::new(&t);
    assert_eq!(pr.state(), State::Initialized);
    assert_eq!(pr.run(preds::L1Norm::default()), State::Converged);
    assert!(pr.rank().is_empty());
    assert_eq!(pr.iterations(), 0);
}

#[test]
fn test_single_node() {
    let t = Transition::new(CsrMatrix::empty(1, 1));
    let mut pr = PageRank::new(&t);
    assert_eq!(pr.run(preds::L1Norm::default()), State::Converged);
    assert!((pr.rank()[0] - 1.0).abs() < 1E-15);
    assert_eq!(pr.iterations(), 1);
}

#[test]
fn test_cycle_is_uniform() {
    for k in [2, 3, 10, 1000] {
        let arcs: String = (0..k).map(|i| format!("{} {}\n", i, (i + 1) % k)).collect();
        let t = transition(&arcs);
        let mut pr = PageRank::new(&t);
        assert_eq!(pr.run(preds::L1Norm::default()), State::Converged);
        assert_eq!(pr.iterations(), 1);
        for &x in pr.rank() {
            assert!((x - 1.0 / k as f64).abs() < 1E-15);
        }
    }
}

#[test]
fn test_all_dangling() {
    let mut loader = EdgeList::new();
    loader.num_nodes(Some(7));
    let g = loader
        .load_from_reader("".as_bytes(), no_logging![])
        .unwrap();
    let t = Transition::new(g.into_transpose());
    assert_eq!(t.num_dangling(), 7);
    let mut pr = PageRank::new(&t);
    assert_eq!(pr.run(preds::L1Norm::default()), State::Converged);
    assert_eq!(pr.iterations(), 1);
    for &x in pr.rank() {
        assert!((x - 1.0 / 7.0).abs() < 1E-15);
    }
}

#[test]
fn test_single_dangling_node() {
    let t = transition("0 1\n");
    let mut pr = PageRank::new(&t);
    assert_eq!(pr.run(preds::L1Norm::default()), State::Converged);
    assert!(pr.rank()[1] > pr.rank()[0]);
    assert_stochastic(pr.rank());

    // Fixed point: x₀ = (1 − α) / 2 + α x₁ / 2, x₁ = x₀ + x₀ α
    let alpha = 0.85;
    let x0 = 1.0 / (2.0 + alpha);
    assert!((pr.rank()[0] - x0).abs() < 1E-6);
    assert!((pr.rank()[1] - (1.0 + alpha) * x0).abs() < 1E-6);
}

#[test]
fn test_converged_rank_precedes_last_iteration() {
    // Nodes 4 and 5 have no predecessors
    let t = transition("0 1\n0 2\n1 2\n2 0\n3 0\n4 3\n5 1\n");
    let mut pr = PageRank::new(&t);
    assert_eq!(pr.run(preds::L1Norm::default()), State::Converged);
    let iterations = pr.iterations();
    assert!(iterations > 1);
    assert!(pr.l1_delta() < preds::L1Norm::DEFAULT_THRESHOLD);

    // The same computation stopped one iteration earlier
    let mut before = PageRank::new(&t);
    before.max_iter(iterations - 1);
    assert_eq!(
        before.run(preds::L1Norm::default()),
        State::MaxIterationsReached
    );
    assert_eq!(pr.rank(), before.rank());
    assert_eq!(pr.rank().len(), 6);
    assert_stochastic(pr.rank());

    // Stopping one iteration later would have given a different vector
    let mut after = PageRank::new(&t);
    after.max_iter(iterations);
    after.run(preds::L1Norm::try_from(1E-15).unwrap());
    assert_ne!(pr.rank(), after.rank());
}

#[test]
fn test_first_iteration_leak() {
    // Node 1 is the only dangling node
    let t = transition("0 1\n");
    let mut pr = PageRank::new(&t);
    pr.max_iter(1);
    pr.run(preds::L1Norm::try_from(1E-15).unwrap());
    assert_eq!(pr.iterations(), 1);
    // The initial rank of node 1 is 1 / 2
    assert_eq!(pr.leak(), 0.85 * 0.5 / 2.0);
    // New rank of node 0: jump + leak
    assert!((pr.rank()[0] - (0.15 / 2.0 + 0.85 * 0.25)).abs() < 1E-15);
}

#[test]
fn test_max_iterations_reached() {
    let t = clique_cycle(10, 5, "back");
    let mut pr = PageRank::new(&t);
    pr.max_iter(3);
    assert_eq!(
        pr.run(preds::L1Norm::try_from(1E-15).unwrap()),
        State::MaxIterationsReached
    );
    assert_eq!(pr.iterations(), 3);
    assert_stochastic(pr.rank());

    pr.max_iter(0);
    assert_eq!(
        pr.run(preds::L1Norm::default()),
        State::MaxIterationsReached
    );
    assert_eq!(pr.rank(), &[1.0 / 15.0; 15]);
}

#[test]
fn test_block_size_does_not_change_result() {
    let t = clique_cycle(37, 23, "bi");
    let mut reference = PageRank::new(&t);
    reference.block_size(1);
    reference.run(preds::L1Norm::default());
    for block_size in [2, 7, 59, 60, 350, 1000] {
        let mut pr = PageRank::new(&t);
        pr.block_size(block_size);
        pr.run(preds::L1Norm::default());
        assert_eq!(pr.rank(), reference.rank(), "block size {block_size}");
        assert_eq!(pr.iterations(), reference.iterations());
    }
}

#[test]
fn test_deterministic() {
    let t = clique_cycle(20, 10, "back");
    let a = pagerank(&t, 0.85, 100, 1E-6, 350).unwrap();
    let b = pagerank(&t, 0.85, 100, 1E-6, 350).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_l1_delta_non_increasing() {
    let t = clique_cycle(30, 10, "bi");
    let mut deltas = vec![];
    for max_iter in 1..=30 {
        let mut pr = PageRank::new(&t);
        pr.max_iter(max_iter);
        pr.run(preds::L1Norm::try_from(1E-15).unwrap());
        deltas.push(pr.l1_delta());
    }
    for w in deltas.windows(2) {
        assert!(w[1] <= w[0] + 1E-15, "{deltas:?}");
    }
}

#[test]
fn test_l2_norm() {
    let t = clique_cycle(30, 10, "bi");
    let mut l1 = PageRank::new(&t);
    l1.run(preds::L1Norm::try_from(1E-6).unwrap());
    let mut l2 = PageRank::new(&t);
    l2.run(preds::L2Norm::try_from(1E-6).unwrap());
    // The ℓ₂ norm is never larger than the ℓ₁ norm
    assert!(l2.iterations() <= l1.iterations());
    assert_stochastic(l2.rank());
}

#[test]
fn test_late_alpha() {
    let t = clique_cycle(30, 10, "back");
    let mut pr = PageRank::new(&t);
    pr.max_iter(400).late_alpha(Some(0.75));
    assert_eq!(
        pr.run(preds::L1Norm::try_from(1E-12).unwrap()),
        State::Converged
    );
    assert_stochastic(pr.rank());
    // After the switch the iteration converges to PageRank with α = 0.75
    assert!(pr.iterations() > 200);
    let expected = exact(&t, 0.75);
    assert!(l_inf_distance(pr.rank(), expected.rank()) < 1E-9);
}

#[test]
fn test_clique_no_bridge_cycle() {
    for &p in &[10, 50] {
        for &k in &[10, 50] {
            let t = clique_cycle(p, k, "none");
            let n = t.num_nodes();
            for &alpha in &[0.25, 0.50, 0.75] {
                let pr = exact(&t, alpha);
                let expected = vec![1.0 / n as f64; n];
                assert!(l_inf_distance(&expected, pr.rank()) < 1E-9);
            }
        }
    }
}

/// Tests PageRank on a *k*-clique and a directed *p*-cycle connected by a
/// bidirectional bridge between nodes *k* − 1 and *k*. The expected rank
/// values are derived analytically in terms of the rank at node *k* − 1.
#[test]
fn test_clique_bidi_bridge_cycle() {
    for &p in &[10, 50, 100] {
        for &k in &[10, 50, 100] {
            let t = clique_cycle(p, k, "bi");
            let n = t.num_nodes();
            assert_eq!(n, p + k);

            for &alpha in &[0.25, 0.50, 0.75] {
                let pr = exact(&t, alpha);

                let r = pr.rank()[k - 1] * n as f64;
                let mut expected = vec![0.0; n];

                expected[k - 1] = r;
                let clique_rank = (k - 1) as f64 * (k as f64 - alpha * k as f64 + alpha * r)
                    / (k as f64 * ((k - 1) as f64 - alpha * (k - 2) as f64));
                expected[..k - 1].fill(clique_rank);
                expected[k] =
                    2.0 + 2.0 * (alpha * r - k as f64) / (k as f64 * (2.0 - alpha.powi(p as i32)));
                for d in 1..p {
                    expected[k + d] = 1.0
                        + alpha.powi(d as i32) * (alpha * r - k as f64)
                            / (k as f64 * (2.0 - alpha.powi(p as i32)));
                }
                for v in expected.iter_mut() {
                    *v /= n as f64;
                }

                assert!(
                    l_inf_distance(&expected, pr.rank()) < 1E-9,
                    "bidi bridge p={p} k={k} alpha={alpha}: L∞={}",
                    l_inf_distance(&expected, pr.rank())
                );
            }
        }
    }
}

/// Tests PageRank on a *k*-clique and a directed *p*-cycle connected by a
/// single arc from node *k* to node *k* − 1 (a "backward" bridge from the
/// cycle to the clique). The expected rank values are fully analytical.
#[test]
fn test_clique_back_bridge_cycle() {
    for &p in &[10, 50, 100] {
        for &k in &[10, 50, 100] {
            let t = clique_cycle(p, k, "back");
            let n = t.num_nodes();

            for &alpha in &[0.25, 0.50, 0.75] {
                let pr = exact(&t, alpha);

                let mut expected = vec![0.0; n];
                let kf = k as f64;

                let clique_rank = (2.0 * (kf - 1.0) - 2.0 * (kf - 2.0) * alpha - alpha * alpha)
                    / (2.0 * (1.0 - alpha) * (kf - 1.0 + alpha))
                    - alpha.powi(p as i32 + 2)
                        / (2.0 * (1.0 - alpha) * (kf - 1.0 + alpha) * (2.0 - alpha.powi(p as i32)));
                expected[..k - 1].fill(clique_rank);

                expected[k - 1] = (2.0 * (kf - 1.0) - (kf - 3.0) * alpha - alpha * alpha * kf)
                    / (2.0 * (1.0 - alpha) * (kf - 1.0 + alpha))
                    - alpha.powi(p as i32 + 1) * (kf - 1.0 - alpha * (kf - 2.0))
                        / (2.0 * (1.0 - alpha) * (kf - 1.0 + alpha) * (2.0 - alpha.powi(p as i32)));

                for d in 0..p {
                    let exp = if d == 0 { p } else { d };
                    expected[k + d] = 1.0 - alpha.powi(exp as i32) / (2.0 - alpha.powi(p as i32));
                }

                for v in expected.iter_mut() {
                    *v /= n as f64;
                }

                assert!(
                    l_inf_distance(&expected, pr.rank()) < 1E-9,
                    "back bridge p={p} k={k} alpha={alpha}: L∞={}",
                    l_inf_distance(&expected, pr.rank())
                );
            }
        }
    }
}

/// Tests PageRank on a *k*-clique and a directed *p*-cycle connected by a
/// single arc from node *k* − 1 to node *k* (a "forward" bridge from the
/// clique to the cycle). The expected rank values are fully analytical.
#[test]
fn test_clique_forward_bridge_cycle() {
    for &p in &[10, 50, 100] {
        for &k in &[10, 50, 100] {
            let t = clique_cycle(p, k, "forward");
            let n = t.num_nodes();

            for &alpha in &[0.25, 0.50, 0.75] {
                let pr = exact(&t, alpha);

                let mut expected = vec![0.0; n];
                let kf = k as f64;
                let denom = (kf - alpha * alpha) * (kf - 1.0) - alpha * kf * (kf - 2.0);

                let clique_rank = (1.0 - alpha) * (alpha + kf) * (kf - 1.0) / denom;
                expected[..k - 1].fill(clique_rank);

                expected[k - 1] = kf * (1.0 - alpha) * (kf - 1.0 + alpha) / denom;

                for d in 0..p {
                    expected[k + d] = 1.0
                        + (alpha.powi(d as i32 + 1) * (1.0 - alpha) * (kf - 1.0 + alpha))
                            / ((1.0 - alpha.powi(p as i32)) * denom);
                }

                for v in expected.iter_mut() {
                    *v /= n as f64;
                }

                assert!(
                    l_inf_distance(&expected, pr.rank()) < 1E-9,
                    "forward bridge p={p} k={k} alpha={alpha}: L∞={}",
                    l_inf_distance(&expected, pr.rank())
                );
            }
        }
    }
}

/// Computes PageRank with a straightforward scatter-based power method on
/// an explicit list of successors.
fn power_method(succ: &[Vec<usize>], alpha: f64) -> Vec<f64> {
    let n = succ.len();
    let inv_n = 1.0 / n as f64;
    let mut rank = vec![inv_n; n];
    loop {
        let mut new_rank = vec![0.0; n];
        let mut dangling_rank = 0.0;
        for (j, s) in succ.iter().enumerate() {
            if s.is_empty() {
                dangling_rank += rank[j];
            } else {
                let contrib = rank[j] / s.len() as f64;
                for &i in s {
                    new_rank[i] += contrib;
                }
            }
        }
        for x in new_rank.iter_mut() {
            *x = (1.0 - alpha) * inv_n + alpha * (*x + dangling_rank * inv_n);
        }
        let diff: f64 = rank
            .iter()
            .zip(new_rank.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        rank = new_rank;
        if diff < 1E-13 {
            break;
        }
    }
    rank
}

/// Tests against the power method on random directed graphs with dangling
/// nodes and duplicate arcs.
#[test]
fn test_random_vs_power_method() {
    for &(n, arc_p, seed) in &[(10, 0.3, 0u64), (100, 0.05, 1), (1000, 0.003, 2)] {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut succ = vec![vec![]; n];
        let mut arcs = String::new();
        for (i, s) in succ.iter_mut().enumerate() {
            for j in 0..n {
                if rng.random_bool(arc_p) {
                    // Duplicate some arcs: they count twice
                    let times = if rng.random_bool(0.1) { 2 } else { 1 };
                    for _ in 0..times {
                        s.push(j);
                        arcs.push_str(&format!("{i} {j}\n"));
                    }
                }
            }
        }
        // Make sure the last node appears
        if !succ.iter().flatten().any(|&j| j == n - 1) && succ[n - 1].is_empty() {
            succ[0].push(n - 1);
            arcs.push_str(&format!("0 {}\n", n - 1));
        }

        let t = transition(&arcs);
        assert_eq!(t.num_nodes(), n);
        for &alpha in &[0.25, 0.50, 0.85] {
            let expected = power_method(&succ, alpha);
            let pr = exact(&t, alpha);
            assert_stochastic(pr.rank());
            assert!(
                l_inf_distance(&expected, pr.rank()) < 1E-10,
                "n={n} alpha={alpha}: L∞={}",
                l_inf_distance(&expected, pr.rank())
            );
        }
    }
}
