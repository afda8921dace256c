//! Rank-based group tests: Mann-Whitney U (normal approximation), its
//! bootstrapped variant, and Kruskal-Wallis.

use crate::stats::rng::SimpleRng;
use rayon::prelude::*;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use std::cmp::Ordering;

/// Assign 1-based ranks with ties averaged.
pub(crate) fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // average rank across the tie run
        let rank = (i + j - 1) as f64 / 2.0 + 1.0;
        for k in i..j {
            ranks[order[k]] = rank;
        }
        i = j;
    }
    ranks
}

fn mann_whitney_u(x: &[f64], y: &[f64]) -> f64 {
    let nx = x.len();
    let mut combined: Vec<f64> = Vec::with_capacity(nx + y.len());
    combined.extend_from_slice(x);
    combined.extend_from_slice(y);
    let ranks = average_ranks(&combined);
    let rank_sum_x: f64 = ranks[..nx].iter().sum();
    rank_sum_x - (nx * (nx + 1)) as f64 / 2.0
}

fn two_sided_normal_pvalue(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    let normal = Normal::new(0.0, 1.0).unwrap();
    (2.0 * (1.0 - normal.cdf(z.abs()))).min(1.0)
}

/// Mann-Whitney U test with the normal approximation and continuity
/// correction. The reported statistic is the larger of the two U values.
pub fn mw_test(x: &[f64], y: &[f64]) -> (f64, f64) {
    let nx = x.len();
    let ny = y.len();
    if nx == 0 || ny == 0 {
        return (f64::NAN, f64::NAN);
    }
    let u_x = mann_whitney_u(x, y);
    let u_y = (nx * ny) as f64 - u_x;
    let u = u_x.max(u_y);

    let mean_u = (nx * ny) as f64 / 2.0;
    let var_u = (nx * ny * (nx + ny + 1)) as f64 / 12.0;
    let z = (u - mean_u - 0.5) / var_u.sqrt();
    (u, two_sided_normal_pvalue(z))
}

/// Mann-Whitney U with a bootstrapped p-value.
///
/// Group labels are reshuffled `reps` times; the p-value is the
/// (+1-corrected) fraction of permutations whose U deviates from its null
/// mean at least as far as the observed U does.
pub fn mw_boot(x: &[f64], y: &[f64], reps: usize, seed: u64) -> (f64, f64) {
    let nx = x.len();
    let ny = y.len();
    if nx == 0 || ny == 0 || reps == 0 {
        return (f64::NAN, f64::NAN);
    }
    let u_x = mann_whitney_u(x, y);
    let u = u_x.max((nx * ny) as f64 - u_x);
    let mean_u = (nx * ny) as f64 / 2.0;
    let observed_dev = (u - mean_u).abs();

    let mut pool: Vec<f64> = Vec::with_capacity(nx + ny);
    pool.extend_from_slice(x);
    pool.extend_from_slice(y);

    let n_extreme = (0..reps)
        .into_par_iter()
        .filter(|&rep| {
            let mut rng = SimpleRng::new(seed.wrapping_add(rep as u64));
            let mut shuffled = pool.clone();
            rng.shuffle(&mut shuffled);
            let u_perm = mann_whitney_u(&shuffled[..nx], &shuffled[nx..]);
            (u_perm - mean_u).abs() >= observed_dev
        })
        .count();

    let p = (n_extreme as f64 + 1.0) / (reps as f64 + 1.0);
    (u, p)
}

/// Kruskal-Wallis H test across any number of groups, with tie correction.
pub fn kruskal_wallis(groups: &[Vec<f64>]) -> (f64, f64) {
    let k = groups.len();
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n_total < 3 || groups.iter().any(|g| g.is_empty()) {
        return (f64::NAN, f64::NAN);
    }

    let combined: Vec<f64> = groups.iter().flatten().copied().collect();
    let ranks = average_ranks(&combined);

    let n = n_total as f64;
    let mut h = 0.0;
    let mut offset = 0;
    for g in groups {
        let rank_sum: f64 = ranks[offset..offset + g.len()].iter().sum();
        h += rank_sum * rank_sum / g.len() as f64;
        offset += g.len();
    }
    h = 12.0 / (n * (n + 1.0)) * h - 3.0 * (n + 1.0);

    // tie correction
    let mut sorted = combined.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }
    let correction = 1.0 - tie_term / (n * n * n - n);
    let h = h / correction;
    if h.is_nan() || h.is_infinite() {
        return (f64::NAN, f64::NAN);
    }

    let chi2 = ChiSquared::new((k - 1) as f64).unwrap();
    (h, 1.0 - chi2.cdf(h))
}
