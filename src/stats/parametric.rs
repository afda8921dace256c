//! Parametric group tests: two-sample t, paired t, one-way ANOVA, and the
//! Monte Carlo (permutation) variant of the two-sample t-test.
//!
//! Degenerate inputs (fewer than two observations, zero variance) yield NaN
//! statistics and p-values rather than errors; callers record them per row.

use crate::stats::rng::SimpleRng;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64], m: f64) -> f64 {
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// Two-sided p-value of a t statistic.
pub(crate) fn two_sided_t_pvalue(t: f64, df: f64) -> f64 {
    if t.is_nan() || df <= 0.0 || !df.is_finite() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    let t_dist = StudentsT::new(0.0, 1.0, df).unwrap();
    2.0 * (1.0 - t_dist.cdf(t.abs()))
}

fn pooled_t_statistic(x: &[f64], y: &[f64]) -> f64 {
    let nx = x.len() as f64;
    let ny = y.len() as f64;
    let mx = mean(x);
    let my = mean(y);
    let pooled_var =
        ((nx - 1.0) * sample_variance(x, mx) + (ny - 1.0) * sample_variance(y, my))
            / (nx + ny - 2.0);
    let std_err = (pooled_var * (1.0 / nx + 1.0 / ny)).sqrt();
    (mx - my) / std_err
}

/// Student's two-sample t-test (pooled variance, two-sided).
pub fn t_two_sample(x: &[f64], y: &[f64]) -> (f64, f64) {
    if x.len() < 2 || y.len() < 2 {
        return (f64::NAN, f64::NAN);
    }
    let t = pooled_t_statistic(x, y);
    let df = (x.len() + y.len()) as f64 - 2.0;
    (t, two_sided_t_pvalue(t, df))
}

/// Paired t-test on positionally aligned samples.
///
/// The statistic is the one-sample t of the per-pair differences
/// (after - before).
pub fn t_paired(before: &[f64], after: &[f64]) -> (f64, f64) {
    let n = before.len();
    if n < 2 || n != after.len() {
        return (f64::NAN, f64::NAN);
    }
    let diffs: Vec<f64> = after.iter().zip(before.iter()).map(|(a, b)| a - b).collect();
    let m = mean(&diffs);
    let sd = sample_variance(&diffs, m).sqrt();
    let t = m / (sd / (n as f64).sqrt());
    (t, two_sided_t_pvalue(t, n as f64 - 1.0))
}

/// One-way analysis of variance across any number of groups.
pub fn anova_one_way(groups: &[Vec<f64>]) -> (f64, f64) {
    let k = groups.len();
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n_total <= k || groups.iter().any(|g| g.is_empty()) {
        return (f64::NAN, f64::NAN);
    }

    let grand_mean =
        groups.iter().flatten().sum::<f64>() / n_total as f64;
    let ss_between: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.len() as f64 * (m - grand_mean) * (m - grand_mean)
        })
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m) * (v - m)).sum::<f64>()
        })
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    let f = (ss_between / df_between) / (ss_within / df_within);
    if f.is_nan() {
        return (f64::NAN, f64::NAN);
    }
    if f.is_infinite() {
        return (f, 0.0);
    }
    let f_dist = FisherSnedecor::new(df_between, df_within).unwrap();
    (f, 1.0 - f_dist.cdf(f))
}

/// Result of the Monte Carlo two-sample t-test.
///
/// Carries the permuted statistics as a diagnostic; the group runner keeps
/// only the observed statistic and the permutation p-value.
pub struct MonteCarloTTest {
    pub statistic: f64,
    pub parametric_p: f64,
    pub permuted_stats: Vec<f64>,
    pub permuted_p: f64,
}

/// Two-sample t-test with a permutation-derived p-value.
///
/// Group labels are reshuffled `reps` times; the p-value is the
/// (+1-corrected) fraction of permutations whose |t| reaches the observed
/// |t|. Each permutation derives its own seed from `seed` and the
/// permutation index, so the parallel fan-out is reproducible.
pub fn mc_t_two_sample(x: &[f64], y: &[f64], reps: usize, seed: u64) -> MonteCarloTTest {
    let (statistic, parametric_p) = t_two_sample(x, y);
    if statistic.is_nan() || reps == 0 {
        return MonteCarloTTest {
            statistic,
            parametric_p,
            permuted_stats: Vec::new(),
            permuted_p: f64::NAN,
        };
    }

    let mut pool: Vec<f64> = Vec::with_capacity(x.len() + y.len());
    pool.extend_from_slice(x);
    pool.extend_from_slice(y);
    let nx = x.len();

    let permuted_stats: Vec<f64> = (0..reps)
        .into_par_iter()
        .map(|rep| {
            let mut rng = SimpleRng::new(seed.wrapping_add(rep as u64));
            let mut shuffled = pool.clone();
            rng.shuffle(&mut shuffled);
            pooled_t_statistic(&shuffled[..nx], &shuffled[nx..])
        })
        .collect();

    let n_extreme = permuted_stats
        .iter()
        .filter(|t| t.abs() >= statistic.abs())
        .count();
    let permuted_p = (n_extreme as f64 + 1.0) / (reps as f64 + 1.0);

    MonteCarloTTest {
        statistic,
        parametric_p,
        permuted_stats,
        permuted_p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_t_two_sample_known() {
        // Equal-variance textbook case
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 4.0, 5.0, 6.0, 7.0];
        let (t, p) = t_two_sample(&x, &y);
        assert_relative_eq!(t, -2.0, epsilon = 1e-12);
        // df = 8, two-sided
        assert_relative_eq!(p, 0.08051623795726, epsilon = 1e-8);
    }

    #[test]
    fn test_t_two_sample_identical_groups() {
        let x = [1.0, 2.0, 3.0];
        let (t, p) = t_two_sample(&x, &x);
        assert_relative_eq!(t, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_t_two_sample_insufficient() {
        let (t, p) = t_two_sample(&[1.0], &[2.0, 3.0]);
        assert!(t.is_nan());
        assert!(p.is_nan());
    }

    #[test]
    fn test_t_paired_known() {
        let before = [10.0, 12.0, 9.0, 11.0];
        let after = [12.0, 14.0, 11.0, 13.0];
        // constant +2 shift, zero-variance differences
        let (t, _p) = t_paired(&before, &after);
        assert!(t.is_infinite());

        let after2 = [12.0, 15.0, 10.0, 13.0];
        let (t2, p2) = t_paired(&before, &after2);
        assert!(t2 > 0.0);
        assert!(p2 > 0.0 && p2 < 0.1);
    }

    #[test]
    fn test_anova_matches_t_test_for_two_groups() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![3.0, 5.0, 4.0, 6.0];
        let (f, p_f) = anova_one_way(&[a.clone(), b.clone()]);
        let (t, p_t) = t_two_sample(&a, &b);
        // F = t^2 and the p-values agree for two groups
        assert_relative_eq!(f, t * t, epsilon = 1e-10);
        assert_relative_eq!(p_f, p_t, epsilon = 1e-10);
    }

    #[test]
    fn test_anova_degenerate() {
        let (f, p) = anova_one_way(&[vec![1.0, 2.0]]);
        assert!(f.is_nan());
        assert!(p.is_nan());
    }

    #[test]
    fn test_mc_t_two_sample_reproducible() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [6.0, 7.0, 8.0, 9.0, 10.0];
        let a = mc_t_two_sample(&x, &y, 200, 42);
        let b = mc_t_two_sample(&x, &y, 200, 42);
        assert_eq!(a.permuted_p, b.permuted_p);
        assert_eq!(a.statistic, b.statistic);
        assert_eq!(a.permuted_stats.len(), 200);
        // clearly separated groups should be extreme
        assert!(a.permuted_p < 0.05);
    }

    #[test]
    fn test_mc_t_two_sample_null_is_large() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.5, 2.5, 3.5, 2.0, 4.0];
        let result = mc_t_two_sample(&x, &y, 200, 7);
        assert!(result.permuted_p > 0.05);
    }
}
