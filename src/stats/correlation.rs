//! Correlation coefficients and the significance machinery built on them:
//! parametric (t-distribution) and nonparametric (permutation) p-values,
//! Fisher z confidence intervals, Fisher's combined probability, and the
//! pooled population correlation with its homogeneity test.

use crate::stats::nonparametric::average_ranks;
use crate::stats::parametric::two_sided_t_pvalue;
use crate::stats::rng::SimpleRng;
use rayon::prelude::*;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Pearson product-moment correlation coefficient.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return f64::NAN;
    }
    let nf = n as f64;
    let mx = x.iter().sum::<f64>() / nf;
    let my = y.iter().sum::<f64>() / nf;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        cov += (a - mx) * (b - my);
        var_x += (a - mx) * (a - mx);
        var_y += (b - my) * (b - my);
    }
    cov / (var_x * var_y).sqrt()
}

/// Spearman rank correlation (Pearson on tie-averaged ranks).
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 || x.len() != y.len() {
        return f64::NAN;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Kendall's tau-b with its normal-approximation two-sided p-value.
pub fn kendall(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len();
    if n < 2 || n != y.len() {
        return (f64::NAN, f64::NAN);
    }

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            // pairs tied in either variable count as neither
            if dx * dy > 0.0 {
                concordant += 1;
            } else if dx * dy < 0.0 {
                discordant += 1;
            }
        }
    }

    let n0 = (n * (n - 1) / 2) as f64;
    let s = (concordant - discordant) as f64;
    let denom = ((n0 - pair_ties(x)) * (n0 - pair_ties(y))).sqrt();
    let tau = s / denom;

    let nf = n as f64;
    let z = 3.0 * s / (nf * (nf - 1.0) * (2.0 * nf + 5.0) / 2.0).sqrt();
    let p = if z.is_nan() {
        f64::NAN
    } else {
        let normal = Normal::new(0.0, 1.0).unwrap();
        (2.0 * (1.0 - normal.cdf(z.abs()))).min(1.0)
    };
    (tau, p)
}

/// Number of tied pairs within one variable.
fn pair_ties(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut ties = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        ties += t * (t - 1.0) / 2.0;
        i = j;
    }
    ties
}

/// Two-sided p-value of a correlation coefficient under the t-distribution
/// with n - 2 degrees of freedom.
pub fn parametric_correlation_significance(r: f64, n: usize) -> f64 {
    if r.is_nan() || n < 3 {
        return f64::NAN;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    two_sided_t_pvalue(t, df)
}

/// Permutation p-value of a correlation coefficient.
///
/// The gradient vector is reshuffled `reps` times and the coefficient
/// recomputed; the p-value is the (+1-corrected) fraction of permutations
/// whose |coefficient| reaches the observed one.
pub fn nonparametric_correlation_significance<F>(
    observed: f64,
    coefficient: F,
    x: &[f64],
    y: &[f64],
    reps: usize,
    seed: u64,
) -> f64
where
    F: Fn(&[f64], &[f64]) -> f64 + Sync,
{
    if observed.is_nan() || reps == 0 {
        return f64::NAN;
    }
    let n_extreme = (0..reps)
        .into_par_iter()
        .filter(|&rep| {
            let mut rng = SimpleRng::new(seed.wrapping_add(rep as u64));
            let mut shuffled = y.to_vec();
            rng.shuffle(&mut shuffled);
            coefficient(x, &shuffled).abs() >= observed.abs()
        })
        .count();
    (n_extreme as f64 + 1.0) / (reps as f64 + 1.0)
}

/// Confidence interval for a correlation coefficient via the Fisher
/// z-transform, returned as (low, high).
pub fn fisher_confidence_intervals(r: f64, n: usize, alpha: f64) -> (f64, f64) {
    if r.is_nan() || n <= 3 {
        return (f64::NAN, f64::NAN);
    }
    let z = r.atanh();
    let se = 1.0 / ((n - 3) as f64).sqrt();
    let normal = Normal::new(0.0, 1.0).unwrap();
    let z_crit = normal.inverse_cdf(1.0 - alpha / 2.0);
    ((z - z_crit * se).tanh(), (z + z_crit * se).tanh())
}

/// Fisher's combined probability over independent p-values.
///
/// -2 Σ ln(p) follows a chi-squared distribution with 2k degrees of
/// freedom under the joint null.
pub fn fisher_combined_probability(p_values: &[f64]) -> f64 {
    let k = p_values.len();
    if k == 0 || p_values.iter().any(|p| p.is_nan()) {
        return f64::NAN;
    }
    let statistic: f64 = -2.0 * p_values.iter().map(|p| p.ln()).sum::<f64>();
    if statistic.is_infinite() {
        return 0.0;
    }
    let chi2 = ChiSquared::new((2 * k) as f64).unwrap();
    1.0 - chi2.cdf(statistic.max(0.0))
}

/// Pool per-individual correlation coefficients into one population
/// estimate, with a homogeneity p-value.
///
/// Coefficients are combined on the Fisher z scale with weights n - 3; the
/// homogeneity statistic is the weighted squared deviation from the pooled
/// z, chi-squared with k - 1 degrees of freedom. A high p-value means the
/// per-individual coefficients are statistically consistent. With a single
/// individual the pooled estimate is that coefficient and the homogeneity
/// p-value is 1. Any individual with fewer than four samples leaves both
/// outputs NaN.
pub fn fisher_population_correlation(rs: &[f64], ns: &[usize]) -> (f64, f64) {
    let k = rs.len();
    if k == 0 || k != ns.len() || rs.iter().any(|r| r.is_nan()) {
        return (f64::NAN, f64::NAN);
    }
    if k == 1 {
        return (rs[0], 1.0);
    }
    if ns.iter().any(|&n| n <= 3) {
        return (f64::NAN, f64::NAN);
    }

    let zs: Vec<f64> = rs.iter().map(|r| r.atanh()).collect();
    let weights: Vec<f64> = ns.iter().map(|&n| (n - 3) as f64).collect();
    let weight_total: f64 = weights.iter().sum();
    let pooled_z: f64 =
        zs.iter().zip(weights.iter()).map(|(z, w)| z * w).sum::<f64>() / weight_total;

    let statistic: f64 = zs
        .iter()
        .zip(weights.iter())
        .map(|(z, w)| w * (z - pooled_z) * (z - pooled_z))
        .sum();
    if !statistic.is_finite() {
        return (f64::NAN, f64::NAN);
    }
    let chi2 = ChiSquared::new((k - 1) as f64).unwrap();
    (pooled_z.tanh(), 1.0 - chi2.cdf(statistic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pearson_perfect() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert_relative_eq!(pearson(&x, &y), 1.0, epsilon = 1e-12);
        let y_neg = [8.0, 6.0, 4.0, 2.0];
        assert_relative_eq!(pearson(&x, &y_neg), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_spearman_monotonic_nonlinear() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert_relative_eq!(spearman(&x, &y), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kendall_known() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 2.0, 4.0];
        let (tau, p) = kendall(&x, &y);
        // 5 concordant, 1 discordant out of 6 pairs
        assert_relative_eq!(tau, 4.0 / 6.0, epsilon = 1e-12);
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn test_parametric_correlation_significance() {
        let p_strong = parametric_correlation_significance(0.9, 10);
        assert!(p_strong < 0.001);
        let p_weak = parametric_correlation_significance(0.1, 10);
        assert!(p_weak > 0.5);
        assert!(parametric_correlation_significance(f64::NAN, 10).is_nan());
        assert!(parametric_correlation_significance(0.5, 2).is_nan());
    }

    #[test]
    fn test_nonparametric_correlation_significance() {
        let x: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let r = pearson(&x, &y);
        let p = nonparametric_correlation_significance(r, pearson, &x, &y, 200, 42);
        assert!(p < 0.05);
        // same seed, same answer
        let p2 = nonparametric_correlation_significance(r, pearson, &x, &y, 200, 42);
        assert_eq!(p, p2);
    }

    #[test]
    fn test_fisher_confidence_intervals() {
        let (low, high) = fisher_confidence_intervals(0.5, 30, 0.05);
        assert!(low < 0.5 && 0.5 < high);
        assert_relative_eq!(low, 0.170, epsilon = 1e-2);
        assert_relative_eq!(high, 0.729, epsilon = 1e-2);
        let (low, high) = fisher_confidence_intervals(0.5, 3, 0.05);
        assert!(low.is_nan() && high.is_nan());
    }

    #[test]
    fn test_fisher_combined_single_p_unchanged() {
        // with k = 1 the chi-squared(2) survival of -2 ln p is p itself
        assert_relative_eq!(fisher_combined_probability(&[0.5]), 0.5, epsilon = 1e-10);
        assert_relative_eq!(fisher_combined_probability(&[0.05]), 0.05, epsilon = 1e-10);
    }

    #[test]
    fn test_fisher_combined_reinforcing_evidence() {
        let combined = fisher_combined_probability(&[0.05, 0.05, 0.05]);
        assert!(combined < 0.05);
        assert!(fisher_combined_probability(&[]).is_nan());
        assert_eq!(fisher_combined_probability(&[0.0, 0.5]), 0.0);
    }

    #[test]
    fn test_fisher_population_single_individual() {
        let (rho, h) = fisher_population_correlation(&[0.42], &[5]);
        assert_relative_eq!(rho, 0.42, epsilon = 1e-12);
        assert_relative_eq!(h, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fisher_population_identical_coefficients() {
        let (rho, h) = fisher_population_correlation(&[0.5, 0.5, 0.5], &[10, 20, 30]);
        assert_relative_eq!(rho, 0.5, epsilon = 1e-10);
        assert_relative_eq!(h, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_fisher_population_disagreement_lowers_homogeneity() {
        let (_, h) = fisher_population_correlation(&[0.9, -0.9], &[30, 30]);
        assert!(h < 0.01);
    }

    #[test]
    fn test_fisher_population_small_subject_is_nan() {
        let (rho, h) = fisher_population_correlation(&[0.5, 0.6], &[3, 10]);
        assert!(rho.is_nan());
        assert!(h.is_nan());
    }
}
