//! G-test of goodness of fit over group totals.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// G-test of goodness of fit across groups.
///
/// Observed values are the per-group totals; expected values distribute the
/// grand total in proportion to group size. Williams' correction is applied
/// before evaluating against the chi-squared distribution with k - 1
/// degrees of freedom.
pub fn g_fit(groups: &[Vec<f64>]) -> (f64, f64) {
    let k = groups.len();
    let n_samples: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return (f64::NAN, f64::NAN);
    }

    let observed: Vec<f64> = groups.iter().map(|g| g.iter().sum()).collect();
    let total: f64 = observed.iter().sum();
    if total <= 0.0 {
        return (f64::NAN, f64::NAN);
    }

    let mut g = 0.0;
    for (group, &obs) in groups.iter().zip(observed.iter()) {
        let expected = total * group.len() as f64 / n_samples as f64;
        if obs > 0.0 {
            g += obs * (obs / expected).ln();
        }
    }
    g *= 2.0;

    // Williams' correction
    let q = 1.0 + (k as f64 + 1.0) / (6.0 * total);
    let g = g / q;
    if g.is_nan() {
        return (f64::NAN, f64::NAN);
    }

    let chi2 = ChiSquared::new((k - 1) as f64).unwrap();
    (g, 1.0 - chi2.cdf(g.max(0.0)))
}
