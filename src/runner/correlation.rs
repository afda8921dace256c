//! Gradient correlation runner.

use crate::runner::CorrelationTest;
use crate::stats::{
    fisher_confidence_intervals, kendall, nonparametric_correlation_significance,
    parametric_correlation_significance,
};
use serde::Serialize;

/// Per-feature results of a gradient correlation run.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationResults {
    pub coefficients: Vec<f64>,
    pub parametric_ps: Vec<f64>,
    pub nonparametric_ps: Vec<f64>,
    pub ci_lows: Vec<f64>,
    pub ci_highs: Vec<f64>,
}

/// Correlate every feature row against the gradient vector.
///
/// Kendall computes its own p-value; Pearson and Spearman use the generic
/// t-distribution formula on the coefficient. The permutation p-value and
/// the Fisher z confidence interval are computed for every row regardless
/// of which parametric path was taken.
pub fn run_correlation(
    slices: impl Iterator<Item = (Vec<f64>, Vec<f64>)>,
    test: CorrelationTest,
    reps: usize,
    seed: u64,
) -> CorrelationResults {
    let mut coefficients = Vec::new();
    let mut parametric_ps = Vec::new();
    let mut nonparametric_ps = Vec::new();
    let mut ci_lows = Vec::new();
    let mut ci_highs = Vec::new();

    for (row, gradient) in slices {
        let n = row.len();
        let (coefficient, parametric_p) = match test {
            CorrelationTest::Kendall => kendall(&row, &gradient),
            _ => {
                let r = test.coefficient(&row, &gradient);
                (r, parametric_correlation_significance(r, n))
            }
        };
        let nonparametric_p = nonparametric_correlation_significance(
            coefficient,
            |x, y| test.coefficient(x, y),
            &row,
            &gradient,
            reps,
            seed,
        );
        let (ci_low, ci_high) = fisher_confidence_intervals(coefficient, n, 0.05);

        coefficients.push(coefficient);
        parametric_ps.push(parametric_p);
        nonparametric_ps.push(nonparametric_p);
        ci_lows.push(ci_low);
        ci_highs.push(ci_high);
    }

    CorrelationResults {
        coefficients,
        parametric_ps,
        nonparametric_ps,
        ci_lows,
        ci_highs,
    }
}
