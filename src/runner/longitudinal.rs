//! Longitudinal (repeated-measures) correlation runner.

use crate::runner::CorrelationTest;
use crate::stats::{
    fisher_combined_probability, fisher_population_correlation, kendall,
    parametric_correlation_significance,
};
use serde::Serialize;

/// Per-feature results of a longitudinal correlation run.
#[derive(Debug, Clone, Serialize)]
pub struct LongitudinalResults {
    /// Per-feature, per-individual coefficients in individual order.
    pub coefficients: Vec<Vec<f64>>,
    /// Fisher's combined probability over the individuals' p-values.
    pub combined_ps: Vec<f64>,
    /// Pooled population correlation estimate.
    pub combined_rhos: Vec<f64>,
    /// Homogeneity-of-correlations p-value; high means the individuals'
    /// coefficients are statistically consistent.
    pub homogeneity_ps: Vec<f64>,
}

/// Correlate each individual's samples independently against that
/// individual's gradient values, then pool across individuals.
///
/// Each individual contributes a coefficient and a parametric p-value
/// (Kendall computes its own, the rest use the generic t-distribution
/// formula). P-values combine via Fisher's method; coefficients pool on
/// the Fisher z scale with a homogeneity diagnostic.
pub fn run_longitudinal_correlation(
    slices: impl Iterator<Item = (Vec<Vec<f64>>, Vec<Vec<f64>>)>,
    test: CorrelationTest,
) -> LongitudinalResults {
    let mut coefficients = Vec::new();
    let mut combined_ps = Vec::new();
    let mut combined_rhos = Vec::new();
    let mut homogeneity_ps = Vec::new();

    for (per_individual, gradients) in slices {
        let mut rs = Vec::with_capacity(per_individual.len());
        let mut ps = Vec::with_capacity(per_individual.len());
        for (values, gradient) in per_individual.iter().zip(gradients.iter()) {
            let (r, p) = match test {
                CorrelationTest::Kendall => kendall(values, gradient),
                _ => {
                    let r = test.coefficient(values, gradient);
                    (r, parametric_correlation_significance(r, values.len()))
                }
            };
            rs.push(r);
            ps.push(p);
        }

        let sample_sizes: Vec<usize> = per_individual.iter().map(|v| v.len()).collect();
        let (rho, homogeneity) = fisher_population_correlation(&rs, &sample_sizes);
        combined_ps.push(fisher_combined_probability(&ps));
        combined_rhos.push(rho);
        homogeneity_ps.push(homogeneity);
        coefficients.push(rs);
    }

    LongitudinalResults {
        coefficients,
        combined_ps,
        combined_rhos,
        homogeneity_ps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_individual_pooling_identity() {
        let gradient: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let values: Vec<f64> = gradient.iter().map(|v| 0.5 * v + 1.0).collect();
        let slices = vec![(vec![values], vec![gradient])];

        let results = run_longitudinal_correlation(slices.into_iter(), CorrelationTest::Pearson);
        assert_eq!(results.coefficients[0].len(), 1);
        assert_relative_eq!(
            results.combined_rhos[0],
            results.coefficients[0][0],
            epsilon = 1e-12
        );
        assert_relative_eq!(results.homogeneity_ps[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_consistent_individuals() {
        let g1: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let g2: Vec<f64> = (0..12).map(|i| i as f64 * 2.0).collect();
        // strong but imperfect correlations in both individuals
        let v1: Vec<f64> = g1
            .iter()
            .enumerate()
            .map(|(i, v)| v + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let v2: Vec<f64> = g2
            .iter()
            .enumerate()
            .map(|(i, v)| 3.0 * v + if i % 3 == 0 { 1.0 } else { -1.0 })
            .collect();
        let slices = vec![(vec![v1, v2], vec![g1, g2])];

        let results = run_longitudinal_correlation(slices.into_iter(), CorrelationTest::Pearson);
        // both individuals correlate strongly, so the evidence reinforces
        assert!(results.combined_ps[0] < 1e-6);
        assert!(results.combined_rhos[0] > 0.95);
        assert!(results.homogeneity_ps[0] > 0.05);
        assert_eq!(results.coefficients[0].len(), 2);
    }

    #[test]
    fn test_output_lengths_match_features() {
        let g: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let slices: Vec<_> = (0..3)
            .map(|i| {
                let v: Vec<f64> = g.iter().map(|x| x * (i as f64 + 1.0)).collect();
                (vec![v.clone(), v], vec![g.clone(), g.clone()])
            })
            .collect();
        let results = run_longitudinal_correlation(slices.into_iter(), CorrelationTest::Spearman);
        assert_eq!(results.combined_ps.len(), 3);
        assert_eq!(results.combined_rhos.len(), 3);
        assert_eq!(results.homogeneity_ps.len(), 3);
        assert_eq!(results.coefficients.len(), 3);
    }
}
