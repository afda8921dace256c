//! Group-significance runner.

use crate::runner::GroupTest;
use crate::stats::{
    anova_one_way, g_fit, kruskal_wallis, mc_t_two_sample, mw_boot, mw_test, t_two_sample,
};
use serde::Serialize;

/// Per-feature results of a group-significance run, index-aligned with the
/// matrix rows.
#[derive(Debug, Clone, Serialize)]
pub struct GroupResults {
    pub statistics: Vec<f64>,
    pub p_values: Vec<f64>,
    /// Per-feature group means, in partition group order.
    pub means: Vec<Vec<f64>>,
}

/// Run a group-significance test over every feature row.
///
/// Two-group tests receive exactly the first two group arrays; resampling
/// variants additionally take `reps` permutations seeded from `seed`.
/// Multi-group tests receive the full group list. Rows with too few groups
/// or degenerate data surface as NaN, never as errors.
pub fn run_group_significance(
    slices: impl Iterator<Item = Vec<Vec<f64>>>,
    test: GroupTest,
    reps: usize,
    seed: u64,
) -> GroupResults {
    let mut statistics = Vec::new();
    let mut p_values = Vec::new();
    let mut means = Vec::new();

    for groups in slices {
        let (statistic, p_value) = if test.is_two_group() && groups.len() < 2 {
            (f64::NAN, f64::NAN)
        } else {
            match test {
                GroupTest::ParametricTTest => t_two_sample(&groups[0], &groups[1]),
                GroupTest::NonparametricTTest => {
                    let mc = mc_t_two_sample(&groups[0], &groups[1], reps, seed);
                    // permuted statistics are a diagnostic only
                    (mc.statistic, mc.permuted_p)
                }
                GroupTest::MannWhitneyU => mw_test(&groups[0], &groups[1]),
                GroupTest::BootstrapMannWhitneyU => mw_boot(&groups[0], &groups[1], reps, seed),
                GroupTest::Anova => anova_one_way(&groups),
                GroupTest::GTest => g_fit(&groups),
                GroupTest::KruskalWallis => kruskal_wallis(&groups),
            }
        };
        statistics.push(statistic);
        p_values.push(p_value);
        means.push(
            groups
                .iter()
                .map(|g| g.iter().sum::<f64>() / g.len() as f64)
                .collect(),
        );
    }

    GroupResults {
        statistics,
        p_values,
        means,
    }
}
