//! Test runners: consume a slice sequence, dispatch into the selected test
//! per feature row, and accumulate parallel result vectors in matrix row
//! order.
//!
//! Test selection is a tagged enum rather than a string-keyed function
//! table; the heterogeneous arities of the underlying tests (two arrays,
//! two arrays plus a repetition count, a list of arrays) are adapted inside
//! the runners.

mod correlation;
mod group;
mod longitudinal;
mod paired;

pub use correlation::{run_correlation, CorrelationResults};
pub use group::{run_group_significance, GroupResults};
pub use longitudinal::{run_longitudinal_correlation, LongitudinalResults};
pub use paired::{run_paired, PairedResults};

use crate::error::SigError;
use std::str::FromStr;

/// Default repetition count for resampling-based tests.
pub const DEFAULT_REPS: usize = 1000;

/// Group-significance tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupTest {
    /// One-way analysis of variance.
    Anova,
    /// G-test of goodness of fit over group totals.
    GTest,
    /// Kruskal-Wallis rank test.
    KruskalWallis,
    /// Student's two-sample t-test.
    ParametricTTest,
    /// Two-sample t-test with a permutation p-value.
    NonparametricTTest,
    /// Mann-Whitney U (normal approximation).
    MannWhitneyU,
    /// Mann-Whitney U with a bootstrapped p-value.
    BootstrapMannWhitneyU,
}

impl GroupTest {
    /// Tests that compare exactly two groups.
    pub fn is_two_group(&self) -> bool {
        matches!(
            self,
            GroupTest::ParametricTTest
                | GroupTest::NonparametricTTest
                | GroupTest::MannWhitneyU
                | GroupTest::BootstrapMannWhitneyU
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupTest::Anova => "ANOVA",
            GroupTest::GTest => "g_test",
            GroupTest::KruskalWallis => "kruskal_wallis",
            GroupTest::ParametricTTest => "parametric_t_test",
            GroupTest::NonparametricTTest => "nonparametric_t_test",
            GroupTest::MannWhitneyU => "mann_whitney_u",
            GroupTest::BootstrapMannWhitneyU => "bootstrap_mann_whitney_u",
        }
    }
}

impl FromStr for GroupTest {
    type Err = SigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANOVA" => Ok(GroupTest::Anova),
            "g_test" => Ok(GroupTest::GTest),
            "kruskal_wallis" => Ok(GroupTest::KruskalWallis),
            "parametric_t_test" => Ok(GroupTest::ParametricTTest),
            "nonparametric_t_test" => Ok(GroupTest::NonparametricTTest),
            "mann_whitney_u" => Ok(GroupTest::MannWhitneyU),
            "bootstrap_mann_whitney_u" => Ok(GroupTest::BootstrapMannWhitneyU),
            _ => Err(SigError::UnknownTest(s.to_string())),
        }
    }
}

/// Correlation tests for gradient analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationTest {
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationTest {
    /// Bare coefficient for (row, gradient).
    pub fn coefficient(&self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            CorrelationTest::Pearson => crate::stats::pearson(x, y),
            CorrelationTest::Spearman => crate::stats::spearman(x, y),
            CorrelationTest::Kendall => crate::stats::kendall(x, y).0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CorrelationTest::Pearson => "pearson",
            CorrelationTest::Spearman => "spearman",
            CorrelationTest::Kendall => "kendall",
        }
    }
}

impl FromStr for CorrelationTest {
    type Err = SigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pearson" => Ok(CorrelationTest::Pearson),
            "spearman" => Ok(CorrelationTest::Spearman),
            "kendall" => Ok(CorrelationTest::Kendall),
            _ => Err(SigError::UnknownTest(s.to_string())),
        }
    }
}
