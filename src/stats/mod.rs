//! Statistical test functions.
//!
//! These are the black-box tests the runners dispatch into. Group tests
//! return `(statistic, p_value)` pairs; the correlation layer exposes bare
//! coefficients plus separate significance helpers so runners can mix and
//! match p-value strategies.

mod correlation;
mod discrete;
mod nonparametric;
mod parametric;
mod rng;

pub use correlation::{
    fisher_combined_probability, fisher_confidence_intervals, fisher_population_correlation,
    kendall, nonparametric_correlation_significance, parametric_correlation_significance,
    pearson, spearman,
};
pub use discrete::g_fit;
pub use nonparametric::{kruskal_wallis, mw_boot, mw_test};
pub use parametric::{anova_one_way, mc_t_two_sample, t_paired, t_two_sample, MonteCarloTTest};
pub use rng::SimpleRng;
