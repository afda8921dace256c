//! Group Significance and Gradient Correlation Testing
//!
//! This library computes per-feature statistical significance across a
//! feature-by-sample abundance table (OTU tables and similar), against two
//! kinds of sample metadata: categorical groupings and continuous
//! gradients.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (AbundanceMatrix, SampleMetadata)
//! - **group**: Partitioning of samples by metadata field value
//! - **slice**: Per-feature row slices in the shape each test family expects
//! - **stats**: The statistical tests themselves
//! - **runner**: Test orchestration over slice sequences
//! - **correct**: Multiple testing correction (Benjamini-Hochberg, Bonferroni)
//! - **format**: Tab-delimited output tables and rank sorting
//!
//! # Example
//!
//! ```no_run
//! use otu_significance::prelude::*;
//!
//! let matrix = AbundanceMatrix::from_tsv("otu_table.tsv").unwrap();
//! let metadata = SampleMetadata::from_tsv("mapping.tsv").unwrap();
//!
//! let categories = sample_categories(&metadata, "treatment").unwrap();
//! let partition = group_partition(&categories);
//! let columns = column_partition(&partition, &matrix).unwrap();
//!
//! let slices = GroupSlices::new(&matrix, &columns);
//! let results = run_group_significance(slices, GroupTest::Anova, DEFAULT_REPS, 42);
//!
//! let fdr = fdr_correction(&results.p_values);
//! let bon = bonferroni_correction(&results.p_values);
//! let labels: Vec<String> = columns.iter().map(|(l, _)| l.clone()).collect();
//! let lines = group_significance_lines(
//!     matrix.feature_ids(),
//!     matrix.taxonomy(),
//!     &labels,
//!     &results,
//!     &fdr,
//!     &bon,
//! );
//! let ranked = sort_by_column(lines, 2);
//! ```

pub mod correct;
pub mod data;
pub mod error;
pub mod format;
pub mod group;
pub mod runner;
pub mod slice;
pub mod stats;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::correct::{bonferroni_correction, fdr_correction};
    pub use crate::data::{AbundanceMatrix, SampleMetadata};
    pub use crate::error::{Result, SigError};
    pub use crate::format::{
        correlation_lines, group_significance_lines, longitudinal_lines, paired_lines,
        sort_by_column,
    };
    pub use crate::group::{
        column_partition, group_partition, sample_categories, ColumnPartition, GroupPartition,
    };
    pub use crate::runner::{
        run_correlation, run_group_significance, run_longitudinal_correlation, run_paired,
        CorrelationResults, CorrelationTest, GroupResults, GroupTest, LongitudinalResults,
        PairedResults, DEFAULT_REPS,
    };
    pub use crate::slice::{CorrelationSlices, GroupSlices, LongitudinalSlices, PairedSlices};
}
