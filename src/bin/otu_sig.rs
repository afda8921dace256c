//! otu-sig - Group significance and gradient correlation testing
//!
//! Command-line interface for per-feature significance testing of
//! abundance tables against sample metadata.

use clap::{Parser, Subcommand};
use otu_significance::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Group significance and gradient correlation testing
#[derive(Parser)]
#[command(name = "otu-sig")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test abundance differences between metadata-defined sample groups
    Group {
        /// Path to abundance table TSV
        #[arg(short = 'c', long)]
        counts: PathBuf,

        /// Path to sample metadata TSV
        #[arg(short, long)]
        metadata: PathBuf,

        /// Metadata field defining the groups
        #[arg(short, long)]
        field: String,

        /// Test to run: ANOVA, g_test, kruskal_wallis, parametric_t_test,
        /// nonparametric_t_test, mann_whitney_u, bootstrap_mann_whitney_u
        #[arg(short, long)]
        test: String,

        /// Permutations for resampling-based tests
        #[arg(long, default_value_t = DEFAULT_REPS)]
        reps: usize,

        /// Random seed for resampling-based tests
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Sort output rows ascending by this 0-based column
        #[arg(long)]
        sort_col: Option<usize>,

        /// Also dump raw results as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Output path for the results TSV
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Correlate each feature against a numeric metadata gradient
    Gradient {
        /// Path to abundance table TSV
        #[arg(short = 'c', long)]
        counts: PathBuf,

        /// Path to sample metadata TSV
        #[arg(short, long)]
        metadata: PathBuf,

        /// Metadata field holding the numeric gradient
        #[arg(short, long)]
        field: String,

        /// Test to run: pearson, spearman, kendall
        #[arg(short, long)]
        test: String,

        /// Permutations for the nonparametric p-value
        #[arg(long, default_value_t = DEFAULT_REPS)]
        reps: usize,

        /// Random seed for the nonparametric p-value
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Sort output rows ascending by this 0-based column
        #[arg(long)]
        sort_col: Option<usize>,

        /// Also dump raw results as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Output path for the results TSV
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Correlate per individual against a gradient, pooled across individuals
    Longitudinal {
        /// Path to abundance table TSV
        #[arg(short = 'c', long)]
        counts: PathBuf,

        /// Path to sample metadata TSV
        #[arg(short, long)]
        metadata: PathBuf,

        /// Metadata field holding the numeric gradient
        #[arg(short, long)]
        field: String,

        /// Metadata field identifying the individual each sample belongs to
        #[arg(short, long)]
        individual_field: String,

        /// Test to run: pearson, spearman, kendall
        #[arg(short, long)]
        test: String,

        /// Sort output rows ascending by this 0-based column
        #[arg(long)]
        sort_col: Option<usize>,

        /// Also dump raw results as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Output path for the results TSV
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Paired before/after t-tests on aligned sample lists
    Paired {
        /// Path to abundance table TSV
        #[arg(short = 'c', long)]
        counts: PathBuf,

        /// Comma-separated sample ids for the "before" state
        #[arg(short, long, value_delimiter = ',')]
        before: Vec<String>,

        /// Comma-separated sample ids for the "after" state, aligned with --before
        #[arg(short, long, value_delimiter = ',')]
        after: Vec<String>,

        /// Sort output rows ascending by this 0-based column
        #[arg(long)]
        sort_col: Option<usize>,

        /// Also dump raw results as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Output path for the results TSV
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn write_table(path: &PathBuf, lines: &[String]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

fn maybe_sort(lines: Vec<String>, sort_col: Option<usize>) -> Vec<String> {
    match sort_col {
        Some(col) => sort_by_column(lines, col),
        None => lines,
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Group {
            counts,
            metadata,
            field,
            test,
            reps,
            seed,
            sort_col,
            json,
            output,
        } => {
            let test: GroupTest = test.parse()?;
            let matrix = AbundanceMatrix::from_tsv(counts)?;
            let metadata = SampleMetadata::from_tsv(metadata)?;

            let categories = sample_categories(&metadata, &field)?;
            let partition = group_partition(&categories);
            let columns = column_partition(&partition, &matrix)?;

            let slices = GroupSlices::new(&matrix, &columns);
            let results = run_group_significance(slices, test, reps, seed);
            let fdr = fdr_correction(&results.p_values);
            let bon = bonferroni_correction(&results.p_values);

            let labels: Vec<String> = columns.iter().map(|(label, _)| label.clone()).collect();
            let lines = group_significance_lines(
                matrix.feature_ids(),
                matrix.taxonomy(),
                &labels,
                &results,
                &fdr,
                &bon,
            );
            write_table(&output, &maybe_sort(lines, sort_col))?;
            if let Some(json_path) = json {
                write_json(&json_path, &results)?;
            }
        }

        Commands::Gradient {
            counts,
            metadata,
            field,
            test,
            reps,
            seed,
            sort_col,
            json,
            output,
        } => {
            let test: CorrelationTest = test.parse()?;
            let matrix = AbundanceMatrix::from_tsv(counts)?;
            let metadata = SampleMetadata::from_tsv(metadata)?;

            let slices = CorrelationSlices::new(&matrix, &metadata, &field)?;
            let results = run_correlation(slices, test, reps, seed);
            let parametric_fdr = fdr_correction(&results.parametric_ps);
            let parametric_bon = bonferroni_correction(&results.parametric_ps);
            let nonparametric_fdr = fdr_correction(&results.nonparametric_ps);
            let nonparametric_bon = bonferroni_correction(&results.nonparametric_ps);

            let lines = correlation_lines(
                matrix.feature_ids(),
                matrix.taxonomy(),
                &results,
                &parametric_fdr,
                &parametric_bon,
                &nonparametric_fdr,
                &nonparametric_bon,
            );
            write_table(&output, &maybe_sort(lines, sort_col))?;
            if let Some(json_path) = json {
                write_json(&json_path, &results)?;
            }
        }

        Commands::Longitudinal {
            counts,
            metadata,
            field,
            individual_field,
            test,
            sort_col,
            json,
            output,
        } => {
            let test: CorrelationTest = test.parse()?;
            let matrix = AbundanceMatrix::from_tsv(counts)?;
            let metadata = SampleMetadata::from_tsv(metadata)?;

            let categories = sample_categories(&metadata, &individual_field)?;
            let individuals = group_partition(&categories);
            let individual_cols = column_partition(&individuals, &matrix)?;

            let slices =
                LongitudinalSlices::new(&matrix, &metadata, &field, &individuals, &individual_cols)?;
            let results = run_longitudinal_correlation(slices, test);
            let fdr = fdr_correction(&results.combined_ps);
            let bon = bonferroni_correction(&results.combined_ps);

            let order: Vec<String> = individuals.iter().map(|(id, _)| id.clone()).collect();
            let lines = longitudinal_lines(
                matrix.feature_ids(),
                matrix.taxonomy(),
                &results,
                &fdr,
                &bon,
                &order,
            );
            write_table(&output, &maybe_sort(lines, sort_col))?;
            if let Some(json_path) = json {
                write_json(&json_path, &results)?;
            }
        }

        Commands::Paired {
            counts,
            before,
            after,
            sort_col,
            json,
            output,
        } => {
            let matrix = AbundanceMatrix::from_tsv(counts)?;

            let slices = PairedSlices::new(&matrix, &before, &after)?;
            let results = run_paired(slices);
            let fdr = fdr_correction(&results.p_values);
            let bon = bonferroni_correction(&results.p_values);

            let lines = paired_lines(
                matrix.feature_ids(),
                matrix.taxonomy(),
                &results,
                &fdr,
                &bon,
            );
            write_table(&output, &maybe_sort(lines, sort_col))?;
            if let Some(json_path) = json {
                write_json(&json_path, &results)?;
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
