//! Tab-delimited result tables and rank sorting.
//!
//! Each formatter is a pure function from index-aligned result vectors to
//! an ordered list of tab-joined lines, header first. The taxonomy column
//! is appended only when annotations are present, decided once per call so
//! every line has the same shape.

use crate::runner::{CorrelationResults, GroupResults, LongitudinalResults, PairedResults};

fn push_taxonomy(line: &mut Vec<String>, taxonomy: Option<&[String]>, row: usize) {
    if let Some(tax) = taxonomy {
        line.push(tax[row].clone());
    }
}

/// Format group-significance results.
///
/// Columns: OTU, Test-Statistic, P, FDR_P, Bonferroni_P, one `{group}_mean`
/// per group in partition order, then Taxonomy when annotations exist.
pub fn group_significance_lines(
    feature_ids: &[String],
    taxonomy: Option<&[String]>,
    group_labels: &[String],
    results: &GroupResults,
    fdr_ps: &[f64],
    bon_ps: &[f64],
) -> Vec<String> {
    let mut header = vec![
        "OTU".to_string(),
        "Test-Statistic".to_string(),
        "P".to_string(),
        "FDR_P".to_string(),
        "Bonferroni_P".to_string(),
    ];
    header.extend(group_labels.iter().map(|label| format!("{}_mean", label)));
    if taxonomy.is_some() {
        header.push("Taxonomy".to_string());
    }

    let mut lines = vec![header.join("\t")];
    for i in 0..results.p_values.len() {
        let mut line = vec![
            feature_ids[i].clone(),
            results.statistics[i].to_string(),
            results.p_values[i].to_string(),
            fdr_ps[i].to_string(),
            bon_ps[i].to_string(),
        ];
        line.extend(results.means[i].iter().map(|m| m.to_string()));
        push_taxonomy(&mut line, taxonomy, i);
        lines.push(line.join("\t"));
    }
    lines
}

/// Format gradient correlation results.
pub fn correlation_lines(
    feature_ids: &[String],
    taxonomy: Option<&[String]>,
    results: &CorrelationResults,
    parametric_fdr: &[f64],
    parametric_bon: &[f64],
    nonparametric_fdr: &[f64],
    nonparametric_bon: &[f64],
) -> Vec<String> {
    let mut header = vec![
        "OTU".to_string(),
        "Correlation_Coef".to_string(),
        "parametric_P".to_string(),
        "parametric_P_FDR".to_string(),
        "parametric_P_Bon".to_string(),
        "nonparametric_P".to_string(),
        "nonparametric_P_FDR".to_string(),
        "nonparametric_P_Bon".to_string(),
        "confidence_low".to_string(),
        "confidence_high".to_string(),
    ];
    if taxonomy.is_some() {
        header.push("Taxonomy".to_string());
    }

    let mut lines = vec![header.join("\t")];
    for i in 0..results.coefficients.len() {
        let mut line = vec![
            feature_ids[i].clone(),
            results.coefficients[i].to_string(),
            results.parametric_ps[i].to_string(),
            parametric_fdr[i].to_string(),
            parametric_bon[i].to_string(),
            results.nonparametric_ps[i].to_string(),
            nonparametric_fdr[i].to_string(),
            nonparametric_bon[i].to_string(),
            results.ci_lows[i].to_string(),
            results.ci_highs[i].to_string(),
        ];
        push_taxonomy(&mut line, taxonomy, i);
        lines.push(line.join("\t"));
    }
    lines
}

/// Format longitudinal correlation results.
///
/// `individual_order` is the subject order shared by every row's
/// `Corrcoefs` list.
pub fn longitudinal_lines(
    feature_ids: &[String],
    taxonomy: Option<&[String]>,
    results: &LongitudinalResults,
    fdr_ps: &[f64],
    bon_ps: &[f64],
    individual_order: &[String],
) -> Vec<String> {
    let mut header = vec![
        "OTU".to_string(),
        "Fisher Combined Rho".to_string(),
        "P Rho is Homogenous".to_string(),
        "Fisher Combined P".to_string(),
        "FDR P".to_string(),
        "Bonferroni P".to_string(),
        "Corrcoefs".to_string(),
        "Individual Order".to_string(),
    ];
    if taxonomy.is_some() {
        header.push("Taxonomy".to_string());
    }
    let order = individual_order.join(", ");

    let mut lines = vec![header.join("\t")];
    for i in 0..results.combined_ps.len() {
        let corrcoefs = results.coefficients[i]
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        let mut line = vec![
            feature_ids[i].clone(),
            results.combined_rhos[i].to_string(),
            results.homogeneity_ps[i].to_string(),
            results.combined_ps[i].to_string(),
            fdr_ps[i].to_string(),
            bon_ps[i].to_string(),
            corrcoefs,
            order.clone(),
        ];
        push_taxonomy(&mut line, taxonomy, i);
        lines.push(line.join("\t"));
    }
    lines
}

/// Format paired t-test results.
pub fn paired_lines(
    feature_ids: &[String],
    taxonomy: Option<&[String]>,
    results: &PairedResults,
    fdr_ps: &[f64],
    bon_ps: &[f64],
) -> Vec<String> {
    let mut header = vec![
        "OTU".to_string(),
        "Test-Statistic".to_string(),
        "P".to_string(),
        "FDR_P".to_string(),
        "Bonferroni_P".to_string(),
    ];
    if taxonomy.is_some() {
        header.push("Taxonomy".to_string());
    }

    let mut lines = vec![header.join("\t")];
    for i in 0..results.p_values.len() {
        let mut line = vec![
            feature_ids[i].clone(),
            results.statistics[i].to_string(),
            results.p_values[i].to_string(),
            fdr_ps[i].to_string(),
            bon_ps[i].to_string(),
        ];
        push_taxonomy(&mut line, taxonomy, i);
        lines.push(line.join("\t"));
    }
    lines
}

/// Stable-sort table lines ascending by a numeric column, keeping the
/// header line fixed.
///
/// A cell that fails to parse, or parses to NaN, sorts after every valid
/// number. Ties keep their original relative order.
pub fn sort_by_column(lines: Vec<String>, column: usize) -> Vec<String> {
    if lines.len() < 2 {
        return lines;
    }
    let sort_key = |line: &String| -> f64 {
        line.split('\t')
            .nth(column)
            .and_then(|cell| cell.parse::<f64>().ok())
            .map(|v| if v.is_nan() { f64::INFINITY } else { v })
            .unwrap_or(f64::INFINITY)
    };

    let mut iter = lines.into_iter();
    let header = iter.next().expect("non-empty lines");
    let mut rest: Vec<String> = iter.collect();
    rest.sort_by(|a, b| {
        sort_key(a)
            .partial_cmp(&sort_key(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut sorted = Vec::with_capacity(rest.len() + 1);
    sorted.push(header);
    sorted.extend(rest);
    sorted
}
