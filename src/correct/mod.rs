//! Multiple-testing correction.
//!
//! Both corrections map a raw p-value sequence to an adjusted sequence of
//! the same length and order. NaN inputs stay NaN in the output so per-row
//! degeneracies remain visible in the final table.

/// Benjamini-Hochberg false discovery rate correction.
///
/// For each p-value the adjusted value is min(p * n / rank, next adjusted),
/// capped at 1.0.
pub fn fdr_correction(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let n_f64 = n as f64;
    let mut q_sorted = vec![0.0; n];
    q_sorted[n - 1] = p_values[indices[n - 1]].min(1.0);
    for i in (0..n - 1).rev() {
        let rank = i + 1;
        let adjusted = p_values[indices[i]] * n_f64 / rank as f64;
        q_sorted[i] = adjusted.min(q_sorted[i + 1]).min(1.0);
    }

    let mut q_values = vec![0.0; n];
    for (i, &orig_idx) in indices.iter().enumerate() {
        q_values[orig_idx] = if p_values[orig_idx].is_nan() {
            f64::NAN
        } else {
            q_sorted[i]
        };
    }
    q_values
}

/// Bonferroni correction: each p-value times the number of tests, capped
/// at 1.0.
pub fn bonferroni_correction(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len() as f64;
    p_values
        .iter()
        .map(|&p| if p.is_nan() { f64::NAN } else { (p * n).min(1.0) })
        .collect()
}
