//! Per-feature row slices for the test runners.
//!
//! Each generator is an explicit iterator over the matrix rows, yielding one
//! owned slice per feature in matrix row order. Generators are finite and
//! one-shot; re-slicing means re-constructing, since the source matrix is
//! immutable. Anything that can invalidate every row (unknown samples,
//! mismatched paired lists, a gradient value that is not a number) fails in
//! the constructor, before the first row is produced.

use crate::data::{AbundanceMatrix, SampleMetadata};
use crate::error::{Result, SigError};
use crate::group::ColumnPartition;

fn parse_gradient(metadata: &SampleMetadata, sample_id: &str, field: &str) -> Result<f64> {
    let raw = metadata.get(sample_id, field)?;
    raw.parse::<f64>().map_err(|_| SigError::NonNumericGradient {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Yields, per feature, one numeric array per partition group, values taken
/// from the group's column indices in partition order.
pub struct GroupSlices<'a> {
    matrix: &'a AbundanceMatrix,
    partition: &'a ColumnPartition,
    row: usize,
}

impl<'a> GroupSlices<'a> {
    pub fn new(matrix: &'a AbundanceMatrix, partition: &'a ColumnPartition) -> Self {
        Self {
            matrix,
            partition,
            row: 0,
        }
    }
}

impl Iterator for GroupSlices<'_> {
    type Item = Vec<Vec<f64>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.matrix.n_features() {
            return None;
        }
        let dense = self.matrix.row_dense(self.row);
        self.row += 1;
        Some(
            self.partition
                .iter()
                .map(|(_, cols)| cols.iter().map(|&c| dense[c]).collect())
                .collect(),
        )
    }
}

/// Yields, per feature, a (before, after) pair of arrays aligned by position.
pub struct PairedSlices<'a> {
    matrix: &'a AbundanceMatrix,
    before_cols: Vec<usize>,
    after_cols: Vec<usize>,
    row: usize,
}

impl<'a> PairedSlices<'a> {
    /// Fails with `PairedLengthMismatch` if the two lists differ in length,
    /// and with `UnknownSample` if an id is not a matrix column.
    pub fn new(
        matrix: &'a AbundanceMatrix,
        before: &[String],
        after: &[String],
    ) -> Result<Self> {
        if before.len() != after.len() {
            return Err(SigError::PairedLengthMismatch {
                before: before.len(),
                after: after.len(),
            });
        }
        let before_cols = before
            .iter()
            .map(|s| matrix.sample_index(s))
            .collect::<Result<Vec<usize>>>()?;
        let after_cols = after
            .iter()
            .map(|s| matrix.sample_index(s))
            .collect::<Result<Vec<usize>>>()?;
        Ok(Self {
            matrix,
            before_cols,
            after_cols,
            row: 0,
        })
    }
}

impl Iterator for PairedSlices<'_> {
    type Item = (Vec<f64>, Vec<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.matrix.n_features() {
            return None;
        }
        let dense = self.matrix.row_dense(self.row);
        self.row += 1;
        Some((
            self.before_cols.iter().map(|&c| dense[c]).collect(),
            self.after_cols.iter().map(|&c| dense[c]).collect(),
        ))
    }
}

/// Yields, per feature, the full numeric row together with the gradient
/// vector resolved from a metadata field, in matrix column order.
pub struct CorrelationSlices<'a> {
    matrix: &'a AbundanceMatrix,
    gradient: Vec<f64>,
    row: usize,
}

impl<'a> CorrelationSlices<'a> {
    /// The gradient vector is shared by every feature, so a value that does
    /// not convert to a float aborts construction with `NonNumericGradient`.
    pub fn new(
        matrix: &'a AbundanceMatrix,
        metadata: &SampleMetadata,
        field: &str,
    ) -> Result<Self> {
        let gradient = matrix
            .sample_ids()
            .iter()
            .map(|s| parse_gradient(metadata, s, field))
            .collect::<Result<Vec<f64>>>()?;
        Ok(Self {
            matrix,
            gradient,
            row: 0,
        })
    }
}

impl Iterator for CorrelationSlices<'_> {
    type Item = (Vec<f64>, Vec<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.matrix.n_features() {
            return None;
        }
        let dense = self.matrix.row_dense(self.row);
        self.row += 1;
        Some((dense, self.gradient.clone()))
    }
}

/// Yields, per feature, one abundance array per subject plus the matching
/// per-subject gradient arrays, both in subject order.
pub struct LongitudinalSlices<'a> {
    matrix: &'a AbundanceMatrix,
    subject_cols: &'a ColumnPartition,
    gradients: Vec<Vec<f64>>,
    row: usize,
}

impl<'a> LongitudinalSlices<'a> {
    /// `subjects` maps subject id to that subject's sample ids and
    /// `subject_cols` is the same partition resolved to column indices;
    /// both must share key order. Gradient values are resolved once here,
    /// with the same fail-fast conversion rule as [`CorrelationSlices`].
    pub fn new(
        matrix: &'a AbundanceMatrix,
        metadata: &SampleMetadata,
        field: &str,
        subjects: &[(String, Vec<String>)],
        subject_cols: &'a ColumnPartition,
    ) -> Result<Self> {
        let gradients = subjects
            .iter()
            .map(|(_, sample_ids)| {
                sample_ids
                    .iter()
                    .map(|s| parse_gradient(metadata, s, field))
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;
        Ok(Self {
            matrix,
            subject_cols,
            gradients,
            row: 0,
        })
    }
}

impl Iterator for LongitudinalSlices<'_> {
    type Item = (Vec<Vec<f64>>, Vec<Vec<f64>>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.matrix.n_features() {
            return None;
        }
        let dense = self.matrix.row_dense(self.row);
        self.row += 1;
        let per_subject = self
            .subject_cols
            .iter()
            .map(|(_, cols)| cols.iter().map(|&c| dense[c]).collect())
            .collect();
        Some((per_subject, self.gradients.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    fn matrix() -> AbundanceMatrix {
        // 2 features × 4 samples
        let mut tri = TriMat::new((2, 4));
        tri.add_triplet(0, 0, 1.0);
        tri.add_triplet(0, 1, 2.0);
        tri.add_triplet(0, 2, 3.0);
        tri.add_triplet(0, 3, 4.0);
        tri.add_triplet(1, 0, 10.0);
        tri.add_triplet(1, 2, 30.0);
        AbundanceMatrix::new(
            tri.to_csr(),
            vec!["o1".to_string(), "o2".to_string()],
            ["S1", "S2", "S3", "S4"].iter().map(|s| s.to_string()).collect(),
            None,
        )
        .unwrap()
    }

    fn metadata() -> SampleMetadata {
        SampleMetadata::new(
            vec!["ph".to_string(), "subject".to_string()],
            vec![
                ("S1".to_string(), vec!["6.5".to_string(), "a".to_string()]),
                ("S2".to_string(), vec!["7.0".to_string(), "a".to_string()]),
                ("S3".to_string(), vec!["7.5".to_string(), "b".to_string()]),
                ("S4".to_string(), vec!["8.0".to_string(), "b".to_string()]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_group_slices() {
        let mat = matrix();
        let partition = vec![
            ("A".to_string(), vec![0, 1]),
            ("B".to_string(), vec![2, 3]),
        ];
        let rows: Vec<_> = GroupSlices::new(&mat, &partition).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(rows[1], vec![vec![10.0, 0.0], vec![30.0, 0.0]]);
    }

    #[test]
    fn test_paired_slices_alignment() {
        let mat = matrix();
        let before = vec!["S1".to_string(), "S2".to_string()];
        let after = vec!["S3".to_string(), "S4".to_string()];
        let rows: Vec<_> = PairedSlices::new(&mat, &before, &after).unwrap().collect();
        assert_eq!(rows[0], (vec![1.0, 2.0], vec![3.0, 4.0]));
    }

    #[test]
    fn test_paired_slices_length_mismatch() {
        let mat = matrix();
        let before: Vec<String> = ["S1", "S2", "S3"].iter().map(|s| s.to_string()).collect();
        let after: Vec<String> = ["S1", "S2"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            PairedSlices::new(&mat, &before, &after),
            Err(SigError::PairedLengthMismatch { before: 3, after: 2 })
        ));
    }

    #[test]
    fn test_correlation_slices() {
        let mat = matrix();
        let meta = metadata();
        let rows: Vec<_> = CorrelationSlices::new(&mat, &meta, "ph").unwrap().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(rows[0].1, vec![6.5, 7.0, 7.5, 8.0]);
        // gradient is identical for every row
        assert_eq!(rows[1].1, rows[0].1);
    }

    #[test]
    fn test_correlation_slices_non_numeric_fails_before_rows() {
        let mat = matrix();
        let meta = SampleMetadata::new(
            vec!["ph".to_string()],
            vec![
                ("S1".to_string(), vec!["6.5".to_string()]),
                ("S2".to_string(), vec!["abc".to_string()]),
                ("S3".to_string(), vec!["7.5".to_string()]),
                ("S4".to_string(), vec!["8.0".to_string()]),
            ],
        )
        .unwrap();
        assert!(matches!(
            CorrelationSlices::new(&mat, &meta, "ph"),
            Err(SigError::NonNumericGradient { .. })
        ));
    }

    #[test]
    fn test_longitudinal_slices() {
        let mat = matrix();
        let meta = metadata();
        let subjects = vec![
            ("a".to_string(), vec!["S1".to_string(), "S2".to_string()]),
            ("b".to_string(), vec!["S3".to_string(), "S4".to_string()]),
        ];
        let subject_cols = vec![
            ("a".to_string(), vec![0, 1]),
            ("b".to_string(), vec![2, 3]),
        ];
        let rows: Vec<_> = LongitudinalSlices::new(&mat, &meta, "ph", &subjects, &subject_cols)
            .unwrap()
            .collect();
        assert_eq!(rows.len(), 2);
        let (obs, grads) = &rows[0];
        assert_eq!(obs[0], vec![1.0, 2.0]);
        assert_eq!(obs[1], vec![3.0, 4.0]);
        assert_eq!(grads[0], vec![6.5, 7.0]);
        assert_eq!(grads[1], vec![7.5, 8.0]);
    }
}
