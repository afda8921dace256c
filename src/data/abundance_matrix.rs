//! Abundance matrix with sparse storage for feature-by-sample data.

use crate::error::{Result, SigError};
use sprs::{CsMat, TriMat};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Header name that marks a trailing annotation column in a TSV table.
const TAXONOMY_COLUMN: &str = "Taxonomy";

/// A sparse abundance matrix storing feature values across samples.
///
/// Rows represent features (OTUs/taxa), columns represent samples.
/// Uses CSR (Compressed Sparse Row) format for efficient row-wise access,
/// which is the access pattern of every test runner. An optional taxonomy
/// annotation may be attached per feature.
#[derive(Debug, Clone)]
pub struct AbundanceMatrix {
    /// Sparse matrix in CSR format (features × samples)
    data: CsMat<f64>,
    /// Feature identifiers (row names)
    feature_ids: Vec<String>,
    /// Sample identifiers (column names)
    sample_ids: Vec<String>,
    /// Optional per-feature annotation, aligned with `feature_ids`.
    taxonomy: Option<Vec<String>>,
    /// Sample id -> column index lookup.
    sample_index: HashMap<String, usize>,
}

impl AbundanceMatrix {
    /// Create a new AbundanceMatrix from a sparse matrix and identifiers.
    pub fn new(
        data: CsMat<f64>,
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
        taxonomy: Option<Vec<String>>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != feature_ids.len() {
            return Err(SigError::DimensionMismatch {
                expected: nrows,
                actual: feature_ids.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(SigError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        if let Some(tax) = &taxonomy {
            if tax.len() != nrows {
                return Err(SigError::DimensionMismatch {
                    expected: nrows,
                    actual: tax.len(),
                });
            }
        }
        let sample_index = sample_ids
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Ok(Self {
            data,
            feature_ids,
            sample_ids,
            taxonomy,
            sample_index,
        })
    }

    /// Load an abundance matrix from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with sample IDs (first column is the feature ID header)
    /// - Subsequent rows: feature ID followed by abundances
    ///
    /// If the last header column is named `Taxonomy`, that column is read as
    /// a per-feature annotation instead of an abundance.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| SigError::EmptyData("Empty TSV file".to_string()))??;
        let header: Vec<&str> = header_line.split('\t').collect();
        if header.len() < 2 {
            return Err(SigError::EmptyData(
                "TSV must have at least one sample".to_string(),
            ));
        }
        let has_taxonomy = header.last().map(|s| s.trim()) == Some(TAXONOMY_COLUMN);
        let sample_end = if has_taxonomy {
            header.len() - 1
        } else {
            header.len()
        };
        let sample_ids: Vec<String> = header[1..sample_end].iter().map(|s| s.to_string()).collect();
        if sample_ids.is_empty() {
            return Err(SigError::EmptyData(
                "TSV must have at least one sample".to_string(),
            ));
        }
        let n_samples = sample_ids.len();

        let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
        let mut feature_ids: Vec<String> = Vec::new();
        let mut taxonomy: Vec<String> = Vec::new();

        for line_result in lines {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let row_idx = feature_ids.len();
            feature_ids.push(fields[0].to_string());

            for (col_idx, value_str) in fields[1..].iter().take(n_samples).enumerate() {
                let value: f64 =
                    value_str
                        .trim()
                        .parse()
                        .map_err(|_| SigError::InvalidAbundance {
                            value: value_str.to_string(),
                            row: row_idx,
                            col: col_idx,
                        })?;
                if value != 0.0 {
                    triplets.push((row_idx, col_idx, value));
                }
            }
            if has_taxonomy {
                taxonomy.push(
                    fields
                        .get(1 + n_samples)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default(),
                );
            }
        }

        let n_features = feature_ids.len();
        if n_features == 0 {
            return Err(SigError::EmptyData("No features in TSV".to_string()));
        }

        let mut tri_mat = TriMat::new((n_features, n_samples));
        for (row, col, val) in triplets {
            tri_mat.add_triplet(row, col, val);
        }
        let data: CsMat<f64> = tri_mat.to_csr();

        Self::new(
            data,
            feature_ids,
            sample_ids,
            has_taxonomy.then_some(taxonomy),
        )
    }

    /// Write the abundance matrix to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "feature_id")?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{}", sample_id)?;
        }
        if self.taxonomy.is_some() {
            write!(writer, "\t{}", TAXONOMY_COLUMN)?;
        }
        writeln!(writer)?;

        for (row_idx, feature_id) in self.feature_ids.iter().enumerate() {
            write!(writer, "{}", feature_id)?;
            for col_idx in 0..self.n_samples() {
                write!(writer, "\t{}", self.get(row_idx, col_idx))?;
            }
            if let Some(tax) = &self.taxonomy {
                write!(writer, "\t{}", tax[row_idx])?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    /// Get the value at (row, col), returning 0 for missing entries.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data.get(row, col).copied().unwrap_or(0.0)
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.rows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.cols()
    }

    /// Feature identifiers.
    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Per-feature taxonomy annotations, if the table carried them.
    #[inline]
    pub fn taxonomy(&self) -> Option<&[String]> {
        self.taxonomy.as_deref()
    }

    /// Resolve a sample id to its column index.
    pub fn sample_index(&self, sample_id: &str) -> Result<usize> {
        self.sample_index
            .get(sample_id)
            .copied()
            .ok_or_else(|| SigError::UnknownSample(sample_id.to_string()))
    }

    /// Get a dense vector for a specific row (feature).
    pub fn row_dense(&self, row: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.n_samples()];
        if let Some(row_vec) = self.data.outer_view(row) {
            for (col, &val) in row_vec.iter() {
                dense[col] = val;
            }
        }
        dense
    }

    /// Get a dense vector for a specific column (sample).
    pub fn col_dense(&self, col: usize) -> Vec<f64> {
        (0..self.n_features()).map(|row| self.get(row, col)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_matrix() -> AbundanceMatrix {
        // 3 features × 4 samples
        let mut tri_mat = TriMat::new((3, 4));
        tri_mat.add_triplet(0, 0, 10.0);
        tri_mat.add_triplet(0, 1, 20.0);
        tri_mat.add_triplet(0, 3, 5.0);
        tri_mat.add_triplet(1, 0, 100.0);
        tri_mat.add_triplet(1, 1, 200.0);
        tri_mat.add_triplet(1, 2, 150.0);
        tri_mat.add_triplet(1, 3, 175.0);
        tri_mat.add_triplet(2, 0, 1.0);

        let feature_ids = vec!["otu_A".to_string(), "otu_B".to_string(), "otu_C".to_string()];
        let sample_ids = vec![
            "sample1".to_string(),
            "sample2".to_string(),
            "sample3".to_string(),
            "sample4".to_string(),
        ];

        AbundanceMatrix::new(tri_mat.to_csr(), feature_ids, sample_ids, None).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let mat = create_test_matrix();
        assert_eq!(mat.n_features(), 3);
        assert_eq!(mat.n_samples(), 4);
    }

    #[test]
    fn test_row_dense() {
        let mat = create_test_matrix();
        assert_eq!(mat.row_dense(0), vec![10.0, 20.0, 0.0, 5.0]);
        assert_eq!(mat.row_dense(2), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_col_dense() {
        let mat = create_test_matrix();
        assert_eq!(mat.col_dense(0), vec![10.0, 100.0, 1.0]);
        assert_eq!(mat.col_dense(2), vec![0.0, 150.0, 0.0]);
    }

    #[test]
    fn test_sample_index() {
        let mat = create_test_matrix();
        assert_eq!(mat.sample_index("sample3").unwrap(), 2);
        assert!(matches!(
            mat.sample_index("nope"),
            Err(SigError::UnknownSample(_))
        ));
    }

    #[test]
    fn test_mismatched_ids_rejected() {
        let tri_mat: TriMat<f64> = TriMat::new((2, 2));
        let result = AbundanceMatrix::new(
            tri_mat.to_csr(),
            vec!["a".to_string()],
            vec!["s1".to_string(), "s2".to_string()],
            None,
        );
        assert!(matches!(result, Err(SigError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_tsv_roundtrip() {
        let mat = create_test_matrix();

        let temp_file = NamedTempFile::new().unwrap();
        mat.to_tsv(temp_file.path()).unwrap();

        let loaded = AbundanceMatrix::from_tsv(temp_file.path()).unwrap();
        assert_eq!(loaded.feature_ids(), mat.feature_ids());
        assert_eq!(loaded.sample_ids(), mat.sample_ids());
        for row in 0..mat.n_features() {
            for col in 0..mat.n_samples() {
                assert_eq!(loaded.get(row, col), mat.get(row, col));
            }
        }
    }

    #[test]
    fn test_tsv_with_taxonomy() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "otu_id\tS1\tS2\tTaxonomy").unwrap();
        writeln!(file, "o1\t3\t0\tk__Bacteria; p__Firmicutes").unwrap();
        writeln!(file, "o2\t0\t7\tk__Bacteria; p__Bacteroidetes").unwrap();
        file.flush().unwrap();

        let mat = AbundanceMatrix::from_tsv(file.path()).unwrap();
        assert_eq!(mat.n_samples(), 2);
        assert_eq!(mat.sample_ids(), &["S1", "S2"]);
        let tax = mat.taxonomy().unwrap();
        assert_eq!(tax[1], "k__Bacteria; p__Bacteroidetes");
    }

    #[test]
    fn test_invalid_value_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "otu_id\tS1\tS2").unwrap();
        writeln!(file, "o1\t3\tx").unwrap();
        file.flush().unwrap();

        let result = AbundanceMatrix::from_tsv(file.path());
        assert!(matches!(result, Err(SigError::InvalidAbundance { .. })));
    }
}
