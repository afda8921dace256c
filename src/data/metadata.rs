//! Sample metadata handling.
//!
//! Metadata is a mapping from sample id to a record of named, string-valued
//! fields. Interpretation of a field (categorical grouping vs. numeric
//! gradient) happens downstream; the records themselves stay untyped strings.

use crate::error::{Result, SigError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Sample metadata containing named fields for each sample.
#[derive(Debug, Clone)]
pub struct SampleMetadata {
    /// Sample IDs in file order.
    sample_ids: Vec<String>,
    /// Field names in file order.
    field_names: Vec<String>,
    /// Data stored as sample_id -> field_name -> value.
    data: HashMap<String, HashMap<String, String>>,
}

impl SampleMetadata {
    /// Build metadata from ordered (sample id, record) pairs.
    pub fn new(field_names: Vec<String>, records: Vec<(String, Vec<String>)>) -> Result<Self> {
        let mut sample_ids = Vec::with_capacity(records.len());
        let mut data = HashMap::new();
        for (sample_id, values) in records {
            if values.len() != field_names.len() {
                return Err(SigError::DimensionMismatch {
                    expected: field_names.len(),
                    actual: values.len(),
                });
            }
            let record: HashMap<String, String> = field_names
                .iter()
                .cloned()
                .zip(values.into_iter())
                .collect();
            sample_ids.push(sample_id.clone());
            data.insert(sample_id, record);
        }
        Ok(Self {
            sample_ids,
            field_names,
            data,
        })
    }

    /// Load metadata from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with field names (first column is the sample ID header)
    /// - Subsequent rows: sample ID followed by field values
    ///
    /// Short rows are padded with empty values, which the grouper treats as
    /// missing.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| SigError::EmptyData("Empty metadata file".to_string()))??;
        let header: Vec<&str> = header_line.split('\t').collect();
        if header.len() < 2 {
            return Err(SigError::EmptyData(
                "Metadata must have at least one field column".to_string(),
            ));
        }
        let field_names: Vec<String> = header[1..].iter().map(|s| s.to_string()).collect();

        let mut records = Vec::new();
        for line_result in lines {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let sample_id = fields[0].to_string();
            let mut values: Vec<String> =
                fields[1..].iter().map(|s| s.trim().to_string()).collect();
            values.resize(field_names.len(), String::new());
            records.push((sample_id, values));
        }

        if records.is_empty() {
            return Err(SigError::EmptyData("No samples in metadata".to_string()));
        }
        Self::new(field_names, records)
    }

    /// Sample IDs in order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Field names in order.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Get the value of a field for a sample.
    ///
    /// Fails with `UnknownSample` when the sample has no record, and with
    /// `MissingField` when the record lacks the field.
    pub fn get(&self, sample_id: &str, field: &str) -> Result<&str> {
        let record = self
            .data
            .get(sample_id)
            .ok_or_else(|| SigError::UnknownSample(sample_id.to_string()))?;
        record
            .get(field)
            .map(|s| s.as_str())
            .ok_or_else(|| SigError::MissingField(field.to_string()))
    }

    /// Check if a field exists.
    pub fn has_field(&self, field: &str) -> bool {
        self.field_names.iter().any(|f| f == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_tsv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sample_id\tgroup\tdose").unwrap();
        writeln!(file, "S1\tcontrol\t0.5").unwrap();
        writeln!(file, "S2\ttreatment\t1.5").unwrap();
        writeln!(file, "S3\tcontrol\t2.5").unwrap();
        writeln!(file, "S4\ttreatment\t3.5").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_metadata() {
        let file = create_test_tsv();
        let meta = SampleMetadata::from_tsv(file.path()).unwrap();

        assert_eq!(meta.n_samples(), 4);
        assert_eq!(meta.sample_ids(), &["S1", "S2", "S3", "S4"]);
        assert_eq!(meta.field_names(), &["group", "dose"]);
        assert_eq!(meta.get("S2", "group").unwrap(), "treatment");
    }

    #[test]
    fn test_missing_field() {
        let file = create_test_tsv();
        let meta = SampleMetadata::from_tsv(file.path()).unwrap();

        assert!(matches!(
            meta.get("S1", "batch"),
            Err(SigError::MissingField(_))
        ));
    }

    #[test]
    fn test_unknown_sample() {
        let file = create_test_tsv();
        let meta = SampleMetadata::from_tsv(file.path()).unwrap();

        assert!(matches!(
            meta.get("S9", "group"),
            Err(SigError::UnknownSample(_))
        ));
    }

    #[test]
    fn test_short_rows_padded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sample_id\tgroup\tdose").unwrap();
        writeln!(file, "S1\tcontrol").unwrap();
        file.flush().unwrap();

        let meta = SampleMetadata::from_tsv(file.path()).unwrap();
        assert_eq!(meta.get("S1", "dose").unwrap(), "");
    }
}
