//! Grouping of samples by metadata field value.
//!
//! Group order is the order in which each value first appears when walking
//! samples in metadata order. That order is carried through the column
//! partition and into the per-group columns of the output table, so the
//! partitions are kept as ordered pair vectors rather than hash maps.

use crate::data::{AbundanceMatrix, SampleMetadata};
use crate::error::Result;

/// Ordered mapping from group label to the sample ids carrying that label.
pub type GroupPartition = Vec<(String, Vec<String>)>;

/// Ordered mapping from group label to matrix column indices.
pub type ColumnPartition = Vec<(String, Vec<usize>)>;

/// Extract (sample id, field value) pairs for every sample with a
/// non-empty value for `field`, in metadata sample order.
///
/// Fails with `MissingField` if any record lacks the field.
pub fn sample_categories(
    metadata: &SampleMetadata,
    field: &str,
) -> Result<Vec<(String, String)>> {
    let mut categories = Vec::new();
    for sample_id in metadata.sample_ids() {
        let value = metadata.get(sample_id, field)?;
        if !value.is_empty() {
            categories.push((sample_id.clone(), value.to_string()));
        }
    }
    Ok(categories)
}

/// Invert (sample, value) pairs into an ordered value -> samples partition.
///
/// Every sample lands in exactly one group; empty groups cannot occur since
/// groups are only created on first sighting of a value.
pub fn group_partition(categories: &[(String, String)]) -> GroupPartition {
    let mut partition: GroupPartition = Vec::new();
    for (sample_id, value) in categories {
        match partition.iter_mut().find(|(label, _)| label == value) {
            Some((_, samples)) => samples.push(sample_id.clone()),
            None => partition.push((value.clone(), vec![sample_id.clone()])),
        }
    }
    partition
}

/// Resolve each sample id in a partition to its matrix column index,
/// preserving group order.
///
/// Fails with `UnknownSample` if a sample id is not a matrix column.
pub fn column_partition(
    partition: &GroupPartition,
    matrix: &AbundanceMatrix,
) -> Result<ColumnPartition> {
    partition
        .iter()
        .map(|(label, samples)| {
            let indices = samples
                .iter()
                .map(|s| matrix.sample_index(s))
                .collect::<Result<Vec<usize>>>()?;
            Ok((label.clone(), indices))
        })
        .collect()
}
