pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod derive;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod refresh;
pub mod source;

#[cfg(test)]
mod fixtures;

use config::ColumnMap;
use error::LeadError;
use model::{LeadRecord, SheetValues};
use normalize::RejectedRow;
use refresh::CachedSource;
use serde::{Deserialize, Serialize};
use source::LeadSource;
use tracing::info;

/// Normalized and enriched records of one fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub records: Vec<LeadRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl Dataset {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Main API entry point: fetch a sheet and turn it into lead records.
///
/// A source that cannot be read fails the whole load. A sheet without data
/// rows yields an empty dataset.
pub fn load_dataset(source: &dyn LeadSource, columns: &ColumnMap) -> Result<Dataset, LeadError> {
    let values = source.fetch()?;
    let dataset = dataset_from_values(&values, columns);
    info!(
        source = source.name(),
        accepted = dataset.records.len(),
        rejected = dataset.rejected_count(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Same as [`load_dataset`], going through the TTL cache.
///
/// The flag tells whether the values were served from the cache.
pub fn load_cached<S: LeadSource>(
    cache: &mut CachedSource<S>,
    columns: &ColumnMap,
) -> Result<(Dataset, bool), LeadError> {
    let (values, from_cache) = cache.get()?;
    let dataset = dataset_from_values(&values, columns);
    info!(
        source = cache.source().name(),
        from_cache,
        accepted = dataset.records.len(),
        rejected = dataset.rejected_count(),
        "dataset loaded"
    );
    Ok((dataset, from_cache))
}

/// Normalize and derive already fetched values.
pub fn dataset_from_values(values: &SheetValues, columns: &ColumnMap) -> Dataset {
    let rows = values.to_raw_rows();
    let report = normalize::normalize_with_report(&rows, columns);
    Dataset {
        records: derive::derive_features(&report.records),
        rejected: report.rejected,
    }
}
