use crate::error::LeadError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_SHEET_NAME: &str = "Dados WhatsApp";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_TOP_N: usize = 15;
pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 50;
pub const TOP_N_STEP: usize = 5;
pub const DEFAULT_GOOGLE_SOURCE: &str = "google";

/// Header names of the spreadsheet columns the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub timestamp: String,
    pub qualification: String,
    pub utm_campaign: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_term: String,
    pub postal_code: String,
    pub value: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            timestamp: "data".into(),
            qualification: "qualificacao".into(),
            utm_campaign: "utm_campaign".into(),
            utm_source: "utm_source".into(),
            utm_medium: "utm_medium".into(),
            utm_term: "utm_term".into(),
            postal_code: "cep".into(),
            value: "valor".into(),
        }
    }
}

impl ColumnMap {
    fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("timestamp", &self.timestamp),
            ("qualification", &self.qualification),
            ("utm_campaign", &self.utm_campaign),
            ("utm_source", &self.utm_source),
            ("utm_medium", &self.utm_medium),
            ("utm_term", &self.utm_term),
            ("postal_code", &self.postal_code),
            ("value", &self.value),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Worksheet read by the xlsx source.
    pub sheet_name: String,
    pub columns: ColumnMap,
    pub cache_ttl_secs: u64,
    /// Number of postal codes kept in the truncated breakdown.
    pub top_n: usize,
    /// `utm_source` value (case-insensitive) for the paid search section.
    pub google_source: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.into(),
            columns: ColumnMap::default(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            top_n: DEFAULT_TOP_N,
            google_source: DEFAULT_GOOGLE_SOURCE.into(),
        }
    }
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<DashboardConfig, LeadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LeadError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: DashboardConfig =
        serde_json::from_str(&content).map_err(|e| LeadError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<DashboardConfig, LeadError> {
    let config: DashboardConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_top_n(top_n: usize) -> Result<(), LeadError> {
    if !(TOP_N_MIN..=TOP_N_MAX).contains(&top_n) || top_n % TOP_N_STEP != 0 {
        return Err(LeadError::ConfigInvalid(format!(
            "top_n must be between {TOP_N_MIN} and {TOP_N_MAX} in steps of {TOP_N_STEP}, got {top_n}"
        )));
    }
    Ok(())
}

/// Validate that a config is usable.
pub fn validate_config(config: &DashboardConfig) -> Result<(), LeadError> {
    if config.sheet_name.trim().is_empty() {
        return Err(LeadError::ConfigInvalid(
            "sheet_name must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for (field, column) in config.columns.entries() {
        let column = column.trim();
        if column.is_empty() {
            return Err(LeadError::ConfigInvalid(format!(
                "column for '{field}' must not be empty"
            )));
        }
        if !seen.insert(column) {
            return Err(LeadError::ConfigInvalid(format!(
                "column '{column}' is mapped more than once"
            )));
        }
    }

    if config.cache_ttl_secs == 0 {
        return Err(LeadError::ConfigInvalid(
            "cache_ttl_secs must be greater than zero".into(),
        ));
    }

    validate_top_n(config.top_n)?;

    if config.google_source.trim().is_empty() {
        return Err(LeadError::ConfigInvalid(
            "google_source must not be empty".into(),
        ));
    }

    Ok(())
}
