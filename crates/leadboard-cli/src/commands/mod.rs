pub mod config;
pub mod explore;
pub mod records;
pub mod report;

use chrono::NaiveDate;
use leadboard_core::config::{load_config, DashboardConfig};
use leadboard_core::error::LeadError;
use leadboard_core::filter::LeadFilter;
use leadboard_core::model::{LeadRecord, Qualification};
use leadboard_core::source::{JsonValuesSource, LeadSource, XlsxSource};
use std::path::PathBuf;

/// Where the leads come from and how to read them.
pub struct Input {
    pub path: PathBuf,
    pub sheet: Option<String>,
    pub config: Option<PathBuf>,
}

impl Input {
    pub fn load_config(&self) -> Result<DashboardConfig, LeadError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(sheet) = &self.sheet {
            config.sheet_name = sheet.clone();
        }
        Ok(config)
    }

    /// Pick the backend by file extension: `.json` holds cell values,
    /// anything else is read as an xlsx workbook.
    pub fn open(&self, config: &DashboardConfig) -> Box<dyn LeadSource> {
        let is_json = self
            .path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Box::new(JsonValuesSource::new(&self.path))
        } else {
            Box::new(XlsxSource::new(&self.path, &config.sheet_name))
        }
    }
}

/// Filter choices made by the user. `None` keeps the dashboard default.
#[derive(Debug, Clone, Default)]
pub struct FilterOverrides {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub qualifications: Option<Vec<Qualification>>,
    pub campaigns: Option<Vec<String>>,
}

impl FilterOverrides {
    pub fn apply(&self, records: &[LeadRecord]) -> LeadFilter {
        let mut filter = LeadFilter::unrestricted(records);
        if self.from.is_some() {
            filter.date_from = self.from;
        }
        if self.to.is_some() {
            filter.date_to = self.to;
        }
        if let Some(qualifications) = &self.qualifications {
            filter = filter.with_qualifications(qualifications.iter().copied());
        }
        if let Some(campaigns) = &self.campaigns {
            filter = filter.with_campaigns(campaigns.iter().cloned());
        }
        filter
    }
}
