use crate::aggregate::{
    group_count, pivot, pivot_top_n, qualification_counts, AggregateTable, Dimension, GroupBy, PivotTable,
    QualificationSummary, ValueAgg,
};
use crate::config::{DashboardConfig, DEFAULT_GOOGLE_SOURCE, DEFAULT_TOP_N};
use crate::filter::{by_source, filter, LeadFilter};
use crate::model::{LeadRecord, NOT_INFORMED};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardOptions {
    /// Postal codes kept in the truncated breakdown.
    pub top_n: usize,
    /// `utm_source` value of the paid search section, compared ignoring case.
    pub google_source: String,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            google_source: DEFAULT_GOOGLE_SOURCE.into(),
        }
    }
}

impl From<&DashboardConfig> for DashboardOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            top_n: config.top_n,
            google_source: config.google_source.clone(),
        }
    }
}

/// Leads attributed to the paid search source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSection {
    pub summary: QualificationSummary,
    pub campaigns: PivotTable,
    /// Search terms by qualification; leads without a term are left out.
    pub terms: PivotTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostalSection {
    pub top_n: usize,
    /// The `top_n` most frequent postal codes.
    pub top: PivotTable,
    /// Every postal code.
    pub table: PivotTable,
}

/// Every table the dashboard renders for one filter state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub filter: LeadFilter,
    pub summary: QualificationSummary,
    /// Weekday rows by hour columns, 7 x 24.
    pub heatmap: PivotTable,
    pub weekday_totals: AggregateTable,
    pub campaigns: PivotTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_codes: Option<PostalSection>,
}

/// Filter the full record set and compute every dashboard section.
///
/// Never fails: a filter that matches nothing produces zero-filled tables.
pub fn build_dashboard(records: &[LeadRecord], lead_filter: &LeadFilter, options: &DashboardOptions) -> DashboardReport {
    let filtered = filter(records, lead_filter);

    DashboardReport {
        filter: lead_filter.clone(),
        summary: qualification_counts(&filtered),
        heatmap: pivot(&filtered, Dimension::Weekday, Dimension::Hour, ValueAgg::Count),
        weekday_totals: group_count(&filtered, GroupBy::One(Dimension::Weekday)),
        campaigns: pivot(&filtered, Dimension::Campaign, Dimension::Qualification, ValueAgg::Count),
        google: google_section(&filtered, &options.google_source),
        postal_codes: postal_section(&filtered, options.top_n),
    }
}

fn google_section(records: &[LeadRecord], source: &str) -> Option<GoogleSection> {
    let google = by_source(records, source);
    if google.is_empty() {
        return None;
    }

    let with_terms: Vec<LeadRecord> = google
        .iter()
        .filter(|r| r.lead.utm_term != NOT_INFORMED)
        .cloned()
        .collect();

    Some(GoogleSection {
        summary: qualification_counts(&google),
        campaigns: pivot(&google, Dimension::Campaign, Dimension::Qualification, ValueAgg::Count),
        terms: pivot(&with_terms, Dimension::Term, Dimension::Qualification, ValueAgg::Count),
    })
}

fn postal_section(records: &[LeadRecord], top_n: usize) -> Option<PostalSection> {
    let known: Vec<LeadRecord> = records
        .iter()
        .filter(|r| r.lead.has_postal_code())
        .cloned()
        .collect();
    if known.is_empty() {
        return None;
    }

    Some(PostalSection {
        top_n,
        top: pivot_top_n(&known, Dimension::PostalCode, Dimension::Qualification, ValueAgg::Count, top_n),
        table: pivot(&known, Dimension::PostalCode, Dimension::Qualification, ValueAgg::Count),
    })
}
