use crate::model::{LeadRecord, Qualification};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter state chosen by the user.
///
/// The sets are allow-lists: an empty set lets nothing through. Date bounds
/// are inclusive and apply to the calendar date of the timestamp; `None`
/// leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub qualifications: BTreeSet<Qualification>,
    pub campaigns: BTreeSet<String>,
}

impl LeadFilter {
    /// The filter state a fresh dashboard opens with: the full date span of
    /// the data, every qualification and every campaign seen.
    pub fn unrestricted(records: &[LeadRecord]) -> Self {
        let bounds = date_bounds(records);
        LeadFilter {
            date_from: bounds.map(|(from, _)| from),
            date_to: bounds.map(|(_, to)| to),
            qualifications: Qualification::ALL.into_iter().collect(),
            campaigns: campaign_options(records).into_iter().collect(),
        }
    }

    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_qualifications(mut self, qualifications: impl IntoIterator<Item = Qualification>) -> Self {
        self.qualifications = qualifications.into_iter().collect();
        self
    }

    pub fn with_campaigns<S: Into<String>>(mut self, campaigns: impl IntoIterator<Item = S>) -> Self {
        self.campaigns = campaigns.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, record: &LeadRecord) -> bool {
        let date = record.lead.timestamp.date();
        self.date_from.map_or(true, |from| date >= from)
            && self.date_to.map_or(true, |to| date <= to)
            && self.qualifications.contains(&record.lead.qualification)
            && self.campaigns.contains(&record.lead.utm_campaign)
    }
}

/// Records passing `filter`, in input order.
pub fn filter(records: &[LeadRecord], filter: &LeadFilter) -> Vec<LeadRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

/// Records whose `utm_source` equals `source`, ignoring case.
pub fn by_source(records: &[LeadRecord], source: &str) -> Vec<LeadRecord> {
    let wanted = source.trim().to_lowercase();
    records
        .iter()
        .filter(|r| r.lead.utm_source.to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Distinct campaigns, sorted.
pub fn campaign_options(records: &[LeadRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.lead.utm_campaign.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Earliest and latest calendar date present, if any.
pub fn date_bounds(records: &[LeadRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = records.iter().map(|r| r.lead.timestamp.date());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}
