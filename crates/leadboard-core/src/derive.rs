//! Calendar features derived from a lead's timestamp.

use crate::model::{LeadRecord, NormalizedLead, Weekday};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Weekday (Monday first) and hour (0-23) of a timestamp.
pub fn calendar_features(timestamp: &NaiveDateTime) -> (Weekday, u32) {
    (Weekday::from_chrono(timestamp.weekday()), timestamp.hour())
}

/// Attach weekday and hour to every lead.
///
/// Accepts plain normalized leads as well as already derived records, in which
/// case the features are recomputed from the timestamp and come out identical.
pub fn derive_features<R: AsRef<NormalizedLead>>(records: &[R]) -> Vec<LeadRecord> {
    records
        .iter()
        .map(|r| {
            let lead = r.as_ref();
            let (weekday, hour) = calendar_features(&lead.timestamp);
            LeadRecord {
                lead: lead.clone(),
                weekday,
                hour,
            }
        })
        .collect()
}
