use crate::derive::derive_features;
use crate::model::{LeadRecord, NormalizedLead, Qualification, NOT_INFORMED};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

pub(crate) struct LeadFixture(NormalizedLead);

impl LeadFixture {
    /// `ts` is "YYYY-MM-DD HH:MM".
    pub(crate) fn new(ts: &str, qualification: Qualification) -> Self {
        LeadFixture(NormalizedLead {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
            qualification,
            utm_campaign: NOT_INFORMED.into(),
            utm_source: NOT_INFORMED.into(),
            utm_medium: NOT_INFORMED.into(),
            utm_term: NOT_INFORMED.into(),
            postal_code: NOT_INFORMED.into(),
            value: Decimal::ZERO,
        })
    }

    pub(crate) fn campaign(mut self, campaign: &str) -> Self {
        self.0.utm_campaign = campaign.into();
        self
    }

    pub(crate) fn source(mut self, source: &str) -> Self {
        self.0.utm_source = source.into();
        self
    }

    pub(crate) fn term(mut self, term: &str) -> Self {
        self.0.utm_term = term.into();
        self
    }

    pub(crate) fn postal_code(mut self, postal_code: &str) -> Self {
        self.0.postal_code = postal_code.into();
        self
    }

    pub(crate) fn value(mut self, value: Decimal) -> Self {
        self.0.value = value;
        self
    }

    pub(crate) fn build(self) -> LeadRecord {
        derive_features(&[self.0]).remove(0)
    }
}

/// `n` leads with the given qualification on a fixed Monday morning.
pub(crate) fn many(n: usize, qualification: Qualification) -> Vec<LeadRecord> {
    (0..n)
        .map(|_| LeadFixture::new("2024-02-05 09:00", qualification).build())
        .collect()
}
