pub mod timestamp;
pub mod values;

use crate::config::ColumnMap;
use crate::model::{NormalizedLead, Qualification, RawRow};
use serde::{Deserialize, Serialize};
use std::fmt;
use timestamp::parse_timestamp;
use tracing::debug;
use values::{normalize_category, normalize_postal_code, parse_value};

/// Why a row was left out of the normalized set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingTimestamp,
    InvalidTimestamp(String),
    MissingQualification,
    UnknownQualification(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingTimestamp => write!(f, "missing timestamp"),
            RejectReason::InvalidTimestamp(raw) => write!(f, "unparseable timestamp '{raw}'"),
            RejectReason::MissingQualification => write!(f, "missing qualification"),
            RejectReason::UnknownQualification(raw) => {
                write!(f, "unknown qualification '{raw}'")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(NormalizedLead),
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Zero-based position among the data rows (header excluded).
    pub row_index: usize,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub records: Vec<NormalizedLead>,
    pub rejected: Vec<RejectedRow>,
}

/// Normalize raw rows, silently dropping the ones that cannot become a lead.
pub fn normalize(rows: &[RawRow], columns: &ColumnMap) -> Vec<NormalizedLead> {
    normalize_with_report(rows, columns).records
}

/// Normalize raw rows and keep track of what was dropped and why.
///
/// Input order is preserved for the accepted rows.
pub fn normalize_with_report(rows: &[RawRow], columns: &ColumnMap) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    for (row_index, row) in rows.iter().enumerate() {
        match normalize_row(row, columns) {
            RowOutcome::Accepted(lead) => report.records.push(lead),
            RowOutcome::Rejected(reason) => {
                debug!(row = row_index, %reason, "row rejected");
                report.rejected.push(RejectedRow { row_index, reason });
            }
        }
    }

    report
}

/// Turn one raw row into a lead or a reject reason.
pub fn normalize_row(row: &RawRow, columns: &ColumnMap) -> RowOutcome {
    let cell = |column: &str| row.get(column).map(str::trim);

    let timestamp = match cell(&columns.timestamp) {
        None | Some("") => return RowOutcome::Rejected(RejectReason::MissingTimestamp),
        Some(raw) => match parse_timestamp(raw) {
            Some(ts) => ts,
            None => return RowOutcome::Rejected(RejectReason::InvalidTimestamp(raw.to_string())),
        },
    };

    let qualification = match cell(&columns.qualification) {
        None | Some("") => return RowOutcome::Rejected(RejectReason::MissingQualification),
        Some(raw) => match Qualification::from_label(raw) {
            Some(q) => q,
            None => {
                return RowOutcome::Rejected(RejectReason::UnknownQualification(raw.to_string()))
            }
        },
    };

    RowOutcome::Accepted(NormalizedLead {
        timestamp,
        qualification,
        utm_campaign: normalize_category(cell(&columns.utm_campaign)),
        utm_source: normalize_category(cell(&columns.utm_source)),
        utm_medium: normalize_category(cell(&columns.utm_medium)),
        utm_term: normalize_category(cell(&columns.utm_term)),
        postal_code: normalize_postal_code(cell(&columns.postal_code)),
        value: parse_value(cell(&columns.value)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NOT_INFORMED;
    use rust_decimal_macros::dec;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_bad_date_dropped() {
        let rows = vec![
            row(&[
                ("data", "01/02/2024 10:15"),
                ("qualificacao", "Qualificado"),
                ("utm_campaign", "X"),
            ]),
            row(&[("data", "bad-date"), ("qualificacao", "Qualificado")]),
        ];
        let report = normalize_with_report(&rows, &ColumnMap::default());
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].utm_campaign, "X");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].row_index, 1);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::InvalidTimestamp("bad-date".into())
        );
    }

    #[test]
    fn test_unknown_qualification_dropped() {
        let rows = vec![
            row(&[("data", "01/02/2024"), ("qualificacao", "Perdido")]),
            row(&[("data", "01/02/2024"), ("qualificacao", " Convertido ")]),
            row(&[("data", "01/02/2024")]),
        ];
        let report = normalize_with_report(&rows, &ColumnMap::default());
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].qualification, Qualification::Converted);
        assert_eq!(
            report.rejected[1].reason,
            RejectReason::MissingQualification
        );
    }

    #[test]
    fn test_missing_optional_columns_defaulted() {
        let rows = vec![row(&[("data", "2024-03-04 08:00"), ("qualificacao", "Achei")])];
        let leads = normalize(&rows, &ColumnMap::default());
        assert_eq!(leads.len(), 1);
        let lead = &leads[0];
        assert_eq!(lead.utm_campaign, NOT_INFORMED);
        assert_eq!(lead.utm_source, NOT_INFORMED);
        assert_eq!(lead.utm_medium, NOT_INFORMED);
        assert_eq!(lead.utm_term, NOT_INFORMED);
        assert_eq!(lead.postal_code, NOT_INFORMED);
        assert_eq!(lead.value, dec!(0));
    }

    #[test]
    fn test_fields_trimmed_and_cleaned() {
        let rows = vec![row(&[
            ("data", "  01/02/2024 10:15  "),
            ("qualificacao", "Qualificado"),
            ("utm_source", " google "),
            ("utm_term", "None"),
            ("cep", "01310-100"),
            ("valor", "1.234,56"),
        ])];
        let lead = &normalize(&rows, &ColumnMap::default())[0];
        assert_eq!(lead.utm_source, "google");
        assert_eq!(lead.utm_term, NOT_INFORMED);
        assert_eq!(lead.postal_code, "01310100");
        assert_eq!(lead.value, dec!(1234.56));
    }

    #[test]
    fn test_custom_column_names() {
        let columns = ColumnMap {
            timestamp: "created_at".into(),
            qualification: "status".into(),
            ..ColumnMap::default()
        };
        let rows = vec![row(&[("created_at", "2024-01-01"), ("status", "Desqualificado")])];
        assert_eq!(normalize(&rows, &columns).len(), 1);
        assert!(normalize(&rows, &ColumnMap::default()).is_empty());
    }

    #[test]
    fn test_junk_cells_never_panic() {
        let timestamps = [
            "", "   ", "ção", "😀", "null", "2024-02-30", "01/02/2024 10:15",
            "01/02/2024 02:15 PM", "99999999999999999999999999999999",
        ];
        let qualifications = ["", " ", "Qualificado", "qualificado", " Achei ", "Não interagiu", "😀"];
        let values = [
            "", "79228162514264337593543950335", "999999999999999999999999999999999999",
            "-1", "1.2.3,4", ",,,", ".", "R$ 1.234,56", "ção",
        ];
        let postal_codes = ["", "🏠", "01310-100", "00000000000000000000000000000000000000"];

        let mut rows = Vec::new();
        for (i, ts) in timestamps.iter().enumerate() {
            for q in &qualifications {
                for v in &values {
                    for cep in &postal_codes {
                        let mut pairs = vec![("data", *ts), ("qualificacao", *q), ("cep", *cep)];
                        // Odd timestamp indices leave out the value column.
                        if i % 2 == 0 {
                            pairs.push(("valor", *v));
                        }
                        pairs.push(("coluna extra", "x"));
                        rows.push(row(&pairs));
                    }
                }
            }
        }
        rows.push(row(&[]));

        let report = normalize_with_report(&rows, &ColumnMap::default());
        assert_eq!(report.records.len() + report.rejected.len(), rows.len());
        assert!(!report.records.is_empty());
        for lead in &report.records {
            assert!(Qualification::ALL.contains(&lead.qualification));
            assert!(!lead.value.is_sign_negative());
            assert!(!lead.postal_code.is_empty());
        }
        assert!(report.rejected.windows(2).all(|w| w[0].row_index < w[1].row_index));
    }

    #[test]
    fn test_order_preserved() {
        let rows = vec![
            row(&[("data", "03/01/2024"), ("qualificacao", "Achei"), ("utm_campaign", "a")]),
            row(&[("data", "nope"), ("qualificacao", "Achei")]),
            row(&[("data", "01/01/2024"), ("qualificacao", "Achei"), ("utm_campaign", "b")]),
            row(&[("data", "02/01/2024"), ("qualificacao", "Achei"), ("utm_campaign", "c")]),
        ];
        let campaigns: Vec<_> = normalize(&rows, &ColumnMap::default())
            .into_iter()
            .map(|l| l.utm_campaign)
            .collect();
        assert_eq!(campaigns, vec!["a", "b", "c"]);
    }
}
