use leadboard_core::aggregate::{PivotTable, QualificationSummary};
use leadboard_core::dashboard::DashboardReport;
use leadboard_core::model::LeadRecord;
use std::fmt;

pub fn print_records(records: &[LeadRecord]) {
    println!("{}", RecordsTable(records));
}

pub fn print_report(report: &DashboardReport) {
    println!("{}", ReportTable(report));
}

/// Fixed-width listing of lead records.
pub struct RecordsTable<'a>(pub &'a [LeadRecord]);

impl fmt::Display for RecordsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = self.0;
        if records.is_empty() {
            return write!(f, "No leads.");
        }

        let campaign_width = records
            .iter()
            .map(|r| r.lead.utm_campaign.chars().count())
            .max()
            .unwrap_or(8)
            .max(8);

        writeln!(
            f,
            "{:<16}  {:<7}  {:>4}  {:<14}  {:<campaign_width$}  {:<10}  {:>10}",
            "Timestamp", "Day", "Hour", "Status", "Campaign", "CEP", "Value"
        )?;
        for r in records {
            let lead = &r.lead;
            writeln!(
                f,
                "{:<16}  {:<7}  {:>4}  {:<14}  {:<campaign_width$}  {:<10}  {:>10}",
                lead.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                r.weekday.label(),
                r.hour,
                lead.qualification.label(),
                lead.utm_campaign,
                lead.postal_code,
                lead.value.to_string(),
            )?;
        }
        write!(f, "\n{} lead(s)", records.len())
    }
}

/// Every dashboard section as plain-text tables.
pub struct ReportTable<'a>(pub &'a DashboardReport);

impl fmt::Display for ReportTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        let range = match (report.filter.date_from, report.filter.date_to) {
            (Some(from), Some(to)) => format!("{from} .. {to}"),
            (Some(from), None) => format!("from {from}"),
            (None, Some(to)) => format!("until {to}"),
            (None, None) => "all dates".to_string(),
        };
        writeln!(f, "=== Leads ({range}) ===\n")?;
        write_summary(f, &report.summary)?;

        writeln!(f, "=== Leads per weekday ===\n")?;
        for row in &report.weekday_totals.rows {
            let day = row.keys.first().map(String::as_str).unwrap_or("");
            writeln!(f, "  {:<8} {:>6}", day, row.count)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Weekday x hour ===\n")?;
        write_heatmap(f, &report.heatmap)?;

        writeln!(f, "=== Campaigns ===\n")?;
        write_pivot(f, &report.campaigns)?;

        if let Some(google) = &report.google {
            writeln!(f, "=== Google ===\n")?;
            write_summary(f, &google.summary)?;
            writeln!(f, "  Campaigns:\n")?;
            write_pivot(f, &google.campaigns)?;
            writeln!(f, "  Search terms:\n")?;
            write_pivot(f, &google.terms)?;
        }

        if let Some(postal) = &report.postal_codes {
            writeln!(f, "=== Top {} postal codes ===\n", postal.top_n)?;
            write_pivot(f, &postal.top)?;
            write!(f, "  ({} postal code(s) in total)", postal.table.rows.len())?;
        }

        Ok(())
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, summary: &QualificationSummary) -> fmt::Result {
    writeln!(f, "  {:<16} {:>6}", "Total", summary.total)?;
    for status in &summary.counts {
        writeln!(f, "  {:<16} {:>6}", status.qualification.label(), status.count)?;
    }
    writeln!(f)
}

fn write_heatmap(f: &mut fmt::Formatter<'_>, heatmap: &PivotTable) -> fmt::Result {
    write!(f, "  {:<8}", "")?;
    for hour in &heatmap.columns {
        write!(f, "{hour:>4}")?;
    }
    writeln!(f)?;
    for row in &heatmap.rows {
        write!(f, "  {:<8}", row.key)?;
        for value in &row.values {
            write!(f, "{:>4}", value.to_string())?;
        }
        writeln!(f)?;
    }
    writeln!(f)
}

fn write_pivot(f: &mut fmt::Formatter<'_>, table: &PivotTable) -> fmt::Result {
    if table.is_empty() {
        return writeln!(f, "  (no leads)\n");
    }

    let key_width = table
        .rows
        .iter()
        .map(|r| r.key.chars().count())
        .max()
        .unwrap_or(10)
        .max(10);
    let col_width = table
        .columns
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(6)
        .max(6);

    write!(f, "  {:<key_width$}", "")?;
    for column in &table.columns {
        write!(f, "  {column:>col_width$}")?;
    }
    writeln!(f, "  {:>col_width$}", "Total")?;

    for row in &table.rows {
        write!(f, "  {:<key_width$}", row.key)?;
        for value in &row.values {
            write!(f, "  {:>col_width$}", value.to_string())?;
        }
        writeln!(f, "  {:>col_width$}", row.total.to_string())?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadboard_core::dashboard::{build_dashboard, DashboardOptions};
    use leadboard_core::filter::LeadFilter;

    #[test]
    fn test_empty_report_renders_every_weekday() {
        let report = build_dashboard(&[], &LeadFilter::unrestricted(&[]), &DashboardOptions::default());
        let text = ReportTable(&report).to_string();
        assert!(text.contains("all dates"));
        assert!(text.contains("Segunda"));
        assert!(text.contains("Domingo"));
        assert!(text.contains("(no leads)"));
        assert!(!text.contains("=== Google ==="));
    }

    #[test]
    fn test_no_records() {
        assert_eq!(RecordsTable(&[]).to_string(), "No leads.");
    }
}
