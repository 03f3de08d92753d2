use leadboard_core::config::validate_top_n;
use leadboard_core::dashboard::{build_dashboard, DashboardOptions};
use leadboard_core::error::LeadError;

use super::{FilterOverrides, Input};
use crate::output;

pub fn run(
    input: &Input,
    overrides: FilterOverrides,
    top_n: Option<usize>,
    output_format: &str,
) -> Result<(), LeadError> {
    let config = input.load_config()?;
    let mut options = DashboardOptions::from(&config);
    if let Some(n) = top_n {
        validate_top_n(n)?;
        options.top_n = n;
    }

    let source = input.open(&config);
    let dataset = leadboard_core::load_dataset(source.as_ref(), &config.columns)?;
    let filter = overrides.apply(&dataset.records);
    let report = build_dashboard(&dataset.records, &filter, &options);

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_report(&report),
    }

    Ok(())
}
