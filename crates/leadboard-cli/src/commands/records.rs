use leadboard_core::error::LeadError;
use std::path::PathBuf;

use super::Input;
use crate::output;

pub fn run(input: &Input, output_format: &str, output_file: Option<PathBuf>) -> Result<(), LeadError> {
    let config = input.load_config()?;
    let source = input.open(&config);
    let dataset = leadboard_core::load_dataset(source.as_ref(), &config.columns)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&dataset)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Loaded {} lead(s), written to {}",
                dataset.records.len(),
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&dataset)?,
            _ => output::table::print_records(&dataset.records),
        },
    }

    if dataset.rejected_count() > 0 {
        eprintln!("  {} row(s) skipped during normalization", dataset.rejected_count());
    }

    Ok(())
}
