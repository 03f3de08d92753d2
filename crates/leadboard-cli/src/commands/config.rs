use leadboard_core::config::{load_config, DashboardConfig};
use leadboard_core::error::LeadError;
use std::path::Path;

use crate::output;

pub fn show() -> Result<(), LeadError> {
    output::json::print(&DashboardConfig::default())
}

pub fn validate(file: &Path) -> Result<(), LeadError> {
    let config = load_config(file)?;
    println!("Valid config: {}", file.display());
    println!("  sheet:       {}", config.sheet_name);
    println!("  cache TTL:   {}s", config.cache_ttl_secs);
    println!("  top N:       {}", config.top_n);
    println!("  google:      {}", config.google_source);
    println!(
        "  columns:     {}, {}, {}, {}, {}, {}, {}, {}",
        config.columns.timestamp,
        config.columns.qualification,
        config.columns.utm_campaign,
        config.columns.utm_source,
        config.columns.utm_medium,
        config.columns.utm_term,
        config.columns.postal_code,
        config.columns.value
    );
    Ok(())
}
