use leadboard_core::error::LeadError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), LeadError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
