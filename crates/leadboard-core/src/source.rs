use std::io::Cursor;
use std::path::PathBuf;

use calamine::{Reader, Xlsx};

use crate::error::LeadError;
use crate::model::SheetValues;

/// Trait for spreadsheet backends that hand over every cell as text.
pub trait LeadSource: Send + Sync {
    /// Fetch header plus data rows. Unreachable or unreadable sources are
    /// `LeadError::SourceUnavailable`; an empty sheet is `Ok` with no rows.
    fn fetch(&self) -> Result<SheetValues, LeadError>;

    /// Name of this source (for diagnostics).
    fn name(&self) -> &str;
}

impl<S: LeadSource + ?Sized> LeadSource for Box<S> {
    fn fetch(&self) -> Result<SheetValues, LeadError> {
        (**self).fetch()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Worksheet of an xlsx workbook on disk.
pub struct XlsxSource {
    path: PathBuf,
    sheet_name: String,
    display_name: String,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        let path = path.into();
        let sheet_name = sheet_name.into();
        let display_name = format!("{}#{}", path.display(), sheet_name);
        XlsxSource {
            path,
            sheet_name,
            display_name,
        }
    }
}

impl LeadSource for XlsxSource {
    fn fetch(&self) -> Result<SheetValues, LeadError> {
        let bytes = std::fs::read(&self.path).map_err(|e| LeadError::unavailable(self.name(), e))?;
        parse_xlsx_values(&bytes, &self.sheet_name).map_err(|reason| LeadError::unavailable(self.name(), reason))
    }

    fn name(&self) -> &str {
        &self.display_name
    }
}

/// Read every cell of `sheet_name` as text.
pub fn parse_xlsx_values(bytes: &[u8], sheet_name: &str) -> Result<SheetValues, String> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> =
        calamine::open_workbook_from_rs(cursor).map_err(|e| format!("failed to open xlsx: {e}"))?;

    let sheet = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| format!("sheet '{sheet_name}' not found: {e}"))?;

    let values = sheet
        .rows()
        .map(|row| row.iter().map(cell_as_string).collect())
        .collect();

    Ok(SheetValues::new(values))
}

fn cell_as_string(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::String(s) => s.clone(),
        // Display for f64 drops the ".0" of whole numbers, so postal codes
        // typed as numbers come out as plain digits.
        calamine::Data::Float(f) => f.to_string(),
        calamine::Data::Int(i) => i.to_string(),
        calamine::Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| format!("{cell}")),
        calamine::Data::DateTimeIso(s) => s.clone(),
        calamine::Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}

/// JSON file holding an array of string arrays, header first.
pub struct JsonValuesSource {
    path: PathBuf,
    display_name: String,
}

impl JsonValuesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display_name = path.display().to_string();
        JsonValuesSource { path, display_name }
    }
}

impl LeadSource for JsonValuesSource {
    fn fetch(&self) -> Result<SheetValues, LeadError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| LeadError::unavailable(self.name(), e))?;
        serde_json::from_str(&content).map_err(|e| LeadError::unavailable(self.name(), e))
    }

    fn name(&self) -> &str {
        &self.display_name
    }
}

/// Values held in memory.
pub struct StaticSource {
    name: String,
    values: SheetValues,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, values: SheetValues) -> Self {
        StaticSource {
            name: name.into(),
            values,
        }
    }
}

impl LeadSource for StaticSource {
    fn fetch(&self) -> Result<SheetValues, LeadError> {
        Ok(self.values.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
