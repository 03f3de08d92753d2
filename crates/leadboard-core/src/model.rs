use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Placeholder stored in categorical fields whose source cell was empty,
/// absent or a textual null.
pub const NOT_INFORMED: &str = "Não informado";

/// Funnel outcome of a lead. Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Qualification {
    #[serde(rename = "Qualificado")]
    Qualified,
    #[serde(rename = "Convertido")]
    Converted,
    #[serde(rename = "Desqualificado")]
    Disqualified,
    #[serde(rename = "Achei")]
    Achei,
    #[serde(rename = "Não interagiu")]
    NotEngaged,
}

impl Qualification {
    pub const ALL: [Qualification; 5] = [
        Qualification::Qualified,
        Qualification::Converted,
        Qualification::Disqualified,
        Qualification::Achei,
        Qualification::NotEngaged,
    ];

    /// Label as it is written in the spreadsheet.
    pub fn label(&self) -> &'static str {
        match self {
            Qualification::Qualified => "Qualificado",
            Qualification::Converted => "Convertido",
            Qualification::Disqualified => "Desqualificado",
            Qualification::Achei => "Achei",
            Qualification::NotEngaged => "Não interagiu",
        }
    }

    /// Exact match against the canonical labels. No case folding.
    pub fn from_label(s: &str) -> Option<Qualification> {
        Qualification::ALL.into_iter().find(|q| q.label() == s)
    }

    pub fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Qualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "Segunda")]
    Monday,
    #[serde(rename = "Terça")]
    Tuesday,
    #[serde(rename = "Quarta")]
    Wednesday,
    #[serde(rename = "Quinta")]
    Thursday,
    #[serde(rename = "Sexta")]
    Friday,
    #[serde(rename = "Sábado")]
    Saturday,
    #[serde(rename = "Domingo")]
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Segunda",
            Weekday::Tuesday => "Terça",
            Weekday::Wednesday => "Quarta",
            Weekday::Thursday => "Quinta",
            Weekday::Friday => "Sexta",
            Weekday::Saturday => "Sábado",
            Weekday::Sunday => "Domingo",
        }
    }

    pub fn from_chrono(day: chrono::Weekday) -> Weekday {
        // num_days_from_monday is always 0..=6
        Weekday::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One untyped spreadsheet row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        RawRow {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Every value of a worksheet as strings: the first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetValues(pub Vec<Vec<String>>);

impl SheetValues {
    pub fn new(values: Vec<Vec<String>>) -> Self {
        SheetValues(values)
    }

    pub fn header(&self) -> Option<&[String]> {
        self.0.first().map(|h| h.as_slice())
    }

    /// Number of rows after the header.
    pub fn data_row_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Key every data row by the header. Fewer than a header plus one data row
    /// means there is no data, and no rows are produced.
    ///
    /// Cells past the end of the header are ignored; short rows simply lack
    /// the trailing columns.
    pub fn to_raw_rows(&self) -> Vec<RawRow> {
        if self.0.len() < 2 {
            return Vec::new();
        }
        let header = &self.0[0];
        self.0[1..]
            .iter()
            .map(|row| {
                RawRow::from_pairs(
                    header
                        .iter()
                        .zip(row.iter())
                        .map(|(name, value)| (name.trim().to_string(), value.clone())),
                )
            })
            .collect()
    }
}

/// A lead that passed the normalizer: typed, with every field present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLead {
    pub timestamp: NaiveDateTime,
    pub qualification: Qualification,
    pub utm_campaign: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_term: String,
    pub postal_code: String,
    pub value: Decimal,
}

impl NormalizedLead {
    pub fn has_postal_code(&self) -> bool {
        self.postal_code != NOT_INFORMED
    }
}

impl AsRef<NormalizedLead> for NormalizedLead {
    fn as_ref(&self) -> &NormalizedLead {
        self
    }
}

/// A normalized lead plus its calendar features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(flatten)]
    pub lead: NormalizedLead,
    pub weekday: Weekday,
    pub hour: u32,
}

impl AsRef<NormalizedLead> for LeadRecord {
    fn as_ref(&self) -> &NormalizedLead {
        &self.lead
    }
}
