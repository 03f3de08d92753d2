use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const CLOCK_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%H:%M",
    "%I:%M:%S%.f %p",
    "%I:%M:%S %p",
    "%I:%M %p",
];

const TEXTUAL_DATETIME_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
];

const TEXTUAL_DATE_FORMATS: &[&str] = &["%d %b %Y", "%d %B %Y", "%b %d, %Y", "%B %d, %Y", "%d-%b-%Y"];

/// Parse a spreadsheet timestamp cell.
///
/// Handles formats like:
/// - "01/02/2024 10:15" -> 2024-02-01 10:15 (day first)
/// - "12/25/2024 08:00" -> 2024-12-25 08:00 (month first, day first impossible)
/// - "01/02/2024 02:15 PM" -> 2024-02-01 14:15 (12-hour clock)
/// - "2024-02-01 10:15:00", "2024-02-01T10:15" (ISO)
/// - "2024-02-01T10:15:00-03:00" (RFC 3339, offset dropped)
/// - "25 Jan 2024 10:00", "Jan 25, 2024" (textual month)
///
/// Date-only inputs land on midnight. Returns None when nothing matches.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    if let Some(dt) = parse_numeric(s) {
        return Some(dt);
    }

    if let Some(dt) = TEXTUAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }

    if let Some(date) = TEXTUAL_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date.and_time(NaiveTime::MIN));
    }

    DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.naive_local())
}

/// Numeric dates separated by `/`, `-` or `.`, optionally followed by a clock
/// separated by a space or `T`.
///
/// A four-digit leading component means year first. Otherwise the date is read
/// day first and falls back to month first only when day first is not a valid
/// calendar date.
fn parse_numeric(s: &str) -> Option<NaiveDateTime> {
    let (date_part, time_part) = match s.split_once([' ', 'T']) {
        Some((d, t)) => (d, Some(t.trim())),
        None => (s, None),
    };

    let parts: Vec<&str> = date_part.split(['/', '-', '.']).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let date = if parts[0].len() == 4 {
        NaiveDate::from_ymd_opt(parts[0].parse().ok()?, parts[1].parse().ok()?, parts[2].parse().ok()?)?
    } else {
        let year = expand_year(parts[2])?;
        let first: u32 = parts[0].parse().ok()?;
        let second: u32 = parts[1].parse().ok()?;
        NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second))?
    };

    let time = match time_part {
        None | Some("") => NaiveTime::MIN,
        Some(t) => CLOCK_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(t, fmt).ok())?,
    };

    Some(date.and_time(time))
}

/// Two-digit years belong to the 2000s.
fn expand_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    match s.len() {
        2 => Some(2000 + year),
        4 => Some(year),
        _ => None,
    }
}
