//! Display formatting for listing columns.

use bucketfs_core::{Entry, EntryKind};

/// Compact byte size (e.g., "1.2K", "3.4M"). Containers show "-".
pub fn format_size(size: Option<u64>) -> String {
    match size {
        None => "-".to_string(),
        Some(bytes) if bytes >= 1_000_000_000 => format!("{:.1}G", bytes as f64 / 1e9),
        Some(bytes) if bytes >= 1_000_000 => format!("{:.1}M", bytes as f64 / 1e6),
        Some(bytes) if bytes >= 1_000 => format!("{:.1}K", bytes as f64 / 1e3),
        Some(bytes) => format!("{}B", bytes),
    }
}

/// Unix timestamp as `YYYY-MM-DD HH:MM` (UTC).
pub fn format_timestamp(timestamp: u64) -> String {
    let (year, month, day) = civil_date(timestamp / 86_400);
    let hour = (timestamp % 86_400) / 3_600;
    let minute = (timestamp % 3_600) / 60;
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        year, month, day, hour, minute
    )
}

/// Modified column text, empty when the backend reported nothing.
pub fn format_modified(entry: &Entry) -> String {
    entry.last_modified.map(format_timestamp).unwrap_or_default()
}

/// Name as shown in the list; containers get a trailing slash.
pub fn display_name(entry: &Entry) -> String {
    match entry.kind {
        EntryKind::Object => entry.name.clone(),
        EntryKind::Bucket | EntryKind::Directory => format!("{}/", entry.name),
    }
}

/// Days since the epoch to (year, month, day).
fn civil_date(days: u64) -> (i64, u32, u64) {
    let mut year = 1970i64;
    let mut remaining = days;

    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if remaining < days_in_year {
            break;
        }
        remaining -= days_in_year;
        year += 1;
    }

    let february = if is_leap_year(year) { 29 } else { 28 };
    let months = [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

    let mut month = 1;
    for days_in_month in months {
        if remaining < days_in_month {
            break;
        }
        remaining -= days_in_month;
        month += 1;
    }

    (year, month, remaining + 1)
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
