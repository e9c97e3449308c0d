//! Date and time formatting in the Indonesian locale (`id-ID`)
//!
//! - long date: `Kamis, 15 Oktober 2026`
//! - chart label: `14.05`
//! - history timestamp: `15/10/2026, 14.05.09`

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};

const WEEKDAYS: [&str; 7] = [
    "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu",
];

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Placeholder label for unparsable timestamps
pub const UNKNOWN_TIME: &str = "--.--";

/// `Kamis, 15 Oktober 2026`
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {} {}",
        WEEKDAYS[date.weekday().num_days_from_monday() as usize],
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Today's long date in local time
pub fn today() -> String {
    long_date(Local::now().date_naive())
}

/// Hour and minute, used as chart labels
pub fn time_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H.%M").to_string()
}

/// Full local timestamp for history rows
pub fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d/%m/%Y, %H.%M.%S").to_string()
}

/// Parse a stored `created_at`; naive timestamps are taken as local time
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Local));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Chart label for a stored `created_at`
pub fn label_for(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|at| time_label(&at))
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// Display timestamp for a stored `created_at`, raw text when unparsable
pub fn display_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|at| timestamp(&at))
        .unwrap_or_else(|| raw.to_string())
}
