//! Display fields derived from a loosely filled [`Record`].
//!
//! Every function here is total: malformed or missing input falls back to
//! the placeholder constants instead of failing.

use crate::models::Record;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Day-group key and label for records without any usable date.
pub const UNKNOWN_DATE: &str = "Data não informada";

/// Display time for records without any usable time.
pub const TIME_PLACEHOLDER: &str = "-";

/// `date`, else the date part of `createdAt`.
pub fn display_date(record: &Record) -> Option<&str> {
    non_empty(record.date.as_deref()).or_else(|| {
        record
            .created_at
            .as_deref()
            .and_then(|stamp| stamp.split('T').next())
            .filter(|date| !date.is_empty())
    })
}

pub fn day_key(record: &Record) -> &str {
    display_date(record).unwrap_or(UNKNOWN_DATE)
}

/// `time`, else the `HH:MM` slice of `createdAt`, else [`TIME_PLACEHOLDER`].
pub fn display_time(record: &Record) -> &str {
    non_empty(record.time.as_deref())
        .or_else(|| {
            record
                .created_at
                .as_deref()
                .and_then(|stamp| stamp.get(11..16))
                .filter(|time| !time.is_empty())
        })
        .unwrap_or(TIME_PLACEHOLDER)
}

/// Point in time used for ordering. `None` when the derived date does not
/// parse; an unparseable or missing time counts as midnight.
pub fn timestamp(record: &Record) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(display_date(record)?, "%Y-%m-%d").ok()?;
    let time = parse_clock(display_time(record)).unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

/// `YYYY-MM-DD` becomes `DD/MM/YYYY`; anything else is shown verbatim.
pub fn format_day(key: &str) -> String {
    if key.is_empty() {
        return UNKNOWN_DATE.to_string();
    }

    match key.split('-').collect::<Vec<_>>().as_slice() {
        [year, month, day] => format!("{day}/{month}/{year}"),
        _ => key.to_string(),
    }
}

pub fn render_key(record: &Record, index: usize) -> String {
    match &record.id {
        Some(id) => id.clone(),
        None => format!("{}-{}-{index}", display_date(record).unwrap_or_default(), display_time(record)),
    }
}

pub fn format_measure(value: Option<f64>) -> String {
    match value {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", value as i64),
        Some(value) => value.to_string(),
        None => TIME_PLACEHOLDER.to_string(),
    }
}

fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: Option<&str>, time: Option<&str>, created_at: Option<&str>) -> Record {
        Record {
            date: date.map(str::to_string),
            time: time.map(str::to_string),
            created_at: created_at.map(str::to_string),
            ..Record::default()
        }
    }

    #[test]
    fn created_at_fills_missing_date_and_time() {
        let item = record(None, None, Some("2025-06-12T08:30:00Z"));
        assert_eq!(display_date(&item), Some("2025-06-12"));
        assert_eq!(display_time(&item), "08:30");
        assert_eq!(
            timestamp(&item),
            NaiveDate::from_ymd_opt(2025, 6, 12).unwrap().and_hms_opt(8, 30, 0)
        );
    }

    #[test]
    fn explicit_fields_win_over_created_at() {
        let item = record(Some("2025-06-10"), Some("07:45"), Some("2025-06-12T08:30:00Z"));
        assert_eq!(display_date(&item), Some("2025-06-10"));
        assert_eq!(display_time(&item), "07:45");
    }

    #[test]
    fn missing_everything_lands_in_unknown_bucket() {
        let item = Record::default();
        assert_eq!(day_key(&item), UNKNOWN_DATE);
        assert_eq!(display_time(&item), TIME_PLACEHOLDER);
        assert_eq!(timestamp(&item), None);
    }

    #[test]
    fn short_created_at_does_not_panic() {
        let item = record(None, None, Some("2025"));
        assert_eq!(display_date(&item), Some("2025"));
        assert_eq!(display_time(&item), TIME_PLACEHOLDER);
        assert_eq!(timestamp(&item), None);

        let multibyte = record(None, None, Some("ééééééééé:ab"));
        assert_eq!(display_time(&multibyte), TIME_PLACEHOLDER);
    }

    #[test]
    fn missing_time_sorts_as_midnight() {
        let item = record(Some("2025-06-10"), None, None);
        assert_eq!(
            timestamp(&item),
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn format_day_reorders_iso_dates() {
        assert_eq!(format_day("2025-06-12"), "12/06/2025");
        assert_eq!(format_day(UNKNOWN_DATE), UNKNOWN_DATE);
        assert_eq!(format_day(""), UNKNOWN_DATE);
        assert_eq!(format_day("june"), "june");
    }

    #[test]
    fn render_key_prefers_id() {
        let mut item = record(Some("2025-06-10"), Some("08:00"), None);
        assert_eq!(render_key(&item, 3), "2025-06-10-08:00-3");
        item.id = Some("r1".to_string());
        assert_eq!(render_key(&item, 3), "r1");
    }

    #[test]
    fn format_measure_drops_integral_fraction() {
        assert_eq!(format_measure(Some(110.0)), "110");
        assert_eq!(format_measure(Some(95.5)), "95.5");
        assert_eq!(format_measure(None), "-");
    }
}
