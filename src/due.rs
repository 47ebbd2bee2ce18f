//! Due date parsing for the command line.
//!
//! The backend takes the `YYYY-MM-DDTHH:MM` date-time-local form the page's
//! date picker produces. The CLI accepts a few friendlier spellings and
//! normalises them to that form. Inputs without a time of day are due at the
//! end of that day.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parse a due date relative to the local current date.
pub fn parse_due_input(s: &str) -> Option<String> {
    parse_due_at(s, Local::now().date_naive())
}

/// Parse a due date relative to `today`.
pub fn parse_due_at(s: &str, today: NaiveDate) -> Option<String> {
    let s = s.trim();
    for format in [WIRE_FORMAT, "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.format(WIRE_FORMAT).to_string());
        }
    }
    let s = s.to_lowercase();

    let date = match s.as_str() {
        "today" => Some(today),
        "tomorrow" => today.succ_opt(),
        _ => None,
    }
    .or_else(|| {
        let rest = s.strip_prefix("in ")?;
        let offset = if let Some(days) = rest.strip_suffix('d') {
            TimeDelta::try_days(days.trim().parse().ok()?)?
        } else {
            TimeDelta::try_weeks(rest.strip_suffix('w')?.trim().parse().ok()?)?
        };
        // Offsets past chrono's date range are rejected, not wrapped.
        today.checked_add_signed(offset)
    })
    .or_else(|| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())?;

    let end_of_day = NaiveTime::from_hms_opt(23, 59, 0)?;
    Some(date.and_time(end_of_day).format(WIRE_FORMAT).to_string())
}

/// clap value parser for `--due`.
pub fn due_arg(s: &str) -> Result<String, String> {
    parse_due_input(s).ok_or_else(|| {
        format!("invalid due date {:?}: use YYYY-MM-DDTHH:MM, YYYY-MM-DD, today, tomorrow or \"in Nd\"", s)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 30).unwrap()
    }

    #[test]
    fn test_datetime_forms_keep_time() {
        assert_eq!(parse_due_at("2025-03-01T09:30", today()).as_deref(), Some("2025-03-01T09:30"));
        assert_eq!(parse_due_at("2025-03-01 09:30", today()).as_deref(), Some("2025-03-01T09:30"));
        assert_eq!(parse_due_at("2025-03-01T09:30:45", today()).as_deref(), Some("2025-03-01T09:30"));
    }

    #[test]
    fn test_date_forms_are_due_end_of_day() {
        assert_eq!(parse_due_at("2025-03-01", today()).as_deref(), Some("2025-03-01T23:59"));
        assert_eq!(parse_due_at("Today", today()).as_deref(), Some("2025-01-30T23:59"));
        assert_eq!(parse_due_at("tomorrow", today()).as_deref(), Some("2025-01-31T23:59"));
        assert_eq!(parse_due_at("in 3d", today()).as_deref(), Some("2025-02-02T23:59"));
        assert_eq!(parse_due_at("in 1w", today()).as_deref(), Some("2025-02-06T23:59"));
    }

    #[test]
    fn test_rejects_offsets_out_of_range() {
        assert_eq!(parse_due_at("in 99999999d", today()), None);
        assert_eq!(parse_due_at("in 9999999999999999d", today()), None);
        assert_eq!(parse_due_at("in 99999999w", today()), None);
        assert!(due_arg("in 9999999999999999d").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_due_at("soonish", today()), None);
        assert_eq!(parse_due_at("2025-13-01", today()), None);
        assert!(due_arg("in xd").is_err());
    }
}
