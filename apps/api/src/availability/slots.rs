//! Slot window rules.
//!
//! Slots are half-open `[from, to)` windows on a single date, at most an
//! hour long. Two slots that merely touch (10:00-11:00, 11:00-12:00) do not
//! overlap.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::errors::AppError;

pub const MAX_SLOT_MINUTES: i64 = 60;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SlotRequest {
    pub date: String,
    pub from_time: String,
    pub to_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub date: NaiveDate,
    pub from: NaiveTime,
    pub to: NaiveTime,
}

impl SlotWindow {
    pub fn overlaps(&self, other: &SlotWindow) -> bool {
        self.date == other.date && self.from < other.to && other.from < self.to
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AppError::Validation(format!("Invalid time '{raw}', expected HH:MM")))
}

pub fn validate_slot(req: &SlotRequest) -> Result<SlotWindow, AppError> {
    let date = parse_date(&req.date)?;
    let from = parse_time(&req.from_time)?;
    let to = parse_time(&req.to_time)?;

    if to <= from {
        return Err(AppError::Validation(
            "to_time must be after from_time".to_string(),
        ));
    }
    if to - from > Duration::minutes(MAX_SLOT_MINUTES) {
        return Err(AppError::Validation(
            "Time slot cannot be more than one hour".to_string(),
        ));
    }

    Ok(SlotWindow { date, from, to })
}

/// First existing slot that clashes with `candidate`, if any.
pub fn find_overlap<'a>(candidate: &SlotWindow, existing: &'a [SlotWindow]) -> Option<&'a SlotWindow> {
    existing.iter().find(|slot| slot.overlaps(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(date: &str, from: &str, to: &str) -> SlotRequest {
        SlotRequest {
            date: date.to_string(),
            from_time: from.to_string(),
            to_time: to.to_string(),
        }
    }

    fn window(from: &str, to: &str) -> SlotWindow {
        validate_slot(&req("2025-04-01", from, to)).unwrap()
    }

    #[test]
    fn test_accepts_both_time_formats() {
        let w = validate_slot(&req("2025-04-01", "10:00", "10:30:00")).unwrap();
        assert_eq!(w.from, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(w.to, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn test_exactly_one_hour_is_allowed() {
        assert!(validate_slot(&req("2025-04-01", "09:00", "10:00")).is_ok());
        assert!(validate_slot(&req("2025-04-01", "09:00", "10:01")).is_err());
    }

    #[test]
    fn test_end_must_follow_start() {
        assert!(validate_slot(&req("2025-04-01", "10:00", "10:00")).is_err());
        assert!(validate_slot(&req("2025-04-01", "11:00", "10:00")).is_err());
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(validate_slot(&req("04/01/2025", "10:00", "11:00")).is_err());
        assert!(validate_slot(&req("2025-04-01", "25:00", "11:00")).is_err());
        assert!(validate_slot(&req("2025-04-01", "10:61", "11:00")).is_err());
        assert!(validate_slot(&SlotRequest::default()).is_err());
    }

    #[test]
    fn test_overlap_rules() {
        let existing = vec![window("10:00", "11:00")];

        assert!(find_overlap(&window("10:30", "11:30"), &existing).is_some());
        assert!(find_overlap(&window("09:30", "10:30"), &existing).is_some());
        assert!(find_overlap(&window("10:15", "10:45"), &existing).is_some());
        assert!(find_overlap(&window("10:00", "11:00"), &existing).is_some());

        assert!(find_overlap(&window("11:00", "12:00"), &existing).is_none());
        assert!(find_overlap(&window("09:00", "10:00"), &existing).is_none());
    }

    #[test]
    fn test_different_dates_never_overlap() {
        let a = window("10:00", "11:00");
        let mut b = a;
        b.date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        assert!(!a.overlaps(&b));
    }
}
