//! Interview status rules.
//!
//! scheduled -> pending_feedback once the slot has ended,
//! scheduled | pending_feedback -> completed when feedback arrives.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::interview::{InterviewStatus, Verdict};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackRequest {
    pub verdict: String,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub verdict: Verdict,
    pub feedback: String,
}

pub fn validate_feedback(req: &FeedbackRequest) -> Result<Feedback, AppError> {
    let feedback = req.feedback.trim();
    if req.verdict.trim().is_empty() || feedback.is_empty() {
        return Err(AppError::Validation(
            "Both verdict and feedback are required".to_string(),
        ));
    }
    let verdict = req.verdict.parse::<Verdict>().map_err(AppError::Validation)?;
    Ok(Feedback {
        verdict,
        feedback: feedback.to_string(),
    })
}

/// Feedback is accepted once per interview.
pub fn check_feedback_allowed(status: InterviewStatus) -> Result<(), AppError> {
    match status {
        InterviewStatus::Scheduled | InterviewStatus::PendingFeedback => Ok(()),
        InterviewStatus::Completed => Err(AppError::Conflict(
            "Feedback has already been submitted for this interview".to_string(),
        )),
    }
}

/// Only interviews that have not happened yet can be called off.
pub fn check_cancellable(status: InterviewStatus) -> Result<(), AppError> {
    match status {
        InterviewStatus::Scheduled => Ok(()),
        other => Err(AppError::Conflict(format!(
            "Interview is {other} and can no longer be cancelled"
        ))),
    }
}

/// First and last day of the month containing `today`.
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today.with_day(1).unwrap_or(today);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Listing window. Falls back to the current month unless both bounds are given.
pub fn listing_window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    match (from, to) {
        (Some(from), Some(to)) => (from, to),
        _ => month_bounds(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_feedback_validation() {
        let ok = validate_feedback(&FeedbackRequest {
            verdict: "passed".to_string(),
            feedback: "  Strong systems design ".to_string(),
        })
        .unwrap();
        assert_eq!(ok.verdict, Verdict::Passed);
        assert_eq!(ok.feedback, "Strong systems design");

        assert!(validate_feedback(&FeedbackRequest::default()).is_err());
        assert!(validate_feedback(&FeedbackRequest {
            verdict: "great".to_string(),
            feedback: "x".to_string(),
        })
        .is_err());
    }

    #[test]
    fn test_feedback_once() {
        assert!(check_feedback_allowed(InterviewStatus::Scheduled).is_ok());
        assert!(check_feedback_allowed(InterviewStatus::PendingFeedback).is_ok());
        assert!(matches!(
            check_feedback_allowed(InterviewStatus::Completed),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_only_scheduled_cancellable() {
        assert!(check_cancellable(InterviewStatus::Scheduled).is_ok());
        assert!(check_cancellable(InterviewStatus::PendingFeedback).is_err());
        assert!(check_cancellable(InterviewStatus::Completed).is_err());
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(date(2025, 2, 14)), (date(2025, 2, 1), date(2025, 2, 28)));
        assert_eq!(month_bounds(date(2024, 2, 29)), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(month_bounds(date(2025, 12, 31)), (date(2025, 12, 1), date(2025, 12, 31)));
    }

    #[test]
    fn test_listing_window_needs_both_bounds() {
        let today = date(2025, 4, 15);
        assert_eq!(
            listing_window(Some(date(2025, 1, 1)), Some(date(2025, 6, 30)), today),
            (date(2025, 1, 1), date(2025, 6, 30))
        );
        assert_eq!(
            listing_window(Some(date(2025, 1, 1)), None, today),
            (date(2025, 4, 1), date(2025, 4, 30))
        );
    }
}
