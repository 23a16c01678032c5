//! Candidate status rules and ATS scoring.

use crate::errors::AppError;
use crate::models::submission::SubmissionStatus;

const ATS_BASE_SCORE: i32 = 70;
const ATS_POINTS_PER_SKILL: i32 = 5;
const ATS_MAX_SCORE: i32 = 100;

/// Score recorded when a candidate applies: a base plus a fixed amount per
/// declared skill, capped at 100.
pub fn ats_score(skill_count: usize) -> i32 {
    let skills = i32::try_from(skill_count).unwrap_or(i32::MAX);
    ATS_BASE_SCORE
        .saturating_add(skills.saturating_mul(ATS_POINTS_PER_SKILL))
        .min(ATS_MAX_SCORE)
}

/// Statuses HR may move a submission to by hand from `from`.
/// `InterviewScheduled` is only ever set by booking an interview.
pub fn manual_targets(from: SubmissionStatus) -> &'static [SubmissionStatus] {
    use SubmissionStatus::*;
    match from {
        Applied => &[UnderReview, Shortlisted, Rejected],
        UnderReview => &[Shortlisted, Rejected],
        Shortlisted => &[Rejected],
        InterviewScheduled => &[Shortlisted, Rejected, Hired],
        Rejected | Hired => &[],
    }
}

/// Checks a manual status change. Returns `Ok(false)` for a no-op.
pub fn check_manual_transition(
    from: SubmissionStatus,
    to: SubmissionStatus,
) -> Result<bool, AppError> {
    if from == to {
        return Ok(false);
    }
    if manual_targets(from).contains(&to) {
        Ok(true)
    } else {
        Err(AppError::Conflict(format!(
            "Cannot move a submission from {from} to {to}"
        )))
    }
}

/// Checks that an interview may be booked for a submission in `status`.
pub fn check_schedulable(status: SubmissionStatus) -> Result<(), AppError> {
    if status.is_terminal() {
        Err(AppError::Conflict(format!(
            "Submission is {status}; no further interviews can be scheduled"
        )))
    } else {
        Ok(())
    }
}
