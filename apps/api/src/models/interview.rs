use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: i64,
    pub job_id: String,
    pub hr_user_id: i64,
    pub job_submission_id: i64,
    pub interviewer_user_id: i64,
    pub availability_id: i64,
    pub feedback: Option<String>,
    pub verdict: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Interview joined with its slot, candidate and interviewer for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewView {
    pub id: i64,
    pub job_id: String,
    pub hr_user_id: i64,
    pub job_submission_id: i64,
    pub interviewer_user_id: i64,
    pub interviewer_username: String,
    pub availability_id: i64,
    pub date: NaiveDate,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    pub candidate_name: String,
    pub candidate_email: String,
    pub feedback: Option<String>,
    pub verdict: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    PendingFeedback,
    Completed,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::PendingFeedback => "pending_feedback",
            InterviewStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "pending_feedback" => Ok(InterviewStatus::PendingFeedback),
            "completed" => Ok(InterviewStatus::Completed),
            other => Err(format!("unknown interview status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Passed => "passed",
            Verdict::Failed => "failed",
        }
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passed" => Ok(Verdict::Passed),
            "failed" => Ok(Verdict::Failed),
            other => Err(format!("unknown verdict '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interview_status_round_trips_through_text() {
        for status in [
            InterviewStatus::Scheduled,
            InterviewStatus::PendingFeedback,
            InterviewStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<InterviewStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_verdict_rejects_free_text() {
        assert_eq!(" Passed ".parse::<Verdict>().unwrap(), Verdict::Passed);
        assert!("maybe".parse::<Verdict>().is_err());
    }
}
