use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A candidate's application against a job. Candidates have no accounts,
/// so the submission carries their name and email directly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSubmissionRow {
    pub id: i64,
    pub form_uuid: Uuid,
    pub job_id: String,
    pub username: String,
    pub email: String,
    pub form_data: Value,
    pub skills: Vec<String>,
    pub resume_url: String,
    pub ats_score: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Applied,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    Rejected,
    Hired,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Applied => "applied",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::Shortlisted => "shortlisted",
            SubmissionStatus::InterviewScheduled => "interview_scheduled",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Hired => "hired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Rejected | SubmissionStatus::Hired)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // Older rows were written as "pending" before the vocabulary settled.
            "applied" | "pending" => Ok(SubmissionStatus::Applied),
            "under_review" => Ok(SubmissionStatus::UnderReview),
            "shortlisted" => Ok(SubmissionStatus::Shortlisted),
            "interview_scheduled" => Ok(SubmissionStatus::InterviewScheduled),
            "rejected" => Ok(SubmissionStatus::Rejected),
            "hired" => Ok(SubmissionStatus::Hired),
            other => Err(format!("unknown submission status '{other}'")),
        }
    }
}
