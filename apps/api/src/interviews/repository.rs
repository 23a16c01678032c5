use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::models::availability::AvailabilityRow;
use crate::models::interview::{InterviewRow, InterviewStatus, InterviewView};
use crate::models::job::JobRow;
use crate::models::submission::{JobSubmissionRow, SubmissionStatus};

const VIEW_SELECT: &str = r#"
    SELECT i.id, i.job_id, i.hr_user_id, i.job_submission_id, i.interviewer_user_id,
           u.username AS interviewer_username, i.availability_id,
           a.date, a.from_time, a.to_time,
           s.username AS candidate_name, s.email AS candidate_email,
           i.feedback, i.verdict, i.status, i.created_at, i.updated_at
    FROM interviews i
    JOIN availabilities a ON a.id = i.availability_id
    JOIN job_submissions s ON s.id = i.job_submission_id
    JOIN users u ON u.id = i.interviewer_user_id
"#;

/// Whose interviews a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    ScheduledBy(i64),
    AssignedTo(i64),
}

#[derive(Debug, Clone)]
pub struct InterviewFilter {
    pub scope: Scope,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub job_submission_id: Option<i64>,
    pub status: Option<InterviewStatus>,
}

pub async fn lock_owned_job(
    conn: &mut PgConnection,
    user_id: i64,
    job_id: &str,
) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE job_id = $1 AND user_id = $2 FOR SHARE",
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

pub async fn find_submission_for_update(
    conn: &mut PgConnection,
    job_id: &str,
    submission_id: i64,
) -> Result<Option<JobSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobSubmissionRow>(
        "SELECT * FROM job_submissions WHERE id = $1 AND job_id = $2 FOR UPDATE",
    )
    .bind(submission_id)
    .bind(job_id)
    .fetch_optional(conn)
    .await
}

/// Slot owned by `interviewer_user_id`, provided that user is an interviewer.
pub async fn find_interviewer_slot(
    conn: &mut PgConnection,
    interviewer_user_id: i64,
    slot_id: i64,
) -> Result<Option<AvailabilityRow>, sqlx::Error> {
    sqlx::query_as::<_, AvailabilityRow>(
        r#"
        SELECT a.* FROM availabilities a
        JOIN users u ON u.id = a.user_id
        WHERE a.id = $1 AND a.user_id = $2 AND u.role = 'INTERVIEWER'
        FOR SHARE OF a
        "#,
    )
    .bind(slot_id)
    .bind(interviewer_user_id)
    .fetch_optional(conn)
    .await
}

pub struct NewInterview<'a> {
    pub job_id: &'a str,
    pub hr_user_id: i64,
    pub job_submission_id: i64,
    pub interviewer_user_id: i64,
    pub availability_id: i64,
}

pub async fn insert_interview(
    conn: &mut PgConnection,
    new: NewInterview<'_>,
) -> Result<InterviewRow, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews
            (job_id, hr_user_id, job_submission_id, interviewer_user_id, availability_id, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(new.job_id)
    .bind(new.hr_user_id)
    .bind(new.job_submission_id)
    .bind(new.interviewer_user_id)
    .bind(new.availability_id)
    .bind(InterviewStatus::Scheduled.as_str())
    .fetch_one(conn)
    .await
}

pub async fn set_submission_status(
    conn: &mut PgConnection,
    submission_id: i64,
    status: SubmissionStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE job_submissions SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status.as_str())
        .bind(submission_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Puts a candidate back on the shortlist after their last interview is called off.
/// Decisions already taken (`rejected`, `hired`) are left alone.
pub async fn revert_to_shortlisted(
    conn: &mut PgConnection,
    submission_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE job_submissions
        SET status = $1, updated_at = NOW()
        WHERE id = $2 AND status = $3
        "#,
    )
    .bind(SubmissionStatus::Shortlisted.as_str())
    .bind(submission_id)
    .bind(SubmissionStatus::InterviewScheduled.as_str())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_scheduled_by(
    conn: &mut PgConnection,
    hr_user_id: i64,
    interview_id: i64,
) -> Result<Option<InterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE id = $1 AND hr_user_id = $2 FOR UPDATE",
    )
    .bind(interview_id)
    .bind(hr_user_id)
    .fetch_optional(conn)
    .await
}

pub async fn find_assigned_to(
    conn: &mut PgConnection,
    interviewer_user_id: i64,
    interview_id: i64,
) -> Result<Option<InterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE id = $1 AND interviewer_user_id = $2 FOR UPDATE",
    )
    .bind(interview_id)
    .bind(interviewer_user_id)
    .fetch_optional(conn)
    .await
}

pub async fn delete_interview(conn: &mut PgConnection, interview_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM interviews WHERE id = $1")
        .bind(interview_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn count_for_submission(
    conn: &mut PgConnection,
    submission_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM interviews WHERE job_submission_id = $1")
        .bind(submission_id)
        .fetch_one(conn)
        .await
}

pub async fn record_feedback(
    conn: &mut PgConnection,
    interview_id: i64,
    verdict: &str,
    feedback: &str,
) -> Result<InterviewRow, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>(
        r#"
        UPDATE interviews
        SET verdict = $1, feedback = $2, status = $3, updated_at = NOW()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(verdict)
    .bind(feedback)
    .bind(InterviewStatus::Completed.as_str())
    .bind(interview_id)
    .fetch_one(conn)
    .await
}

/// Moves scheduled interviews whose slot ended before `now` to pending_feedback.
pub async fn mark_lapsed(pool: &PgPool, now: NaiveDateTime) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE interviews i
        SET status = $1, updated_at = NOW()
        FROM availabilities a
        WHERE a.id = i.availability_id
          AND i.status = $2
          AND (a.date + a.to_time) < $3
        "#,
    )
    .bind(InterviewStatus::PendingFeedback.as_str())
    .bind(InterviewStatus::Scheduled.as_str())
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list_interviews(
    pool: &PgPool,
    filter: &InterviewFilter,
) -> Result<Vec<InterviewView>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(VIEW_SELECT);
    match filter.scope {
        Scope::ScheduledBy(id) => qb.push(" WHERE i.hr_user_id = ").push_bind(id),
        Scope::AssignedTo(id) => qb.push(" WHERE i.interviewer_user_id = ").push_bind(id),
    };
    qb.push(" AND a.date >= ").push_bind(filter.from);
    qb.push(" AND a.date <= ").push_bind(filter.to);
    if let Some(submission_id) = filter.job_submission_id {
        qb.push(" AND i.job_submission_id = ").push_bind(submission_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND i.status = ").push_bind(status.as_str());
    }
    qb.push(" ORDER BY a.date, a.from_time, i.id");

    qb.build_query_as::<InterviewView>().fetch_all(pool).await
}
