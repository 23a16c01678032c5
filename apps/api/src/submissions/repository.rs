use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::submission::{JobSubmissionRow, SubmissionStatus};
use crate::submissions::listing::{DateFilter, ListOptions};

/// Fields of a new submission, already validated.
pub struct NewSubmission<'a> {
    pub form_uuid: Uuid,
    pub job_id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub form_data: &'a Value,
    pub skills: &'a [String],
    pub resume_url: &'a str,
    pub ats_score: i32,
}

pub async fn insert_submission(
    pool: &PgPool,
    new: NewSubmission<'_>,
) -> Result<JobSubmissionRow, sqlx::Error> {
    sqlx::query_as::<_, JobSubmissionRow>(
        r#"
        INSERT INTO job_submissions
            (form_uuid, job_id, username, email, form_data, skills, resume_url, ats_score, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(new.form_uuid)
    .bind(new.job_id)
    .bind(new.username)
    .bind(new.email)
    .bind(new.form_data)
    .bind(new.skills)
    .bind(new.resume_url)
    .bind(new.ats_score)
    .bind(SubmissionStatus::Applied.as_str())
    .fetch_one(pool)
    .await
}

pub async fn list_submissions(
    pool: &PgPool,
    job_id: &str,
    opts: &ListOptions,
) -> Result<Vec<JobSubmissionRow>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM job_submissions WHERE job_id = ");
    qb.push_bind(job_id);

    match opts.date {
        DateFilter::All => {}
        DateFilter::Today => {
            qb.push(" AND created_at::date = CURRENT_DATE");
        }
        DateFilter::On(day) => {
            qb.push(" AND created_at::date = ").push_bind(day);
        }
    }
    if let Some(status) = opts.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }

    qb.push(" ORDER BY ")
        .push(opts.sort.column())
        .push(" DESC, id DESC LIMIT ")
        .push_bind(opts.limit);

    qb.build_query_as::<JobSubmissionRow>().fetch_all(pool).await
}

/// Submission whose job is owned by `user_id`.
pub async fn find_owned_submission(
    pool: &PgPool,
    user_id: i64,
    submission_id: i64,
) -> Result<Option<JobSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobSubmissionRow>(
        r#"
        SELECT s.*
        FROM job_submissions s
        JOIN jobs j ON j.job_id = s.job_id
        WHERE s.id = $1 AND j.user_id = $2
        "#,
    )
    .bind(submission_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Compare-and-set on status so concurrent reviewers cannot both win.
pub async fn update_status(
    pool: &PgPool,
    submission_id: i64,
    from: &str,
    to: SubmissionStatus,
) -> Result<Option<JobSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobSubmissionRow>(
        r#"
        UPDATE job_submissions
        SET status = $3, updated_at = NOW()
        WHERE id = $1 AND status = $2
        RETURNING *
        "#,
    )
    .bind(submission_id)
    .bind(from)
    .bind(to.as_str())
    .fetch_optional(pool)
    .await
}
