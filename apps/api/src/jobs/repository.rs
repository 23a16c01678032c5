use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::jobs::validation::JobDraft;
use crate::models::job::{JobRow, JobStatus};

/// Optional filters for the owner's job list.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub title: Option<String>,
}

pub async fn insert_job(pool: &PgPool, user_id: i64, draft: &JobDraft) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (job_id, user_id, job_title, job_description, job_status,
             skills_required, location, experience, additional_info)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&draft.job_id)
    .bind(user_id)
    .bind(&draft.job_title)
    .bind(&draft.job_description)
    .bind(draft.job_status.as_str())
    .bind(&draft.skills_required)
    .bind(&draft.location)
    .bind(&draft.experience)
    .bind(&draft.additional_info)
    .fetch_one(pool)
    .await
}

/// Updates an owned job. Returns `None` when the job does not exist for this owner.
pub async fn update_job(
    pool: &PgPool,
    user_id: i64,
    draft: &JobDraft,
) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET job_title = $3, job_description = $4, job_status = $5,
            skills_required = $6, location = $7, experience = $8,
            additional_info = $9, updated_at = NOW()
        WHERE job_id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(&draft.job_id)
    .bind(user_id)
    .bind(&draft.job_title)
    .bind(&draft.job_description)
    .bind(draft.job_status.as_str())
    .bind(&draft.skills_required)
    .bind(&draft.location)
    .bind(&draft.experience)
    .bind(&draft.additional_info)
    .fetch_optional(pool)
    .await
}

pub async fn find_owned_job(
    pool: &PgPool,
    user_id: i64,
    job_id: &str,
) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = $1 AND user_id = $2")
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_job(pool: &PgPool, job_id: &str) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_jobs(
    pool: &PgPool,
    user_id: i64,
    filter: &JobFilter,
) -> Result<Vec<JobRow>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM jobs WHERE user_id = ");
    qb.push_bind(user_id);

    if let Some(status) = filter.status {
        qb.push(" AND job_status = ").push_bind(status.as_str());
    }
    if let Some(title) = &filter.title {
        qb.push(" AND job_title ILIKE ")
            .push_bind(format!("%{}%", escape_like(title)));
    }
    qb.push(" ORDER BY created_at DESC");

    qb.build_query_as::<JobRow>().fetch_all(pool).await
}

/// Owned job row, locked against concurrent scheduling until the transaction ends.
pub async fn lock_owned_job_for_delete(
    conn: &mut PgConnection,
    user_id: i64,
    job_id: &str,
) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE job_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// Counts interviews of a job that are still waiting to happen.
pub async fn count_scheduled_interviews(
    conn: &mut PgConnection,
    job_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM interviews WHERE job_id = $1 AND status = 'scheduled'",
    )
    .bind(job_id)
    .fetch_one(conn)
    .await
}

/// Deletes an owned job. Forms, submissions and past interviews cascade.
pub async fn delete_job(
    conn: &mut PgConnection,
    user_id: i64,
    job_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM jobs WHERE job_id = $1 AND user_id = $2")
        .bind(job_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Escapes `%`, `_` and `\` so user text matches literally inside ILIKE.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
