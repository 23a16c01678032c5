use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::actor::Actor;
use crate::errors::AppError;
use crate::jobs::repository::{self, JobFilter};
use crate::jobs::validation::{optional_text, validate_job, JobRequest};
use crate::models::job::{JobRow, JobStatus};
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
    pub title: Option<String>,
}

fn parse_status(raw: &str) -> Result<JobStatus, AppError> {
    raw.parse::<JobStatus>().map_err(AppError::Validation)
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<JobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    actor.require(Role::Hr)?;
    let draft = validate_job(&req, None)?;

    let job = repository::insert_job(&state.db, actor.user_id, &draft)
        .await
        .map_err(|e| {
            AppError::conflict_on_unique(e, format!("Job {} already exists", draft.job_id))
        })?;

    info!("Job {} created by {} (user {})", job.job_id, actor.username, actor.user_id);
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/jobs/:job_id
pub async fn handle_update_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<String>,
    Json(req): Json<JobRequest>,
) -> Result<Json<JobRow>, AppError> {
    actor.require(Role::Hr)?;
    let draft = validate_job(&req, Some(&job_id))?;

    let job = repository::update_job(&state.db, actor.user_id, &draft)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job))
}

/// GET /api/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<String>,
) -> Result<Json<JobRow>, AppError> {
    actor.require(Role::Hr)?;
    let job = repository::find_owned_job(&state.db, actor.user_id, &job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job))
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    actor.require(Role::Hr)?;
    let filter = JobFilter {
        status: optional_text(query.status.as_deref())
            .map(|s| parse_status(&s))
            .transpose()?,
        title: optional_text(query.title.as_deref()),
    };
    Ok(Json(
        repository::list_jobs(&state.db, actor.user_id, &filter).await?,
    ))
}

/// GET /api/jobs/jobtitle/:jobtitle
pub async fn handle_jobs_by_title(
    State(state): State<AppState>,
    actor: Actor,
    Path(title): Path<String>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    actor.require(Role::Hr)?;
    let filter = JobFilter {
        title: Some(title.trim().to_string()),
        ..Default::default()
    };
    Ok(Json(
        repository::list_jobs(&state.db, actor.user_id, &filter).await?,
    ))
}

/// GET /api/jobs/status/:status
pub async fn handle_jobs_by_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(status): Path<String>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    actor.require(Role::Hr)?;
    let filter = JobFilter {
        status: Some(parse_status(&status)?),
        ..Default::default()
    };
    Ok(Json(
        repository::list_jobs(&state.db, actor.user_id, &filter).await?,
    ))
}

/// DELETE /api/jobs/:job_id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    actor.require(Role::Hr)?;

    let mut tx = state.db.begin().await?;
    repository::lock_owned_job_for_delete(&mut tx, actor.user_id, &job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let pending = repository::count_scheduled_interviews(&mut tx, &job_id).await?;
    if pending > 0 {
        return Err(AppError::Conflict(format!(
            "Job {job_id} has {pending} scheduled interview(s); cancel them first"
        )));
    }

    if !repository::delete_job(&mut tx, actor.user_id, &job_id).await? {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    tx.commit().await?;

    info!("Job {job_id} deleted by {} (user {})", actor.username, actor.user_id);
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use sqlx::PgPool;

    use crate::test_support::{call, interview_count, seed_pipeline, state_with_pool};

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_job_with_scheduled_interview_is_kept(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let state = state_with_pool(pool.clone());
        let (_, body) =
            call(&state, Method::POST, "/api/interviews", Some(p.hr), Some(p.schedule_body())).await;
        let interview_id = body["id"].as_i64().unwrap();
        let job_uri = format!("/api/jobs/{}", p.job_id);

        let (status, body) = call(&state, Method::DELETE, &job_uri, Some(p.hr), None).await;
        assert_eq!(status, StatusCode::CONFLICT, "{body}");
        assert_eq!(interview_count(&pool).await, 1);

        let (status, _) = call(
            &state,
            Method::DELETE,
            &format!("/api/interviews/{interview_id}"),
            Some(p.hr),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&state, Method::DELETE, &job_uri, Some(p.hr), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&state, Method::GET, &job_uri, Some(p.hr), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_other_owner_cannot_delete_job(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let other = crate::test_support::insert_user(&pool, "other-recruiter", "HR").await;
        let state = state_with_pool(pool.clone());

        let (status, _) =
            call(&state, Method::DELETE, &format!("/api/jobs/{}", p.job_id), Some(other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
