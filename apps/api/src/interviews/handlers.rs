use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::actor::Actor;
use crate::availability::handlers::parse_range;
use crate::errors::AppError;
use crate::interviews::lifecycle::{
    check_cancellable, check_feedback_allowed, listing_window, validate_feedback, FeedbackRequest,
};
use crate::interviews::repository::{self, InterviewFilter, NewInterview, Scope};
use crate::interviews::slot_lock::{self, LockOutcome};
use crate::models::interview::{InterviewRow, InterviewStatus, InterviewView};
use crate::models::submission::SubmissionStatus;
use crate::models::user::Role;
use crate::state::AppState;
use crate::submissions::lifecycle::check_schedulable;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateInterviewRequest {
    pub job_id: String,
    pub job_submission_id: i64,
    pub interviewer_user_id: i64,
    pub availability_id: i64,
}

impl CreateInterviewRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.job_id.trim().is_empty() {
            return Err(AppError::Validation("job_id is required".to_string()));
        }
        for (name, value) in [
            ("job_submission_id", self.job_submission_id),
            ("interviewer_user_id", self.interviewer_user_id),
            ("availability_id", self.availability_id),
        ] {
            if value <= 0 {
                return Err(AppError::Validation(format!("{name} must be a positive id")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InterviewListQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub job_submission_id: Option<i64>,
    pub status: Option<String>,
}

pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<InterviewStatus>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<InterviewStatus>().map_err(AppError::Validation))
        .transpose()
}

async fn schedule_in_tx(
    state: &AppState,
    actor: &Actor,
    req: &CreateInterviewRequest,
) -> Result<InterviewRow, AppError> {
    let job_id = req.job_id.trim();
    let mut tx = state.db.begin().await?;

    repository::lock_owned_job(&mut tx, actor.user_id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No job found with id {job_id}")))?;

    let submission = repository::find_submission_for_update(&mut tx, job_id, req.job_submission_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No submission {} found for job {job_id}",
                req.job_submission_id
            ))
        })?;
    let status = submission
        .status
        .parse::<SubmissionStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    check_schedulable(status)?;

    repository::find_interviewer_slot(&mut tx, req.interviewer_user_id, req.availability_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No availability {} found for interviewer {}",
                req.availability_id, req.interviewer_user_id
            ))
        })?;

    let interview = repository::insert_interview(
        &mut tx,
        NewInterview {
            job_id,
            hr_user_id: actor.user_id,
            job_submission_id: req.job_submission_id,
            interviewer_user_id: req.interviewer_user_id,
            availability_id: req.availability_id,
        },
    )
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "This slot is already booked"))?;

    repository::set_submission_status(
        &mut tx,
        req.job_submission_id,
        SubmissionStatus::InterviewScheduled,
    )
    .await?;
    tx.commit().await?;
    Ok(interview)
}

/// POST /api/interviews
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    actor.require(Role::Hr)?;
    req.validate()?;

    let lock = match slot_lock::try_acquire(
        &state.redis,
        req.availability_id,
        state.config.slot_lock_ttl_ms,
    )
    .await
    {
        Ok(LockOutcome::Acquired(lock)) => Some(lock),
        Ok(LockOutcome::Busy) => {
            return Err(AppError::Conflict(
                "This slot is being booked by someone else, try again shortly".to_string(),
            ))
        }
        Err(e) => {
            warn!("Slot lock unavailable, relying on the database alone: {e}");
            None
        }
    };

    let result = schedule_in_tx(&state, &actor, &req).await;

    if let Some(lock) = lock {
        if let Err(e) = lock.release().await {
            warn!("Failed to release slot lock for {}: {e}", req.availability_id);
        }
    }

    let interview = result?;
    info!(
        "HR {} scheduled interview {} for submission {} with interviewer {}",
        actor.user_id, interview.id, interview.job_submission_id, interview.interviewer_user_id
    );
    Ok((StatusCode::CREATED, Json(interview)))
}

/// DELETE /api/interviews/:id
pub async fn handle_cancel_interview(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    actor.require(Role::Hr)?;

    let mut tx = state.db.begin().await?;
    let interview = repository::find_scheduled_by(&mut tx, actor.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No interview found with id {id}")))?;
    let status = interview
        .status
        .parse::<InterviewStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    check_cancellable(status)?;

    repository::delete_interview(&mut tx, id).await?;
    if repository::count_for_submission(&mut tx, interview.job_submission_id).await? == 0 {
        repository::revert_to_shortlisted(&mut tx, interview.job_submission_id).await?;
    }
    tx.commit().await?;

    info!("HR {} cancelled interview {id}", actor.username);
    Ok(Json(json!({ "message": "Interview cancelled successfully" })))
}

/// GET /api/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<InterviewListQuery>,
) -> Result<Json<Vec<InterviewView>>, AppError> {
    let range = parse_range(query.from_date.as_deref(), query.to_date.as_deref())?;
    let status = parse_status_filter(query.status.as_deref())?;

    let now = Utc::now().naive_utc();
    let (from, to) = listing_window(range.from, range.to, now.date());

    let lapsed = repository::mark_lapsed(&state.db, now).await?;
    if lapsed > 0 {
        info!("Moved {lapsed} lapsed interviews to pending_feedback");
    }

    let scope = match actor.role {
        Role::Hr => Scope::ScheduledBy(actor.user_id),
        Role::Interviewer => Scope::AssignedTo(actor.user_id),
    };
    let filter = InterviewFilter {
        scope,
        from,
        to,
        job_submission_id: query.job_submission_id,
        status,
    };
    Ok(Json(repository::list_interviews(&state.db, &filter).await?))
}

/// POST /api/interviews/:id/feedback
pub async fn handle_submit_feedback(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<InterviewRow>, AppError> {
    actor.require(Role::Interviewer)?;
    let feedback = validate_feedback(&req)?;

    let mut tx = state.db.begin().await?;
    let interview = repository::find_assigned_to(&mut tx, actor.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No interview found with id {id}")))?;
    let status = interview
        .status
        .parse::<InterviewStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    check_feedback_allowed(status)?;

    let updated = repository::record_feedback(
        &mut tx,
        id,
        feedback.verdict.as_str(),
        &feedback.feedback,
    )
    .await?;
    tx.commit().await?;

    info!(
        "Interviewer {} recorded '{}' for interview {id}",
        actor.user_id,
        feedback.verdict.as_str()
    );
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use chrono::NaiveDate;
    use sqlx::PgPool;

    use crate::test_support::{
        call, insert_slot, insert_submission, interview_count, seed_pipeline, state_with_pool,
        submission_status, upcoming_date,
    };

    fn request() -> CreateInterviewRequest {
        CreateInterviewRequest {
            job_id: "JOB-1".to_string(),
            job_submission_id: 3,
            interviewer_user_id: 9,
            availability_id: 12,
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(request().validate().is_ok());

        let blank_job = CreateInterviewRequest {
            job_id: "  ".to_string(),
            ..request()
        };
        assert!(blank_job.validate().is_err());

        let missing_slot = CreateInterviewRequest {
            availability_id: 0,
            ..request()
        };
        assert!(matches!(missing_slot.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_create_request_defaults_missing_fields() {
        let req: CreateInterviewRequest = serde_json::from_str(r#"{"job_id":"JOB-1"}"#).unwrap();
        assert_eq!(req.availability_id, 0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("pending_feedback")).unwrap(),
            Some(InterviewStatus::PendingFeedback)
        );
        assert!(parse_status_filter(Some("cancelled")).is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_schedule_books_slot_and_moves_candidate(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let state = state_with_pool(pool.clone());

        let (status, body) =
            call(&state, Method::POST, "/api/interviews", Some(p.hr), Some(p.schedule_body())).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["status"], "scheduled");
        assert_eq!(body["availability_id"], p.slot_id);
        assert_eq!(submission_status(&pool, p.submission_id).await, "interview_scheduled");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_double_booking_is_conflict(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let state = state_with_pool(pool.clone());
        let (status, _) =
            call(&state, Method::POST, "/api/interviews", Some(p.hr), Some(p.schedule_body())).await;
        assert_eq!(status, StatusCode::CREATED);

        let second = insert_submission(&pool, &p.job_id, p.form_uuid, "second").await;
        let mut body = p.schedule_body();
        body["job_submission_id"] = json!(second);
        let (status, body) = call(&state, Method::POST, "/api/interviews", Some(p.hr), Some(body)).await;

        assert_eq!(status, StatusCode::CONFLICT, "{body}");
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(interview_count(&pool).await, 1);
        assert_eq!(submission_status(&pool, second).await, "shortlisted");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_cancel_returns_candidate_to_shortlist(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let state = state_with_pool(pool.clone());
        let (_, body) =
            call(&state, Method::POST, "/api/interviews", Some(p.hr), Some(p.schedule_body())).await;
        let id = body["id"].as_i64().unwrap();

        let (status, _) =
            call(&state, Method::DELETE, &format!("/api/interviews/{id}"), Some(p.hr), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(interview_count(&pool).await, 0);
        assert_eq!(submission_status(&pool, p.submission_id).await, "shortlisted");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_cancel_keeps_final_decision(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let state = state_with_pool(pool.clone());

        for (i, decision) in ["hired", "rejected"].into_iter().enumerate() {
            let candidate = insert_submission(&pool, &p.job_id, p.form_uuid, decision).await;
            let slot = insert_slot(&pool, p.interviewer, upcoming_date(), 12 + 2 * i as u32).await;
            let body = json!({
                "job_id": p.job_id,
                "job_submission_id": candidate,
                "interviewer_user_id": p.interviewer,
                "availability_id": slot,
            });
            let (status, body) = call(&state, Method::POST, "/api/interviews", Some(p.hr), Some(body)).await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            let id = body["id"].as_i64().unwrap();

            let (status, _) = call(
                &state,
                Method::PUT,
                &format!("/api/submissions/{candidate}/status"),
                Some(p.hr),
                Some(json!({ "status": decision })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);

            let (status, _) =
                call(&state, Method::DELETE, &format!("/api/interviews/{id}"), Some(p.hr), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(submission_status(&pool, candidate).await, decision);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_lapsed_interview_awaits_feedback_once(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let state = state_with_pool(pool.clone());
        let past = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
        let slot = insert_slot(&pool, p.interviewer, past, 9).await;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO interviews (job_id, hr_user_id, job_submission_id, interviewer_user_id, availability_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&p.job_id)
        .bind(p.hr)
        .bind(p.submission_id)
        .bind(p.interviewer)
        .bind(slot)
        .fetch_one(&pool)
        .await
        .unwrap();

        let (status, body) = call(
            &state,
            Method::GET,
            "/api/interviews?from_date=2020-01-01&to_date=2020-01-31",
            Some(p.interviewer),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["status"], "pending_feedback");
        assert_eq!(body[0]["candidate_name"], "candidate");

        let uri = format!("/api/interviews/{id}/feedback");
        let feedback = json!({ "verdict": "passed", "feedback": "Clear reasoning" });
        let (status, body) =
            call(&state, Method::POST, &uri, Some(p.interviewer), Some(feedback.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");

        let (status, _) = call(&state, Method::POST, &uri, Some(p.interviewer), Some(feedback)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
