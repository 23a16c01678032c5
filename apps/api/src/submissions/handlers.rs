use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::actor::Actor;
use crate::errors::AppError;
use crate::forms::handlers::decode_fields;
use crate::forms::repository as forms;
use crate::forms::validation::{extract_skills, validate_answers};
use crate::jobs::repository as jobs;
use crate::models::form::FormStatus;
use crate::models::submission::{JobSubmissionRow, SubmissionStatus};
use crate::models::user::Role;
use crate::state::AppState;
use crate::storage::{resume_content_type, resume_key, store_and_record};
use crate::submissions::intake::{read_multipart, validate_application};
use crate::submissions::lifecycle::{ats_score, check_manual_transition};
use crate::submissions::listing::{ListOptions, SubmissionQuery};
use crate::submissions::repository::{self, NewSubmission};

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub id: i64,
    pub ats_score: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<JobSubmissionRow>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// POST /api/forms/:form_uuid/apply
///
/// Public. Candidates have no accounts.
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(form_uuid): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let form = forms::find_application_form(&state.db, form_uuid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {form_uuid} not found")))?;
    if form.status.parse::<FormStatus>() != Ok(FormStatus::Active) {
        return Err(AppError::Conflict(
            "This application form is no longer accepting submissions".to_string(),
        ));
    }

    let raw = read_multipart(multipart).await?;
    let application = validate_application(raw, state.config.resume_max_bytes)?;

    let fields = forms::form_fields(&state.db, form_uuid)
        .await?
        .map(decode_fields)
        .transpose()?
        .unwrap_or_default();
    validate_answers(&fields, &application.answers)?;

    let skills = extract_skills(&application.answers);
    if skills.is_empty() {
        return Err(AppError::Validation("Skills are required".to_string()));
    }

    let (ext, content_type) = resume_content_type(&application.resume.file_name)?;
    let key = resume_key(&form.job_id, ext);

    let score = ats_score(skills.len());
    let form_data = Value::Object(application.answers);
    let db = &state.db;
    let job_id = form.job_id.as_str();
    let username = application.username.as_str();
    let email = application.email.as_str();
    let form_data = &form_data;
    let skills = skills.as_slice();

    let submission = store_and_record(
        state.resumes.as_ref(),
        &key,
        application.resume.bytes,
        content_type,
        |resume_url| async move {
            repository::insert_submission(
                db,
                NewSubmission {
                    form_uuid,
                    job_id,
                    username,
                    email,
                    form_data,
                    skills,
                    resume_url: &resume_url,
                    ats_score: score,
                },
            )
            .await
            .map_err(AppError::from)
        },
    )
    .await?;

    info!(
        "Submission {} received for job {} (ats score {score})",
        submission.id, submission.job_id
    );
    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            id: submission.id,
            ats_score: submission.ats_score,
            message: "Application submitted successfully".to_string(),
        }),
    ))
}

/// GET /api/jobs/:job_id/submissions
pub async fn handle_list_submissions(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<String>,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    actor.require(Role::Hr)?;
    let opts = ListOptions::from_query(&query)?;
    jobs::find_owned_job(&state.db, actor.user_id, &job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let submissions = repository::list_submissions(&state.db, &job_id, &opts).await?;
    Ok(Json(SubmissionListResponse { submissions }))
}

/// GET /api/submissions/:id
pub async fn handle_get_submission(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<JobSubmissionRow>, AppError> {
    actor.require(Role::Hr)?;
    let submission = repository::find_owned_submission(&state.db, actor.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {id} not found")))?;
    Ok(Json(submission))
}

/// PUT /api/submissions/:id/status
pub async fn handle_update_submission_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<JobSubmissionRow>, AppError> {
    actor.require(Role::Hr)?;
    let target = req
        .status
        .parse::<SubmissionStatus>()
        .map_err(AppError::Validation)?;

    let current = repository::find_owned_submission(&state.db, actor.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {id} not found")))?;
    let from = current
        .status
        .parse::<SubmissionStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Submission {id}: {e}")))?;

    if !check_manual_transition(from, target)? {
        return Ok(Json(current));
    }

    let updated = repository::update_status(&state.db, id, &current.status, target)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!("Submission {id} changed status concurrently; reload and retry"))
        })?;

    info!("Submission {id} moved from {from} to {target}");
    Ok(Json(updated))
}
