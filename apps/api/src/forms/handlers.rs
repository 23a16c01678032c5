use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::actor::Actor;
use crate::errors::AppError;
use crate::forms::repository;
use crate::forms::validation::{validate_template, FormTemplateRequest};
use crate::jobs::repository as jobs;
use crate::models::form::{FormField, FormStatus, FormTemplateRow};
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LinkFormRequest {
    pub form_template_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FormStatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct LinkFormResponse {
    pub form_uuid: Uuid,
    pub job_id: String,
    pub form_template_id: String,
    pub status: String,
    pub share_link: String,
}

#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub job_id: String,
    pub job_title: String,
    pub job_description: String,
    pub job_status: String,
    pub skills_required: Vec<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormDetailsResponse {
    pub form_uuid: Uuid,
    pub status: String,
    pub job: JobSummary,
    pub fields: Vec<FormField>,
}

/// Link a candidate opens to reach the application page.
pub fn share_link(public_app_url: &str, form_uuid: Uuid) -> String {
    format!("{}/apply?formid={form_uuid}", public_app_url.trim_end_matches('/'))
}

/// Decodes the JSON stored in `form_templates.fields`.
pub fn decode_fields(raw: Value) -> Result<Vec<FormField>, AppError> {
    serde_json::from_value(raw)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored form fields are invalid: {e}")))
}

async fn owned_template(
    state: &AppState,
    actor: &Actor,
    form_template_id: &str,
) -> Result<FormTemplateRow, AppError> {
    repository::find_template(&state.db, actor.user_id, form_template_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form template {form_template_id} not found")))
}

/// POST /api/forms/templates
pub async fn handle_create_template(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<FormTemplateRequest>,
) -> Result<(StatusCode, Json<FormTemplateRow>), AppError> {
    actor.require(Role::Hr)?;
    let (template_id, fields) = validate_template(&req)?;
    let fields = serde_json::to_value(&fields).map_err(|e| AppError::Internal(e.into()))?;

    let template = repository::insert_template(&state.db, actor.user_id, &template_id, &fields)
        .await
        .map_err(|e| {
            AppError::conflict_on_unique(e, format!("Form template {template_id} already exists"))
        })?;

    info!("Form template {template_id} created by {} (user {})", actor.username, actor.user_id);
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/forms/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<FormTemplateRow>>, AppError> {
    actor.require(Role::Hr)?;
    Ok(Json(repository::list_templates(&state.db, actor.user_id).await?))
}

/// GET /api/forms/templates/:form_template_id
pub async fn handle_get_template(
    State(state): State<AppState>,
    actor: Actor,
    Path(form_template_id): Path<String>,
) -> Result<Json<FormTemplateRow>, AppError> {
    actor.require(Role::Hr)?;
    Ok(Json(owned_template(&state, &actor, &form_template_id).await?))
}

/// DELETE /api/forms/templates/:form_template_id
pub async fn handle_delete_template(
    State(state): State<AppState>,
    actor: Actor,
    Path(form_template_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    actor.require(Role::Hr)?;
    let template = owned_template(&state, &actor, &form_template_id).await?;

    if repository::count_forms_using_template(&state.db, template.id).await? > 0 {
        return Err(AppError::Conflict(format!(
            "Form template {form_template_id} is linked to a job"
        )));
    }
    repository::delete_template(&state.db, template.id).await?;
    Ok(Json(json!({ "message": "Form template deleted successfully" })))
}

/// POST /api/jobs/:job_id/forms
pub async fn handle_link_job_to_template(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<String>,
    Json(req): Json<LinkFormRequest>,
) -> Result<(StatusCode, Json<LinkFormResponse>), AppError> {
    actor.require(Role::Hr)?;
    jobs::find_owned_job(&state.db, actor.user_id, &job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    let template = owned_template(&state, &actor, req.form_template_id.trim()).await?;

    let form = repository::insert_application_form(&state.db, &job_id, template.id).await?;
    info!(
        "Job {job_id} linked to template {} as form {}",
        template.form_template_id, form.form_uuid
    );

    Ok((
        StatusCode::CREATED,
        Json(LinkFormResponse {
            share_link: share_link(&state.config.public_app_url, form.form_uuid),
            form_uuid: form.form_uuid,
            job_id: form.job_id,
            form_template_id: form.form_template_id,
            status: form.status,
        }),
    ))
}

/// PATCH /api/forms/:form_uuid/status
pub async fn handle_update_form_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(form_uuid): Path<Uuid>,
    Json(req): Json<FormStatusUpdate>,
) -> Result<Json<Value>, AppError> {
    actor.require(Role::Hr)?;
    let status = req.status.parse::<FormStatus>().map_err(AppError::Validation)?;
    repository::find_owned_application_form(&state.db, actor.user_id, form_uuid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {form_uuid} not found")))?;

    repository::update_form_status(&state.db, form_uuid, status).await?;
    Ok(Json(json!({ "form_uuid": form_uuid, "status": status })))
}

/// DELETE /api/forms/:form_uuid
pub async fn handle_delete_form(
    State(state): State<AppState>,
    actor: Actor,
    Path(form_uuid): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    actor.require(Role::Hr)?;
    repository::find_owned_application_form(&state.db, actor.user_id, form_uuid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {form_uuid} not found")))?;

    let mut tx = state.db.begin().await?;
    repository::lock_form_submissions(&mut tx, form_uuid).await?;
    let pending = repository::count_scheduled_interviews(&mut tx, form_uuid).await?;
    if pending > 0 {
        return Err(AppError::Conflict(format!(
            "Form {form_uuid} has {pending} scheduled interview(s); cancel them first"
        )));
    }
    repository::delete_application_form(&mut tx, form_uuid).await?;
    tx.commit().await?;

    info!("Form {form_uuid} deleted by {}", actor.username);
    Ok(Json(json!({ "message": "Form deleted successfully" })))
}

/// GET /api/forms/:form_uuid
///
/// Public: this is what the candidate's application page renders.
pub async fn handle_get_form_details(
    State(state): State<AppState>,
    Path(form_uuid): Path<Uuid>,
) -> Result<Json<FormDetailsResponse>, AppError> {
    let form = repository::find_application_form(&state.db, form_uuid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Form {form_uuid} not found")))?;
    let job = jobs::find_job(&state.db, &form.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", form.job_id)))?;
    let fields = repository::form_fields(&state.db, form_uuid)
        .await?
        .map(decode_fields)
        .transpose()?
        .unwrap_or_default();

    Ok(Json(FormDetailsResponse {
        form_uuid,
        status: form.status,
        job: JobSummary {
            job_id: job.job_id,
            job_title: job.job_title,
            job_description: job.job_description,
            job_status: job.job_status,
            skills_required: job.skills_required,
            location: job.location,
            experience: job.experience,
        },
        fields,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use sqlx::PgPool;

    use crate::test_support::{call, interview_count, seed_pipeline, state_with_pool};

    #[test]
    fn test_share_link_points_at_apply_page() {
        let id = Uuid::nil();
        assert_eq!(
            share_link("https://hireeasy.com/", id),
            "https://hireeasy.com/apply?formid=00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_decode_fields() {
        let raw = json!([{
            "question_id": "Q1",
            "question_text": "Years?",
            "question_type": "text"
        }]);
        let fields = decode_fields(raw).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields[0].options.is_empty());
        assert!(decode_fields(json!({"nope": 1})).is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_form_with_scheduled_interview_is_kept(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let state = state_with_pool(pool.clone());
        let (_, body) =
            call(&state, Method::POST, "/api/interviews", Some(p.hr), Some(p.schedule_body())).await;
        let interview_id = body["id"].as_i64().unwrap();
        let form_uri = format!("/api/forms/{}", p.form_uuid);

        let (status, _) = call(&state, Method::DELETE, &form_uri, Some(p.hr), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
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

        let (status, _) = call(&state, Method::DELETE, &form_uri, Some(p.hr), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&state, Method::GET, &form_uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
