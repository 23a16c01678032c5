pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::availability::handlers as availability;
use crate::forms::handlers as forms;
use crate::interviews::handlers as interviews;
use crate::jobs::handlers as jobs;
use crate::profiles::handlers as profiles;
use crate::state::AppState;
use crate::submissions::handlers as submissions;

/// Room for the non-file multipart fields on top of the resume itself.
const APPLY_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let apply_limit = state.config.resume_max_bytes + APPLY_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs
        .route("/api/jobs", post(jobs::handle_create_job).get(jobs::handle_list_jobs))
        .route(
            "/api/jobs/:job_id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route("/api/jobs/jobtitle/:jobtitle", get(jobs::handle_jobs_by_title))
        .route("/api/jobs/status/:status", get(jobs::handle_jobs_by_status))
        // Forms
        .route(
            "/api/forms/templates",
            post(forms::handle_create_template).get(forms::handle_list_templates),
        )
        .route(
            "/api/forms/templates/:form_template_id",
            get(forms::handle_get_template).delete(forms::handle_delete_template),
        )
        .route("/api/jobs/:job_id/forms", post(forms::handle_link_job_to_template))
        .route("/api/forms/:form_uuid/status", patch(forms::handle_update_form_status))
        .route(
            "/api/forms/:form_uuid",
            get(forms::handle_get_form_details).delete(forms::handle_delete_form),
        )
        // Submissions
        .route(
            "/api/forms/:form_uuid/apply",
            post(submissions::handle_apply).layer(DefaultBodyLimit::max(apply_limit)),
        )
        .route(
            "/api/jobs/:job_id/submissions",
            get(submissions::handle_list_submissions),
        )
        .route("/api/submissions/:id", get(submissions::handle_get_submission))
        .route(
            "/api/submissions/:id/status",
            put(submissions::handle_update_submission_status),
        )
        // Availability
        .route(
            "/api/availability",
            post(availability::handle_create_slot).get(availability::handle_search_slots),
        )
        .route("/api/availability/me", get(availability::handle_my_slots))
        .route(
            "/api/availability/users/:user_name",
            get(availability::handle_user_slots),
        )
        .route(
            "/api/availability/:id",
            delete(availability::handle_delete_slot),
        )
        // Interviews
        .route(
            "/api/interviews",
            post(interviews::handle_schedule_interview).get(interviews::handle_list_interviews),
        )
        .route(
            "/api/interviews/:id",
            delete(interviews::handle_cancel_interview),
        )
        .route(
            "/api/interviews/:id/feedback",
            post(interviews::handle_submit_feedback),
        )
        // Profiles
        .route(
            "/api/profiles",
            post(profiles::handle_create_profile).put(profiles::handle_update_my_profile),
        )
        .route("/api/profiles/me", get(profiles::handle_get_my_profile))
        .route(
            "/api/profiles/users/:user_name",
            get(profiles::handle_get_user_profile),
        )
        .with_state(state)
}
