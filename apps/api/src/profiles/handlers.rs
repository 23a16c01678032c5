use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::actor::Actor;
use crate::availability::repository::find_user_id_by_username;
use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::profiles::repository;
use crate::profiles::validation::{validate_profile, ProfileRequest};
use crate::state::AppState;

fn missing_profile() -> AppError {
    AppError::NotFound("Profile not found".to_string())
}

/// POST /api/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<ProfileRow>), AppError> {
    let draft = validate_profile(&req)?;
    let profile = repository::insert_profile(&state.db, actor.user_id, &draft)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Profile already exists"))?;

    info!("{} (user {}) created their profile", actor.username, actor.user_id);
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/profiles/me
pub async fn handle_get_my_profile(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<ProfileRow>, AppError> {
    repository::find_profile(&state.db, actor.user_id)
        .await?
        .map(Json)
        .ok_or_else(missing_profile)
}

/// PUT /api/profiles
pub async fn handle_update_my_profile(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileRow>, AppError> {
    let draft = validate_profile(&req)?;
    let profile = repository::update_profile(&state.db, actor.user_id, &draft)
        .await?
        .ok_or_else(missing_profile)?;

    info!("{} (user {}) updated their profile", actor.username, actor.user_id);
    Ok(Json(profile))
}

/// GET /api/profiles/users/:user_name
pub async fn handle_get_user_profile(
    State(state): State<AppState>,
    _actor: Actor,
    Path(user_name): Path<String>,
) -> Result<Json<ProfileRow>, AppError> {
    let user_id = find_user_id_by_username(&state.db, &user_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user exists with username {user_name}")))?;
    repository::find_profile(&state.db, user_id)
        .await?
        .map(Json)
        .ok_or_else(missing_profile)
}
