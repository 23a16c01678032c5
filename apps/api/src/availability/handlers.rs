use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::actor::Actor;
use crate::availability::repository::{self, DateRange, SlotSearch};
use crate::availability::slots::{find_overlap, parse_date, validate_slot, SlotRequest};
use crate::config::split_list;
use crate::errors::AppError;
use crate::models::availability::{AvailabilityRow, AvailabilityView};
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub years_experience: Option<String>,
    pub job_title: Option<String>,
    pub areas_of_expertise: Option<String>,
    pub include_booked: Option<bool>,
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<DateRange, AppError> {
    let range = DateRange {
        from: non_empty(from).map(parse_date).transpose()?,
        to: non_empty(to).map(parse_date).transpose()?,
    };
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(AppError::Validation(
                "from_date must not be after to_date".to_string(),
            ));
        }
    }
    Ok(range)
}

pub fn parse_search(query: &SearchQuery) -> Result<SlotSearch, AppError> {
    let min_years_experience = non_empty(query.years_experience.as_deref())
        .map(|y| {
            y.parse::<i32>()
                .ok()
                .filter(|y| *y >= 0)
                .ok_or_else(|| AppError::Validation(format!("Invalid years_experience '{y}'")))
        })
        .transpose()?;

    Ok(SlotSearch {
        range: parse_range(query.from_date.as_deref(), query.to_date.as_deref())?,
        min_years_experience,
        job_title: non_empty(query.job_title.as_deref()).map(str::to_string),
        areas_of_expertise: non_empty(query.areas_of_expertise.as_deref())
            .map(|a| split_list(&a.to_lowercase()))
            .unwrap_or_default(),
        include_booked: query.include_booked.unwrap_or(false),
    })
}

/// POST /api/availability
pub async fn handle_create_slot(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<SlotRequest>,
) -> Result<(StatusCode, Json<AvailabilityRow>), AppError> {
    actor.require(Role::Interviewer)?;
    let window = validate_slot(&req)?;

    let mut tx = state.db.begin().await?;
    repository::lock_user_slots(&mut tx, actor.user_id).await?;

    let existing = repository::windows_on_date(&mut tx, actor.user_id, window.date).await?;
    if let Some(clash) = find_overlap(&window, &existing) {
        return Err(AppError::Conflict(format!(
            "Overlapping time slot exists ({} - {})",
            clash.from.format("%H:%M"),
            clash.to.format("%H:%M")
        )));
    }

    let slot = repository::insert_slot(&mut tx, actor.user_id, &window).await?;
    tx.commit().await?;

    info!(
        "Interviewer {} opened slot {} on {} {}-{}",
        actor.user_id, slot.id, slot.date, slot.from_time, slot.to_time
    );
    Ok((StatusCode::CREATED, Json(slot)))
}

/// DELETE /api/availability/:id
pub async fn handle_delete_slot(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    actor.require(Role::Interviewer)?;
    repository::find_owned_slot(&state.db, actor.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No availability found with id {id}")))?;

    if !repository::delete_unbooked_slot(&state.db, actor.user_id, id).await? {
        return Err(AppError::Conflict(
            "Cannot delete: slot is scheduled for an interview. Contact the recruiter".to_string(),
        ));
    }
    Ok(Json(json!({ "message": "Availability slot deleted successfully" })))
}

/// GET /api/availability/me
pub async fn handle_my_slots(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<AvailabilityView>>, AppError> {
    let range = parse_range(query.from_date.as_deref(), query.to_date.as_deref())?;
    Ok(Json(
        repository::list_user_slots(&state.db, actor.user_id, &range).await?,
    ))
}

/// GET /api/availability/users/:user_name
pub async fn handle_user_slots(
    State(state): State<AppState>,
    _actor: Actor,
    Path(user_name): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<AvailabilityView>>, AppError> {
    let range = parse_range(query.from_date.as_deref(), query.to_date.as_deref())?;
    let user_id = repository::find_user_id_by_username(&state.db, &user_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user exists with username {user_name}")))?;
    Ok(Json(
        repository::list_user_slots(&state.db, user_id, &range).await?,
    ))
}

/// GET /api/availability
pub async fn handle_search_slots(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<AvailabilityView>>, AppError> {
    let search = parse_search(&query)?;
    Ok(Json(repository::search_slots(&state.db, &search).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use sqlx::PgPool;

    use crate::test_support::{call, insert_slot, seed_pipeline, state_with_pool, upcoming_date};
    use chrono::NaiveDate;

    #[test]
    fn test_parse_range() {
        let range = parse_range(Some("2025-04-01"), Some(" ")).unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2025, 4, 1));
        assert_eq!(range.to, None);

        assert!(parse_range(Some("2025-04-02"), Some("2025-04-01")).is_err());
        assert!(parse_range(Some("April"), None).is_err());
    }

    #[test]
    fn test_parse_search() {
        let query = SearchQuery {
            years_experience: Some("5".to_string()),
            job_title: Some("  ".to_string()),
            areas_of_expertise: Some("Rust, Distributed Systems,".to_string()),
            ..Default::default()
        };
        let search = parse_search(&query).unwrap();
        assert_eq!(search.min_years_experience, Some(5));
        assert_eq!(search.job_title, None);
        assert_eq!(search.areas_of_expertise, vec!["rust", "distributed systems"]);
        assert!(!search.include_booked);
    }

    #[test]
    fn test_parse_search_rejects_bad_years() {
        let query = SearchQuery {
            years_experience: Some("-1".to_string()),
            ..Default::default()
        };
        assert!(parse_search(&query).is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_booked_slot_cannot_be_deleted(pool: PgPool) {
        let p = seed_pipeline(&pool).await;
        let state = state_with_pool(pool.clone());
        let (status, _) =
            call(&state, Method::POST, "/api/interviews", Some(p.hr), Some(p.schedule_body())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = call(
            &state,
            Method::DELETE,
            &format!("/api/availability/{}", p.slot_id),
            Some(p.interviewer),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let free = insert_slot(&pool, p.interviewer, upcoming_date(), 15).await;
        let (status, _) = call(
            &state,
            Method::DELETE,
            &format!("/api/availability/{free}"),
            Some(p.interviewer),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
