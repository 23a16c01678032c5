use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::availability::slots::SlotWindow;
use crate::jobs::repository::escape_like;
use crate::models::availability::{AvailabilityRow, AvailabilityView};

const VIEW_SELECT: &str = r#"
    SELECT a.id, a.user_id, u.username, a.date, a.from_time, a.to_time,
           EXISTS (SELECT 1 FROM interviews i WHERE i.availability_id = a.id) AS booked,
           a.created_at, a.updated_at
    FROM availabilities a
    JOIN users u ON u.id = a.user_id
"#;

#[derive(Debug, Default, Clone)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Filters HR applies when looking for an interviewer.
#[derive(Debug, Default, Clone)]
pub struct SlotSearch {
    pub range: DateRange,
    pub min_years_experience: Option<i32>,
    pub job_title: Option<String>,
    /// Lowercased; matches when the profile shares at least one area.
    pub areas_of_expertise: Vec<String>,
    pub include_booked: bool,
}

/// Serialises slot writes for one interviewer until the transaction ends.
pub async fn lock_user_slots(conn: &mut PgConnection, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn windows_on_date(
    conn: &mut PgConnection,
    user_id: i64,
    date: NaiveDate,
) -> Result<Vec<SlotWindow>, sqlx::Error> {
    let rows: Vec<AvailabilityRow> =
        sqlx::query_as("SELECT * FROM availabilities WHERE user_id = $1 AND date = $2")
            .bind(user_id)
            .bind(date)
            .fetch_all(conn)
            .await?;
    Ok(rows
        .into_iter()
        .map(|r| SlotWindow {
            date: r.date,
            from: r.from_time,
            to: r.to_time,
        })
        .collect())
}

pub async fn insert_slot(
    conn: &mut PgConnection,
    user_id: i64,
    window: &SlotWindow,
) -> Result<AvailabilityRow, sqlx::Error> {
    sqlx::query_as::<_, AvailabilityRow>(
        r#"
        INSERT INTO availabilities (user_id, date, from_time, to_time)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(window.date)
    .bind(window.from)
    .bind(window.to)
    .fetch_one(conn)
    .await
}

pub async fn find_owned_slot(
    pool: &PgPool,
    user_id: i64,
    slot_id: i64,
) -> Result<Option<AvailabilityRow>, sqlx::Error> {
    sqlx::query_as::<_, AvailabilityRow>(
        "SELECT * FROM availabilities WHERE id = $1 AND user_id = $2",
    )
    .bind(slot_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Deletes a slot unless an interview references it. Returns whether a row went away.
pub async fn delete_unbooked_slot(
    pool: &PgPool,
    user_id: i64,
    slot_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM availabilities a
        WHERE a.id = $1 AND a.user_id = $2
          AND NOT EXISTS (SELECT 1 FROM interviews i WHERE i.availability_id = a.id)
        "#,
    )
    .bind(slot_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

fn push_range(qb: &mut QueryBuilder<'_, Postgres>, range: &DateRange) {
    if let Some(from) = range.from {
        qb.push(" AND a.date >= ").push_bind(from);
    }
    if let Some(to) = range.to {
        qb.push(" AND a.date <= ").push_bind(to);
    }
}

pub async fn list_user_slots(
    pool: &PgPool,
    user_id: i64,
    range: &DateRange,
) -> Result<Vec<AvailabilityView>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(VIEW_SELECT);
    qb.push(" WHERE a.user_id = ").push_bind(user_id);
    push_range(&mut qb, range);
    qb.push(" ORDER BY a.date, a.from_time");

    qb.build_query_as::<AvailabilityView>().fetch_all(pool).await
}

pub async fn search_slots(
    pool: &PgPool,
    search: &SlotSearch,
) -> Result<Vec<AvailabilityView>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(VIEW_SELECT);
    qb.push(" LEFT JOIN profiles p ON p.user_id = a.user_id WHERE u.role = 'INTERVIEWER'");
    push_range(&mut qb, &search.range);

    if let Some(years) = search.min_years_experience {
        qb.push(" AND p.years_of_experience >= ").push_bind(years);
    }
    if let Some(title) = &search.job_title {
        qb.push(" AND p.job_title ILIKE ")
            .push_bind(format!("%{}%", escape_like(title)));
    }
    if !search.areas_of_expertise.is_empty() {
        qb.push(" AND p.areas_of_expertise && ")
            .push_bind(search.areas_of_expertise.clone());
    }
    if !search.include_booked {
        qb.push(" AND NOT EXISTS (SELECT 1 FROM interviews i WHERE i.availability_id = a.id)");
    }
    qb.push(" ORDER BY a.date, a.from_time, a.id");

    qb.build_query_as::<AvailabilityView>().fetch_all(pool).await
}

pub async fn find_user_id_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}
