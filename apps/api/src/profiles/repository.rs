use sqlx::PgPool;

use crate::models::profile::ProfileRow;
use crate::profiles::validation::ProfileDraft;

pub async fn insert_profile(
    pool: &PgPool,
    user_id: i64,
    draft: &ProfileDraft,
) -> Result<ProfileRow, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles (user_id, job_title, years_of_experience, areas_of_expertise, phone_number)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING user_id, job_title, years_of_experience, areas_of_expertise, phone_number,
                  created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&draft.job_title)
    .bind(draft.years_of_experience)
    .bind(&draft.areas_of_expertise)
    .bind(&draft.phone_number)
    .fetch_one(pool)
    .await
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    draft: &ProfileDraft,
) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        r#"
        UPDATE profiles
        SET job_title = $2, years_of_experience = $3, areas_of_expertise = $4,
            phone_number = $5, updated_at = NOW()
        WHERE user_id = $1
        RETURNING user_id, job_title, years_of_experience, areas_of_expertise, phone_number,
                  created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&draft.job_title)
    .bind(draft.years_of_experience)
    .bind(&draft.areas_of_expertise)
    .bind(&draft.phone_number)
    .fetch_optional(pool)
    .await
}

pub async fn find_profile(pool: &PgPool, user_id: i64) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT user_id, job_title, years_of_experience, areas_of_expertise, phone_number,
               created_at, updated_at
        FROM profiles WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
