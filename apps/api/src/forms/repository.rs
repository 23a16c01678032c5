use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::form::{ApplicationFormRow, FormStatus, FormTemplateRow};

const APPLICATION_FORM_COLUMNS: &str = r#"
    af.form_uuid, af.job_id, ft.form_template_id, af.status, af.created_at, af.updated_at
"#;

pub async fn insert_template(
    pool: &PgPool,
    user_id: i64,
    form_template_id: &str,
    fields: &Value,
) -> Result<FormTemplateRow, sqlx::Error> {
    sqlx::query_as::<_, FormTemplateRow>(
        r#"
        INSERT INTO form_templates (form_template_id, user_id, fields)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(form_template_id)
    .bind(user_id)
    .bind(fields)
    .fetch_one(pool)
    .await
}

pub async fn list_templates(pool: &PgPool, user_id: i64) -> Result<Vec<FormTemplateRow>, sqlx::Error> {
    sqlx::query_as::<_, FormTemplateRow>(
        "SELECT * FROM form_templates WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_template(
    pool: &PgPool,
    user_id: i64,
    form_template_id: &str,
) -> Result<Option<FormTemplateRow>, sqlx::Error> {
    sqlx::query_as::<_, FormTemplateRow>(
        "SELECT * FROM form_templates WHERE user_id = $1 AND form_template_id = $2",
    )
    .bind(user_id)
    .bind(form_template_id)
    .fetch_optional(pool)
    .await
}

pub async fn count_forms_using_template(pool: &PgPool, template_pk: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM application_forms WHERE template_id = $1")
        .bind(template_pk)
        .fetch_one(pool)
        .await
}

pub async fn delete_template(pool: &PgPool, template_pk: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM form_templates WHERE id = $1")
        .bind(template_pk)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn insert_application_form(
    pool: &PgPool,
    job_id: &str,
    template_pk: i64,
) -> Result<ApplicationFormRow, sqlx::Error> {
    let form_uuid = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO application_forms (form_uuid, job_id, template_id, status) VALUES ($1, $2, $3, $4)",
    )
    .bind(form_uuid)
    .bind(job_id)
    .bind(template_pk)
    .bind(FormStatus::Active.as_str())
    .execute(pool)
    .await?;

    find_application_form(pool, form_uuid)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_application_form(
    pool: &PgPool,
    form_uuid: Uuid,
) -> Result<Option<ApplicationFormRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {APPLICATION_FORM_COLUMNS}
        FROM application_forms af
        JOIN form_templates ft ON ft.id = af.template_id
        WHERE af.form_uuid = $1
        "#
    );
    sqlx::query_as::<_, ApplicationFormRow>(&sql)
        .bind(form_uuid)
        .fetch_optional(pool)
        .await
}

/// Application form owned (through its job) by `user_id`.
pub async fn find_owned_application_form(
    pool: &PgPool,
    user_id: i64,
    form_uuid: Uuid,
) -> Result<Option<ApplicationFormRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {APPLICATION_FORM_COLUMNS}
        FROM application_forms af
        JOIN form_templates ft ON ft.id = af.template_id
        JOIN jobs j ON j.job_id = af.job_id
        WHERE af.form_uuid = $1 AND j.user_id = $2
        "#
    );
    sqlx::query_as::<_, ApplicationFormRow>(&sql)
        .bind(form_uuid)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn update_form_status(
    pool: &PgPool,
    form_uuid: Uuid,
    status: FormStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE application_forms SET status = $2, updated_at = NOW() WHERE form_uuid = $1")
        .bind(form_uuid)
        .bind(status.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

/// Locks the form's submissions so no interview can be booked against them
/// until the transaction ends.
pub async fn lock_form_submissions(conn: &mut PgConnection, form_uuid: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM job_submissions WHERE form_uuid = $1 FOR UPDATE")
        .bind(form_uuid)
        .fetch_all(conn)
        .await?;
    Ok(())
}

/// Interviews still `scheduled` for candidates who applied through this form.
pub async fn count_scheduled_interviews(
    conn: &mut PgConnection,
    form_uuid: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM interviews i
        JOIN job_submissions s ON s.id = i.job_submission_id
        WHERE s.form_uuid = $1 AND i.status = 'scheduled'
        "#,
    )
    .bind(form_uuid)
    .fetch_one(conn)
    .await
}

/// Deletes the form. Its submissions and their past interviews cascade.
pub async fn delete_application_form(
    conn: &mut PgConnection,
    form_uuid: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM application_forms WHERE form_uuid = $1")
        .bind(form_uuid)
        .execute(conn)
        .await?;
    Ok(())
}

/// Template fields behind an application form.
pub async fn form_fields(pool: &PgPool, form_uuid: Uuid) -> Result<Option<Value>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT ft.fields
        FROM application_forms af
        JOIN form_templates ft ON ft.id = af.template_id
        WHERE af.form_uuid = $1
        "#,
    )
    .bind(form_uuid)
    .fetch_optional(pool)
    .await
}
