//! Reading and checking a candidate's multipart application.

use axum::extract::Multipart;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::errors::AppError;

#[derive(Debug, Default)]
pub struct RawApplication {
    pub username: Option<String>,
    pub email: Option<String>,
    pub form_data: Option<String>,
    pub resume: Option<ResumeUpload>,
}

#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug)]
pub struct Application {
    pub username: String,
    pub email: String,
    pub answers: Map<String, Value>,
    pub resume: ResumeUpload,
}

/// Drains the multipart stream. Unknown parts are skipped.
pub async fn read_multipart(mut multipart: Multipart) -> Result<RawApplication, AppError> {
    let mut raw = RawApplication::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read resume: {e}")))?;
                raw.resume = Some(ResumeUpload { file_name, bytes });
            }
            "username" | "email" | "form_data" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read {name}: {e}")))?;
                match name.as_str() {
                    "username" => raw.username = Some(text),
                    "email" => raw.email = Some(text),
                    _ => raw.form_data = Some(text),
                }
            }
            _ => {}
        }
    }

    Ok(raw)
}

/// Loose syntactic check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}

/// Validates presence and shape of every part of an application.
pub fn validate_application(raw: RawApplication, max_resume_bytes: usize) -> Result<Application, AppError> {
    let username = raw.username.as_deref().map(str::trim).unwrap_or_default().to_string();
    let email = raw.email.as_deref().map(str::trim).unwrap_or_default().to_string();
    let form_data = raw.form_data.as_deref().map(str::trim).unwrap_or_default();

    let mut missing = Vec::new();
    if username.is_empty() {
        missing.push("username");
    }
    if email.is_empty() {
        missing.push("email");
    }
    if form_data.is_empty() {
        missing.push("form_data");
    }
    if raw.resume.is_none() {
        missing.push("resume");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if !is_valid_email(&email) {
        return Err(AppError::Validation(format!("Invalid email address '{email}'")));
    }

    let answers = match serde_json::from_str::<Value>(form_data) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(AppError::Validation(
                "form_data must be a JSON object".to_string(),
            ))
        }
        Err(e) => return Err(AppError::Validation(format!("Invalid form_data JSON: {e}"))),
    };

    let resume = raw.resume.ok_or_else(|| AppError::Validation("resume is required".to_string()))?;
    if resume.bytes.is_empty() {
        return Err(AppError::Validation("Resume file is empty".to_string()));
    }
    if resume.bytes.len() > max_resume_bytes {
        return Err(AppError::Validation(format!(
            "Resume exceeds the {max_resume_bytes} byte limit"
        )));
    }

    Ok(Application {
        username,
        email,
        answers,
        resume,
    })
}
