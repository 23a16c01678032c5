use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FormTemplateRow {
    pub id: i64,
    pub form_template_id: String,
    pub user_id: i64,
    pub fields: Value,
    pub created_at: DateTime<Utc>,
}

/// An application form joins a job to a template and is addressed by `form_uuid`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationFormRow {
    pub form_uuid: Uuid,
    pub job_id: String,
    pub form_template_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    Radio,
    Checkbox,
    File,
}

impl QuestionType {
    pub fn takes_options(&self) -> bool {
        matches!(self, QuestionType::Radio | QuestionType::Checkbox)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub question_id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Active,
    Inactive,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Active => "active",
            FormStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(FormStatus::Active),
            "inactive" => Ok(FormStatus::Inactive),
            other => Err(format!("unknown form status '{other}'")),
        }
    }
}
