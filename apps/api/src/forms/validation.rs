use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::form::{FormField, QuestionType};

/// Questions numbered Q1..Q10 on the questionnaire builder.
pub const MAX_QUESTIONS: usize = 10;

/// Answer keys that carry the candidate's skills.
pub const SKILL_KEYS: &[&str] = &["Q_Skills", "skills"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormTemplateRequest {
    pub form_template_id: String,
    pub fields: Vec<FormField>,
}

/// Validates a template and returns it with ids, text and options trimmed.
pub fn validate_template(req: &FormTemplateRequest) -> Result<(String, Vec<FormField>), AppError> {
    let template_id = req.form_template_id.trim().to_string();
    if template_id.is_empty() {
        return Err(AppError::Validation(
            "form_template_id is required".to_string(),
        ));
    }
    if req.fields.is_empty() {
        return Err(AppError::Validation(
            "A template needs at least one question".to_string(),
        ));
    }
    if req.fields.len() > MAX_QUESTIONS {
        return Err(AppError::Validation(format!(
            "A template holds at most {MAX_QUESTIONS} questions"
        )));
    }

    let mut ids = HashSet::new();
    let mut fields = Vec::with_capacity(req.fields.len());
    for field in &req.fields {
        let question_id = field.question_id.trim().to_string();
        if question_id.is_empty() {
            return Err(AppError::Validation("Every question needs an id".to_string()));
        }
        if !ids.insert(question_id.clone()) {
            return Err(AppError::Validation(format!(
                "Duplicate question id {question_id}"
            )));
        }
        let question_text = field.question_text.trim().to_string();
        if question_text.is_empty() {
            return Err(AppError::Validation(format!(
                "Question {question_id} has no text"
            )));
        }

        let options: Vec<String> = field.options.iter().map(|o| o.trim().to_string()).collect();
        if field.question_type.takes_options() {
            if options.is_empty() || options.iter().any(|o| o.is_empty()) {
                return Err(AppError::Validation(format!(
                    "Question {question_id} needs non-empty options"
                )));
            }
            let unique: HashSet<_> = options.iter().collect();
            if unique.len() != options.len() {
                return Err(AppError::Validation(format!(
                    "Question {question_id} repeats an option"
                )));
            }
        } else if !options.is_empty() {
            return Err(AppError::Validation(format!(
                "Question {question_id} does not take options"
            )));
        }

        fields.push(FormField {
            question_id,
            question_text,
            question_type: field.question_type,
            options,
        });
    }

    Ok((template_id, fields))
}

/// Checks a candidate's answers against the template's questions.
pub fn validate_answers(fields: &[FormField], answers: &Map<String, Value>) -> Result<(), AppError> {
    for (key, value) in answers {
        let Some(field) = fields.iter().find(|f| &f.question_id == key) else {
            if SKILL_KEYS.contains(&key.as_str()) {
                continue;
            }
            return Err(AppError::Validation(format!("Unknown question {key}")));
        };

        let ok = match field.question_type {
            QuestionType::Radio => value
                .as_str()
                .is_some_and(|v| field.options.iter().any(|o| o == v)),
            QuestionType::Checkbox => value.as_array().is_some_and(|items| {
                items.iter().all(|item| {
                    item.as_str()
                        .is_some_and(|v| field.options.iter().any(|o| o == v))
                })
            }),
            QuestionType::Text | QuestionType::File => value.is_string(),
        };
        if !ok {
            return Err(AppError::Validation(format!(
                "Answer to {key} does not match the question"
            )));
        }
    }
    Ok(())
}

/// Pulls the candidate's skills out of the answers.
pub fn extract_skills(answers: &Map<String, Value>) -> Vec<String> {
    let Some(value) = SKILL_KEYS.iter().find_map(|k| answers.get(*k)) else {
        return Vec::new();
    };
    let raw: Vec<&str> = match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(text) => text.split(',').collect(),
        _ => Vec::new(),
    };
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}
