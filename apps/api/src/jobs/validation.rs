use serde::Deserialize;

use crate::errors::AppError;
use crate::models::job::JobStatus;

/// The posting form sends one of these for an optional field the HR user left out.
const PLACEHOLDERS: &[&str] = &["", "empty", "none"];

/// `skills_required` arrives as a list from API clients and as a
/// comma-separated string from the posting form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobRequest {
    pub job_id: Option<String>,
    pub job_title: String,
    pub job_description: String,
    pub job_status: Option<String>,
    pub skills_required: Option<SkillsInput>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub info6: Option<String>,
    pub info7: Option<String>,
    pub info8: Option<String>,
    pub info9: Option<String>,
    pub info10: Option<String>,
}

/// A job request after validation and normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub job_id: String,
    pub job_title: String,
    pub job_description: String,
    pub job_status: JobStatus,
    pub skills_required: Vec<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub additional_info: Vec<String>,
}

/// Trims a value and maps placeholder text to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if PLACEHOLDERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits, trims and de-duplicates skills (case-insensitive, first spelling wins).
pub fn normalize_skills(input: Option<&SkillsInput>) -> Vec<String> {
    let raw: Vec<String> = match input {
        None => Vec::new(),
        Some(SkillsInput::List(items)) => items.clone(),
        Some(SkillsInput::Text(text)) => text.split(',').map(str::to_string).collect(),
    };

    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .filter_map(|s| optional_text(Some(s.as_str())))
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

/// Validates a create/update request. `path_job_id` overrides any body id.
pub fn validate_job(req: &JobRequest, path_job_id: Option<&str>) -> Result<JobDraft, AppError> {
    let job_id = path_job_id
        .map(str::to_string)
        .or_else(|| req.job_id.clone())
        .map(|id| id.trim().to_string())
        .unwrap_or_default();

    let mut missing = Vec::new();
    if job_id.is_empty() {
        missing.push("job_id");
    }
    if req.job_title.trim().is_empty() {
        missing.push("job_title");
    }
    if req.job_description.trim().is_empty() {
        missing.push("job_description");
    }
    let skills_required = normalize_skills(req.skills_required.as_ref());
    if skills_required.is_empty() {
        missing.push("skills_required");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if job_id.len() > 64 {
        return Err(AppError::Validation(
            "job_id must be at most 64 characters".to_string(),
        ));
    }

    let job_status = match optional_text(req.job_status.as_deref()) {
        None => JobStatus::Open,
        Some(s) => s.parse::<JobStatus>().map_err(AppError::Validation)?,
    };

    let additional_info = [&req.info6, &req.info7, &req.info8, &req.info9, &req.info10]
        .into_iter()
        .filter_map(|v| optional_text(v.as_deref()))
        .collect();

    Ok(JobDraft {
        job_id,
        job_title: req.job_title.trim().to_string(),
        job_description: req.job_description.trim().to_string(),
        job_status,
        skills_required,
        location: optional_text(req.location.as_deref()),
        experience: optional_text(req.experience.as_deref()),
        additional_info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_text_placeholders() {
        for placeholder in ["", "  ", "EMPTY", "None", "none"] {
            assert_eq!(optional_text(Some(placeholder)), None, "{placeholder:?}");
        }
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some("N/A")).as_deref(), Some("N/A"));
        assert_eq!(optional_text(Some(" Remote ")).as_deref(), Some("Remote"));
    }

    fn posting_form_request() -> JobRequest {
        JobRequest {
            job_id: Some(" J12349 ".to_string()),
            job_title: "Backend Engineer".to_string(),
            job_description: "Build services".to_string(),
            job_status: Some("Open".to_string()),
            skills_required: Some(SkillsInput::Text("Rust, Go,  rust ,".to_string())),
            location: Some("EMPTY".to_string()),
            experience: Some("3+ years".to_string()),
            info6: Some("Remote friendly".to_string()),
            info7: Some("EMPTY".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_posting_form_payload_is_normalised() {
        let draft = validate_job(&posting_form_request(), None).unwrap();
        assert_eq!(draft.job_id, "J12349");
        assert_eq!(draft.skills_required, vec!["Rust", "Go"]);
        assert_eq!(draft.location, None);
        assert_eq!(draft.experience.as_deref(), Some("3+ years"));
        assert_eq!(draft.additional_info, vec!["Remote friendly"]);
        assert_eq!(draft.job_status, JobStatus::Open);
    }

    #[test]
    fn test_path_id_wins_over_body_id() {
        let draft = validate_job(&posting_form_request(), Some("J999")).unwrap();
        assert_eq!(draft.job_id, "J999");
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let err = validate_job(&JobRequest::default(), None).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("job_id"));
                assert!(msg.contains("job_title"));
                assert!(msg.contains("skills_required"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_placeholder_skills_do_not_count() {
        let mut req = posting_form_request();
        req.skills_required = Some(SkillsInput::Text("EMPTY".to_string()));
        assert!(validate_job(&req, None).is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let mut req = posting_form_request();
        req.job_status = Some("archived".to_string());
        assert!(matches!(validate_job(&req, None), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_skills_accept_json_list() {
        let req: JobRequest = serde_json::from_value(serde_json::json!({
            "job_id": "J1",
            "job_title": "T",
            "job_description": "D",
            "skills_required": ["SQL", "Python"]
        }))
        .unwrap();
        let draft = validate_job(&req, None).unwrap();
        assert_eq!(draft.skills_required, vec!["SQL", "Python"]);
    }
}
