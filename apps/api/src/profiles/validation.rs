use serde::Deserialize;

use crate::errors::AppError;

pub const MAX_YEARS_EXPERIENCE: i32 = 70;
const PHONE_LEN: std::ops::RangeInclusive<usize> = 7..=20;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileRequest {
    pub job_title: String,
    pub years_of_experience: i32,
    pub areas_of_expertise: Vec<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub job_title: String,
    pub years_of_experience: i32,
    pub areas_of_expertise: Vec<String>,
    pub phone_number: Option<String>,
}

/// Trims and lowercases areas, dropping blanks and repeats. First occurrence keeps its place.
pub fn normalize_areas(areas: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(areas.len());
    for area in areas {
        let area = area.trim().to_lowercase();
        if !area.is_empty() && !out.contains(&area) {
            out.push(area);
        }
    }
    out
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_LEN.contains(&phone.chars().count())
        && phone.chars().any(|c| c.is_ascii_digit())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

pub fn validate_profile(req: &ProfileRequest) -> Result<ProfileDraft, AppError> {
    let job_title = req.job_title.trim();
    if job_title.is_empty() {
        return Err(AppError::Validation("job_title is required".to_string()));
    }
    if !(0..=MAX_YEARS_EXPERIENCE).contains(&req.years_of_experience) {
        return Err(AppError::Validation(format!(
            "years_of_experience must be between 0 and {MAX_YEARS_EXPERIENCE}"
        )));
    }

    let areas_of_expertise = normalize_areas(&req.areas_of_expertise);
    if areas_of_expertise.is_empty() {
        return Err(AppError::Validation(
            "At least one area of expertise is required".to_string(),
        ));
    }

    let phone_number = req
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if is_valid_phone(p) {
                Ok(p.to_string())
            } else {
                Err(AppError::Validation(format!("Invalid phone number '{p}'")))
            }
        })
        .transpose()?;

    Ok(ProfileDraft {
        job_title: job_title.to_string(),
        years_of_experience: req.years_of_experience,
        areas_of_expertise,
        phone_number,
    })
}
