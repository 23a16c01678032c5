//! Query options for the per-job submission list.
//!
//! Malformed sort, limit and date values fall back to defaults instead of
//! failing, so a stale bookmark still shows the list.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::submission::SubmissionStatus;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionQuery {
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    AtsScore,
    CreatedAt,
}

impl SortField {
    /// Column name. Only ever one of these literals reaches the SQL text.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::AtsScore => "ats_score",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    All,
    Today,
    On(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub sort: SortField,
    pub limit: i64,
    pub date: DateFilter,
    pub status: Option<SubmissionStatus>,
}

impl ListOptions {
    pub fn from_query(query: &SubmissionQuery) -> Result<Self, AppError> {
        let sort = match query.sort_by.as_deref().map(str::trim) {
            Some("created_at") => SortField::CreatedAt,
            Some("ats_score") | None => SortField::AtsScore,
            Some(other) => {
                debug!("Ignoring unknown sort_by '{other}'");
                SortField::AtsScore
            }
        };

        let limit = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| l.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);

        let date = match query.date.as_deref().map(str::trim) {
            None | Some("") | Some("all") => DateFilter::All,
            Some("today") => DateFilter::Today,
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(day) => DateFilter::On(day),
                Err(_) => {
                    debug!("Ignoring invalid date filter '{raw}'");
                    DateFilter::All
                }
            },
        };

        let status = query
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<SubmissionStatus>().map_err(AppError::Validation))
            .transpose()?;

        Ok(ListOptions {
            sort,
            limit,
            date,
            status,
        })
    }
}
