// handlers/protected/reports.rs - GET /api/reports/summary

use axum::{
    extract::{Query, State},
    Extension,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::report_service::{summarize, ReportRange, ReportSummary};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// Inclusive start, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Inclusive end, `YYYY-MM-DD`
    pub to: Option<String>,
}

impl SummaryQuery {
    pub fn range(&self) -> Result<ReportRange, ApiError> {
        let range = ReportRange {
            from: parse_day("from", self.from.as_deref())?,
            to: parse_day("to", self.to.as_deref())?,
        };

        if let (Some(from), Some(to)) = (range.from, range.to) {
            if from > to {
                return Err(ApiError::bad_request("'from' must not be after 'to'"));
            }
        }

        Ok(range)
    }
}

fn parse_day(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::field_error(field, format!("'{}' must be a date like 2025-01-31", field))),
    }
}

/// GET /api/reports/summary - aggregates over the caller's rows
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<ReportSummary> {
    let range = query.range()?;
    let summary = summarize(state.store.as_ref(), user.id(), range).await?;
    Ok(ApiResponse::success(summary))
}
