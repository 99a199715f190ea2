use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{error::AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// The dashboard omits the range on first load; default to the last UTC day.
fn resolve_range(params: DateRangeParams) -> (String, String) {
    let until = params
        .end_date
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
    let since = params.start_date.unwrap_or_else(|| {
        (Utc::now() - Duration::days(1))
            .format("%Y-%m-%d")
            .to_string()
    });
    (since, until)
}

/// Relay daily read/write query counts from the Cloudflare analytics API.
pub async fn insights(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<Value>> {
    let (since, until) = resolve_range(params);
    Ok(Json(state.d1.insights(&since, &until).await?))
}

/// Relay recently executed query texts from the Cloudflare analytics API.
pub async fn recent_queries(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<Value>> {
    let (since, until) = resolve_range(params);
    Ok(Json(state.d1.recent_queries(&since, &until).await?))
}
