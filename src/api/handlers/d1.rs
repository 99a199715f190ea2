use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ExecuteQueryParams {
    pub sql: Option<String>,
}

/// Relay one raw SQL statement to D1 and return the full response envelope.
pub async fn execute_query(
    State(state): State<AppState>,
    Query(params): Query<ExecuteQueryParams>,
) -> AppResult<Json<Value>> {
    let sql = params
        .sql
        .filter(|sql| !sql.is_empty())
        .ok_or_else(|| AppError::BadRequest("SQL query is missing".to_string()))?;
    Ok(Json(state.d1.raw_query(&sql).await?))
}
