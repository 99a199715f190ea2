use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    services::notifier::{self, SweepReport},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SendParams {
    pub token: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Relay a single push message to FCM.
pub async fn send_notification(
    State(state): State<AppState>,
    Query(params): Query<SendParams>,
) -> AppResult<Json<Value>> {
    let (token, title, body) = match (params.token, params.title, params.body) {
        (Some(token), Some(title), Some(body)) => (token, title, body),
        _ => {
            return Err(AppError::BadRequest(
                "token, title and body are required".to_string(),
            ))
        }
    };

    let fcm = state
        .fcm
        .as_ref()
        .ok_or_else(|| AppError::Config("Firebase push client is not configured".to_string()))?;

    let message_id = fcm.send(&token, &title, &body).await?;
    Ok(Json(json!({ "success": true, "messageId": message_id })))
}

/// Run the inactivity sweep once. Per-target failures are reported in the
/// result list; the response status stays 200.
pub async fn check_and_notify_inactive(State(state): State<AppState>) -> AppResult<Response> {
    let report =
        notifier::notify_inactive_devices(&state.d1, state.fcm.as_deref(), &state.config.notifier)
            .await?;

    let response = match report {
        SweepReport::NoRelations => Json(json!({
            "message": "No device relations found. No notifications sent."
        }))
        .into_response(),
        SweepReport::Completed(results) => Json(json!({
            "status": "completed",
            "results": results,
        }))
        .into_response(),
    };
    Ok(response)
}
