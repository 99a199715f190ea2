use axum::{routing::get, Router};

use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    // Analytics relays
    let analytics_routes = Router::new()
        .route("/insights", get(handlers::analytics::insights))
        .route("/queries", get(handlers::analytics::recent_queries));

    // Raw D1 query relay
    let d1_routes = Router::new().route("/d1/execute-query", get(handlers::d1::execute_query));

    // Push relays
    let notification_routes = Router::new()
        .route("/fcm/send", get(handlers::notifications::send_notification))
        .route(
            "/check-and-notify-inactive",
            get(handlers::notifications::check_and_notify_inactive),
        );

    Router::new()
        .merge(analytics_routes)
        .merge(d1_routes)
        .merge(notification_routes)
        .with_state(state)
}
