use tracing::{debug, info, warn};

use crate::{
    config::NotifierConfig,
    error::AppResult,
    models::{DevicePushInfo, InactiveRelation, NotificationOutcome},
    push::fcm::FcmClient,
    storage::d1::D1Client,
};

const NOTIFICATION_TITLE: &str = "Activity alert";

// Source devices with notifications enabled whose last update is older than
// the staleness threshold, with the subscribed target ids aggregated into
// one comma-joined value per source.
const STALE_RELATIONS_SQL: &str = r#"
SELECT
    drn.sourceDeviceId AS sourceDeviceId,
    GROUP_CONCAT(DISTINCT drn.targetDeviceId) AS targetDeviceIds
FROM DeviceRelationNoti AS drn
JOIN Devices AS d ON drn.sourceDeviceId = d.id
WHERE d.notificationsEnabled = 1
  AND d.lastUpdated < datetime('now', ?1)
  AND drn.sourceDeviceId IS NOT NULL
GROUP BY drn.sourceDeviceId
"#;

const PUSH_INFO_SQL: &str = "SELECT pushToken, notificationsEnabled FROM Devices WHERE id = ?1";

pub enum SweepReport {
    NoRelations,
    Completed(Vec<NotificationOutcome>),
}

/// Query for device relations whose source has gone silent and push one
/// notification per subscribed target, recording a per-target outcome.
/// Per-target failures are reported in the outcome list, never escalated.
pub async fn notify_inactive_devices(
    d1: &D1Client,
    fcm: Option<&FcmClient>,
    config: &NotifierConfig,
) -> AppResult<SweepReport> {
    let staleness = format!("-{} minutes", config.staleness_minutes);
    let relations: Vec<InactiveRelation> = d1
        .query_as(STALE_RELATIONS_SQL, &[staleness.as_str()])
        .await?;

    if relations.is_empty() {
        info!("no inactive device relations found");
        return Ok(SweepReport::NoRelations);
    }
    info!("processing {} inactive device relation(s)", relations.len());

    let mut results = Vec::new();
    for relation in relations {
        let (source_id, targets) = match (relation.source_device_id, relation.target_device_ids) {
            (Some(source), Some(targets)) if !targets.is_empty() => (source, targets),
            _ => continue,
        };

        for target_id in targets.split(',').filter(|id| !id.is_empty()) {
            let rows: Vec<DevicePushInfo> = d1.query_as(PUSH_INFO_SQL, &[target_id]).await?;
            let device = rows.into_iter().next();
            if let Some(device) = &device {
                debug!(
                    "push info for {}: enabled={:?}",
                    target_id, device.notifications_enabled
                );
            }

            let Some(push_token) = device.and_then(|d| d.push_token) else {
                results.push(NotificationOutcome::skipped(
                    target_id,
                    "No push token found for this device",
                ));
                continue;
            };

            let Some(client) = fcm else {
                results.push(NotificationOutcome::failed(
                    target_id,
                    "Push client is not initialized",
                ));
                continue;
            };

            let body = format!(
                "Linked device {} has been inactive for more than {} minutes",
                source_id, config.staleness_minutes
            );
            match client.send(&push_token, NOTIFICATION_TITLE, &body).await {
                Ok(message_id) => results.push(NotificationOutcome::sent(target_id, message_id)),
                Err(e) => {
                    warn!("push send to {} failed: {}", target_id, e);
                    results.push(NotificationOutcome::failed(target_id, e.to_string()));
                }
            }
        }
    }

    Ok(SweepReport::Completed(results))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::CloudflareConfig;
    use crate::error::AppError;
    use crate::models::OutcomeStatus;
    use crate::push::fcm;

    fn d1_client(server: &MockServer) -> D1Client {
        D1Client::new(CloudflareConfig {
            api_token: Some("test-token".to_string()),
            account_id: Some("acc-1".to_string()),
            database_id: Some("db-1".to_string()),
            api_base: server.uri(),
        })
    }

    fn sweep_config() -> NotifierConfig {
        NotifierConfig {
            staleness_minutes: 60,
        }
    }

    async fn mount_relations(server: &MockServer, rows: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/accounts/acc-1/d1/database/db-1/query"))
            .and(body_string_contains("GROUP_CONCAT"))
            .and(body_partial_json(json!({ "params": ["-60 minutes"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{ "results": rows, "success": true }],
                "success": true,
            })))
            .mount(server)
            .await;
    }

    async fn mount_push_info(server: &MockServer, device_id: &str, rows: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/accounts/acc-1/d1/database/db-1/query"))
            .and(body_string_contains("pushToken"))
            .and(body_partial_json(json!({ "params": [device_id] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{ "results": rows, "success": true }],
                "success": true,
            })))
            .mount(server)
            .await;
    }

    async fn mount_token_endpoint(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fcm-access-token",
                "expires_in": 3599,
                "token_type": "Bearer",
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn stale_source_notifies_each_target_once() {
        let store = MockServer::start().await;
        let push = MockServer::start().await;

        mount_relations(
            &store,
            json!([{ "sourceDeviceId": "D1", "targetDeviceIds": "T1,T2" }]),
        )
        .await;
        mount_push_info(
            &store,
            "T1",
            json!([{ "pushToken": "tok1", "notificationsEnabled": 1 }]),
        )
        .await;
        mount_push_info(
            &store,
            "T2",
            json!([{ "pushToken": null, "notificationsEnabled": 1 }]),
        )
        .await;

        mount_token_endpoint(&push).await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/test-project/messages:send"))
            .and(body_partial_json(json!({ "message": { "token": "tok1" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/test-project/messages/0:42",
            })))
            .expect(1)
            .mount(&push)
            .await;

        let client = fcm::test_client(format!("{}/token", push.uri()), push.uri());
        let report = notify_inactive_devices(&d1_client(&store), Some(&client), &sweep_config())
            .await
            .unwrap();

        let SweepReport::Completed(results) = report else {
            panic!("expected a completed sweep");
        };
        assert_eq!(
            results,
            vec![
                NotificationOutcome::sent("T1", "projects/test-project/messages/0:42"),
                NotificationOutcome::skipped("T2", "No push token found for this device"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_relation_set_sends_nothing() {
        let store = MockServer::start().await;
        let push = MockServer::start().await;

        mount_relations(&store, json!([])).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&push)
            .await;

        let client = fcm::test_client(format!("{}/token", push.uri()), push.uri());
        let report = notify_inactive_devices(&d1_client(&store), Some(&client), &sweep_config())
            .await
            .unwrap();
        assert!(matches!(report, SweepReport::NoRelations));
    }

    #[tokio::test]
    async fn push_failure_does_not_abort_the_sweep() {
        let store = MockServer::start().await;
        let push = MockServer::start().await;

        mount_relations(
            &store,
            json!([{ "sourceDeviceId": "D1", "targetDeviceIds": "T1,T2" }]),
        )
        .await;
        mount_push_info(
            &store,
            "T1",
            json!([{ "pushToken": "tokA", "notificationsEnabled": 1 }]),
        )
        .await;
        mount_push_info(
            &store,
            "T2",
            json!([{ "pushToken": "tokB", "notificationsEnabled": 1 }]),
        )
        .await;

        mount_token_endpoint(&push).await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/test-project/messages:send"))
            .and(body_partial_json(json!({ "message": { "token": "tokA" } })))
            .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded"))
            .mount(&push)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/test-project/messages:send"))
            .and(body_partial_json(json!({ "message": { "token": "tokB" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/test-project/messages/0:43",
            })))
            .expect(1)
            .mount(&push)
            .await;

        let client = fcm::test_client(format!("{}/token", push.uri()), push.uri());
        let report = notify_inactive_devices(&d1_client(&store), Some(&client), &sweep_config())
            .await
            .unwrap();

        let SweepReport::Completed(results) = report else {
            panic!("expected a completed sweep");
        };
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].target_device_id, "T1");
        assert_eq!(results[0].status, OutcomeStatus::Failed);
        assert!(results[0].error.as_deref().unwrap().contains("quota exceeded"));
        assert_eq!(
            results[1],
            NotificationOutcome::sent("T2", "projects/test-project/messages/0:43")
        );
    }

    #[tokio::test]
    async fn absent_push_client_is_recorded_per_target() {
        let store = MockServer::start().await;

        mount_relations(
            &store,
            json!([{ "sourceDeviceId": "D1", "targetDeviceIds": "T1" }]),
        )
        .await;
        mount_push_info(
            &store,
            "T1",
            json!([{ "pushToken": "tok1", "notificationsEnabled": 1 }]),
        )
        .await;

        let report = notify_inactive_devices(&d1_client(&store), None, &sweep_config())
            .await
            .unwrap();

        let SweepReport::Completed(results) = report else {
            panic!("expected a completed sweep");
        };
        assert_eq!(
            results,
            vec![NotificationOutcome::failed(
                "T1",
                "Push client is not initialized"
            )]
        );
    }

    #[tokio::test]
    async fn missing_store_configuration_fails_before_any_call() {
        let d1 = D1Client::new(CloudflareConfig {
            api_token: None,
            account_id: None,
            database_id: None,
            api_base: "http://127.0.0.1:1".to_string(),
        });

        let err = notify_inactive_devices(&d1, None, &sweep_config())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
