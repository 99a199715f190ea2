use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Sent,
    Skipped,
    Failed,
}

/// Per-target result of one notifier sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOutcome {
    pub target_device_id: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationOutcome {
    pub fn sent(target_device_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            target_device_id: target_device_id.into(),
            status: OutcomeStatus::Sent,
            message_id: Some(message_id.into()),
            reason: None,
            error: None,
        }
    }

    pub fn skipped(target_device_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target_device_id: target_device_id.into(),
            status: OutcomeStatus::Skipped,
            message_id: None,
            reason: Some(reason.into()),
            error: None,
        }
    }

    pub fn failed(target_device_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target_device_id: target_device_id.into(),
            status: OutcomeStatus::Failed,
            message_id: None,
            reason: None,
            error: Some(error.into()),
        }
    }
}
