use serde::Deserialize;

/// One grouping row from the staleness join: a silent source device and the
/// comma-joined ids of the devices subscribed to it.
#[derive(Debug, Clone, Deserialize)]
pub struct InactiveRelation {
    #[serde(rename = "sourceDeviceId")]
    pub source_device_id: Option<String>,
    #[serde(rename = "targetDeviceIds")]
    pub target_device_ids: Option<String>,
}

/// Push routing info looked up per target device.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicePushInfo {
    #[serde(rename = "pushToken")]
    pub push_token: Option<String>,
    #[serde(rename = "notificationsEnabled")]
    pub notifications_enabled: Option<i64>,
}
