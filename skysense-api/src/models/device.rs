use std::fmt;

use serde::{Deserialize, Serialize};

use super::Id;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Offline,
    Online,
}

impl From<String> for DeviceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "online" => DeviceStatus::Online,
            _ => DeviceStatus::Offline,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "online"),
            DeviceStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Station identity and placement.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// Device identifier
    pub id: Id,
    /// Human-readable station location
    pub place_name: String,
    /// Reporting status
    pub status: DeviceStatus,
    /// Station latitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Station longitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}
