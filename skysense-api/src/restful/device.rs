use serde::{Deserialize, Serialize};

use crate::models::{DeviceStatus, Id, Reading};

/// One row of the device list screen.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Device identifier
    pub id: Id,
    /// Human-readable station location
    pub place_name: String,
    /// Reporting status
    pub status: DeviceStatus,
    /// Most recent measurement, absent for stations that never reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_reading: Option<Reading>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceListResponse {
    /// Stations owned by the requested user
    pub data: Vec<DeviceSummary>,
}
