use serde::{Deserialize, Serialize};

use crate::models::{DeviceMeta, PredictedReading, Reading};

/// Latest measurement together with the station that produced it.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTelemetry {
    /// Current measurement fields, inlined
    #[serde(flatten)]
    pub reading: Reading,
    /// Reporting station
    pub device: DeviceMeta,
}

/// Payload of the smoothing-forecast endpoint: the freshest reading plus
/// per-model prediction rows.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryResponse {
    /// Most recent measurement with device metadata
    pub latest: DeviceTelemetry,
    /// Sparse forecast rows, unordered
    pub predictions: Vec<PredictedReading>,
}
