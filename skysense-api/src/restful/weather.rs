use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Id, Reading};

/// Latest reading of a station currently reporting rain-grade humidity.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainObservation {
    /// Reporting station
    pub device_id: Id,
    /// Human-readable station location
    pub place_name: String,
    /// Measurement fields, inlined
    #[serde(flatten)]
    pub reading: Reading,
}

/// Cross-station rain recap, keyed by device id on the wire.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainRecapResponse {
    pub rainy_conditions: BTreeMap<String, RainObservation>,
}
