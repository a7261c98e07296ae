use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Sky condition label attached to readings and forecasts.
///
/// The set is closed: a payload carrying any other string fails to decode
/// instead of being coerced into a fallback label.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Clear,
    Overcast,
    Rain,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Clear => write!(f, "Clear"),
            Condition::Overcast => write!(f, "Overcast"),
            Condition::Rain => write!(f, "Rain"),
        }
    }
}

/// One station measurement.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Air temperature in degrees Celsius
    pub temperature_c: f64,
    /// Wind speed in km/h
    pub wind_speed_kmh: f64,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: f64,
    /// Barometric pressure in millibars
    pub pressure_mbar: f64,
    /// Station latitude, when the device reports a fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Station longitude, when the device reports a fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Measurement timestamp
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// One row of model output for a forecast day.
///
/// Each model fills only the fields it predicts, so every field except the
/// date may be absent, and several rows may target the same date. Row order
/// carries no meaning; consumers sort and merge.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedReading {
    /// Forecast day
    pub date: Date,
    /// Predicted temperature in degrees Celsius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_temperature_c: Option<f64>,
    /// Predicted relative humidity percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_humidity_pct: Option<f64>,
    /// Predicted wind speed in km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_wind_speed_kmh: Option<f64>,
    /// Predicted barometric pressure in millibars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_pressure_mbar: Option<f64>,
    /// Predicted sky condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}
