use std::fmt;

use serde::{Deserialize, Serialize};
use skysense_api::models::{Condition, Reading};

/// Wind bucket shown next to the raw km/h figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindStrength {
    Normal,
    Moderate,
    Strong,
}

impl fmt::Display for WindStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindStrength::Normal => write!(f, "Normal"),
            WindStrength::Moderate => write!(f, "Moderate"),
            WindStrength::Strong => write!(f, "Strong"),
        }
    }
}

/// Art for the headline condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherIcon {
    Sunny,
    Stormy,
    Rainy,
}

impl fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherIcon::Sunny => write!(f, "sunny"),
            WeatherIcon::Stormy => write!(f, "stormy"),
            WeatherIcon::Rainy => write!(f, "rainy"),
        }
    }
}

// Thresholds are business rules; boundary inclusivity and clause order are
// part of the contract.

pub fn classify_wind(speed_kmh: f64) -> WindStrength {
    if speed_kmh >= 15.0 {
        WindStrength::Strong
    } else if speed_kmh >= 5.0 {
        WindStrength::Moderate
    } else {
        WindStrength::Normal
    }
}

pub fn classify_humidity(humidity_pct: f64) -> Condition {
    if humidity_pct >= 90.0 {
        Condition::Rain
    } else if humidity_pct >= 60.0 {
        Condition::Overcast
    } else {
        Condition::Clear
    }
}

/// Pressure rule, clauses evaluated in order. Low pressure with low
/// humidity and high pressure with high humidity both fall through to
/// `Clear`; the fallthrough is intentional and kept as-is.
pub fn classify_pressure(pressure_mbar: f64, humidity_pct: f64) -> Condition {
    if pressure_mbar <= 990.0 && humidity_pct >= 90.0 {
        Condition::Rain
    } else if pressure_mbar >= 990.0 && humidity_pct < 90.0 {
        Condition::Overcast
    } else {
        Condition::Clear
    }
}

pub fn weather_icon(humidity_pct: f64) -> WeatherIcon {
    if humidity_pct >= 90.0 {
        WeatherIcon::Rainy
    } else if humidity_pct >= 60.0 {
        WeatherIcon::Stormy
    } else {
        WeatherIcon::Sunny
    }
}

/// Labels derived fresh from a reading every time it is rendered, never
/// persisted, so they are exactly as stale as the reading itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub wind: WindStrength,
    pub humidity: Condition,
    pub pressure: Condition,
}

impl Classification {
    pub fn of(reading: &Reading) -> Self {
        Self {
            wind: classify_wind(reading.wind_speed_kmh),
            humidity: classify_humidity(reading.humidity_pct),
            pressure: classify_pressure(reading.pressure_mbar, reading.humidity_pct),
        }
    }
}
