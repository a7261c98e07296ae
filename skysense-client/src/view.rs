use std::collections::BTreeMap;

use serde::Serialize;
use skysense_api::models::{Condition, DeviceMeta, PredictedReading, Reading};
use skysense_api::restful::TelemetryResponse;
use time::{Date, OffsetDateTime};

use crate::classify::{Classification, WeatherIcon, weather_icon};

/// One forecast day assembled from the sparse per-model rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastEntry {
    pub date: Date,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub pressure_mbar: Option<f64>,
    pub condition: Option<Condition>,
}

impl ForecastEntry {
    fn empty(date: Date) -> Self {
        Self {
            date,
            temperature_c: None,
            humidity_pct: None,
            wind_speed_kmh: None,
            pressure_mbar: None,
            condition: None,
        }
    }
}

/// Collapses prediction rows into one entry per date, ascending.
///
/// Each upstream model emits its own sparse row, so several rows may target
/// the same date; per field, the first non-null value in row order wins.
pub fn merge_forecast(predictions: &[PredictedReading]) -> Vec<ForecastEntry> {
    let mut merged: BTreeMap<Date, ForecastEntry> = BTreeMap::new();

    for row in predictions {
        let entry = merged
            .entry(row.date)
            .or_insert_with(|| ForecastEntry::empty(row.date));

        entry.temperature_c = entry.temperature_c.or(row.predicted_temperature_c);
        entry.humidity_pct = entry.humidity_pct.or(row.predicted_humidity_pct);
        entry.wind_speed_kmh = entry.wind_speed_kmh.or(row.predicted_wind_speed_kmh);
        entry.pressure_mbar = entry.pressure_mbar.or(row.predicted_pressure_mbar);
        entry.condition = entry.condition.or(row.condition);
    }

    merged.into_values().collect()
}

/// Everything one telemetry screen renders for a station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub device: DeviceMeta,
    pub reading: Reading,
    pub classification: Classification,
    pub icon: WeatherIcon,
    pub forecast: Vec<ForecastEntry>,
    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,
}

impl DeviceSnapshot {
    pub fn from_response(response: TelemetryResponse) -> Self {
        let forecast = merge_forecast(&response.predictions);
        let reading = response.latest.reading;

        Self {
            device: response.latest.device,
            classification: Classification::of(&reading),
            icon: weather_icon(reading.humidity_pct),
            forecast,
            reading,
            fetched_at: OffsetDateTime::now_utc(),
        }
    }
}
