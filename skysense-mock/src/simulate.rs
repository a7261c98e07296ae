use rand::Rng;
use skysense_api::models::{Condition, DeviceMeta, PredictedReading, Reading};
use time::{Date, Duration, OffsetDateTime};

const BASE_TEMPERATURE_C: f64 = 24.0;
const BASE_HUMIDITY_PCT: f64 = 70.0;
const BASE_PRESSURE_MBAR: f64 = 1009.0;

/// Fraction of the UTC day elapsed, 0.0 at midnight.
pub fn day_fraction(now: OffsetDateTime) -> f64 {
    let seconds_since_midnight = now.time().hour() as u32 * 3600
        + now.time().minute() as u32 * 60
        + now.time().second() as u32;

    seconds_since_midnight as f64 / 86400.0 // Total seconds in a day = 86400
}

pub fn simulated_temperature(day_fraction: f64, phase: f64) -> f64 {
    let radians = (day_fraction + phase) * 2.0 * std::f64::consts::PI;

    BASE_TEMPERATURE_C + radians.sin() * 8.0
}

/// Humidity runs inverse to temperature: muggy nights, drier afternoons.
pub fn simulated_humidity(day_fraction: f64, phase: f64) -> f64 {
    let radians = (day_fraction + phase) * 2.0 * std::f64::consts::PI;

    (BASE_HUMIDITY_PCT - radians.sin() * 25.0).clamp(0.0, 100.0)
}

/// Semidiurnal pressure tide, two crests per day.
pub fn simulated_pressure(day_fraction: f64, phase: f64) -> f64 {
    let radians = (day_fraction + phase) * 4.0 * std::f64::consts::PI;

    BASE_PRESSURE_MBAR + radians.cos() * 4.0
}

pub fn simulated_wind(day_fraction: f64, phase: f64) -> f64 {
    let radians = (day_fraction + phase) * 2.0 * std::f64::consts::PI;

    6.0 + radians.sin().max(0.0) * 9.0
}

/// One fresh reading for a station; jitter keeps the curves from looking
/// canned.
pub fn station_reading(station: &DeviceMeta, phase: f64, now: OffsetDateTime) -> Reading {
    let fraction = day_fraction(now);
    let mut rng = rand::rng();

    Reading {
        temperature_c: round1(simulated_temperature(fraction, phase) + rng.random_range(-0.8..0.8)),
        wind_speed_kmh: round1(simulated_wind(fraction, phase) + rng.random_range(0.0..4.0)),
        humidity_pct: round1(
            (simulated_humidity(fraction, phase) + rng.random_range(-3.0..3.0)).clamp(0.0, 100.0),
        ),
        pressure_mbar: round1(simulated_pressure(fraction, phase) + rng.random_range(-1.5..1.5)),
        latitude: station.latitude,
        longitude: station.longitude,
        recorded_at: now,
    }
}

/// Level after folding every sample into single-pole exponential smoothing,
/// newest last. `None` when there are no samples.
pub fn exponential_smoothing(values: impl Iterator<Item = f64>, alpha: f64) -> Option<f64> {
    let mut level: Option<f64> = None;

    for value in values {
        level = Some(match level {
            Some(level) => alpha * value + (1.0 - alpha) * level,
            None => value,
        });
    }

    level
}

/// Forecast rows the way the upstream emits them: per day, one numeric row
/// from the smoothing model and one condition row, sparse on purpose.
pub fn forecast(readings: &[Reading], alpha: f64, days: u32, from: Date) -> Vec<PredictedReading> {
    let temperature = exponential_smoothing(readings.iter().map(|r| r.temperature_c), alpha);
    let humidity = exponential_smoothing(readings.iter().map(|r| r.humidity_pct), alpha);
    let wind = exponential_smoothing(readings.iter().map(|r| r.wind_speed_kmh), alpha);
    let pressure = exponential_smoothing(readings.iter().map(|r| r.pressure_mbar), alpha);

    let mut rows = Vec::with_capacity(days as usize * 2);
    for day in 1..=days {
        let date = from + Duration::days(day as i64);

        rows.push(PredictedReading {
            date,
            predicted_temperature_c: temperature.map(round1),
            predicted_humidity_pct: humidity.map(round1),
            predicted_wind_speed_kmh: wind.map(round1),
            predicted_pressure_mbar: pressure.map(round1),
            condition: None,
        });
        rows.push(PredictedReading {
            date,
            predicted_temperature_c: None,
            predicted_humidity_pct: None,
            predicted_wind_speed_kmh: None,
            predicted_pressure_mbar: None,
            condition: humidity.map(condition_for),
        });
    }

    rows
}

/// Server-side condition rule applied to the smoothed humidity.
fn condition_for(humidity_pct: f64) -> Condition {
    if humidity_pct >= 90.0 {
        Condition::Rain
    } else if humidity_pct >= 60.0 {
        Condition::Overcast
    } else {
        Condition::Clear
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    fn reading(temperature_c: f64, humidity_pct: f64) -> Reading {
        Reading {
            temperature_c,
            wind_speed_kmh: 5.0,
            humidity_pct,
            pressure_mbar: 1010.0,
            latitude: None,
            longitude: None,
            recorded_at: datetime!(2025-03-14 12:00:00 UTC),
        }
    }

    #[test]
    fn test_smoothing_weights_newest_sample() {
        let level = exponential_smoothing([10.0, 20.0].into_iter(), 0.5);
        assert_eq!(level, Some(15.0));

        let level = exponential_smoothing([10.0, 20.0, 30.0].into_iter(), 0.5);
        assert_eq!(level, Some(22.5));
    }

    #[test]
    fn test_smoothing_of_nothing_is_none() {
        assert_eq!(exponential_smoothing(std::iter::empty(), 0.4), None);
    }

    #[test]
    fn test_forecast_emits_sparse_row_pairs() {
        let readings = vec![reading(20.0, 95.0), reading(22.0, 93.0)];

        let rows = forecast(&readings, 0.4, 3, date!(2025-03-14));

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].date, date!(2025-03-15));
        assert_eq!(rows[5].date, date!(2025-03-17));

        // Numeric rows carry no condition and condition rows no numbers.
        assert!(rows[0].predicted_temperature_c.is_some());
        assert!(rows[0].condition.is_none());
        assert!(rows[1].predicted_temperature_c.is_none());
        assert_eq!(rows[1].condition, Some(Condition::Rain));
    }

    #[test]
    fn test_forecast_without_history_is_all_null() {
        let rows = forecast(&[], 0.4, 2, date!(2025-03-14));

        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| {
            row.predicted_temperature_c.is_none() && row.condition.is_none()
        }));
    }

    #[test]
    fn test_humidity_stays_in_bounds() {
        for step in 0..=48 {
            let fraction = step as f64 / 48.0;
            let humidity = simulated_humidity(fraction, 0.3);
            assert!((0.0..=100.0).contains(&humidity));
        }
    }

    #[test]
    fn test_day_fraction() {
        assert_eq!(day_fraction(datetime!(2025-03-14 00:00:00 UTC)), 0.0);
        assert_eq!(day_fraction(datetime!(2025-03-14 12:00:00 UTC)), 0.5);
        assert_eq!(day_fraction(datetime!(2025-03-14 18:00:00 UTC)), 0.75);
    }
}
