use std::error::Error;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// Seconds between appended readings while the binary runs.
    pub tick_seconds: u64,
    pub history_page_size: u32,
    /// Weight of the newest sample in the exponential smoothing forecast.
    pub smoothing_alpha: f64,
    pub forecast_days: u32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            tick_seconds: 10,
            history_page_size: 10,
            smoothing_alpha: 0.4,
            forecast_days: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub server: Server,
    pub simulation: Simulation,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))?;

        Ok(settings)
    }
}
