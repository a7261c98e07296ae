mod auth;
mod device;
mod error;
mod history;
mod telemetry;
mod weather;

pub use auth::*;
pub use device::*;
pub use error::*;
pub use history::*;
pub use telemetry::*;
pub use weather::*;
