mod device;
mod reading;
mod user;

pub use device::*;
pub use reading::*;
pub use user::*;

pub type Id = i32;
