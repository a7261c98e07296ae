pub mod api;
pub mod classify;
pub mod error;
pub mod guard;
pub mod history;
pub mod poller;
pub mod session;
pub mod storage;
pub mod view;

pub use api::*;
pub use classify::*;
pub use error::*;
pub use guard::*;
pub use history::*;
pub use poller::*;
pub use session::*;
pub use storage::*;
pub use view::*;
