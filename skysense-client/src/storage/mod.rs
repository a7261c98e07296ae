mod file;
mod memory;

pub use file::*;
pub use memory::*;

use async_trait::async_trait;

/// Minimal async key-value contract for device-local persistence.
///
/// Keys and values are strings. Reading an absent key yields `Ok(None)`,
/// `set_item` upserts, and removing a missing key succeeds.
#[async_trait]
pub trait LocalStorage: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    async fn set_item(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    async fn remove_item(&mut self, key: &str) -> Result<(), Self::Error>;

    async fn clear(&mut self) -> Result<(), Self::Error>;
}
