use std::collections::BTreeMap;
use std::convert::Infallible;

use async_trait::async_trait;

use super::LocalStorage;

/// Volatile storage for tests and previews. Contents vanish on drop.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    type Error = Infallible;

    async fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.data.get(key).cloned())
    }

    async fn set_item(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&mut self, key: &str) -> Result<(), Self::Error> {
        self.data.remove(key);
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), Self::Error> {
        self.data.clear();
        Ok(())
    }
}
