use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::LocalStorage;

/// Single-document storage for desktop and development builds.
///
/// The whole key-value map lives in one JSON file. Reads are served from
/// memory; every mutation rewrites the file before returning, so whatever
/// `set_item` acknowledged survives a crash.
pub struct FileStorage {
    path: PathBuf,
    data: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the document at `path`, starting empty when none exists yet.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err),
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self) -> io::Result<()> {
        let raw = serde_json::to_vec_pretty(&self.data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        tokio::fs::write(&self.path, raw).await
    }
}

#[async_trait]
impl LocalStorage for FileStorage {
    type Error = io::Error;

    async fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.data.get(key).cloned())
    }

    async fn set_item(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.data.insert(key.to_string(), value.to_string());
        self.flush().await
    }

    async fn remove_item(&mut self, key: &str) -> Result<(), Self::Error> {
        if self.data.remove(key).is_some() {
            self.flush().await?;
        }

        Ok(())
    }

    async fn clear(&mut self) -> Result<(), Self::Error> {
        self.data.clear();
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn scratch_file(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        std::env::temp_dir().join(format!("{prefix}-{nanos}.json"))
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let path = scratch_file("skysense-storage");

        let mut storage = FileStorage::open(&path).await.unwrap();
        storage.set_item("token", "abc123").await.unwrap();
        storage.set_item("user", r#"{"id":1}"#).await.unwrap();
        storage.remove_item("user").await.unwrap();
        drop(storage);

        let storage = FileStorage::open(&path).await.unwrap();
        assert_eq!(
            storage.get_item("token").await.unwrap().as_deref(),
            Some("abc123")
        );
        assert_eq!(storage.get_item("user").await.unwrap(), None);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_clear_empties_document() {
        let path = scratch_file("skysense-storage-clear");

        let mut storage = FileStorage::open(&path).await.unwrap();
        storage.set_item("token", "abc123").await.unwrap();
        storage.clear().await.unwrap();

        let storage = FileStorage::open(&path).await.unwrap();
        assert_eq!(storage.get_item("token").await.unwrap(), None);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_removing_missing_key_succeeds() {
        let path = scratch_file("skysense-storage-missing");

        let mut storage = FileStorage::open(&path).await.unwrap();
        storage.remove_item("never-set").await.unwrap();

        let _ = tokio::fs::remove_file(&path).await;
    }
}
