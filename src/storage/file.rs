use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::{SnapshotStore, StorageError};

/// JSON file snapshot store.
///
/// Saves write `<file>.tmp` first and rename it over the target, so a crash
/// mid-write leaves either the old or the new snapshot on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Option<T>, StorageError> {
        let Some(bytes) = read_optional(&self.path).await? else {
            tracing::info!("No snapshot at {:?}, starting empty", self.path);
            return Ok(None);
        };

        match serde_json::from_slice::<T>(&bytes) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(source) => {
                tracing::warn!(
                    error = %source,
                    path = %self.path.display(),
                    "failed to parse snapshot, trying tmp fallback"
                );
                let tmp = self.tmp_path();
                let fallback = read_optional(&tmp)
                    .await?
                    .and_then(|tmp_bytes| serde_json::from_slice::<T>(&tmp_bytes).ok());

                match fallback {
                    Some(snapshot) => {
                        tracing::warn!(path = %tmp.display(), "recovered snapshot from tmp file");
                        Ok(Some(snapshot))
                    }
                    None => Err(StorageError::Corrupt {
                        path: self.path.clone(),
                        source,
                    }),
                }
            }
        }
    }

    async fn save(&self, snapshot: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StorageError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!("Snapshot written to {:?} ({} bytes)", self.path, bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Numbers {
        values: Vec<u32>,
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store: JsonFileStore<Numbers> = JsonFileStore::new(dir.path().join("numbers.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_leaves_no_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("numbers.json");
        let store: JsonFileStore<Numbers> = JsonFileStore::new(&path);

        let snapshot = Numbers { values: vec![1, 2, 3] };
        store.save(&snapshot).await.unwrap();

        assert!(path.exists());
        assert!(!store.tmp_path().exists());
        assert_eq!(store.load().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_file() {
        let dir = TempDir::new().unwrap();
        let store: JsonFileStore<Numbers> = JsonFileStore::new(dir.path().join("numbers.json"));

        store.save(&Numbers { values: vec![1, 2, 3, 4] }).await.unwrap();
        store.save(&Numbers { values: vec![9] }).await.unwrap();

        assert_eq!(
            store.load().await.unwrap(),
            Some(Numbers { values: vec![9] })
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numbers.json");
        let store: JsonFileStore<Numbers> = JsonFileStore::new(&path);

        tokio::fs::write(&path, b"{ this is not json ").await.unwrap();
        tokio::fs::write(store.tmp_path(), br#"{"values":[7]}"#)
            .await
            .unwrap();

        assert_eq!(
            store.load().await.unwrap(),
            Some(Numbers { values: vec![7] })
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_without_fallback_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numbers.json");
        let store: JsonFileStore<Numbers> = JsonFileStore::new(&path);

        tokio::fs::write(&path, b"not json").await.unwrap();

        assert!(matches!(
            store.load().await,
            Err(StorageError::Corrupt { .. })
        ));
    }
}
