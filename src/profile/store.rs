//! Whole-collection profile persistence.
//!
//! Every operation reads or writes the complete list of profiles. There is
//! no indexing and no partial update; callers load, mutate in memory and
//! save the result.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::metrics;

use super::types::Profile;

/// Storage backend for the profile collection.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read and parse the full collection.
    async fn load(&self) -> Result<Vec<Profile>, StoreError>;

    /// Replace the stored collection with `profiles`.
    async fn save(&self, profiles: &[Profile]) -> Result<(), StoreError>;
}

/// Profiles kept as a pretty-printed JSON array in a single file.
///
/// Saves go through a sibling `.tmp` file that is renamed over the target,
/// so readers never observe a partially written array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use `path` as the store without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `path` as the store, seeding it with an empty array if missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);

        let exists = fs::try_exists(&store.path)
            .await
            .map_err(|source| store.read_error(source))?;

        if !exists {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| store.write_error(source))?;
            }
            store.save(&[]).await?;
            info!(path = %store.path.display(), "Created empty profile store");
        }

        Ok(store)
    }

    /// Location of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Profile>, StoreError> {
        let _timer = metrics::timer_store_load();

        let bytes = fs::read(&self.path)
            .await
            .map_err(|source| self.read_error(source))?;
        let profiles: Vec<Profile> = serde_json::from_slice(&bytes).map_err(StoreError::Format)?;

        debug!(path = %self.path.display(), count = profiles.len(), "Loaded profiles");
        Ok(profiles)
    }

    async fn save(&self, profiles: &[Profile]) -> Result<(), StoreError> {
        let _timer = metrics::timer_store_save();

        let body = serde_json::to_vec_pretty(profiles).map_err(StoreError::Format)?;
        let tmp = self.temp_path();

        if let Err(source) = fs::write(&tmp, &body).await {
            return Err(self.write_error(source));
        }

        if let Err(source) = fs::rename(&tmp, &self.path).await {
            if let Err(e) = fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %e, "Failed to remove temporary store file");
            }
            return Err(self.write_error(source));
        }

        debug!(path = %self.path.display(), count = profiles.len(), "Saved profiles");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FaceData;
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    fn sample() -> Vec<Profile> {
        vec![
            Profile::new("u1", FaceData::new(vec![0.1, 0.2, 0.3])),
            Profile::new("u2", FaceData::new(vec![1.0, 2.0])),
        ]
    }

    #[tokio::test]
    async fn open_seeds_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let store = JsonFileStore::open(&path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"[{"userId":"u1","faceData":{"landmarks":[1.5]}}]"#).unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        let profiles = store.load().await.unwrap();

        assert_eq!(profiles, vec![Profile::new("u1", FaceData::new(vec![1.5]))]);
    }

    #[tokio::test]
    async fn save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("data.json")).await.unwrap();

        assert_ok!(store.save(&sample()).await);

        assert_eq!(store.load().await.unwrap(), sample());
    }

    #[tokio::test]
    async fn save_writes_pretty_json_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        store.save(&sample()).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \"userId\": \"u1\""));
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[tokio::test]
    async fn wrong_shape_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"userId":"u1"}"#).unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Format(_)));
    }

    #[tokio::test]
    async fn duplicates_in_file_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"[{"userId":"u1","faceData":{"landmarks":[1]}},{"userId":"u1","faceData":{"landmarks":[2]}}]"#,
        )
        .unwrap();

        let profiles = JsonFileStore::new(&path).load().await.unwrap();
        assert_eq!(profiles.len(), 2);
    }

    #[tokio::test]
    async fn save_into_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("gone").join("data.json"));

        let err = assert_err!(store.save(&sample()).await);
        assert!(matches!(err, StoreError::Write { .. }));
    }
}
