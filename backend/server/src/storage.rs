//! # File store
//!
//! Fallback persistence: one pretty-printed JSON document per submission inside
//! `RESPONSES_DIR`.
//!
//! - The identifier is a UUID v4, the file name is `response_<timestamp>_<id>.json`
//! - Documents are written to a hidden temporary name created with `create_new`
//!   and then renamed, so readers never see half-written files
//! - Unreadable documents are skipped with a warning when listing
use std::path::{Path, PathBuf};

use questions::StoredResponse;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};
use tracing::warn;
use uuid::Uuid;

use crate::store::{NewResponse, StoreError};

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, response: NewResponse) -> Result<StoredResponse, StoreError> {
        let stored = response.with_id(Uuid::new_v4().to_string());

        let name = format!(
            "response_{}_{}.json",
            stored.created_at.format("%Y%m%d_%H%M%S_%6f"),
            stored.id
        );
        let path = self.dir.join(&name);
        let tmp_path = self.dir.join(format!(".{name}.tmp"));

        let bytes = serde_json::to_vec_pretty(&stored)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &path).await?;

        Ok(stored)
    }

    /// Every readable document, newest first.
    pub async fn list(&self) -> Result<Vec<StoredResponse>, StoreError> {
        let mut responses = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            let is_json = path.extension().is_some_and(|ext| ext == "json");
            if !is_json {
                continue;
            }

            let parsed = fs::read(&path)
                .await
                .map_err(StoreError::from)
                .and_then(|bytes| serde_json::from_slice::<StoredResponse>(&bytes).map_err(StoreError::from));

            match parsed {
                Ok(response) => responses.push(response),
                Err(e) => warn!("Skipping unreadable response file {}: {e}", path.display()),
            }
        }

        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(responses)
    }

    pub async fn is_writable(&self) -> bool {
        fs::metadata(&self.dir)
            .await
            .map(|meta| meta.is_dir() && !meta.permissions().readonly())
            .unwrap_or(false)
    }
}
