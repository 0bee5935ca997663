//! Sends the finished answer record to the backend.
//!
//! Submission never fails from the caller's point of view. When the backend
//! cannot be reached, answers with a non-2xx status, or replies with a body
//! that is not a success, the record is appended to a [`LocalCache`] instead.
//! Cached records are kept, never replayed.
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use questions::AnswerRecord;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

const SUBMIT_PATH: &str = "/api/submit";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server answered {0}")]
    Status(StatusCode),

    #[error("Server did not confirm the submission")]
    Rejected,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Where the record ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent { id: String },
    /// Appended to the local list, which now holds `pending` records.
    CachedLocally { pending: usize },
    /// Neither the backend nor the local cache took it.
    Unsaved,
}

#[derive(Deserialize)]
struct SubmitReply {
    success: bool,
    id: String,
}

/// Persistent list of submissions that never reached the backend.
///
/// A single JSON array on disk.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records cached so far, oldest first. A missing file is an empty list.
    pub async fn pending(&self) -> Result<Vec<Value>, CacheError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes)? {
            Value::Array(records) => Ok(records),
            _ => {
                warn!("{} does not hold a list, starting over", self.path.display());
                Ok(Vec::new())
            }
        }
    }

    /// Appends `record` and returns the new list length.
    pub async fn append(&self, record: &AnswerRecord) -> Result<usize, CacheError> {
        let mut records = self.pending().await?;
        records.push(serde_json::to_value(record)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");

        fs::write(&tmp, serde_json::to_vec_pretty(&records)?).await?;
        fs::rename(&tmp, &self.path).await?;

        Ok(records.len())
    }
}

pub struct SubmissionClient {
    http: Client,
    endpoint: String,
    cache: LocalCache,
}

impl SubmissionClient {
    pub fn new(base_url: &str, cache: LocalCache) -> Result<Self, SubmitError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            endpoint: format!("{}{SUBMIT_PATH}", base_url.trim_end_matches('/')),
            cache,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// One attempt against the backend, then the local cache.
    pub async fn submit(&self, record: &AnswerRecord) -> Outcome {
        match self.send(record).await {
            Ok(id) => {
                info!(%id, "Survey submitted");
                Outcome::Sent { id }
            }
            Err(e) => {
                warn!("Submission failed ({e}), caching locally");

                match self.cache.append(record).await {
                    Ok(pending) => Outcome::CachedLocally { pending },
                    Err(e) => {
                        error!("Local cache at {} failed: {e}", self.cache.path().display());
                        Outcome::Unsaved
                    }
                }
            }
        }
    }

    async fn send(&self, record: &AnswerRecord) -> Result<String, SubmitError> {
        let response = self.http.post(&self.endpoint).json(record).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status(status));
        }

        let reply: SubmitReply = response.json().await?;
        if !reply.success || reply.id.is_empty() {
            return Err(SubmitError::Rejected);
        }

        Ok(reply.id)
    }
}
