//! Snapshot sources
//!
//! A source produces raw snapshot payloads; validation happens later in
//! [`crate::snapshot`]. Fetches run on spawned tasks and report back through
//! the viewer's event channel tagged with their [`RequestId`].

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::error::{MnemographError, Result};
use crate::snapshot::RequestId;

/// Trait for anything that can deliver a graph snapshot
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current snapshot payload
    async fn fetch(&self) -> Result<Value>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Reads a JSON snapshot file on every fetch
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn fetch(&self) -> Result<Value> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            MnemographError::Snapshot(format!(
                "Failed to read snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Serves an in-memory payload that can be swapped at runtime
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotSource {
    payload: Arc<RwLock<Value>>,
}

impl MemorySnapshotSource {
    pub fn new(payload: Value) -> Self {
        Self {
            payload: Arc::new(RwLock::new(payload)),
        }
    }

    pub async fn replace(&self, payload: Value) {
        *self.payload.write().await = payload;
    }
}

#[async_trait]
impl SnapshotSource for MemorySnapshotSource {
    async fn fetch(&self) -> Result<Value> {
        Ok(self.payload.read().await.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Result of one fetch, delivered to the event loop
#[derive(Debug)]
pub struct FetchOutcome {
    pub request: RequestId,
    pub payload: Result<Value>,
}

/// Run one fetch on a background task and send its outcome to `sender`.
///
/// Nothing is sent if the receiving side has gone away.
pub fn spawn_fetch<E>(
    source: Arc<dyn SnapshotSource>,
    request: RequestId,
    sender: mpsc::UnboundedSender<E>,
) -> JoinHandle<()>
where
    E: From<FetchOutcome> + Send + 'static,
{
    tokio::spawn(async move {
        tracing::debug!(source = source.name(), request = %request, "Fetching snapshot");
        let payload = source.fetch().await;
        if let Err(ref e) = payload {
            tracing::warn!(source = source.name(), request = %request, "Snapshot fetch failed: {e}");
        }
        if sender.send(E::from(FetchOutcome { request, payload })).is_err() {
            tracing::debug!(request = %request, "Event loop closed, dropping fetch result");
        }
    })
}
