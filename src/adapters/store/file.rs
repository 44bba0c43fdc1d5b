use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::{EndpointState, HistoryEntry, Observation};
use crate::ports::{Diagnostic, Diagnostics, ObservationStore, StoreError};

use super::codec::{self, Snapshot};

/// 95% of 256 KiB
pub const DEFAULT_MAX_SPACE_USAGE_BYTES: u64 = 249_036;

/// Observation store persisted as a single JSON file.
///
/// The file is read lazily on first access and only written by `flush`.
/// Between those two points the in-memory snapshot is authoritative.
pub struct FileStore {
    path: PathBuf,
    max_space_usage_bytes: u64,
    data: Option<Snapshot>,
    updated: BTreeSet<String>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, max_space_usage_bytes: u64, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            path: path.into(),
            max_space_usage_bytes,
            data: None,
            updated: BTreeSet::new(),
            diagnostics,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_loaded(&mut self) -> &mut Snapshot {
        if self.data.is_none() {
            let loaded = match tokio::fs::read_to_string(&self.path).await {
                Ok(raw) => codec::decode(&raw).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            let snapshot = match loaded {
                Ok(snapshot) => {
                    debug!(path = %self.path.display(), endpoints = snapshot.len(), "loaded storage");
                    snapshot
                }
                Err(reason) => {
                    self.diagnostics.emit(Diagnostic::StoreReset {
                        path: self.path.display().to_string(),
                        reason,
                    });
                    Snapshot::new()
                }
            };
            self.data = Some(snapshot);
        }

        self.data.get_or_insert_with(Snapshot::new)
    }

    /// Evict the oldest entries of `history` until it fits `budget` bytes.
    ///
    /// Each pass keeps `len * budget / size` entries, which approximates a
    /// proportional cut without measuring every prefix. Passes repeat until
    /// the history fits so that a second flush finds nothing to trim. The
    /// newest entry is never evicted, even when it alone exceeds the budget.
    fn trim_to_budget(history: &mut Vec<Observation>, budget: u64) -> Result<(), StoreError> {
        loop {
            let len = history.len();
            if len <= 1 {
                return Ok(());
            }

            let size = codec::encoded_len(history)? as u64;
            if size <= budget {
                return Ok(());
            }

            let keep = ((len as u128 * budget as u128) / size as u128) as usize;
            let keep = keep.clamp(1, len - 1);
            history.drain(..len - keep);
        }
    }

    async fn persist(&self, raw: String) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, raw.as_bytes()).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

#[async_trait]
impl ObservationStore for FileStore {
    async fn add(&mut self, endpoint: &str, observation: Observation) {
        self.ensure_loaded()
            .await
            .entry(endpoint.to_string())
            .or_default()
            .push(observation);
        self.updated.insert(endpoint.to_string());
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        self.ensure_loaded().await;
        let data = self.data.get_or_insert_with(Snapshot::new);

        let stale: Vec<String> = data
            .keys()
            .filter(|endpoint| !self.updated.contains(*endpoint))
            .cloned()
            .collect();
        for endpoint in &stale {
            data.remove(endpoint);
        }
        if !stale.is_empty() {
            self.diagnostics.emit(Diagnostic::EndpointsDropped { endpoints: stale });
        }

        if !data.is_empty() {
            let budget = self.max_space_usage_bytes / data.len() as u64;
            for (endpoint, history) in data.iter_mut() {
                let before = history.len();
                Self::trim_to_budget(history, budget)?;
                if history.len() != before {
                    self.diagnostics.emit(Diagnostic::HistoryTrimmed {
                        endpoint: endpoint.clone(),
                        from: before,
                        to: history.len(),
                    });
                }
            }
        }

        let endpoints = data.len();
        let raw = codec::encode(data)?;
        info!(path = %self.path.display(), bytes = raw.len(), endpoints, "storing observations");
        self.persist(raw).await
    }

    async fn get_state(&mut self, endpoint: &str) -> EndpointState {
        let history = self.ensure_loaded().await.get(endpoint).map(Vec::as_slice).unwrap_or_default();

        match history {
            [] => EndpointState::default(),
            [current] => EndpointState {
                current: Some(current.clone()),
                previous: None,
            },
            [.., previous, current] => EndpointState {
                current: Some(current.clone()),
                previous: Some(previous.clone()),
            },
        }
    }

    async fn get_history(&mut self, endpoint: &str) -> Vec<HistoryEntry> {
        self.ensure_loaded()
            .await
            .get(endpoint)
            .map(|history| history.iter().map(Observation::to_history_entry).collect())
            .unwrap_or_default()
    }
}
