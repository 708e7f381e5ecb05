use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::contract::RiskAssessmentResult;
use super::domain::CompleteApplicationRecord;
use super::storage::{KeyValueStore, StorageError, HISTORY_KEY};

/// Opaque identifier for an archived assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(pub String);

impl HistoryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Leading fragment used in export file names.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for HistoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable archived assessment: the exact input sent and the result received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub applicant_name: String,
    pub timestamp: i64,
    pub input_data: CompleteApplicationRecord,
    pub output_data: Arc<RiskAssessmentResult>,
}

impl HistoryEntry {
    pub fn record(
        input: &CompleteApplicationRecord,
        output: Arc<RiskAssessmentResult>,
        timestamp: i64,
    ) -> Self {
        let applicant_name = match input.personal_info.applicant_name.trim() {
            "" => "N/A".to_string(),
            name => name.to_string(),
        };

        Self {
            id: HistoryId::generate(),
            applicant_name,
            timestamp,
            input_data: input.clone(),
            output_data: output,
        }
    }

    pub fn assessed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize assessment history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only assessment log persisted as one JSON array.
///
/// Insertion order is what gets stored; `list` derives the newest-first view.
pub struct HistoryStore<S> {
    store: Arc<S>,
    entries: Vec<HistoryEntry>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Missing or unreadable history starts empty.
    pub fn load(store: Arc<S>) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(error = %err, "stored assessment history is unreadable; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "assessment history unavailable; starting empty");
                Vec::new()
            }
        };

        Self { store, entries }
    }

    /// Prepend and write the whole collection through.
    pub fn add(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.entries.insert(0, entry);
        self.persist()
    }

    /// Returns `Ok(false)` without writing when the id is unknown.
    pub fn remove(&mut self, id: &HistoryId) -> Result<bool, HistoryError> {
        let before = self.entries.len();
        self.entries.retain(|entry| &entry.id != id);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Newest first.
    pub fn list(&self) -> Vec<HistoryEntry> {
        let mut view = self.entries.clone();
        view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        view
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &HistoryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), HistoryError> {
        let payload = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &payload)?;
        Ok(())
    }
}
