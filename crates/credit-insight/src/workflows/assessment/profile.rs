use std::sync::Arc;

use tracing::warn;

use super::domain::ProfileRecord;
use super::storage::{KeyValueStore, StorageError, PROFILE_KEY};
use super::validation::{check_profile_for_save, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize personal information: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted operator profile. Saved as a unit, never field by field.
pub struct ProfileStore<S> {
    store: Arc<S>,
}

impl<S: KeyValueStore> ProfileStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Falls back to the default profile when the slot is empty or unreadable.
    pub fn load(&self) -> ProfileRecord {
        match self.store.get(PROFILE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "stored personal information is unreadable; using defaults");
                ProfileRecord::default()
            }),
            Ok(None) => ProfileRecord::default(),
            Err(err) => {
                warn!(error = %err, "personal information unavailable; using defaults");
                ProfileRecord::default()
            }
        }
    }

    pub fn save(&self, profile: &ProfileRecord) -> Result<(), ProfileError> {
        check_profile_for_save(profile)?;
        let payload = serde_json::to_string(profile)?;
        self.store.set(PROFILE_KEY, &payload)?;
        Ok(())
    }
}
