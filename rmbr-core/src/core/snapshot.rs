//! Serializable image of the whole workspace store.
//!
//! A [`Snapshot`] holds the three entity maps plus the UI scalars. It is
//! wrapped in a [`PersistedState`] envelope carrying a schema version before
//! it reaches storage; a mismatched version is rejected, not migrated.

use crate::{Board, Card, Page, Result, RmbrError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written into every persisted envelope.
pub const SNAPSHOT_VERSION: u32 = 0;

/// The full state of a [`WorkspaceStore`](crate::WorkspaceStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub pages: BTreeMap<String, Page>,
    pub boards: BTreeMap<String, Board>,
    pub cards: BTreeMap<String, Card>,
    pub active_page: Option<String>,
    pub sidebar_open: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            pages: BTreeMap::new(),
            boards: BTreeMap::new(),
            cards: BTreeMap::new(),
            active_page: None,
            sidebar_open: true,
        }
    }
}

/// Versioned envelope around a [`Snapshot`], the unit written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub state: Snapshot,
    pub version: u32,
}

impl PersistedState {
    pub fn new(state: Snapshot) -> Self {
        Self {
            state,
            version: SNAPSHOT_VERSION,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an envelope and checks its schema version.
    ///
    /// # Errors
    ///
    /// Returns [`RmbrError::Json`] for malformed input and
    /// [`RmbrError::UnsupportedSnapshotVersion`] when `version` differs from
    /// [`SNAPSHOT_VERSION`].
    pub fn from_json(json: &str) -> Result<Self> {
        let persisted: Self = serde_json::from_str(json)?;
        if persisted.version != SNAPSHOT_VERSION {
            return Err(RmbrError::UnsupportedSnapshotVersion {
                found: persisted.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(persisted)
    }
}
