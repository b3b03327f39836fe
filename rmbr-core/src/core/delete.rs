//! Result type for recursive page removal.
//!
//! [`DeleteResult`] is returned inside [`Outcome::Applied`](crate::Outcome::Applied)
//! by [`WorkspaceStore::delete_page`](super::workspace::WorkspaceStore::delete_page).
//! Fields serialize in camelCase (`deletedCount`, `affectedIds`) like every
//! other type that crosses into the presentation layer.
//!
//! ```rust
//! use rmbr_core::DeleteResult;
//!
//! let result = DeleteResult {
//!     deleted_count: 2,
//!     affected_ids: vec!["a".to_string(), "b".to_string()],
//! };
//! let json = serde_json::to_string(&result).unwrap();
//! assert!(json.contains("deletedCount"));
//! assert!(json.contains("affectedIds"));
//! ```

use serde::{Deserialize, Serialize};

/// The outcome of deleting a page together with its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// The total number of pages that were removed.
    pub deleted_count: usize,

    /// IDs of every removed page, the target first, descendants depth-first.
    pub affected_ids: Vec<String>,
}
