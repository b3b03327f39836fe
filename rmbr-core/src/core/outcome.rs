//! Explicit results for store mutations that may target stale references.
//!
//! The workspace store never fails on an unknown id. Instead every mutation
//! returns an [`Outcome`] that is either [`Outcome::Applied`] or
//! [`Outcome::Ignored`] with the reason the store left its state untouched.
//!
//! ```rust
//! use rmbr_core::{Ignored, Outcome, WorkspaceStore};
//!
//! let mut store = WorkspaceStore::new();
//! let outcome = store.add_column("no-such-board", "Backlog");
//! assert_eq!(outcome, Outcome::Ignored(Ignored::MissingBoard("no-such-board".to_string())));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a mutation left the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "camelCase")]
pub enum Ignored {
    /// No page with this id exists.
    MissingPage(String),
    /// No board with this id exists.
    MissingBoard(String),
    /// The owning board has no column with this id.
    MissingColumn(String),
    /// No card with this id exists.
    MissingCard(String),
    /// A move named a source column that does not hold the card.
    #[serde(rename_all = "camelCase")]
    CardNotInColumn { card_id: String, column_id: String },
    /// The page already carries a board; at most one board per page.
    #[serde(rename_all = "camelCase")]
    BoardAlreadyAttached { page_id: String, board_id: String },
    /// Re-parenting would put a page underneath itself.
    #[serde(rename_all = "camelCase")]
    WouldCreateCycle { page_id: String, parent_id: String },
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPage(id) => write!(f, "page {id} not found"),
            Self::MissingBoard(id) => write!(f, "board {id} not found"),
            Self::MissingColumn(id) => write!(f, "column {id} not found"),
            Self::MissingCard(id) => write!(f, "card {id} not found"),
            Self::CardNotInColumn { card_id, column_id } => {
                write!(f, "card {card_id} is not in column {column_id}")
            }
            Self::BoardAlreadyAttached { page_id, board_id } => {
                write!(f, "page {page_id} already has board {board_id}")
            }
            Self::WouldCreateCycle { page_id, parent_id } => {
                write!(f, "page {page_id} cannot move under {parent_id}")
            }
        }
    }
}

/// The result of a store mutation.
///
/// `T` carries whatever the mutation produces when it runs (a new id, a
/// [`DeleteResult`](crate::DeleteResult), or nothing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
#[must_use]
pub enum Outcome<T = ()> {
    /// The mutation ran and the store changed.
    Applied(T),
    /// The mutation addressed a stale or invalid reference; nothing changed.
    Ignored(Ignored),
}

impl<T> Outcome<T> {
    /// Returns `true` if the mutation changed the store.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Returns `true` if the mutation was skipped.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }

    /// Consumes the outcome and returns the applied value, if any.
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Ignored(_) => None,
        }
    }

    /// Returns the reason the mutation was skipped, if it was.
    pub fn ignored(&self) -> Option<&Ignored> {
        match self {
            Self::Applied(_) => None,
            Self::Ignored(reason) => Some(reason),
        }
    }
}
