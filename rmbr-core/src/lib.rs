//! Core library for rmbr, a workspace of nested pages with optional kanban boards.
//!
//! The primary entry point is [`WorkspaceStore`], which owns every page, board
//! and card. All mutations go through `WorkspaceStore` methods and report an
//! [`Outcome`] instead of failing on stale ids.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    board::{Board, Column, ColumnColor},
    card::{Card, CardProperty, CardUpdate, PropertyType},
    delete::DeleteResult,
    document::Document,
    error::{Result, RmbrError},
    outcome::{Ignored, Outcome},
    page::{Page, PageUpdate},
    settings::{
        load_settings, load_settings_from, save_settings, save_settings_to, settings_file_path,
        StoreSettings,
    },
    snapshot::{PersistedState, Snapshot, SNAPSHOT_VERSION},
    storage::Storage,
    workspace::{IntegrityViolation, WorkspaceStore},
};
