//! Internal domain modules for the rmbr core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod board;
pub mod card;
pub mod delete;
pub mod document;
pub mod error;
pub mod outcome;
pub mod page;
pub mod settings;
pub mod snapshot;
pub mod storage;
pub mod workspace;

#[doc(inline)]
pub use board::{Board, Column, ColumnColor};
#[doc(inline)]
pub use card::{Card, CardProperty, CardUpdate, PropertyType};
#[doc(inline)]
pub use delete::DeleteResult;
#[doc(inline)]
pub use document::Document;
#[doc(inline)]
pub use error::{Result, RmbrError};
#[doc(inline)]
pub use outcome::{Ignored, Outcome};
#[doc(inline)]
pub use page::{Page, PageUpdate};
#[doc(inline)]
pub use settings::StoreSettings;
#[doc(inline)]
pub use snapshot::{PersistedState, Snapshot};
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use workspace::{IntegrityViolation, WorkspaceStore};
