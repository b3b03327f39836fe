use crate::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to every freshly created page.
pub const DEFAULT_PAGE_TITLE: &str = "Untitled";

/// A node in the page forest.
///
/// `parent_id` and `children` are maintained by the store: when a page names
/// a parent, that parent lists the page exactly once in `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub content: Document,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub(crate) fn new(id: String, parent_id: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: DEFAULT_PAGE_TITLE.to_string(),
            icon: None,
            cover_image: None,
            content: Document::empty(),
            parent_id,
            children: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the supplied fields and stamps `updated_at`.
    pub(crate) fn apply(&mut self, update: PageUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(icon) = update.icon {
            self.icon = icon;
        }
        if let Some(cover_image) = update.cover_image {
            self.cover_image = cover_image;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        self.updated_at = now;
    }
}

/// A partial set of page fields to merge into an existing page.
///
/// `None` leaves a field as it is. For the optional fields, `Some(None)`
/// clears the value. Tree links are not patchable here; use
/// [`WorkspaceStore::move_page`](crate::WorkspaceStore::move_page).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub icon: Option<Option<String>>,
    #[serde(default)]
    pub cover_image: Option<Option<String>>,
    #[serde(default)]
    pub content: Option<Document>,
}

impl PageUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_cover_image(mut self, cover_image: Option<String>) -> Self {
        self.cover_image = Some(cover_image);
        self
    }

    pub fn with_content(mut self, content: Document) -> Self {
        self.content = Some(content);
        self
    }
}
