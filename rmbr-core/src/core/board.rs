use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to every freshly attached board.
pub const DEFAULT_BOARD_TITLE: &str = "Kanban Board";

/// Display color of a board column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnColor {
    #[default]
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
}

/// An ordered bucket of cards within a board.
///
/// `card_ids` is the display order; every listed card names this column as
/// its `column_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    pub color: ColumnColor,
    pub card_ids: Vec<String>,
}

impl Column {
    pub(crate) fn new(title: impl Into<String>, color: ColumnColor) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            color,
            card_ids: Vec::new(),
        }
    }

    pub fn contains(&self, card_id: &str) -> bool {
        self.card_ids.iter().any(|id| id == card_id)
    }
}

/// A kanban board attached to a single page. The board owns its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub title: String,
    pub columns: Vec<Column>,
    pub page_id: String,
}

impl Board {
    /// Builds a board for `page_id` with the three starter columns
    /// "To Do" (gray), "In Progress" (blue) and "Done" (green).
    pub(crate) fn seeded(id: String, page_id: String) -> Self {
        Self {
            id,
            title: DEFAULT_BOARD_TITLE.to_string(),
            columns: vec![
                Column::new("To Do", ColumnColor::Gray),
                Column::new("In Progress", ColumnColor::Blue),
                Column::new("Done", ColumnColor::Green),
            ],
            page_id,
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    /// Returns the first column listing `card_id`.
    pub fn column_of(&self, card_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.contains(card_id))
    }
}
