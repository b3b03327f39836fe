//! Opaque rich-content payload shared by pages and cards.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered block-document tree owned by a page or card.
///
/// The store never inspects or validates the structure; whatever the editor
/// hands in is stored and returned verbatim. A fresh document is the empty
/// block list `[]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    /// Returns an empty block list.
    #[must_use]
    pub fn empty() -> Self {
        Self(Value::Array(Vec::new()))
    }

    /// Wraps an editor-produced value without looking at it.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns `true` for an empty block list or JSON `null`.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Array(blocks) => blocks.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
