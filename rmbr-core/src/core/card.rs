use crate::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a user-defined card attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    Text,
    Number,
    Select,
    MultiSelect,
    Date,
    Checkbox,
    Url,
    Email,
    Person,
}

/// A typed key/value attribute on a card.
///
/// `value` is not checked against `kind`; callers own its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardProperty {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub value: Value,
}

/// A content-bearing unit living in exactly one column of one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    pub content: Document,
    pub column_id: String,
    pub board_id: String,
    pub properties: Vec<CardProperty>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub(crate) fn new(
        id: String,
        board_id: String,
        column_id: String,
        title: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            content: Document::empty(),
            column_id,
            board_id,
            properties: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply(&mut self, update: CardUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(properties) = update.properties {
            self.properties = properties;
        }
        self.updated_at = now;
    }

    pub fn property(&self, name: &str) -> Option<&CardProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A partial set of card fields to merge into an existing card.
///
/// Column and board membership only change through
/// [`WorkspaceStore::move_card`](crate::WorkspaceStore::move_card).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<Document>,
    #[serde(default)]
    pub properties: Option<Vec<CardProperty>>,
}

impl CardUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: Document) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_properties(mut self, properties: Vec<CardProperty>) -> Self {
        self.properties = Some(properties);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_type_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&PropertyType::MultiSelect).unwrap(),
            r#""multi-select""#
        );
        let parsed: PropertyType = serde_json::from_str(r#""checkbox""#).unwrap();
        assert_eq!(parsed, PropertyType::Checkbox);
    }

    #[test]
    fn test_card_property_serializes_type_key() {
        let prop = CardProperty {
            id: "prop-1".to_string(),
            name: "Due".to_string(),
            kind: PropertyType::Date,
            value: json!("2026-01-31"),
        };
        let json = serde_json::to_string(&prop).unwrap();
        assert!(json.contains(r#""type":"date""#));
    }

    #[test]
    fn test_apply_replaces_properties_and_keeps_membership() {
        let now = Utc::now();
        let mut card = Card::new(
            "c1".to_string(),
            "b1".to_string(),
            "col".to_string(),
            "Task".to_string(),
            now,
        );
        let props = vec![CardProperty {
            id: "p".to_string(),
            name: "Done".to_string(),
            kind: PropertyType::Checkbox,
            value: json!(true),
        }];
        card.apply(CardUpdate::title("Renamed").with_properties(props), now);

        assert_eq!(card.title, "Renamed");
        assert_eq!(card.column_id, "col");
        assert_eq!(card.property("Done").map(|p| &p.value), Some(&json!(true)));
        assert!(card.property("Missing").is_none());
    }
}
