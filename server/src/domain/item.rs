//! Item Entity
//!
//! Represents a todo item with an explicit position in the list.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{DomainError, DomainResult};

/// Store-assigned item identifier (SQLite rowid)
pub type ItemId = i64;

/// A todo item
///
/// `id == 0` marks an item that has not been persisted yet.
/// `order_index` may be absent on a candidate item; the ordering service
/// assigns one before it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier
    #[serde(default)]
    pub id: ItemId,
    /// Item name
    pub name: String,
    /// Optional price
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Optional due date
    #[serde(default)]
    pub limit_date: Option<NaiveDate>,
    /// Position in the list (lower sorts first)
    #[serde(default, alias = "reOrder")]
    pub order_index: Option<i32>,
}

impl Item {
    /// Create a new unsaved item with only a name
    pub fn new(id: ItemId, name: String) -> Self {
        Self {
            id,
            name,
            price: None,
            limit_date: None,
            order_index: None,
        }
    }

    /// Create an item with an explicit order index
    pub fn with_order(id: ItemId, name: String, order_index: i32) -> Self {
        Self {
            order_index: Some(order_index),
            ..Self::new(id, name)
        }
    }

    /// Check if the item has not been persisted yet
    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    /// Overlay the mutable fields of a payload onto this item.
    ///
    /// Every field is replaced, including `order_index`: a payload without
    /// one clears it and the next save assigns a fresh index.
    pub fn overlay(&mut self, payload: ItemPayload) {
        self.name = payload.name;
        self.price = payload.price;
        self.limit_date = payload.limit_date;
        self.order_index = payload.order_index;
    }
}

/// Client-supplied fields for create and full update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub limit_date: Option<NaiveDate>,
    #[serde(default, alias = "reOrder")]
    pub order_index: Option<i32>,
}

impl ItemPayload {
    /// Reject payloads without a usable name
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("name is required".to_string()));
        }
        Ok(())
    }

    /// Build an unsaved item from this payload
    pub fn into_item(self) -> Item {
        let mut item = Item::new(0, String::new());
        item.overlay(self);
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, order_index: Option<i32>) -> ItemPayload {
        ItemPayload {
            name: name.to_string(),
            price: Some(Decimal::new(1250, 2)),
            limit_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            order_index,
        }
    }

    #[test]
    fn test_item_creation() {
        let item = Item::new(0, "Buy milk".to_string());
        assert!(item.is_new());
        assert_eq!(item.name, "Buy milk");
        assert!(item.order_index.is_none());
    }

    #[test]
    fn test_overlay_keeps_id() {
        let mut item = Item::with_order(7, "Old".to_string(), 3);
        item.overlay(payload("New", Some(10)));

        assert_eq!(item.id, 7);
        assert_eq!(item.name, "New");
        assert_eq!(item.price, Some(Decimal::new(1250, 2)));
        assert_eq!(item.order_index, Some(10));
    }

    #[test]
    fn test_overlay_without_order_clears_it() {
        let mut item = Item::with_order(7, "Old".to_string(), 3);
        item.overlay(payload("New", None));
        assert!(item.order_index.is_none());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let err = payload("   ", None).validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(payload("ok", None).validate().is_ok());
    }

    #[test]
    fn test_payload_accepts_legacy_field_name() {
        let parsed: ItemPayload =
            serde_json::from_str(r#"{"name":"a","price":3.5,"limitDate":"2025-01-02","reOrder":4}"#)
                .unwrap();
        assert_eq!(parsed.order_index, Some(4));
        assert_eq!(parsed.price, Some(Decimal::new(35, 1)));
        assert_eq!(parsed.limit_date, NaiveDate::from_ymd_opt(2025, 1, 2));
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let item = Item::with_order(1, "a".to_string(), 2);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["orderIndex"], 2);
        assert!(json["limitDate"].is_null());
    }
}
