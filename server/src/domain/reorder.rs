//! Reorder Types
//!
//! A reorder batch is a list of `(id, order_index)` pairs applied together.

use serde::{Deserialize, Serialize};

use super::error::{DomainError, DomainResult};
use super::item::ItemId;

/// One entry of a reorder batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
    pub id: ItemId,
    #[serde(alias = "reOrder")]
    pub order_index: i32,
}

impl ReorderEntry {
    pub fn new(id: ItemId, order_index: i32) -> Self {
        Self { id, order_index }
    }
}

/// Order index for a newly created item given the current maximum.
///
/// Starts at 1 on an empty list.
pub fn next_order_index(current_max: Option<i32>) -> DomainResult<i32> {
    match current_max {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| DomainError::InvalidInput("order index space exhausted".to_string())),
    }
}
