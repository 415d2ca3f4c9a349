//! Domain Layer
//!
//! Contains the item entity, reorder types and domain errors.
//! This layer has no storage or transport dependencies.

mod error;
mod item;
mod reorder;

pub use error::{DomainError, DomainResult};
pub use item::{Item, ItemId, ItemPayload};
pub use reorder::{next_order_index, ReorderEntry};
