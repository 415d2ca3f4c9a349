//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for item persistence.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;

use crate::domain::{DomainResult, Item, ItemId};

/// Item operations available inside a store transaction
///
/// Calls are synchronous: the owning [`ItemStore`] has already acquired
/// the connection and opened the transaction.
pub trait ItemStoreTx {
    /// List all items
    fn get_all(&self) -> DomainResult<Vec<Item>>;

    /// Find item by ID
    fn get_by_id(&self, id: ItemId) -> DomainResult<Option<Item>>;

    /// Insert a new item (`id == 0`) or update an existing one.
    ///
    /// Updating an ID that is no longer stored fails with `NotFound`.
    fn save(&self, item: &Item) -> DomainResult<Item>;

    /// Delete item by ID; a missing ID is not an error
    fn delete_by_id(&self, id: ItemId) -> DomainResult<()>;

    /// Largest order index across all items, `None` when empty
    fn max_order_index(&self) -> DomainResult<Option<i32>>;
}

/// Durable item store with scoped transactions
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Run `work` inside a write transaction.
    ///
    /// Commits when `work` returns `Ok`; rolls back every staged change
    /// when it returns `Err`.
    async fn transaction<T, F>(&self, work: F) -> DomainResult<T>
    where
        T: Send,
        F: FnOnce(&dyn ItemStoreTx) -> DomainResult<T> + Send;

    /// Run read-only `work` without taking the write lock
    async fn read<T, F>(&self, work: F) -> DomainResult<T>
    where
        T: Send,
        F: FnOnce(&dyn ItemStoreTx) -> DomainResult<T> + Send;
}
