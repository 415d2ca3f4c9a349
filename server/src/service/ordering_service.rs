//! Ordering Service
//!
//! Owns every order-index rule: assignment on save and batch reorder.
//! All mutation goes through store transactions.

use std::sync::Arc;

use crate::domain::{
    next_order_index, DomainError, DomainResult, Item, ItemId, ItemPayload, ReorderEntry,
};
use crate::repository::{ItemStore, ItemStoreTx};

/// Give `item` the next free index when it has none
fn assign_order_index(tx: &dyn ItemStoreTx, item: &mut Item) -> DomainResult<()> {
    if item.order_index.is_none() {
        let next = next_order_index(tx.max_order_index()?)?;
        log::debug!("assigning order index {} to item {}", next, item.id);
        item.order_index = Some(next);
    }
    Ok(())
}

/// Item operations with order-index policy
pub struct OrderingService<S> {
    store: Arc<S>,
}

impl<S> Clone for OrderingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ItemStore> OrderingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List all items
    pub async fn find_all(&self) -> DomainResult<Vec<Item>> {
        self.store.read(|tx| tx.get_all()).await
    }

    /// Find item by ID; absence is `Ok(None)`
    pub async fn find_by_id(&self, id: ItemId) -> DomainResult<Option<Item>> {
        self.store.read(move |tx| tx.get_by_id(id)).await
    }

    /// Create or update an item.
    ///
    /// An item without an order index is placed after the current maximum.
    /// The max lookup and the write share one transaction, so concurrent
    /// creations never observe the same maximum.
    pub async fn save(&self, mut item: Item) -> DomainResult<Item> {
        self.store
            .transaction(move |tx| {
                assign_order_index(tx, &mut item)?;
                tx.save(&item)
            })
            .await
    }

    /// Overlay `payload` onto a stored item and save it.
    ///
    /// Returns `Ok(None)` when the item does not exist. Lookup and write
    /// share one transaction, so a concurrent delete is never undone.
    pub async fn update(&self, id: ItemId, payload: ItemPayload) -> DomainResult<Option<Item>> {
        self.store
            .transaction(move |tx| {
                let Some(mut item) = tx.get_by_id(id)? else {
                    return Ok(None);
                };
                item.overlay(payload);
                assign_order_index(tx, &mut item)?;
                tx.save(&item).map(Some)
            })
            .await
    }

    /// Remove an item unconditionally; other items keep their indices
    pub async fn delete_by_id(&self, id: ItemId) -> DomainResult<()> {
        self.store.transaction(move |tx| tx.delete_by_id(id)).await
    }

    /// Apply a reorder batch atomically.
    ///
    /// Entries are processed in input order. The first missing ID aborts
    /// the whole batch with [`DomainError::ReorderReferenceMissing`] and
    /// nothing is persisted. Duplicate or gapped indices are stored as given.
    pub async fn reorder(&self, entries: Vec<ReorderEntry>) -> DomainResult<()> {
        let count = entries.len();
        self.store
            .transaction(move |tx| {
                for entry in &entries {
                    let mut item = tx
                        .get_by_id(entry.id)?
                        .ok_or(DomainError::ReorderReferenceMissing(entry.id))?;
                    item.order_index = Some(entry.order_index);
                    tx.save(&item)?;
                }
                Ok(())
            })
            .await
            .inspect_err(|err| log::warn!("reorder of {} items aborted: {}", count, err))?;

        log::info!("reordered {} items", count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{init_db, ItemRepository, DEFAULT_BUSY_TIMEOUT};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::path::{Path, PathBuf};

    async fn setup_service() -> OrderingService<ItemRepository> {
        let db_state = init_db(&PathBuf::from(":memory:"), DEFAULT_BUSY_TIMEOUT)
            .await
            .expect("Failed to init test DB");
        OrderingService::new(Arc::new(ItemRepository::new(db_state.connection())))
    }

    async fn create(service: &OrderingService<ItemRepository>, name: &str) -> Item {
        service
            .save(Item::new(0, name.to_string()))
            .await
            .expect("Failed to create")
    }

    async fn order_of(service: &OrderingService<ItemRepository>, id: ItemId) -> Option<i32> {
        service
            .find_by_id(id)
            .await
            .unwrap()
            .and_then(|item| item.order_index)
    }

    #[tokio::test]
    async fn test_first_item_gets_index_one() {
        let service = setup_service().await;
        let item = create(&service, "first").await;
        assert_eq!(item.order_index, Some(1));
    }

    #[tokio::test]
    async fn test_new_item_follows_current_max() {
        let service = setup_service().await;
        service
            .save(Item::with_order(0, "high".to_string(), 7))
            .await
            .unwrap();

        let item = create(&service, "next").await;
        assert_eq!(item.order_index, Some(8));
    }

    #[tokio::test]
    async fn test_explicit_index_is_kept() {
        let service = setup_service().await;
        service
            .save(Item::with_order(0, "high".to_string(), 50))
            .await
            .unwrap();

        let item = service
            .save(Item::with_order(0, "low".to_string(), 3))
            .await
            .unwrap();
        assert_eq!(item.order_index, Some(3));
        assert_eq!(order_of(&service, item.id).await, Some(3));
    }

    #[tokio::test]
    async fn test_reorder_with_missing_reference_changes_nothing() {
        let service = setup_service().await;
        let a = create(&service, "A").await;
        let b = create(&service, "B").await;
        let c = create(&service, "C").await;

        let err = service
            .reorder(vec![
                ReorderEntry::new(a.id, 30),
                ReorderEntry::new(b.id, 10),
                ReorderEntry::new(99, 5),
            ])
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::ReorderReferenceMissing(99));
        assert_eq!(order_of(&service, a.id).await, Some(1));
        assert_eq!(order_of(&service, b.id).await, Some(2));
        assert_eq!(order_of(&service, c.id).await, Some(3));
    }

    #[tokio::test]
    async fn test_reorder_reports_first_missing_id() {
        let service = setup_service().await;
        let a = create(&service, "A").await;

        let err = service
            .reorder(vec![
                ReorderEntry::new(77, 1),
                ReorderEntry::new(a.id, 2),
                ReorderEntry::new(88, 3),
            ])
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::ReorderReferenceMissing(77));
    }

    #[tokio::test]
    async fn test_reorder_swaps_items() {
        let service = setup_service().await;
        let a = create(&service, "A").await;
        let b = create(&service, "B").await;

        service
            .reorder(vec![ReorderEntry::new(a.id, 2), ReorderEntry::new(b.id, 1)])
            .await
            .unwrap();

        assert_eq!(order_of(&service, a.id).await, Some(2));
        assert_eq!(order_of(&service, b.id).await, Some(1));
    }

    #[tokio::test]
    async fn test_reorder_twice_is_idempotent() {
        let service = setup_service().await;
        let a = create(&service, "A").await;
        let b = create(&service, "B").await;
        let c = create(&service, "C").await;
        let batch = vec![
            ReorderEntry::new(c.id, 1),
            ReorderEntry::new(a.id, 2),
            ReorderEntry::new(b.id, 3),
        ];

        service.reorder(batch.clone()).await.unwrap();
        let once = service.find_all().await.unwrap();
        service.reorder(batch).await.unwrap();
        let twice = service.find_all().await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(once[0].id, c.id);
    }

    #[tokio::test]
    async fn test_reorder_accepts_duplicates_and_gaps() {
        let service = setup_service().await;
        let a = create(&service, "A").await;
        let b = create(&service, "B").await;

        service
            .reorder(vec![ReorderEntry::new(a.id, 5), ReorderEntry::new(b.id, 5)])
            .await
            .unwrap();

        assert_eq!(order_of(&service, a.id).await, Some(5));
        assert_eq!(order_of(&service, b.id).await, Some(5));
    }

    #[tokio::test]
    async fn test_empty_reorder_is_noop() {
        let service = setup_service().await;
        let a = create(&service, "A").await;
        service.reorder(Vec::new()).await.unwrap();
        assert_eq!(order_of(&service, a.id).await, Some(1));
    }

    #[tokio::test]
    async fn test_delete_keeps_sibling_indices() {
        let service = setup_service().await;
        let a = create(&service, "A").await;
        let b = create(&service, "B").await;
        let c = create(&service, "C").await;

        service.delete_by_id(b.id).await.unwrap();

        assert!(service.find_by_id(b.id).await.unwrap().is_none());
        assert_eq!(order_of(&service, a.id).await, Some(1));
        assert_eq!(order_of(&service, c.id).await, Some(3));
    }

    #[tokio::test]
    async fn test_update_overlay_keeps_id() {
        let service = setup_service().await;
        let created = create(&service, "A").await;

        let mut existing = service.find_by_id(created.id).await.unwrap().unwrap();
        existing.name = "A2".to_string();
        existing.price = Some(Decimal::new(500, 2));
        existing.limit_date = NaiveDate::from_ymd_opt(2025, 12, 24);
        existing.order_index = Some(40);
        let saved = service.save(existing).await.unwrap();

        assert_eq!(saved.id, created.id);
        let stored = service.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "A2");
        assert_eq!(stored.order_index, Some(40));
        assert_eq!(service.find_all().await.unwrap().len(), 1);
    }

    fn rename(name: &str, order_index: Option<i32>) -> ItemPayload {
        ItemPayload {
            name: name.to_string(),
            price: None,
            limit_date: None,
            order_index,
        }
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let service = setup_service().await;
        let a = create(&service, "A").await;
        create(&service, "B").await;

        let updated = service
            .update(a.id, rename("A2", Some(7)))
            .await
            .unwrap()
            .expect("item exists");
        assert_eq!(updated.id, a.id);
        assert_eq!(updated.name, "A2");
        assert_eq!(order_of(&service, a.id).await, Some(7));
    }

    #[tokio::test]
    async fn test_update_without_index_moves_to_end() {
        let service = setup_service().await;
        let a = create(&service, "A").await;
        create(&service, "B").await;
        create(&service, "C").await;

        let updated = service.update(a.id, rename("A", None)).await.unwrap().unwrap();
        assert_eq!(updated.order_index, Some(4));
    }

    #[tokio::test]
    async fn test_update_of_deleted_item_does_not_recreate_it() {
        let service = setup_service().await;
        let a = create(&service, "A").await;

        service.delete_by_id(a.id).await.unwrap();
        let result = service.update(a.id, rename("edited", None)).await.unwrap();

        assert!(result.is_none());
        assert!(service.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_save_after_delete_is_not_found() {
        let service = setup_service().await;
        let a = create(&service, "A").await;

        let mut stale = service.find_by_id(a.id).await.unwrap().unwrap();
        service.delete_by_id(a.id).await.unwrap();
        stale.name = "edited".to_string();

        let err = service.save(stale).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(service.find_by_id(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_index_overflow_is_rejected() {
        let service = setup_service().await;
        service
            .save(Item::with_order(0, "max".to_string(), i32::MAX))
            .await
            .unwrap();

        let err = service
            .save(Item::new(0, "overflow".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(service.find_all().await.unwrap().len(), 1);
    }

    async fn file_service(path: &Path) -> OrderingService<ItemRepository> {
        let db_state = init_db(path, DEFAULT_BUSY_TIMEOUT).await.unwrap();
        OrderingService::new(Arc::new(ItemRepository::new(db_state.connection())))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.db");
        let first = file_service(&path).await;
        let second = file_service(&path).await;

        let mut handles = Vec::new();
        for n in 0..10 {
            let service = if n % 2 == 0 { first.clone() } else { second.clone() };
            handles.push(tokio::spawn(async move {
                service.save(Item::new(0, format!("item {n}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut indices: Vec<i32> = first
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|item| item.order_index)
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, (1..=10).collect::<Vec<_>>());
    }
}
