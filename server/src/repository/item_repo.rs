//! Item Repository
//!
//! SQLite-backed implementation of the item store.

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::traits::{ItemStore, ItemStoreTx};
use crate::domain::{DomainError, DomainResult, Item, ItemId};

const SELECT_ITEMS: &str = "SELECT id, name, price, limit_date, order_index FROM items";

/// SQLite implementation of the item store
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ItemStore for ItemRepository {
    async fn transaction<T, F>(&self, work: F) -> DomainResult<T>
    where
        T: Send,
        F: FnOnce(&dyn ItemStoreTx) -> DomainResult<T> + Send,
    {
        let mut conn = self.conn.lock().await;
        // IMMEDIATE takes the write lock up front so concurrent writers
        // on other connections wait instead of reading a stale max.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let result = work(&SqliteItemTx::new(&tx));
        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    log::error!("rollback failed after {}: {}", err, rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn read<T, F>(&self, work: F) -> DomainResult<T>
    where
        T: Send,
        F: FnOnce(&dyn ItemStoreTx) -> DomainResult<T> + Send,
    {
        let conn = self.conn.lock().await;
        work(&SqliteItemTx::new(&conn))
    }
}

/// Item operations bound to one connection or open transaction
pub struct SqliteItemTx<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemTx<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemStoreTx for SqliteItemTx<'_> {
    fn get_all(&self) -> DomainResult<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_ITEMS} ORDER BY order_index, id"))?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn get_by_id(&self, id: ItemId) -> DomainResult<Option<Item>> {
        let item = self
            .conn
            .query_row(&format!("{SELECT_ITEMS} WHERE id = ?1"), params![id], row_to_item)
            .optional()?;
        Ok(item)
    }

    fn save(&self, item: &Item) -> DomainResult<Item> {
        let order_index = item.order_index.ok_or_else(|| {
            DomainError::InvalidInput(format!("item {} has no order index", item.id))
        })?;
        let price = item.price.map(|p| p.to_string());

        if item.is_new() {
            self.conn.execute(
                "INSERT INTO items (name, price, limit_date, order_index) VALUES (?1, ?2, ?3, ?4)",
                params![item.name, price, item.limit_date, order_index],
            )?;
            return Ok(Item {
                id: self.conn.last_insert_rowid(),
                ..item.clone()
            });
        }

        let changed = self.conn.execute(
            "UPDATE items SET name = ?2, price = ?3, limit_date = ?4, order_index = ?5 WHERE id = ?1",
            params![item.id, item.name, price, item.limit_date, order_index],
        )?;
        // A deleted item is never recreated under its old id
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Item {} not found", item.id)));
        }
        Ok(item.clone())
    }

    fn delete_by_id(&self, id: ItemId) -> DomainResult<()> {
        self.conn
            .execute("DELETE FROM items WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn max_order_index(&self) -> DomainResult<Option<i32>> {
        let max = self
            .conn
            .query_row("SELECT MAX(order_index) FROM items", [], |row| {
                row.get::<_, Option<i32>>(0)
            })?;
        Ok(max)
    }
}

/// Convert a database row to Item
fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    let price = row
        .get::<_, Option<String>>(2)?
        .map(|raw| {
            Decimal::from_str(&raw)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))
        })
        .transpose()?;

    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        price,
        limit_date: row.get(3)?,
        order_index: Some(row.get(4)?),
    })
}
