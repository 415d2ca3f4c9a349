//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod item_repo;
mod traits;


pub use db::{init_db, DbState, DEFAULT_BUSY_TIMEOUT};
pub use item_repo::{ItemRepository, SqliteItemTx};
pub use traits::{ItemStore, ItemStoreTx};
