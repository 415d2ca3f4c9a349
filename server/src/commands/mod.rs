//! Commands Layer
//!
//! HTTP handlers that bridge clients to the ordering service.

mod error;
mod item_cmd;

pub use error::{ApiError, AppJson};
pub use item_cmd::*;
