//! Service Layer
//!
//! Business rules on top of the repository layer.

mod ordering_service;

pub use ordering_service::OrderingService;
