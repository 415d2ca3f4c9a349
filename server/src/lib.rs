//! todo-order Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and implementations
//! - service: Order-index policy
//! - commands: HTTP handlers

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod commands;
pub mod config;
pub mod domain;
pub mod repository;
pub mod service;

use config::AppConfig;
use repository::{init_db, ItemRepository};
use service::OrderingService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub items: OrderingService<ItemRepository>,
}

impl AppState {
    pub fn new(repo: ItemRepository) -> Self {
        Self {
            items: OrderingService::new(Arc::new(repo)),
        }
    }
}

/// Build the `/todos` router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/todos/health", get(commands::health))
        .route("/todos/reorder", put(commands::reorder_items))
        .route(
            "/todos",
            get(commands::list_items).post(commands::create_item),
        )
        .route(
            "/todos/{id}",
            get(commands::get_item)
                .put(commands::update_item)
                .delete(commands::delete_item),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Open the database and serve until Ctrl-C
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let db_state = init_db(&config.db_path, config.busy_timeout).await?;
    let state = AppState::new(ItemRepository::new(db_state.connection()));

    let bind_address = config.bind_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("todo-order listening on http://{}", bind_address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("todo-order stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutdown signal received");
}
