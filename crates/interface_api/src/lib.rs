//! HTTP API Layer
//!
//! REST surface of the credit ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one module per resource (payments, credits, sequences, imports)
//! - **Middleware**: request logging
//! - **DTOs**: camelCase request/response bodies
//! - **Error Handling**: domain errors mapped onto status codes in [`error::ApiError`]
//!
//! The router is storage-agnostic: [`AppState::new`] accepts any adapter that
//! implements the credit-domain ports, so tests run it over the in-memory
//! ledger and the server binary over PostgreSQL.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(Arc::new(PostgresLedger::new(pool)), config.numbering());
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_credit::{
    BulkStateTransitioner, CounterpartyPort, CreditPort, LedgerReconciler, NumberingFormat,
    SequenceAllocator, SequencePort,
};
use domain_import::ImportPipeline;

use crate::handlers::{credits, health, imports, payments, sequences};
use crate::middleware::request_logging;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub credits: Arc<dyn CreditPort>,
    pub ledger: LedgerReconciler,
    pub transitions: BulkStateTransitioner,
    pub sequences: SequenceAllocator,
    pub imports: ImportPipeline,
    /// Format applied to every allocated number
    pub numbering: NumberingFormat,
}

impl AppState {
    /// Wires every service onto one storage adapter
    pub fn new<S>(store: Arc<S>, numbering: NumberingFormat) -> Self
    where
        S: CreditPort + CounterpartyPort + SequencePort + 'static,
    {
        let credits: Arc<dyn CreditPort> = store.clone();
        Self {
            ledger: LedgerReconciler::new(credits.clone()),
            transitions: BulkStateTransitioner::new(credits.clone()),
            sequences: SequenceAllocator::new(store.clone()),
            imports: ImportPipeline::new(credits.clone(), store),
            credits,
            numbering,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let payment_routes = Router::new()
        .route("/", post(payments::apply_payment))
        .route("/:id", delete(payments::reverse_payment));

    let credit_routes = Router::new()
        .route("/status", post(credits::set_status))
        .route("/delete", post(credits::bulk_delete))
        .route("/:id", get(credits::get_credit).delete(credits::delete_credit))
        .route("/:id/payments", get(credits::list_payments));

    let import_routes = Router::new()
        .route("/credits", post(imports::import_credits))
        .route("/payments", post(imports::import_payments));

    let api_routes = Router::new()
        .nest("/payments", payment_routes)
        .nest("/credits", credit_routes)
        .nest("/imports", import_routes)
        .route("/sequences", post(sequences::allocate))
        .layer(axum_middleware::from_fn(request_logging));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
