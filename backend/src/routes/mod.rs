//! Route definitions for the cement tracking API

use axum::{
    routing::{delete, get},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/deliveries", delivery_routes())
        .nest("/plants", plant_routes())
        .nest("/stock", stock_routes())
        .nest("/reports", report_routes())
}

/// Cement delivery routes
fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_deliveries).post(handlers::create_delivery),
        )
        .route("/summary", get(handlers::get_delivery_summary))
        .route(
            "/:delivery_id",
            get(handlers::get_delivery)
                .put(handlers::update_delivery)
                .delete(handlers::delete_delivery),
        )
}

/// Plant registry routes
fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plants).post(handlers::create_plant))
        .route(
            "/:plant_id",
            get(handlers::get_plant)
                .put(handlers::update_plant)
                .delete(handlers::delete_plant),
        )
}

/// Stock ledger routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        .route("/movements/:movement_id", delete(handlers::delete_movement))
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new().route(
        "/reconciliation",
        get(handlers::get_reconciliation_report),
    )
}
