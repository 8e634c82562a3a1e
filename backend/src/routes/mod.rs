//! Route definitions for the Resale Operations API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Inventory management
        .nest("/inventory", inventory_routes())
        // Bulk lot bookkeeping
        .nest("/bulk", bulk_routes())
        // Manual sales
        .nest("/manual-sales", manual_routes())
        // Sales summary and reconciliation
        .nest("/summary", summary_routes())
        // Master data
        .nest("/masters", master_routes())
        // Regulatory ledger
        .nest("/ledger", ledger_routes())
        // Monthly reports
        .nest("/reports", report_routes())
}

fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/:item_id",
            get(handlers::get_item).put(handlers::update_item),
        )
        .route("/:item_id/sell", post(handlers::mark_sold))
        .route("/:item_id/return", post(handlers::mark_returned))
}

fn bulk_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/purchases",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route("/purchases/:purchase_id", get(handlers::get_purchase))
        .route(
            "/purchases/:purchase_id/sales",
            get(handlers::list_sales).post(handlers::record_sale),
        )
        .route("/sales/:sale_id", put(handlers::update_sale))
}

fn manual_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_manual_sales).post(handlers::create_manual_sale),
        )
        .route(
            "/:sale_id/cost-recovered",
            put(handlers::set_cost_recovered),
        )
}

fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_summary))
        .route("/reconcile", post(handlers::reconcile))
}

fn master_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/platforms",
            get(handlers::list_platforms).post(handlers::create_platform),
        )
        .route("/platforms/:platform_id", put(handlers::update_platform))
        .route(
            "/suppliers",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route("/suppliers/:supplier_id", put(handlers::update_supplier))
        .route(
            "/goals",
            get(handlers::list_goals).put(handlers::upsert_goal),
        )
}

fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::view_ledger))
        .route("/export.csv", get(handlers::export_csv))
}

fn report_routes() -> Router<AppState> {
    Router::new().route("/monthly", get(handlers::monthly_report))
}
