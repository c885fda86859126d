//! HTTP API server for recording and managing retail sales.
//!
//! Exposes the sale aggregate over REST, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{SaleRepository, SaleService};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::sales::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: SaleRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<R>))
        .route(
            "/sales",
            post(routes::sales::create::<R>).get(routes::sales::list::<R>),
        )
        .route("/sales/count", get(routes::sales::count::<R>))
        .route(
            "/sales/by-number/{sale_number}",
            get(routes::sales::get_by_number::<R>),
        )
        .route(
            "/sales/{id}",
            get(routes::sales::get::<R>).delete(routes::sales::delete::<R>),
        )
        .route("/sales/{id}/cancel", post(routes::sales::cancel::<R>))
        .route("/sales/{id}/items", post(routes::sales::add_item::<R>))
        .route(
            "/sales/{id}/items/{product_code}",
            put(routes::sales::update_item_quantity::<R>).delete(routes::sales::remove_item::<R>),
        )
        .route(
            "/sales/{id}/items/{product_code}/price",
            put(routes::sales::update_item_unit_price::<R>),
        )
        .route(
            "/sales/{id}/items/{product_code}/cancel",
            post(routes::sales::cancel_item::<R>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a sale repository.
pub fn create_default_state<R: SaleRepository + 'static>(
    repository: R,
    config: &Config,
) -> Arc<AppState<R>> {
    Arc::new(AppState {
        sale_service: SaleService::new(repository),
        max_page_size: config.max_page_size,
    })
}
