//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::SaleRepository;
use serde::Serialize;

use super::sales::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sales: Option<usize>,
}

/// GET /health: reports whether the sale store answers.
pub async fn check<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.sale_service.count_sales().await {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                sales: Some(count),
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    sales: None,
                }),
            )
        }
    }
}
