//! Sale endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{
    AddItem, Aggregate, CancelItem, CancelSale, CreateSale, Money, NewSaleItem, RemoveItem, Sale,
    SaleDetails, SaleItem, SaleQuery, SaleRepository, SaleService, UpdateItemQuantity,
    UpdateItemUnitPrice,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: SaleRepository> {
    pub sale_service: SaleService<R>,
    pub max_page_size: usize,
}

// -- Request types --

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateSaleRequest {
    pub sale_number: String,
    pub sale_date: Option<DateTime<Utc>>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_document: String,
    pub branch_name: String,
    pub branch_code: String,
    pub items: Vec<SaleItemRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemRequest {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_code: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnitPriceRequest {
    pub unit_price: Decimal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesParams {
    pub customer_name: Option<String>,
    pub branch_code: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub cancelled: Option<bool>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: String,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_document: String,
    pub branch_name: String,
    pub branch_code: String,
    pub items: Vec<SaleItemResponse>,
    pub total_amount: Money,
    pub is_cancelled: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemResponse {
    pub id: String,
    pub product_name: String,
    pub product_code: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub discount_tier: String,
    pub discount_percentage: Decimal,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub is_cancelled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesResponse {
    pub sales: Vec<SaleResponse>,
    pub skip: usize,
    pub take: usize,
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSaleResponse {
    pub id: String,
    pub sale_number: String,
    pub is_cancelled: bool,
    pub message: String,
}

impl From<&SaleItem> for SaleItemResponse {
    fn from(item: &SaleItem) -> Self {
        Self {
            id: item.id().to_string(),
            product_name: item.product_name().to_string(),
            product_code: item.product_code().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            discount_tier: item.discount_tier().to_string(),
            discount_percentage: item.discount_percentage(),
            discount_amount: item.discount_amount(),
            total_amount: item.total_amount(),
            is_cancelled: item.is_cancelled(),
        }
    }
}

impl From<&Sale> for SaleResponse {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id().to_string(),
            sale_number: sale.sale_number().to_string(),
            sale_date: sale.sale_date(),
            customer_name: sale.customer_name().to_string(),
            customer_email: sale.customer_email().to_string(),
            customer_document: sale.customer_document().to_string(),
            branch_name: sale.branch_name().to_string(),
            branch_code: sale.branch_code().to_string(),
            items: sale.items().iter().map(SaleItemResponse::from).collect(),
            total_amount: sale.total_amount(),
            is_cancelled: sale.is_cancelled(),
            version: sale.version().as_i64(),
            created_at: sale.created_at(),
            updated_at: sale.updated_at(),
        }
    }
}

impl From<SaleItemRequest> for NewSaleItem {
    fn from(req: SaleItemRequest) -> Self {
        NewSaleItem::new(
            req.product_name,
            req.product_code,
            to_quantity(req.quantity),
            Money::new(req.unit_price),
        )
    }
}

// -- Handlers --

/// POST /sales: record a new sale with its items.
#[tracing::instrument(skip(state, req))]
pub async fn create<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), ApiError> {
    let mut details = SaleDetails::new(req.sale_number)
        .customer(req.customer_name, req.customer_email, req.customer_document)
        .branch(req.branch_name, req.branch_code);
    details.sale_date = req.sale_date;

    let items = req.items.into_iter().map(NewSaleItem::from).collect();
    let sale = state
        .sale_service
        .create_sale(CreateSale::new(details, items))
        .await?;

    Ok((StatusCode::CREATED, Json(SaleResponse::from(&sale))))
}

/// GET /sales: list sales, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<ListSalesParams>,
) -> Result<Json<ListSalesResponse>, ApiError> {
    let skip = params.skip.unwrap_or(0);
    let take = params
        .take
        .unwrap_or(state.max_page_size)
        .min(state.max_page_size);

    let mut query = SaleQuery::new().offset(skip).limit(take);
    query.customer_name = params.customer_name;
    query.branch_code = params.branch_code;
    query.from_date = params.from;
    query.to_date = params.to;
    query.cancelled = params.cancelled;

    let sales = state.sale_service.list_sales(query).await?;

    Ok(Json(ListSalesResponse {
        sales: sales.iter().map(SaleResponse::from).collect(),
        skip,
        take,
    }))
}

/// GET /sales/count: number of stored sales.
#[tracing::instrument(skip(state))]
pub async fn count<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.sale_service.count_sales().await?;
    Ok(Json(CountResponse { count }))
}

/// GET /sales/{id}: load a sale by ID.
#[tracing::instrument(skip(state))]
pub async fn get<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let sale = state
        .sale_service
        .get_sale(sale_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sale {id} not found")))?;

    Ok(Json(SaleResponse::from(&sale)))
}

/// GET /sales/by-number/{sale_number}: load a sale by its sale number.
#[tracing::instrument(skip(state))]
pub async fn get_by_number<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(sale_number): Path<String>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale = state
        .sale_service
        .get_sale_by_number(&sale_number)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sale number {sale_number} not found")))?;

    Ok(Json(SaleResponse::from(&sale)))
}

/// DELETE /sales/{id}: delete a sale.
#[tracing::instrument(skip(state))]
pub async fn delete<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    state.sale_service.delete_sale(sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sales/{id}/cancel: cancel a sale.
#[tracing::instrument(skip(state))]
pub async fn cancel<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<CancelSaleResponse>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let sale = state
        .sale_service
        .cancel_sale(CancelSale::new(sale_id))
        .await?;

    Ok(Json(CancelSaleResponse {
        id: sale.id().to_string(),
        sale_number: sale.sale_number().to_string(),
        is_cancelled: sale.is_cancelled(),
        message: format!("Sale {} has been successfully cancelled", sale.sale_number()),
    }))
}

/// POST /sales/{id}/items: add an item, merging with an existing line.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<SaleItemRequest>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let sale = state
        .sale_service
        .add_item(AddItem::new(sale_id, req.into()))
        .await?;

    Ok(Json(SaleResponse::from(&sale)))
}

/// PUT /sales/{id}/items/{product_code}: set an item's quantity.
#[tracing::instrument(skip(state, req))]
pub async fn update_item_quantity<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path((id, product_code)): Path<(String, String)>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let cmd = UpdateItemQuantity::new(sale_id, product_code, to_quantity(req.quantity));
    let sale = state.sale_service.update_item_quantity(cmd).await?;

    Ok(Json(SaleResponse::from(&sale)))
}

/// PUT /sales/{id}/items/{product_code}/price: set an item's unit price.
#[tracing::instrument(skip(state, req))]
pub async fn update_item_unit_price<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path((id, product_code)): Path<(String, String)>,
    Json(req): Json<UpdateUnitPriceRequest>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let cmd = UpdateItemUnitPrice::new(sale_id, product_code, Money::new(req.unit_price));
    let sale = state.sale_service.update_item_unit_price(cmd).await?;

    Ok(Json(SaleResponse::from(&sale)))
}

/// DELETE /sales/{id}/items/{product_code}: remove an item.
#[tracing::instrument(skip(state))]
pub async fn remove_item<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path((id, product_code)): Path<(String, String)>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let sale = state
        .sale_service
        .remove_item(RemoveItem::new(sale_id, product_code))
        .await?;

    Ok(Json(SaleResponse::from(&sale)))
}

/// POST /sales/{id}/items/{product_code}/cancel: cancel one item.
#[tracing::instrument(skip(state))]
pub async fn cancel_item<R: SaleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path((id, product_code)): Path<(String, String)>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let sale = state
        .sale_service
        .cancel_item(CancelItem::new(sale_id, product_code))
        .await?;

    Ok(Json(SaleResponse::from(&sale)))
}

fn parse_sale_id(id: &str) -> Result<AggregateId, ApiError> {
    id.parse()
        .map_err(|e: common::ParseIdError| ApiError::BadRequest(e.to_string()))
}

/// Out-of-range quantities become 0 so that the aggregate reports them.
fn to_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or(0)
}
