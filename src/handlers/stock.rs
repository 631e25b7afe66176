use crate::{
    auth::TenantContext,
    commands::stock::{AdjustmentOutcome, TransferOutcome, UsageOutcome},
    models::{
        facility_stock::{self, TransferStockInput, UseFacilityStockInput},
        spare_part::{self, AdjustStockInput},
        transfer_log,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct SparePartFilter {
    pub spare_part_id: Option<Uuid>,
}

/// Stock movement routes that sit beside the generic `/spare-parts` CRUD.
pub fn spare_part_stock_routes() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(low_stock))
        .route("/:id/transfer", post(transfer_stock))
        .route("/:id/adjust", post(adjust_stock))
}

pub fn facility_stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_facility_stock))
        .route("/:id/use", post(use_facility_stock))
}

pub async fn transfer_stock(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(spare_part_id): Path<Uuid>,
    Json(input): Json<TransferStockInput>,
) -> ApiResult<TransferOutcome> {
    let outcome = state
        .services
        .stock
        .transfer(&ctx, spare_part_id, input)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(spare_part_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> ApiResult<AdjustmentOutcome> {
    let outcome = state
        .services
        .stock
        .adjust(&ctx, spare_part_id, input)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn low_stock(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> ApiResult<Vec<spare_part::Model>> {
    let parts = state.services.stock.low_stock(&ctx).await?;
    Ok(Json(ApiResponse::success(parts)))
}

pub async fn list_facility_stock(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(filter): Query<SparePartFilter>,
) -> ApiResult<Vec<facility_stock::Model>> {
    let rows = state
        .services
        .stock
        .facility_stock(&ctx, filter.spare_part_id)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn use_facility_stock(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(facility_stock_id): Path<Uuid>,
    Json(input): Json<UseFacilityStockInput>,
) -> ApiResult<UsageOutcome> {
    let outcome = state
        .services
        .stock
        .use_facility_stock(&ctx, facility_stock_id, input)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn list_transfer_log(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(filter): Query<SparePartFilter>,
) -> ApiResult<Vec<transfer_log::Model>> {
    let entries = state
        .services
        .stock
        .transfer_log(&ctx, filter.spare_part_id)
        .await?;
    Ok(Json(ApiResponse::success(entries)))
}
