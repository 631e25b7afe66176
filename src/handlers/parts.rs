use crate::{
    auth::TenantContext,
    errors::ServiceError,
    models::allocated_part::{
        self, AddPartsInput, ChangePartStatusInput, ChangeQuantityInput,
        RequestVerificationInput, VerifyPartInput, VersionedInput,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

/// Routes addressed by part id. Listing and adding live under `/work-orders/:id/parts`.
pub fn parts_routes() -> Router<AppState> {
    Router::new()
        .route("/pending-verification", get(pending_verification))
        .route("/:id", delete(remove_part))
        .route("/:id/status", put(change_status))
        .route("/:id/request-verification", post(request_verification))
        .route("/:id/verify", post(verify))
        .route("/:id/use", post(mark_used))
        .route("/:id/quantity", put(change_quantity))
}

pub async fn list_parts(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(work_order_id): Path<Uuid>,
) -> ApiResult<Vec<allocated_part::Model>> {
    let parts = state.services.parts.list_parts(&ctx, work_order_id).await?;
    Ok(Json(ApiResponse::success(parts)))
}

pub async fn add_parts(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(work_order_id): Path<Uuid>,
    Json(input): Json<AddPartsInput>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<allocated_part::Model>>>), ServiceError> {
    let parts = state
        .services
        .parts
        .add_parts(&ctx, work_order_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(parts))))
}

pub async fn pending_verification(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> ApiResult<Vec<allocated_part::Model>> {
    let parts = state.services.parts.pending_verification(&ctx).await?;
    Ok(Json(ApiResponse::success(parts)))
}

pub async fn change_status(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<ChangePartStatusInput>,
) -> ApiResult<allocated_part::Model> {
    let part = state.services.parts.change_status(&ctx, id, input).await?;
    Ok(Json(ApiResponse::success(part)))
}

pub async fn request_verification(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<RequestVerificationInput>,
) -> ApiResult<allocated_part::Model> {
    let part = state
        .services
        .parts
        .request_verification(&ctx, id, input)
        .await?;
    Ok(Json(ApiResponse::success(part)))
}

pub async fn verify(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<VerifyPartInput>,
) -> ApiResult<allocated_part::Model> {
    let part = state.services.parts.verify(&ctx, id, input).await?;
    Ok(Json(ApiResponse::success(part)))
}

pub async fn mark_used(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<VersionedInput>,
) -> ApiResult<allocated_part::Model> {
    let part = state.services.parts.mark_used(&ctx, id, input).await?;
    Ok(Json(ApiResponse::success(part)))
}

pub async fn change_quantity(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<ChangeQuantityInput>,
) -> ApiResult<allocated_part::Model> {
    let part = state.services.parts.change_quantity(&ctx, id, input).await?;
    Ok(Json(ApiResponse::success(part)))
}

/// `expected_version` travels as a query parameter on DELETE.
pub async fn remove_part(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Query(input): Query<VersionedInput>,
) -> Result<StatusCode, ServiceError> {
    state.services.parts.remove_part(&ctx, id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
