use crate::{
    auth::TenantContext, models::notification, ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/unread", get(list_unread))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
}

pub async fn list_unread(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> ApiResult<Vec<notification::Model>> {
    let items = state.services.notifications.list_unread(&ctx).await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn mark_read(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<notification::Model> {
    let item = state.services.notifications.mark_read(&ctx, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> ApiResult<MarkedRead> {
    let updated = state.services.notifications.mark_all_read(&ctx).await?;
    Ok(Json(ApiResponse::success(MarkedRead { updated })))
}
