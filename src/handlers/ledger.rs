use crate::{
    ai::DocumentInput,
    auth::TenantContext,
    errors::ServiceError,
    models::ledger_transaction::{self, RecordPaymentInput},
    services::{ledger::LedgerTotals, resources::MAX_UPLOAD_BYTES},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Json, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::upload_metadata;

/// Ledger routes that sit beside the generic `/transactions` CRUD.
pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/totals", get(totals))
        .route(
            "/import",
            post(import_transactions).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/:id/payments", post(record_payment))
}

pub async fn record_payment(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<RecordPaymentInput>,
) -> ApiResult<ledger_transaction::Model> {
    let updated = state.services.ledger.record_payment(&ctx, id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Raw document body; the file name comes from the `x-file-name` header.
pub async fn import_transactions(
    State(state): State<AppState>,
    ctx: TenantContext,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ledger_transaction::Model>>>), ServiceError> {
    let (file_name, content_type) = upload_metadata(&headers)?;
    if body.is_empty() {
        return Err(ServiceError::ValidationError(
            "import document is empty".to_string(),
        ));
    }
    let created = state
        .services
        .ledger
        .import_transactions(
            &ctx,
            DocumentInput {
                file_name,
                content_type,
                bytes: body,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn totals(State(state): State<AppState>, ctx: TenantContext) -> ApiResult<LedgerTotals> {
    let totals = state.services.ledger.totals(&ctx).await?;
    Ok(Json(ApiResponse::success(totals)))
}
