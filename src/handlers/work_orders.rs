use crate::{
    auth::TenantContext,
    collection::{ListQuery, Page},
    commands::workorders::Escalation,
    errors::ServiceError,
    models::work_order::{self, CreateWorkOrderInput, UpdateWorkOrderInput},
    reports::ServiceReport,
    services::work_orders::{NotesSummary, WorkOrderDetail},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

/// Create the work orders router
pub fn work_orders_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_work_orders).post(create_work_order))
        .route("/:id", get(get_work_order).put(update_work_order))
        .route("/:id/summary", post(summarize_notes))
        .route("/:id/report", get(service_report))
        .route(
            "/:id/parts",
            get(super::parts::list_parts).post(super::parts::add_parts),
        )
}

pub async fn list_work_orders(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<work_order::Model>> {
    let page = state
        .services
        .work_orders
        .list_work_orders(&ctx, &query)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn create_work_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(input): Json<CreateWorkOrderInput>,
) -> Result<(StatusCode, Json<ApiResponse<work_order::Model>>), ServiceError> {
    let created = state
        .services
        .work_orders
        .create_work_order(&ctx, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_work_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<WorkOrderDetail> {
    let detail = state.services.work_orders.get_work_order(&ctx, id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

pub async fn update_work_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWorkOrderInput>,
) -> ApiResult<work_order::Model> {
    let updated = state
        .services
        .work_orders
        .update_work_order(&ctx, id, input)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn summarize_notes(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<NotesSummary> {
    let summary = state.services.work_orders.summarize_notes(&ctx, id).await?;
    Ok(Json(ApiResponse::success(summary)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// `json` (default) or `text`
    pub format: Option<String>,
}

pub async fn service_report(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<axum::response::Response, ServiceError> {
    let report: ServiceReport = state.services.work_orders.service_report(&ctx, id).await?;
    match query.format.as_deref() {
        Some("text") => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report.render_text(),
        )
            .into_response()),
        None | Some("json") => Ok(Json(ApiResponse::success(report)).into_response()),
        Some(other) => Err(ServiceError::ValidationError(format!(
            "unsupported report format: {}",
            other
        ))),
    }
}

/// `POST /call-logs/:id/escalate`
pub async fn escalate_call_log(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<Escalation>>), ServiceError> {
    let escalation = state
        .services
        .work_orders
        .escalate_call_log(&ctx, id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(escalation))))
}
