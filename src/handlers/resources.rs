use crate::{
    ai::DocumentAnalysis,
    auth::TenantContext,
    errors::ServiceError,
    models::resource::{self, CreateResourceInput, UpdateResourceInput},
    services::resources::MAX_UPLOAD_BYTES,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Json, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::collections::{create_record, get_record, list_records, update_record};
use super::upload_metadata;

/// Resource metadata goes through the generic collection handlers. Deletion
/// and the file endpoints also touch blob storage.
pub fn resources_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_records::<resource::Model>)
                .post(create_record::<resource::Model, CreateResourceInput>),
        )
        .route(
            "/:id",
            get(get_record::<resource::Model>)
                .put(update_record::<resource::Model, UpdateResourceInput>)
                .delete(delete_resource),
        )
        .route("/:id/file", get(download_file).put(upload_file))
        .route("/:id/analyze", post(analyze_resource))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.resources.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_file(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<resource::Model> {
    let (file_name, content_type) = upload_metadata(&headers)?;
    let updated = state
        .services
        .resources
        .upload(&ctx, id, &file_name, &content_type, body)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn download_file(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let (record, data) = state.services.resources.download(&ctx, id).await?;

    let content_type = record
        .content_type
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let disposition = record
        .file_name
        .as_deref()
        .map(|name| format!("attachment; filename=\"{}\"", name.replace('"', "")))
        .and_then(|v| HeaderValue::from_str(&v).ok())
        .unwrap_or_else(|| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

pub async fn analyze_resource(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<DocumentAnalysis> {
    let analysis = state.services.resources.analyze(&ctx, id).await?;
    Ok(Json(ApiResponse::success(analysis)))
}
