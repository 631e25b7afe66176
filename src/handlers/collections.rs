//! Generic CRUD endpoints for the simple tenant collections.

use crate::{
    auth::TenantContext,
    collection::{ListQuery, Page},
    errors::ServiceError,
    models::{NewRecord, RecordPatch, TenantRecord},
    services::collections::CollectionRepository,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use sea_orm::IntoActiveModel;
use serde::de::DeserializeOwned;
use uuid::Uuid;

fn repository<M>(state: &AppState) -> CollectionRepository<M>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
{
    CollectionRepository::new(state.db.clone(), state.event_sender.clone(), state.view)
}

pub async fn list_records<M>(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<M>>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
{
    let page = repository::<M>(&state).list(&ctx, &query).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn get_record<M>(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<M>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
{
    let record = repository::<M>(&state).get(&ctx, id).await?;
    Ok(Json(ApiResponse::success(record)))
}

pub async fn create_record<M, C>(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(input): Json<C>,
) -> Result<(StatusCode, Json<ApiResponse<M>>), ServiceError>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
    C: NewRecord<M> + DeserializeOwned,
{
    let record = repository::<M>(&state).create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

pub async fn update_record<M, U>(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<U>,
) -> ApiResult<M>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
    U: RecordPatch<M> + DeserializeOwned,
{
    let record = repository::<M>(&state).update(&ctx, id, patch).await?;
    Ok(Json(ApiResponse::success(record)))
}

pub async fn delete_record<M>(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
{
    repository::<M>(&state).delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List and fetch only.
pub fn read_routes<M>() -> Router<AppState>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
{
    Router::new()
        .route("/", get(list_records::<M>))
        .route("/:id", get(get_record::<M>))
}

/// `GET /`, `POST /`, `GET /:id`, `PUT /:id`, `DELETE /:id`.
pub fn crud_routes<M, C, U>() -> Router<AppState>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
    C: NewRecord<M> + DeserializeOwned + 'static,
    U: RecordPatch<M> + DeserializeOwned + 'static,
{
    Router::new()
        .route("/", get(list_records::<M>).post(create_record::<M, C>))
        .route(
            "/:id",
            get(get_record::<M>)
                .put(update_record::<M, U>)
                .delete(delete_record::<M>),
        )
}
