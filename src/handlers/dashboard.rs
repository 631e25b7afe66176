use crate::{
    auth::TenantContext, services::dashboard::DashboardSummary, ApiResponse, ApiResult, AppState,
};
use axum::extract::{Json, State};

/// `GET /dashboard`
pub async fn dashboard_summary(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> ApiResult<DashboardSummary> {
    let summary = state.services.dashboard.summary(&ctx).await?;
    Ok(Json(ApiResponse::success(summary)))
}
