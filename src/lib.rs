//! FieldOps API Library
//!
//! Multi-tenant field-service and CRM backend: work orders, spare-part
//! allocation with verification, stock transfers, a sales ledger and the
//! customer records around them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod ai;
pub mod auth;
pub mod collection;
pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod migrator;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;
pub mod telemetry;

use axum::{
    extract::{FromRef, State},
    http::HeaderValue,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::ToSchema;

use crate::auth::AuthService;
use crate::collection::CollectionView;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::handlers::collections::{crud_routes, read_routes, update_record};
use crate::handlers::AppServices;
use crate::models::{
    activity, asset, company, customer, ledger_transaction, location, notification, opportunity,
    product, service_call_log, spare_part, user,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub event_sender: Arc<EventSender>,
    pub auth: Arc<AuthService>,
    pub view: CollectionView,
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DbPool>,
        config: Arc<AppConfig>,
        event_sender: Arc<EventSender>,
        ai: Arc<dyn ai::AiCapability>,
        blobs: Arc<dyn storage::BlobStore>,
    ) -> Self {
        let view = CollectionView::new(config.api_default_page_size, config.api_max_page_size);
        let auth = Arc::new(AuthService::from_config(&config));
        let services = AppServices::new(db.clone(), event_sender.clone(), ai, blobs, view);
        Self {
            db,
            config,
            event_sender,
            auth,
            view,
            services,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: telemetry::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response = telemetry::scope_request_id(telemetry::RequestId::new("meta-123"), async {
            ApiResponse::success("ok")
        })
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response = telemetry::scope_request_id(telemetry::RequestId::new("meta-err"), async {
            ApiResponse::<()>::error("oops".into())
        })
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[test]
    fn metadata_without_request_scope_has_no_id() {
        let response = ApiResponse::<()>::validation_errors(vec!["missing".into()]);
        let meta = response.meta.expect("metadata expected");
        assert!(meta.request_id.is_none());
        assert_eq!(response.errors.as_deref(), Some(&["missing".to_string()][..]));
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every `/api/v1` route. Each handler extracts a [`auth::TenantContext`], so
/// all of them require a bearer token.
pub fn api_v1_routes() -> Router<AppState> {
    // Companies are created out of band; tenants may only read and rename their own.
    let companies = read_routes::<company::Model>().route(
        "/:id",
        put(update_record::<company::Model, company::UpdateCompanyInput>),
    );

    let spare_parts = crud_routes::<
        spare_part::Model,
        spare_part::CreateSparePartInput,
        spare_part::UpdateSparePartInput,
    >()
    .merge(handlers::stock::spare_part_stock_routes());

    let call_logs = crud_routes::<
        service_call_log::Model,
        service_call_log::CreateCallLogInput,
        service_call_log::UpdateCallLogInput,
    >()
    .route(
        "/:id/escalate",
        post(handlers::work_orders::escalate_call_log),
    );

    let transactions = crud_routes::<
        ledger_transaction::Model,
        ledger_transaction::CreateTransactionInput,
        ledger_transaction::UpdateTransactionInput,
    >()
    .merge(handlers::ledger::ledger_routes());

    let notifications = crud_routes::<
        notification::Model,
        notification::CreateNotificationInput,
        notification::UpdateNotificationInput,
    >()
    .merge(handlers::notifications::notification_routes());

    Router::new()
        .route("/dashboard", get(handlers::dashboard::dashboard_summary))
        .route("/transfer-log", get(handlers::stock::list_transfer_log))
        .nest("/work-orders", handlers::work_orders::work_orders_routes())
        .nest("/parts", handlers::parts::parts_routes())
        .nest("/facility-stock", handlers::stock::facility_stock_routes())
        .nest("/spare-parts", spare_parts)
        .nest("/call-logs", call_logs)
        .nest("/transactions", transactions)
        .nest("/notifications", notifications)
        .nest("/resources", handlers::resources::resources_routes())
        .nest("/companies", companies)
        .nest(
            "/customers",
            crud_routes::<customer::Model, customer::CreateCustomerInput, customer::UpdateCustomerInput>(),
        )
        .nest(
            "/assets",
            crud_routes::<asset::Model, asset::CreateAssetInput, asset::UpdateAssetInput>(),
        )
        .nest(
            "/locations",
            crud_routes::<location::Model, location::CreateLocationInput, location::UpdateLocationInput>(),
        )
        .nest(
            "/activities",
            crud_routes::<activity::Model, activity::CreateActivityInput, activity::UpdateActivityInput>(),
        )
        .nest(
            "/opportunities",
            crud_routes::<
                opportunity::Model,
                opportunity::CreateOpportunityInput,
                opportunity::UpdateOpportunityInput,
            >(),
        )
        .nest(
            "/products",
            crud_routes::<product::Model, product::CreateProductInput, product::UpdateProductInput>(),
        )
        .nest(
            "/users",
            crud_routes::<user::Model, user::CreateUserInput, user::UpdateUserInput>(),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

/// Full application router: health endpoints, the v1 API and the middleware
/// stack. `logger` receives one access-log line per request.
pub fn build_router(state: AppState, logger: slog::Logger) -> Router {
    let logging_state = Arc::new(logging::LoggingState::new(logger));
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        .nest("/api/v1", api_v1_routes())
        .layer(axum::middleware::from_fn_with_state(
            logging_state,
            logging::logging_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(telemetry::RequestSpanMaker))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors)
        // Outermost so every inner layer sees the request id
        .layer(axum::middleware::from_fn(telemetry::request_id_middleware))
        .with_state(state)
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "fieldops-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(err) => {
            tracing::warn!(error = %err, "database health check failed");
            "unhealthy"
        }
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
