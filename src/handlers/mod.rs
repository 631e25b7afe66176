pub mod collections;
pub mod dashboard;
pub mod ledger;
pub mod notifications;
pub mod parts;
pub mod resources;
pub mod stock;
pub mod work_orders;

use crate::ai::AiCapability;
use crate::collection::CollectionView;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::{
    dashboard::DashboardService, ledger::LedgerService, notifications::NotificationService,
    part_allocation::PartAllocationService, resources::ResourceService, stock::StockService,
    work_orders::WorkOrderService,
};
use crate::storage::BlobStore;
use axum::http::{header::CONTENT_TYPE, HeaderMap};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Header carrying the original file name on raw-body uploads
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub work_orders: Arc<WorkOrderService>,
    pub parts: Arc<PartAllocationService>,
    pub stock: Arc<StockService>,
    pub ledger: Arc<LedgerService>,
    pub notifications: Arc<NotificationService>,
    pub resources: Arc<ResourceService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        ai: Arc<dyn AiCapability>,
        blobs: Arc<dyn BlobStore>,
        view: CollectionView,
    ) -> Self {
        Self {
            work_orders: Arc::new(WorkOrderService::new(
                db_pool.clone(),
                event_sender.clone(),
                ai.clone(),
                view,
            )),
            parts: Arc::new(PartAllocationService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            stock: Arc::new(StockService::new(db_pool.clone(), event_sender.clone())),
            ledger: Arc::new(LedgerService::new(
                db_pool.clone(),
                event_sender.clone(),
                ai.clone(),
            )),
            notifications: Arc::new(NotificationService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            resources: Arc::new(ResourceService::new(
                db_pool.clone(),
                event_sender.clone(),
                blobs,
                ai,
            )),
            dashboard: Arc::new(DashboardService::new(db_pool, event_sender)),
        }
    }
}

/// File name and content type of a raw-body upload.
pub(crate) fn upload_metadata(headers: &HeaderMap) -> Result<(String, String), ServiceError> {
    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ServiceError::ValidationError(format!("missing {} header", FILE_NAME_HEADER))
        })?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    Ok((file_name.to_string(), content_type.to_string()))
}
