use crate::{
    auth::{Permission, TenantContext},
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    models::{
        allocated_part::{self, PartStatus},
        ledger_transaction, opportunity, spare_part, work_order,
    },
    services::{authorize, ledger::LedgerTotals},
};
use sea_orm::{ActiveEnum, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LowStockItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub min_quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSummary {
    /// Work order counts keyed by status label
    pub work_orders_by_status: BTreeMap<String, u64>,
    pub parts_pending_verification: u64,
    pub low_stock: Vec<LowStockItem>,
    pub ledger: LedgerTotals,
    pub open_pipeline_cents: i64,
    pub open_opportunities: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, ctx), fields(company_id = %ctx.company_id))]
    pub async fn summary(&self, ctx: &TenantContext) -> Result<DashboardSummary, ServiceError> {
        authorize(ctx, Permission::Read, "view dashboard", &self.event_sender).await?;
        let db = self.db_pool.as_ref();

        let work_orders = work_order::Entity::find()
            .filter(work_order::Column::CompanyId.eq(ctx.company_id))
            .all(db)
            .await?;
        let mut work_orders_by_status = BTreeMap::new();
        for wo in &work_orders {
            *work_orders_by_status.entry(wo.status.to_value()).or_insert(0) += 1;
        }

        let parts_pending_verification = allocated_part::Entity::find()
            .filter(allocated_part::Column::CompanyId.eq(ctx.company_id))
            .filter(allocated_part::Column::Status.is_in([
                PartStatus::PendingHandover.into_value(),
                PartStatus::PendingReturn.into_value(),
            ]))
            .count(db)
            .await?;

        let low_stock = spare_part::Entity::find()
            .filter(spare_part::Column::CompanyId.eq(ctx.company_id))
            .all(db)
            .await?
            .into_iter()
            .filter(|p| p.is_low_stock())
            .map(|p| LowStockItem {
                id: p.id,
                name: p.name,
                quantity: p.quantity,
                min_quantity: p.min_quantity,
            })
            .collect();

        let entries = ledger_transaction::Entity::find()
            .filter(ledger_transaction::Column::CompanyId.eq(ctx.company_id))
            .all(db)
            .await?;

        let open: Vec<_> = opportunity::Entity::find()
            .filter(opportunity::Column::CompanyId.eq(ctx.company_id))
            .all(db)
            .await?
            .into_iter()
            .filter(|o| o.stage.is_open())
            .collect();

        Ok(DashboardSummary {
            work_orders_by_status,
            parts_pending_verification,
            low_stock,
            ledger: LedgerTotals::from_entries(&entries),
            open_pipeline_cents: open.iter().map(|o| o.value_cents).sum(),
            open_opportunities: open.len() as u64,
        })
    }
}
