use crate::{
    auth::{Permission, TenantContext},
    commands::stock::{
        AdjustStockCommand, AdjustmentOutcome, TransferOutcome, TransferStockCommand,
        UsageOutcome, UseFacilityStockCommand,
    },
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    models::{
        facility_stock::{self, TransferStockInput, UseFacilityStockInput},
        spare_part::{self, AdjustStockInput},
        transfer_log,
    },
    services::authorize,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use uuid::Uuid;

/// Central stock, facility stock and the movement log between them.
#[derive(Clone)]
pub struct StockService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StockService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    pub async fn transfer(
        &self,
        ctx: &TenantContext,
        spare_part_id: Uuid,
        input: TransferStockInput,
    ) -> Result<TransferOutcome, ServiceError> {
        TransferStockCommand {
            ctx: ctx.clone(),
            spare_part_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn use_facility_stock(
        &self,
        ctx: &TenantContext,
        facility_stock_id: Uuid,
        input: UseFacilityStockInput,
    ) -> Result<UsageOutcome, ServiceError> {
        UseFacilityStockCommand {
            ctx: ctx.clone(),
            facility_stock_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn adjust(
        &self,
        ctx: &TenantContext,
        spare_part_id: Uuid,
        input: AdjustStockInput,
    ) -> Result<AdjustmentOutcome, ServiceError> {
        AdjustStockCommand {
            ctx: ctx.clone(),
            spare_part_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    /// Facility stock rows, optionally narrowed to one spare part.
    pub async fn facility_stock(
        &self,
        ctx: &TenantContext,
        spare_part_id: Option<Uuid>,
    ) -> Result<Vec<facility_stock::Model>, ServiceError> {
        authorize(ctx, Permission::Read, "list facility stock", &self.event_sender).await?;
        let mut query = facility_stock::Entity::find()
            .filter(facility_stock::Column::CompanyId.eq(ctx.company_id));
        if let Some(id) = spare_part_id {
            query = query.filter(facility_stock::Column::SparePartId.eq(id));
        }
        Ok(query
            .order_by_asc(facility_stock::Column::DestinationName)
            .all(self.db_pool.as_ref())
            .await?)
    }

    /// Movement history, newest first.
    pub async fn transfer_log(
        &self,
        ctx: &TenantContext,
        spare_part_id: Option<Uuid>,
    ) -> Result<Vec<transfer_log::Model>, ServiceError> {
        authorize(ctx, Permission::Read, "list transfer log", &self.event_sender).await?;
        let mut query = transfer_log::Entity::find()
            .filter(transfer_log::Column::CompanyId.eq(ctx.company_id));
        if let Some(id) = spare_part_id {
            query = query.filter(transfer_log::Column::SparePartId.eq(id));
        }
        Ok(query
            .order_by_desc(transfer_log::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }

    pub async fn low_stock(
        &self,
        ctx: &TenantContext,
    ) -> Result<Vec<spare_part::Model>, ServiceError> {
        authorize(ctx, Permission::Read, "list spare parts", &self.event_sender).await?;
        let parts = spare_part::Entity::find()
            .filter(spare_part::Column::CompanyId.eq(ctx.company_id))
            .order_by_asc(spare_part::Column::Name)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(parts.into_iter().filter(|p| p.is_low_stock()).collect())
    }
}
