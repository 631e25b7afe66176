use super::{append_log, LogEntry};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        facility_stock::{self, DestinationKind, UseFacilityStockInput},
        transfer_log,
        work_order::{self, WorkOrderPriority, WorkOrderStatus},
    },
    services::authorize,
};
use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Consumes units held at a facility. The consumption is recorded as a
/// completed work order against the destination so it shows up in history.
#[derive(Debug, Clone)]
pub struct UseFacilityStockCommand {
    pub ctx: TenantContext,
    pub facility_stock_id: Uuid,
    pub input: UseFacilityStockInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageOutcome {
    pub facility_stock: facility_stock::Model,
    pub work_order: work_order::Model,
    pub log_entry: transfer_log::Model,
}

#[async_trait::async_trait]
impl Command for UseFacilityStockCommand {
    type Result = UsageOutcome;

    #[instrument(skip(self, db_pool, event_sender), fields(facility_stock_id = %self.facility_stock_id, quantity = self.input.quantity))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "use facility stock", &event_sender).await?;
        self.input.validate()?;

        let quantity = self.input.quantity;
        let db = db_pool.as_ref();
        let txn = db.begin().await?;

        let stock = facility_stock::Entity::find_by_id(self.facility_stock_id)
            .filter(facility_stock::Column::CompanyId.eq(self.ctx.company_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Facility stock", self.facility_stock_id))?;

        let now = Utc::now();
        let decremented = facility_stock::Entity::update_many()
            .col_expr(
                facility_stock::Column::Quantity,
                Expr::col(facility_stock::Column::Quantity).sub(quantity),
            )
            .col_expr(
                facility_stock::Column::Version,
                Expr::col(facility_stock::Column::Version).add(1),
            )
            .col_expr(facility_stock::Column::UpdatedAt, Expr::value(now))
            .filter(facility_stock::Column::Id.eq(stock.id))
            .filter(facility_stock::Column::Quantity.gte(quantity))
            .exec(&txn)
            .await?;

        if decremented.rows_affected == 0 {
            warn!(available = stock.quantity, requested = quantity, "usage exceeds facility stock");
            return Err(ServiceError::InsufficientStock(format!(
                "{} holds {} of {}; cannot use {}",
                stock.destination_name, stock.quantity, stock.part_name, quantity
            )));
        }

        let (customer_id, location_id) = match stock.destination_kind {
            DestinationKind::Customer => (Some(stock.destination_id), None),
            DestinationKind::Location => (None, Some(stock.destination_id)),
        };

        let work_order = work_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(self.ctx.company_id),
            title: Set(format!("Used {} x {}", quantity, stock.part_name)),
            description: Set(Some(format!(
                "Stock used at {}",
                stock.destination_name
            ))),
            customer_id: Set(customer_id),
            asset_id: Set(None),
            location_id: Set(location_id),
            status: Set(WorkOrderStatus::Completed),
            priority: Set(WorkOrderPriority::default()),
            assigned_to: Set(Some(self.ctx.user_id)),
            notes: Set(self.input.note.clone()),
            created_by: Set(self.ctx.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            completed_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        let log_entry = append_log(
            &txn,
            &self.ctx,
            LogEntry {
                spare_part_id: stock.spare_part_id,
                part_name: stock.part_name.clone(),
                kind: transfer_log::TransferKind::Used,
                quantity,
                source: stock.destination_name.clone(),
                destination: Some((
                    stock.destination_kind,
                    stock.destination_id,
                    stock.destination_name.clone(),
                )),
                work_order_id: Some(work_order.id),
                note: self.input.note.clone(),
            },
        )
        .await?;

        let facility_stock = facility_stock::Entity::find_by_id(stock.id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Facility stock", stock.id))?;

        txn.commit().await?;

        counter!("fieldops.stock.used", 1);
        info!(work_order_id = %work_order.id, remaining = facility_stock.quantity, "facility stock used");
        event_sender
            .publish(Event::FacilityStockUsed {
                company_id: self.ctx.company_id,
                facility_stock_id: facility_stock.id,
                quantity,
                work_order_id: work_order.id,
            })
            .await;

        Ok(UsageOutcome {
            facility_stock,
            work_order,
            log_entry,
        })
    }
}
