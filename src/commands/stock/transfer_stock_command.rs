use super::{append_log, destination_name, load_spare_part, warn_if_low, LogEntry};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        facility_stock::{self, TransferStockInput},
        spare_part, transfer_log,
    },
    services::authorize,
};
use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveEnum, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Moves units from central stock to a location or customer.
#[derive(Debug, Clone)]
pub struct TransferStockCommand {
    pub ctx: TenantContext,
    pub spare_part_id: Uuid,
    pub input: TransferStockInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub spare_part: spare_part::Model,
    pub facility_stock: facility_stock::Model,
    pub log_entry: transfer_log::Model,
}

#[async_trait::async_trait]
impl Command for TransferStockCommand {
    type Result = TransferOutcome;

    #[instrument(skip(self, db_pool, event_sender), fields(spare_part_id = %self.spare_part_id, quantity = self.input.quantity))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "transfer stock", &event_sender).await?;
        self.input.validate()?;

        let quantity = self.input.quantity;
        let kind = self.input.destination_kind;
        let destination_id = self.input.destination_id;

        let db = db_pool.as_ref();
        let txn = db.begin().await?;

        let part = load_spare_part(&txn, &self.ctx, self.spare_part_id).await?;
        let dest_name = destination_name(&txn, &self.ctx, kind, destination_id).await?;

        let now = Utc::now();
        let decremented = spare_part::Entity::update_many()
            .col_expr(
                spare_part::Column::Quantity,
                Expr::col(spare_part::Column::Quantity).sub(quantity),
            )
            .col_expr(
                spare_part::Column::Version,
                Expr::col(spare_part::Column::Version).add(1),
            )
            .col_expr(spare_part::Column::UpdatedAt, Expr::value(now))
            .filter(spare_part::Column::Id.eq(part.id))
            .filter(spare_part::Column::CompanyId.eq(self.ctx.company_id))
            .filter(spare_part::Column::Quantity.gte(quantity))
            .exec(&txn)
            .await?;

        if decremented.rows_affected == 0 {
            warn!(available = part.quantity, requested = quantity, "transfer exceeds stock");
            counter!("fieldops.stock.transfer_rejected", 1);
            return Err(ServiceError::InsufficientStock(format!(
                "{} has {} in stock; cannot transfer {}",
                part.name, part.quantity, quantity
            )));
        }

        let existing = facility_stock::Entity::find()
            .filter(facility_stock::Column::CompanyId.eq(self.ctx.company_id))
            .filter(facility_stock::Column::SparePartId.eq(part.id))
            .filter(facility_stock::Column::DestinationKind.eq(kind.into_value()))
            .filter(facility_stock::Column::DestinationId.eq(destination_id))
            .one(&txn)
            .await?;

        let facility_id = match existing {
            Some(row) => {
                facility_stock::Entity::update_many()
                    .col_expr(
                        facility_stock::Column::Quantity,
                        Expr::col(facility_stock::Column::Quantity).add(quantity),
                    )
                    .col_expr(
                        facility_stock::Column::Version,
                        Expr::col(facility_stock::Column::Version).add(1),
                    )
                    .col_expr(
                        facility_stock::Column::DestinationName,
                        Expr::value(dest_name.clone()),
                    )
                    .col_expr(facility_stock::Column::UpdatedAt, Expr::value(now))
                    .filter(facility_stock::Column::Id.eq(row.id))
                    .exec(&txn)
                    .await?;
                row.id
            }
            None => {
                let row = facility_stock::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    company_id: Set(self.ctx.company_id),
                    spare_part_id: Set(part.id),
                    part_name: Set(part.name.clone()),
                    destination_kind: Set(kind),
                    destination_id: Set(destination_id),
                    destination_name: Set(dest_name.clone()),
                    quantity: Set(quantity),
                    version: Set(1),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;
                row.id
            }
        };

        let log_entry = append_log(
            &txn,
            &self.ctx,
            LogEntry {
                spare_part_id: part.id,
                part_name: part.name.clone(),
                kind: transfer_log::TransferKind::Transfer,
                quantity,
                source: part.location.clone(),
                destination: Some((kind, destination_id, dest_name)),
                work_order_id: None,
                note: self.input.note.clone(),
            },
        )
        .await?;

        let spare_part = load_spare_part(&txn, &self.ctx, part.id).await?;
        let facility_stock = facility_stock::Entity::find_by_id(facility_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Facility stock", facility_id))?;

        txn.commit().await?;

        counter!("fieldops.stock.transfers", 1);
        info!(
            remaining = spare_part.quantity,
            facility_quantity = facility_stock.quantity,
            "stock transferred"
        );
        event_sender
            .publish(Event::StockTransferred {
                company_id: self.ctx.company_id,
                spare_part_id: spare_part.id,
                quantity,
                destination_kind: kind,
                destination_id,
            })
            .await;
        warn_if_low(&event_sender, &spare_part).await;

        Ok(TransferOutcome {
            spare_part,
            facility_stock,
            log_entry,
        })
    }
}
