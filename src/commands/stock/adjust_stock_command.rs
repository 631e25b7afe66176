use super::{append_log, load_spare_part, warn_if_low, LogEntry};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        spare_part::{self, AdjustStockInput},
        transfer_log,
    },
    services::authorize,
};
use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Applies a signed correction to central stock (stock counts, damage,
/// deliveries).
#[derive(Debug, Clone)]
pub struct AdjustStockCommand {
    pub ctx: TenantContext,
    pub spare_part_id: Uuid,
    pub input: AdjustStockInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentOutcome {
    pub spare_part: spare_part::Model,
    pub log_entry: transfer_log::Model,
}

#[async_trait::async_trait]
impl Command for AdjustStockCommand {
    type Result = AdjustmentOutcome;

    #[instrument(skip(self, db_pool, event_sender), fields(spare_part_id = %self.spare_part_id, delta = self.input.delta))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "adjust stock", &event_sender).await?;
        self.input.validate()?;
        let delta = self.input.delta;
        if delta == 0 {
            return Err(ServiceError::ValidationError(
                "adjustment delta must not be zero".to_string(),
            ));
        }

        let floor = delta.checked_neg().ok_or_else(|| {
            ServiceError::ValidationError(format!("adjustment delta {} is out of range", delta))
        })?;

        let db = db_pool.as_ref();
        let txn = db.begin().await?;

        let part = load_spare_part(&txn, &self.ctx, self.spare_part_id).await?;

        // quantity + delta >= 0
        let adjusted = spare_part::Entity::update_many()
            .col_expr(
                spare_part::Column::Quantity,
                Expr::col(spare_part::Column::Quantity).add(delta),
            )
            .col_expr(
                spare_part::Column::Version,
                Expr::col(spare_part::Column::Version).add(1),
            )
            .col_expr(spare_part::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(spare_part::Column::Id.eq(part.id))
            .filter(spare_part::Column::CompanyId.eq(self.ctx.company_id))
            .filter(spare_part::Column::Quantity.gte(floor))
            .exec(&txn)
            .await?;

        if adjusted.rows_affected == 0 {
            warn!(available = part.quantity, delta, "adjustment would go negative");
            return Err(ServiceError::InsufficientStock(format!(
                "{} has {} in stock; cannot adjust by {}",
                part.name, part.quantity, delta
            )));
        }

        let log_entry = append_log(
            &txn,
            &self.ctx,
            LogEntry {
                spare_part_id: part.id,
                part_name: part.name.clone(),
                kind: transfer_log::TransferKind::Adjustment,
                quantity: delta,
                source: part.location.clone(),
                destination: None,
                work_order_id: None,
                note: Some(self.input.reason.clone()),
            },
        )
        .await?;

        let spare_part = load_spare_part(&txn, &self.ctx, part.id).await?;
        txn.commit().await?;

        counter!("fieldops.stock.adjustments", 1);
        info!(old = part.quantity, new = spare_part.quantity, "stock adjusted");
        event_sender
            .publish(Event::StockAdjusted {
                company_id: self.ctx.company_id,
                spare_part_id: spare_part.id,
                old_quantity: part.quantity,
                new_quantity: spare_part.quantity,
            })
            .await;
        warn_if_low(&event_sender, &spare_part).await;

        Ok(AdjustmentOutcome {
            spare_part,
            log_entry,
        })
    }
}
