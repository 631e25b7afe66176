use super::{check_version, load_part, update_versioned};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::allocated_part::{self, ChangeQuantityInput},
    services::authorize,
};
use sea_orm::sea_query::Expr;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone)]
pub struct ChangePartQuantityCommand {
    pub ctx: TenantContext,
    pub part_id: Uuid,
    pub input: ChangeQuantityInput,
}

#[async_trait::async_trait]
impl Command for ChangePartQuantityCommand {
    type Result = allocated_part::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(part_id = %self.part_id, quantity = self.input.quantity))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "change part quantity", &event_sender).await?;
        self.input.validate()?;

        let db = db_pool.as_ref();
        let part = load_part(db, &self.ctx, self.part_id).await?;
        check_version(&part, self.input.expected_version)?;

        let quantity = self.input.quantity;
        let updated = update_versioned(db, &part, |update| {
            update.col_expr(allocated_part::Column::Quantity, Expr::value(quantity))
        })
        .await?;

        info!("part quantity changed");
        event_sender
            .publish(Event::PartQuantityChanged {
                company_id: self.ctx.company_id,
                part_id: updated.id,
                quantity,
            })
            .await;

        Ok(updated)
    }
}
