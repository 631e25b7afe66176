use super::{check_version, load_part, update_versioned};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::allocated_part::{self, PartAction, VersionedInput},
    services::authorize,
};
use sea_orm::sea_query::Expr;
use sea_orm::ActiveEnum;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MarkPartUsedCommand {
    pub ctx: TenantContext,
    pub part_id: Uuid,
    pub input: VersionedInput,
}

#[async_trait::async_trait]
impl Command for MarkPartUsedCommand {
    type Result = allocated_part::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(part_id = %self.part_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "mark part used", &event_sender).await?;

        let db = db_pool.as_ref();
        let part = load_part(db, &self.ctx, self.part_id).await?;
        check_version(&part, self.input.expected_version)?;

        let target = part.status.transition(PartAction::MarkUsed).ok_or_else(|| {
            ServiceError::InvalidOperation(format!(
                "only parts with the engineer can be used; part is {}",
                part.status
            ))
        })?;

        let old_status = part.status;
        let updated = update_versioned(db, &part, |update| {
            update.col_expr(
                allocated_part::Column::Status,
                Expr::value(target.into_value()),
            )
        })
        .await?;

        info!("part marked used");
        event_sender
            .publish(Event::PartStatusChanged {
                company_id: self.ctx.company_id,
                part_id: updated.id,
                old_status,
                new_status: updated.status,
                actor_id: self.ctx.user_id,
            })
            .await;

        Ok(updated)
    }
}
