use super::{check_version, load_part, update_versioned};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::allocated_part::{self, ChangePartStatusInput, PartStatus},
    services::authorize,
};
use sea_orm::sea_query::Expr;
use sea_orm::ActiveEnum;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Admin overwrite of a part's status. No transition rules apply; writing the
/// status the part already has changes nothing.
#[derive(Debug, Clone)]
pub struct ChangePartStatusCommand {
    pub ctx: TenantContext,
    pub part_id: Uuid,
    pub input: ChangePartStatusInput,
}

#[async_trait::async_trait]
impl Command for ChangePartStatusCommand {
    type Result = allocated_part::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(part_id = %self.part_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Admin, "change part status", &event_sender).await?;

        let db = db_pool.as_ref();
        let part = load_part(db, &self.ctx, self.part_id).await?;
        check_version(&part, self.input.expected_version)?;

        let new_status = self.input.status;
        if part.status == new_status {
            debug!(status = %new_status, "status unchanged");
            return Ok(part);
        }

        let old_status = part.status;
        let updated = update_versioned(db, &part, |update| {
            let update = update.col_expr(
                allocated_part::Column::Status,
                Expr::value(new_status.into_value()),
            );
            if new_status != PartStatus::Allocated {
                return update;
            }
            // Back at the start of the lifecycle: no request or verifier applies.
            update
                .col_expr(
                    allocated_part::Column::RequestedBy,
                    Expr::value(Option::<Uuid>::None),
                )
                .col_expr(
                    allocated_part::Column::RequestedByName,
                    Expr::value(Option::<String>::None),
                )
                .col_expr(
                    allocated_part::Column::VerifiedBy,
                    Expr::value(Option::<String>::None),
                )
                .col_expr(
                    allocated_part::Column::VerifiedById,
                    Expr::value(Option::<Uuid>::None),
                )
        })
        .await?;

        info!(from = %old_status, to = %new_status, "part status overwritten");
        event_sender
            .publish(Event::PartStatusChanged {
                company_id: self.ctx.company_id,
                part_id: updated.id,
                old_status,
                new_status,
                actor_id: self.ctx.user_id,
            })
            .await;

        Ok(updated)
    }
}
