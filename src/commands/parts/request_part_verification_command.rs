use super::{check_version, load_part, update_versioned};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::allocated_part::{self, PartAction, RequestVerificationInput},
    services::authorize,
};
use sea_orm::sea_query::Expr;
use sea_orm::ActiveEnum;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// "Take Part" / "Return Part": moves the part into the matching pending
/// state and records the caller as requester. A second user must verify.
#[derive(Debug, Clone)]
pub struct RequestPartVerificationCommand {
    pub ctx: TenantContext,
    pub part_id: Uuid,
    pub input: RequestVerificationInput,
}

#[async_trait::async_trait]
impl Command for RequestPartVerificationCommand {
    type Result = allocated_part::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(part_id = %self.part_id, kind = ?self.input.kind))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "request part verification", &event_sender)
            .await?;

        let db = db_pool.as_ref();
        let part = load_part(db, &self.ctx, self.part_id).await?;
        check_version(&part, self.input.expected_version)?;

        let action = PartAction::from(self.input.kind);
        let target = part.status.transition(action).ok_or_else(|| {
            ServiceError::InvalidOperation(format!(
                "cannot request {:?} verification for a part that is {}",
                self.input.kind, part.status
            ))
        })?;

        let requester_id = self.ctx.user_id;
        let requester_name = self.ctx.user_name.clone();
        let updated = update_versioned(db, &part, |update| {
            update
                .col_expr(
                    allocated_part::Column::Status,
                    Expr::value(target.into_value()),
                )
                .col_expr(
                    allocated_part::Column::RequestedBy,
                    Expr::value(Some(requester_id)),
                )
                .col_expr(
                    allocated_part::Column::RequestedByName,
                    Expr::value(Some(requester_name)),
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

        info!(status = %updated.status, "verification requested");
        event_sender
            .publish(Event::PartVerificationRequested {
                company_id: self.ctx.company_id,
                part_id: updated.id,
                status: updated.status,
                requested_by: requester_id,
            })
            .await;

        Ok(updated)
    }
}
