use super::{check_version, load_part, update_versioned};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::allocated_part::{self, PartAction, VerifyPartInput},
    services::authorize,
};
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveEnum;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Second-party confirmation of a pending handover or return.
///
/// The verifier is the authenticated caller; the requester is compared by
/// user id, never by display name.
#[derive(Debug, Clone)]
pub struct VerifyPartCommand {
    pub ctx: TenantContext,
    pub part_id: Uuid,
    pub input: VerifyPartInput,
}

#[async_trait::async_trait]
impl Command for VerifyPartCommand {
    type Result = allocated_part::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(part_id = %self.part_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "verify part", &event_sender).await?;
        self.input.validate()?;

        let verifier_name = self.input.verifier_name.trim().to_string();
        if verifier_name.is_empty() {
            counter!("fieldops.parts.verification_rejected", 1);
            return Err(ServiceError::ValidationError(
                "verifier name must not be empty".to_string(),
            ));
        }

        let db = db_pool.as_ref();
        let part = load_part(db, &self.ctx, self.part_id).await?;
        check_version(&part, self.input.expected_version)?;

        let target = part.status.transition(PartAction::Verify).ok_or_else(|| {
            ServiceError::InvalidOperation(format!(
                "part is {} and has nothing pending verification",
                part.status
            ))
        })?;

        if part.requested_by == Some(self.ctx.user_id) {
            warn!(user_id = %self.ctx.user_id, "self-verification rejected");
            counter!("fieldops.parts.verification_rejected", 1);
            return Err(ServiceError::InvalidOperation(
                "verifier must be a different user from the requester".to_string(),
            ));
        }

        let verifier_id = self.ctx.user_id;
        let updated = update_versioned(db, &part, |update| {
            update
                .col_expr(
                    allocated_part::Column::Status,
                    Expr::value(target.into_value()),
                )
                .col_expr(
                    allocated_part::Column::VerifiedBy,
                    Expr::value(Some(verifier_name.clone())),
                )
                .col_expr(
                    allocated_part::Column::VerifiedById,
                    Expr::value(Some(verifier_id)),
                )
        })
        .await?;

        counter!("fieldops.parts.verified", 1);
        info!(status = %updated.status, verifier = %verifier_name, "part verified");
        event_sender
            .publish(Event::PartVerified {
                company_id: self.ctx.company_id,
                part_id: updated.id,
                status: updated.status,
                verified_by: verifier_name,
            })
            .await;

        Ok(updated)
    }
}
