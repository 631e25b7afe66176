use crate::commands::Command;
use crate::events::{Event, EventSender};
use crate::{
    auth::{Permission, TenantContext},
    db::DbPool,
    errors::ServiceError,
    models::{
        work_order::{self, Entity as WorkOrder, UpdateWorkOrderInput},
        RecordPatch,
    },
    services::authorize,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Patches a work order. Completing it stamps `completed_at`; moving it out of
/// `Completed` clears the stamp.
#[derive(Debug, Clone)]
pub struct UpdateWorkOrderCommand {
    pub ctx: TenantContext,
    pub work_order_id: Uuid,
    pub input: UpdateWorkOrderInput,
}

#[async_trait::async_trait]
impl Command for UpdateWorkOrderCommand {
    type Result = work_order::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(work_order_id = %self.work_order_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "update work order", &event_sender).await?;
        self.input.validate()?;

        let db = db_pool.as_ref();
        let existing = WorkOrder::find_by_id(self.work_order_id)
            .filter(work_order::Column::CompanyId.eq(self.ctx.company_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Work order", self.work_order_id))?;

        let previous_status = existing.status;
        let mut active: work_order::ActiveModel = existing.into();
        self.input.clone().apply_to(&mut active);
        let updated = active.update(db).await?;

        info!(
            from = ?previous_status,
            to = ?updated.status,
            "work order updated"
        );
        event_sender
            .publish(Event::WorkOrderUpdated {
                company_id: self.ctx.company_id,
                work_order_id: updated.id,
            })
            .await;

        Ok(updated)
    }
}
