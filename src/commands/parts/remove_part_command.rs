use super::{check_version, load_part};
use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::allocated_part::{self, Entity as AllocatedPart, VersionedInput},
    services::authorize,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Deletes a part line that has not left the store yet.
#[derive(Debug, Clone)]
pub struct RemovePartCommand {
    pub ctx: TenantContext,
    pub part_id: Uuid,
    pub input: VersionedInput,
}

#[async_trait::async_trait]
impl Command for RemovePartCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(part_id = %self.part_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "remove part", &event_sender).await?;

        let db = db_pool.as_ref();
        let part = load_part(db, &self.ctx, self.part_id).await?;
        check_version(&part, self.input.expected_version)?;

        if !part.status.is_removable() {
            return Err(ServiceError::InvalidOperation(format!(
                "only allocated parts can be removed; part is {}",
                part.status
            )));
        }

        let result = AllocatedPart::delete_many()
            .filter(allocated_part::Column::Id.eq(part.id))
            .filter(allocated_part::Column::CompanyId.eq(self.ctx.company_id))
            .filter(allocated_part::Column::Version.eq(part.version))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(part.id));
        }

        info!("part removed");
        event_sender
            .publish(Event::PartRemoved {
                company_id: self.ctx.company_id,
                part_id: part.id,
                work_order_id: part.work_order_id,
            })
            .await;

        Ok(())
    }
}
