use crate::{
    auth::{Permission, TenantContext},
    commands::parts::{
        AddPartsCommand, ChangePartQuantityCommand, ChangePartStatusCommand, MarkPartUsedCommand,
        RemovePartCommand, RequestPartVerificationCommand, VerifyPartCommand,
    },
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    models::allocated_part::{
        self, AddPartsInput, ChangePartStatusInput, ChangeQuantityInput, Entity as AllocatedPart,
        PartStatus, RequestVerificationInput, VerifyPartInput, VersionedInput,
    },
    models::work_order::{self, Entity as WorkOrder},
    services::authorize,
};
use sea_orm::{ActiveEnum, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Parts allocated to work orders and their handover/return lifecycle.
#[derive(Clone)]
pub struct PartAllocationService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PartAllocationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Parts on a work order, oldest first.
    #[instrument(skip(self, ctx))]
    pub async fn list_parts(
        &self,
        ctx: &TenantContext,
        work_order_id: Uuid,
    ) -> Result<Vec<allocated_part::Model>, ServiceError> {
        authorize(ctx, Permission::Read, "list parts", &self.event_sender).await?;

        WorkOrder::find_by_id(work_order_id)
            .filter(work_order::Column::CompanyId.eq(ctx.company_id))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Work order", work_order_id))?;

        Ok(AllocatedPart::find()
            .filter(allocated_part::Column::CompanyId.eq(ctx.company_id))
            .filter(allocated_part::Column::WorkOrderId.eq(work_order_id))
            .order_by_asc(allocated_part::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }

    /// Parts waiting for a second person to confirm a handover or return.
    pub async fn pending_verification(
        &self,
        ctx: &TenantContext,
    ) -> Result<Vec<allocated_part::Model>, ServiceError> {
        authorize(ctx, Permission::Read, "list parts", &self.event_sender).await?;
        Ok(AllocatedPart::find()
            .filter(allocated_part::Column::CompanyId.eq(ctx.company_id))
            .filter(allocated_part::Column::Status.is_in([
                PartStatus::PendingHandover.into_value(),
                PartStatus::PendingReturn.into_value(),
            ]))
            .order_by_asc(allocated_part::Column::UpdatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }

    pub async fn add_parts(
        &self,
        ctx: &TenantContext,
        work_order_id: Uuid,
        input: AddPartsInput,
    ) -> Result<Vec<allocated_part::Model>, ServiceError> {
        AddPartsCommand {
            ctx: ctx.clone(),
            work_order_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn change_status(
        &self,
        ctx: &TenantContext,
        part_id: Uuid,
        input: ChangePartStatusInput,
    ) -> Result<allocated_part::Model, ServiceError> {
        ChangePartStatusCommand {
            ctx: ctx.clone(),
            part_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn request_verification(
        &self,
        ctx: &TenantContext,
        part_id: Uuid,
        input: RequestVerificationInput,
    ) -> Result<allocated_part::Model, ServiceError> {
        RequestPartVerificationCommand {
            ctx: ctx.clone(),
            part_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn verify(
        &self,
        ctx: &TenantContext,
        part_id: Uuid,
        input: VerifyPartInput,
    ) -> Result<allocated_part::Model, ServiceError> {
        VerifyPartCommand {
            ctx: ctx.clone(),
            part_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn mark_used(
        &self,
        ctx: &TenantContext,
        part_id: Uuid,
        input: VersionedInput,
    ) -> Result<allocated_part::Model, ServiceError> {
        MarkPartUsedCommand {
            ctx: ctx.clone(),
            part_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn change_quantity(
        &self,
        ctx: &TenantContext,
        part_id: Uuid,
        input: ChangeQuantityInput,
    ) -> Result<allocated_part::Model, ServiceError> {
        ChangePartQuantityCommand {
            ctx: ctx.clone(),
            part_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn remove_part(
        &self,
        ctx: &TenantContext,
        part_id: Uuid,
        input: VersionedInput,
    ) -> Result<(), ServiceError> {
        RemovePartCommand {
            ctx: ctx.clone(),
            part_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }
}
