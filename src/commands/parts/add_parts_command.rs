use crate::{
    auth::{Permission, TenantContext},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        allocated_part::{self, AddPartsInput, PartStatus},
        work_order::{self, Entity as WorkOrder},
    },
    services::authorize,
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Appends new part lines to a work order. Each line starts `Allocated`
/// with quantity 1.
#[derive(Debug, Clone)]
pub struct AddPartsCommand {
    pub ctx: TenantContext,
    pub work_order_id: Uuid,
    pub input: AddPartsInput,
}

#[async_trait::async_trait]
impl Command for AddPartsCommand {
    type Result = Vec<allocated_part::Model>;

    #[instrument(skip(self, db_pool, event_sender), fields(work_order_id = %self.work_order_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "allocate parts", &event_sender).await?;
        self.input.validate()?;
        for line in &self.input.parts {
            line.validate()?;
        }

        let db = db_pool.as_ref();
        let txn = db.begin().await?;

        WorkOrder::find_by_id(self.work_order_id)
            .filter(work_order::Column::CompanyId.eq(self.ctx.company_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Work order", self.work_order_id))?;

        let now = Utc::now();
        let mut created = Vec::with_capacity(self.input.parts.len());
        for line in &self.input.parts {
            let part = allocated_part::ActiveModel {
                id: Set(Uuid::new_v4()),
                company_id: Set(self.ctx.company_id),
                work_order_id: Set(self.work_order_id),
                spare_part_id: Set(line.spare_part_id),
                name: Set(line.name.trim().to_string()),
                part_number: Set(line.part_number.clone()),
                quantity: Set(1),
                status: Set(PartStatus::Allocated),
                requested_by: Set(None),
                requested_by_name: Set(None),
                verified_by: Set(None),
                verified_by_id: Set(None),
                version: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
            };
            created.push(part.insert(&txn).await?);
        }

        txn.commit().await?;

        counter!("fieldops.parts.allocated", created.len() as u64);
        info!(count = created.len(), "parts allocated");
        event_sender
            .publish(Event::PartsAllocated {
                company_id: self.ctx.company_id,
                work_order_id: self.work_order_id,
                part_ids: created.iter().map(|p| p.id).collect(),
            })
            .await;

        Ok(created)
    }
}
