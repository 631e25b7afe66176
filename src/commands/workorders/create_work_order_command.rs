use crate::commands::Command;
use crate::events::{Event, EventSender};
use crate::{
    auth::{Permission, TenantContext},
    db::DbPool,
    errors::ServiceError,
    models::{
        work_order::{self, CreateWorkOrderInput},
        NewRecord,
    },
    services::authorize,
};
use metrics::counter;
use sea_orm::ActiveModelTrait;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, Clone)]
pub struct CreateWorkOrderCommand {
    pub ctx: TenantContext,
    pub input: CreateWorkOrderInput,
}

#[async_trait::async_trait]
impl Command for CreateWorkOrderCommand {
    type Result = work_order::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(company_id = %self.ctx.company_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "create work order", &event_sender).await?;
        self.input.validate()?;

        let work_order = self
            .input
            .clone()
            .into_active_model(&self.ctx)
            .insert(db_pool.as_ref())
            .await?;

        counter!("fieldops.work_orders.created", 1);
        info!(work_order_id = %work_order.id, title = %work_order.title, "work order created");
        event_sender
            .publish(Event::WorkOrderCreated {
                company_id: self.ctx.company_id,
                work_order_id: work_order.id,
            })
            .await;

        Ok(work_order)
    }
}
