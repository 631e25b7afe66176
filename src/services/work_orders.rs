use crate::{
    ai::AiCapability,
    auth::{Permission, TenantContext},
    collection::{CollectionView, ListQuery, Page},
    commands::workorders::{
        CreateWorkOrderCommand, EscalateCallLogCommand, Escalation, UpdateWorkOrderCommand,
    },
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    models::{
        allocated_part::{self, Entity as AllocatedPart},
        customer,
        work_order::{self, CreateWorkOrderInput, Entity as WorkOrder, UpdateWorkOrderInput},
    },
    reports::ServiceReport,
    services::authorize,
};
use serde::Serialize;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// A work order together with its allocated parts.
#[derive(Debug, Clone, Serialize)]
pub struct WorkOrderDetail {
    #[serde(flatten)]
    pub work_order: work_order::Model,
    pub parts: Vec<allocated_part::Model>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotesSummary {
    pub work_order_id: Uuid,
    pub summary: String,
}

/// Service for managing work orders
#[derive(Clone)]
pub struct WorkOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    ai: Arc<dyn AiCapability>,
    view: CollectionView,
}

impl WorkOrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        ai: Arc<dyn AiCapability>,
        view: CollectionView,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            ai,
            view,
        }
    }

    pub async fn create_work_order(
        &self,
        ctx: &TenantContext,
        input: CreateWorkOrderInput,
    ) -> Result<work_order::Model, ServiceError> {
        CreateWorkOrderCommand {
            ctx: ctx.clone(),
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn update_work_order(
        &self,
        ctx: &TenantContext,
        work_order_id: Uuid,
        input: UpdateWorkOrderInput,
    ) -> Result<work_order::Model, ServiceError> {
        UpdateWorkOrderCommand {
            ctx: ctx.clone(),
            work_order_id,
            input,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    pub async fn escalate_call_log(
        &self,
        ctx: &TenantContext,
        call_log_id: Uuid,
    ) -> Result<Escalation, ServiceError> {
        EscalateCallLogCommand {
            ctx: ctx.clone(),
            call_log_id,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_work_order(
        &self,
        ctx: &TenantContext,
        work_order_id: Uuid,
    ) -> Result<WorkOrderDetail, ServiceError> {
        authorize(ctx, Permission::Read, "read work order", &self.event_sender).await?;
        let work_order = self.load(ctx, work_order_id).await?;
        let parts = AllocatedPart::find()
            .filter(allocated_part::Column::CompanyId.eq(ctx.company_id))
            .filter(allocated_part::Column::WorkOrderId.eq(work_order_id))
            .order_by_asc(allocated_part::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(WorkOrderDetail { work_order, parts })
    }

    #[instrument(skip(self, ctx, query))]
    pub async fn list_work_orders(
        &self,
        ctx: &TenantContext,
        query: &ListQuery,
    ) -> Result<Page<work_order::Model>, ServiceError> {
        authorize(ctx, Permission::Read, "list work orders", &self.event_sender).await?;
        let records = WorkOrder::find()
            .filter(work_order::Column::CompanyId.eq(ctx.company_id))
            .order_by_desc(work_order::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        self.view.apply(records, query)
    }

    /// Asks the AI capability for a short summary of the repair notes.
    #[instrument(skip(self, ctx))]
    pub async fn summarize_notes(
        &self,
        ctx: &TenantContext,
        work_order_id: Uuid,
    ) -> Result<NotesSummary, ServiceError> {
        authorize(ctx, Permission::Read, "summarize notes", &self.event_sender).await?;
        let work_order = self.load(ctx, work_order_id).await?;
        let notes = work_order
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                ServiceError::ValidationError("work order has no notes to summarize".to_string())
            })?;

        let summary = self.ai.summarize_notes(notes).await?;
        info!(len = summary.len(), "notes summarized");
        Ok(NotesSummary {
            work_order_id,
            summary,
        })
    }

    /// Service report built from the work order's notes and used parts.
    #[instrument(skip(self, ctx))]
    pub async fn service_report(
        &self,
        ctx: &TenantContext,
        work_order_id: Uuid,
    ) -> Result<ServiceReport, ServiceError> {
        let detail = self.get_work_order(ctx, work_order_id).await?;
        let customer_name = match detail.work_order.customer_id {
            Some(customer_id) => customer::Entity::find_by_id(customer_id)
                .filter(customer::Column::CompanyId.eq(ctx.company_id))
                .one(self.db_pool.as_ref())
                .await?
                .map(|c| c.name),
            None => None,
        };
        Ok(ServiceReport::build(
            &detail.work_order,
            &detail.parts,
            customer_name,
        ))
    }

    pub(crate) async fn load(
        &self,
        ctx: &TenantContext,
        work_order_id: Uuid,
    ) -> Result<work_order::Model, ServiceError> {
        WorkOrder::find_by_id(work_order_id)
            .filter(work_order::Column::CompanyId.eq(ctx.company_id))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Work order", work_order_id))
    }
}
