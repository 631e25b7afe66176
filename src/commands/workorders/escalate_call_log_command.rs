use crate::commands::Command;
use crate::events::{Event, EventSender};
use crate::{
    auth::{Permission, TenantContext},
    db::DbPool,
    errors::ServiceError,
    models::{
        service_call_log::{self, CallLogStatus, Entity as CallLog},
        work_order::{self, WorkOrderStatus},
    },
    services::authorize,
};
use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Turns a service call into an `Open` work order and links the two.
#[derive(Debug, Clone)]
pub struct EscalateCallLogCommand {
    pub ctx: TenantContext,
    pub call_log_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct Escalation {
    pub call_log: service_call_log::Model,
    pub work_order: work_order::Model,
}

#[async_trait::async_trait]
impl Command for EscalateCallLogCommand {
    type Result = Escalation;

    #[instrument(skip(self, db_pool, event_sender), fields(call_log_id = %self.call_log_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        authorize(&self.ctx, Permission::Write, "escalate call log", &event_sender).await?;

        let db = db_pool.as_ref();
        let txn = db.begin().await?;

        let log = CallLog::find_by_id(self.call_log_id)
            .filter(service_call_log::Column::CompanyId.eq(self.ctx.company_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Service call log", self.call_log_id))?;

        if log.status == CallLogStatus::Escalated || log.work_order_id.is_some() {
            warn!(work_order_id = ?log.work_order_id, "call log already escalated");
            return Err(ServiceError::InvalidOperation(format!(
                "call log {} is already escalated",
                log.id
            )));
        }

        let now = Utc::now();
        let work_order = work_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(self.ctx.company_id),
            title: Set(log.summary.clone()),
            description: Set(Some(match &log.details {
                Some(details) => format!("Reported by {}: {}", log.caller_name, details),
                None => format!("Reported by {}", log.caller_name),
            })),
            customer_id: Set(log.customer_id),
            asset_id: Set(log.asset_id),
            location_id: Set(None),
            status: Set(WorkOrderStatus::Open),
            priority: Set(log.priority),
            assigned_to: Set(None),
            notes: Set(None),
            created_by: Set(self.ctx.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            completed_at: Set(None),
        }
        .insert(&txn)
        .await?;

        // Guarded on the status read above so two escalations cannot both win.
        let linked = CallLog::update_many()
            .col_expr(
                service_call_log::Column::Status,
                Expr::value(CallLogStatus::Escalated.into_value()),
            )
            .col_expr(
                service_call_log::Column::WorkOrderId,
                Expr::value(Some(work_order.id)),
            )
            .col_expr(service_call_log::Column::UpdatedAt, Expr::value(now))
            .filter(service_call_log::Column::Id.eq(log.id))
            .filter(service_call_log::Column::Status.eq(log.status.into_value()))
            .filter(service_call_log::Column::WorkOrderId.is_null())
            .exec(&txn)
            .await?;

        if linked.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(log.id));
        }

        let call_log = CallLog::find_by_id(log.id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Service call log", log.id))?;

        txn.commit().await?;

        counter!("fieldops.call_logs.escalated", 1);
        info!(work_order_id = %work_order.id, "call log escalated");
        event_sender
            .publish(Event::CallLogEscalated {
                company_id: self.ctx.company_id,
                call_log_id: call_log.id,
                work_order_id: work_order.id,
            })
            .await;
        event_sender
            .publish(Event::WorkOrderCreated {
                company_id: self.ctx.company_id,
                work_order_id: work_order.id,
            })
            .await;

        Ok(Escalation {
            call_log,
            work_order,
        })
    }
}
