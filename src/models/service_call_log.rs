use super::work_order::WorkOrderPriority;
use super::{validate_not_blank, NewRecord, RecordPatch, TenantRecord};
use crate::auth::TenantContext;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum CallLogStatus {
    #[sea_orm(string_value = "Open")]
    Open,
    #[sea_orm(string_value = "Escalated")]
    Escalated,
    #[sea_orm(string_value = "Closed")]
    Closed,
}

/// An inbound service call. Escalation turns it into a work order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_call_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub caller_name: String,
    pub caller_phone: Option<String>,
    pub customer_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub summary: String,
    pub details: Option<String>,
    pub priority: WorkOrderPriority,
    pub status: CallLogStatus,
    pub work_order_id: Option<Uuid>,
    pub logged_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "service_call_logs";

    fn id_column() -> Column {
        Column::Id
    }

    fn tenant_column() -> Column {
        Column::CompanyId
    }

    fn record_id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCallLogInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub caller_name: String,
    #[validate(length(max = 50))]
    pub caller_phone: Option<String>,
    pub customer_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub summary: String,
    #[validate(length(max = 4000))]
    pub details: Option<String>,
    #[serde(default)]
    pub priority: WorkOrderPriority,
}

impl NewRecord<Model> for CreateCallLogInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            caller_name: Set(self.caller_name.trim().to_string()),
            caller_phone: Set(self.caller_phone),
            customer_id: Set(self.customer_id),
            asset_id: Set(self.asset_id),
            summary: Set(self.summary.trim().to_string()),
            details: Set(self.details),
            priority: Set(self.priority),
            status: Set(CallLogStatus::Open),
            work_order_id: Set(None),
            logged_by: Set(ctx.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Escalation is a separate operation; status can only be closed or reopened here.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCallLogInput {
    #[validate(length(max = 50))]
    pub caller_phone: Option<String>,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub summary: Option<String>,
    #[validate(length(max = 4000))]
    pub details: Option<String>,
    pub priority: Option<WorkOrderPriority>,
    pub closed: Option<bool>,
}

impl RecordPatch<Model> for UpdateCallLogInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(phone) = self.caller_phone {
            active.caller_phone = Set(Some(phone));
        }
        if let Some(summary) = self.summary {
            active.summary = Set(summary.trim().to_string());
        }
        if let Some(details) = self.details {
            active.details = Set(Some(details));
        }
        if let Some(priority) = self.priority {
            active.priority = Set(priority);
        }
        match self.closed {
            Some(true) => active.status = Set(CallLogStatus::Closed),
            Some(false) => active.status = Set(CallLogStatus::Open),
            None => {}
        }
        active.updated_at = Set(Utc::now());
    }
}
