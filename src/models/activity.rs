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
pub enum ActivityKind {
    #[sea_orm(string_value = "Call")]
    Call,
    #[sea_orm(string_value = "Email")]
    Email,
    #[sea_orm(string_value = "Meeting")]
    Meeting,
    #[sea_orm(string_value = "Visit")]
    Visit,
    #[sea_orm(string_value = "Task")]
    Task,
    #[sea_orm(string_value = "Note")]
    Note,
}

/// A CRM touchpoint linked to a customer, opportunity or work order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub kind: ActivityKind,
    pub subject: String,
    pub details: Option<String>,
    pub customer_id: Option<Uuid>,
    pub opportunity_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub due_at: Option<DateTimeUtc>,
    pub completed: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "activities";

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
pub struct CreateActivityInput {
    pub kind: ActivityKind,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub subject: String,
    #[validate(length(max = 4000))]
    pub details: Option<String>,
    pub customer_id: Option<Uuid>,
    pub opportunity_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub due_at: Option<chrono::DateTime<Utc>>,
}

impl NewRecord<Model> for CreateActivityInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            kind: Set(self.kind),
            subject: Set(self.subject.trim().to_string()),
            details: Set(self.details),
            customer_id: Set(self.customer_id),
            opportunity_id: Set(self.opportunity_id),
            work_order_id: Set(self.work_order_id),
            owner_id: Set(ctx.user_id),
            due_at: Set(self.due_at),
            completed: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateActivityInput {
    pub kind: Option<ActivityKind>,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub subject: Option<String>,
    #[validate(length(max = 4000))]
    pub details: Option<String>,
    pub due_at: Option<chrono::DateTime<Utc>>,
    pub completed: Option<bool>,
}

impl RecordPatch<Model> for UpdateActivityInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(kind) = self.kind {
            active.kind = Set(kind);
        }
        if let Some(subject) = self.subject {
            active.subject = Set(subject.trim().to_string());
        }
        if let Some(details) = self.details {
            active.details = Set(Some(details));
        }
        if let Some(due_at) = self.due_at {
            active.due_at = Set(Some(due_at));
        }
        if let Some(completed) = self.completed {
            active.completed = Set(completed);
        }
        active.updated_at = Set(Utc::now());
    }
}
