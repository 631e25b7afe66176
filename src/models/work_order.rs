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
pub enum WorkOrderStatus {
    #[sea_orm(string_value = "Open")]
    Open,
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "On Hold")]
    #[serde(rename = "On Hold")]
    OnHold,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl WorkOrderStatus {
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum WorkOrderPriority {
    #[sea_orm(string_value = "Low")]
    Low,
    #[sea_orm(string_value = "Medium")]
    Medium,
    #[sea_orm(string_value = "High")]
    High,
    #[sea_orm(string_value = "Urgent")]
    Urgent,
}

impl Default for WorkOrderPriority {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub status: WorkOrderStatus,
    pub priority: WorkOrderPriority,
    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "work_orders";

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
pub struct CreateWorkOrderInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub priority: WorkOrderPriority,
    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,
}

impl NewRecord<Model> for CreateWorkOrderInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            title: Set(self.title.trim().to_string()),
            description: Set(self.description),
            customer_id: Set(self.customer_id),
            asset_id: Set(self.asset_id),
            location_id: Set(self.location_id),
            status: Set(WorkOrderStatus::Open),
            priority: Set(self.priority),
            assigned_to: Set(self.assigned_to),
            notes: Set(self.notes),
            created_by: Set(ctx.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            completed_at: Set(None),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateWorkOrderInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub status: Option<WorkOrderStatus>,
    pub priority: Option<WorkOrderPriority>,
    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,
}

impl RecordPatch<Model> for UpdateWorkOrderInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(title) = self.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        if let Some(priority) = self.priority {
            active.priority = Set(priority);
        }
        if let Some(assignee) = self.assigned_to {
            active.assigned_to = Set(Some(assignee));
        }
        if let Some(notes) = self.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(status) = self.status {
            active.status = Set(status);
            active.completed_at = Set(match status {
                WorkOrderStatus::Completed => Some(Utc::now()),
                _ => None,
            });
        }
        active.updated_at = Set(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_with_display_labels() {
        assert_eq!(
            serde_json::to_string(&WorkOrderStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        let parsed: WorkOrderStatus = serde_json::from_str("\"On Hold\"").unwrap();
        assert_eq!(parsed, WorkOrderStatus::OnHold);
        assert!(WorkOrderStatus::Cancelled.is_closed());
        assert!(!WorkOrderStatus::Open.is_closed());
    }

    #[test]
    fn completing_stamps_completed_at() {
        let mut active = <ActiveModel as Default>::default();
        UpdateWorkOrderInput {
            status: Some(WorkOrderStatus::Completed),
            ..Default::default()
        }
        .apply_to(&mut active);
        assert!(matches!(active.completed_at, sea_orm::ActiveValue::Set(Some(_))));
    }

    #[test]
    fn blank_title_is_rejected() {
        let input = CreateWorkOrderInput {
            title: "   ".into(),
            description: None,
            customer_id: None,
            asset_id: None,
            location_id: None,
            priority: WorkOrderPriority::High,
            assigned_to: None,
            notes: None,
        };
        assert!(input.validate().is_err());
    }
}
