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
pub enum OpportunityStage {
    #[sea_orm(string_value = "Lead")]
    Lead,
    #[sea_orm(string_value = "Qualified")]
    Qualified,
    #[sea_orm(string_value = "Proposal")]
    Proposal,
    #[sea_orm(string_value = "Won")]
    Won,
    #[sea_orm(string_value = "Lost")]
    Lost,
}

impl OpportunityStage {
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for OpportunityStage {
    fn default() -> Self {
        Self::Lead
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "opportunities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub customer_id: Option<Uuid>,
    pub stage: OpportunityStage,
    pub value_cents: i64,
    pub probability: Option<i32>,
    pub expected_close_at: Option<DateTimeUtc>,
    pub owner_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "opportunities";

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
pub struct CreateOpportunityInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: String,
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub stage: OpportunityStage,
    #[validate(range(min = 0))]
    pub value_cents: i64,
    #[validate(range(min = 0, max = 100))]
    pub probability: Option<i32>,
    pub expected_close_at: Option<chrono::DateTime<Utc>>,
    pub owner_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl NewRecord<Model> for CreateOpportunityInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            title: Set(self.title.trim().to_string()),
            customer_id: Set(self.customer_id),
            stage: Set(self.stage),
            value_cents: Set(self.value_cents),
            probability: Set(self.probability),
            expected_close_at: Set(self.expected_close_at),
            owner_id: Set(self.owner_id.or(Some(ctx.user_id))),
            notes: Set(self.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateOpportunityInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: Option<String>,
    pub customer_id: Option<Uuid>,
    pub stage: Option<OpportunityStage>,
    #[validate(range(min = 0))]
    pub value_cents: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    pub probability: Option<i32>,
    pub expected_close_at: Option<chrono::DateTime<Utc>>,
    pub owner_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl RecordPatch<Model> for UpdateOpportunityInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(title) = self.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(customer_id) = self.customer_id {
            active.customer_id = Set(Some(customer_id));
        }
        if let Some(stage) = self.stage {
            active.stage = Set(stage);
        }
        if let Some(value) = self.value_cents {
            active.value_cents = Set(value);
        }
        if let Some(probability) = self.probability {
            active.probability = Set(Some(probability));
        }
        if let Some(close) = self.expected_close_at {
            active.expected_close_at = Set(Some(close));
        }
        if let Some(owner) = self.owner_id {
            active.owner_id = Set(Some(owner));
        }
        if let Some(notes) = self.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());
    }
}
