use super::{validate_not_blank, NewRecord, RecordPatch, TenantRecord};
use crate::auth::TenantContext;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const CENTRAL_LOCATION: &str = "Central Warehouse";

/// Central warehouse stock for one part.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spare_parts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub part_number: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub location: String,
    pub unit_cost_cents: Option<i64>,
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "spare_parts";

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
pub struct CreateSparePartInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 100))]
    pub part_number: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub min_quantity: i32,
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub unit_cost_cents: Option<i64>,
}

impl NewRecord<Model> for CreateSparePartInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            name: Set(self.name.trim().to_string()),
            part_number: Set(self.part_number),
            description: Set(self.description),
            quantity: Set(self.quantity),
            min_quantity: Set(self.min_quantity),
            location: Set(self
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| CENTRAL_LOCATION.to_string())),
            unit_cost_cents: Set(self.unit_cost_cents),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Quantity only moves through transfers and adjustments.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateSparePartInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub part_number: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub min_quantity: Option<i32>,
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub unit_cost_cents: Option<i64>,
}

impl RecordPatch<Model> for UpdateSparePartInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(part_number) = self.part_number {
            active.part_number = Set(Some(part_number));
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        if let Some(min_quantity) = self.min_quantity {
            active.min_quantity = Set(min_quantity);
        }
        if let Some(location) = self.location {
            active.location = Set(location);
        }
        if let Some(cost) = self.unit_cost_cents {
            active.unit_cost_cents = Set(Some(cost));
        }
        active.updated_at = Set(Utc::now());
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AdjustStockInput {
    /// Signed change to the central quantity; zero is rejected
    #[validate(range(min = -1_000_000, max = 1_000_000))]
    pub delta: i32,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

