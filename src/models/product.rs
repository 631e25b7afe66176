use super::{validate_not_blank, NewRecord, RecordPatch, TenantRecord};
use crate::auth::TenantContext;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A sellable product or service line.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "products";

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
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
}

impl NewRecord<Model> for CreateProductInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            name: Set(self.name.trim().to_string()),
            sku: Set(self.sku),
            description: Set(self.description),
            category: Set(self.category),
            price_cents: Set(self.price_cents),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    pub active: Option<bool>,
}

impl RecordPatch<Model> for UpdateProductInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(sku) = self.sku {
            active.sku = Set(Some(sku));
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = self.category {
            active.category = Set(Some(category));
        }
        if let Some(price) = self.price_cents {
            active.price_cents = Set(price);
        }
        if let Some(flag) = self.active {
            active.active = Set(flag);
        }
        active.updated_at = Set(Utc::now());
    }
}
