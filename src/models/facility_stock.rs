use super::TenantRecord;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum DestinationKind {
    #[sea_orm(string_value = "Location")]
    Location,
    #[sea_orm(string_value = "Customer")]
    Customer,
}

/// Units of a spare part held at a location or a customer site.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "facility_stock")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub spare_part_id: Uuid,
    pub part_name: String,
    pub destination_kind: DestinationKind,
    pub destination_id: Uuid,
    pub destination_name: String,
    pub quantity: i32,
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "facility_stock";

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
pub struct TransferStockInput {
    #[validate(range(min = 1, message = "transfer quantity must be at least 1"))]
    pub quantity: i32,
    pub destination_kind: DestinationKind,
    pub destination_id: Uuid,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct UseFacilityStockInput {
    #[validate(range(min = 1, message = "quantity used must be at least 1"))]
    pub quantity: i32,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}
