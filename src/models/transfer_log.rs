use super::facility_stock::DestinationKind;
use super::TenantRecord;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TransferKind {
    #[sea_orm(string_value = "Transfer")]
    Transfer,
    #[sea_orm(string_value = "Used")]
    Used,
    #[sea_orm(string_value = "Adjustment")]
    Adjustment,
}

/// Append-only stock movement log. Rows are never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub spare_part_id: Uuid,
    pub part_name: String,
    pub kind: TransferKind,
    /// Signed for adjustments, positive otherwise
    pub quantity: i32,
    pub source: String,
    pub destination_kind: Option<DestinationKind>,
    pub destination_id: Option<Uuid>,
    pub destination_name: Option<String>,
    pub work_order_id: Option<Uuid>,
    pub note: Option<String>,
    pub performed_by: Uuid,
    pub performed_by_name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "transfer_log";

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
