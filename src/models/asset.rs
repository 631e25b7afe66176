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
pub enum AssetStatus {
    #[sea_orm(string_value = "Operational")]
    Operational,
    #[sea_orm(string_value = "Under Maintenance")]
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
    #[sea_orm(string_value = "Out of Service")]
    #[serde(rename = "Out of Service")]
    OutOfService,
    #[sea_orm(string_value = "Decommissioned")]
    Decommissioned,
}

impl Default for AssetStatus {
    fn default() -> Self {
        Self::Operational
    }
}

/// Installed equipment at a customer site or location.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub customer_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub status: AssetStatus,
    pub installed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "assets";

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
pub struct CreateAssetInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 100))]
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub customer_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub status: AssetStatus,
    pub installed_at: Option<chrono::DateTime<Utc>>,
}

impl NewRecord<Model> for CreateAssetInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            name: Set(self.name.trim().to_string()),
            serial_number: Set(self.serial_number),
            model: Set(self.model),
            manufacturer: Set(self.manufacturer),
            customer_id: Set(self.customer_id),
            location_id: Set(self.location_id),
            status: Set(self.status),
            installed_at: Set(self.installed_at),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateAssetInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub customer_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub status: Option<AssetStatus>,
    pub installed_at: Option<chrono::DateTime<Utc>>,
}

impl RecordPatch<Model> for UpdateAssetInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(serial) = self.serial_number {
            active.serial_number = Set(Some(serial));
        }
        if let Some(model) = self.model {
            active.model = Set(Some(model));
        }
        if let Some(manufacturer) = self.manufacturer {
            active.manufacturer = Set(Some(manufacturer));
        }
        if let Some(customer_id) = self.customer_id {
            active.customer_id = Set(Some(customer_id));
        }
        if let Some(location_id) = self.location_id {
            active.location_id = Set(Some(location_id));
        }
        if let Some(status) = self.status {
            active.status = Set(status);
        }
        if let Some(installed_at) = self.installed_at {
            active.installed_at = Set(Some(installed_at));
        }
        active.updated_at = Set(Utc::now());
    }
}
