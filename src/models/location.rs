use super::{validate_not_blank, NewRecord, RecordPatch, TenantRecord};
use crate::auth::TenantContext;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A site or depot that can hold facility stock.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub customer_id: Option<Uuid>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "locations";

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
pub struct CreateLocationInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    pub address: Option<String>,
    pub customer_id: Option<Uuid>,
    pub contact_name: Option<String>,
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
}

impl NewRecord<Model> for CreateLocationInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            name: Set(self.name.trim().to_string()),
            address: Set(self.address),
            customer_id: Set(self.customer_id),
            contact_name: Set(self.contact_name),
            contact_phone: Set(self.contact_phone),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateLocationInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub address: Option<String>,
    pub customer_id: Option<Uuid>,
    pub contact_name: Option<String>,
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
}

impl RecordPatch<Model> for UpdateLocationInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(address) = self.address {
            active.address = Set(Some(address));
        }
        if let Some(customer_id) = self.customer_id {
            active.customer_id = Set(Some(customer_id));
        }
        if let Some(contact) = self.contact_name {
            active.contact_name = Set(Some(contact));
        }
        if let Some(phone) = self.contact_phone {
            active.contact_phone = Set(Some(phone));
        }
        active.updated_at = Set(Utc::now());
    }
}
