use super::{validate_not_blank, NewRecord, RecordPatch, TenantRecord};
use crate::auth::TenantContext;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
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
    const COLLECTION: &'static str = "customers";

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
pub struct CreateCustomerInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub notes: Option<String>,
}

impl NewRecord<Model> for CreateCustomerInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            name: Set(self.name.trim().to_string()),
            email: Set(self.email),
            phone: Set(self.phone),
            address: Set(self.address),
            contact_person: Set(self.contact_person),
            notes: Set(self.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCustomerInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub notes: Option<String>,
}

impl RecordPatch<Model> for UpdateCustomerInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = self.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = self.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = self.address {
            active.address = Set(Some(address));
        }
        if let Some(contact) = self.contact_person {
            active.contact_person = Set(Some(contact));
        }
        if let Some(notes) = self.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());
    }
}
