use super::{validate_not_blank, RecordPatch, TenantRecord};
use crate::auth::Permission;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A tenant. Its own id is the tenant key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "companies";
    const WRITE_PERMISSION: Permission = Permission::Admin;

    fn id_column() -> Column {
        Column::Id
    }

    fn tenant_column() -> Column {
        Column::Id
    }

    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl ActiveModel {
    pub fn new_company(name: &str) -> Self {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            contact_email: Set(None),
            phone: Set(None),
            address: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCompanyInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl RecordPatch<Model> for UpdateCompanyInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = self.contact_email {
            active.contact_email = Set(Some(email));
        }
        if let Some(phone) = self.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = self.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Utc::now());
    }
}
