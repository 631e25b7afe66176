use super::{validate_not_blank, NewRecord, RecordPatch, TenantRecord};
use crate::auth::TenantContext;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// An in-app notice. A missing `user_id` addresses every user of the tenant.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub read_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "notifications";

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
pub struct CreateNotificationInput {
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    pub link: Option<String>,
}

impl NewRecord<Model> for CreateNotificationInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            user_id: Set(self.user_id),
            title: Set(self.title),
            message: Set(self.message),
            link: Set(self.link),
            read: Set(false),
            read_at: Set(None),
            created_at: Set(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateNotificationInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub message: Option<String>,
    pub link: Option<String>,
    pub read: Option<bool>,
}

impl RecordPatch<Model> for UpdateNotificationInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(message) = self.message {
            active.message = Set(message);
        }
        if let Some(link) = self.link {
            active.link = Set(Some(link));
        }
        if let Some(read) = self.read {
            active.read = Set(read);
            active.read_at = Set(read.then(Utc::now));
        }
    }
}
