use super::{validate_not_blank, NewRecord, RecordPatch, TenantRecord};
use crate::auth::TenantContext;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A document or manual. The file itself lives in blob storage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub storage_key: Option<String>,
    pub download_url: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub analysis: Option<Json>,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "resources";

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

/// Blob key for a resource file: `resources/{company}/{resource}/{file}`.
pub fn storage_key(company_id: Uuid, resource_id: Uuid, file_name: &str) -> String {
    format!("resources/{}/{}/{}", company_id, resource_id, file_name)
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateResourceInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl NewRecord<Model> for CreateResourceInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            title: Set(self.title.trim().to_string()),
            description: Set(self.description),
            category: Set(self.category),
            file_name: Set(None),
            content_type: Set(None),
            size_bytes: Set(None),
            storage_key: Set(None),
            download_url: Set(None),
            analysis: Set(None),
            created_by: Set(ctx.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateResourceInput {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl RecordPatch<Model> for UpdateResourceInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(title) = self.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = self.category {
            active.category = Set(Some(category));
        }
        active.updated_at = Set(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_layout() {
        let company = Uuid::nil();
        let resource = Uuid::from_u128(7);
        assert_eq!(
            storage_key(company, resource, "manual.pdf"),
            format!("resources/{}/{}/manual.pdf", company, resource)
        );
    }
}
