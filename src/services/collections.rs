//! Tenant-scoped CRUD shared by every simple collection.

use crate::auth::{Permission, TenantContext};
use crate::collection::{CollectionView, ListQuery, Page};
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{NewRecord, RecordPatch, TenantRecord};
use crate::services::authorize;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// CRUD over one table, always filtered by the caller's `company_id`.
///
/// A record owned by another tenant is indistinguishable from a missing one.
/// Deletes never cascade.
pub struct CollectionRepository<M: TenantRecord> {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    view: CollectionView,
    _record: PhantomData<fn() -> M>,
}

impl<M: TenantRecord> Clone for CollectionRepository<M> {
    fn clone(&self) -> Self {
        Self {
            db_pool: self.db_pool.clone(),
            event_sender: self.event_sender.clone(),
            view: self.view,
            _record: PhantomData,
        }
    }
}

impl<M> CollectionRepository<M>
where
    M: TenantRecord + IntoActiveModel<M::ActiveModel>,
{
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, view: CollectionView) -> Self {
        Self {
            db_pool,
            event_sender,
            view,
            _record: PhantomData,
        }
    }

    /// All of the tenant's records, unpaged.
    pub async fn all(&self, ctx: &TenantContext) -> Result<Vec<M>, ServiceError> {
        Ok(M::Entity::find()
            .filter(M::tenant_column().eq(ctx.company_id))
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self, ctx, query), fields(collection = M::COLLECTION, company_id = %ctx.company_id))]
    pub async fn list(&self, ctx: &TenantContext, query: &ListQuery) -> Result<Page<M>, ServiceError> {
        authorize(ctx, Permission::Read, "list records", &self.event_sender).await?;
        let records = self.all(ctx).await?;
        self.view.apply(records, query)
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<M, ServiceError> {
        authorize(ctx, Permission::Read, "read record", &self.event_sender).await?;
        self.find(ctx, id).await
    }

    #[instrument(skip(self, ctx, input), fields(collection = M::COLLECTION))]
    pub async fn create<I>(&self, ctx: &TenantContext, input: I) -> Result<M, ServiceError>
    where
        I: NewRecord<M>,
    {
        authorize(ctx, M::WRITE_PERMISSION, "create record", &self.event_sender).await?;
        input.validate()?;

        let record = input
            .into_active_model(ctx)
            .insert(self.db_pool.as_ref())
            .await?;

        info!(id = %record.record_id(), "record created");
        self.event_sender
            .publish(Event::RecordCreated {
                company_id: ctx.company_id,
                collection: M::COLLECTION.to_string(),
                id: record.record_id(),
            })
            .await;
        Ok(record)
    }

    #[instrument(skip(self, ctx, patch), fields(collection = M::COLLECTION, %id))]
    pub async fn update<P>(&self, ctx: &TenantContext, id: Uuid, patch: P) -> Result<M, ServiceError>
    where
        P: RecordPatch<M>,
    {
        authorize(ctx, M::WRITE_PERMISSION, "update record", &self.event_sender).await?;
        patch.validate()?;

        let existing = self.find(ctx, id).await?;
        let mut active: M::ActiveModel = existing.into();
        patch.apply_to(&mut active);
        let record = active.update(self.db_pool.as_ref()).await?;

        self.event_sender
            .publish(Event::RecordUpdated {
                company_id: ctx.company_id,
                collection: M::COLLECTION.to_string(),
                id,
            })
            .await;
        Ok(record)
    }

    #[instrument(skip(self, ctx), fields(collection = M::COLLECTION, %id))]
    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        authorize(ctx, M::WRITE_PERMISSION, "delete record", &self.event_sender).await?;

        let result = M::Entity::delete_many()
            .filter(M::id_column().eq(id))
            .filter(M::tenant_column().eq(ctx.company_id))
            .exec(self.db_pool.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found(M::COLLECTION, id));
        }

        info!("record deleted");
        self.event_sender
            .publish(Event::RecordDeleted {
                company_id: ctx.company_id,
                collection: M::COLLECTION.to_string(),
                id,
            })
            .await;
        Ok(())
    }

    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<M, ServiceError> {
        M::Entity::find()
            .filter(M::id_column().eq(id))
            .filter(M::tenant_column().eq(ctx.company_id))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found(M::COLLECTION, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::customer::{self, CreateCustomerInput, UpdateCustomerInput};
    use assert_matches::assert_matches;

    async fn repository() -> CollectionRepository<customer::Model> {
        let db = crate::db::connect_in_memory().await.unwrap();
        let (sender, _rx) = crate::events::channel(64);
        CollectionRepository::new(Arc::new(db), Arc::new(sender), CollectionView::default())
    }

    fn acme_input(name: &str) -> CreateCustomerInput {
        serde_json::from_value(serde_json::json!({ "name": name })).unwrap()
    }

    #[tokio::test]
    async fn records_are_invisible_to_other_tenants() {
        let repo = repository().await;
        let alice = TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), "Alice", Role::Admin);
        let mallory = TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), "Mallory", Role::Admin);

        let created = repo.create(&alice, acme_input("Acme Ltd")).await.unwrap();

        assert_matches!(
            repo.get(&mallory, created.id).await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(
            repo.delete(&mallory, created.id).await,
            Err(ServiceError::NotFound(_))
        );
        assert_eq!(repo.list(&mallory, &ListQuery::default()).await.unwrap().total, 0);
        assert_eq!(repo.get(&alice, created.id).await.unwrap().name, "Acme Ltd");
    }

    #[tokio::test]
    async fn update_applies_patch_and_viewer_cannot_write() {
        let repo = repository().await;
        let admin = TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), "Ada", Role::Admin);
        let viewer = TenantContext::new(admin.company_id, Uuid::new_v4(), "Vic", Role::Viewer);

        let created = repo.create(&admin, acme_input("Acme")).await.unwrap();
        let patch: UpdateCustomerInput =
            serde_json::from_value(serde_json::json!({ "name": "Acme Holdings" })).unwrap();
        let updated = repo.update(&admin, created.id, patch).await.unwrap();
        assert_eq!(updated.name, "Acme Holdings");

        assert_matches!(
            repo.create(&viewer, acme_input("Nope")).await,
            Err(ServiceError::Forbidden(_))
        );
        assert!(repo.get(&viewer, created.id).await.is_ok());
    }

    #[tokio::test]
    async fn blank_name_is_a_validation_error() {
        let repo = repository().await;
        let admin = TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), "Ada", Role::Admin);
        assert_matches!(
            repo.create(&admin, acme_input("  ")).await,
            Err(ServiceError::ValidationError(_))
        );
    }
}
