use crate::{
    ai::{AiCapability, DocumentAnalysis, DocumentInput},
    auth::{Permission, TenantContext},
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::resource::{self, storage_key, Entity as Resource},
    services::authorize,
    storage::BlobStore,
};
use bytes::Bytes;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Resource files: blob upload, download and AI analysis.
#[derive(Clone)]
pub struct ResourceService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    blobs: Arc<dyn BlobStore>,
    ai: Arc<dyn AiCapability>,
}

/// Strips any directory part a client sent along with the file name.
fn clean_file_name(raw: &str) -> Result<String, ServiceError> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(ServiceError::ValidationError(format!(
            "invalid file name: {:?}",
            raw
        )));
    }
    Ok(name.to_string())
}

impl ResourceService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        blobs: Arc<dyn BlobStore>,
        ai: Arc<dyn AiCapability>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            blobs,
            ai,
        }
    }

    async fn load(&self, ctx: &TenantContext, id: Uuid) -> Result<resource::Model, ServiceError> {
        Resource::find_by_id(id)
            .filter(resource::Column::CompanyId.eq(ctx.company_id))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Resource", id))
    }

    /// Stores the file under `resources/{company}/{resource}/{file}` and records
    /// its download URL. A previous file on the same resource is replaced.
    #[instrument(skip(self, ctx, data), fields(%resource_id, size = data.len()))]
    pub async fn upload(
        &self,
        ctx: &TenantContext,
        resource_id: Uuid,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<resource::Model, ServiceError> {
        authorize(ctx, Permission::Write, "upload resource", &self.event_sender).await?;
        if data.is_empty() {
            return Err(ServiceError::ValidationError("uploaded file is empty".to_string()));
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(ServiceError::ValidationError(format!(
                "uploaded file exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        let existing = self.load(ctx, resource_id).await?;
        let file_name = clean_file_name(file_name)?;
        let key = storage_key(ctx.company_id, resource_id, &file_name);
        let size = data.len() as i64;
        let url = self.blobs.put(&key, data).await?;

        let previous_key = existing.storage_key.clone().filter(|k| *k != key);

        let mut active: resource::ActiveModel = existing.into();
        active.file_name = Set(Some(file_name));
        active.content_type = Set(Some(content_type.to_string()));
        active.size_bytes = Set(Some(size));
        active.storage_key = Set(Some(key));
        active.download_url = Set(Some(url));
        active.analysis = Set(None);
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db_pool.as_ref()).await?;

        // The record no longer references the old file.
        if let Some(old_key) = previous_key {
            if let Err(e) = self.blobs.delete(&old_key).await {
                warn!(key = %old_key, error = %e, "failed to remove replaced file");
            }
        }

        info!(download_url = ?updated.download_url, "resource file stored");
        self.event_sender
            .publish(Event::RecordUpdated {
                company_id: ctx.company_id,
                collection: "resources".to_string(),
                id: updated.id,
            })
            .await;
        Ok(updated)
    }

    /// Returns the file bytes together with the stored metadata.
    pub async fn download(
        &self,
        ctx: &TenantContext,
        resource_id: Uuid,
    ) -> Result<(resource::Model, Bytes), ServiceError> {
        authorize(ctx, Permission::Read, "download resource", &self.event_sender).await?;
        let record = self.load(ctx, resource_id).await?;
        let key = record
            .storage_key
            .clone()
            .ok_or_else(|| ServiceError::NotFound(format!("resource {} has no file", resource_id)))?;
        let data = self.blobs.get(&key).await?;
        Ok((record, data))
    }

    /// Runs AI document analysis over the stored file and keeps the result on
    /// the record.
    #[instrument(skip(self, ctx))]
    pub async fn analyze(
        &self,
        ctx: &TenantContext,
        resource_id: Uuid,
    ) -> Result<DocumentAnalysis, ServiceError> {
        authorize(ctx, Permission::Write, "analyze resource", &self.event_sender).await?;
        let (record, data) = self.download(ctx, resource_id).await?;

        let analysis = self
            .ai
            .analyze_document(DocumentInput {
                file_name: record.file_name.clone().unwrap_or_default(),
                content_type: record
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                bytes: data,
            })
            .await?;

        let mut active: resource::ActiveModel = record.into();
        active.analysis = Set(Some(serde_json::to_value(&analysis)?));
        active.updated_at = Set(Utc::now());
        active.update(self.db_pool.as_ref()).await?;

        info!(document_type = ?analysis.document_type, "resource analyzed");
        Ok(analysis)
    }

    /// Deletes the record and its stored file.
    pub async fn delete(&self, ctx: &TenantContext, resource_id: Uuid) -> Result<(), ServiceError> {
        authorize(ctx, Permission::Write, "delete resource", &self.event_sender).await?;
        let record = self.load(ctx, resource_id).await?;
        if let Some(key) = record.storage_key.as_deref() {
            self.blobs.delete(key).await?;
        }
        Resource::delete_many()
            .filter(resource::Column::Id.eq(record.id))
            .filter(resource::Column::CompanyId.eq(ctx.company_id))
            .exec(self.db_pool.as_ref())
            .await?;

        self.event_sender
            .publish(Event::RecordDeleted {
                company_id: ctx.company_id,
                collection: "resources".to_string(),
                id: record.id,
            })
            .await;
        Ok(())
    }
}
