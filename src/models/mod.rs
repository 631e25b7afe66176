//! Persistent records. Every table is scoped by `company_id`, the tenant key.

use crate::auth::{Permission, TenantContext};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

pub mod activity;
pub mod allocated_part;
pub mod asset;
pub mod company;
pub mod customer;
pub mod facility_stock;
pub mod ledger_transaction;
pub mod location;
pub mod notification;
pub mod opportunity;
pub mod product;
pub mod resource;
pub mod service_call_log;
pub mod spare_part;
pub mod transfer_log;
pub mod user;
pub mod work_order;

/// A record that belongs to exactly one tenant and is addressed by a UUID.
pub trait TenantRecord:
    Sized + Clone + Serialize + sea_orm::FromQueryResult + Send + Sync + 'static
{
    type Entity: EntityTrait<Model = Self>;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity>
        + ActiveModelBehavior
        + From<Self>
        + Send
        + Sync
        + 'static;

    /// Collection name used in logs, events and error messages
    const COLLECTION: &'static str;

    /// Permission needed to create, update or delete records
    const WRITE_PERMISSION: Permission = Permission::Write;

    fn id_column() -> <Self::Entity as EntityTrait>::Column;
    fn tenant_column() -> <Self::Entity as EntityTrait>::Column;
    fn record_id(&self) -> Uuid;
}

/// A validated creation payload for a tenant record.
pub trait NewRecord<M: TenantRecord>: Validate + Send {
    fn into_active_model(self, ctx: &TenantContext) -> M::ActiveModel;
}

/// A validated partial update for a tenant record. Unset fields are left alone.
pub trait RecordPatch<M: TenantRecord>: Validate + Send {
    fn apply_to(self, active: &mut M::ActiveModel);
}

/// Rejects text that is empty once trimmed.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}
