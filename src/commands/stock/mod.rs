//! Stock movements between central stock and facilities.
//!
//! Each command runs its stock change and its `transfer_log` entry in one
//! database transaction; decrements are conditional updates so concurrent
//! writers cannot drive a quantity below zero.

use crate::auth::TenantContext;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    customer, facility_stock::DestinationKind, location, spare_part, transfer_log,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

pub mod adjust_stock_command;
pub mod transfer_stock_command;
pub mod use_facility_stock_command;

pub use adjust_stock_command::{AdjustStockCommand, AdjustmentOutcome};
pub use transfer_stock_command::{TransferOutcome, TransferStockCommand};
pub use use_facility_stock_command::{UseFacilityStockCommand, UsageOutcome};

/// Looks up the display name of a transfer destination within the tenant.
pub(crate) async fn destination_name<C: ConnectionTrait>(
    db: &C,
    ctx: &TenantContext,
    kind: DestinationKind,
    id: Uuid,
) -> Result<String, ServiceError> {
    match kind {
        DestinationKind::Location => location::Entity::find_by_id(id)
            .filter(location::Column::CompanyId.eq(ctx.company_id))
            .one(db)
            .await?
            .map(|l| l.name)
            .ok_or_else(|| ServiceError::not_found("Location", id)),
        DestinationKind::Customer => customer::Entity::find_by_id(id)
            .filter(customer::Column::CompanyId.eq(ctx.company_id))
            .one(db)
            .await?
            .map(|c| c.name)
            .ok_or_else(|| ServiceError::not_found("Customer", id)),
    }
}

pub(crate) async fn load_spare_part<C: ConnectionTrait>(
    db: &C,
    ctx: &TenantContext,
    id: Uuid,
) -> Result<spare_part::Model, ServiceError> {
    spare_part::Entity::find_by_id(id)
        .filter(spare_part::Column::CompanyId.eq(ctx.company_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Spare part", id))
}

/// Fields of a log row beyond the tenant, actor and timestamp.
pub(crate) struct LogEntry {
    pub spare_part_id: Uuid,
    pub part_name: String,
    pub kind: transfer_log::TransferKind,
    pub quantity: i32,
    pub source: String,
    pub destination: Option<(DestinationKind, Uuid, String)>,
    pub work_order_id: Option<Uuid>,
    pub note: Option<String>,
}

pub(crate) async fn append_log<C: ConnectionTrait>(
    db: &C,
    ctx: &TenantContext,
    entry: LogEntry,
) -> Result<transfer_log::Model, ServiceError> {
    let (destination_kind, destination_id, destination_name) = match entry.destination {
        Some((kind, id, name)) => (Some(kind), Some(id), Some(name)),
        None => (None, None, None),
    };

    let row = transfer_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(ctx.company_id),
        spare_part_id: Set(entry.spare_part_id),
        part_name: Set(entry.part_name),
        kind: Set(entry.kind),
        quantity: Set(entry.quantity),
        source: Set(entry.source),
        destination_kind: Set(destination_kind),
        destination_id: Set(destination_id),
        destination_name: Set(destination_name),
        work_order_id: Set(entry.work_order_id),
        note: Set(entry.note),
        performed_by: Set(ctx.user_id),
        performed_by_name: Set(ctx.user_name.clone()),
        created_at: Set(Utc::now()),
    };
    Ok(row.insert(db).await?)
}

/// Publishes `LowStock` when a part has dropped to its reorder threshold.
pub(crate) async fn warn_if_low(event_sender: &EventSender, part: &spare_part::Model) {
    if part.is_low_stock() {
        event_sender
            .publish(Event::LowStock {
                company_id: part.company_id,
                spare_part_id: part.id,
                quantity: part.quantity,
                min_quantity: part.min_quantity,
            })
            .await;
    }
}
