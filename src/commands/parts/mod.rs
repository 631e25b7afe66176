//! Commands driving the allocated-part lifecycle.
//!
//! Every write is a version-conditional `UPDATE`: the row only changes if its
//! `version` still matches what the command read. A lost race surfaces as
//! `ServiceError::ConcurrentModification`.

use crate::auth::TenantContext;
use crate::errors::ServiceError;
use crate::models::allocated_part::{self, Entity as AllocatedPart};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, UpdateMany};
use tracing::warn;
use uuid::Uuid;

pub mod add_parts_command;
pub mod change_part_quantity_command;
pub mod change_part_status_command;
pub mod mark_part_used_command;
pub mod remove_part_command;
pub mod request_part_verification_command;
pub mod verify_part_command;

pub use add_parts_command::AddPartsCommand;
pub use change_part_quantity_command::ChangePartQuantityCommand;
pub use change_part_status_command::ChangePartStatusCommand;
pub use mark_part_used_command::MarkPartUsedCommand;
pub use remove_part_command::RemovePartCommand;
pub use request_part_verification_command::RequestPartVerificationCommand;
pub use verify_part_command::VerifyPartCommand;

/// Loads a part owned by the caller's tenant.
pub(crate) async fn load_part<C: ConnectionTrait>(
    db: &C,
    ctx: &TenantContext,
    part_id: Uuid,
) -> Result<allocated_part::Model, ServiceError> {
    AllocatedPart::find_by_id(part_id)
        .filter(allocated_part::Column::CompanyId.eq(ctx.company_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Allocated part", part_id))
}

/// Rejects the command early when the caller's copy is already stale.
pub(crate) fn check_version(
    part: &allocated_part::Model,
    expected: Option<i32>,
) -> Result<(), ServiceError> {
    match expected {
        Some(v) if v != part.version => {
            warn!(
                part_id = %part.id,
                expected = v,
                actual = part.version,
                "stale part version"
            );
            Err(ServiceError::ConcurrentModification(part.id))
        }
        _ => Ok(()),
    }
}

/// Applies `changes` only if the row still carries `part.version`, bumping the
/// version, and returns the stored row.
pub(crate) async fn update_versioned<C, F>(
    db: &C,
    part: &allocated_part::Model,
    changes: F,
) -> Result<allocated_part::Model, ServiceError>
where
    C: ConnectionTrait,
    F: FnOnce(UpdateMany<AllocatedPart>) -> UpdateMany<AllocatedPart>,
{
    let result = changes(AllocatedPart::update_many())
        .col_expr(allocated_part::Column::Version, Expr::value(part.version + 1))
        .col_expr(allocated_part::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(allocated_part::Column::Id.eq(part.id))
        .filter(allocated_part::Column::CompanyId.eq(part.company_id))
        .filter(allocated_part::Column::Version.eq(part.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        warn!(part_id = %part.id, version = part.version, "lost update race on part");
        return Err(ServiceError::ConcurrentModification(part.id));
    }

    AllocatedPart::find_by_id(part.id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Allocated part", part.id))
}
