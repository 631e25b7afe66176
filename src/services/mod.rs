use crate::auth::{Permission, TenantContext};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use metrics::counter;
use tracing::warn;

pub mod collections;
pub mod dashboard;
pub mod ledger;
pub mod notifications;
pub mod part_allocation;
pub mod resources;
pub mod stock;
pub mod work_orders;

/// Checks the caller's role against `permission`.
///
/// A denial is logged, counted and published as `PermissionDenied` before the
/// `Forbidden` error is returned.
pub async fn authorize(
    ctx: &TenantContext,
    permission: Permission,
    action: &str,
    event_sender: &EventSender,
) -> Result<(), ServiceError> {
    if ctx.allows(permission) {
        return Ok(());
    }

    warn!(
        company_id = %ctx.company_id,
        user_id = %ctx.user_id,
        role = ?ctx.role,
        action,
        "permission denied"
    );
    counter!("fieldops.permission_denied", 1);
    event_sender
        .publish(Event::PermissionDenied {
            company_id: ctx.company_id,
            user_id: ctx.user_id,
            action: action.to_string(),
        })
        .await;

    Err(ServiceError::Forbidden(format!(
        "{:?} role may not {}",
        ctx.role, action
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use assert_matches::assert_matches;
    use uuid::Uuid;

    #[tokio::test]
    async fn denial_publishes_permission_denied() {
        let (sender, mut rx) = crate::events::channel(4);
        let viewer = TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), "Vic", Role::Viewer);

        let result = authorize(&viewer, Permission::Write, "create work order", &sender).await;
        assert_matches!(result, Err(ServiceError::Forbidden(_)));
        assert_matches!(
            rx.try_recv(),
            Ok(Event::PermissionDenied { user_id, .. }) if user_id == viewer.user_id
        );

        let admin = TenantContext::new(viewer.company_id, Uuid::new_v4(), "Ada", Role::Admin);
        assert!(authorize(&admin, Permission::Admin, "change part status", &sender)
            .await
            .is_ok());
        assert!(rx.try_recv().is_err());
    }
}
