use crate::{
    auth::{Permission, TenantContext},
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    models::notification::{self, Entity as Notification},
    services::authorize,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Read state of notifications addressed to the caller. A notification with no
/// `user_id` is a broadcast to everyone in the tenant.
#[derive(Clone)]
pub struct NotificationService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

fn addressed_to(ctx: &TenantContext) -> Condition {
    Condition::all()
        .add(notification::Column::CompanyId.eq(ctx.company_id))
        .add(
            Condition::any()
                .add(notification::Column::UserId.eq(ctx.user_id))
                .add(notification::Column::UserId.is_null()),
        )
}

impl NotificationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Unread notifications for the caller, newest first.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn list_unread(
        &self,
        ctx: &TenantContext,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        authorize(ctx, Permission::Read, "list notifications", &self.event_sender).await?;
        Ok(Notification::find()
            .filter(addressed_to(ctx))
            .filter(notification::Column::Read.eq(false))
            .order_by_desc(notification::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn mark_read(
        &self,
        ctx: &TenantContext,
        notification_id: Uuid,
    ) -> Result<notification::Model, ServiceError> {
        authorize(ctx, Permission::Read, "mark notification read", &self.event_sender).await?;
        let db = self.db_pool.as_ref();

        let existing = Notification::find_by_id(notification_id)
            .filter(addressed_to(ctx))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification", notification_id))?;

        if existing.read {
            return Ok(existing);
        }

        Notification::update_many()
            .col_expr(notification::Column::Read, Expr::value(true))
            .col_expr(notification::Column::ReadAt, Expr::value(Some(Utc::now())))
            .filter(notification::Column::Id.eq(existing.id))
            .exec(db)
            .await?;

        Notification::find_by_id(existing.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification", existing.id))
    }

    /// Marks every unread notification addressed to the caller; returns how
    /// many changed.
    pub async fn mark_all_read(&self, ctx: &TenantContext) -> Result<u64, ServiceError> {
        authorize(ctx, Permission::Read, "mark notifications read", &self.event_sender).await?;
        let result = Notification::update_many()
            .col_expr(notification::Column::Read, Expr::value(true))
            .col_expr(notification::Column::ReadAt, Expr::value(Some(Utc::now())))
            .filter(addressed_to(ctx))
            .filter(notification::Column::Read.eq(false))
            .exec(self.db_pool.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
