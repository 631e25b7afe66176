//! Sales ledger: payments and AI-assisted import.

use crate::{
    ai::{AiCapability, DocumentInput},
    auth::{Permission, TenantContext},
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::ledger_transaction::{self, Entity as LedgerTransaction, PaymentStatus, RecordPaymentInput},
    services::authorize,
};
use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LedgerTotals {
    pub billed_cents: i64,
    pub paid_cents: i64,
    pub outstanding_cents: i64,
}

impl LedgerTotals {
    /// Sums non-void entries.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ledger_transaction::Model>) -> Self {
        entries
            .into_iter()
            .filter(|t| t.status != PaymentStatus::Void)
            .fold(Self::default(), |mut acc, t| {
                acc.billed_cents += t.amount_cents;
                acc.paid_cents += t.paid_cents;
                acc.outstanding_cents += t.outstanding_cents();
                acc
            })
    }
}

#[derive(Clone)]
pub struct LedgerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    ai: Arc<dyn AiCapability>,
}

impl LedgerService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        ai: Arc<dyn AiCapability>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            ai,
        }
    }

    /// Applies a payment. Rejected when non-positive, when it would exceed the
    /// billed amount, or when the entry is void.
    #[instrument(skip(self, ctx, input), fields(amount_cents = input.amount_cents))]
    pub async fn record_payment(
        &self,
        ctx: &TenantContext,
        transaction_id: Uuid,
        input: RecordPaymentInput,
    ) -> Result<ledger_transaction::Model, ServiceError> {
        authorize(ctx, Permission::Write, "record payment", &self.event_sender).await?;

        let amount = input.amount_cents;
        if amount <= 0 {
            return Err(ServiceError::InvalidOperation(
                "payment amount must be positive".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let entry = LedgerTransaction::find_by_id(transaction_id)
            .filter(ledger_transaction::Column::CompanyId.eq(ctx.company_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction", transaction_id))?;

        if entry.status == PaymentStatus::Void {
            return Err(ServiceError::InvalidOperation(format!(
                "transaction {} is void",
                entry.id
            )));
        }

        if amount > entry.outstanding_cents() {
            warn!(
                amount_cents = entry.amount_cents,
                paid_cents = entry.paid_cents,
                payment = amount,
                "overpayment rejected"
            );
            return Err(ServiceError::InvalidOperation(format!(
                "payment of {} exceeds outstanding balance of {}",
                amount,
                entry.outstanding_cents()
            )));
        }

        let paid = entry.paid_cents + amount;
        let status = PaymentStatus::for_amounts(entry.amount_cents, paid);
        let applied = LedgerTransaction::update_many()
            .col_expr(ledger_transaction::Column::PaidCents, Expr::value(paid))
            .col_expr(
                ledger_transaction::Column::Status,
                Expr::value(status.into_value()),
            )
            .col_expr(ledger_transaction::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(ledger_transaction::Column::Id.eq(entry.id))
            .filter(ledger_transaction::Column::PaidCents.eq(entry.paid_cents))
            .filter(ledger_transaction::Column::Status.ne(PaymentStatus::Void.into_value()))
            .exec(db)
            .await?;

        if applied.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(entry.id));
        }

        let updated = LedgerTransaction::find_by_id(entry.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction", entry.id))?;

        counter!("fieldops.ledger.payments", 1);
        info!(paid_cents = updated.paid_cents, status = ?updated.status, "payment recorded");
        self.event_sender
            .publish(Event::PaymentRecorded {
                company_id: ctx.company_id,
                transaction_id: updated.id,
                amount_cents: amount,
                paid_cents: updated.paid_cents,
            })
            .await;

        Ok(updated)
    }

    /// Extracts ledger lines from a document and stores them as `Pending`
    /// entries. Lines with a non-positive amount or a blank description are
    /// skipped.
    #[instrument(skip(self, ctx, document), fields(file_name = %document.file_name))]
    pub async fn import_transactions(
        &self,
        ctx: &TenantContext,
        document: DocumentInput,
    ) -> Result<Vec<ledger_transaction::Model>, ServiceError> {
        authorize(ctx, Permission::Write, "import transactions", &self.event_sender).await?;

        let extracted = self.ai.extract_transactions(document).await?;
        let total = extracted.len();

        let txn = self.db_pool.as_ref().begin().await?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(total);
        for line in extracted {
            let description = line.description.trim().to_string();
            if line.amount_cents <= 0 || description.is_empty() {
                continue;
            }
            let row = ledger_transaction::ActiveModel {
                id: Set(Uuid::new_v4()),
                company_id: Set(ctx.company_id),
                reference: Set(line.reference),
                description: Set(description),
                customer_id: Set(None),
                work_order_id: Set(None),
                amount_cents: Set(line.amount_cents),
                paid_cents: Set(0),
                status: Set(PaymentStatus::Pending),
                transaction_date: Set(line.transaction_date.unwrap_or(now)),
                created_at: Set(now),
                updated_at: Set(now),
            };
            created.push(row.insert(&txn).await?);
        }
        txn.commit().await?;

        if created.len() < total {
            warn!(skipped = total - created.len(), "unusable extracted lines skipped");
        }
        info!(count = created.len(), "transactions imported");
        self.event_sender
            .publish(Event::TransactionsImported {
                company_id: ctx.company_id,
                count: created.len(),
            })
            .await;

        Ok(created)
    }

    pub async fn totals(&self, ctx: &TenantContext) -> Result<LedgerTotals, ServiceError> {
        authorize(ctx, Permission::Read, "read ledger", &self.event_sender).await?;
        let entries = LedgerTransaction::find()
            .filter(ledger_transaction::Column::CompanyId.eq(ctx.company_id))
            .all(self.db_pool.as_ref())
            .await?;
        Ok(LedgerTotals::from_entries(&entries))
    }
}
