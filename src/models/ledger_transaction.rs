//! Sales ledger entries. Amounts are integer cents.

use super::{validate_not_blank, NewRecord, RecordPatch, TenantRecord};
use crate::auth::TenantContext;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Partially Paid")]
    #[serde(rename = "Partially Paid")]
    PartiallyPaid,
    #[sea_orm(string_value = "Paid")]
    Paid,
    #[sea_orm(string_value = "Void")]
    Void,
}

impl PaymentStatus {
    /// Status implied by the paid amount.
    pub fn for_amounts(amount_cents: i64, paid_cents: i64) -> Self {
        if paid_cents <= 0 {
            Self::Pending
        } else if paid_cents >= amount_cents {
            Self::Paid
        } else {
            Self::PartiallyPaid
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub reference: Option<String>,
    pub description: String,
    pub customer_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub amount_cents: i64,
    pub paid_cents: i64,
    pub status: PaymentStatus,
    pub transaction_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn outstanding_cents(&self) -> i64 {
        if self.status == PaymentStatus::Void {
            return 0;
        }
        (self.amount_cents - self.paid_cents).max(0)
    }
}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "transactions";

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
pub struct CreateTransactionInput {
    #[validate(length(max = 64))]
    pub reference: Option<String>,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub description: String,
    pub customer_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub amount_cents: i64,
    pub transaction_date: Option<chrono::DateTime<Utc>>,
}

impl NewRecord<Model> for CreateTransactionInput {
    fn into_active_model(self, ctx: &TenantContext) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(ctx.company_id),
            reference: Set(self.reference),
            description: Set(self.description.trim().to_string()),
            customer_id: Set(self.customer_id),
            work_order_id: Set(self.work_order_id),
            amount_cents: Set(self.amount_cents),
            paid_cents: Set(0),
            status: Set(PaymentStatus::Pending),
            transaction_date: Set(self.transaction_date.unwrap_or(now)),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Payments go through `record_payment`; the paid amount is not patchable.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateTransactionInput {
    #[validate(length(max = 64))]
    pub reference: Option<String>,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub transaction_date: Option<chrono::DateTime<Utc>>,
    /// Only `true` is meaningful: marks the entry void
    pub void: Option<bool>,
}

impl RecordPatch<Model> for UpdateTransactionInput {
    fn apply_to(self, active: &mut ActiveModel) {
        if let Some(reference) = self.reference {
            active.reference = Set(Some(reference));
        }
        if let Some(description) = self.description {
            active.description = Set(description.trim().to_string());
        }
        if let Some(customer_id) = self.customer_id {
            active.customer_id = Set(Some(customer_id));
        }
        if let Some(work_order_id) = self.work_order_id {
            active.work_order_id = Set(Some(work_order_id));
        }
        if let Some(date) = self.transaction_date {
            active.transaction_date = Set(date);
        }
        if self.void == Some(true) {
            active.status = Set(PaymentStatus::Void);
        }
        active.updated_at = Set(Utc::now());
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RecordPaymentInput {
    pub amount_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10_000, 0, PaymentStatus::Pending)]
    #[case(10_000, 2_500, PaymentStatus::PartiallyPaid)]
    #[case(10_000, 10_000, PaymentStatus::Paid)]
    fn status_follows_paid_amount(
        #[case] amount: i64,
        #[case] paid: i64,
        #[case] expected: PaymentStatus,
    ) {
        assert_eq!(PaymentStatus::for_amounts(amount, paid), expected);
    }
}
