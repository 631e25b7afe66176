//! Spare-part lines attached to a work order and their handover/return lifecycle.
//!
//! ```text
//! Allocated -> Pending Handover -> With Engineer -> Used
//!                                  With Engineer -> Pending Return -> Returned
//! ```
//!
//! `Used` and `Returned` are terminal. Admins may overwrite the status directly.

use super::{validate_not_blank, TenantRecord};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PartStatus {
    #[sea_orm(string_value = "Allocated")]
    Allocated,
    #[sea_orm(string_value = "Pending Handover")]
    #[serde(rename = "Pending Handover")]
    PendingHandover,
    #[sea_orm(string_value = "With Engineer")]
    #[serde(rename = "With Engineer")]
    WithEngineer,
    #[sea_orm(string_value = "Pending Return")]
    #[serde(rename = "Pending Return")]
    PendingReturn,
    #[sea_orm(string_value = "Returned")]
    Returned,
    #[sea_orm(string_value = "Used")]
    Used,
}

impl fmt::Display for PartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Allocated => "Allocated",
            Self::PendingHandover => "Pending Handover",
            Self::WithEngineer => "With Engineer",
            Self::PendingReturn => "Pending Return",
            Self::Returned => "Returned",
            Self::Used => "Used",
        };
        f.write_str(label)
    }
}

/// The kind of second-party check a technician asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum VerificationKind {
    Handover,
    Return,
}

/// Actions a technician can take on a part outside of an admin overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartAction {
    RequestHandover,
    RequestReturn,
    Verify,
    MarkUsed,
}

impl From<VerificationKind> for PartAction {
    fn from(kind: VerificationKind) -> Self {
        match kind {
            VerificationKind::Handover => PartAction::RequestHandover,
            VerificationKind::Return => PartAction::RequestReturn,
        }
    }
}

impl PartStatus {
    /// Target status for `action`, or `None` when the action is not allowed here.
    pub fn transition(self, action: PartAction) -> Option<PartStatus> {
        match (self, action) {
            (Self::Allocated, PartAction::RequestHandover) => Some(Self::PendingHandover),
            (Self::PendingHandover, PartAction::Verify) => Some(Self::WithEngineer),
            (Self::WithEngineer, PartAction::MarkUsed) => Some(Self::Used),
            (Self::WithEngineer, PartAction::RequestReturn) => Some(Self::PendingReturn),
            (Self::PendingReturn, PartAction::Verify) => Some(Self::Returned),
            _ => None,
        }
    }

    pub fn is_pending_verification(self) -> bool {
        matches!(self, Self::PendingHandover | Self::PendingReturn)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Used | Self::Returned)
    }

    pub fn is_removable(self) -> bool {
        self == Self::Allocated
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "allocated_parts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub work_order_id: Uuid,
    pub spare_part_id: Option<Uuid>,
    pub name: String,
    pub part_number: Option<String>,
    pub quantity: i32,
    pub status: PartStatus,
    pub requested_by: Option<Uuid>,
    pub requested_by_name: Option<String>,
    pub verified_by: Option<String>,
    pub verified_by_id: Option<Uuid>,
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantRecord for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    const COLLECTION: &'static str = "allocated_parts";

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
pub struct NewPartLine {
    pub spare_part_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 100))]
    pub part_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddPartsInput {
    #[validate(length(min = 1, max = 100))]
    pub parts: Vec<NewPartLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ChangePartStatusInput {
    pub status: PartStatus,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RequestVerificationInput {
    pub kind: VerificationKind,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct VerifyPartInput {
    #[validate(length(max = 200))]
    pub verifier_name: String,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ChangeQuantityInput {
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct VersionedInput {
    pub expected_version: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PartStatus::Allocated, PartAction::RequestHandover, Some(PartStatus::PendingHandover))]
    #[case(PartStatus::PendingHandover, PartAction::Verify, Some(PartStatus::WithEngineer))]
    #[case(PartStatus::WithEngineer, PartAction::MarkUsed, Some(PartStatus::Used))]
    #[case(PartStatus::WithEngineer, PartAction::RequestReturn, Some(PartStatus::PendingReturn))]
    #[case(PartStatus::PendingReturn, PartAction::Verify, Some(PartStatus::Returned))]
    #[case(PartStatus::Allocated, PartAction::Verify, None)]
    #[case(PartStatus::Allocated, PartAction::MarkUsed, None)]
    #[case(PartStatus::PendingHandover, PartAction::MarkUsed, None)]
    #[case(PartStatus::WithEngineer, PartAction::RequestHandover, None)]
    #[case(PartStatus::Used, PartAction::RequestReturn, None)]
    #[case(PartStatus::Returned, PartAction::RequestHandover, None)]
    fn lifecycle_transitions(
        #[case] from: PartStatus,
        #[case] action: PartAction,
        #[case] expected: Option<PartStatus>,
    ) {
        assert_eq!(from.transition(action), expected);
    }

    #[rstest]
    #[case(PartStatus::Used)]
    #[case(PartStatus::Returned)]
    fn terminal_states_accept_nothing(#[case] status: PartStatus) {
        assert!(status.is_terminal());
        for action in [
            PartAction::RequestHandover,
            PartAction::RequestReturn,
            PartAction::Verify,
            PartAction::MarkUsed,
        ] {
            assert_eq!(status.transition(action), None);
        }
    }

    #[test]
    fn only_allocated_parts_are_removable() {
        assert!(PartStatus::Allocated.is_removable());
        assert!(!PartStatus::WithEngineer.is_removable());
        assert!(!PartStatus::PendingHandover.is_removable());
    }

    #[test]
    fn display_and_serde_agree() {
        for status in [
            PartStatus::Allocated,
            PartStatus::PendingHandover,
            PartStatus::WithEngineer,
            PartStatus::PendingReturn,
            PartStatus::Returned,
            PartStatus::Used,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn zero_quantity_fails_validation() {
        let input = ChangeQuantityInput {
            quantity: 0,
            expected_version: None,
        };
        assert!(input.validate().is_err());
        let input = ChangeQuantityInput {
            quantity: 1,
            expected_version: Some(3),
        };
        assert!(input.validate().is_ok());
    }
}
