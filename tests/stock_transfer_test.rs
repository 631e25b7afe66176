mod common;

use assert_matches::assert_matches;
use common::TestApp;
use fieldops_api::{
    auth::Role,
    errors::ServiceError,
    models::{
        facility_stock::{DestinationKind, TransferStockInput, UseFacilityStockInput},
        spare_part::{self, AdjustStockInput},
        transfer_log::TransferKind,
        work_order::WorkOrderStatus,
    },
};
use proptest::prelude::*;
use uuid::Uuid;

fn to_location(location_id: Uuid, quantity: i32) -> TransferStockInput {
    TransferStockInput {
        quantity,
        destination_kind: DestinationKind::Location,
        destination_id: location_id,
        note: None,
    }
}

#[tokio::test]
async fn transfer_moves_units_and_logs_once() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let stock = &app.state.services.stock;

    let part = app.spare_part(&admin, "Pump X", 10, 0).await;
    let depot = app.location(&admin, "North Depot").await;

    let outcome = stock
        .transfer(&admin, part.id, to_location(depot.id, 5))
        .await
        .unwrap();

    assert_eq!(outcome.spare_part.quantity, 5);
    assert_eq!(outcome.facility_stock.quantity, 5);
    assert_eq!(outcome.facility_stock.destination_name, "North Depot");
    assert_eq!(outcome.log_entry.kind, TransferKind::Transfer);
    assert_eq!(outcome.log_entry.quantity, 5);

    let log = stock.transfer_log(&admin, Some(part.id)).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].destination_id, Some(depot.id));
    assert_eq!(log[0].performed_by, admin.user_id);
}

#[tokio::test]
async fn repeated_transfers_accumulate_on_one_facility_row() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let stock = &app.state.services.stock;

    let part = app.spare_part(&admin, "Pump X", 10, 0).await;
    let depot = app.location(&admin, "North Depot").await;

    let first = stock
        .transfer(&admin, part.id, to_location(depot.id, 3))
        .await
        .unwrap();
    let second = stock
        .transfer(&admin, part.id, to_location(depot.id, 4))
        .await
        .unwrap();

    assert_eq!(first.facility_stock.id, second.facility_stock.id);
    assert_eq!(second.facility_stock.quantity, 7);
    assert_eq!(second.spare_part.quantity, 3);

    let rows = stock.facility_stock(&admin, Some(part.id)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(stock.transfer_log(&admin, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn insufficient_stock_changes_nothing() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let stock = &app.state.services.stock;

    let part = app.spare_part(&admin, "Pump X", 4, 0).await;
    let depot = app.location(&admin, "North Depot").await;

    let result = stock
        .transfer(&admin, part.id, to_location(depot.id, 5))
        .await;
    assert_matches!(result, Err(ServiceError::InsufficientStock(_)));

    let reloaded = app
        .repo::<spare_part::Model>()
        .get(&admin, part.id)
        .await
        .unwrap();
    assert_eq!(reloaded.quantity, 4);
    assert!(stock.facility_stock(&admin, None).await.unwrap().is_empty());
    assert!(stock.transfer_log(&admin, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn zero_quantity_transfer_is_invalid() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let part = app.spare_part(&admin, "Pump X", 4, 0).await;
    let depot = app.location(&admin, "North Depot").await;

    let result = app
        .state
        .services
        .stock
        .transfer(&admin, part.id, to_location(depot.id, 0))
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn destination_must_belong_to_the_tenant() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let outsider = app.stranger("Mallory", Role::Admin);

    let part = app.spare_part(&admin, "Pump X", 10, 0).await;
    let foreign_depot = app.location(&outsider, "Elsewhere").await;

    let result = app
        .state
        .services
        .stock
        .transfer(&admin, part.id, to_location(foreign_depot.id, 1))
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn transfer_to_a_customer_site() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let part = app.spare_part(&admin, "Pump X", 10, 0).await;
    let customer = app.customer(&admin, "Acme Dairy").await;

    let outcome = app
        .state
        .services
        .stock
        .transfer(
            &admin,
            part.id,
            TransferStockInput {
                quantity: 2,
                destination_kind: DestinationKind::Customer,
                destination_id: customer.id,
                note: Some("consignment".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.facility_stock.destination_kind, DestinationKind::Customer);
    assert_eq!(outcome.facility_stock.destination_name, "Acme Dairy");
    assert_eq!(outcome.log_entry.note.as_deref(), Some("consignment"));
}

#[tokio::test]
async fn using_facility_stock_records_a_completed_work_order() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let tech = app.user("John", Role::Technician);
    let stock = &app.state.services.stock;

    let part = app.spare_part(&admin, "Pump X", 10, 0).await;
    let depot = app.location(&admin, "North Depot").await;
    let moved = stock
        .transfer(&admin, part.id, to_location(depot.id, 5))
        .await
        .unwrap();

    let usage = stock
        .use_facility_stock(
            &tech,
            moved.facility_stock.id,
            UseFacilityStockInput {
                quantity: 2,
                note: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(usage.facility_stock.quantity, 3);
    assert_eq!(usage.work_order.status, WorkOrderStatus::Completed);
    assert_eq!(usage.work_order.location_id, Some(depot.id));
    assert_eq!(usage.work_order.assigned_to, Some(tech.user_id));
    assert!(usage.work_order.completed_at.is_some());
    assert_eq!(usage.log_entry.kind, TransferKind::Used);
    assert_eq!(usage.log_entry.work_order_id, Some(usage.work_order.id));

    let too_many = stock
        .use_facility_stock(
            &tech,
            moved.facility_stock.id,
            UseFacilityStockInput {
                quantity: 4,
                note: None,
            },
        )
        .await;
    assert_matches!(too_many, Err(ServiceError::InsufficientStock(_)));
}

#[tokio::test]
async fn adjustments_cannot_drive_stock_negative() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let stock = &app.state.services.stock;
    let part = app.spare_part(&admin, "Pump X", 3, 2).await;

    let down = stock
        .adjust(
            &admin,
            part.id,
            AdjustStockInput {
                delta: -2,
                reason: "damaged in storage".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(down.spare_part.quantity, 1);
    assert_eq!(down.log_entry.kind, TransferKind::Adjustment);
    assert_eq!(down.log_entry.quantity, -2);

    let below_zero = stock
        .adjust(
            &admin,
            part.id,
            AdjustStockInput {
                delta: -2,
                reason: "recount".to_string(),
            },
        )
        .await;
    assert_matches!(below_zero, Err(ServiceError::InsufficientStock(_)));

    let zero = stock
        .adjust(
            &admin,
            part.id,
            AdjustStockInput {
                delta: 0,
                reason: "noop".to_string(),
            },
        )
        .await;
    assert_matches!(zero, Err(ServiceError::ValidationError(_)));

    let low = stock.low_stock(&admin).await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, part.id);
}

#[tokio::test]
async fn out_of_range_adjustments_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let stock = &app.state.services.stock;
    let part = app.spare_part(&admin, "Pump X", 10, 2).await;

    for delta in [i32::MIN, i32::MAX, -1_000_001] {
        let result = stock
            .adjust(
                &admin,
                part.id,
                AdjustStockInput {
                    delta,
                    reason: "bad recount".to_string(),
                },
            )
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    let unchanged = app
        .repo::<spare_part::Model>()
        .get(&admin, part.id)
        .await
        .unwrap();
    assert_eq!(unchanged.quantity, 10);
    assert_eq!(unchanged.version, part.version);
}

#[tokio::test]
async fn viewers_cannot_move_stock() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let viewer = app.user("Val", Role::Viewer);
    let part = app.spare_part(&admin, "Pump X", 10, 0).await;
    let depot = app.location(&admin, "North Depot").await;

    let result = app
        .state
        .services
        .stock
        .transfer(&viewer, part.id, to_location(depot.id, 1))
        .await;
    assert_matches!(result, Err(ServiceError::Forbidden(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn transfers_conserve_units(original in 0i32..50, requested in 1i32..60) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (central, facility, logged) = rt.block_on(async {
            let app = TestApp::new().await;
            let admin = app.user("Ada", Role::Admin);
            let part = app.spare_part(&admin, "Pump X", original, 0).await;
            let depot = app.location(&admin, "North Depot").await;

            let result = app
                .state
                .services
                .stock
                .transfer(&admin, part.id, to_location(depot.id, requested))
                .await;
            if requested > original {
                assert!(matches!(result, Err(ServiceError::InsufficientStock(_))));
            } else {
                assert!(result.is_ok());
            }

            let central = app
                .repo::<spare_part::Model>()
                .get(&admin, part.id)
                .await
                .unwrap()
                .quantity;
            let facility: i32 = app
                .state
                .services
                .stock
                .facility_stock(&admin, Some(part.id))
                .await
                .unwrap()
                .iter()
                .map(|row| row.quantity)
                .sum();
            let logged = app
                .state
                .services
                .stock
                .transfer_log(&admin, Some(part.id))
                .await
                .unwrap()
                .len();
            (central, facility, logged)
        });

        prop_assert_eq!(central + facility, original);
        if requested <= original {
            prop_assert_eq!(central, original - requested);
            prop_assert_eq!(facility, requested);
            prop_assert_eq!(logged, 1);
        } else {
            prop_assert_eq!(central, original);
            prop_assert_eq!(facility, 0);
            prop_assert_eq!(logged, 0);
        }
    }
}
