mod common;

use common::TestApp;
use fieldops_api::{
    auth::Role,
    models::{
        allocated_part::{RequestVerificationInput, VerificationKind},
        ledger_transaction::{self, CreateTransactionInput, RecordPaymentInput},
        opportunity::{self, CreateOpportunityInput, OpportunityStage},
        work_order::{UpdateWorkOrderInput, WorkOrderStatus},
    },
};

fn deal(title: &str, stage: OpportunityStage, value_cents: i64) -> CreateOpportunityInput {
    CreateOpportunityInput {
        title: title.to_string(),
        customer_id: None,
        stage,
        value_cents,
        probability: None,
        expected_close_at: None,
        owner_id: None,
        notes: None,
    }
}

#[tokio::test]
async fn summary_aggregates_the_tenant() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let john = app.user("John", Role::Technician);
    let outsider = app.stranger("Mallory", Role::Admin);

    let boiler = app.work_order(&john, "Boiler service").await;
    let pump = app.work_order(&john, "Pump overhaul").await;
    app.work_order(&outsider, "Elsewhere").await;
    app.state
        .services
        .work_orders
        .update_work_order(
            &john,
            pump.id,
            UpdateWorkOrderInput {
                status: Some(WorkOrderStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let part = app.allocate(&john, boiler.id, "Gasket").await;
    app.allocate(&john, boiler.id, "Burner nozzle").await;
    app.state
        .services
        .parts
        .request_verification(
            &john,
            part.id,
            RequestVerificationInput {
                kind: VerificationKind::Handover,
                expected_version: None,
            },
        )
        .await
        .unwrap();

    let low = app.spare_part(&admin, "Fan belt", 1, 2).await;
    app.spare_part(&admin, "Filter", 40, 5).await;

    let ledger = app.repo::<ledger_transaction::Model>();
    let invoice = ledger
        .create(
            &admin,
            CreateTransactionInput {
                reference: None,
                description: "Boiler service".to_string(),
                customer_id: None,
                work_order_id: Some(boiler.id),
                amount_cents: 20_000,
                transaction_date: None,
            },
        )
        .await
        .unwrap();
    app.state
        .services
        .ledger
        .record_payment(&admin, invoice.id, RecordPaymentInput { amount_cents: 5_000 })
        .await
        .unwrap();

    let deals = app.repo::<opportunity::Model>();
    deals
        .create(&admin, deal("Service contract", OpportunityStage::Proposal, 120_000))
        .await
        .unwrap();
    deals
        .create(&admin, deal("Chiller upgrade", OpportunityStage::Qualified, 30_000))
        .await
        .unwrap();
    deals
        .create(&admin, deal("Lost bid", OpportunityStage::Lost, 99_000))
        .await
        .unwrap();

    let summary = app.state.services.dashboard.summary(&john).await.unwrap();

    assert_eq!(summary.work_orders_by_status.get("Open"), Some(&1));
    assert_eq!(summary.work_orders_by_status.get("Completed"), Some(&1));
    assert_eq!(summary.work_orders_by_status.values().sum::<u64>(), 2);
    assert_eq!(summary.parts_pending_verification, 1);
    assert_eq!(summary.low_stock.len(), 1);
    assert_eq!(summary.low_stock[0].id, low.id);
    assert_eq!(summary.ledger.billed_cents, 20_000);
    assert_eq!(summary.ledger.outstanding_cents, 15_000);
    assert_eq!(summary.open_opportunities, 2);
    assert_eq!(summary.open_pipeline_cents, 150_000);
}

#[tokio::test]
async fn empty_tenant_has_an_empty_summary() {
    let app = TestApp::new().await;
    let viewer = app.user("Val", Role::Viewer);

    let summary = app.state.services.dashboard.summary(&viewer).await.unwrap();
    assert!(summary.work_orders_by_status.is_empty());
    assert!(summary.low_stock.is_empty());
    assert_eq!(summary.ledger.billed_cents, 0);
    assert_eq!(summary.open_pipeline_cents, 0);
}

#[tokio::test]
async fn other_tenants_see_none_of_it() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let outsider = app.stranger("Mallory", Role::Admin);
    app.work_order(&john, "Boiler service").await;
    app.spare_part(&john, "Fan belt", 0, 1).await;

    let theirs = app.state.services.dashboard.summary(&outsider).await.unwrap();
    assert!(theirs.work_orders_by_status.is_empty());
    assert!(theirs.low_stock.is_empty());
}
