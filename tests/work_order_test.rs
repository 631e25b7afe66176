mod common;

use assert_matches::assert_matches;
use common::TestApp;
use fieldops_api::{
    auth::Role,
    collection::ListQuery,
    errors::ServiceError,
    models::{
        allocated_part::{RequestVerificationInput, VerificationKind, VerifyPartInput, VersionedInput},
        service_call_log::{self, CallLogStatus, CreateCallLogInput},
        work_order::{UpdateWorkOrderInput, WorkOrderPriority, WorkOrderStatus},
    },
};

fn call(summary: &str) -> CreateCallLogInput {
    CreateCallLogInput {
        caller_name: "Mrs Patel".to_string(),
        caller_phone: Some("555-0101".to_string()),
        customer_id: None,
        asset_id: None,
        summary: summary.to_string(),
        details: Some("Unit is making a grinding noise".to_string()),
        priority: WorkOrderPriority::High,
    }
}

#[tokio::test]
async fn escalation_creates_one_work_order() {
    let app = TestApp::new().await;
    let tech = app.user("John", Role::Technician);
    let calls = app.repo::<service_call_log::Model>();

    let logged = calls.create(&tech, call("Fridge not cooling")).await.unwrap();
    let escalation = app
        .state
        .services
        .work_orders
        .escalate_call_log(&tech, logged.id)
        .await
        .unwrap();

    assert_eq!(escalation.call_log.status, CallLogStatus::Escalated);
    assert_eq!(escalation.call_log.work_order_id, Some(escalation.work_order.id));
    assert_eq!(escalation.work_order.title, "Fridge not cooling");
    assert_eq!(escalation.work_order.status, WorkOrderStatus::Open);
    assert_eq!(escalation.work_order.priority, WorkOrderPriority::High);
    assert!(escalation
        .work_order
        .description
        .as_deref()
        .unwrap_or_default()
        .contains("Mrs Patel"));

    let again = app
        .state
        .services
        .work_orders
        .escalate_call_log(&tech, logged.id)
        .await;
    assert_matches!(again, Err(ServiceError::InvalidOperation(_)));

    let page = app
        .state
        .services
        .work_orders
        .list_work_orders(&tech, &ListQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn update_and_search_work_orders() {
    let app = TestApp::new().await;
    let tech = app.user("John", Role::Technician);
    let work_orders = &app.state.services.work_orders;

    let boiler = app.work_order(&tech, "Boiler service").await;
    app.work_order(&tech, "Replace fan belt").await;

    let patch: UpdateWorkOrderInput = serde_json::from_value(serde_json::json!({
        "status": "In Progress",
        "notes": "Started diagnostics"
    }))
    .unwrap();
    let updated = work_orders
        .update_work_order(&tech, boiler.id, patch)
        .await
        .unwrap();
    assert_eq!(updated.status, WorkOrderStatus::InProgress);
    assert_eq!(updated.notes.as_deref(), Some("Started diagnostics"));

    let query = ListQuery {
        search: Some("BOILER".to_string()),
        ..ListQuery::default()
    };
    let page = work_orders.list_work_orders(&tech, &query).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, boiler.id);
}

#[tokio::test]
async fn service_report_lists_only_used_parts() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let jane = app.user("Jane", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app
        .work_order_with_notes(
            &john,
            "Pump overhaul",
            Some(r#"{"summary":"Pump rebuilt","actions_taken":["Replaced seal","Flushed lines"],"technician":"John","signed_off":"yes"}"#),
        )
        .await;
    let used = app.allocate(&john, wo.id, "Seal kit").await;
    app.allocate(&john, wo.id, "Spare impeller").await;

    parts
        .request_verification(
            &john,
            used.id,
            RequestVerificationInput {
                kind: VerificationKind::Handover,
                expected_version: None,
            },
        )
        .await
        .unwrap();
    parts
        .verify(
            &jane,
            used.id,
            VerifyPartInput {
                verifier_name: "Jane".to_string(),
                expected_version: None,
            },
        )
        .await
        .unwrap();
    parts
        .mark_used(&john, used.id, VersionedInput::default())
        .await
        .unwrap();

    let report = app
        .state
        .services
        .work_orders
        .service_report(&john, wo.id)
        .await
        .unwrap();

    assert_eq!(report.content.summary.as_deref(), Some("Pump rebuilt"));
    assert_eq!(
        report.content.actions_taken.as_deref(),
        Some("Replaced seal\nFlushed lines")
    );
    assert!(report.content.signed_off);
    assert_eq!(report.used_parts.len(), 1);
    assert_eq!(report.used_parts[0].name, "Seal kit");

    let text = report.render_text();
    assert!(text.contains("Pump overhaul"));
    assert!(text.contains("- 1 x Seal kit"));
    assert!(!text.contains("Spare impeller"));
}

#[tokio::test]
async fn summaries_need_a_configured_ai() {
    let app = TestApp::new().await;
    let tech = app.user("John", Role::Technician);
    let wo = app
        .work_order_with_notes(&tech, "Boiler service", Some("Cleaned burner"))
        .await;

    let result = app
        .state
        .services
        .work_orders
        .summarize_notes(&tech, wo.id)
        .await;
    assert_matches!(result, Err(ServiceError::ExternalServiceError(_)));
}

#[tokio::test]
async fn work_orders_are_tenant_scoped() {
    let app = TestApp::new().await;
    let tech = app.user("John", Role::Technician);
    let outsider = app.stranger("Mallory", Role::Admin);
    let wo = app.work_order(&tech, "Boiler service").await;

    assert_matches!(
        app.state
            .services
            .work_orders
            .get_work_order(&outsider, wo.id)
            .await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        app.state
            .services
            .work_orders
            .service_report(&outsider, wo.id)
            .await,
        Err(ServiceError::NotFound(_))
    );
}
