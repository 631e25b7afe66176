mod common;

use assert_matches::assert_matches;
use common::TestApp;
use fieldops_api::{
    auth::Role,
    errors::ServiceError,
    models::allocated_part::{
        ChangePartStatusInput, ChangeQuantityInput, PartStatus, RequestVerificationInput,
        VerificationKind, VerifyPartInput, VersionedInput,
    },
};

fn handover() -> RequestVerificationInput {
    RequestVerificationInput {
        kind: VerificationKind::Handover,
        expected_version: None,
    }
}

fn verify_as(name: &str) -> VerifyPartInput {
    VerifyPartInput {
        verifier_name: name.to_string(),
        expected_version: None,
    }
}

#[tokio::test]
async fn handover_verified_by_a_second_technician() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let jane = app.user("Jane", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Replace compressor").await;
    let part = app.allocate(&john, wo.id, "Compressor P").await;
    assert_eq!(part.status, PartStatus::Allocated);
    assert_eq!(part.quantity, 1);

    let pending = parts
        .request_verification(&john, part.id, handover())
        .await
        .unwrap();
    assert_eq!(pending.status, PartStatus::PendingHandover);
    assert_eq!(pending.requested_by, Some(john.user_id));
    assert_eq!(pending.requested_by_name.as_deref(), Some("John"));

    let waiting = parts.pending_verification(&jane).await.unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].id, part.id);

    let verified = parts.verify(&jane, part.id, verify_as("Jane")).await.unwrap();
    assert_eq!(verified.status, PartStatus::WithEngineer);
    assert_eq!(verified.verified_by.as_deref(), Some("Jane"));
    assert_eq!(verified.verified_by_id, Some(jane.user_id));
    assert!(parts.pending_verification(&jane).await.unwrap().is_empty());
}

#[tokio::test]
async fn requester_cannot_verify_their_own_handover() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Replace compressor").await;
    let part = app.allocate(&john, wo.id, "Compressor P").await;
    parts
        .request_verification(&john, part.id, handover())
        .await
        .unwrap();

    let result = parts.verify(&john, part.id, verify_as("Jane")).await;
    assert_matches!(result, Err(ServiceError::InvalidOperation(_)));

    let listed = parts.list_parts(&john, wo.id).await.unwrap();
    assert_eq!(listed[0].status, PartStatus::PendingHandover);
    assert!(listed[0].verified_by.is_none());
}

#[tokio::test]
async fn blank_verifier_name_is_rejected() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let jane = app.user("Jane", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Service boiler").await;
    let part = app.allocate(&john, wo.id, "Gasket").await;
    parts
        .request_verification(&john, part.id, handover())
        .await
        .unwrap();

    let result = parts.verify(&jane, part.id, verify_as("   ")).await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn return_flow_ends_in_returned() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let jane = app.user("Jane", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Swap valve").await;
    let part = app.allocate(&john, wo.id, "Valve").await;
    parts
        .request_verification(&john, part.id, handover())
        .await
        .unwrap();
    parts.verify(&jane, part.id, verify_as("Jane")).await.unwrap();

    let pending_return = parts
        .request_verification(
            &john,
            part.id,
            RequestVerificationInput {
                kind: VerificationKind::Return,
                expected_version: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(pending_return.status, PartStatus::PendingReturn);

    let returned = parts.verify(&jane, part.id, verify_as("Jane")).await.unwrap();
    assert_eq!(returned.status, PartStatus::Returned);

    // Terminal: nothing further is allowed
    let again = parts.mark_used(&john, part.id, VersionedInput::default()).await;
    assert_matches!(again, Err(ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn stale_expected_version_is_a_conflict() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Fit filter").await;
    let part = app.allocate(&john, wo.id, "Filter").await;
    let stale_version = part.version;

    parts
        .change_quantity(
            &john,
            part.id,
            ChangeQuantityInput {
                quantity: 2,
                expected_version: Some(stale_version),
            },
        )
        .await
        .unwrap();

    let result = parts
        .change_quantity(
            &john,
            part.id,
            ChangeQuantityInput {
                quantity: 3,
                expected_version: Some(stale_version),
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::ConcurrentModification(id)) if id == part.id);

    let listed = parts.list_parts(&john, wo.id).await.unwrap();
    assert_eq!(listed[0].quantity, 2);
}

#[tokio::test]
async fn change_status_twice_is_idempotent() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&admin, "Audit").await;
    let part = app.allocate(&admin, wo.id, "Fuse").await;
    let target = ChangePartStatusInput {
        status: PartStatus::WithEngineer,
        expected_version: None,
    };

    parts.change_status(&admin, part.id, target.clone()).await.unwrap();
    let first = parts.list_parts(&admin, wo.id).await.unwrap();
    parts.change_status(&admin, part.id, target).await.unwrap();
    let second = parts.list_parts(&admin, wo.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second[0].status, PartStatus::WithEngineer);
}

#[tokio::test]
async fn overwrite_to_allocated_clears_the_verification_trail() {
    let app = TestApp::new().await;
    let admin = app.user("Ada", Role::Admin);
    let john = app.user("John", Role::Technician);
    let jane = app.user("Jane", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Replace compressor").await;
    let part = app.allocate(&john, wo.id, "Compressor P").await;
    parts.request_verification(&john, part.id, handover()).await.unwrap();
    let verified = parts.verify(&jane, part.id, verify_as("Jane")).await.unwrap();
    assert_eq!(verified.verified_by_id, Some(jane.user_id));

    let reset = parts
        .change_status(
            &admin,
            part.id,
            ChangePartStatusInput {
                status: PartStatus::Allocated,
                expected_version: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(reset.status, PartStatus::Allocated);
    assert_eq!(reset.requested_by, None);
    assert_eq!(reset.requested_by_name, None);
    assert_eq!(reset.verified_by, None);
    assert_eq!(reset.verified_by_id, None);
}

#[tokio::test]
async fn only_admins_overwrite_status() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Audit").await;
    let part = app.allocate(&john, wo.id, "Fuse").await;
    let result = parts
        .change_status(
            &john,
            part.id,
            ChangePartStatusInput {
                status: PartStatus::Used,
                expected_version: None,
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn quantity_boundaries() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Fit filter").await;
    let part = app.allocate(&john, wo.id, "Filter").await;

    for bad in [0, -3] {
        let result = parts
            .change_quantity(
                &john,
                part.id,
                ChangeQuantityInput {
                    quantity: bad,
                    expected_version: None,
                },
            )
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    let updated = parts
        .change_quantity(
            &john,
            part.id,
            ChangeQuantityInput {
                quantity: 1,
                expected_version: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 1);
}

#[tokio::test]
async fn only_allocated_parts_can_be_removed() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Fit filter").await;
    let kept = app.allocate(&john, wo.id, "Filter").await;
    let dropped = app.allocate(&john, wo.id, "Spare belt").await;

    parts
        .request_verification(&john, kept.id, handover())
        .await
        .unwrap();
    let result = parts
        .remove_part(&john, kept.id, VersionedInput::default())
        .await;
    assert_matches!(result, Err(ServiceError::InvalidOperation(_)));

    parts
        .remove_part(&john, dropped.id, VersionedInput::default())
        .await
        .unwrap();
    let listed = parts.list_parts(&john, wo.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, kept.id);
}

#[tokio::test]
async fn parts_are_invisible_to_other_tenants() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let outsider = app.stranger("Mallory", Role::Admin);
    let parts = &app.state.services.parts;

    let wo = app.work_order(&john, "Fit filter").await;
    let part = app.allocate(&john, wo.id, "Filter").await;

    assert_matches!(
        parts.list_parts(&outsider, wo.id).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        parts
            .remove_part(&outsider, part.id, VersionedInput::default())
            .await,
        Err(ServiceError::NotFound(_))
    );
    assert_eq!(parts.list_parts(&john, wo.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn viewers_cannot_allocate() {
    let app = TestApp::new().await;
    let john = app.user("John", Role::Technician);
    let viewer = app.user("Val", Role::Viewer);

    let wo = app.work_order(&john, "Fit filter").await;
    let result = app
        .state
        .services
        .parts
        .add_parts(
            &viewer,
            wo.id,
            fieldops_api::models::allocated_part::AddPartsInput { parts: vec![] },
        )
        .await;
    assert_matches!(result, Err(ServiceError::Forbidden(_)));
}
