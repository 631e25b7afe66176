#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use fieldops_api::{
    ai::{AiCapability, DisabledAi},
    auth::{Role, TenantContext},
    config::AppConfig,
    db,
    events,
    models::{
        allocated_part::{self, AddPartsInput, NewPartLine},
        customer::{self, CreateCustomerInput},
        location::{self, CreateLocationInput},
        spare_part::{self, CreateSparePartInput},
        work_order::{self, CreateWorkOrderInput, WorkOrderPriority},
        TenantRecord,
    },
    services::collections::CollectionRepository,
    storage::LocalBlobStore,
    AppState,
};
use sea_orm::IntoActiveModel;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_SECRET: &str = "fieldops-integration-secret-with-plenty-of-entropy-42";

/// Application state backed by a private in-memory SQLite database and a
/// temporary blob directory.
pub struct TestApp {
    pub state: AppState,
    pub blobs: Arc<LocalBlobStore>,
    pub company_id: Uuid,
    _blob_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_ai(Arc::new(DisabledAi)).await
    }

    pub async fn with_ai(ai: Arc<dyn AiCapability>) -> Self {
        let pool = db::connect_in_memory()
            .await
            .expect("in-memory database should start");

        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let (event_sender, event_rx) = events::channel(cfg.event_channel_capacity);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let blob_dir = TempDir::new().expect("temp dir");
        let blobs = Arc::new(LocalBlobStore::new(
            blob_dir.path(),
            "http://files.test",
        ));

        let state = AppState::new(
            Arc::new(pool),
            Arc::new(cfg),
            Arc::new(event_sender),
            ai,
            blobs.clone(),
        );

        Self {
            state,
            blobs,
            company_id: Uuid::new_v4(),
            _blob_dir: blob_dir,
            _event_task: event_task,
        }
    }

    /// A fresh user in the test tenant.
    pub fn user(&self, name: &str, role: Role) -> TenantContext {
        TenantContext::new(self.company_id, Uuid::new_v4(), name, role)
    }

    /// A fresh user in some other tenant.
    pub fn stranger(&self, name: &str, role: Role) -> TenantContext {
        TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), name, role)
    }

    pub fn repo<M>(&self) -> CollectionRepository<M>
    where
        M: TenantRecord + IntoActiveModel<M::ActiveModel>,
    {
        CollectionRepository::new(
            self.state.db.clone(),
            self.state.event_sender.clone(),
            self.state.view,
        )
    }

    pub fn router(&self) -> Router {
        fieldops_api::build_router(self.state.clone(), fieldops_api::logging::discard_logger())
    }

    pub fn token_for(&self, ctx: &TenantContext) -> String {
        self.state.auth.issue_token(ctx).expect("token")
    }

    pub async fn work_order(&self, ctx: &TenantContext, title: &str) -> work_order::Model {
        self.work_order_with_notes(ctx, title, None).await
    }

    pub async fn work_order_with_notes(
        &self,
        ctx: &TenantContext,
        title: &str,
        notes: Option<&str>,
    ) -> work_order::Model {
        self.state
            .services
            .work_orders
            .create_work_order(
                ctx,
                CreateWorkOrderInput {
                    title: title.to_string(),
                    description: None,
                    customer_id: None,
                    asset_id: None,
                    location_id: None,
                    priority: WorkOrderPriority::default(),
                    assigned_to: None,
                    notes: notes.map(str::to_string),
                },
            )
            .await
            .expect("work order should be created")
    }

    /// Allocates one part named `name` to the work order.
    pub async fn allocate(
        &self,
        ctx: &TenantContext,
        work_order_id: Uuid,
        name: &str,
    ) -> allocated_part::Model {
        let mut parts = self
            .state
            .services
            .parts
            .add_parts(
                ctx,
                work_order_id,
                AddPartsInput {
                    parts: vec![NewPartLine {
                        spare_part_id: None,
                        name: name.to_string(),
                        part_number: None,
                    }],
                },
            )
            .await
            .expect("part should be allocated");
        parts.remove(0)
    }

    pub async fn spare_part(
        &self,
        ctx: &TenantContext,
        name: &str,
        quantity: i32,
        min_quantity: i32,
    ) -> spare_part::Model {
        self.repo::<spare_part::Model>()
            .create(
                ctx,
                CreateSparePartInput {
                    name: name.to_string(),
                    part_number: None,
                    description: None,
                    quantity,
                    min_quantity,
                    location: None,
                    unit_cost_cents: None,
                },
            )
            .await
            .expect("spare part should be created")
    }

    pub async fn location(&self, ctx: &TenantContext, name: &str) -> location::Model {
        self.repo::<location::Model>()
            .create(
                ctx,
                CreateLocationInput {
                    name: name.to_string(),
                    address: None,
                    customer_id: None,
                    contact_name: None,
                    contact_phone: None,
                },
            )
            .await
            .expect("location should be created")
    }

    pub async fn customer(&self, ctx: &TenantContext, name: &str) -> customer::Model {
        let input: CreateCustomerInput = serde_json::from_value(serde_json::json!({
            "name": name,
        }))
        .expect("customer input");
        self.repo::<customer::Model>()
            .create(ctx, input)
            .await
            .expect("customer should be created")
    }
}
