use dashmap::DashMap;
use shared::{SyncPayload, WorkflowEvent, WorkflowEventKind};
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::broadcast;

use crate::auth::JwtService;
use crate::core::Config;
use crate::core::event_router::EventRouter;
use crate::db::DbService;
use crate::geo::Geocoder;
use crate::notify::{self, ConsoleNotifier, NotifyWorker};
use crate::orders::OrderService;
use crate::reservations::ReservationEngine;

/// Session broadcast capacity
const SESSION_CHANNEL_CAPACITY: usize = 1024;
const NOTIFY_BUFFER: usize = 256;
const SYNC_BUFFER: usize = 64;

/// Per-resource monotonic version counter.
///
/// Lock-free via DashMap; sessions use the version to discard stale
/// refreshes that arrive out of order.
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the resource's version and return the new value
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// Server state - shared handles to every service.
///
/// Cloning is shallow; each field is either cheap to clone or behind
/// an Arc.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub engine: Arc<ReservationEngine>,
    pub orders: Arc<OrderService>,
    pub geocoder: Arc<Geocoder>,
    /// Sync payloads pushed to connected presentation sessions
    sessions: broadcast::Sender<SyncPayload>,
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// Initialize the server state against the on-disk database.
    ///
    /// # Panics
    ///
    /// Work directory or database initialization failure panics.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("dinedash.db");
        let db_service = DbService::new(&db_path)
            .await
            .expect("Failed to initialize database");

        Self::with_db(config.clone(), db_service.db)
    }

    /// Build state over an existing database handle (used by tests
    /// with an in-memory engine).
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let engine = Arc::new(ReservationEngine::new(
            db.clone(),
            config.reservation_window(),
            config.timezone,
        ));
        let orders = Arc::new(OrderService::new(db.clone(), engine.event_sender()));
        let geocoder = Arc::new(Geocoder::new(config.nominatim_url.clone()));
        let (sessions, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);

        Self {
            config,
            db,
            jwt_service,
            engine,
            orders,
            geocoder,
            sessions,
            resource_versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// Start the event router, the notify worker and the session sync
    /// forwarder. Call once, before serving requests.
    pub fn start_background_tasks(&self) {
        let (router, channels) = EventRouter::new(NOTIFY_BUFFER, SYNC_BUFFER);
        let source = self.engine.subscribe();
        tokio::spawn(async move {
            router.run(source).await;
        });

        let notifier = match notify::build_notifier(&self.config.email) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "SMTP setup failed, falling back to console notifier");
                Arc::new(ConsoleNotifier)
            }
        };
        let worker = NotifyWorker::new(self.db.clone(), notifier, self.config.timezone);
        tokio::spawn(async move {
            worker.run(channels.notify_rx).await;
        });

        let state = self.clone();
        let mut sync_rx = channels.sync_rx;
        tokio::spawn(async move {
            while let Some(event) = sync_rx.recv().await {
                state.forward_sync(&event);
            }
            tracing::info!("Sync forwarder stopping, channel closed");
        });
    }

    /// Subscribe a presentation session to live updates
    pub fn subscribe_sessions(&self) -> broadcast::Receiver<SyncPayload> {
        self.sessions.subscribe()
    }

    fn forward_sync(&self, event: &WorkflowEvent) {
        let resource = event.resource();
        let payload = SyncPayload {
            resource: resource.to_string(),
            version: self.resource_versions.increment(resource),
            id: event_record_id(&event.kind).to_string(),
            data: serde_json::to_value(event).ok(),
        };
        // send fails only when no session is connected
        let _ = self.sessions.send(payload);
    }
}

fn event_record_id(kind: &WorkflowEventKind) -> &str {
    match kind {
        WorkflowEventKind::ReservationRequested { reservation_id, .. }
        | WorkflowEventKind::ReservationConfirmed { reservation_id, .. }
        | WorkflowEventKind::ReservationCancelled { reservation_id, .. } => reservation_id,
        WorkflowEventKind::OrderStatusChanged { order_id, .. } => order_id,
    }
}
