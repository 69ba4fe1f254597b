use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;
use tokio_stream::{
    StreamExt,
    wrappers::{BroadcastStream, IntervalStream},
};
use uuid::Uuid;

use vitach_ai::{OrderedQuantity, StockForecastJob, StockLevelSnapshot};
use vitach_alerts::{Alert, AlertSources, collect_alerts};
use vitach_auth::{Hs256Jwt, Identity, IdentityProvider, JwtClaims, Role, TokenValidationError};
use vitach_core::UserId;
use vitach_events::{EventEnvelope, InMemoryEventBus};
use vitach_hr::LeaveRequest;
use vitach_infra::{
    AppConfig, CommandDispatcher, DispatchError, DocumentStoreError, InMemoryDocumentStore,
    InMemoryIdentityProvider,
    event_store::{InMemoryEventStore, StoredEvent},
    projections::{ORDER_AGGREGATE_TYPE, OrdersProjection},
    read_model::InMemoryReadStore,
    workers::{ProjectionWorker, WorkerHandle},
};
use vitach_inventory::StockItem;
use vitach_maintenance::MaintenanceRecord;
use vitach_purchasing::{Order, OrderCommand, OrderId, OrderStatus, OrderView, SpendEntry, Workflow};

use crate::middleware::RevokedTokens;

type OrderBus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;
type OrdersDispatcher = CommandDispatcher<Arc<InMemoryEventStore>, OrderBus>;
type OrdersReadModel = OrdersProjection<InMemoryReadStore<OrderId, OrderView>>;

/// Full orders list, newest first, pushed after every change.
pub type OrdersSnapshot = Arc<Vec<OrderView>>;

/// Application services, built once at startup and shared by every handler.
pub struct AppServices {
    dispatcher: OrdersDispatcher,
    orders: Arc<OrdersReadModel>,
    documents: InMemoryDocumentStore,
    identity: Arc<InMemoryIdentityProvider>,
    jwt: Arc<Hs256Jwt>,
    revoked: Arc<RevokedTokens>,
    token_ttl: Duration,
    alert_refresh: Duration,
    orders_tx: broadcast::Sender<OrdersSnapshot>,
    worker: Mutex<Option<WorkerHandle>>,
}

pub fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = Arc::new(InMemoryEventStore::new());
    let bus: OrderBus = Arc::new(InMemoryEventBus::new());
    let orders: Arc<OrdersReadModel> = Arc::new(OrdersProjection::new(InMemoryReadStore::new()));

    // Live snapshot channel (lossy; slow subscribers skip to the next snapshot).
    let (orders_tx, _orders_rx) = broadcast::channel::<OrdersSnapshot>(64);

    // Background subscriber: bus -> orders projection -> snapshot feed.
    let worker = {
        let orders = Arc::clone(&orders);
        let orders_tx = orders_tx.clone();
        ProjectionWorker::spawn("orders-projection", &bus, move |env: EventEnvelope<JsonValue>| {
            if orders.apply_envelope(&env)?.is_some() {
                let _ = orders_tx.send(Arc::new(orders.list()));
            }
            Ok::<_, vitach_infra::projections::OrderProjectionError>(())
        })?
    };

    let services = AppServices {
        dispatcher: CommandDispatcher::new(store, bus),
        orders,
        documents: InMemoryDocumentStore::new(),
        identity: Arc::new(InMemoryIdentityProvider::new()),
        jwt: Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes())),
        revoked: Arc::new(RevokedTokens::new()),
        token_ttl: config.token_ttl,
        alert_refresh: config.alert_refresh,
        orders_tx,
        worker: Mutex::new(Some(worker)),
    };
    services.seed(config)?;
    Ok(services)
}

impl AppServices {
    fn seed(&self, config: &AppConfig) -> anyhow::Result<()> {
        let seeded_by = match &config.seed_director {
            Some(seed) => {
                let identity = self
                    .identity
                    .register(&seed.email, &seed.password, "Direction générale", Role::Director)
                    .map_err(|e| anyhow::anyhow!("seeding DG account failed: {}", e.code()))?;
                tracing::info!(user_id = %identity.user_id, "seeded DG account");
                identity.user_id
            }
            None => UserId::new(),
        };

        let now = Utc::now();
        for workflow in Workflow::predefined() {
            self.documents.create(workflow, seeded_by, now)?;
        }
        Ok(())
    }

    pub fn documents(&self) -> &InMemoryDocumentStore {
        &self.documents
    }

    pub fn identity(&self) -> &InMemoryIdentityProvider {
        &self.identity
    }

    pub fn jwt(&self) -> Arc<Hs256Jwt> {
        Arc::clone(&self.jwt)
    }

    pub fn revoked(&self) -> Arc<RevokedTokens> {
        Arc::clone(&self.revoked)
    }

    /// Run an order command and fold the committed events into the read model
    /// before returning, so the caller reads its own write.
    pub fn dispatch_order(
        &self,
        order_id: OrderId,
        command: OrderCommand,
    ) -> Result<Vec<StoredEvent>, DispatchError> {
        let committed = self.dispatcher.dispatch::<Order>(
            order_id.0,
            ORDER_AGGREGATE_TYPE,
            command,
            |aggregate_id| Order::empty(OrderId::new(aggregate_id)),
        )?;

        for stored in &committed {
            match self.orders.apply_envelope(&stored.to_envelope()) {
                Ok(Some(_)) => {
                    let _ = self.orders_tx.send(Arc::new(self.orders.list()));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(order_id = %order_id, error = %e, "orders projection apply failed"),
            }
        }
        Ok(committed)
    }

    pub fn orders_list(&self) -> Vec<OrderView> {
        self.orders.list()
    }

    pub fn orders_get(&self, order_id: &OrderId) -> Option<OrderView> {
        self.orders.get(order_id)
    }

    /// Spend against budgets: every approved, priced order.
    pub fn spend_entries(&self) -> Vec<SpendEntry> {
        self.orders
            .list()
            .into_iter()
            .filter(|o| o.status == OrderStatus::Approved)
            .filter_map(|o| {
                o.price.map(|amount| SpendEntry {
                    service: o.service,
                    amount,
                    at: o.created_at,
                })
            })
            .collect()
    }

    pub fn issue_token(&self, identity: &Identity) -> Result<(String, DateTime<Utc>), TokenValidationError> {
        let issued_at = Utc::now();
        let ttl = chrono::Duration::from_std(self.token_ttl)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        let claims = JwtClaims {
            sub: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            jti: Uuid::now_v7(),
            issued_at,
            expires_at: issued_at + ttl,
        };
        let token = self.jwt.issue(&claims)?;
        Ok((token, claims.expires_at))
    }

    pub fn alerts_for(&self, role: Role, now: DateTime<Utc>) -> Result<Vec<Alert>, DocumentStoreError> {
        let orders = self.orders.list();
        let stock = self.documents.list::<StockItem>()?;
        let maintenance = self.documents.list::<MaintenanceRecord>()?;
        let leave_requests = self.documents.list::<LeaveRequest>()?;

        Ok(collect_alerts(
            role,
            AlertSources {
                orders: &orders,
                stock: &stock,
                maintenance: &maintenance,
                leave_requests: &leave_requests,
            },
            now,
        ))
    }

    /// Forecast job over the current stock levels and every order raised so far.
    pub fn stock_forecast_job(&self, as_of: DateTime<Utc>) -> Result<StockForecastJob, DocumentStoreError> {
        let items = self
            .documents
            .list::<StockItem>()?
            .into_iter()
            .map(|s| StockLevelSnapshot {
                item_id: s.id.to_string(),
                name: s.record.name,
                quantity: s.record.quantity,
                reorder_threshold: s.record.reorder_threshold,
            })
            .collect();
        let orders = self
            .orders
            .list()
            .into_iter()
            .map(|o| OrderedQuantity {
                article: o.article,
                quantity: o.quantity,
                ordered_at: o.created_at,
            })
            .collect();

        Ok(StockForecastJob::new(items, orders, as_of))
    }

    /// Stop the projection worker. Safe to call more than once.
    pub fn shutdown(&self) {
        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            handle.shutdown();
        }
    }
}

/// Current orders, then a fresh snapshot after every change.
pub fn orders_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.orders_tx.subscribe();
    let initial: OrdersSnapshot = Arc::new(services.orders.list());

    let stream = tokio_stream::once(initial)
        .chain(BroadcastStream::new(rx).filter_map(|msg| msg.ok()))
        .filter_map(|snapshot| {
            let data = serde_json::to_string(snapshot.as_ref()).ok()?;
            Some(Ok(SseEvent::default().event("orders").data(data)))
        });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Alerts for `role`, recomputed on the refresh timer and on every orders change.
pub fn alerts_sse_stream(
    services: Arc<AppServices>,
    role: Role,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let changes = BroadcastStream::new(services.orders_tx.subscribe()).map(|_| ());
    let ticks = IntervalStream::new(tokio::time::interval(services.alert_refresh)).map(|_| ());

    let stream = ticks.merge(changes).filter_map(move |()| {
        let alerts = match services.alerts_for(role, Utc::now()) {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::warn!(error = %e, "alert aggregation failed");
                return None;
            }
        };
        let data = serde_json::to_string(&alerts).ok()?;
        Some(Ok(SseEvent::default().event("alerts").data(data)))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
