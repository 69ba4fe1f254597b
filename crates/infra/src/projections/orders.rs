use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;
use thiserror::Error;

use vitach_core::AggregateId;
use vitach_events::EventEnvelope;
use vitach_purchasing::{OrderEvent, OrderId, OrderView};

use crate::read_model::ReadStore;

/// Stream type under which order events are stored and published.
pub const ORDER_AGGREGATE_TYPE: &str = "purchasing.order";

#[derive(Debug, Error)]
pub enum OrderProjectionError {
    #[error("failed to deserialize order event: {0}")]
    Deserialize(String),
    #[error("event order_id {found} does not match stream {expected}")]
    StreamMismatch { expected: AggregateId, found: OrderId },
    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },
    #[error("projection cursor lock poisoned")]
    Poisoned,
}

/// Order list read model.
///
/// Every order event is applied at most once: envelopes at or below the
/// stream cursor are skipped, gaps are rejected. The same envelope may
/// therefore reach it from the request path and from the bus worker.
#[derive(Debug)]
pub struct OrdersProjection<S>
where
    S: ReadStore<OrderId, OrderView>,
{
    store: S,
    cursors: RwLock<HashMap<AggregateId, u64>>,
}

impl<S> OrdersProjection<S>
where
    S: ReadStore<OrderId, OrderView>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, order_id: &OrderId) -> Option<OrderView> {
        self.store.get(order_id)
    }

    /// All orders, newest first.
    pub fn list(&self) -> Vec<OrderView> {
        let mut orders = self.store.list();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.as_uuid().cmp(a.id.0.as_uuid()))
        });
        orders
    }

    /// Apply one envelope. Returns the updated view when the envelope was new,
    /// `None` when it was skipped (other aggregate type or already applied).
    ///
    /// The cursor lock is held from the sequence check to the upsert, so a
    /// stale apply racing a newer one can neither overwrite the view nor move
    /// the cursor back.
    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<Option<OrderView>, OrderProjectionError> {
        if envelope.aggregate_type() != ORDER_AGGREGATE_TYPE {
            return Ok(None);
        }

        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        let mut cursors = self.cursors.write().map_err(|_| OrderProjectionError::Poisoned)?;
        let last = cursors.get(&aggregate_id).copied().unwrap_or(0);

        if seq == 0 {
            return Err(OrderProjectionError::NonMonotonicSequence { last, found: seq });
        }
        if seq <= last {
            return Ok(None);
        }
        if seq != last + 1 {
            return Err(OrderProjectionError::NonMonotonicSequence { last, found: seq });
        }

        let ev: OrderEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| OrderProjectionError::Deserialize(e.to_string()))?;

        let order_id = ev.order_id();
        if order_id.0 != aggregate_id {
            return Err(OrderProjectionError::StreamMismatch {
                expected: aggregate_id,
                found: order_id,
            });
        }

        let view = match &ev {
            OrderEvent::OrderCreated(e) => OrderView::created(e),
            _ => {
                // seq > 1 here, so the creation event has been applied.
                let Some(mut view) = self.store.get(&order_id) else {
                    return Err(OrderProjectionError::NonMonotonicSequence { last, found: seq });
                };
                view.apply(&ev);
                view
            }
        };

        self.store.upsert(order_id, view.clone());
        cursors.insert(aggregate_id, seq);
        Ok(Some(view))
    }

    /// Clear the model and replay `envelopes` stream by stream.
    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<usize, OrderProjectionError> {
        {
            let mut cursors = self.cursors.write().map_err(|_| OrderProjectionError::Poisoned)?;
            cursors.clear();
            self.store.clear();
        }

        let mut envs: Vec<_> = envelopes.into_iter().collect();
        envs.sort_by_key(|e| (*e.aggregate_id().as_uuid().as_bytes(), e.sequence_number()));

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(envs.len())
    }
}
