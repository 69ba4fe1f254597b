//! Order pipeline end to end: command → event store → bus → projection.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use chrono::Utc;
    use serde_json::Value as JsonValue;

    use vitach_auth::Role;
    use vitach_core::{Aggregate, AggregateId, ExpectedVersion, UserId};
    use vitach_events::{EventEnvelope, InMemoryEventBus};
    use vitach_purchasing::{
        Actor, ApproveOrder, CreateOrder, Order, OrderCommand, OrderEvent, OrderId, OrderStatus, OrderView, PriceOrder,
        RejectOrder, Urgency,
    };

    use crate::command_dispatcher::{CommandDispatcher, DispatchError};
    use crate::event_store::{EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent};
    use crate::projections::{ORDER_AGGREGATE_TYPE, OrdersProjection};
    use crate::read_model::InMemoryReadStore;
    use crate::workers::ProjectionWorker;

    type Bus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;
    type Projection = Arc<OrdersProjection<InMemoryReadStore<OrderId, OrderView>>>;

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: UserId::new(),
            role,
        }
    }

    fn create(order_id: OrderId) -> OrderCommand {
        OrderCommand::CreateOrder(CreateOrder {
            order_id,
            actor: actor(Role::Requester),
            service: "IT".to_string(),
            article: "Ordinateur portable".to_string(),
            description: "Poste développeur".to_string(),
            quantity: 5,
            unit: "unité".to_string(),
            urgency: Urgency::Normal,
            comment: None,
            group_id: None,
            occurred_at: Utc::now(),
        })
    }

    fn price(order_id: OrderId) -> OrderCommand {
        OrderCommand::PriceOrder(PriceOrder {
            order_id,
            actor: actor(Role::Purchasing),
            price: Some(100_000),
            supplier: "LDLC".to_string(),
            comment: None,
            occurred_at: Utc::now(),
        })
    }

    fn approve(order_id: OrderId, role: Role) -> OrderCommand {
        OrderCommand::ApproveOrder(ApproveOrder {
            order_id,
            actor: actor(role),
            signature: "data:image/png;base64,AAAA".to_string(),
            comment: Some("OK".to_string()),
            occurred_at: Utc::now(),
        })
    }

    fn dispatch<S: EventStore>(
        dispatcher: &CommandDispatcher<S, Bus>,
        order_id: OrderId,
        command: OrderCommand,
    ) -> Result<Vec<StoredEvent>, DispatchError> {
        dispatcher.dispatch(order_id.0, ORDER_AGGREGATE_TYPE, command, |id| {
            Order::empty(OrderId::new(id))
        })
    }

    fn setup() -> (CommandDispatcher<InMemoryEventStore, Bus>, Projection, crate::workers::WorkerHandle) {
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let projection: Projection = Arc::new(OrdersProjection::new(InMemoryReadStore::new()));

        let sink = Arc::clone(&projection);
        let worker = ProjectionWorker::spawn("orders-projection", &bus, move |env: EventEnvelope<JsonValue>| {
            sink.apply_envelope(&env).map(|_| ())
        })
        .unwrap();

        (CommandDispatcher::new(InMemoryEventStore::new(), bus), projection, worker)
    }

    fn eventually(mut check: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if check() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn lifecycle_reaches_the_projection() {
        let (dispatcher, projection, worker) = setup();
        let id = OrderId::new(AggregateId::new());

        dispatch(&dispatcher, id, create(id)).unwrap();
        dispatch(&dispatcher, id, price(id)).unwrap();
        let committed = dispatch(&dispatcher, id, approve(id, Role::Director)).unwrap();
        assert_eq!(committed[0].sequence_number, 3);

        assert!(eventually(|| projection
            .get(&id)
            .is_some_and(|v| v.status == OrderStatus::Approved)));

        let view = projection.get(&id).unwrap();
        assert_eq!(view.price, Some(100_000));
        assert_eq!(view.supplier.as_deref(), Some("LDLC"));
        assert!(view.signature_dg.is_some());
        assert_eq!(view.version, 3);
        worker.shutdown();
    }

    #[test]
    fn refused_commands_append_nothing() {
        let (dispatcher, _projection, worker) = setup();
        let id = OrderId::new(AggregateId::new());
        dispatch(&dispatcher, id, create(id)).unwrap();
        dispatch(&dispatcher, id, price(id)).unwrap();

        let err = dispatch(&dispatcher, id, approve(id, Role::Purchasing)).unwrap_err();
        assert!(matches!(err, DispatchError::Unauthorized));

        let missing = OrderId::new(AggregateId::new());
        assert!(matches!(
            dispatch(&dispatcher, missing, price(missing)).unwrap_err(),
            DispatchError::NotFound
        ));

        dispatch(&dispatcher, id, approve(id, Role::Director)).unwrap();
        let reject = OrderCommand::RejectOrder(RejectOrder {
            order_id: id,
            actor: actor(Role::Director),
            signature: "sig".to_string(),
            comment: None,
            occurred_at: Utc::now(),
        });
        assert!(matches!(
            dispatch(&dispatcher, id, reject).unwrap_err(),
            DispatchError::InvariantViolation(_)
        ));

        assert_eq!(dispatcher.store().load_stream(id.0).unwrap().len(), 3);
        let rehydrated = dispatcher
            .load(id.0, ORDER_AGGREGATE_TYPE, |a| Order::empty(OrderId::new(a)))
            .unwrap()
            .unwrap();
        assert_eq!(rehydrated.status(), OrderStatus::Approved);
        worker.shutdown();
    }

    /// Store that lets a second writer append between the dispatcher's load
    /// and its append, once.
    struct InterleavingStore {
        inner: InMemoryEventStore,
        interloper: Mutex<Option<Vec<UncommittedEvent>>>,
    }

    impl EventStore for InterleavingStore {
        fn append(
            &self,
            events: Vec<UncommittedEvent>,
            expected_version: ExpectedVersion,
        ) -> Result<Vec<StoredEvent>, EventStoreError> {
            self.inner.append(events, expected_version)
        }

        fn load_stream(&self, aggregate_id: AggregateId) -> Result<Vec<StoredEvent>, EventStoreError> {
            let history = self.inner.load_stream(aggregate_id)?;
            if let Some(events) = self.interloper.lock().unwrap().take() {
                self.inner.append(events, ExpectedVersion::Any)?;
            }
            Ok(history)
        }

        fn load_all(&self, aggregate_type: &str) -> Result<Vec<StoredEvent>, EventStoreError> {
            self.inner.load_all(aggregate_type)
        }
    }

    #[test]
    fn concurrent_decision_loses_with_a_conflict() {
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let plain = CommandDispatcher::new(InMemoryEventStore::new(), bus.clone());
        let id = OrderId::new(AggregateId::new());
        dispatch(&plain, id, create(id)).unwrap();
        dispatch(&plain, id, price(id)).unwrap();

        // Decide a rejection out of band; it will land after the approval loads.
        let competing = {
            let mut order = Order::empty(id);
            for stored in plain.store().load_stream(id.0).unwrap() {
                let ev: OrderEvent = serde_json::from_value(stored.payload).unwrap();
                order.apply(&ev);
            }
            let reject = OrderCommand::RejectOrder(RejectOrder {
                order_id: id,
                actor: actor(Role::Director),
                signature: "autre".to_string(),
                comment: None,
                occurred_at: Utc::now(),
            });
            order
                .handle(&reject)
                .unwrap()
                .iter()
                .map(|ev| UncommittedEvent::from_typed(id.0, ORDER_AGGREGATE_TYPE, uuid::Uuid::now_v7(), ev).unwrap())
                .collect::<Vec<_>>()
        };

        let racing = CommandDispatcher::new(
            InterleavingStore {
                inner: InMemoryEventStore::new(),
                interloper: Mutex::new(Some(competing)),
            },
            bus,
        );
        for stored in plain.store().load_stream(id.0).unwrap() {
            racing
                .store()
                .inner
                .append(
                    vec![UncommittedEvent {
                        event_id: stored.event_id,
                        aggregate_id: stored.aggregate_id,
                        aggregate_type: stored.aggregate_type,
                        event_type: stored.event_type,
                        event_version: stored.event_version,
                        occurred_at: stored.occurred_at,
                        payload: stored.payload,
                    }],
                    ExpectedVersion::Exact(stored.sequence_number - 1),
                )
                .unwrap();
        }

        let err = dispatch(&racing, id, approve(id, Role::Director)).unwrap_err();
        assert!(matches!(err, DispatchError::Concurrency(_)));

        let final_stream = racing.store().inner.load_stream(id.0).unwrap();
        assert_eq!(final_stream.len(), 3);
        assert_eq!(final_stream[2].event_type, "purchasing.order.rejected");
    }
}
