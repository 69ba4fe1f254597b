use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use vitach_auth::Role;
use vitach_core::{AggregateId, UserId};
use vitach_events::{EventEnvelope, InMemoryEventBus};
use vitach_infra::command_dispatcher::CommandDispatcher;
use vitach_infra::event_store::{EventStore, InMemoryEventStore};
use vitach_infra::projections::{ORDER_AGGREGATE_TYPE, OrdersProjection};
use vitach_infra::read_model::InMemoryReadStore;
use vitach_purchasing::{Actor, CreateOrder, Order, OrderCommand, OrderId, PriceOrder, Urgency};

type Dispatcher = CommandDispatcher<InMemoryEventStore, Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>>;

fn dispatcher() -> Dispatcher {
    CommandDispatcher::new(InMemoryEventStore::new(), Arc::new(InMemoryEventBus::new()))
}

fn create(order_id: OrderId) -> OrderCommand {
    OrderCommand::CreateOrder(CreateOrder {
        order_id,
        actor: Actor {
            user_id: UserId::new(),
            role: Role::Requester,
        },
        service: "IT".to_string(),
        article: black_box("Ordinateur portable".to_string()),
        description: String::new(),
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
        actor: Actor {
            user_id: UserId::new(),
            role: Role::Purchasing,
        },
        price: Some(black_box(100_000)),
        supplier: "LDLC".to_string(),
        comment: None,
        occurred_at: Utc::now(),
    })
}

fn run(dispatcher: &Dispatcher, order_id: OrderId, command: OrderCommand) {
    dispatcher
        .dispatch(order_id.0, ORDER_AGGREGATE_TYPE, command, |id| {
            Order::empty(OrderId::new(id))
        })
        .unwrap();
}

fn bench_command_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_command_latency");
    group.sample_size(500);

    group.bench_function("create_order", |b| {
        let dispatcher = dispatcher();
        b.iter(|| {
            let order_id = OrderId::new(AggregateId::new());
            run(&dispatcher, order_id, create(order_id));
        });
    });

    // Includes loading and folding the creation event.
    group.bench_function("create_then_price", |b| {
        let dispatcher = dispatcher();
        b.iter(|| {
            let order_id = OrderId::new(AggregateId::new());
            run(&dispatcher, order_id, create(order_id));
            run(&dispatcher, order_id, price(order_id));
        });
    });

    group.finish();
}

fn bench_projection_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("orders_projection_rebuild");

    for orders in [10usize, 100, 1000] {
        let dispatcher = dispatcher();
        for _ in 0..orders {
            let order_id = OrderId::new(AggregateId::new());
            run(&dispatcher, order_id, create(order_id));
            run(&dispatcher, order_id, price(order_id));
        }
        let envelopes: Vec<_> = dispatcher
            .store()
            .load_all(ORDER_AGGREGATE_TYPE)
            .unwrap()
            .iter()
            .map(|stored| stored.to_envelope())
            .collect();

        group.throughput(Throughput::Elements(envelopes.len() as u64));
        group.bench_with_input(BenchmarkId::new("rebuild", orders), &envelopes, |b, envelopes| {
            let projection = OrdersProjection::new(InMemoryReadStore::new());
            b.iter(|| black_box(projection.rebuild_from_scratch(envelopes.iter().cloned()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_command_latency, bench_projection_rebuild);
criterion_main!(benches);
