//! Benchmarks for gateway ingest with observer fan-out
//!
//! Target: fan-out cost grows linearly with observer count

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lossboard::core::{PointStore, RawPoint};
use lossboard::infrastructure::metrics::MetricsCollector;
use lossboard::ws::{ChannelObserver, SubscriptionBroker};
use lossboard::IngestionGateway;
use std::sync::Arc;

fn bench_ingest_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_fanout");

    for observers in [0usize, 1, 16, 128] {
        let store = Arc::new(PointStore::new());
        let metrics = Arc::new(MetricsCollector::new());
        let broker = Arc::new(SubscriptionBroker::new(store.clone(), metrics.clone()));
        let gateway = IngestionGateway::new(store, broker.clone(), metrics);

        // Receivers are drained every iteration so queues never fill
        let mut receivers = Vec::with_capacity(observers);
        for _ in 0..observers {
            let (observer, rx) = ChannelObserver::channel(1024);
            broker.register(Arc::new(observer));
            receivers.push(rx);
        }

        group.bench_with_input(BenchmarkId::from_parameter(observers), &observers, |b, _| {
            b.iter(|| {
                let raw = RawPoint::new("modelA", "trainLoss", 2.3, 0);
                black_box(gateway.ingest(black_box(raw)).ok());
                for rx in &mut receivers {
                    while rx.try_recv().is_ok() {}
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ingest_fanout);
criterion_main!(benches);
