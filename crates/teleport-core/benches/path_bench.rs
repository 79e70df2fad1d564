//! Criterion benchmarks for the Teleport chain engine.
//!
//! Two benchmark groups:
//! - `tick`: a full `step()` including sequencing and path recomputation
//! - `queries`: the hot read paths a renderer hits every frame

use criterion::{Criterion, criterion_group, criterion_main};
use teleport_core::engine::StationEngine;
use teleport_core::tap::TapPoint;
use teleport_core::test_utils::*;

fn bench_tick(c: &mut Criterion) {
    let mut engine = settled_engine(transmitting_station(5.0));
    c.bench_function("tick", |b| {
        b.iter(|| {
            engine.step();
            std::hint::black_box(engine.state_hash());
        })
    });
}

fn bench_queries(c: &mut Criterion) {
    let engine = settled_engine(transmitting_station(5.0));
    c.bench_function("total_gain_all_taps", |b| {
        b.iter(|| {
            for tap in TapPoint::ALL {
                std::hint::black_box(engine.total_gain_to(tap));
            }
        })
    });
    c.bench_function("noise_floor_rx_if", |b| {
        b.iter(|| std::hint::black_box(engine.noise_floor_at(TapPoint::RxIf, 36.0e6)))
    });
}

criterion_group!(benches, bench_tick, bench_queries);
criterion_main!(benches);
