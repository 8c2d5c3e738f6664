//! Driver stepping benchmarks
//!
//! Measures the per-frame cost of springs and tweens on the virtual-time loop.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use tempo_core::host::{EventLoop, Host};
use tempo_core::motion::{Spring, SpringConfig, Tween, TweenOptions};
use tempo_core::reactive::Scope;

const FRAME: Duration = Duration::from_millis(16);

fn bench_spring_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring_settle");

    for springs in [1usize, 64, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(springs), &springs, |b, &n| {
            b.iter(|| {
                let event_loop = EventLoop::new();
                let scope = Scope::new(Host::new(event_loop.clone()));
                let drivers: Vec<_> = (0..n)
                    .map(|_| Spring::new(&scope, 0.0_f64, SpringConfig::default()).unwrap())
                    .collect();
                for (i, spring) in drivers.iter().enumerate() {
                    spring.target().set(i as f64 + 1.0);
                }
                black_box(event_loop.run_until_idle(Duration::from_secs(30)))
            });
        });
    }

    group.finish();
}

fn bench_vector_spring_frame(c: &mut Criterion) {
    let event_loop = EventLoop::new();
    let scope = Scope::new(Host::new(event_loop.clone()));
    let spring = Spring::new(&scope, [0.0_f64; 4], SpringConfig::default()).unwrap();

    c.bench_function("vector_spring_frame", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let target = if flip { 1000.0 } else { -1000.0 };
            spring.target().set([target; 4]);
            black_box(event_loop.advance(FRAME))
        });
    });
}

fn bench_tween_frames(c: &mut Criterion) {
    c.bench_function("tween_full_leg", |b| {
        b.iter(|| {
            let event_loop = EventLoop::new();
            let scope = Scope::new(Host::new(event_loop.clone()));
            let options = TweenOptions::new(Duration::from_millis(500)).easing(|t| t * t);
            let tween = Tween::new(&scope, 0.0_f64, options).unwrap();
            tween.target().set(1.0);
            event_loop.run_until_idle(Duration::from_secs(1));
            black_box(tween.current().get())
        });
    });
}

criterion_group!(
    benches,
    bench_spring_settle,
    bench_vector_spring_frame,
    bench_tween_frames
);
criterion_main!(benches);
