use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quadmerge::core::{gravity, matcher};
use quadmerge::core::{BoardConfig, NullPresenter, Session};
use quadmerge::types::TICK_MS;

fn populated(seed: u32) -> Session {
    let config = BoardConfig {
        seed,
        ..BoardConfig::with_size(12, 12)
    };
    let mut session = Session::new(config).expect("valid config");
    session.populate(&mut NullPresenter);
    session
}

fn bench_tick(c: &mut Criterion) {
    let mut session = populated(12345);

    c.bench_function("session_tick_16ms", |b| {
        b.iter(|| {
            session.tick(black_box(TICK_MS), &mut NullPresenter);
        })
    });
}

fn bench_rebuild_cache(c: &mut Criterion) {
    let session = populated(12345);

    c.bench_function("rebuild_cache_12x12", |b| {
        b.iter(|| black_box(session.board().rebuilt_cache()))
    });
}

fn bench_find_quad_match(c: &mut Criterion) {
    let session = populated(777);

    c.bench_function("find_quad_match", |b| {
        b.iter(|| black_box(matcher::find_quad_match(session.board(), |_| false)))
    });
}

fn bench_gravity_plan(c: &mut Criterion) {
    let mut session = populated(4242);
    // Let a few matches punch holes into the board first.
    for _ in 0..200 {
        session.tick(TICK_MS, &mut NullPresenter);
    }

    c.bench_function("gravity_plan", |b| {
        b.iter(|| black_box(gravity::plan(session.board(), |_| false)))
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_rebuild_cache,
    bench_find_quad_match,
    bench_gravity_plan
);
criterion_main!(benches);
