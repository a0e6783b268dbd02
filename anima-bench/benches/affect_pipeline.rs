//! Anima benchmark suite.
//!
//! The rule-based path runs inline on every message, so each stage has a
//! latency target:
//!   router_classify_long_message ..... < 10μs
//!   analyzer_keyword_deltas .......... < 20μs
//!   decay_full_update ................ < 5μs
//!   dyads_from_state ................. < 10μs
//!   storage_decide_with_history ...... < 250μs

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use anima_core::config::{AffectConfig, StorageConfig};
use anima_core::types::{AffectState, EmotionDynamics, MoodState, Primary};
use anima_core::{analyzer, decay, dyad, router, storage};

fn excited_state() -> AffectState {
    let mut state = AffectState::neutral();
    state.set(Primary::Joy, 0.8);
    state.set(Primary::Anticipation, 0.7);
    state.set(Primary::Fear, 0.4);
    state
}

fn work_history(entries: usize) -> Vec<String> {
    (0..entries)
        .map(|i| format!("El proyecto del trabajo sigue complicado, día {i}"))
        .collect()
}

/// Benchmark: routing one long emotional message (target: < 10μs).
fn bench_router(c: &mut Criterion) {
    let message = "Mi jefe me gritó delante de todos y me siento muy frustrada, \
                   no sé qué hacer. ¿Tú qué piensas? Necesito decidir algo pronto.";
    c.bench_function("router_classify_long_message", |b| {
        b.iter(|| {
            let verdict = router::classify(black_box(message));
            black_box(verdict);
        });
    });
}

/// Benchmark: keyword and emoji scan over one message (target: < 20μs).
fn bench_analyzer(c: &mut Criterion) {
    let message = "Estoy feliz pero también un poco nerviosa por el examen de mañana 😊";
    c.bench_function("analyzer_keyword_deltas", |b| {
        b.iter(|| {
            let deltas = analyzer::analyze_message(black_box(message));
            black_box(deltas);
        });
    });
}

/// Benchmark: full decay-and-blend update for one character (target: < 5μs).
fn bench_decay(c: &mut Criterion) {
    let config = AffectConfig {
        perturbation_enabled: false,
        ..AffectConfig::default()
    };
    let dynamics = EmotionDynamics::default();
    let current = excited_state();
    let target = AffectState::neutral();
    let baseline = AffectState::neutral();
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("decay_full_update", |b| {
        b.iter(|| {
            let (state, mood) = decay::apply_update(
                black_box(&current),
                black_box(&target),
                black_box(&baseline),
                black_box(MoodState::NEUTRAL),
                black_box(&dynamics),
                black_box(30.0),
                &config,
                &mut rng,
            );
            black_box((state, mood));
        });
    });
}

/// Benchmark: dyad synthesis from one state (target: < 10μs).
fn bench_dyads(c: &mut Criterion) {
    let state = excited_state();
    c.bench_function("dyads_from_state", |b| {
        b.iter(|| {
            let dyads = dyad::compute_dyads(black_box(&state));
            black_box(dyads);
        });
    });
}

/// Benchmark: storage scoring with a full history window (target: < 250μs).
fn bench_storage(c: &mut Criterion) {
    let state = excited_state();
    let history = work_history(20);
    let config = StorageConfig::default();
    let message = "Hoy en el trabajo el proyecto volvió a salir mal y mi jefe me culpó";

    c.bench_function("storage_decide_with_history", |b| {
        b.iter(|| {
            let decision = storage::decide(
                black_box(message),
                black_box(&state),
                black_box(-0.6),
                black_box(&history),
                &config,
            );
            black_box(decision);
        });
    });
}

criterion_group!(
    benches,
    bench_router,
    bench_analyzer,
    bench_decay,
    bench_dyads,
    bench_storage,
);
criterion_main!(benches);
