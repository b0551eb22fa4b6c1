use bionet_core::topology::build_network;
use bionet_core::{AppConfig, Brain};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const TEXT: &str = "Der Hund ist ein Tier. Die Katze jagt Mäuse. Die Sonne scheint hell.";

fn seeded_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.engine.seed = Some(42);
    config
}

/// Benchmark booting the static layout and core wiring.
fn bench_boot(c: &mut Criterion) {
    let config = seeded_config();
    c.bench_function("boot_network", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            black_box(build_network(&config, &mut rng))
        })
    });
}

/// Benchmark one tick of a network that has read a few sentences.
fn bench_tick(c: &mut Criterion) {
    let mut brain = Brain::new(seeded_config());
    brain.process_text(TEXT, 0);
    let mut now = 0;

    c.bench_function("brain_tick", |b| {
        b.iter(|| {
            now += 50;
            if now % 1_000 == 0 {
                brain.process_text(TEXT, now);
            }
            black_box(brain.tick(black_box(now)))
        })
    });
}

/// Benchmark the token encoder on a short paragraph.
fn bench_process_text(c: &mut Criterion) {
    let mut brain = Brain::new(seeded_config());
    let mut now = 0;

    c.bench_function("process_text", |b| {
        b.iter(|| {
            now += 1;
            black_box(brain.process_text(black_box(TEXT), now))
        })
    });
}

criterion_group!(benches, bench_boot, bench_tick, bench_process_text);
criterion_main!(benches);
