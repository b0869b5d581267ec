use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cooperative_surplus::domain::models::NegotiationConfig;
use cooperative_surplus::{ContributionClaim, NegotiationEngine, SurplusPool};

fn claims(count: usize) -> Vec<ContributionClaim> {
    (0..count)
        .map(|i| {
            let estimate = 50.0 + (i as f64 * 37.0) % 400.0;
            ContributionClaim::new(
                format!("agent-{i}"),
                "bench",
                estimate,
                estimate * 0.1,
                (i % 10) as f64 / 10.0,
            )
            .expect("valid claim")
        })
        .collect()
}

fn bench_negotiate_splits(c: &mut Criterion) {
    let engine = NegotiationEngine::new(NegotiationConfig {
        max_iterations: 100,
        equilibrium_tolerance: 1e-7,
        fairness_weight: 0.3,
    });
    let pool = SurplusPool::with_total("bench", 10_000.0);
    let mut group = c.benchmark_group("negotiate_splits");

    for count in [2usize, 10, 50] {
        let claims = claims(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &claims, |b, claims| {
            b.iter(|| engine.negotiate_splits(black_box(&pool), black_box(claims)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_negotiate_splits);
criterion_main!(benches);
