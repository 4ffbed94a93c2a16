use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::vector;
use reflectrace::cache::ReflectionCache;
use reflectrace::config::{GeomConfig, SearchLimits};
use reflectrace::geom::Segment;
use reflectrace::propagator::RayPropagator;
use reflectrace::strategy::{find_next_hit, HitMode, HitOptions, PhysicalStrategy};
use reflectrace::surface::{PlaneSurface, ReflectiveSide, Surface};
use reflectrace::trace;

fn zigzag_mirrors(n: usize) -> Vec<PlaneSurface> {
    (0..n)
        .map(|i| {
            let x = 100.0 + i as f64 * 80.0;
            let side = if i % 2 == 0 { ReflectiveSide::Left } else { ReflectiveSide::Right };
            PlaneSurface::reflective(format!("s{i}"), Segment::new(vector![x, -100.0], vector![x, 100.0]), side)
        })
        .collect()
}

fn bench_find_next_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_next_hit");
    for &n in &[4usize, 32, 128] {
        let mirrors = zigzag_mirrors(n);
        let surfaces: Vec<&dyn Surface> = mirrors.iter().map(|s| s as &dyn Surface).collect();
        let cfg = GeomConfig::default();
        let ray = reflectrace::geom::Ray::new(vector![0.0, 0.0], vector![1.0, 0.5]);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let opts = HitOptions::new(HitMode::Physical);
                find_next_hit(ray, &surfaces, &opts, &cfg)
            });
        });
    }
    group.finish();
}

fn bench_trace_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_path_run");
    for &n in &[4usize, 16] {
        let mirrors = zigzag_mirrors(n);
        let surfaces: Vec<&dyn Surface> = mirrors.iter().map(|s| s as &dyn Surface).collect();
        let cfg = GeomConfig::default();
        let limits = SearchLimits::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let strategy = PhysicalStrategy::new(&surfaces, None);
                let cache = Rc::new(ReflectionCache::new());
                let propagator = RayPropagator::new(vector![0.0, 0.0], vector![1000.0, 50.0], cache);
                trace::run(propagator, &strategy, Default::default(), &cfg, &limits)
            });
        });
    }
    group.finish();
}

fn bench_reflection_cache(c: &mut Criterion) {
    let s = PlaneSurface::reflective("s0", Segment::new(vector![200.0, 0.0], vector![200.0, 200.0]), ReflectiveSide::Left);
    c.bench_function("reflection_cache_reflect", |b| {
        let cache = ReflectionCache::new();
        let p = vector![100.0, 50.0];
        b.iter(|| cache.reflect(p, &s));
    });
}

criterion_group!(benches, bench_find_next_hit, bench_trace_path, bench_reflection_cache);
criterion_main!(benches);
