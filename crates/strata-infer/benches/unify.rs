//! Unification performance benchmarks.
//!
//! Measures constraint solving over variable chains (slot-to-slot
//! unification with a concrete anchor) and decomposition-heavy workloads
//! (nested qualified terms).

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use strata_infer::{Region, TermCtx, Unifier};

fn bench_chain_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_solve");

    for size in [10, 100, 1_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut ctx = TermCtx::new();
                let mut unifier = Unifier::new();

                let slots: Vec<_> = (0..size).map(|_| ctx.slot()).collect();
                let global = ctx.region(Region::Global);

                for pair in slots.windows(2) {
                    unifier.constrain(pair[0], pair[1], None);
                }
                unifier.constrain(slots[size - 1], global, None);

                unifier.solve(&ctx).unwrap();
                black_box(unifier.canonicalize(&mut ctx, slots[0]))
            });
        });
    }

    group.finish();
}

fn bench_nested_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_decomposition");

    for depth in [4, 16, 64].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            b.iter(|| {
                let mut ctx = TermCtx::new();
                let mut unifier = Unifier::new();

                let int = ctx.scalar_named("Int");
                let global = ctx.region(Region::Global);

                let mut unknown = {
                    let slot = ctx.slot();
                    ctx.pointer(slot, int)
                };
                let mut concrete = ctx.pointer(global, int);
                for _ in 0..depth {
                    let slot = ctx.slot();
                    unknown = ctx.pointer(slot, unknown);
                    concrete = ctx.pointer(global, concrete);
                }

                unifier.constrain(unknown, concrete, None);
                unifier.solve(&ctx).unwrap();
                black_box(unifier.canonicalize(&mut ctx, unknown))
            });
        });
    }

    group.finish();
}

fn bench_derive(c: &mut Criterion) {
    c.bench_function("derive_polymorphic_signature", |b| {
        let mut ctx = TermCtx::new();

        let int = ctx.scalar_named("Int");
        let slot = ctx.slot();
        let param = ctx.pointer(slot, int);
        let ret = ctx.reference(slot, int);
        let signature = ctx.func(None, ret, vec![param, param]);

        b.iter(|| {
            let mut fresh = std::collections::HashMap::new();
            black_box(ctx.derive(signature, &mut fresh))
        });
    });
}

criterion_group!(
    benches,
    bench_chain_solve,
    bench_nested_decomposition,
    bench_derive
);
criterion_main!(benches);
