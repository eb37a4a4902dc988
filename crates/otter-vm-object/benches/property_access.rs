//! Property access benchmarks
//!
//! Measures the dispatch path for ordinary, inherited and proxied lookups.
//!
//! Run with: `cargo bench -p otter-vm-object property_access`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use otter_vm_object::operations;
use otter_vm_object::proxy::proxy_create;
use otter_vm_object::{ObjectRef, PropertyKey, Value, VmContext, VmRuntime};
use std::hint::black_box;

fn create_test_context() -> VmContext {
    VmRuntime::new().create_context()
}

fn bench_ordinary(c: &mut Criterion) {
    let mut ctx = create_test_context();
    let obj = ctx.new_object();
    let key = PropertyKey::intern("x");
    operations::create_data_property_or_throw(&mut ctx, &obj, &key, Value::int32(1)).unwrap();

    c.bench_function("ordinary_get", |b| {
        b.iter(|| operations::get(&mut ctx, black_box(&obj), black_box(&key)).unwrap())
    });
    c.bench_function("ordinary_set", |b| {
        b.iter(|| operations::set(&mut ctx, black_box(&obj), black_box(&key), Value::int32(2), true).unwrap())
    });
}

fn bench_prototype_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("prototype_chain_get");
    for depth in [1usize, 4, 16] {
        let mut ctx = create_test_context();
        let root = ctx.new_object();
        let key = PropertyKey::intern("inherited");
        operations::create_data_property_or_throw(&mut ctx, &root, &key, Value::int32(1)).unwrap();
        let mut leaf = root;
        for _ in 0..depth {
            leaf = ObjectRef::ordinary(Some(leaf));
        }
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| operations::get(&mut ctx, black_box(&leaf), black_box(&key)).unwrap())
        });
    }
    group.finish();
}

fn bench_proxy_forwarding(c: &mut Criterion) {
    let mut ctx = create_test_context();
    let target = ctx.new_object();
    let key = PropertyKey::intern("x");
    operations::create_data_property_or_throw(&mut ctx, &target, &key, Value::int32(1)).unwrap();
    let handler = Value::object(ctx.new_object());
    let proxy = proxy_create(&Value::object(target), &handler).unwrap();

    c.bench_function("proxy_forwarded_get", |b| {
        b.iter(|| operations::get(&mut ctx, black_box(&proxy), black_box(&key)).unwrap())
    });
}

criterion_group!(benches, bench_ordinary, bench_prototype_chain, bench_proxy_forwarding);
criterion_main!(benches);
