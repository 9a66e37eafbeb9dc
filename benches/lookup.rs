//! Benchmarks for member lookup and subtype checks.
//!
//! Measures the reflection queries that run on hot paths once classes are linked:
//! - Field lookup through a superclass chain
//! - First-match method lookup with argument conversion
//! - Assignability against classes, interfaces and arrays
//! - Resolving already defined classes by display name

extern crate classscope;

use classscope::prelude::*;
use criterion::{criterion_group, criterion_main, Criterion};
use std::{hint::black_box, sync::Arc};

const DEPTH: usize = 8;

/// A chain `bench/Level0 <- bench/Level1 <- ... <- bench/Level7`, each level declaring
/// one field and two overloads of `visit`, the deepest implementing `bench/Visitor`.
fn hierarchy() -> Arc<MemoryLoader> {
    let loader = MemoryLoader::system();
    loader.add_definition(
        ClassBuilder::interface("bench/Visitor")
            .public()
            .method("visit", "(Ljava/lang/Object;)V", Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .build(),
    );

    for level in 0..DEPTH {
        let super_class = if level == 0 {
            "java/lang/Object".to_string()
        } else {
            format!("bench/Level{}", level - 1)
        };
        let mut builder = ClassBuilder::new(&format!("bench/Level{level}"))
            .extends(&super_class)
            .public()
            .field(&format!("field{level}"), "I", Modifiers::PUBLIC)
            .method("visit", "(Ljava/lang/Object;)V", Modifiers::PUBLIC)
            .method("visit", "(Ljava/lang/String;)V", Modifiers::PUBLIC);
        if level == DEPTH - 1 {
            builder = builder.implements("bench/Visitor");
        }
        loader.add_definition(builder.build());
    }

    loader
}

fn deepest(loader: &MemoryLoader) -> ClassRc {
    let class = loader
        .resolve(&format!("bench/Level{}", DEPTH - 1))
        .unwrap();
    class.ensure_linked().unwrap();
    class
}

/// Benchmark finding a field declared at the top of the chain.
fn bench_get_field_inherited(c: &mut Criterion) {
    let loader = hierarchy();
    let class = deepest(&loader);

    c.bench_function("get_field_inherited", |b| {
        b.iter(|| {
            let field = class.get_field(black_box("field0")).unwrap();
            black_box(field)
        });
    });
}

/// Benchmark finding a field declared on the queried class.
fn bench_get_declared_field(c: &mut Criterion) {
    let loader = hierarchy();
    let class = deepest(&loader);
    let name = format!("field{}", DEPTH - 1);

    c.bench_function("get_declared_field", |b| {
        b.iter(|| {
            let field = class.get_declared_field(black_box(&name)).unwrap();
            black_box(field)
        });
    });
}

/// Benchmark method lookup where the requested argument needs a widening match.
fn bench_get_method_first_match(c: &mut Criterion) {
    let loader = hierarchy();
    let class = deepest(&loader);
    let string = loader.resolve("java/lang/String").unwrap();
    let parameters = [string];

    c.bench_function("get_method_first_match", |b| {
        b.iter(|| {
            let method = class.get_method(black_box("visit"), black_box(&parameters)).unwrap();
            black_box(method)
        });
    });
}

/// Benchmark subtype checks against a superclass, an interface and an array type.
fn bench_is_assignable_from(c: &mut Criterion) {
    let loader = hierarchy();
    let class = deepest(&loader);
    let root = loader.resolve("bench/Level0").unwrap();
    let visitor = loader.resolve("bench/Visitor").unwrap();
    let roots = loader.resolve("[Lbench/Level0;").unwrap();
    let leaves = loader
        .resolve(&format!("[Lbench/Level{};", DEPTH - 1))
        .unwrap();

    c.bench_function("is_assignable_from_superclass", |b| {
        b.iter(|| black_box(root.is_assignable_from(black_box(&class))));
    });
    c.bench_function("is_assignable_from_interface", |b| {
        b.iter(|| black_box(visitor.is_assignable_from(black_box(&class))));
    });
    c.bench_function("is_assignable_from_array", |b| {
        b.iter(|| black_box(roots.is_assignable_from(black_box(&leaves))));
    });
}

/// Benchmark resolving an already defined class by display name.
fn bench_load_class_cached(c: &mut Criterion) {
    let loader = hierarchy();
    let _ = deepest(&loader);

    c.bench_function("load_class_cached", |b| {
        b.iter(|| {
            let class = loader.load_class(black_box("bench.Level7")).unwrap();
            black_box(class)
        });
    });
}

criterion_group!(
    benches,
    bench_get_field_inherited,
    bench_get_declared_field,
    bench_get_method_first_match,
    bench_is_assignable_from,
    bench_load_class_cached
);
criterion_main!(benches);
