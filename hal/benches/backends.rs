//! Uncontended cost of each atomic backend on the host
//!
//! Numbers only compare strategies relative to each other; absolute cost on
//! an ARC core depends on the instruction each backend lowers to.

use std::hint::black_box;

use arc_hal::atomic::{AtomicWord, Atld, Backend, Emulated, Llsc, Nps, Ops};
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_backend<B: Backend>(c: &mut Criterion) {
    let mut group = c.benchmark_group(Ops::<B>::NAME);
    let word = AtomicWord::new(0);

    group.bench_function("add", |b| b.iter(|| Ops::<B>::add(&word, black_box(1))));
    group.bench_function("add_return", |b| {
        b.iter(|| Ops::<B>::add_return(&word, black_box(1)))
    });
    group.bench_function("fetch_andnot", |b| {
        b.iter(|| Ops::<B>::fetch_andnot(&word, black_box(0x10)))
    });
    group.bench_function("compare_exchange", |b| {
        b.iter(|| {
            let current = Ops::<B>::load(&word);
            Ops::<B>::compare_exchange(&word, current, black_box(current.wrapping_add(1)))
        })
    });
    group.bench_function("dec_if_positive", |b| {
        b.iter(|| {
            Ops::<B>::store(&word, black_box(1));
            Ops::<B>::dec_if_positive(&word)
        })
    });

    group.finish();
}

fn backends(c: &mut Criterion) {
    bench_backend::<Llsc>(c);
    bench_backend::<Atld>(c);
    bench_backend::<Nps>(c);
    bench_backend::<Emulated>(c);
}

criterion_group!(benches, backends);
criterion_main!(benches);
