use criterion::{Criterion, criterion_group, criterion_main};
use stack_align_core::{Comparator, DiffCache, DiffVariant, Plane, best_round_sub};
use stack_align_core::comparator::AlignMethod;

fn checkerboard(size: usize) -> Plane {
    let mut p = Plane::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / 8) + (y / 8)) % 2 == 0;
            p.set_pixel(x, y, if on { 0xFFFF } else { 0x0000 });
        }
    }
    p
}

fn bench_raw_search(c: &mut Criterion) {
    let a = checkerboard(256);
    let b = checkerboard(256);

    c.bench_function("best_round_sub_level_4", |bencher| {
        bencher.iter(|| {
            let mut cache = DiffCache::new();
            best_round_sub(&a, &b, 4, -30, 30, -30, 30, &mut cache, DiffVariant::Plain)
        });
    });
}

fn bench_comparator(c: &mut Criterion) {
    let a = checkerboard(256);
    let b = checkerboard(256);
    let comparator = Comparator::new(AlignMethod::Free);

    c.bench_function("comparator_find_offset", |bencher| {
        bencher.iter(|| comparator.find_offset(&a, &b));
    });
}

criterion_group!(benches, bench_raw_search, bench_comparator);
criterion_main!(benches);
