use criterion::{Criterion, criterion_group, criterion_main};
use stack_align_core::{DiffVariant, Plane};

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

fn bench_diff(c: &mut Criterion) {
    let a = checkerboard(512);
    let b = checkerboard(512);

    let mut group = c.benchmark_group("plane_diff");
    for stride in [1usize, 2, 4] {
        group.bench_function(format!("stride_{stride}"), |bencher| {
            bencher.iter(|| a.diff(&b, 3, -2, stride, DiffVariant::Plain));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_diff);
criterion_main!(benches);
