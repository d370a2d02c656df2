use criterion::*;
use logo_tasks::{catalog::manual_tasks, compile, eval::run_turtle, render::Canvas};

const FLOWER: &str = "(loop j 7 (loop n 2 (loop i infinity (move epsilonDistance (/a epsilonAngle 2))) \
                      (move 0d (/a 1a 4))) (move 0d (/a 1a 7)))";

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("compile_flower", |b| b.iter(|| compile(black_box(FLOWER))));

    let flower = compile(FLOWER).unwrap();
    c.bench_function("draw_flower", |b| b.iter(|| run_turtle(black_box(&flower))));

    let drawing = run_turtle(&flower).unwrap();
    c.bench_function("render_flower_128", |b| {
        b.iter(|| Canvas::render(black_box(&drawing), 128))
    });

    let mut group = c.benchmark_group("catalog");
    group.sample_size(10);
    group.bench_function("manual_tasks", |b| b.iter(manual_tasks));
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
