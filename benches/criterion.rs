use criterion::{black_box, criterion_group, criterion_main, Criterion};
use say_hello::core::greeting::greeting_service::{greet, GreetingRequest};

fn greet_benchmark(c: &mut Criterion) {
    c.bench_function("greet", |b| {
        b.iter(|| greet(black_box(GreetingRequest::new("World"))))
    });
}

fn reject_benchmark(c: &mut Criterion) {
    c.bench_function("greet_blank", |b| {
        b.iter(|| greet(black_box(GreetingRequest::new("   "))))
    });
}

criterion_group!(benches, greet_benchmark, reject_benchmark);
criterion_main!(benches);
