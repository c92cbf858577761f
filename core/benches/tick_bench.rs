use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tickbench_core::bench::breadth;
use tickbench_core::rt::{Callback, ChannelTickQueue, Runtime, Scheduler, TickQueue};
use tickbench_core::val::{TickArgs, Val};

const TICKS: u64 = 10_000;

#[derive(Default)]
struct Counter {
    n: u64,
}

fn bump(ctx: &mut Counter, args: &[Val]) -> anyhow::Result<()> {
    black_box(args);
    ctx.n += 1;
    Ok(())
}

static CB1: Callback<Counter> = Callback::new("cb1", 1, bump);
static CB2: Callback<Counter> = Callback::new("cb2", 2, bump);
static CB3: Callback<Counter> = Callback::new("cb3", 3, bump);

fn fill<S: Scheduler<Counter>>(scheduler: &mut S, callback: &'static Callback<Counter>, args: TickArgs) {
    for _ in 0..TICKS {
        scheduler.defer(callback, args).expect("defer tick");
    }
}

// Same ticks through each backend, one arity at a time.
fn bench_arity(c: &mut Criterion) {
    let cases: [(&str, &'static Callback<Counter>, TickArgs); 3] = [
        ("arity1", &CB1, TickArgs::from_array([Val::Int(0)])),
        ("arity2", &CB2, TickArgs::from_array([Val::Bool(false), Val::Float(5.1)])),
        ("arity3", &CB3, TickArgs::from_array([Val::Int(512), Val::Bool(true), Val::Nil])),
    ];

    let mut group = c.benchmark_group("defer_and_drain");
    group.throughput(Throughput::Elements(TICKS));
    for (label, callback, args) in cases {
        group.bench_with_input(BenchmarkId::new("queue", label), &args, |b, args| {
            let mut queue = TickQueue::with_capacity(TICKS as usize);
            b.iter(|| {
                let mut ctx = Counter::default();
                fill(&mut queue, callback, *args);
                queue.run_pending(&mut ctx).expect("drain queue");
                black_box(ctx.n);
            });
        });
        group.bench_with_input(BenchmarkId::new("channel", label), &args, |b, args| {
            let mut queue = ChannelTickQueue::new();
            b.iter(|| {
                let mut ctx = Counter::default();
                fill(&mut queue, callback, *args);
                queue.run_pending(&mut ctx).expect("drain channel");
                black_box(ctx.n);
            });
        });
    }
    group.finish();
}

// The full round-robin driver, harness included.
fn bench_breadth_args(c: &mut Criterion) {
    let millions = TICKS as f64 / 1e6;
    let mut group = c.benchmark_group("breadth_args");
    group.throughput(Throughput::Elements(TICKS));
    group.bench_function("queue", |b| {
        b.iter(|| {
            let mut queue = TickQueue::new();
            black_box(breadth::run(&mut queue, millions).expect("queue run"));
        });
    });
    let runtime = Runtime::new_current_thread().expect("create tokio runtime");
    group.bench_function("channel", |b| {
        b.iter(|| {
            let mut queue = ChannelTickQueue::new();
            black_box(breadth::run_bounded(&mut queue, &runtime, millions, None).expect("channel run"));
        });
    });
    group.finish();
}

criterion_group!(ticks, bench_arity, bench_breadth_args);
criterion_main!(ticks);
