use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use skein::{done, pass, step, Skein, Value};

// --- Benchmark Functions ---

fn bench_sync_chain(c: &mut Criterion) {
  let mut group = c.benchmark_group("SyncChain");

  for num_steps in [1u64, 10, 100].iter() {
    group.throughput(Throughput::Elements(*num_steps));
    group.bench_with_input(
      BenchmarkId::from_parameter(num_steps),
      num_steps,
      |b, &num_steps| {
        b.iter(|| {
          let skein = Skein::new();
          let mut chain = skein.seed(0i64);
          for _ in 0..num_steps {
            chain = chain.next(step(|_ctx, value| match value {
              Value::Int(n) => done(n + 1),
              other => done(other),
            }));
          }
          chain.outcome()
        })
      },
    );
  }
  group.finish();
}

fn bench_branching_chain(c: &mut Criterion) {
  c.bench_function("branching_chain_alternation", |b| {
    b.iter(|| {
      let skein = Skein::new();
      skein
        .seed(2i64)
        .next_case(1i64)
        .next(step(|_ctx, _value| done("one")))
        .or_next_case(2i64)
        .next(step(|_ctx, _value| done("two")))
        .or_next()
        .next(step(|_ctx, _value| done("other")))
        .end()
        .outcome()
    })
  });
}

fn bench_fork_join(c: &mut Criterion) {
  let mut group = c.benchmark_group("ForkJoin");

  for fan_out in [4u64, 16, 64].iter() {
    group.throughput(Throughput::Elements(*fan_out));
    group.bench_with_input(
      BenchmarkId::from_parameter(fan_out),
      fan_out,
      |b, &fan_out| {
        let items: Vec<Value> = (0..fan_out as i64).map(Value::Int).collect();
        b.iter(|| {
          let skein = Skein::new();
          skein
            .seed(Value::List(items.clone()))
            .fork_each(step(|_ctx, value| match value {
              Value::Int(n) => done(n * n),
              other => done(other),
            }))
            .outcome()
        })
      },
    );
  }
  group.finish();
}

fn bench_scheduler_timers(c: &mut Criterion) {
  c.bench_function("scheduler_32_timers", |b| {
    b.iter(|| {
      let skein = Skein::new();
      let sk_fork = skein.clone();
      skein
        .next(step(move |_ctx, _value| {
          for delay in 1..=32u64 {
            sk_fork.seed(delay as i64).wait(delay);
          }
          pass()
        }))
        .next(step(|_ctx, value| done(value)));
      skein.advance(32);
      skein.now()
    })
  });
}

criterion_group!(
  benches,
  bench_sync_chain,
  bench_branching_chain,
  bench_fork_join,
  bench_scheduler_timers
);
criterion_main!(benches);
