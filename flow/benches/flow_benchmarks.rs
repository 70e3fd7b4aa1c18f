// flow/benches/flow_benchmarks.rs

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pizzeria_flow::{
  ContextData, FlowError, FlowRegistry, Handler, Pipeline, PipelineControl, PipelineResult, SkipCondition,
};
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct OvenContext {
  pizzas_baked: u64,
}

fn bake_handler(work: u64) -> Handler<OvenContext, FlowError> {
  Box::new(move |ctx: ContextData<OvenContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      for _ in 0..work {
        guard.pizzas_baked = guard.pizzas_baked.wrapping_add(1);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

fn build_pipeline(step_names: &[&'static str], work: u64) -> Pipeline<OvenContext, FlowError> {
  let defs: Vec<(&str, bool, Option<SkipCondition<OvenContext>>)> =
    step_names.iter().map(|name| (*name, false, None)).collect();
  let mut pipeline = Pipeline::<OvenContext, FlowError>::new(&defs);
  for name in step_names {
    pipeline.on_root(name, bake_handler(work));
  }
  pipeline
}

const STEP_NAMES: [&str; 10] = [
  "step_0", "step_1", "step_2", "step_3", "step_4", "step_5", "step_6", "step_7", "step_8", "step_9",
];

fn bench_pipeline_run(c: &mut Criterion) {
  let mut group = c.benchmark_group("pipeline_run");
  let rt = Runtime::new().expect("tokio runtime");

  for num_steps in [1usize, 5, 10] {
    let pipeline = build_pipeline(&STEP_NAMES[..num_steps], 10);
    group.throughput(Throughput::Elements(num_steps as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), &pipeline, |b, pipeline| {
      b.to_async(&rt).iter(|| async {
        let ctx = ContextData::new(OvenContext::default());
        let result = pipeline.run(ctx).await.expect("pipeline run");
        assert_eq!(result, PipelineResult::Completed);
      });
    });
  }
  group.finish();
}

fn bench_registry_dispatch(c: &mut Criterion) {
  let rt = Runtime::new().expect("tokio runtime");
  let registry = FlowRegistry::<FlowError>::new();
  registry.register_pipeline(build_pipeline(&STEP_NAMES[..3], 1));

  c.bench_function("registry_dispatch_3_steps", |b| {
    b.to_async(&rt).iter(|| async {
      let ctx = ContextData::new(OvenContext::default());
      registry.run(ctx).await.expect("registry run")
    });
  });
}

criterion_group!(benches, bench_pipeline_run, bench_registry_dispatch);
criterion_main!(benches);
