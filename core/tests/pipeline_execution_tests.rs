// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront_client::{Pipeline, PipelineControl, PipelineResult, SharedState, StorefrontError, StorefrontResult};

#[derive(Debug, Default)]
struct Trace {
  steps: Vec<String>,
  skip_b: bool,
  stop_at: Option<String>,
}

async fn record(data: SharedState<Trace>, step: &'static str) -> StorefrontResult<PipelineControl> {
  let mut trace = data.write();
  trace.steps.push(step.to_string());
  if trace.stop_at.as_deref() == Some(step) {
    return Ok(PipelineControl::Stop);
  }
  Ok(PipelineControl::Continue)
}

fn three_steps() -> Pipeline<Trace> {
  let mut pipeline = Pipeline::new(&["a", "b", "c"]);
  pipeline
    .on("a", |data| record(data, "a"))
    .on("b", |data| record(data, "b"))
    .on("c", |data| record(data, "c"));
  pipeline
}

#[tokio::test]
#[serial]
async fn runs_steps_in_declaration_order() {
  setup_tracing();
  let pipeline = three_steps();
  let data = SharedState::new(Trace::default());

  let result = pipeline.run(data.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(data.read().steps, vec!["a", "b", "c"]);
  assert_eq!(pipeline.step_names(), vec!["a", "b", "c"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_steps() {
  setup_tracing();
  let pipeline = three_steps();
  let data = SharedState::new(Trace {
    stop_at: Some("b".to_string()),
    ..Trace::default()
  });

  let result = pipeline.run(data.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert_eq!(data.read().steps, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_is_read_from_the_data() {
  setup_tracing();
  let mut pipeline = three_steps();
  pipeline.skip_if("b", |trace: &Trace| trace.skip_b);
  let data = SharedState::new(Trace {
    skip_b: true,
    ..Trace::default()
  });

  pipeline.run(data.clone()).await.unwrap();

  assert_eq!(data.read().steps, vec!["a", "c"]);
}

#[tokio::test]
#[serial]
async fn handler_error_aborts_the_run() {
  setup_tracing();
  let mut pipeline = Pipeline::new(&["a", "b", "c"]);
  pipeline
    .on("a", |data| record(data, "a"))
    .on("b", |_data: SharedState<Trace>| async {
      Err::<PipelineControl, _>(StorefrontError::TransientNetwork("boom".to_string()))
    })
    .on("c", |data| record(data, "c"));
  let data = SharedState::new(Trace::default());

  let err = pipeline.run(data.clone()).await.unwrap_err();

  assert!(matches!(err, StorefrontError::TransientNetwork(_)));
  assert_eq!(data.read().steps, vec!["a"]);
}

#[tokio::test]
#[serial]
async fn step_without_handlers_is_an_error() {
  setup_tracing();
  let mut pipeline = Pipeline::new(&["a", "orphan"]);
  pipeline.on("a", |data| record(data, "a"));

  let err = pipeline.run(SharedState::new(Trace::default())).await.unwrap_err();

  assert!(matches!(err, StorefrontError::Internal(message) if message.contains("orphan")));
}

#[test]
#[should_panic(expected = "step 'missing' is not defined")]
fn registering_on_an_unknown_step_panics() {
  let mut pipeline: Pipeline<Trace> = Pipeline::new(&["a"]);
  pipeline.on("missing", |data| record(data, "missing"));
}
