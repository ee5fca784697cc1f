// storefront_client/src/pipeline/definition.rs
use crate::core::{Handler, PipelineControl, SharedState, SkipCondition, StepDef};
use crate::error::StorefrontResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// An ordered list of named steps run against shared data of type `TData`.
pub struct Pipeline<TData: 'static + Send + Sync> {
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<String, Vec<Handler<TData>>>,
}

impl<TData: 'static + Send + Sync> Pipeline<TData> {
  pub fn new(step_names: &[&str]) -> Self {
    Self {
      steps: step_names
        .iter()
        .map(|name| StepDef {
          name: (*name).to_string(),
          skip_if: None,
        })
        .collect(),
      handlers: HashMap::new(),
    }
  }

  // Unknown step names are wiring mistakes, caught the first time the
  // pipeline is assembled.
  fn step_mut(&mut self, step_name: &str) -> &mut StepDef<TData> {
    match self.steps.iter_mut().find(|s| s.name == step_name) {
      Some(step) => step,
      None => panic!("pipeline setup error: step '{}' is not defined", step_name),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn skip_if(&mut self, step_name: &str, condition: impl Fn(&TData) -> bool + Send + Sync + 'static) -> &mut Self {
    let condition: SkipCondition<TData> = Arc::new(condition);
    self.step_mut(step_name).skip_if = Some(condition);
    self
  }

  /// Registers a handler for a step. Handlers of one step run in
  /// registration order.
  pub fn on<F>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(SharedState<TData>) -> F + Send + Sync + 'static,
  ) -> &mut Self
  where
    F: Future<Output = StorefrontResult<PipelineControl>> + Send + 'static,
  {
    self.step_mut(step_name);
    let handler: Handler<TData> = Box::new(move |data| Box::pin(handler_fn(data)));
    self.handlers.entry(step_name.to_string()).or_default().push(handler);
    self
  }
}

impl<TData: 'static + Send + Sync> std::fmt::Debug for Pipeline<TData> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline").field("steps", &self.steps).finish()
  }
}
