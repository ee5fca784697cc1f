// storefront_client/src/pipeline/execution.rs
use crate::core::{PipelineControl, PipelineResult, SharedState};
use crate::error::{StorefrontError, StorefrontResult};
use crate::pipeline::definition::Pipeline;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<TData: 'static + Send + Sync> Pipeline<TData> {
  /// Runs every step in order. A step with no handlers is an error, a handler
  /// error aborts the run, and `PipelineControl::Stop` ends it early.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(data_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, data: SharedState<TData>) -> StorefrontResult<PipelineResult> {
    for (step_index, step) in self.steps.iter().enumerate() {
      let step_name = step.name.as_str();
      let span = info_span!("pipeline_step", step_name, step_index);

      if let Some(condition) = &step.skip_if {
        let skip = condition(&data.read());
        if skip {
          event!(parent: &span, Level::DEBUG, "Step skipped.");
          continue;
        }
      }

      let handlers = match self.handlers.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ => {
          event!(parent: &span, Level::ERROR, "Step has no handlers.");
          return Err(StorefrontError::Internal(format!(
            "pipeline step '{}' has no handlers",
            step_name
          )));
        }
      };

      for handler in handlers {
        match handler(data.clone()).instrument(span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(parent: &span, Level::INFO, "Pipeline stopped by handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            event!(parent: &span, Level::WARN, error = %e, "Step handler failed.");
            return Err(e);
          }
        }
      }
    }
    Ok(PipelineResult::Completed)
  }
}
