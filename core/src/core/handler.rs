// storefront_client/src/core/handler.rs
use super::control::PipelineControl;
use super::shared_state::SharedState;
use crate::error::StorefrontResult;
use std::future::Future;
use std::pin::Pin;

/// A step handler. It receives a clone of the shared pipeline data, must not
/// hold a lock guard across `.await`, and decides whether the run continues.
pub type Handler<TData> = Box<
  dyn Fn(SharedState<TData>) -> Pin<Box<dyn Future<Output = StorefrontResult<PipelineControl>> + Send>>
    + Send
    + Sync,
>;
