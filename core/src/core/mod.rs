// storefront_client/src/core/mod.rs

//! Building blocks of the step pipeline: shared data, step definitions, handlers
//! and flow control.

pub mod control;
pub mod handler;
pub mod shared_state;
pub mod step;

pub use control::{PipelineControl, PipelineResult};
pub use handler::Handler;
pub use shared_state::SharedState;
pub use step::{SkipCondition, StepDef};
