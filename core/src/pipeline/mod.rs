// storefront_client/src/pipeline/mod.rs

//! Named-step pipeline used to sequence an order submission.

pub mod definition;
pub mod execution;

pub use definition::Pipeline;
