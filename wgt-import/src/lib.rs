//! wgt-import library interface
//!
//! Rebuilds a gap-free score history from a group chat export and writes it
//! to the score store with insert-if-absent semantics.
//!
//! Exposes the pipeline stages individually for testing.

pub mod chat;
pub mod emit;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod reconcile;
pub mod summary;

pub use crate::error::{ImportError, ImportResult};
pub use crate::pipeline::{run, PipelineConfig, PipelineOutput};
