//! Pipeline module.
//!
//! Stage 1 ([`explore`]) and Stage 2 ([`Pipeline`]) orchestration.

mod builder;
mod explore;

pub use builder::{Pipeline, PipelineBuilder};
pub use explore::explore;
