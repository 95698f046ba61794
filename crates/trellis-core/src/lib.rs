//! # trellis-core
//!
//! The dataflow plan model consumed by the distributed execution runtime,
//! and the builder that assembles it.
//!
//! This crate depends only on `trellis-common`. It never looks inside the
//! opaque resource payloads it carries; those are produced by the step
//! serialization layer and interpreted by the runtime.
//!
//! ## Modules
//!
//! - [`plan`] - Channels, operators, nested task plans, sinks, and the fusion rules
//! - [`job`] - Job configuration, the [`JobBuilder`] façade, and the finished [`JobRequest`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod job;
pub mod plan;

// Re-export commonly used types
pub use job::{JobBuilder, JobConfig, JobRequest};
pub use plan::{
    AccumKind, Channel, FoldOp, GroupByOp, IterateOp, LeftJoin, OpKind, OperatorDef, Plan, Scope,
    SinkDef, SinkKind, SubtaskOp, TaskPlan, UnionOp,
};
