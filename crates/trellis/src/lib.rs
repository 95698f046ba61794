//! # Trellis
//!
//! Turns step-based graph traversals into dataflow jobs for a distributed
//! runtime.
//!
//! Start with [`lower`]: hand it a [`Traversal`] and a [`JobConfig`] and you
//! get back a [`JobRequest`], the unit the runtime executes. Use a
//! [`Translator`] when you need non-default [`LoweringOptions`], a custom
//! [`StepEncoder`], or parallel batch lowering.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis::{By, JobConfig, JobId, Traversal};
//! use trellis::traversal::{Predicate, Route, Token};
//!
//! let traversal = Traversal::v()
//!     .has("age", Predicate::Gt(17i64.into()))
//!     .repartition(Route::Id)
//!     .group_count(Some(By::Token(Token::Label)));
//!
//! let request = trellis::lower(&traversal, JobConfig::new(JobId::new(1)))?;
//! println!("{request}");
//!
//! // Ship it.
//! let frame = request.encode_frame()?;
//! assert_eq!(trellis::JobRequest::decode_frame(&frame)?, request);
//! # Ok::<(), trellis::Error>(())
//! ```

// Lowering entry points
pub use trellis_engine::{LoweringOptions, Translator, lower};

// The plan model - what lowering produces
pub use trellis_core::{
    AccumKind, Channel, JobBuilder, JobConfig, JobRequest, OpKind, OperatorDef, Scope, SinkDef,
    SinkKind, TaskPlan,
};

// The step model - what lowering consumes
pub use trellis_adapters::{BincodeStepEncoder, By, StepDescriptor, StepEncoder, Step, Traversal};

// Identifiers, values, and errors
pub use trellis_common::{Error, JobId, Result, TagId, Value, WorkerId};

/// Traversal steps, predicates, and modulators.
pub mod traversal {
    pub use trellis_adapters::traversal::*;
}

/// The dataflow plan model.
pub mod plan {
    pub use trellis_core::plan::*;
}
