//! # trellis-adapters
//!
//! The boundary between the lowering pass and its collaborators: the step
//! model handed over by the traversal parser, and the step serialization
//! contract that turns a resolved step into an opaque operator payload.
//!
//! ## Modules
//!
//! - [`traversal`] - Traversals, steps, predicates, and `by` modulators
//! - [`encoding`] - Step descriptors and the [`StepEncoder`] contract

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod encoding;
pub mod traversal;

pub use encoding::{BincodeStepEncoder, StepDescriptor, StepEncoder};
pub use traversal::{By, Source, Step, StepKind, Traversal};
