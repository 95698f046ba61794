//! Core type definitions for Trellis.
//!
//! - Identifier types ([`JobId`], [`WorkerId`], [`TagId`])
//! - Scalar literals carried inside traversal steps ([`Value`])

mod id;
mod value;

pub use id::{JobId, TagId, WorkerId};
pub use value::Value;
