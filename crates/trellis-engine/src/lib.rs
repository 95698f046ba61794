//! # trellis-engine
//!
//! Lowers step traversals into dataflow jobs.
//!
//! ## Modules
//!
//! - [`config`] - Lowering options
//! - [`lower`] - Step resource registry, translator, and tag allocation
//!
//! ```
//! use trellis_adapters::traversal::{By, Predicate, Route, Token, Traversal};
//! use trellis_common::types::JobId;
//! use trellis_core::JobConfig;
//!
//! let traversal = Traversal::v()
//!     .has("age", Predicate::Gt(17i64.into()))
//!     .repartition(Route::Id)
//!     .group_count(Some(By::Token(Token::Label)));
//! let request = trellis_engine::lower(&traversal, JobConfig::new(JobId::new(1))).unwrap();
//! assert_eq!(request.operators().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod lower;

pub use config::LoweringOptions;
pub use lower::{Translator, lower};
