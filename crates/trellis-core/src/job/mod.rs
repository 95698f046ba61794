//! Job-level assembly.
//!
//! - [`config`] - Immutable job configuration
//! - [`builder`] - The [`JobBuilder`] façade over [`Plan`](crate::plan::Plan)
//! - [`request`] - The finished [`JobRequest`] and its wire frame

pub mod builder;
pub mod config;
pub mod request;

pub use builder::JobBuilder;
pub use config::JobConfig;
pub use request::JobRequest;
