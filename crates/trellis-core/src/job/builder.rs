//! The job builder façade.
//!
//! [`JobBuilder`] owns a [`Plan`] and exposes one append method per operator
//! kind. Nested bodies are built with [`JobBuilder::nested`], frozen with
//! [`JobBuilder::into_task`], and handed to the parent by value, so a parent
//! never holds a reference into a builder that can still change.
//!
//! ```
//! use bytes::Bytes;
//! use trellis_common::types::JobId;
//! use trellis_core::job::{JobBuilder, JobConfig};
//! use trellis_core::plan::{AccumKind, Scope};
//!
//! let mut body = JobBuilder::nested();
//! body.flat_map(Bytes::from_static(b"out"));
//!
//! let mut job = JobBuilder::new(JobConfig::new(JobId::new(1)));
//! job.add_source(Bytes::from_static(b"V()"))
//!     .repeat(2, body.into_task())
//!     .exchange(Bytes::from_static(b"label"))
//!     .group_by(Scope::Global, AccumKind::Count, Bytes::from_static(b"key"));
//! let request = job.build().unwrap();
//! assert_eq!(request.plan().len(), 1);
//! assert!(request.sink().is_reduce());
//! ```

use bytes::Bytes;
use trellis_common::types::WorkerId;
use trellis_common::utils::error::{Error, Result};

use super::config::JobConfig;
use super::request::JobRequest;
use crate::plan::{
    AccumKind, Channel, DedupOp, FoldOp, GroupByOp, IterateOp, LeftJoin, LimitOp, OpKind,
    OperatorDef, OrderByOp, Plan, Scope, SubtaskOp, TaskPlan, UnionOp,
};

/// Accumulates the operators of one job or one nested body.
#[derive(Debug, Default)]
pub struct JobBuilder {
    /// `None` for nested bodies, which can only be frozen into a [`TaskPlan`].
    config: Option<JobConfig>,
    source: Bytes,
    plan: Plan,
}

impl JobBuilder {
    /// Creates a top-level builder.
    #[must_use]
    pub fn new(config: JobConfig) -> Self {
        Self {
            config: Some(config),
            source: Bytes::new(),
            plan: Plan::new(),
        }
    }

    /// Creates a builder for a nested body (loop body, fork, union branch).
    #[must_use]
    pub fn nested() -> Self {
        Self::default()
    }

    /// Returns true if this builder produces a nested body.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.config.is_none()
    }

    /// Returns the plan built so far.
    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Sets the opaque source payload.
    pub fn add_source(&mut self, source: Bytes) -> &mut Self {
        self.source = source;
        self
    }

    fn push(&mut self, op: OperatorDef) -> &mut Self {
        self.plan = std::mem::take(&mut self.plan).append(op);
        self
    }

    fn push_op(&mut self, op: OpKind) -> &mut Self {
        self.push(OperatorDef::pipeline(op))
    }

    /// Appends a one-to-one map.
    pub fn map(&mut self, resource: Bytes) -> &mut Self {
        self.push_op(OpKind::Map(resource))
    }

    /// Appends a one-to-many map.
    pub fn flat_map(&mut self, resource: Bytes) -> &mut Self {
        self.push_op(OpKind::FlatMap(resource))
    }

    /// Appends a filter.
    pub fn filter(&mut self, resource: Bytes) -> &mut Self {
        self.push_op(OpKind::Filter(resource))
    }

    /// Appends a limit.
    pub fn limit(&mut self, scope: Scope, n: u64) -> &mut Self {
        self.push_op(OpKind::Limit(LimitOp { scope, n }))
    }

    /// Appends a counting fold.
    pub fn count(&mut self, scope: Scope) -> &mut Self {
        self.push_op(OpKind::Fold(FoldOp {
            scope,
            accum: AccumKind::Count,
            resource: None,
            unfold: None,
        }))
    }

    /// Appends a fold collecting records into a list.
    pub fn fold(&mut self, scope: Scope) -> &mut Self {
        self.push_op(OpKind::Fold(FoldOp {
            scope,
            accum: AccumKind::ToList,
            resource: None,
            unfold: None,
        }))
    }

    /// Appends a fold with an encoded custom accumulator.
    pub fn fold_custom(&mut self, scope: Scope, resource: Bytes) -> &mut Self {
        self.push_op(OpKind::Fold(FoldOp {
            scope,
            accum: AccumKind::Custom,
            resource: Some(resource),
            unfold: None,
        }))
    }

    /// Appends a dedup, keyed by `key` when given.
    pub fn dedup(&mut self, scope: Scope, key: Option<Bytes>) -> &mut Self {
        self.push_op(OpKind::Dedup(DedupOp {
            scope,
            resource: key,
        }))
    }

    /// Appends a full sort.
    pub fn sort_by(&mut self, scope: Scope, comparator: Bytes) -> &mut Self {
        self.push_op(OpKind::OrderBy(OrderByOp {
            scope,
            limit: None,
            comparator,
        }))
    }

    /// Appends a top-k sort.
    pub fn top_by(&mut self, scope: Scope, limit: u64, comparator: Bytes) -> &mut Self {
        self.push_op(OpKind::OrderBy(OrderByOp {
            scope,
            limit: Some(limit),
            comparator,
        }))
    }

    /// Appends a group-by.
    pub fn group_by(&mut self, scope: Scope, accum: AccumKind, key_extractor: Bytes) -> &mut Self {
        self.push_op(OpKind::GroupBy(GroupByOp {
            scope,
            accum,
            key_extractor,
            unfold: None,
        }))
    }

    /// Appends a loop running `body` at most `times` times.
    pub fn repeat(&mut self, times: u32, body: TaskPlan) -> &mut Self {
        self.push_op(OpKind::Iterate(IterateOp {
            max_iters: times,
            until: None,
            body,
        }))
    }

    /// Appends a loop running `body` until `until` passes, at most `max_iters` times.
    pub fn repeat_until(&mut self, max_iters: u32, until: Bytes, body: TaskPlan) -> &mut Self {
        self.push_op(OpKind::Iterate(IterateOp {
            max_iters,
            until: Some(until),
            body,
        }))
    }

    /// Appends a forked sub-task whose output is discarded.
    pub fn fork(&mut self, body: TaskPlan) -> &mut Self {
        self.push_op(OpKind::Subtask(SubtaskOp { body, join: None }))
    }

    /// Appends a forked sub-task whose output is joined back by `joiner`.
    pub fn fork_join(&mut self, joiner: Bytes, body: TaskPlan) -> &mut Self {
        self.push_op(OpKind::Subtask(SubtaskOp {
            body,
            join: Some(LeftJoin { joiner }),
        }))
    }

    /// Appends a union of branches.
    pub fn union(&mut self, branches: Vec<TaskPlan>) -> &mut Self {
        self.push_op(OpKind::Union(UnionOp { branches }))
    }

    /// Repartitions the next operator's input by `route`.
    pub fn exchange(&mut self, route: Bytes) -> &mut Self {
        self.push(OperatorDef::shuffle(Channel::Exchange(route)))
    }

    /// Replicates the next operator's input to every worker.
    pub fn broadcast(&mut self) -> &mut Self {
        self.push(OperatorDef::shuffle(Channel::Broadcast(None)))
    }

    /// Replicates the next operator's input to the workers selected by `route`.
    pub fn broadcast_by(&mut self, route: Bytes) -> &mut Self {
        self.push(OperatorDef::shuffle(Channel::Broadcast(Some(route))))
    }

    /// Gathers the next operator's input on `target`.
    pub fn aggregate(&mut self, target: WorkerId) -> &mut Self {
        self.push(OperatorDef::shuffle(Channel::Aggregate(target)))
    }

    /// Attaches an unfold to a trailing `GroupBy`/`Fold`, or appends a `FlatMap`.
    pub fn chain_unfold(&mut self, resource: Bytes) -> &mut Self {
        self.plan = std::mem::take(&mut self.plan).chain_unfold(resource);
        self
    }

    /// Freezes a nested builder into a [`TaskPlan`], applying the sink rule.
    #[must_use]
    pub fn into_task(self) -> TaskPlan {
        self.plan.into_task()
    }

    /// Finalizes a top-level builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when called on a nested builder.
    pub fn build(self) -> Result<JobRequest> {
        let Some(config) = self.config else {
            return Err(Error::invalid_config(
                "build() is only valid on a top-level job builder",
            ));
        };
        let (plan, sink) = self.plan.gen_sink();
        tracing::debug!(
            job = %config.job_id(),
            operators = plan.len(),
            sink = sink.name(),
            "built job request"
        );
        Ok(JobRequest::new(config, self.source, plan, sink))
    }
}
