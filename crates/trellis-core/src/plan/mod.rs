//! Dataflow plan representation.
//!
//! A [`Plan`] is an ordered operator list under construction. It is a plain
//! value: appending returns the next state, and the fusion rule is a pure
//! function of `(Plan, OperatorDef)`. Finalizing a plan applies the sink rule
//! and freezes it into a [`TaskPlan`] (for nested bodies) or into the operator
//! list of a [`JobRequest`](crate::job::JobRequest).
//!
//! ## Submodules
//!
//! - [`channel`] - Inbound routing strategies
//! - [`operator`] - Operator kinds and their payloads
//! - [`fusion`] - Shuffle fusion and unfold chaining
//! - [`sink`] - Sink descriptors and reduce-sink fusion
//! - [`task`] - Frozen nested plans
//! - [`explain`] - Human-readable plan rendering

pub mod channel;
pub mod explain;
pub mod fusion;
pub mod operator;
pub mod sink;
pub mod task;

pub use channel::Channel;
pub use operator::{
    AccumKind, DedupOp, FoldOp, GroupByOp, IterateOp, LeftJoin, LimitOp, OpKind, OperatorDef,
    OrderByOp, Scope, SubtaskOp, UnionOp,
};
pub use sink::{SinkDef, SinkKind};
pub use task::TaskPlan;

use bytes::Bytes;

/// An operator list under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    ops: Vec<OperatorDef>,
}

impl Plan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of operators, pending shuffles included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns the operators appended so far.
    #[must_use]
    pub fn operators(&self) -> &[OperatorDef] {
        &self.ops
    }

    /// Returns the last operator, if any.
    #[must_use]
    pub fn last(&self) -> Option<&OperatorDef> {
        self.ops.last()
    }

    /// Appends an operator, applying channel fusion.
    #[must_use]
    pub fn append(self, op: OperatorDef) -> Self {
        fusion::fuse(self, op)
    }

    /// Attaches an unfold instruction to a trailing reduce, or appends a
    /// `FlatMap` when there is none.
    #[must_use]
    pub fn chain_unfold(self, resource: Bytes) -> Self {
        fusion::chain_unfold(self, resource)
    }

    /// Finalizes the plan, applying reduce-sink fusion.
    #[must_use]
    pub fn gen_sink(self) -> (Vec<OperatorDef>, SinkDef) {
        sink::split_sink(self.ops)
    }

    /// Finalizes the plan as a nested body.
    #[must_use]
    pub fn into_task(self) -> TaskPlan {
        let (plan, sink) = self.gen_sink();
        TaskPlan { plan, sink }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_plan_finalizes() {
        let task = Plan::new().into_task();
        assert!(task.is_empty());
        assert!(!task.sink.is_reduce());
    }

    #[test]
    fn test_append_is_value_semantics() {
        let base = Plan::new().append(OperatorDef::pipeline(OpKind::Map(Bytes::new())));
        let extended = base
            .clone()
            .append(OperatorDef::pipeline(OpKind::Filter(Bytes::new())));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
    }

    #[test]
    fn test_gen_sink_moves_fold() {
        let plan = Plan::new()
            .append(OperatorDef::pipeline(OpKind::Map(Bytes::new())))
            .append(OperatorDef::pipeline(OpKind::Fold(FoldOp {
                scope: Scope::Global,
                accum: AccumKind::ToList,
                resource: None,
                unfold: None,
            })));
        let (ops, sink) = plan.gen_sink();
        assert_eq!(ops.len(), 1);
        assert_eq!(sink.name(), "SinkFold");
    }
}
