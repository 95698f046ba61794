//! Operator definitions.
//!
//! An [`OperatorDef`] pairs one inbound [`Channel`] with an [`OpKind`]. Operator
//! kinds whose semantics are step-specific carry an opaque resource payload
//! that this crate copies but never inspects.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::task::TaskPlan;

/// Whether an operator applies across the whole stream or within each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scope {
    /// Applies to the entire stream.
    #[default]
    Global,
    /// Applies to the collection held by each record.
    Local,
}

/// Accumulator of a reduce operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccumKind {
    /// Count the records.
    Count,
    /// Collect the records into a list.
    ToList,
    /// Accumulate with the function encoded in the operator's resource.
    Custom,
}

impl AccumKind {
    /// Returns a human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::ToList => "to_list",
            Self::Custom => "custom",
        }
    }
}

/// Keep at most `n` records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOp {
    /// Stream or per-record limit.
    pub scope: Scope,
    /// Number of records to keep.
    pub n: u64,
}

/// Reduce the stream into one value per scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldOp {
    /// Reduction scope.
    pub scope: Scope,
    /// Accumulator.
    pub accum: AccumKind,
    /// Custom accumulator payload; required iff `accum` is [`AccumKind::Custom`].
    pub resource: Option<Bytes>,
    /// Unfold instruction applied to the reduced value, set by `chain_unfold`.
    pub unfold: Option<Bytes>,
}

/// Remove duplicate records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupOp {
    /// Dedup scope.
    pub scope: Scope,
    /// Optional key extractor; whole records are compared when absent.
    pub resource: Option<Bytes>,
}

/// Sort records, optionally keeping only the first `limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByOp {
    /// Sort scope.
    pub scope: Scope,
    /// Top-k bound, set by `top_by`.
    pub limit: Option<u64>,
    /// Encoded comparator.
    pub comparator: Bytes,
}

/// Group records by a key and reduce each group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupByOp {
    /// Grouping scope.
    pub scope: Scope,
    /// Accumulator applied to every group.
    pub accum: AccumKind,
    /// Encoded key extractor together with the value accumulation.
    pub key_extractor: Bytes,
    /// Unfold instruction applied to the grouped map, set by `chain_unfold`.
    pub unfold: Option<Bytes>,
}

/// Bounded iteration over a nested body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterateOp {
    /// Upper bound on the number of iterations.
    pub max_iters: u32,
    /// Filter evaluated once per iteration; passing records leave the loop.
    pub until: Option<Bytes>,
    /// Loop body.
    pub body: TaskPlan,
}

/// Join instruction merging a subtask's output back into the parent stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftJoin {
    /// Encoded joiner.
    pub joiner: Bytes,
}

/// A forked sub-task, optionally joined back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskOp {
    /// Forked body.
    pub body: TaskPlan,
    /// `Some` for fork-join, `None` for fire-and-forget forks.
    pub join: Option<LeftJoin>,
}

/// Side-by-side branches whose outputs are merged, in no particular order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionOp {
    /// Branch bodies.
    pub branches: Vec<TaskPlan>,
}

/// The kind of a dataflow operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    /// One output per input.
    Map(Bytes),
    /// Zero or more outputs per input.
    FlatMap(Bytes),
    /// Keep inputs that pass the encoded predicate.
    Filter(Bytes),
    /// Keep at most `n` records.
    Limit(LimitOp),
    /// Reduce to a single value.
    Fold(FoldOp),
    /// Remove duplicates.
    Dedup(DedupOp),
    /// Sort, optionally top-k.
    OrderBy(OrderByOp),
    /// Group and reduce.
    GroupBy(GroupByOp),
    /// Bounded loop.
    Iterate(IterateOp),
    /// Forked sub-task.
    Subtask(SubtaskOp),
    /// Union of branches.
    Union(UnionOp),
    /// Channel-only marker produced by the shuffle builder methods. Never
    /// survives finalization: fusion merges it into the following operator
    /// or into the sink.
    Shuffle,
}

impl OpKind {
    /// Returns a human-readable name for the operator kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Map(_) => "Map",
            Self::FlatMap(_) => "FlatMap",
            Self::Filter(_) => "Filter",
            Self::Limit(_) => "Limit",
            Self::Fold(_) => "Fold",
            Self::Dedup(_) => "Dedup",
            Self::OrderBy(_) => "OrderBy",
            Self::GroupBy(_) => "GroupBy",
            Self::Iterate(_) => "Iterate",
            Self::Subtask(_) => "Subtask",
            Self::Union(_) => "Union",
            Self::Shuffle => "Shuffle",
        }
    }

    /// Returns true for the reduce operators that the sink can absorb.
    #[must_use]
    pub fn is_reduce(&self) -> bool {
        matches!(self, Self::GroupBy(_) | Self::Fold(_))
    }

    /// Returns the nested task plans owned by this operator.
    #[must_use]
    pub fn bodies(&self) -> Vec<&TaskPlan> {
        match self {
            Self::Iterate(it) => vec![&it.body],
            Self::Subtask(sub) => vec![&sub.body],
            Self::Union(union) => union.branches.iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// One node of a plan: an operator and its inbound channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDef {
    /// Inbound routing.
    pub channel: Channel,
    /// The operator.
    pub op: OpKind,
}

impl OperatorDef {
    /// Creates an operator fed through a [`Channel::Pipeline`].
    #[must_use]
    pub fn pipeline(op: OpKind) -> Self {
        Self {
            channel: Channel::Pipeline,
            op,
        }
    }

    /// Creates a bare shuffle node carrying only a channel.
    #[must_use]
    pub fn shuffle(channel: Channel) -> Self {
        Self {
            channel,
            op: OpKind::Shuffle,
        }
    }

    /// Returns true if this node is a bare shuffle awaiting fusion.
    #[must_use]
    pub fn is_shuffle(&self) -> bool {
        matches!(self.op, OpKind::Shuffle)
    }

    /// Returns true if this node is a `GroupBy` or `Fold`.
    #[must_use]
    pub fn is_reduce(&self) -> bool {
        self.op.is_reduce()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_marker() {
        let node = OperatorDef::shuffle(Channel::Broadcast(None));
        assert!(node.is_shuffle());
        assert!(!node.is_reduce());
        assert_eq!(node.op.name(), "Shuffle");
    }

    #[test]
    fn test_reduce_kinds() {
        let fold = OpKind::Fold(FoldOp {
            scope: Scope::Global,
            accum: AccumKind::Count,
            resource: None,
            unfold: None,
        });
        assert!(fold.is_reduce());
        assert!(!OpKind::Map(Bytes::new()).is_reduce());
    }

    #[test]
    fn test_bodies() {
        let union = OpKind::Union(UnionOp {
            branches: vec![TaskPlan::default(), TaskPlan::default()],
        });
        assert_eq!(union.bodies().len(), 2);
        assert!(OpKind::Filter(Bytes::new()).bodies().is_empty());
    }
}
