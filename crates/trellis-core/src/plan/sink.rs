//! Sink descriptors and reduce-sink fusion.
//!
//! Finalizing a plan produces a [`SinkDef`]. When the plan ends in a
//! `GroupBy` or `Fold`, that operator is removed from the operator list and
//! stored in the sink instead of being followed by a separate emit step.

use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::operator::{FoldOp, GroupByOp, OpKind, OperatorDef};

/// What the sink does with the records that reach it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SinkKind {
    /// Emit records as they arrive.
    #[default]
    Emit,
    /// Finish with the absorbed `GroupBy`.
    GroupBy(GroupByOp),
    /// Finish with the absorbed `Fold`.
    Fold(FoldOp),
}

/// Terminal descriptor of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SinkDef {
    /// Inbound routing of the sink.
    pub channel: Channel,
    /// Sink behavior.
    pub kind: SinkKind,
}

impl SinkDef {
    /// Returns true if the sink absorbed a reduce operator.
    #[must_use]
    pub fn is_reduce(&self) -> bool {
        !matches!(self.kind, SinkKind::Emit)
    }

    /// Returns a human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind {
            SinkKind::Emit => "Emit",
            SinkKind::GroupBy(_) => "SinkGroupBy",
            SinkKind::Fold(_) => "SinkFold",
        }
    }

    /// Returns the absorbed reduce operator as a regular operator node.
    #[must_use]
    pub fn reduce_operator(&self) -> Option<OperatorDef> {
        let op = match &self.kind {
            SinkKind::Emit => return None,
            SinkKind::GroupBy(group) => OpKind::GroupBy(group.clone()),
            SinkKind::Fold(fold) => OpKind::Fold(fold.clone()),
        };
        Some(OperatorDef {
            channel: self.channel.clone(),
            op,
        })
    }
}

/// Splits a finished operator list into its body and sink.
///
/// - A trailing `GroupBy`/`Fold` is moved into the sink, keeping its channel.
/// - A trailing bare shuffle becomes the sink's inbound channel.
/// - Otherwise the sink emits through a pipeline channel.
pub(crate) fn split_sink(mut ops: Vec<OperatorDef>) -> (Vec<OperatorDef>, SinkDef) {
    let absorbs = ops.last().is_some_and(|last| last.is_reduce() || last.is_shuffle());
    if !absorbs {
        return (ops, SinkDef::default());
    }

    let Some(last) = ops.pop() else {
        return (ops, SinkDef::default());
    };
    let kind = match last.op {
        OpKind::GroupBy(group) => SinkKind::GroupBy(group),
        OpKind::Fold(fold) => SinkKind::Fold(fold),
        _ => SinkKind::Emit,
    };
    let sink = SinkDef {
        channel: last.channel,
        kind,
    };
    tracing::debug!(
        channel = sink.channel.name(),
        sink = sink.name(),
        "absorbed trailing operator into sink"
    );
    (ops, sink)
}
