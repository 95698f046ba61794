//! Channel fusion.
//!
//! The shuffle builder methods append a bare shuffle node that carries only a
//! channel. The next appended operator absorbs it:
//!
//! ```text
//! [.., Shuffle(Exchange k)] + Filter(Pipeline)  =>  [.., Filter(Exchange k)]
//! [.., Shuffle(Exchange k)] + Shuffle(Aggregate) =>  [.., Shuffle(Aggregate)]
//! ```
//!
//! Only the immediately preceding node is ever inspected.

use bytes::Bytes;

use super::Plan;
use super::operator::{OpKind, OperatorDef};

/// Appends `next` to `plan`, fusing a preceding bare shuffle into it.
#[must_use]
pub fn fuse(plan: Plan, mut next: OperatorDef) -> Plan {
    let mut ops = plan.ops;
    if ops.last().is_some_and(OperatorDef::is_shuffle) {
        if let Some(shuffle) = ops.pop() {
            if next.is_shuffle() {
                tracing::debug!(
                    dropped = shuffle.channel.name(),
                    kept = next.channel.name(),
                    "collapsed consecutive shuffles"
                );
            } else if next.channel.is_pipeline() {
                tracing::debug!(
                    channel = shuffle.channel.name(),
                    op = next.op.name(),
                    "fused shuffle into operator"
                );
                next.channel = shuffle.channel;
            } else {
                tracing::warn!(
                    pending = shuffle.channel.name(),
                    explicit = next.channel.name(),
                    op = next.op.name(),
                    "explicit channel overrides pending shuffle"
                );
            }
        }
    }
    ops.push(next);
    Plan { ops }
}

/// Attaches an unfold instruction to a trailing reduce operator.
///
/// If the plan ends in a `GroupBy` or `Fold` that has no unfold instruction
/// yet, `resource` becomes that instruction. Otherwise a `FlatMap(resource)`
/// is appended through [`fuse`].
#[must_use]
pub fn chain_unfold(plan: Plan, resource: Bytes) -> Plan {
    let mut plan = plan;
    if let Some(last) = plan.ops.last_mut() {
        let slot = match &mut last.op {
            OpKind::GroupBy(group) => Some(&mut group.unfold),
            OpKind::Fold(fold) => Some(&mut fold.unfold),
            _ => None,
        };
        if let Some(slot) = slot.filter(|slot| slot.is_none()) {
            *slot = Some(resource);
            tracing::debug!(op = last.op.name(), "chained unfold onto reduce operator");
            return plan;
        }
    }
    fuse(plan, OperatorDef::pipeline(OpKind::FlatMap(resource)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::channel::Channel;
    use crate::plan::operator::{AccumKind, FoldOp, GroupByOp, Scope};
    use proptest::prelude::*;
    use trellis_common::types::WorkerId;

    fn filter(tag: &'static [u8]) -> OperatorDef {
        OperatorDef::pipeline(OpKind::Filter(Bytes::from_static(tag)))
    }

    fn group_by() -> OperatorDef {
        OperatorDef::pipeline(OpKind::GroupBy(GroupByOp {
            scope: Scope::Global,
            accum: AccumKind::Count,
            key_extractor: Bytes::from_static(b"label"),
            unfold: None,
        }))
    }

    #[test]
    fn test_shuffle_fuses_into_next() {
        let route = Bytes::from_static(b"id");
        let plan = fuse(Plan::new(), filter(b"a"));
        let plan = fuse(plan, OperatorDef::shuffle(Channel::Exchange(route.clone())));
        let plan = fuse(plan, group_by());

        assert_eq!(plan.len(), 2);
        assert!(plan.operators()[0].channel.is_pipeline());
        assert_eq!(plan.operators()[1].channel, Channel::Exchange(route));
        assert_eq!(plan.operators()[1].op.name(), "GroupBy");
    }

    #[test]
    fn test_consecutive_shuffles_keep_last() {
        let plan = fuse(Plan::new(), OperatorDef::shuffle(Channel::Broadcast(None)));
        let plan = fuse(
            plan,
            OperatorDef::shuffle(Channel::Aggregate(WorkerId::new(0))),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(
            plan.operators()[0].channel,
            Channel::Aggregate(WorkerId::new(0))
        );
    }

    #[test]
    fn test_fusion_never_looks_further_back() {
        let plan = fuse(Plan::new(), OperatorDef::shuffle(Channel::Broadcast(None)));
        let plan = fuse(plan, filter(b"a"));
        let plan = fuse(plan, filter(b"b"));
        assert_eq!(plan.operators()[0].channel, Channel::Broadcast(None));
        assert!(plan.operators()[1].channel.is_pipeline());
    }

    #[test]
    fn test_explicit_channel_wins() {
        let plan = fuse(Plan::new(), OperatorDef::shuffle(Channel::Broadcast(None)));
        let explicit = OperatorDef {
            channel: Channel::Aggregate(WorkerId::new(3)),
            op: OpKind::Map(Bytes::new()),
        };
        let plan = fuse(plan, explicit.clone());
        assert_eq!(plan.operators(), &[explicit]);
    }

    #[test]
    fn test_chain_unfold_attaches_to_reduce() {
        let plan = fuse(Plan::new(), group_by());
        let plan = chain_unfold(plan, Bytes::from_static(b"unfold"));
        assert_eq!(plan.len(), 1);
        match &plan.operators()[0].op {
            OpKind::GroupBy(group) => {
                assert_eq!(group.unfold, Some(Bytes::from_static(b"unfold")));
            }
            other => panic!("expected GroupBy, got {}", other.name()),
        }
    }

    #[test]
    fn test_chain_unfold_appends_flat_map() {
        let plan = fuse(Plan::new(), filter(b"a"));
        let plan = chain_unfold(plan, Bytes::from_static(b"unfold"));
        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.operators()[1].op,
            OpKind::FlatMap(Bytes::from_static(b"unfold"))
        );

        // A reduce that already unfolds is not modified twice.
        let fold = OperatorDef::pipeline(OpKind::Fold(FoldOp {
            scope: Scope::Global,
            accum: AccumKind::ToList,
            resource: None,
            unfold: Some(Bytes::from_static(b"first")),
        }));
        let plan = fuse(Plan::new(), fold.clone());
        let plan = chain_unfold(plan, Bytes::from_static(b"second"));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.operators()[0], fold);
    }

    #[derive(Debug, Clone)]
    enum Call {
        Op,
        Reduce,
        Exchange,
        Broadcast,
        Aggregate,
    }

    fn call() -> impl Strategy<Value = Call> {
        prop_oneof![
            Just(Call::Op),
            Just(Call::Reduce),
            Just(Call::Exchange),
            Just(Call::Broadcast),
            Just(Call::Aggregate),
        ]
    }

    fn apply(calls: &[Call]) -> Plan {
        calls.iter().fold(Plan::new(), |plan, call| {
            let next = match call {
                Call::Op => filter(b"f"),
                Call::Reduce => group_by(),
                Call::Exchange => OperatorDef::shuffle(Channel::Exchange(Bytes::from_static(b"k"))),
                Call::Broadcast => OperatorDef::shuffle(Channel::Broadcast(None)),
                Call::Aggregate => OperatorDef::shuffle(Channel::Aggregate(WorkerId::new(0))),
            };
            fuse(plan, next)
        })
    }

    proptest! {
        #[test]
        fn prop_no_bare_shuffle_after_finalize(calls in prop::collection::vec(call(), 0..32)) {
            let task = apply(&calls).into_task();
            prop_assert!(task.plan.iter().all(|op| !op.is_shuffle()));
        }

        #[test]
        fn prop_at_most_trailing_shuffle_before_finalize(calls in prop::collection::vec(call(), 0..32)) {
            let plan = apply(&calls);
            let n = plan.len();
            for (i, op) in plan.operators().iter().enumerate() {
                prop_assert!(!op.is_shuffle() || i + 1 == n);
            }
        }

        #[test]
        fn prop_sink_absorbs_trailing_reduce(calls in prop::collection::vec(call(), 0..32)) {
            let mut calls = calls;
            calls.push(Call::Reduce);
            let plan = apply(&calls);
            let before = plan.len();
            let task = plan.into_task();
            prop_assert_eq!(task.plan.len() + 1, before);
            prop_assert!(task.sink.is_reduce());
        }
    }
}
