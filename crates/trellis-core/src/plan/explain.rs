//! Tree rendering of plans for `EXPLAIN`-style output.
//!
//! ```text
//! Filter [Pipeline] 12B
//! Iterate [Pipeline] max_iters=3
//! │  ├─ FlatMap [Exchange[4B]] 9B
//! │  └─ Emit [Pipeline]
//! └─ SinkGroupBy [Exchange[4B]] count
//! ```

use std::fmt;

use super::operator::{OpKind, OperatorDef, Scope};
use super::sink::{SinkDef, SinkKind};
use super::task::TaskPlan;

/// Displays an operator list and its sink as a tree.
pub struct PlanDisplay<'a> {
    ops: &'a [OperatorDef],
    sink: &'a SinkDef,
}

impl<'a> PlanDisplay<'a> {
    /// Creates a display over the given operators and sink.
    #[must_use]
    pub fn new(ops: &'a [OperatorDef], sink: &'a SinkDef) -> Self {
        Self { ops, sink }
    }

    fn fmt_level(
        f: &mut fmt::Formatter<'_>,
        ops: &[OperatorDef],
        sink: &SinkDef,
        prefix: &str,
        nested: bool,
    ) -> fmt::Result {
        for op in ops {
            let connector = if nested { "├─ " } else { "" };
            writeln!(f, "{prefix}{connector}{}", describe(op))?;

            let bodies = op.op.bodies();
            let child_prefix = format!("{prefix}│  ");
            for (i, body) in bodies.iter().enumerate() {
                if bodies.len() > 1 {
                    writeln!(f, "{child_prefix}branch {i}:")?;
                }
                Self::fmt_level(f, &body.plan, &body.sink, &child_prefix, true)?;
            }
        }
        let connector = if nested { "└─ " } else { "" };
        writeln!(f, "{prefix}{connector}{}", describe_sink(sink))
    }
}

impl fmt::Display for PlanDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_level(f, self.ops, self.sink, "", false)
    }
}

impl fmt::Display for TaskPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PlanDisplay::new(&self.plan, &self.sink).fmt(f)
    }
}

fn scope(scope: Scope) -> &'static str {
    match scope {
        Scope::Global => "global",
        Scope::Local => "local",
    }
}

/// One-line description of an operator.
#[must_use]
pub fn describe(op: &OperatorDef) -> String {
    let head = format!("{} [{}]", op.op.name(), op.channel);
    let detail = match &op.op {
        OpKind::Map(res) | OpKind::FlatMap(res) | OpKind::Filter(res) => {
            format!("{}B", res.len())
        }
        OpKind::Limit(limit) => format!("{} n={}", scope(limit.scope), limit.n),
        OpKind::Fold(fold) => format!(
            "{} {}{}",
            scope(fold.scope),
            fold.accum.name(),
            if fold.unfold.is_some() { " +unfold" } else { "" }
        ),
        OpKind::Dedup(dedup) => format!(
            "{}{}",
            scope(dedup.scope),
            if dedup.resource.is_some() { " by key" } else { "" }
        ),
        OpKind::OrderBy(order) => match order.limit {
            Some(n) => format!("{} top={n}", scope(order.scope)),
            None => scope(order.scope).to_string(),
        },
        OpKind::GroupBy(group) => format!(
            "{} {}{}",
            scope(group.scope),
            group.accum.name(),
            if group.unfold.is_some() { " +unfold" } else { "" }
        ),
        OpKind::Iterate(it) => match it.until {
            Some(_) => format!("max_iters={} until", it.max_iters),
            None => format!("max_iters={}", it.max_iters),
        },
        OpKind::Subtask(sub) => match sub.join {
            Some(_) => "join".to_string(),
            None => "fork".to_string(),
        },
        OpKind::Union(union) => format!("{} branches", union.branches.len()),
        OpKind::Shuffle => String::new(),
    };
    if detail.is_empty() {
        head
    } else {
        format!("{head} {detail}")
    }
}

/// One-line description of a sink.
#[must_use]
pub fn describe_sink(sink: &SinkDef) -> String {
    match &sink.kind {
        SinkKind::Emit => format!("{} [{}]", sink.name(), sink.channel),
        SinkKind::GroupBy(group) => {
            format!("{} [{}] {}", sink.name(), sink.channel, group.accum.name())
        }
        SinkKind::Fold(fold) => {
            format!("{} [{}] {}", sink.name(), sink.channel, fold.accum.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::operator::{IterateOp, LimitOp};
    use crate::plan::{Channel, Plan};
    use bytes::Bytes;

    #[test]
    fn test_describe_limit() {
        let op = OperatorDef::pipeline(OpKind::Limit(LimitOp {
            scope: Scope::Local,
            n: 5,
        }));
        assert_eq!(describe(&op), "Limit [Pipeline] local n=5");
    }

    #[test]
    fn test_render_nested() {
        let body = Plan::new()
            .append(OperatorDef::shuffle(Channel::Exchange(Bytes::from_static(b"id"))))
            .append(OperatorDef::pipeline(OpKind::FlatMap(Bytes::from_static(b"out"))))
            .into_task();
        let plan = Plan::new()
            .append(OperatorDef::pipeline(OpKind::Iterate(IterateOp {
                max_iters: 2,
                until: None,
                body,
            })))
            .into_task();

        let rendered = plan.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Iterate [Pipeline] max_iters=2");
        assert_eq!(lines[1], "│  ├─ FlatMap [Exchange[2B]] 3B");
        assert_eq!(lines[2], "│  └─ Emit [Pipeline]");
        assert_eq!(lines[3], "Emit [Pipeline]");
    }
}
