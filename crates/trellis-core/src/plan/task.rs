//! Finalized nested plans.

use serde::{Deserialize, Serialize};

use super::operator::OperatorDef;
use super::sink::SinkDef;

/// A finalized operator list embedded inside another operator (loop body,
/// fork body, or union branch).
///
/// A `TaskPlan` is exclusively owned by the operator that contains it. The
/// lowering path produces one by finalizing a [`Plan`](super::Plan), so its
/// operator list carries no bare shuffle. Values assembled by hand, including
/// [`TaskPlan::default`] (an empty body with an emit sink), are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskPlan {
    /// Operators in execution order.
    pub plan: Vec<OperatorDef>,
    /// Terminal descriptor of the body.
    pub sink: SinkDef,
}

impl TaskPlan {
    /// Returns the number of operators, excluding the sink.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plan.len()
    }

    /// Returns true if the body has no operators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Returns the operators.
    #[must_use]
    pub fn operators(&self) -> &[OperatorDef] {
        &self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Plan, SinkKind};

    #[test]
    fn test_default_is_empty_finalized_body() {
        let body = TaskPlan::default();
        assert!(body.is_empty());
        assert_eq!(body.sink.kind, SinkKind::Emit);
        assert_eq!(body, Plan::default().into_task());
    }
}
