//! The traversal model handed to the lowering pass.
//!
//! A [`Traversal`] is an optional source plus an ordered step list. Top-level
//! traversals start from a [`Source`]; nested ones (loop bodies, branches,
//! `by` modulators) are anonymous and continue from the parent's traverser.
//!
//! The fluent methods mirror how traversals are usually written:
//!
//! ```
//! use trellis_adapters::traversal::{By, Traversal};
//! use trellis_adapters::traversal::predicate::Predicate;
//!
//! let t = Traversal::v()
//!     .has("age", Predicate::Gt(17i64.into()))
//!     .out(&["knows"])
//!     .group_count(Some(By::key("name")));
//! assert_eq!(t.steps.len(), 3);
//! ```

pub mod predicate;
pub mod step;

use serde::{Deserialize, Serialize};
use trellis_common::types::{Value, WorkerId};
use trellis_core::plan::Scope;

pub use predicate::{Compare, Predicate};
pub use step::{By, Direction, Endpoint, Labels, Order, OrderKey, Route, Step, StepKind, Token};

/// Where a top-level traversal starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    /// `g.V(ids..)`; all vertices when empty.
    V(Vec<Value>),
    /// `g.E(ids..)`; all edges when empty.
    E(Vec<Value>),
}

/// A step traversal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Traversal {
    /// Start of a top-level traversal; `None` for anonymous ones.
    #[serde(default)]
    pub source: Option<Source>,
    /// Steps in declaration order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Traversal {
    /// `g.V()`.
    #[must_use]
    pub fn v() -> Self {
        Self::from_source(Source::V(Vec::new()))
    }

    /// `g.E()`.
    #[must_use]
    pub fn e() -> Self {
        Self::from_source(Source::E(Vec::new()))
    }

    /// Starts a top-level traversal at `source`.
    #[must_use]
    pub fn from_source(source: Source) -> Self {
        Self {
            source: Some(source),
            steps: Vec::new(),
        }
    }

    /// `__`: an anonymous traversal.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns true if this traversal has no source.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.source.is_none()
    }

    /// Appends an arbitrary step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Returns the number of steps, nested traversals included.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.steps
            .iter()
            .map(|s| 1 + s.nested().iter().map(|t| t.total_steps()).sum::<usize>())
            .sum()
    }

    fn labels(labels: &[&str]) -> Labels {
        labels.iter().map(|l| (*l).to_string()).collect()
    }

    /// `out(labels..)`.
    #[must_use]
    pub fn out(self, labels: &[&str]) -> Self {
        self.step(Step::Vertex {
            direction: Direction::Out,
            labels: Self::labels(labels),
        })
    }

    /// `in(labels..)`.
    #[must_use]
    pub fn in_(self, labels: &[&str]) -> Self {
        self.step(Step::Vertex {
            direction: Direction::In,
            labels: Self::labels(labels),
        })
    }

    /// `outE(labels..)`.
    #[must_use]
    pub fn out_e(self, labels: &[&str]) -> Self {
        self.step(Step::Edge {
            direction: Direction::Out,
            labels: Self::labels(labels),
        })
    }

    /// `has(key, predicate)`.
    #[must_use]
    pub fn has(self, key: impl Into<String>, predicate: Predicate) -> Self {
        self.step(Step::Has {
            key: key.into(),
            predicate,
        })
    }

    /// `hasLabel(labels..)`.
    #[must_use]
    pub fn has_label(self, labels: &[&str]) -> Self {
        self.step(Step::HasLabel(Self::labels(labels)))
    }

    /// `values(keys..)`.
    #[must_use]
    pub fn values(self, keys: &[&str]) -> Self {
        self.step(Step::Values(keys.iter().map(|k| (*k).to_string()).collect()))
    }

    /// `as(tag)`.
    #[must_use]
    pub fn as_(self, tag: impl Into<String>) -> Self {
        self.step(Step::As(tag.into()))
    }

    /// `select(tags..).by(..)`.
    #[must_use]
    pub fn select(self, tags: &[&str], by: Vec<By>) -> Self {
        self.step(Step::Select {
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            by,
        })
    }

    /// `count()`.
    #[must_use]
    pub fn count(self) -> Self {
        self.step(Step::Count)
    }

    /// `fold()`.
    #[must_use]
    pub fn fold(self) -> Self {
        self.step(Step::Fold)
    }

    /// `unfold()`.
    #[must_use]
    pub fn unfold(self) -> Self {
        self.step(Step::Unfold)
    }

    /// `dedup()`.
    #[must_use]
    pub fn dedup(self) -> Self {
        self.step(Step::Dedup {
            scope: Scope::Global,
            by: None,
        })
    }

    /// `limit(n)`.
    #[must_use]
    pub fn limit(self, n: u64) -> Self {
        self.step(Step::Limit {
            scope: Scope::Global,
            n,
        })
    }

    /// `order().by(..)`.
    #[must_use]
    pub fn order(self, keys: Vec<OrderKey>) -> Self {
        self.step(Step::Order {
            scope: Scope::Global,
            keys,
        })
    }

    /// `group().by(key).by(value)`.
    #[must_use]
    pub fn group(self, key: Option<By>, value: Option<By>) -> Self {
        self.step(Step::Group { key, value })
    }

    /// `groupCount().by(key)`.
    #[must_use]
    pub fn group_count(self, key: Option<By>) -> Self {
        self.step(Step::GroupCount { key })
    }

    /// `repeat(body).times(n)`.
    #[must_use]
    pub fn repeat_times(self, body: Traversal, times: u32) -> Self {
        self.step(Step::Repeat {
            body,
            times: Some(times),
            until: None,
        })
    }

    /// `repeat(body).until(until)`.
    #[must_use]
    pub fn repeat_until(self, body: Traversal, until: Traversal) -> Self {
        self.step(Step::Repeat {
            body,
            times: None,
            until: Some(until),
        })
    }

    /// `union(branches..)`.
    #[must_use]
    pub fn union(self, branches: Vec<Traversal>) -> Self {
        self.step(Step::Union(branches))
    }

    /// `where(traversal)`.
    #[must_use]
    pub fn where_(self, traversal: Traversal) -> Self {
        self.step(Step::Where(traversal))
    }

    /// `sideEffect(traversal)`.
    #[must_use]
    pub fn side_effect(self, traversal: Traversal) -> Self {
        self.step(Step::SideEffect(traversal))
    }

    /// Repartitions the stream by `route`.
    #[must_use]
    pub fn repartition(self, route: Route) -> Self {
        self.step(Step::Repartition(route))
    }

    /// Gathers the stream on `worker`.
    #[must_use]
    pub fn gather(self, worker: WorkerId) -> Self {
        self.step(Step::Gather(worker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_steps_counts_nested() {
        let t = Traversal::v()
            .repeat_times(Traversal::anonymous().out(&[]), 2)
            .union(vec![
                Traversal::anonymous().values(&["name"]),
                Traversal::anonymous().count(),
            ]);
        assert_eq!(t.total_steps(), 5);
    }

    #[test]
    fn test_json_traversal() {
        let json = r#"{
            "source": {"v": []},
            "steps": [
                {"hasLabel": ["person"]},
                {"repartition": "id"},
                {"groupCount": {"key": {"token": "label"}}}
            ]
        }"#;
        let t: Traversal = serde_json::from_str(json).unwrap();
        assert_eq!(t.source, Some(Source::V(Vec::new())));
        assert_eq!(
            t.steps[2],
            Step::GroupCount {
                key: Some(By::Token(Token::Label))
            }
        );
    }
}
