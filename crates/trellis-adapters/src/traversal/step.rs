//! Traversal steps.
//!
//! [`Step`] is the closed set of steps the parser can hand over. Every step
//! maps to exactly one [`StepKind`], which is what the lowering registry is
//! keyed on. Some kinds are recognised here but have no lowering; those are
//! rejected by the registry, not by the parser.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use trellis_common::types::{Value, WorkerId};
use trellis_core::plan::Scope;

use super::Traversal;
use super::predicate::{Compare, Predicate};

/// Label lists on navigation and `hasLabel` steps; usually one or two.
pub type Labels = SmallVec<[String; 2]>;

/// Edge direction for navigation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Outgoing.
    Out,
    /// Incoming.
    In,
    /// Either.
    Both,
}

/// Which endpoint of an edge `outV`/`inV`/`bothV`/`otherV` selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    /// Tail vertex.
    Out,
    /// Head vertex.
    In,
    /// Both endpoints.
    Both,
    /// The endpoint the traverser did not come from.
    Other,
}

/// Element tokens usable as `by` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Token {
    /// `T.id`.
    Id,
    /// `T.label`.
    Label,
}

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Order {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Partitioning key for routing hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    /// Partition by element id.
    Id,
    /// Partition by label.
    Label,
    /// Partition by a property value.
    Key(String),
}

/// A `by()` modulator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum By {
    /// `by()`: the traverser itself.
    #[default]
    Identity,
    /// `by('name')`.
    Key(String),
    /// `by(T.label)`.
    Token(Token),
    /// `by(__.out().count())`.
    Traversal(Traversal),
}

impl By {
    /// Shorthand for [`By::Key`].
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Returns the nested traversal, if any.
    #[must_use]
    pub fn traversal(&self) -> Option<&Traversal> {
        match self {
            Self::Traversal(t) => Some(t),
            _ => None,
        }
    }
}

/// One `order().by(..)` key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderKey {
    /// What to compare.
    pub by: By,
    /// Direction.
    #[serde(default)]
    pub order: Order,
}

/// A traversal step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    // Navigation
    /// `out`/`in`/`both`.
    Vertex {
        /// Edge direction.
        direction: Direction,
        /// Edge labels; empty means any.
        #[serde(default)]
        labels: Labels,
    },
    /// `outE`/`inE`/`bothE`.
    Edge {
        /// Edge direction.
        direction: Direction,
        /// Edge labels; empty means any.
        #[serde(default)]
        labels: Labels,
    },
    /// `outV`/`inV`/`bothV`/`otherV`.
    EdgeVertex(Endpoint),

    // Filters
    /// `has(key, predicate)`.
    Has {
        /// Property key.
        key: String,
        /// Predicate on the property value.
        predicate: Predicate,
    },
    /// `hasLabel(..)`.
    HasLabel(Labels),
    /// `hasId(..)`.
    HasId(Vec<Value>),
    /// `hasNot(key)`.
    HasNot(String),
    /// `is(predicate)`.
    Is(Predicate),
    /// `where('a', gt('b'))` / `where(gt('b'))`.
    WherePredicate {
        /// Left-hand tag; the current traverser when absent.
        #[serde(default)]
        start: Option<String>,
        /// Comparison.
        compare: Compare,
        /// Right-hand tag.
        tag: String,
    },
    /// `where(traversal)`.
    Where(Traversal),
    /// `simplePath()`.
    SimplePath,

    // Maps
    /// `values(..)`.
    Values(Vec<String>),
    /// `properties(..)`.
    Properties(Vec<String>),
    /// `valueMap(..)`.
    ValueMap(Vec<String>),
    /// `elementMap(..)`.
    ElementMap(Vec<String>),
    /// `id()`.
    Id,
    /// `label()`.
    Label,
    /// `constant(value)`.
    Constant(Value),
    /// `path()`.
    Path,
    /// `unfold()`.
    Unfold,
    /// `as(tag)`.
    As(String),
    /// `select(tags..).by(..)`.
    Select {
        /// Selected tags.
        tags: Vec<String>,
        /// Modulators, applied round-robin over the tags.
        #[serde(default)]
        by: Vec<By>,
    },

    // Reductions
    /// `count()`.
    Count,
    /// `fold()`.
    Fold,
    /// `sum()`.
    Sum,
    /// `max()`.
    Max,
    /// `min()`.
    Min,
    /// `mean()`.
    Mean,
    /// `dedup()`, optionally `.by(..)`.
    Dedup {
        /// Scope.
        #[serde(default)]
        scope: Scope,
        /// Deduplication key.
        #[serde(default)]
        by: Option<By>,
    },
    /// `limit(n)`.
    Limit {
        /// Scope.
        #[serde(default)]
        scope: Scope,
        /// Maximum number of records.
        n: u64,
    },
    /// `range(low, high)`.
    Range {
        /// Scope.
        #[serde(default)]
        scope: Scope,
        /// First index, inclusive.
        low: u64,
        /// Last index, exclusive.
        high: u64,
    },
    /// `order().by(..)`.
    Order {
        /// Scope.
        #[serde(default)]
        scope: Scope,
        /// Sort keys; empty sorts by the traverser itself.
        #[serde(default)]
        keys: Vec<OrderKey>,
    },
    /// `group().by(key).by(value)`.
    Group {
        /// Key modulator; identity when absent.
        #[serde(default)]
        key: Option<By>,
        /// Value modulator; collects into a list when absent.
        #[serde(default)]
        value: Option<By>,
    },
    /// `groupCount().by(key)`.
    GroupCount {
        /// Key modulator; identity when absent.
        #[serde(default)]
        key: Option<By>,
    },

    // Structure
    /// `repeat(body).times(n).until(cond)`.
    Repeat {
        /// Loop body.
        body: Traversal,
        /// Iteration bound.
        #[serde(default)]
        times: Option<u32>,
        /// Exit condition.
        #[serde(default)]
        until: Option<Traversal>,
    },
    /// `union(branches..)`.
    Union(Vec<Traversal>),
    /// `sideEffect(traversal)`.
    SideEffect(Traversal),

    // Routing hints
    /// Repartition the stream.
    Repartition(Route),
    /// Replicate the stream, optionally only to the workers owning `route`.
    Broadcast(Option<Route>),
    /// Gather the stream on one worker.
    Gather(WorkerId),

    // Recognised, not lowered
    /// `addV(label)`.
    AddV(String),
    /// `addE(label)`.
    AddE(String),
    /// `property(key, value)`.
    Property {
        /// Property key.
        key: String,
        /// Property value.
        value: Value,
    },
    /// `drop()`.
    Drop,
    /// `coalesce(..)`.
    Coalesce(Vec<Traversal>),
    /// `optional(..)`.
    Optional(Traversal),
    /// `not(..)`.
    Not(Traversal),
    /// `skip(n)`.
    Skip(u64),
}

/// The kind of a [`Step`], used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum StepKind {
    Vertex,
    Edge,
    EdgeVertex,
    Has,
    HasLabel,
    HasId,
    HasNot,
    Is,
    WherePredicate,
    Where,
    SimplePath,
    Values,
    Properties,
    ValueMap,
    ElementMap,
    Id,
    Label,
    Constant,
    Path,
    Unfold,
    As,
    Select,
    Count,
    Fold,
    Sum,
    Max,
    Min,
    Mean,
    Dedup,
    Limit,
    Range,
    Order,
    Group,
    GroupCount,
    Repeat,
    Union,
    SideEffect,
    Repartition,
    Broadcast,
    Gather,
    AddV,
    AddE,
    Property,
    Drop,
    Coalesce,
    Optional,
    Not,
    Skip,
}

impl StepKind {
    /// Every step kind.
    pub const ALL: [StepKind; 48] = [
        Self::Vertex,
        Self::Edge,
        Self::EdgeVertex,
        Self::Has,
        Self::HasLabel,
        Self::HasId,
        Self::HasNot,
        Self::Is,
        Self::WherePredicate,
        Self::Where,
        Self::SimplePath,
        Self::Values,
        Self::Properties,
        Self::ValueMap,
        Self::ElementMap,
        Self::Id,
        Self::Label,
        Self::Constant,
        Self::Path,
        Self::Unfold,
        Self::As,
        Self::Select,
        Self::Count,
        Self::Fold,
        Self::Sum,
        Self::Max,
        Self::Min,
        Self::Mean,
        Self::Dedup,
        Self::Limit,
        Self::Range,
        Self::Order,
        Self::Group,
        Self::GroupCount,
        Self::Repeat,
        Self::Union,
        Self::SideEffect,
        Self::Repartition,
        Self::Broadcast,
        Self::Gather,
        Self::AddV,
        Self::AddE,
        Self::Property,
        Self::Drop,
        Self::Coalesce,
        Self::Optional,
        Self::Not,
        Self::Skip,
    ];

    /// Returns the step name as written in a traversal.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::EdgeVertex => "edgeVertex",
            Self::Has => "has",
            Self::HasLabel => "hasLabel",
            Self::HasId => "hasId",
            Self::HasNot => "hasNot",
            Self::Is => "is",
            Self::WherePredicate => "where(predicate)",
            Self::Where => "where(traversal)",
            Self::SimplePath => "simplePath",
            Self::Values => "values",
            Self::Properties => "properties",
            Self::ValueMap => "valueMap",
            Self::ElementMap => "elementMap",
            Self::Id => "id",
            Self::Label => "label",
            Self::Constant => "constant",
            Self::Path => "path",
            Self::Unfold => "unfold",
            Self::As => "as",
            Self::Select => "select",
            Self::Count => "count",
            Self::Fold => "fold",
            Self::Sum => "sum",
            Self::Max => "max",
            Self::Min => "min",
            Self::Mean => "mean",
            Self::Dedup => "dedup",
            Self::Limit => "limit",
            Self::Range => "range",
            Self::Order => "order",
            Self::Group => "group",
            Self::GroupCount => "groupCount",
            Self::Repeat => "repeat",
            Self::Union => "union",
            Self::SideEffect => "sideEffect",
            Self::Repartition => "repartition",
            Self::Broadcast => "broadcast",
            Self::Gather => "gather",
            Self::AddV => "addV",
            Self::AddE => "addE",
            Self::Property => "property",
            Self::Drop => "drop",
            Self::Coalesce => "coalesce",
            Self::Optional => "optional",
            Self::Not => "not",
            Self::Skip => "skip",
        }
    }
}

impl Step {
    /// Returns the kind of this step.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Vertex { .. } => StepKind::Vertex,
            Self::Edge { .. } => StepKind::Edge,
            Self::EdgeVertex(_) => StepKind::EdgeVertex,
            Self::Has { .. } => StepKind::Has,
            Self::HasLabel(_) => StepKind::HasLabel,
            Self::HasId(_) => StepKind::HasId,
            Self::HasNot(_) => StepKind::HasNot,
            Self::Is(_) => StepKind::Is,
            Self::WherePredicate { .. } => StepKind::WherePredicate,
            Self::Where(_) => StepKind::Where,
            Self::SimplePath => StepKind::SimplePath,
            Self::Values(_) => StepKind::Values,
            Self::Properties(_) => StepKind::Properties,
            Self::ValueMap(_) => StepKind::ValueMap,
            Self::ElementMap(_) => StepKind::ElementMap,
            Self::Id => StepKind::Id,
            Self::Label => StepKind::Label,
            Self::Constant(_) => StepKind::Constant,
            Self::Path => StepKind::Path,
            Self::Unfold => StepKind::Unfold,
            Self::As(_) => StepKind::As,
            Self::Select { .. } => StepKind::Select,
            Self::Count => StepKind::Count,
            Self::Fold => StepKind::Fold,
            Self::Sum => StepKind::Sum,
            Self::Max => StepKind::Max,
            Self::Min => StepKind::Min,
            Self::Mean => StepKind::Mean,
            Self::Dedup { .. } => StepKind::Dedup,
            Self::Limit { .. } => StepKind::Limit,
            Self::Range { .. } => StepKind::Range,
            Self::Order { .. } => StepKind::Order,
            Self::Group { .. } => StepKind::Group,
            Self::GroupCount { .. } => StepKind::GroupCount,
            Self::Repeat { .. } => StepKind::Repeat,
            Self::Union(_) => StepKind::Union,
            Self::SideEffect(_) => StepKind::SideEffect,
            Self::Repartition(_) => StepKind::Repartition,
            Self::Broadcast(_) => StepKind::Broadcast,
            Self::Gather(_) => StepKind::Gather,
            Self::AddV(_) => StepKind::AddV,
            Self::AddE(_) => StepKind::AddE,
            Self::Property { .. } => StepKind::Property,
            Self::Drop => StepKind::Drop,
            Self::Coalesce(_) => StepKind::Coalesce,
            Self::Optional(_) => StepKind::Optional,
            Self::Not(_) => StepKind::Not,
            Self::Skip(_) => StepKind::Skip,
        }
    }

    /// Returns the traversals nested directly inside this step, `by`
    /// modulators included.
    #[must_use]
    pub fn nested(&self) -> Vec<&Traversal> {
        match self {
            Self::Where(t) | Self::SideEffect(t) | Self::Optional(t) | Self::Not(t) => vec![t],
            Self::Union(branches) | Self::Coalesce(branches) => branches.iter().collect(),
            Self::Repeat { body, until, .. } => std::iter::once(body).chain(until).collect(),
            Self::Select { by, .. } => by.iter().filter_map(By::traversal).collect(),
            Self::Dedup { by, .. } => by.iter().filter_map(By::traversal).collect(),
            Self::Order { keys, .. } => keys.iter().filter_map(|k| k.by.traversal()).collect(),
            Self::Group { key, value } => key
                .iter()
                .chain(value)
                .filter_map(By::traversal)
                .collect(),
            Self::GroupCount { key } => key.iter().filter_map(By::traversal).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kind_names_are_unique() {
        let names: HashSet<_> = StepKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), StepKind::ALL.len());
    }

    #[test]
    fn test_nested_collects_by_traversals() {
        let inner = Traversal::anonymous().out(&["knows"]).count();
        let step = Step::Group {
            key: Some(By::Traversal(inner.clone())),
            value: Some(By::key("age")),
        };
        assert_eq!(step.nested(), vec![&inner]);

        let repeat = Step::Repeat {
            body: inner.clone(),
            times: None,
            until: Some(Traversal::anonymous().has_label(&["person"])),
        };
        assert_eq!(repeat.nested().len(), 2);
    }

    #[test]
    fn test_json_step() {
        let step: Step =
            serde_json::from_str(r#"{"vertex":{"direction":"out","labels":["knows"]}}"#).unwrap();
        assert_eq!(step.kind(), StepKind::Vertex);

        let step: Step = serde_json::from_str(r#"{"limit":{"n":3}}"#).unwrap();
        assert_eq!(
            step,
            Step::Limit {
                scope: Scope::Global,
                n: 3
            }
        );

        let step: Step = serde_json::from_str(r#""count""#).unwrap();
        assert_eq!(step.kind(), StepKind::Count);
    }
}
