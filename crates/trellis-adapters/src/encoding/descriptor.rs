//! Step descriptors: resolved steps as they are serialized into operator
//! payloads.
//!
//! A descriptor differs from its [`Step`](crate::traversal::Step) in that tag
//! names have been resolved to [`TagId`]s and nested traversals have been
//! replaced by references to the tags their joined results are stored under.

use serde::{Deserialize, Serialize};
use trellis_common::types::{TagId, Value};
use trellis_core::plan::AccumKind;

use crate::traversal::{
    Compare, Direction, Endpoint, Labels, Order, Predicate, Route, Source, Token,
};

/// How a key is extracted from a traverser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyBy {
    /// The traverser itself.
    Identity,
    /// A property value.
    Key(String),
    /// An element token.
    Token(Token),
    /// The value a forked sub-task joined back under this tag.
    Tag(TagId),
}

/// Final reduction of a custom accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reduce {
    /// Count.
    Count,
    /// Collect into a list.
    Fold,
    /// Numeric sum.
    Sum,
    /// Maximum.
    Max,
    /// Minimum.
    Min,
    /// Arithmetic mean.
    Mean,
}

/// How grouped values are accumulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueAccum {
    /// Count the members of each group.
    Count,
    /// Collect the members of each group.
    ToList,
    /// Map each member through `steps`, then reduce.
    Custom {
        /// Per-member steps.
        steps: Vec<StepDescriptor>,
        /// Final reduction.
        reduce: Reduce,
    },
}

impl ValueAccum {
    /// Returns the accumulator kind recorded on the operator.
    #[must_use]
    pub fn kind(&self) -> AccumKind {
        match self {
            Self::Count => AccumKind::Count,
            Self::ToList => AccumKind::ToList,
            Self::Custom { .. } => AccumKind::Custom,
        }
    }
}

/// A resolved step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepDescriptor {
    /// Job source.
    Source(Source),

    /// Adjacent vertices.
    Vertex {
        /// Edge direction.
        direction: Direction,
        /// Edge labels.
        labels: Labels,
    },
    /// Incident edges.
    Edge {
        /// Edge direction.
        direction: Direction,
        /// Edge labels.
        labels: Labels,
    },
    /// Edge endpoints.
    EdgeVertex(Endpoint),

    /// Property predicate.
    Has {
        /// Property key.
        key: String,
        /// Predicate.
        predicate: Predicate,
    },
    /// Label membership.
    HasLabel(Labels),
    /// Id membership.
    HasId(Vec<Value>),
    /// Property absence.
    HasNot(String),
    /// Predicate on the traverser value.
    Is(Predicate),
    /// Comparison between tagged traversers.
    WherePredicate {
        /// Left-hand tag; the current traverser when absent.
        start: Option<TagId>,
        /// Comparison.
        compare: Compare,
        /// Right-hand tag.
        tag: TagId,
    },
    /// Cycle-free path filter.
    SimplePath,
    /// Keeps traversers whose joined sub-task produced a result under `tag`.
    Exists(TagId),

    /// Property values.
    Values(Vec<String>),
    /// Properties.
    Properties(Vec<String>),
    /// Property map.
    ValueMap(Vec<String>),
    /// Element map.
    ElementMap(Vec<String>),
    /// Element id.
    Id,
    /// Element label.
    Label,
    /// Constant.
    Constant(Value),
    /// Traversed path.
    Path,
    /// Labels the current traverser.
    Alias(TagId),
    /// Projection of tagged traversers.
    Select {
        /// Selected tags.
        tags: Vec<TagId>,
        /// One key per tag.
        keys: Vec<KeyBy>,
    },
    /// Flattens a collection.
    Unfold,

    /// Partitioning key for a shuffle channel.
    Route(Route),
    /// Deduplication key.
    DedupKey(KeyBy),
    /// Sort keys of a comparator.
    OrderKeys(Vec<(KeyBy, Order)>),
    /// Group key extractor and value accumulator.
    Group {
        /// Key extractor.
        key: KeyBy,
        /// Value accumulator.
        value: ValueAccum,
    },
    /// Custom stream accumulator.
    Accumulate {
        /// Per-record steps.
        steps: Vec<StepDescriptor>,
        /// Final reduction.
        reduce: Reduce,
    },
    /// Joins a forked sub-task's output back onto its input under `target`.
    Joiner {
        /// Tag the joined value is stored under.
        target: TagId,
    },
    /// Loop exit condition: all filters must pass.
    Until(Vec<StepDescriptor>),
}

impl StepDescriptor {
    /// Returns a short name for logs and explain output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Source(_) => "source",
            Self::Vertex { .. } => "vertex",
            Self::Edge { .. } => "edge",
            Self::EdgeVertex(_) => "edgeVertex",
            Self::Has { .. } => "has",
            Self::HasLabel(_) => "hasLabel",
            Self::HasId(_) => "hasId",
            Self::HasNot(_) => "hasNot",
            Self::Is(_) => "is",
            Self::WherePredicate { .. } => "where",
            Self::SimplePath => "simplePath",
            Self::Exists(_) => "exists",
            Self::Values(_) => "values",
            Self::Properties(_) => "properties",
            Self::ValueMap(_) => "valueMap",
            Self::ElementMap(_) => "elementMap",
            Self::Id => "id",
            Self::Label => "label",
            Self::Constant(_) => "constant",
            Self::Path => "path",
            Self::Alias(_) => "as",
            Self::Select { .. } => "select",
            Self::Unfold => "unfold",
            Self::Route(_) => "route",
            Self::DedupKey(_) => "dedupKey",
            Self::OrderKeys(_) => "orderKeys",
            Self::Group { .. } => "group",
            Self::Accumulate { .. } => "accumulate",
            Self::Joiner { .. } => "joiner",
            Self::Until(_) => "until",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accum_kind() {
        assert_eq!(ValueAccum::Count.kind(), AccumKind::Count);
        assert_eq!(ValueAccum::ToList.kind(), AccumKind::ToList);
        let custom = ValueAccum::Custom {
            steps: vec![StepDescriptor::Values(vec!["age".into()])],
            reduce: Reduce::Sum,
        };
        assert_eq!(custom.kind(), AccumKind::Custom);
    }

    #[test]
    fn test_names() {
        assert_eq!(StepDescriptor::Joiner { target: TagId::new(0) }.name(), "joiner");
        assert_eq!(StepDescriptor::Exists(TagId::new(1)).name(), "exists");
    }
}
