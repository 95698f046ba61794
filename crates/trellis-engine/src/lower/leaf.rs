//! Descriptors for steps lowered to a single operator.

use trellis_adapters::encoding::StepDescriptor;
use trellis_adapters::traversal::Step;
use trellis_common::utils::error::{Error, Result};

use super::Lowering;

fn not_a_leaf(step: &Step) -> Error {
    Error::Internal(format!("step `{}` is not a leaf step", step.kind().name()))
}

/// Describes a leaf step whose descriptor is a copy of its arguments.
pub fn describe(step: &Step, _lowering: &mut Lowering<'_>) -> Result<StepDescriptor> {
    Ok(match step {
        Step::Vertex { direction, labels } => StepDescriptor::Vertex {
            direction: *direction,
            labels: labels.clone(),
        },
        Step::Edge { direction, labels } => StepDescriptor::Edge {
            direction: *direction,
            labels: labels.clone(),
        },
        Step::EdgeVertex(endpoint) => StepDescriptor::EdgeVertex(*endpoint),
        Step::Has { key, predicate } => StepDescriptor::Has {
            key: key.clone(),
            predicate: predicate.clone(),
        },
        Step::HasLabel(labels) => StepDescriptor::HasLabel(labels.clone()),
        Step::HasId(ids) => StepDescriptor::HasId(ids.clone()),
        Step::HasNot(key) => StepDescriptor::HasNot(key.clone()),
        Step::Is(predicate) => StepDescriptor::Is(predicate.clone()),
        Step::SimplePath => StepDescriptor::SimplePath,
        Step::Values(keys) => StepDescriptor::Values(keys.clone()),
        Step::Properties(keys) => StepDescriptor::Properties(keys.clone()),
        Step::ValueMap(keys) => StepDescriptor::ValueMap(keys.clone()),
        Step::ElementMap(keys) => StepDescriptor::ElementMap(keys.clone()),
        Step::Id => StepDescriptor::Id,
        Step::Label => StepDescriptor::Label,
        Step::Constant(value) => StepDescriptor::Constant(value.clone()),
        Step::Path => StepDescriptor::Path,
        other => return Err(not_a_leaf(other)),
    })
}

/// Describes `as(tag)`, allocating the tag.
pub fn describe_alias(step: &Step, lowering: &mut Lowering<'_>) -> Result<StepDescriptor> {
    let Step::As(tag) = step else {
        return Err(not_a_leaf(step));
    };
    Ok(StepDescriptor::Alias(lowering.tags().alloc(tag)))
}

/// Describes `where(predicate)`, resolving both sides to tags.
pub fn describe_where(step: &Step, lowering: &mut Lowering<'_>) -> Result<StepDescriptor> {
    let Step::WherePredicate {
        start,
        compare,
        tag,
    } = step
    else {
        return Err(not_a_leaf(step));
    };
    let tags = lowering.tags();
    Ok(StepDescriptor::WherePredicate {
        start: start.as_deref().map(|s| tags.alloc(s)),
        compare: *compare,
        tag: tags.alloc(tag),
    })
}
