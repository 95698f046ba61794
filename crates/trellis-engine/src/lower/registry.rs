//! The step resource registry.
//!
//! [`lookup`] maps every [`StepKind`] to how it is lowered. The match is
//! exhaustive, so adding a step kind without deciding its lowering is a
//! compile error; kinds that are recognised but not lowered map to `None`.

use trellis_adapters::encoding::StepDescriptor;
use trellis_adapters::traversal::{Step, StepKind};
use trellis_common::utils::error::{Error, Result};
use trellis_core::JobBuilder;

use super::{Lowering, Steps, leaf, structural};

/// Operator a leaf step is emitted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOp {
    /// One output per input.
    Map,
    /// Zero or more outputs per input.
    FlatMap,
    /// Zero or one output per input, unchanged.
    Filter,
}

/// Builds the descriptor of a leaf step.
pub type DescribeFn = fn(&Step, &mut Lowering<'_>) -> Result<StepDescriptor>;

/// Applies a structural step to the builder. May consume following steps.
pub type ApplyFn = fn(&Step, &mut Steps<'_>, &mut Lowering<'_>, &mut JobBuilder) -> Result<()>;

/// A step lowered to one generic operator carrying its encoded descriptor.
#[derive(Clone, Copy)]
pub struct GremlinStepResource {
    /// Operator kind to emit.
    pub op: EmitOp,
    /// Descriptor builder.
    pub describe: DescribeFn,
}

impl GremlinStepResource {
    /// Describes, encodes, and appends the step.
    pub fn emit(
        &self,
        step: &Step,
        lowering: &mut Lowering<'_>,
        builder: &mut JobBuilder,
    ) -> Result<()> {
        let descriptor = (self.describe)(step, lowering)?;
        let resource = lowering.encode(&descriptor)?;
        match self.op {
            EmitOp::Map => builder.map(resource),
            EmitOp::FlatMap => builder.flat_map(resource),
            EmitOp::Filter => builder.filter(resource),
        };
        Ok(())
    }
}

/// A step that drives the builder directly.
#[derive(Clone, Copy)]
pub struct JobBuilderResource {
    /// Builder callback.
    pub apply: ApplyFn,
}

/// How a step kind is lowered.
#[derive(Clone, Copy)]
pub enum StepResource {
    /// Single generic operator.
    Gremlin(GremlinStepResource),
    /// Direct builder manipulation.
    JobBuilder(JobBuilderResource),
}

impl StepResource {
    /// Returns the strategy name used in logs.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Gremlin(_) => "gremlin",
            Self::JobBuilder(_) => "job_builder",
        }
    }

    /// Returns the leaf resource, if this is one.
    #[must_use]
    pub fn as_gremlin(&self) -> Option<&GremlinStepResource> {
        match self {
            Self::Gremlin(res) => Some(res),
            Self::JobBuilder(_) => None,
        }
    }
}

const fn gremlin(op: EmitOp, describe: DescribeFn) -> Option<StepResource> {
    Some(StepResource::Gremlin(GremlinStepResource { op, describe }))
}

const fn builder(apply: ApplyFn) -> Option<StepResource> {
    Some(StepResource::JobBuilder(JobBuilderResource { apply }))
}

/// Returns how `kind` is lowered, or `None` if it has no lowering.
#[must_use]
pub fn lookup(kind: StepKind) -> Option<StepResource> {
    use StepKind as K;

    match kind {
        K::Vertex | K::Edge | K::EdgeVertex | K::Values | K::Properties => {
            gremlin(EmitOp::FlatMap, leaf::describe)
        }
        K::Has | K::HasLabel | K::HasId | K::HasNot | K::Is | K::SimplePath => {
            gremlin(EmitOp::Filter, leaf::describe)
        }
        K::WherePredicate => gremlin(EmitOp::Filter, leaf::describe_where),
        K::ValueMap | K::ElementMap | K::Id | K::Label | K::Constant | K::Path => {
            gremlin(EmitOp::Map, leaf::describe)
        }
        K::As => gremlin(EmitOp::Map, leaf::describe_alias),

        K::Select => builder(structural::select),
        K::Unfold => builder(structural::unfold),
        K::Count | K::Fold | K::Sum | K::Max | K::Min | K::Mean => builder(structural::reduce),
        K::Dedup => builder(structural::dedup),
        K::Limit => builder(structural::limit),
        K::Range => builder(structural::range),
        K::Order => builder(structural::order),
        K::Group => builder(structural::group),
        K::GroupCount => builder(structural::group_count),
        K::Repeat => builder(structural::repeat),
        K::Union => builder(structural::union),
        K::Where => builder(structural::where_traversal),
        K::SideEffect => builder(structural::side_effect),
        K::Repartition | K::Broadcast | K::Gather => builder(structural::route),

        K::AddV
        | K::AddE
        | K::Property
        | K::Drop
        | K::Coalesce
        | K::Optional
        | K::Not
        | K::Skip => None,
    }
}

/// The error raised for a step kind with no registry entry.
#[must_use]
pub fn unsupported_step(kind: StepKind) -> Error {
    Error::unsupported(format!("step `{}` has no lowering", kind.name()))
}
