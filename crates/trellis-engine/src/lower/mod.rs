//! Step-to-plan lowering.
//!
//! The [`Translator`] validates a traversal, then walks its steps in order
//! with one [`JobBuilder`]. Each step is resolved through the
//! [`registry`](registry::lookup) and either emitted as a single operator
//! carrying its encoded descriptor, or applied to the builder directly.
//! Nested traversals are lowered recursively into independent
//! [`TaskPlan`]s by [`Lowering::lower_nested`].
//!
//! ## Submodules
//!
//! - [`registry`] - `StepKind -> StepResource` table
//! - [`leaf`] - Descriptors for single-operator steps
//! - [`structural`] - Builder callbacks for loops, forks, unions, and reductions
//! - [`accum`] - Group value accumulator inference
//! - [`tags`] - Tag allocation
//! - [`validate`] - Registry pre-validation
//! - [`translator`] - Entry points

pub mod accum;
pub mod leaf;
pub mod registry;
pub mod structural;
pub mod tags;
pub mod translator;
pub mod validate;

use std::iter::Peekable;
use std::slice;

use bytes::Bytes;
use trellis_adapters::encoding::{KeyBy, StepDescriptor, StepEncoder};
use trellis_adapters::traversal::{By, Step, Traversal};
use trellis_common::utils::error::{Error, Result};
use trellis_core::{JobBuilder, TaskPlan};

use crate::config::LoweringOptions;
pub use registry::{StepResource, lookup};
use registry::unsupported_step;
pub use tags::TagAllocator;
pub use translator::{Translator, lower};

/// Remaining steps of the traversal being lowered. Structural handlers may
/// consume steps ahead of the current one.
pub type Steps<'s> = Peekable<slice::Iter<'s, Step>>;

/// State shared by one top-level lowering pass and all of its nested ones.
pub struct Lowering<'a> {
    options: &'a LoweringOptions,
    encoder: &'a dyn StepEncoder,
    tags: TagAllocator,
    depth: usize,
}

impl<'a> Lowering<'a> {
    pub(crate) fn new(options: &'a LoweringOptions, encoder: &'a dyn StepEncoder) -> Self {
        Self {
            options,
            encoder,
            tags: TagAllocator::new(),
            depth: 0,
        }
    }

    /// Returns the lowering options.
    #[must_use]
    pub fn options(&self) -> &LoweringOptions {
        self.options
    }

    /// Returns the tag allocator.
    pub fn tags(&mut self) -> &mut TagAllocator {
        &mut self.tags
    }

    /// Returns the nesting depth of the traversal being lowered.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Encodes a descriptor with the configured encoder.
    pub fn encode(&self, descriptor: &StepDescriptor) -> Result<Bytes> {
        self.encoder.encode(descriptor)
    }

    /// Lowers `steps` onto `builder`, stopping at the first failure.
    pub fn lower_steps(&mut self, steps: &[Step], builder: &mut JobBuilder) -> Result<()> {
        let mut steps = steps.iter().peekable();
        while let Some(step) = steps.next() {
            let kind = step.kind();
            let resource = lookup(kind).ok_or_else(|| unsupported_step(kind))?;
            tracing::debug!(
                step = kind.name(),
                strategy = resource.strategy(),
                depth = self.depth,
                "lowering step"
            );
            match resource {
                StepResource::Gremlin(res) => res.emit(step, self, builder)?,
                StepResource::JobBuilder(res) => (res.apply)(step, &mut steps, self, builder)?,
            }
        }
        Ok(())
    }

    /// Lowers an anonymous traversal into a frozen body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedConstruct`] if the traversal has a source
    /// or contains a step that cannot be lowered.
    pub fn lower_nested(&mut self, traversal: &Traversal) -> Result<TaskPlan> {
        if !traversal.is_anonymous() {
            return Err(Error::unsupported("nested traversal with its own source"));
        }
        self.depth += 1;
        let mut builder = JobBuilder::nested();
        let lowered = self.lower_steps(&traversal.steps, &mut builder);
        self.depth -= 1;
        lowered?;
        Ok(builder.into_task())
    }

    /// Turns a `by` modulator into a key extractor.
    ///
    /// A traversal modulator is lowered into a joined sub-task whose result
    /// lands under a fresh tag; the key then reads that tag.
    pub fn resolve_by(&mut self, by: &By, builder: &mut JobBuilder) -> Result<KeyBy> {
        Ok(match by {
            By::Identity => KeyBy::Identity,
            By::Key(key) => KeyBy::Key(key.clone()),
            By::Token(token) => KeyBy::Token(*token),
            By::Traversal(traversal) => {
                let target = self.tags.fresh();
                let body = self.lower_nested(traversal)?;
                let joiner = self.encode(&StepDescriptor::Joiner { target })?;
                builder.fork_join(joiner, body);
                KeyBy::Tag(target)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_adapters::encoding::BincodeStepEncoder;
    use trellis_adapters::traversal::StepKind;

    #[test]
    fn test_walk_reports_unsupported_step_like_validation() {
        let options = LoweringOptions::default();
        let encoder = BincodeStepEncoder;
        let mut lowering = Lowering::new(&options, &encoder);
        let mut builder = JobBuilder::nested();

        let traversal = Traversal::anonymous().count().step(Step::Drop);
        let err = lowering
            .lower_steps(&traversal.steps, &mut builder)
            .unwrap_err();
        assert_eq!(err, unsupported_step(StepKind::Drop));
        assert_eq!(err, validate::validate(&traversal).unwrap_err());
    }
}
