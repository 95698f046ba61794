//! Translator entry points.

use rayon::prelude::*;
use trellis_adapters::encoding::{BincodeStepEncoder, StepDescriptor, StepEncoder};
use trellis_adapters::traversal::Traversal;
use trellis_common::utils::error::{Error, Result};
use trellis_core::{JobBuilder, JobConfig, JobRequest, TaskPlan};

use super::Lowering;
use super::validate::validate;
use crate::config::LoweringOptions;

/// Lowers `traversal` with default options and the bincode step encoder.
///
/// # Errors
///
/// See [`Translator::lower`].
pub fn lower(traversal: &Traversal, config: JobConfig) -> Result<JobRequest> {
    Translator::default().lower(traversal, config)
}

/// Lowers traversals into job requests.
///
/// A translator holds no per-query state; every call starts a fresh
/// lowering pass with its own tag allocator, so one translator can serve
/// many threads.
#[derive(Debug, Clone)]
pub struct Translator<E = BincodeStepEncoder> {
    options: LoweringOptions,
    encoder: E,
}

impl Default for Translator {
    fn default() -> Self {
        Self::with_options(LoweringOptions::default())
    }
}

impl Translator {
    /// Creates a translator using the bincode step encoder.
    #[must_use]
    pub fn with_options(options: LoweringOptions) -> Self {
        Self::new(options, BincodeStepEncoder)
    }
}

impl<E: StepEncoder> Translator<E> {
    /// Creates a translator.
    #[must_use]
    pub fn new(options: LoweringOptions, encoder: E) -> Self {
        Self { options, encoder }
    }

    /// Returns the lowering options.
    #[must_use]
    pub fn options(&self) -> &LoweringOptions {
        &self.options
    }

    /// Returns the step encoder.
    #[must_use]
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Lowers a top-level traversal into a job request.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedConstruct`] if any step, nested ones included,
    ///   has no lowering or an unsupported shape. Reported before any
    ///   operator is built.
    /// - [`Error::InvalidConfiguration`] if the traversal has no source.
    /// - [`Error::Serialization`] if the step encoder fails.
    pub fn lower(&self, traversal: &Traversal, config: JobConfig) -> Result<JobRequest> {
        validate(traversal)?;
        let Some(source) = &traversal.source else {
            return Err(Error::invalid_config(
                "top-level traversal has no source (expected V() or E())",
            ));
        };

        let job_id = config.job_id();
        let mut lowering = Lowering::new(&self.options, &self.encoder);
        let mut builder = JobBuilder::new(config);
        builder.add_source(lowering.encode(&StepDescriptor::Source(source.clone()))?);
        lowering.lower_steps(&traversal.steps, &mut builder)?;

        let request = builder.build()?;
        tracing::debug!(
            job = %job_id,
            steps = traversal.total_steps(),
            operators = request.plan().len(),
            tags = lowering.tags().len(),
            "lowered traversal"
        );
        Ok(request)
    }

    /// Lowers an anonymous traversal on its own, as it would be embedded in
    /// a loop, fork, or union.
    ///
    /// # Errors
    ///
    /// Same as [`Translator::lower`], except that a traversal with a source is
    /// [`Error::UnsupportedConstruct`].
    pub fn lower_nested(&self, traversal: &Traversal) -> Result<TaskPlan> {
        validate(traversal)?;
        Lowering::new(&self.options, &self.encoder).lower_nested(traversal)
    }

    /// Lowers independent queries in parallel. Results are in input order.
    pub fn lower_batch(&self, queries: &[(Traversal, JobConfig)]) -> Vec<Result<JobRequest>> {
        queries
            .par_iter()
            .map(|(traversal, config)| self.lower(traversal, config.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_adapters::traversal::{Predicate, Step};
    use trellis_common::types::JobId;

    fn config(id: u64) -> JobConfig {
        JobConfig::new(JobId::new(id))
    }

    #[test]
    fn test_missing_source() {
        let t = Traversal::anonymous().count();
        assert!(matches!(
            lower(&t, config(1)),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_nested_with_source_rejected() {
        let translator = Translator::default();
        assert!(matches!(
            translator.lower_nested(&Traversal::v()),
            Err(Error::UnsupportedConstruct(_))
        ));
    }

    #[test]
    fn test_source_is_encoded() {
        let translator = Translator::default();
        let request = translator.lower(&Traversal::v(), config(1)).unwrap();
        let source = translator.encoder().decode(request.source()).unwrap();
        assert_eq!(source, StepDescriptor::Source(trellis_adapters::Source::V(Vec::new())));
        assert!(request.plan().is_empty());
    }

    #[test]
    fn test_batch_preserves_order() {
        let ok = Traversal::v().has("age", Predicate::Gt(30i64.into()));
        let bad = Traversal::v().step(Step::Drop);
        let queries = vec![
            (ok.clone(), config(1)),
            (bad, config(2)),
            (ok, config(3)),
        ];
        let results = Translator::default().lower_batch(&queries);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().config().job_id(), JobId::new(1));
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().config().job_id(), JobId::new(3));
    }
}
