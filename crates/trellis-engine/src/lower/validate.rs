//! Registry pre-validation.

use trellis_adapters::traversal::Traversal;
use trellis_common::utils::error::Result;

use super::registry::{lookup, unsupported_step};

/// Checks that every step of `traversal`, nested traversals included, has a
/// registry entry.
///
/// Steps are visited depth-first in declaration order, so the error names the
/// first offending step a reader would meet.
///
/// # Errors
///
/// Returns [`Error::UnsupportedConstruct`](trellis_common::Error::UnsupportedConstruct)
/// for the first step kind without a lowering.
pub fn validate(traversal: &Traversal) -> Result<()> {
    for step in &traversal.steps {
        let kind = step.kind();
        if lookup(kind).is_none() {
            return Err(unsupported_step(kind));
        }
        for nested in step.nested() {
            validate(nested)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_adapters::traversal::Step;
    use trellis_common::utils::error::Error;

    #[test]
    fn test_valid_traversal() {
        let t = Traversal::v().out(&["knows"]).dedup().count();
        assert!(validate(&t).is_ok());
    }

    #[test]
    fn test_reports_nested_unsupported_step() {
        let body = Traversal::anonymous().out(&[]).step(Step::Drop);
        let t = Traversal::v().repeat_times(body, 3).step(Step::Skip(1));
        assert_eq!(
            validate(&t),
            Err(Error::unsupported("step `drop` has no lowering"))
        );
    }

    #[test]
    fn test_reports_inside_by_modulator() {
        let key = Traversal::anonymous().step(Step::AddV("person".into()));
        let t = Traversal::v().group_count(Some(trellis_adapters::traversal::By::Traversal(key)));
        assert!(matches!(
            validate(&t),
            Err(Error::UnsupportedConstruct(msg)) if msg.contains("addV")
        ));
    }
}
