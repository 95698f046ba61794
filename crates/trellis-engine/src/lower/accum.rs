//! Group value accumulator inference.
//!
//! The accumulator of `group().by(key).by(value)` is read off the shape of
//! the value modulator:
//!
//! | value modulator                           | accumulator            |
//! | ----------------------------------------- | ---------------------- |
//! | absent, `by()`, empty traversal           | to-list                |
//! | `count()`                                 | count                  |
//! | `fold()`                                  | to-list                |
//! | `by('key')`, `by(T.id)`, `by(T.label)`    | custom: map, to-list   |
//! | leaf steps followed by one reducing step  | custom: steps, reducer |
//!
//! Anything else has no lowering.

use trellis_adapters::encoding::{Reduce, StepDescriptor, ValueAccum};
use trellis_adapters::traversal::{By, Step, StepKind, Token};
use trellis_common::utils::error::{Error, Result};

use super::Lowering;
use super::registry::lookup;

/// Returns the reduction performed by a reducing step kind.
#[must_use]
pub fn reducer(kind: StepKind) -> Option<Reduce> {
    match kind {
        StepKind::Count => Some(Reduce::Count),
        StepKind::Fold => Some(Reduce::Fold),
        StepKind::Sum => Some(Reduce::Sum),
        StepKind::Max => Some(Reduce::Max),
        StepKind::Min => Some(Reduce::Min),
        StepKind::Mean => Some(Reduce::Mean),
        _ => None,
    }
}

fn mapped(descriptor: StepDescriptor) -> ValueAccum {
    ValueAccum::Custom {
        steps: vec![descriptor],
        reduce: Reduce::Fold,
    }
}

/// Infers the accumulator for a group value modulator.
///
/// # Errors
///
/// Returns [`Error::UnsupportedConstruct`] for modulators outside the table.
pub fn infer(value: Option<&By>, lowering: &mut Lowering<'_>) -> Result<ValueAccum> {
    let traversal = match value {
        None | Some(By::Identity) => return Ok(ValueAccum::ToList),
        Some(By::Key(key)) => return Ok(mapped(StepDescriptor::Values(vec![key.clone()]))),
        Some(By::Token(Token::Id)) => return Ok(mapped(StepDescriptor::Id)),
        Some(By::Token(Token::Label)) => return Ok(mapped(StepDescriptor::Label)),
        Some(By::Traversal(traversal)) => traversal,
    };
    if !traversal.is_anonymous() {
        return Err(Error::unsupported("group value traversal with its own source"));
    }

    let Some((last, leading)) = traversal.steps.split_last() else {
        return Ok(ValueAccum::ToList);
    };
    let Some(reduce) = reducer(last.kind()) else {
        return Err(Error::unsupported(format!(
            "group value traversal ending in `{}` instead of a reducing step",
            last.kind().name()
        )));
    };

    match (leading.is_empty(), reduce) {
        (true, Reduce::Count) => return Ok(ValueAccum::Count),
        (true, Reduce::Fold) => return Ok(ValueAccum::ToList),
        _ => {}
    }

    let steps = leading
        .iter()
        .map(|step| describe_leaf(step, lowering))
        .collect::<Result<Vec<_>>>()?;
    Ok(ValueAccum::Custom { steps, reduce })
}

fn describe_leaf(step: &Step, lowering: &mut Lowering<'_>) -> Result<StepDescriptor> {
    let kind = step.kind();
    match lookup(kind).as_ref().and_then(|r| r.as_gremlin()) {
        Some(res) => (res.describe)(step, lowering),
        None => Err(Error::unsupported(format!(
            "step `{}` inside a group value traversal",
            kind.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoweringOptions;
    use trellis_adapters::encoding::BincodeStepEncoder;
    use trellis_adapters::traversal::Traversal;

    fn infer_with(value: Option<By>) -> Result<ValueAccum> {
        let options = LoweringOptions::default();
        let mut lowering = Lowering::new(&options, &BincodeStepEncoder);
        infer(value.as_ref(), &mut lowering)
    }

    fn by(t: Traversal) -> Option<By> {
        Some(By::Traversal(t))
    }

    #[test]
    fn test_to_list_shapes() {
        assert_eq!(infer_with(None).unwrap(), ValueAccum::ToList);
        assert_eq!(infer_with(Some(By::Identity)).unwrap(), ValueAccum::ToList);
        assert_eq!(infer_with(by(Traversal::anonymous())).unwrap(), ValueAccum::ToList);
        assert_eq!(
            infer_with(by(Traversal::anonymous().fold())).unwrap(),
            ValueAccum::ToList
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(
            infer_with(by(Traversal::anonymous().count())).unwrap(),
            ValueAccum::Count
        );
    }

    #[test]
    fn test_key_and_token() {
        assert_eq!(
            infer_with(Some(By::key("name"))).unwrap(),
            ValueAccum::Custom {
                steps: vec![StepDescriptor::Values(vec!["name".into()])],
                reduce: Reduce::Fold,
            }
        );
        assert_eq!(
            infer_with(Some(By::Token(Token::Label))).unwrap(),
            ValueAccum::Custom {
                steps: vec![StepDescriptor::Label],
                reduce: Reduce::Fold,
            }
        );
    }

    #[test]
    fn test_leaf_steps_then_reducer() {
        let value = Traversal::anonymous().values(&["age"]).step(Step::Sum);
        assert_eq!(
            infer_with(by(value)).unwrap(),
            ValueAccum::Custom {
                steps: vec![StepDescriptor::Values(vec!["age".into()])],
                reduce: Reduce::Sum,
            }
        );

        let bare_max = Traversal::anonymous().step(Step::Max);
        assert_eq!(
            infer_with(by(bare_max)).unwrap(),
            ValueAccum::Custom {
                steps: Vec::new(),
                reduce: Reduce::Max,
            }
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        let no_reducer = Traversal::anonymous().values(&["age"]);
        assert!(matches!(
            infer_with(by(no_reducer)),
            Err(Error::UnsupportedConstruct(_))
        ));

        let structural = Traversal::anonymous().dedup().count();
        assert!(matches!(
            infer_with(by(structural)),
            Err(Error::UnsupportedConstruct(_))
        ));

        let sourced = Traversal::v().count();
        assert!(infer_with(by(sourced)).is_err());
    }
}
