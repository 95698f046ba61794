//! Builder callbacks for structural steps.
//!
//! Every function here has the [`ApplyFn`](super::registry::ApplyFn)
//! signature and is reached only through the registry, so a step of the wrong
//! variant is an internal error rather than a user error.

use smallvec::SmallVec;
use trellis_adapters::encoding::{KeyBy, Reduce, StepDescriptor, ValueAccum};
use trellis_adapters::traversal::{By, Order, Step, Traversal};
use trellis_common::utils::error::{Error, Result};
use trellis_core::{AccumKind, JobBuilder, Scope};

use super::registry::{EmitOp, lookup};
use super::{Lowering, Steps, accum};

fn mismatch(step: &Step, handler: &str) -> Error {
    Error::Internal(format!(
        "`{handler}` handler called for step `{}`",
        step.kind().name()
    ))
}

/// `select(tags..).by(..)`: joins any `by` traversals, then projects.
pub fn select(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Select { tags, by } = step else {
        return Err(mismatch(step, "select"));
    };
    if tags.is_empty() {
        return Err(Error::unsupported("select() without tags"));
    }
    if by.len() > tags.len() {
        return Err(Error::unsupported(format!(
            "select() with {} tags and {} by() modulators",
            tags.len(),
            by.len()
        )));
    }

    let tag_ids = tags.iter().map(|t| lowering.tags().alloc(t)).collect();
    let mut keys: SmallVec<[KeyBy; 4]> = SmallVec::with_capacity(tags.len());
    for i in 0..tags.len() {
        let key = match by.get(i % by.len().max(1)) {
            Some(modulator) => lowering.resolve_by(modulator, builder)?,
            None => KeyBy::Identity,
        };
        keys.push(key);
    }

    let resource = lowering.encode(&StepDescriptor::Select {
        tags: tag_ids,
        keys: keys.into_vec(),
    })?;
    builder.map(resource);
    Ok(())
}

/// `unfold()`: attaches to a trailing reduce when there is one.
pub fn unfold(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    if !matches!(step, Step::Unfold) {
        return Err(mismatch(step, "unfold"));
    }
    let resource = lowering.encode(&StepDescriptor::Unfold)?;
    builder.chain_unfold(resource);
    Ok(())
}

/// `count()`, `fold()`, `sum()`, `max()`, `min()`, `mean()`.
pub fn reduce(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Some(reduce) = accum::reducer(step.kind()) else {
        return Err(mismatch(step, "reduce"));
    };
    match reduce {
        Reduce::Count => {
            builder.count(Scope::Global);
        }
        Reduce::Fold => {
            builder.fold(Scope::Global);
        }
        Reduce::Sum | Reduce::Max | Reduce::Min | Reduce::Mean => {
            let resource = lowering.encode(&StepDescriptor::Accumulate {
                steps: Vec::new(),
                reduce,
            })?;
            builder.fold_custom(Scope::Global, resource);
        }
    }
    Ok(())
}

/// `dedup()`, optionally keyed.
pub fn dedup(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Dedup { scope, by } = step else {
        return Err(mismatch(step, "dedup"));
    };
    let key = match by {
        None | Some(By::Identity) => None,
        Some(modulator) => {
            let key = lowering.resolve_by(modulator, builder)?;
            Some(lowering.encode(&StepDescriptor::DedupKey(key))?)
        }
    };
    builder.dedup(*scope, key);
    Ok(())
}

/// `limit(n)`.
pub fn limit(
    step: &Step,
    _steps: &mut Steps<'_>,
    _lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Limit { scope, n } = step else {
        return Err(mismatch(step, "limit"));
    };
    builder.limit(*scope, *n);
    Ok(())
}

/// `range(0, n)`, lowered as `limit(n)`.
pub fn range(
    step: &Step,
    _steps: &mut Steps<'_>,
    _lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Range { scope, low, high } = step else {
        return Err(mismatch(step, "range"));
    };
    if *low > 0 {
        return Err(Error::unsupported(format!(
            "range({low}, {high}) with a non-zero offset"
        )));
    }
    builder.limit(*scope, *high);
    Ok(())
}

/// `order().by(..)`, fused with a following global `limit(n)` into a top-k
/// sort when enabled.
pub fn order(
    step: &Step,
    steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Order { scope, keys } = step else {
        return Err(mismatch(step, "order"));
    };

    let mut resolved: SmallVec<[(KeyBy, Order); 2]> = SmallVec::new();
    if keys.is_empty() {
        resolved.push((KeyBy::Identity, Order::Asc));
    }
    for key in keys {
        resolved.push((lowering.resolve_by(&key.by, builder)?, key.order));
    }
    let comparator = lowering.encode(&StepDescriptor::OrderKeys(resolved.into_vec()))?;

    let top_k = match steps.peek() {
        Some(Step::Limit {
            scope: Scope::Global,
            n,
        }) if *scope == Scope::Global && lowering.options().top_by_fusion => Some(*n),
        _ => None,
    };
    match top_k {
        Some(n) => {
            steps.next();
            tracing::debug!(limit = n, "fused order and limit into top-k sort");
            builder.top_by(Scope::Global, n, comparator);
        }
        None => {
            builder.sort_by(*scope, comparator);
        }
    }
    Ok(())
}

/// `group().by(key).by(value)`.
pub fn group(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Group { key, value } = step else {
        return Err(mismatch(step, "group"));
    };
    let key = lowering.resolve_by(key.as_ref().unwrap_or(&By::Identity), builder)?;
    let value = accum::infer(value.as_ref(), lowering)?;
    let accum = value.kind();
    let resource = lowering.encode(&StepDescriptor::Group { key, value })?;
    builder.group_by(Scope::Global, accum, resource);
    Ok(())
}

/// `groupCount().by(key)`.
pub fn group_count(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::GroupCount { key } = step else {
        return Err(mismatch(step, "group_count"));
    };
    let key = lowering.resolve_by(key.as_ref().unwrap_or(&By::Identity), builder)?;
    let resource = lowering.encode(&StepDescriptor::Group {
        key,
        value: ValueAccum::Count,
    })?;
    builder.group_by(Scope::Global, AccumKind::Count, resource);
    Ok(())
}

/// `repeat(body)` bounded by `times(n)`, `until(cond)`, or both.
pub fn repeat(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Repeat { body, times, until } = step else {
        return Err(mismatch(step, "repeat"));
    };
    let max_iters = match (times, until) {
        (Some(n), _) => *n,
        (None, Some(_)) => lowering.options().max_loop_iterations,
        (None, None) => {
            return Err(Error::unsupported("repeat() without times() or until()"));
        }
    };

    let body = lowering.lower_nested(body)?;
    match until {
        Some(cond) => {
            let until = until_filter(cond, lowering)?;
            builder.repeat_until(max_iters, until, body);
        }
        None => {
            builder.repeat(max_iters, body);
        }
    }
    Ok(())
}

/// Encodes a loop exit condition. Only leaf filter steps are allowed.
fn until_filter(cond: &Traversal, lowering: &mut Lowering<'_>) -> Result<bytes::Bytes> {
    if !cond.is_anonymous() || cond.steps.is_empty() {
        return Err(Error::unsupported(
            "until() must be a non-empty anonymous traversal",
        ));
    }
    let mut filters = Vec::with_capacity(cond.steps.len());
    for step in &cond.steps {
        let kind = step.kind();
        let filter = lookup(kind)
            .as_ref()
            .and_then(|r| r.as_gremlin())
            .filter(|res| res.op == EmitOp::Filter)
            .copied();
        let Some(res) = filter else {
            return Err(Error::unsupported(format!(
                "step `{}` inside until(); only filter steps are allowed",
                kind.name()
            )));
        };
        filters.push((res.describe)(step, lowering)?);
    }
    lowering.encode(&StepDescriptor::Until(filters))
}

/// `union(branches..)`.
pub fn union(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Union(branches) = step else {
        return Err(mismatch(step, "union"));
    };
    if branches.is_empty() {
        return Err(Error::unsupported("union() without branches"));
    }
    let branches = branches
        .iter()
        .map(|branch| lowering.lower_nested(branch))
        .collect::<Result<Vec<_>>>()?;
    builder.union(branches);
    Ok(())
}

/// `where(traversal)`: joins the sub-traversal, then keeps traversers for
/// which it produced a result.
pub fn where_traversal(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::Where(traversal) = step else {
        return Err(mismatch(step, "where"));
    };
    let target = lowering.tags().fresh();
    let body = lowering.lower_nested(traversal)?;
    let joiner = lowering.encode(&StepDescriptor::Joiner { target })?;
    let exists = lowering.encode(&StepDescriptor::Exists(target))?;
    builder.fork_join(joiner, body).filter(exists);
    Ok(())
}

/// `sideEffect(traversal)`: forks without joining back.
pub fn side_effect(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    let Step::SideEffect(traversal) = step else {
        return Err(mismatch(step, "side_effect"));
    };
    let body = lowering.lower_nested(traversal)?;
    builder.fork(body);
    Ok(())
}

/// Routing hints: `repartition`, `broadcast`, `gather`.
pub fn route(
    step: &Step,
    _steps: &mut Steps<'_>,
    lowering: &mut Lowering<'_>,
    builder: &mut JobBuilder,
) -> Result<()> {
    match step {
        Step::Repartition(route) => {
            let resource = lowering.encode(&StepDescriptor::Route(route.clone()))?;
            builder.exchange(resource);
        }
        Step::Broadcast(None) => {
            builder.broadcast();
        }
        Step::Broadcast(Some(route)) => {
            let resource = lowering.encode(&StepDescriptor::Route(route.clone()))?;
            builder.broadcast_by(resource);
        }
        Step::Gather(worker) => {
            builder.aggregate(*worker);
        }
        other => return Err(mismatch(other, "route")),
    }
    Ok(())
}
