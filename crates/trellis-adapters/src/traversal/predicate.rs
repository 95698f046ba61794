//! Predicates used by `has`, `is`, and `where`.

use std::fmt;

use serde::{Deserialize, Serialize};
use trellis_common::types::Value;

/// A value predicate (`P.gt(17)`, `P.within('a', 'b')`, ..).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Predicate {
    /// Equal to.
    Eq(Value),
    /// Not equal to.
    Neq(Value),
    /// Less than.
    Lt(Value),
    /// Less than or equal to.
    Lte(Value),
    /// Greater than.
    Gt(Value),
    /// Greater than or equal to.
    Gte(Value),
    /// `low <= x < high`.
    Between(Value, Value),
    /// `low < x < high`.
    Inside(Value, Value),
    /// `x < low || x > high`.
    Outside(Value, Value),
    /// Member of the list.
    Within(Vec<Value>),
    /// Not a member of the list.
    Without(Vec<Value>),
    /// String prefix.
    StartingWith(String),
    /// String infix.
    Containing(String),
}

impl Predicate {
    /// Returns the predicate name as written in a traversal.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eq(_) => "eq",
            Self::Neq(_) => "neq",
            Self::Lt(_) => "lt",
            Self::Lte(_) => "lte",
            Self::Gt(_) => "gt",
            Self::Gte(_) => "gte",
            Self::Between(..) => "between",
            Self::Inside(..) => "inside",
            Self::Outside(..) => "outside",
            Self::Within(_) => "within",
            Self::Without(_) => "without",
            Self::StartingWith(_) => "startingWith",
            Self::Containing(_) => "containing",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::Eq(v) | Self::Neq(v) | Self::Lt(v) | Self::Lte(v) | Self::Gt(v) | Self::Gte(v) => {
                write!(f, "{name}({v})")
            }
            Self::Between(lo, hi) | Self::Inside(lo, hi) | Self::Outside(lo, hi) => {
                write!(f, "{name}({lo}, {hi})")
            }
            Self::Within(values) | Self::Without(values) => {
                write!(f, "{name}({})", Value::List(values.clone()))
            }
            Self::StartingWith(s) | Self::Containing(s) => write!(f, "{name}('{s}')"),
        }
    }
}

/// Comparison between the current traverser and a labelled one, as in
/// `where(gt('a'))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Compare {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Predicate::Gt(Value::Int64(17)).to_string(), "gt(17)");
        assert_eq!(
            Predicate::Within(vec![Value::from("a"), Value::from("b")]).to_string(),
            "within(['a', 'b'])"
        );
        assert_eq!(
            Predicate::StartingWith("ma".into()).to_string(),
            "startingWith('ma')"
        );
    }

    #[test]
    fn test_json_shape() {
        let p: Predicate = serde_json::from_str(r#"{"gt":{"Int64":17}}"#).unwrap();
        assert_eq!(p, Predicate::Gt(Value::Int64(17)));
    }
}
