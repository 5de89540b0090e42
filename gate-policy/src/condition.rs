//! Declarative rule conditions.
//!
//! A [`Condition`] names the context fields it reads and the thresholds it
//! compares them against, so rule sets stay inspectable and can be loaded from
//! configuration. Composition is limited to `all`, `any` and `not`.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::context::Context;
use crate::rule::RuleFault;

/// Comparison operator applied between two context values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl Comparison {
    /// Returns the operator symbol, e.g. `<=`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }

    /// Applies the operator to two JSON values.
    ///
    /// Numbers compare numerically and strings lexicographically, so ISO-8601
    /// dates order correctly. Booleans and `null` only support `eq` and `ne`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleFault::Incomparable`] when the values cannot be ordered
    /// with this operator.
    pub fn apply(self, left: &Value, right: &Value) -> Result<bool, RuleFault> {
        let ordering = match (left, right) {
            (Value::Number(a), Value::Number(b)) => number_ordering(a, b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ if self.is_equality() => {
                let equal = left == right;
                return Ok(if self == Self::Eq { equal } else { !equal });
            }
            _ => None,
        };

        ordering
            .map(|ordering| self.holds(ordering))
            .ok_or(RuleFault::Incomparable {
                op: self,
                left: value_kind(left),
                right: value_kind(right),
            })
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn number_ordering(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Short JSON type name used in fault messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declarative predicate over a [`Context`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Compares a context field against a literal threshold.
    Compare {
        /// Context key to read.
        field: String,
        /// Operator applied as `field <op> value`.
        op: Comparison,
        /// Threshold captured when the rule was defined.
        value: Value,
    },
    /// Compares two context fields with each other.
    CompareFields {
        /// Left-hand context key.
        left: String,
        /// Operator applied as `left <op> right`.
        op: Comparison,
        /// Right-hand context key.
        right: String,
    },
    /// Holds when the field is present and not `null`.
    Present {
        /// Context key to read.
        field: String,
    },
    /// Holds when the field is the boolean `true`.
    IsTrue {
        /// Context key to read.
        field: String,
    },
    /// Holds when every nested condition holds.
    All {
        /// Nested conditions.
        conditions: Vec<Condition>,
    },
    /// Holds when at least one nested condition holds.
    Any {
        /// Nested conditions.
        conditions: Vec<Condition>,
    },
    /// Holds when the nested condition does not.
    Not {
        /// Negated condition.
        condition: Box<Condition>,
    },
}

impl Condition {
    /// `field <op> value`.
    #[must_use]
    pub fn compare(field: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `left <op> right`, both read from the context.
    #[must_use]
    pub fn compare_fields(left: impl Into<String>, op: Comparison, right: impl Into<String>) -> Self {
        Self::CompareFields {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    /// The field is present and not `null`.
    #[must_use]
    pub fn present(field: impl Into<String>) -> Self {
        Self::Present {
            field: field.into(),
        }
    }

    /// The field is the boolean `true`.
    #[must_use]
    pub fn is_true(field: impl Into<String>) -> Self {
        Self::IsTrue {
            field: field.into(),
        }
    }

    /// Conjunction of the supplied conditions.
    #[must_use]
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All {
            conditions: conditions.into_iter().collect(),
        }
    }

    /// Disjunction of the supplied conditions.
    #[must_use]
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any {
            conditions: conditions.into_iter().collect(),
        }
    }

    /// Negation of the supplied condition.
    #[must_use]
    pub fn negate(condition: Condition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    /// Context keys referenced by this condition, in first-use order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Compare { field, .. } | Self::Present { field } | Self::IsTrue { field } => {
                push_unique(out, field);
            }
            Self::CompareFields { left, right, .. } => {
                push_unique(out, left);
                push_unique(out, right);
            }
            Self::All { conditions } | Self::Any { conditions } => {
                for condition in conditions {
                    condition.collect_fields(out);
                }
            }
            Self::Not { condition } => condition.collect_fields(out),
        }
    }

    /// Evaluates the condition against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleFault::MissingContext`] when a referenced key is absent,
    /// [`RuleFault::Incomparable`] when a comparison mixes incompatible types,
    /// and [`RuleFault::TypeMismatch`] when `is_true` reads a non-boolean.
    pub fn evaluate(&self, ctx: &Context) -> Result<bool, RuleFault> {
        match self {
            Self::Compare { field, op, value } => op.apply(ctx.require(field)?, value),
            Self::CompareFields { left, op, right } => {
                op.apply(ctx.require(left)?, ctx.require(right)?)
            }
            Self::Present { field } => Ok(!ctx.require(field)?.is_null()),
            Self::IsTrue { field } => match ctx.require(field)? {
                Value::Bool(flag) => Ok(*flag),
                other => Err(RuleFault::TypeMismatch {
                    key: field.clone(),
                    expected: "boolean",
                    found: value_kind(other),
                }),
            },
            Self::All { conditions } => {
                for condition in conditions {
                    if !condition.evaluate(ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Any { conditions } => {
                for condition in conditions {
                    if condition.evaluate(ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not { condition } => Ok(!condition.evaluate(ctx)?),
        }
    }
}

fn push_unique<'a>(out: &mut Vec<&'a str>, field: &'a str) {
    if !out.contains(&field) {
        out.push(field);
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn join(f: &mut Formatter<'_>, name: &str, conditions: &[Condition]) -> fmt::Result {
            write!(f, "{name}(")?;
            for (idx, condition) in conditions.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{condition}")?;
            }
            f.write_str(")")
        }

        match self {
            Self::Compare { field, op, value } => write!(f, "{field} {op} {value}"),
            Self::CompareFields { left, op, right } => write!(f, "{left} {op} {right}"),
            Self::Present { field } => write!(f, "{field} is present"),
            Self::IsTrue { field } => write!(f, "{field} is true"),
            Self::All { conditions } => join(f, "all", conditions),
            Self::Any { conditions } => join(f, "any", conditions),
            Self::Not { condition } => write!(f, "not({condition})"),
        }
    }
}
