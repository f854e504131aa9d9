use std::collections::HashSet;

use crate::condition::{BooleanExpression, Term};

/// Runtime facts a condition is evaluated against.
///
/// Variables not in the set are false (closed world). Built once per
/// response and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationContext {
    /// Names of the boolean variables that are true
    pub variables: HashSet<String>,
    /// The `__typename` of the object being read, if known
    pub typename: Option<String>,
}

impl EvaluationContext {
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EvaluationContext {
            variables: variables.into_iter().map(Into::into).collect(),
            typename: None,
        }
    }

    /// Same variables, evaluated for an object of the given type.
    pub fn with_typename(&self, typename: impl Into<String>) -> Self {
        EvaluationContext {
            variables: self.variables.clone(),
            typename: Some(typename.into()),
        }
    }

    fn holds(&self, term: &Term) -> bool {
        match term {
            Term::Variable(name) => self.variables.contains(name),
            Term::PossibleTypes(names) => self
                .typename
                .as_ref()
                .is_some_and(|typename| names.contains(typename)),
        }
    }
}

/// Evaluates a condition to a definite boolean.
///
/// Total over every well-formed tree: unknown variables are simply false.
///
/// # Examples
///
/// ```
/// use gqlshape::condition::BooleanExpression;
/// use gqlshape::evaluator::{evaluate, EvaluationContext};
///
/// let a = BooleanExpression::variable("a");
/// let b = BooleanExpression::variable("b");
/// let ctx = EvaluationContext::new(["b"]);
///
/// assert!(evaluate(&(a.clone() | b.clone()), &ctx));
/// assert!(!evaluate(&(a & b), &ctx));
/// ```
pub fn evaluate(expr: &BooleanExpression, ctx: &EvaluationContext) -> bool {
    match expr {
        BooleanExpression::True => true,
        BooleanExpression::False => false,
        BooleanExpression::Reference(term) => ctx.holds(term),
        BooleanExpression::Not(inner) => !evaluate(inner, ctx),
        BooleanExpression::And(operands) => operands.iter().all(|e| evaluate(e, ctx)),
        BooleanExpression::Or(operands) => operands.iter().any(|e| evaluate(e, ctx)),
    }
}

impl BooleanExpression {
    pub fn evaluate(&self, ctx: &EvaluationContext) -> bool {
        evaluate(self, ctx)
    }
}
