use std::collections::BTreeSet;
use std::fmt;
use std::ops;

use thiserror::Error;

use super::term::Term;

/// Which n-ary combinator an operand list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    And,
    Or,
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::And => write!(f, "and"),
            OperatorKind::Or => write!(f, "or"),
        }
    }
}

/// Errors raised while building a condition tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// `And`/`Or` need at least two operands.
    #[error("'{kind}' condition needs at least 2 operands, got {count}")]
    TooFewOperands { kind: OperatorKind, count: usize },

    /// A type condition must name at least one possible type.
    #[error("type condition has no possible types")]
    EmptyPossibleTypes,
}

/// Operand list of an `And`/`Or` node, holding at least two expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operands(Vec<BooleanExpression>);

impl Operands {
    pub fn new(
        kind: OperatorKind,
        operands: Vec<BooleanExpression>,
    ) -> Result<Self, ExpressionError> {
        if operands.len() < 2 {
            return Err(ExpressionError::TooFewOperands {
                kind,
                count: operands.len(),
            });
        }
        Ok(Operands(operands))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BooleanExpression> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BooleanExpression] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<BooleanExpression> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Operands {
    type Item = &'a BooleanExpression;
    type IntoIter = std::slice::Iter<'a, BooleanExpression>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A condition attached to a field or fragment.
///
/// Trees are immutable once built. Every transformation ([`simplify`],
/// [`normalize`]) returns a new value.
///
/// # Examples
///
/// ```
/// use gqlshape::condition::BooleanExpression;
///
/// let friends = BooleanExpression::variable("withFriends");
/// let droid = BooleanExpression::possible_types(["Droid"]).unwrap();
/// let condition = friends & !droid;
///
/// assert_eq!(condition.to_string(), "$withFriends & !type(Droid)");
/// ```
///
/// [`simplify`]: BooleanExpression::simplify
/// [`normalize`]: crate::normalizer::normalize
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BooleanExpression {
    True,
    False,
    Reference(Term),
    Not(Box<BooleanExpression>),
    And(Operands),
    Or(Operands),
}

impl BooleanExpression {
    pub fn variable(name: impl Into<String>) -> Self {
        BooleanExpression::Reference(Term::Variable(name.into()))
    }

    /// Type condition matching any of `names`.
    pub fn possible_types<I, S>(names: I) -> Result<Self, ExpressionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ExpressionError::EmptyPossibleTypes);
        }
        Ok(BooleanExpression::Reference(Term::PossibleTypes(names)))
    }

    pub fn constant(value: bool) -> Self {
        if value {
            BooleanExpression::True
        } else {
            BooleanExpression::False
        }
    }

    /// `And` over an explicit operand list (at least two).
    pub fn conjunction(operands: Vec<BooleanExpression>) -> Result<Self, ExpressionError> {
        Operands::new(OperatorKind::And, operands).map(BooleanExpression::And)
    }

    /// `Or` over an explicit operand list (at least two).
    pub fn disjunction(operands: Vec<BooleanExpression>) -> Result<Self, ExpressionError> {
        Operands::new(OperatorKind::Or, operands).map(BooleanExpression::Or)
    }

    pub fn and(self, other: BooleanExpression) -> Self {
        BooleanExpression::And(Operands(vec![self, other]))
    }

    pub fn or(self, other: BooleanExpression) -> Self {
        BooleanExpression::Or(Operands(vec![self, other]))
    }

    /// Conjunction of any number of operands.
    ///
    /// No operand is `True`, a single operand is returned as is.
    pub fn all<I: IntoIterator<Item = BooleanExpression>>(operands: I) -> Self {
        let mut operands: Vec<_> = operands.into_iter().collect();
        match operands.len() {
            0 => BooleanExpression::True,
            1 => operands.swap_remove(0),
            _ => BooleanExpression::And(Operands(operands)),
        }
    }

    /// Disjunction of any number of operands.
    ///
    /// No operand is `False`, a single operand is returned as is.
    pub fn any<I: IntoIterator<Item = BooleanExpression>>(operands: I) -> Self {
        let mut operands: Vec<_> = operands.into_iter().collect();
        match operands.len() {
            0 => BooleanExpression::False,
            1 => operands.swap_remove(0),
            _ => BooleanExpression::Or(Operands(operands)),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, BooleanExpression::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, BooleanExpression::False)
    }

    /// Local cleanup that keeps the shape of the tree.
    ///
    /// Drops neutral constants, short-circuits absorbing ones, folds double
    /// negation, flattens nested operators of the same kind and removes
    /// repeated operands. Logically equivalent trees may still differ
    /// afterwards; use [`normalize`] for a canonical key.
    ///
    /// [`normalize`]: crate::normalizer::normalize
    pub fn simplify(&self) -> BooleanExpression {
        match self {
            BooleanExpression::True
            | BooleanExpression::False
            | BooleanExpression::Reference(_) => self.clone(),
            BooleanExpression::Not(inner) => match inner.simplify() {
                BooleanExpression::True => BooleanExpression::False,
                BooleanExpression::False => BooleanExpression::True,
                BooleanExpression::Not(e) => *e,
                e => BooleanExpression::Not(Box::new(e)),
            },
            BooleanExpression::And(operands) => {
                let mut kept = Vec::new();
                for operand in operands {
                    match operand.simplify() {
                        BooleanExpression::True => {}
                        BooleanExpression::False => return BooleanExpression::False,
                        BooleanExpression::And(nested) => {
                            for e in nested.into_vec() {
                                push_unique(&mut kept, e);
                            }
                        }
                        e => push_unique(&mut kept, e),
                    }
                }
                BooleanExpression::all(kept)
            }
            BooleanExpression::Or(operands) => {
                let mut kept = Vec::new();
                for operand in operands {
                    match operand.simplify() {
                        BooleanExpression::False => {}
                        BooleanExpression::True => return BooleanExpression::True,
                        BooleanExpression::Or(nested) => {
                            for e in nested.into_vec() {
                                push_unique(&mut kept, e);
                            }
                        }
                        e => push_unique(&mut kept, e),
                    }
                }
                BooleanExpression::any(kept)
            }
        }
    }

    /// Names of all variables referenced anywhere in the tree.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.visit_terms(&mut |term| {
            if let Term::Variable(name) = term {
                out.insert(name.clone());
            }
        });
        out
    }

    /// Every typename mentioned by a type condition in the tree.
    pub fn typenames(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.visit_terms(&mut |term| {
            if let Term::PossibleTypes(names) = term {
                out.extend(names.iter().cloned());
            }
        });
        out
    }

    fn visit_terms(&self, f: &mut dyn FnMut(&Term)) {
        match self {
            BooleanExpression::True | BooleanExpression::False => {}
            BooleanExpression::Reference(term) => f(term),
            BooleanExpression::Not(inner) => inner.visit_terms(f),
            BooleanExpression::And(operands) | BooleanExpression::Or(operands) => {
                for operand in operands {
                    operand.visit_terms(f);
                }
            }
        }
    }

    /// Binding strength used by `Display`; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            BooleanExpression::Or(_) => 1,
            BooleanExpression::And(_) => 2,
            _ => 3,
        }
    }
}

fn push_unique(kept: &mut Vec<BooleanExpression>, e: BooleanExpression) {
    if !kept.contains(&e) {
        kept.push(e);
    }
}

impl From<bool> for BooleanExpression {
    fn from(value: bool) -> Self {
        BooleanExpression::constant(value)
    }
}

impl From<Term> for BooleanExpression {
    fn from(term: Term) -> Self {
        BooleanExpression::Reference(term)
    }
}

impl ops::Not for BooleanExpression {
    type Output = BooleanExpression;

    fn not(self) -> Self::Output {
        BooleanExpression::Not(Box::new(self))
    }
}

impl ops::BitAnd for BooleanExpression {
    type Output = BooleanExpression;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl ops::BitOr for BooleanExpression {
    type Output = BooleanExpression;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

/// Prints the condition syntax accepted by [`crate::parser::Parser`].
///
/// Nested operators of the same kind keep their parentheses so that parsing
/// the output gives back the same tree.
impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanExpression::True => write!(f, "true"),
            BooleanExpression::False => write!(f, "false"),
            BooleanExpression::Reference(term) => write!(f, "{}", term),
            BooleanExpression::Not(inner) => {
                if inner.precedence() < 3 {
                    write!(f, "!({})", inner)
                } else {
                    write!(f, "!{}", inner)
                }
            }
            BooleanExpression::And(operands) => write_operands(f, operands, " & ", 2),
            BooleanExpression::Or(operands) => write_operands(f, operands, " | ", 1),
        }
    }
}

fn write_operands(
    f: &mut fmt::Formatter<'_>,
    operands: &Operands,
    separator: &str,
    precedence: u8,
) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        if operand.precedence() <= precedence {
            write!(f, "({})", operand)?;
        } else {
            write!(f, "{}", operand)?;
        }
    }
    Ok(())
}
