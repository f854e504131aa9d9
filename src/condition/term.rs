use std::collections::BTreeSet;
use std::fmt;

/// The leaf of a condition: something resolved against the runtime context.
///
/// The derived ordering (variables before type sets, then by content) is the
/// sort key the normalizer uses for literals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// Boolean operation variable, true iff its name is in the true-set.
    ///
    /// # Examples
    /// ```text
    /// $withFriends
    /// ```
    Variable(String),

    /// Type condition, true iff the runtime `__typename` is one of the names.
    ///
    /// Never empty; use [`BooleanExpression::possible_types`] to build one.
    ///
    /// # Examples
    /// ```text
    /// type(Droid, Human)
    /// ```
    ///
    /// [`BooleanExpression::possible_types`]: crate::condition::BooleanExpression::possible_types
    PossibleTypes(BTreeSet<String>),
}

impl Term {
    /// Variable name, if this is a variable term.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            Term::PossibleTypes(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "${}", name),
            Term::PossibleTypes(names) => {
                write!(f, "type(")?;
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", name)?;
                }
                write!(f, ")")
            }
        }
    }
}
