//! Conversion of `@skip`/`@include` directives into conditions.

use thiserror::Error;

use super::expression::BooleanExpression;

/// Value passed to a directive argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectiveValue {
    /// `true` / `false`
    Boolean(bool),
    /// `$name`
    Variable(String),
    /// Any other literal, kept as source text for error messages.
    Other(String),
}

/// A directive as it appears on a field, inline fragment or fragment spread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<(String, DirectiveValue)>,
}

impl Directive {
    pub fn new(name: impl Into<String>, arguments: Vec<(String, DirectiveValue)>) -> Self {
        Directive {
            name: name.into(),
            arguments,
        }
    }

    /// `@skip(if: $variable)`
    pub fn skip(variable: impl Into<String>) -> Self {
        Directive::new("skip", vec![("if".into(), DirectiveValue::Variable(variable.into()))])
    }

    /// `@include(if: $variable)`
    pub fn include(variable: impl Into<String>) -> Self {
        Directive::new(
            "include",
            vec![("if".into(), DirectiveValue::Variable(variable.into()))],
        )
    }

    fn is_conditional(&self) -> bool {
        self.name == "skip" || self.name == "include"
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("wrong number of arguments for '@{directive}' directive: {count}")]
    WrongArgumentCount { directive: String, count: usize },

    #[error("cannot pass {value} to '@{directive}' directive")]
    InvalidArgument { directive: String, value: String },

    #[error("duplicate @skip/@include directives are not allowed")]
    Duplicate,
}

/// Builds the inclusion condition for one selection from its directives.
///
/// Directives other than `@skip` and `@include` are ignored. When both are
/// present the selection is included only if the skip condition is false and
/// the include condition is true.
pub fn condition_from_directives(
    directives: &[Directive],
) -> Result<BooleanExpression, DirectiveError> {
    let conditional: Vec<&Directive> = directives.iter().filter(|d| d.is_conditional()).collect();

    for (i, directive) in conditional.iter().enumerate() {
        if conditional[..i].contains(directive) {
            return Err(DirectiveError::Duplicate);
        }
    }

    let conditions = conditional
        .into_iter()
        .map(directive_condition)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BooleanExpression::all(conditions))
}

fn directive_condition(directive: &Directive) -> Result<BooleanExpression, DirectiveError> {
    let [(_, value)] = directive.arguments.as_slice() else {
        return Err(DirectiveError::WrongArgumentCount {
            directive: directive.name.clone(),
            count: directive.arguments.len(),
        });
    };

    let skip = directive.name == "skip";
    match value {
        DirectiveValue::Boolean(b) => Ok(BooleanExpression::constant(*b != skip)),
        DirectiveValue::Variable(name) => {
            let variable = BooleanExpression::variable(name.clone());
            Ok(if skip { !variable } else { variable })
        }
        DirectiveValue::Other(text) => Err(DirectiveError::InvalidArgument {
            directive: directive.name.clone(),
            value: text.clone(),
        }),
    }
}
