//! Evaluate a condition against a set of true variables

use super::CliError;
use crate::{parse_condition, EvaluationContext};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The condition, in condition syntax
    pub condition: String,
    /// Variables that are true; every other variable is false
    pub variables: Vec<String>,
    /// Runtime `__typename`, for `type(...)` terms
    pub typename: Option<String>,
}

pub fn execute_eval(options: &EvalOptions) -> Result<bool, CliError> {
    let condition = parse_condition(&options.condition)?;
    let ctx = EvaluationContext {
        variables: options.variables.iter().cloned().collect(),
        typename: options.typename.clone(),
    };
    Ok(condition.evaluate(&ctx))
}
