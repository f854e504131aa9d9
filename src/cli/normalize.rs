//! Normalize or simplify a condition

use super::CliError;
use crate::{parse_condition, BooleanExpression, NormalForm};

/// Options for the normalize command
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub condition: String,
    /// Only apply the syntactic cleanup, without computing a normal form
    pub simplify_only: bool,
}

/// Result of a normalize operation
#[derive(Debug)]
pub enum NormalizeResult {
    Simplified(BooleanExpression),
    Normalized(NormalForm),
}

impl std::fmt::Display for NormalizeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeResult::Simplified(expr) => write!(f, "{}", expr),
            NormalizeResult::Normalized(form) => write!(f, "{}", form),
        }
    }
}

pub fn execute_normalize(options: &NormalizeOptions) -> Result<NormalizeResult, CliError> {
    let condition = parse_condition(&options.condition)?;
    if options.simplify_only {
        return Ok(NormalizeResult::Simplified(condition.simplify()));
    }
    Ok(NormalizeResult::Normalized(condition.normalize()))
}
