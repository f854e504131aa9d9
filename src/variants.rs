//! Enumeration of the response shapes a set of conditions can produce.
//!
//! A code generator calls into this module once per selection set: it needs
//! to know which fields share a condition ([`group_by_condition`]) and how
//! many distinct combinations of included fields can actually occur at
//! runtime ([`distinct_shapes`]).

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::condition::BooleanExpression;
use crate::evaluator::EvaluationContext;
use crate::normalizer::{normalize, NormalForm};

/// Upper bound on variables enumerated exhaustively (2^16 assignments).
pub const MAX_ENUMERATED_VARIABLES: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("cannot enumerate {count} variables (maximum {max})")]
    TooManyVariables { count: usize, max: usize },
}

/// Every subset of `variables`, i.e. every way of setting them true/false.
///
/// Subsets are listed in binary counting order over the sorted names, so the
/// first is the empty set and the last holds every variable.
pub fn possible_variable_values(
    variables: &BTreeSet<String>,
) -> Result<Vec<BTreeSet<String>>, VariantError> {
    if variables.len() > MAX_ENUMERATED_VARIABLES {
        return Err(VariantError::TooManyVariables {
            count: variables.len(),
            max: MAX_ENUMERATED_VARIABLES,
        });
    }

    let names: Vec<&String> = variables.iter().collect();
    let total = 1usize << names.len();
    let values = (0..total)
        .map(|mask| {
            names
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1usize << *bit) != 0)
                .map(|(_, name)| (*name).clone())
                .collect()
        })
        .collect();
    Ok(values)
}

/// Groups keyed conditions by normal form.
///
/// Groups come back in normal-form order; keys keep their input order within
/// a group.
pub fn group_by_condition<'a, K, I>(items: I) -> Vec<(NormalForm, Vec<K>)>
where
    I: IntoIterator<Item = (K, &'a BooleanExpression)>,
{
    let mut groups: BTreeMap<NormalForm, Vec<K>> = BTreeMap::new();
    for (key, condition) in items {
        groups.entry(normalize(condition)).or_default().push(key);
    }
    groups.into_iter().collect()
}

/// Distinct inclusion patterns of `conditions` over every runtime context.
///
/// Each pattern has one flag per condition. Contexts range over every
/// assignment of the variables the conditions mention, combined with each
/// candidate typename (or with no typename when `typenames` is empty).
pub fn distinct_shapes(
    conditions: &[BooleanExpression],
    typenames: &BTreeSet<String>,
) -> Result<Vec<Vec<bool>>, VariantError> {
    let variables: BTreeSet<String> = conditions.iter().flat_map(|c| c.variables()).collect();
    let assignments = possible_variable_values(&variables)?;

    let typenames: Vec<Option<&String>> = if typenames.is_empty() {
        vec![None]
    } else {
        typenames.iter().map(Some).collect()
    };

    let mut shapes = BTreeSet::new();
    for assignment in &assignments {
        let base = EvaluationContext::new(assignment.iter().cloned());
        for typename in &typenames {
            let ctx = match typename {
                Some(name) => base.with_typename(name.as_str()),
                None => base.clone(),
            };
            let shape: Vec<bool> = conditions.iter().map(|c| c.evaluate(&ctx)).collect();
            shapes.insert(shape);
        }
    }
    Ok(shapes.into_iter().collect())
}
