//! Group conditions by normal form and count the response shapes they allow

use std::collections::BTreeSet;

use super::CliError;
use crate::{distinct_shapes, group_by_condition, parse_condition, BooleanExpression, NormalForm};

/// Options for the variants command
#[derive(Debug, Clone, Default)]
pub struct VariantsOptions {
    /// One condition per field
    pub conditions: Vec<String>,
    /// Candidate runtime typenames
    pub typenames: Vec<String>,
}

#[derive(Debug)]
pub struct VariantsReport {
    /// Fields (by index into the input) sharing each normal form
    pub groups: Vec<(NormalForm, Vec<usize>)>,
    /// Distinct inclusion patterns, one flag per field
    pub shapes: Vec<Vec<bool>>,
}

impl std::fmt::Display for VariantsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "groups:")?;
        for (form, fields) in &self.groups {
            let fields: Vec<String> = fields.iter().map(|i| format!("#{}", i)).collect();
            writeln!(f, "  {}: {}", form, fields.join(", "))?;
        }
        writeln!(f, "shapes: {}", self.shapes.len())?;
        for shape in &self.shapes {
            let flags: String = shape.iter().map(|&b| if b { '1' } else { '0' }).collect();
            writeln!(f, "  {}", flags)?;
        }
        Ok(())
    }
}

pub fn execute_variants(options: &VariantsOptions) -> Result<VariantsReport, CliError> {
    let conditions = options
        .conditions
        .iter()
        .map(|text| parse_condition(text))
        .collect::<Result<Vec<BooleanExpression>, _>>()?;
    let typenames: BTreeSet<String> = options.typenames.iter().cloned().collect();

    let groups = group_by_condition(conditions.iter().enumerate());
    let shapes = distinct_shapes(&conditions, &typenames)?;
    Ok(VariantsReport { groups, shapes })
}
