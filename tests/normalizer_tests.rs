use std::collections::{BTreeSet, HashMap};

use gqlshape::{
    distinct_shapes, group_by_condition, normalize, parse_condition, possible_variable_values,
    BooleanExpression, EvaluationContext, NormalForm, VariantError,
};

fn var(name: &str) -> BooleanExpression {
    BooleanExpression::variable(name)
}

fn types(names: &[&str]) -> BooleanExpression {
    BooleanExpression::possible_types(names.iter().copied()).unwrap()
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn normalized(text: &str) -> String {
    normalize(&parse_condition(text).unwrap()).to_string()
}

/// Every tree of depth two over the given leaves, plus a sample of depth
/// three.
fn corpus(leaves: &[BooleanExpression]) -> Vec<BooleanExpression> {
    let mut level1 = Vec::new();
    for x in leaves {
        level1.push(!x.clone());
        for y in leaves {
            level1.push(x.clone() & y.clone());
            level1.push(x.clone() | y.clone());
        }
    }

    let mut level2 = Vec::new();
    for x in &level1 {
        level2.push(!x.clone());
        for y in level1.iter().step_by(7) {
            level2.push(x.clone() & y.clone());
            level2.push(x.clone() | y.clone());
        }
    }

    let mut out: Vec<BooleanExpression> = leaves.to_vec();
    out.extend(level1);
    out.extend(level2);
    out
}

fn variable_leaves() -> Vec<BooleanExpression> {
    vec![
        BooleanExpression::True,
        BooleanExpression::False,
        var("a"),
        var("b"),
        var("c"),
    ]
}

/// Every context over the expression's variables and the given typenames.
fn contexts(expr: &BooleanExpression, typenames: &[&str]) -> Vec<EvaluationContext> {
    let mut out = Vec::new();
    for assignment in possible_variable_values(&expr.variables()).unwrap() {
        let base = EvaluationContext::new(assignment);
        for typename in typenames {
            out.push(base.with_typename(*typename));
        }
        out.push(base);
    }
    out
}

// ============================================================================
// Required properties
// ============================================================================

#[test]
fn test_contradiction_is_false() {
    assert_eq!(normalize(&(var("a") & !var("a"))), NormalForm::False);
    assert_eq!(normalized("$a & $b & !$a"), "false");
}

#[test]
fn test_excluded_middle_is_true() {
    assert_eq!(normalize(&(var("a") | !var("a"))), NormalForm::True);
    assert_eq!(normalized("$b | !$b & $c | !$c"), "true");
}

#[test]
fn test_semantic_preservation_exhaustive() {
    let mut leaves = variable_leaves();
    leaves.push(types(&["Droid"]));
    leaves.push(types(&["Droid", "Human"]));

    let typenames = ["Droid", "Human", "Starship"];
    for expr in corpus(&leaves) {
        let form = normalize(&expr);
        let back = form.to_expression();
        for ctx in contexts(&expr, &typenames) {
            assert_eq!(
                expr.evaluate(&ctx),
                back.evaluate(&ctx),
                "{} normalized to {} disagrees on {:?}",
                expr,
                form,
                ctx
            );
            assert_eq!(expr.evaluate(&ctx), form.evaluate(&ctx));
        }
    }
}

#[test]
fn test_idempotent() {
    let mut leaves = variable_leaves();
    leaves.push(types(&["Human"]));
    leaves.push(types(&["Droid", "Human"]));

    for expr in corpus(&leaves) {
        let form = normalize(&expr);
        assert_eq!(normalize(&form.to_expression()), form, "not idempotent on {}", expr);
    }
}

#[test]
fn test_equivalent_trees_share_a_normal_form() {
    let mut by_truth_table: HashMap<Vec<bool>, NormalForm> = HashMap::new();
    let all_vars = names(&["a", "b", "c"]);
    let assignments = possible_variable_values(&all_vars).unwrap();

    for expr in corpus(&variable_leaves()) {
        let table: Vec<bool> = assignments
            .iter()
            .map(|vars| expr.evaluate(&EvaluationContext::new(vars.iter().cloned())))
            .collect();
        let form = normalize(&expr);
        match by_truth_table.get(&table) {
            Some(existing) => assert_eq!(existing, &form, "{} has a different key", expr),
            None => {
                by_truth_table.insert(table, form);
            }
        }
    }
}

#[test]
fn test_operand_order_is_irrelevant() {
    let left = (var("a") & var("b")) | (var("b") & var("a"));
    let right = var("b") & (var("a") | BooleanExpression::False);
    assert_eq!(normalize(&left), normalize(&right));

    let right = var("b") & (var("a") | BooleanExpression::True);
    assert_eq!(normalize(&right), normalize(&var("b")));
}

// ============================================================================
// Canonical output
// ============================================================================

#[test]
fn test_absorption() {
    assert_eq!(normalized("$a | $a & $b"), "$a");
    assert_eq!(normalized("($a | $b) & ($a | $c)"), "$a | $b & $c");
}

#[test]
fn test_consensus_merges_complementary_clauses() {
    assert_eq!(normalized("$a & $b | $a & !$b"), "$a");
    assert_eq!(normalized("$a & $b | !$a & $c"), "$a & $b | !$a & $c | $b & $c");
}

#[test]
fn test_de_morgan() {
    assert_eq!(normalized("!($a | $b)"), "!$a & !$b");
    assert_eq!(normalized("!($a & $b)"), "!$a | !$b");
    assert_eq!(normalized("!!$a"), "$a");
}

#[test]
fn test_constants() {
    assert_eq!(normalized("true"), "true");
    assert_eq!(normalized("!true"), "false");
    assert_eq!(normalized("$a & false"), "false");
    assert_eq!(normalized("$a | true"), "true");
}

#[test]
fn test_type_conditions_sort_after_variables() {
    assert_eq!(normalized("type(Droid) & $a | !$a"), "!$a | type(Droid)");
    assert_eq!(normalized("type(Human, Droid) & $b"), "$b & type(Droid, Human)");
}

#[test]
fn test_type_conditions_share_one_typename() {
    assert_eq!(normalize(&(types(&["Droid"]) & !types(&["Droid", "Human"]))), NormalForm::False);
    assert_eq!(normalize(&(types(&["Droid"]) & types(&["Human"]))), NormalForm::False);
    assert_eq!(
        normalize(&(types(&["Droid"]) | types(&["Human"]))),
        normalize(&types(&["Droid", "Human"]))
    );
    assert_eq!(normalized("type(Droid) & type(Droid, Human)"), "type(Droid)");
    assert_eq!(normalized("type(Droid, Human) & !type(Human)"), "type(Droid)");
    assert_eq!(normalized("!type(Droid) & !type(Human)"), "!type(Droid, Human)");
    assert_eq!(normalized("type(Droid) | !type(Droid, Human)"), "!type(Human)");
    assert_eq!(normalized("!type(Droid) | !type(Human)"), "true");
}

#[test]
fn test_type_conditions_with_variables() {
    assert_eq!(normalized("$a & type(Droid) | $a & type(Human)"), "$a & type(Droid, Human)");
    assert_eq!(
        normalized("$a & type(Droid) | $b & type(Human)"),
        "$a & $b & type(Droid, Human) | $a & type(Droid) | $b & type(Human)"
    );
    assert_eq!(
        normalized("$a & type(Droid) | !$a & !type(Droid)"),
        "$a & type(Droid) | !$a & !type(Droid)"
    );
    assert_eq!(normalized("$a & type(Droid) | !$a & type(Droid)"), "type(Droid)");
}

#[test]
fn test_equivalent_type_conditions_share_a_normal_form() {
    let leaves = vec![
        BooleanExpression::True,
        var("a"),
        var("b"),
        types(&["Droid"]),
        types(&["Human"]),
        types(&["Droid", "Human"]),
    ];
    let assignments = possible_variable_values(&names(&["a", "b"])).unwrap();
    // Starship stands for every typename no condition mentions
    let typenames = [None, Some("Droid"), Some("Human"), Some("Starship")];

    let mut by_truth_table: HashMap<Vec<bool>, NormalForm> = HashMap::new();
    for expr in corpus(&leaves) {
        let mut table = Vec::new();
        for vars in &assignments {
            let base = EvaluationContext::new(vars.iter().cloned());
            for typename in typenames {
                let ctx = match typename {
                    Some(name) => base.with_typename(name),
                    None => base.clone(),
                };
                table.push(expr.evaluate(&ctx));
            }
        }
        let form = normalize(&expr);
        match by_truth_table.get(&table) {
            Some(existing) => assert_eq!(existing, &form, "{} has a different key", expr),
            None => {
                by_truth_table.insert(table, form);
            }
        }
    }
}

#[test]
fn test_clause_structure() {
    let form = normalize(&parse_condition("!$b & $a | $c").unwrap());
    let clauses = form.clauses();
    assert_eq!(clauses.len(), 2);
    assert_eq!(clauses[0].len(), 2);
    assert!(clauses[0].literals()[1].negated);
    assert_eq!(clauses[0].literals()[0].term.to_string(), "$a");
    assert_eq!(clauses[1].to_string(), "$c");
}

#[test]
fn test_normal_form_is_usable_as_key() {
    let mut seen = BTreeSet::new();
    seen.insert(normalize(&parse_condition("$a & $b").unwrap()));
    seen.insert(normalize(&parse_condition("$b & $a").unwrap()));
    seen.insert(normalize(&parse_condition("$b and $a and $a").unwrap()));
    assert_eq!(seen.len(), 1);
}

// ============================================================================
// Variants
// ============================================================================

#[test]
fn test_possible_variable_values() {
    let values = possible_variable_values(&names(&["a", "b"])).unwrap();
    assert_eq!(
        values,
        vec![names(&[]), names(&["a"]), names(&["b"]), names(&["a", "b"])]
    );
    assert_eq!(possible_variable_values(&names(&[])).unwrap(), vec![names(&[])]);
}

#[test]
fn test_possible_variable_values_limit() {
    let many: BTreeSet<String> = (0..17).map(|i| format!("v{}", i)).collect();
    assert!(matches!(
        possible_variable_values(&many),
        Err(VariantError::TooManyVariables { count: 17, .. })
    ));
}

#[test]
fn test_group_by_condition() {
    let conditions = [
        ("x", parse_condition("$a & $b").unwrap()),
        ("y", parse_condition("$b & $a").unwrap()),
        ("z", parse_condition("!$a").unwrap()),
    ];
    let groups = group_by_condition(conditions.iter().map(|(k, c)| (*k, c)));

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0.to_string(), "$a & $b");
    assert_eq!(groups[0].1, vec!["x", "y"]);
    assert_eq!(groups[1].0.to_string(), "!$a");
    assert_eq!(groups[1].1, vec!["z"]);
}

#[test]
fn test_distinct_shapes() {
    let conditions = vec![var("a"), !var("a"), var("a") & var("b")];
    let shapes = distinct_shapes(&conditions, &BTreeSet::new()).unwrap();
    assert_eq!(
        shapes,
        vec![
            vec![false, true, false],
            vec![true, false, false],
            vec![true, false, true],
        ]
    );
}

#[test]
fn test_distinct_shapes_with_typenames() {
    let conditions = vec![types(&["Droid"]), types(&["Human"]) & var("a")];
    let shapes = distinct_shapes(&conditions, &names(&["Droid", "Human"])).unwrap();
    assert_eq!(
        shapes,
        vec![vec![false, false], vec![false, true], vec![true, false]]
    );
}
