//! Canonical disjunctive normal form for conditions.
//!
//! [`normalize`] turns any [`BooleanExpression`] into a [`NormalForm`]: the
//! sorted disjunction of all prime implicants of the expression (its Blake
//! canonical form). Two conditions have equal normal forms exactly when they
//! agree on every assignment of their terms, which is what lets a code
//! generator emit one model per distinct condition instead of one per
//! spelling.
//!
//! Variables are independent atoms. Type conditions are not: they all test
//! the one runtime `__typename`, so each conjunction carries a single
//! constraint on it, either "one of these names" or "none of these names".
//! `type(Droid) | type(Human)` and `type(Droid, Human)` share a normal form,
//! and `type(Droid) & !type(Droid, Human)` is `false`.
//!
//! # Steps
//!
//! 1. Negations are pushed down to the terms (De Morgan).
//! 2. `And` is distributed over `Or`, producing clauses (sets of literals).
//!    Type sets in a clause are intersected. Clauses holding `x` and `!x`,
//!    or an empty type set, are dropped on the spot.
//! 3. Clauses that contain another clause are dropped (absorption).
//! 4. Consensus terms are added until nothing new appears, with absorption
//!    after each round. `x & y | !x & y` becomes `y`, and `x | !x` becomes
//!    the empty clause, i.e. `true`. Clauses that do not clash on a
//!    variable also resolve on `__typename` by uniting their type sets.
//! 5. Literals and clauses are sorted.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::condition::{BooleanExpression, Term};
use crate::evaluator::EvaluationContext;

/// A term, possibly negated.
///
/// Ordering is by term first, so `$a` and `!$a` sit next to each other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    pub term: Term,
    pub negated: bool,
}

impl Literal {
    pub fn positive(term: Term) -> Self {
        Literal { term, negated: false }
    }

    pub fn negative(term: Term) -> Self {
        Literal { term, negated: true }
    }

    fn complement(&self) -> Literal {
        Literal {
            term: self.term.clone(),
            negated: !self.negated,
        }
    }

    fn to_expression(&self) -> BooleanExpression {
        let reference = BooleanExpression::Reference(self.term.clone());
        if self.negated { !reference } else { reference }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "{}", self.term)
    }
}

/// A conjunction of literals, sorted and free of duplicates and
/// contradictions. Never empty inside a [`NormalForm::Clauses`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Clause(Vec<Literal>);

impl Clause {
    pub fn literals(&self) -> &[Literal] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_expression(&self) -> BooleanExpression {
        BooleanExpression::all(self.0.iter().map(Literal::to_expression))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, literal) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}

/// Canonical representative of a condition.
///
/// Structural equality is logical equivalence, so this type is meant to be
/// used directly as a map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NormalForm {
    /// Never satisfiable
    False,
    /// Always satisfied
    True,
    /// Non-empty, sorted list of prime implicants
    Clauses(Vec<Clause>),
}

impl NormalForm {
    pub fn is_true(&self) -> bool {
        matches!(self, NormalForm::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, NormalForm::False)
    }

    pub fn clauses(&self) -> &[Clause] {
        match self {
            NormalForm::Clauses(clauses) => clauses,
            NormalForm::True | NormalForm::False => &[],
        }
    }

    /// Rebuilds a tree: an `Or` of `And`s of literals, with single-element
    /// levels collapsed.
    pub fn to_expression(&self) -> BooleanExpression {
        match self {
            NormalForm::True => BooleanExpression::True,
            NormalForm::False => BooleanExpression::False,
            NormalForm::Clauses(clauses) => {
                BooleanExpression::any(clauses.iter().map(Clause::to_expression))
            }
        }
    }

    pub fn evaluate(&self, ctx: &EvaluationContext) -> bool {
        self.to_expression().evaluate(ctx)
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalForm::True => write!(f, "true"),
            NormalForm::False => write!(f, "false"),
            NormalForm::Clauses(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", clause)?;
                }
                Ok(())
            }
        }
    }
}

type LiteralSet = BTreeSet<Literal>;

/// What a conjunction requires of the runtime `__typename`.
///
/// Every type term tests the same value, so a conjunction keeps at most one
/// of these instead of independent type literals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum TypeSet {
    /// One of the names. Never empty.
    Only(BTreeSet<String>),
    /// None of the names, or no typename at all. Empty means unconstrained.
    Except(BTreeSet<String>),
}

impl TypeSet {
    fn any() -> Self {
        TypeSet::Except(BTreeSet::new())
    }

    fn is_any(&self) -> bool {
        matches!(self, TypeSet::Except(names) if names.is_empty())
    }

    /// `None` when no typename satisfies both.
    fn intersect(&self, other: &TypeSet) -> Option<TypeSet> {
        let set = match (self, other) {
            (TypeSet::Only(a), TypeSet::Only(b)) => {
                TypeSet::Only(a.intersection(b).cloned().collect())
            }
            (TypeSet::Only(a), TypeSet::Except(b)) | (TypeSet::Except(b), TypeSet::Only(a)) => {
                TypeSet::Only(a.difference(b).cloned().collect())
            }
            (TypeSet::Except(a), TypeSet::Except(b)) => {
                TypeSet::Except(a.union(b).cloned().collect())
            }
        };
        match &set {
            TypeSet::Only(names) if names.is_empty() => None,
            _ => Some(set),
        }
    }

    fn union(&self, other: &TypeSet) -> TypeSet {
        match (self, other) {
            (TypeSet::Only(a), TypeSet::Only(b)) => TypeSet::Only(a.union(b).cloned().collect()),
            (TypeSet::Only(a), TypeSet::Except(b)) | (TypeSet::Except(b), TypeSet::Only(a)) => {
                TypeSet::Except(b.difference(a).cloned().collect())
            }
            (TypeSet::Except(a), TypeSet::Except(b)) => {
                TypeSet::Except(a.intersection(b).cloned().collect())
            }
        }
    }

    fn is_subset(&self, other: &TypeSet) -> bool {
        match (self, other) {
            (TypeSet::Only(a), TypeSet::Only(b)) => a.is_subset(b),
            (TypeSet::Only(a), TypeSet::Except(b)) => a.is_disjoint(b),
            (TypeSet::Except(_), TypeSet::Only(_)) => false,
            (TypeSet::Except(a), TypeSet::Except(b)) => b.is_subset(a),
        }
    }

    fn to_literal(&self) -> Option<Literal> {
        match self {
            TypeSet::Only(names) => Some(Literal::positive(Term::PossibleTypes(names.clone()))),
            TypeSet::Except(names) if names.is_empty() => None,
            TypeSet::Except(names) => Some(Literal::negative(Term::PossibleTypes(names.clone()))),
        }
    }
}

/// A conjunction under construction: variable literals plus one typename
/// constraint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Product {
    literals: LiteralSet,
    types: TypeSet,
}

impl Product {
    fn any() -> Self {
        Product {
            literals: LiteralSet::new(),
            types: TypeSet::any(),
        }
    }

    fn is_tautology(&self) -> bool {
        self.literals.is_empty() && self.types.is_any()
    }

    /// The conjunction of both, or `None` if it can never hold.
    fn merge(&self, other: &Product) -> Option<Product> {
        let literals: LiteralSet = self.literals.union(&other.literals).cloned().collect();
        if is_contradictory(&literals) {
            return None;
        }
        let types = self.types.intersect(&other.types)?;
        Some(Product { literals, types })
    }

    /// Every context satisfying `other` also satisfies `self`.
    fn covers(&self, other: &Product) -> bool {
        self.literals.is_subset(&other.literals) && other.types.is_subset(&self.types)
    }

    fn into_clause(self) -> Clause {
        let mut literals: Vec<Literal> = self.literals.into_iter().collect();
        // Type terms sort after variables
        literals.extend(self.types.to_literal());
        Clause(literals)
    }
}

/// Computes the canonical normal form of `expr`.
///
/// # Examples
///
/// ```
/// use gqlshape::condition::BooleanExpression;
/// use gqlshape::normalizer::{normalize, NormalForm};
///
/// let a = BooleanExpression::variable("a");
/// let b = BooleanExpression::variable("b");
///
/// assert_eq!(normalize(&(a.clone() | !a.clone())), NormalForm::True);
/// assert_eq!(normalize(&(a.clone() & !a.clone())), NormalForm::False);
///
/// // Same truth table, same key
/// let left = (a.clone() & b.clone()) | (b.clone() & a.clone());
/// let right = b & (a | BooleanExpression::False);
/// assert_eq!(normalize(&left), normalize(&right));
///
/// let droid = BooleanExpression::possible_types(["Droid"]).unwrap();
/// let human = BooleanExpression::possible_types(["Human"]).unwrap();
/// let both = BooleanExpression::possible_types(["Droid", "Human"]).unwrap();
/// assert_eq!(normalize(&(droid | human)), normalize(&both));
/// ```
pub fn normalize(expr: &BooleanExpression) -> NormalForm {
    let expanded = expand(expr, false);
    let expanded_count = expanded.len();

    let mut products = absorb(expanded);
    add_consensus_terms(&mut products);

    debug!(
        expanded = expanded_count,
        prime_implicants = products.len(),
        "normalized condition"
    );

    if products.is_empty() {
        return NormalForm::False;
    }
    if products.iter().any(Product::is_tautology) {
        return NormalForm::True;
    }

    let mut clauses: Vec<Clause> = products.into_iter().map(Product::into_clause).collect();
    clauses.sort();
    NormalForm::Clauses(clauses)
}

impl BooleanExpression {
    pub fn normalize(&self) -> NormalForm {
        normalize(self)
    }
}

/// DNF of `expr` (negated when `negated` is set) as a list of products.
///
/// An empty list is `false`; a list holding an empty product is `true`.
fn expand(expr: &BooleanExpression, negated: bool) -> Vec<Product> {
    match expr {
        BooleanExpression::True | BooleanExpression::False => {
            if expr.is_true() != negated {
                vec![Product::any()]
            } else {
                vec![]
            }
        }
        BooleanExpression::Reference(Term::Variable(name)) => {
            let literal = Literal {
                term: Term::Variable(name.clone()),
                negated,
            };
            vec![Product {
                literals: LiteralSet::from([literal]),
                types: TypeSet::any(),
            }]
        }
        BooleanExpression::Reference(Term::PossibleTypes(names)) => {
            let set = if negated {
                TypeSet::Except(names.clone())
            } else {
                TypeSet::Only(names.clone())
            };
            TypeSet::any()
                .intersect(&set)
                .map(|types| Product {
                    literals: LiteralSet::new(),
                    types,
                })
                .into_iter()
                .collect()
        }
        BooleanExpression::Not(inner) => expand(inner, !negated),
        BooleanExpression::And(operands) if !negated => product(operands.iter(), negated),
        BooleanExpression::Or(operands) if negated => product(operands.iter(), negated),
        BooleanExpression::And(operands) | BooleanExpression::Or(operands) => {
            let products = operands
                .iter()
                .flat_map(|operand| expand(operand, negated))
                .collect();
            absorb(products)
        }
    }
}

/// Distributes a conjunction over the DNFs of its operands.
fn product<'a, I>(operands: I, negated: bool) -> Vec<Product>
where
    I: Iterator<Item = &'a BooleanExpression>,
{
    let mut acc = vec![Product::any()];
    for operand in operands {
        let right = expand(operand, negated);
        let mut next = Vec::with_capacity(acc.len() * right.len());
        for left in &acc {
            for clause in &right {
                next.extend(left.merge(clause));
            }
        }
        acc = absorb(next);
        if acc.is_empty() {
            break;
        }
    }
    acc
}

/// A sorted set holds `x` and `!x` next to each other.
fn is_contradictory(clause: &LiteralSet) -> bool {
    let mut previous: Option<&Literal> = None;
    for literal in clause {
        if previous.is_some_and(|p| p.term == literal.term) {
            return true;
        }
        previous = Some(literal);
    }
    false
}

/// Removes duplicate products and products covered by another one.
fn absorb(mut products: Vec<Product>) -> Vec<Product> {
    products.sort();
    products.dedup();
    let covered: Vec<bool> = products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            products
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && other.covers(product))
        })
        .collect();
    products
        .into_iter()
        .zip(covered)
        .filter_map(|(product, covered)| (!covered).then_some(product))
        .collect()
}

/// The consensus of two products.
///
/// Products clashing on exactly one variable resolve on it. Products with no
/// clash resolve on `__typename`, taking the union of their type sets.
fn consensus(left: &Product, right: &Product) -> Option<Product> {
    let mut clashing = left
        .literals
        .iter()
        .filter(|literal| right.literals.contains(&literal.complement()));
    match (clashing.next(), clashing.next()) {
        (Some(pivot), None) => {
            let complement = pivot.complement();
            let literals = left
                .literals
                .iter()
                .chain(right.literals.iter())
                .filter(|literal| **literal != *pivot && **literal != complement)
                .cloned()
                .collect();
            let types = left.types.intersect(&right.types)?;
            Some(Product { literals, types })
        }
        (Some(_), Some(_)) => None,
        (None, _) => {
            if left.types.is_any() || right.types.is_any() {
                return None;
            }
            Some(Product {
                literals: left.literals.union(&right.literals).cloned().collect(),
                types: left.types.union(&right.types),
            })
        }
    }
}

/// Iterated consensus: adds resolvents until every prime implicant is present.
fn add_consensus_terms(products: &mut Vec<Product>) {
    loop {
        let mut fresh: Vec<Product> = Vec::new();
        for (i, left) in products.iter().enumerate() {
            for right in &products[i + 1..] {
                let Some(resolvent) = consensus(left, right) else {
                    continue;
                };
                let absorbed = products
                    .iter()
                    .chain(fresh.iter())
                    .any(|existing| existing.covers(&resolvent));
                if !absorbed {
                    fresh.push(resolvent);
                }
            }
        }
        if fresh.is_empty() {
            return;
        }
        products.extend(fresh);
        *products = absorb(std::mem::take(products));
    }
}
