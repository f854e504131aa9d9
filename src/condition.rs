//! # Conditions
//!
//! This module defines the boolean expressions attached to fields and
//! fragments of an operation. A field is read from a response only when its
//! condition holds.
//!
//! ## Where conditions come from
//!
//! - **`@include(if: $v)`** becomes `$v`
//! - **`@skip(if: $v)`** becomes `!$v`
//! - **Type conditions** (`... on Droid`) become `type(Droid)`, matched against
//!   the runtime `__typename`
//! - **Nesting** combines a parent's condition with the child's using `&`
//!
//! ## Submodules
//!
//! - **[term]**: the leaves (variables and possible-types sets)
//! - **[expression]**: the tree, constructors and light simplification
//! - **[directive]**: directive-to-condition conversion
//!
//! ## Example
//!
//! ```
//! use gqlshape::condition::{condition_from_directives, BooleanExpression, Directive};
//!
//! let field = condition_from_directives(&[Directive::skip("compact")]).unwrap();
//! let fragment = BooleanExpression::possible_types(["Droid"]).unwrap();
//!
//! let condition = fragment & field;
//! assert_eq!(condition.to_string(), "type(Droid) & !$compact");
//! ```
pub mod directive;
pub mod expression;
pub mod term;

pub use directive::{condition_from_directives, Directive, DirectiveError, DirectiveValue};
pub use expression::{BooleanExpression, ExpressionError, OperatorKind, Operands};
pub use term::Term;
