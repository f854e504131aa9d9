pub mod adapter;
pub mod condition;
pub mod evaluator;
pub mod json;
pub mod lexer;
pub mod normalizer;
pub mod parser;
pub mod position;
pub mod variants;

#[cfg(feature = "cli")]
pub mod cli;

pub use adapter::{Adapter, AdapterExt, CustomScalarAdapter, CustomScalarAdapters, Optional};
pub use condition::{condition_from_directives, BooleanExpression, Directive, Term};
pub use evaluator::{evaluate, EvaluationContext};
pub use json::{DecodeError, EncodeError, JsonReader, JsonWriter, TokenKind, WriterOptions};
pub use lexer::{LexError, Lexer};
pub use normalizer::{normalize, Clause, Literal, NormalForm};
pub use parser::{parse_condition, ParseError, Parser};
pub use position::Position;
pub use variants::{distinct_shapes, group_by_condition, possible_variable_values, VariantError};
