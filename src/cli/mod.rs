//! CLI support for gqlshape
//!
//! Each subcommand is a plain function over an options struct, so the same
//! operations can be driven from other tools without going through `clap`.

mod decode;
mod eval;
mod normalize;
mod variants;

pub use decode::{execute_decode, parse_type, DecodeOptions, DecodeResult, Decoded, TypeRef};
pub use eval::{execute_eval, EvalOptions};
pub use normalize::{execute_normalize, NormalizeOptions, NormalizeResult};
pub use variants::{execute_variants, VariantsOptions, VariantsReport};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Decode error: {0}")]
    Decode(#[from] crate::DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] crate::EncodeError),

    #[error("Variant error: {0}")]
    Variant(#[from] crate::VariantError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// A type expression for `decode` that could not be understood.
    #[error("Invalid type '{text}': {message}")]
    InvalidType { text: String, message: String },

    /// A `--scalar` mapping that is not `Name=Builtin`.
    #[error("Invalid scalar mapping '{0}', expected Name=Builtin (e.g. Date=String)")]
    InvalidScalarMapping(String),
}
