//! JSON token streams: the substrate adapters read from and write to.
//!
//! - **[reader]**: [`JsonReader`], a pull reader with path and position tracking
//! - **[writer]**: [`JsonWriter`], a validating streaming writer
//! - **[token]**: the token kinds both sides agree on
pub mod reader;
pub mod token;
pub mod writer;

pub use reader::{DecodeError, JsonReader, DEFAULT_MAX_DEPTH};
pub use token::TokenKind;
pub use writer::{EncodeError, JsonWriter, WriterOptions};
