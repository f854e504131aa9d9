use std::fmt;

/// Kind of the next token in a JSON stream, as reported by
/// [`JsonReader::peek`](super::JsonReader::peek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    Name,
    String,
    Number,
    Boolean,
    Null,
    EndDocument,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::BeginArray => "BEGIN_ARRAY",
            TokenKind::EndArray => "END_ARRAY",
            TokenKind::BeginObject => "BEGIN_OBJECT",
            TokenKind::EndObject => "END_OBJECT",
            TokenKind::Name => "NAME",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Null => "NULL",
            TokenKind::EndDocument => "END_DOCUMENT",
        };
        write!(f, "{}", name)
    }
}

/// A lexed token with its payload. Numbers keep their source text so that
/// no precision is lost before an adapter picks a representation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JsonToken {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    Name(String),
    String(String),
    Number(String),
    Boolean(bool),
    Null,
    EndDocument,
}

impl JsonToken {
    pub(crate) fn kind(&self) -> TokenKind {
        match self {
            JsonToken::BeginArray => TokenKind::BeginArray,
            JsonToken::EndArray => TokenKind::EndArray,
            JsonToken::BeginObject => TokenKind::BeginObject,
            JsonToken::EndObject => TokenKind::EndObject,
            JsonToken::Name(_) => TokenKind::Name,
            JsonToken::String(_) => TokenKind::String,
            JsonToken::Number(_) => TokenKind::Number,
            JsonToken::Boolean(_) => TokenKind::Boolean,
            JsonToken::Null => TokenKind::Null,
            JsonToken::EndDocument => TokenKind::EndDocument,
        }
    }
}

/// Nesting state shared by the reader and the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    EmptyDocument,
    NonEmptyDocument,
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    /// A name was read/written and its value is pending
    DanglingName,
    NonEmptyObject,
}
