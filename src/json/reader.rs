use std::io::Read;

use thiserror::Error;
use tracing::debug;

use super::token::{JsonToken, Scope, TokenKind};
use crate::position::Position;

/// Errors raised while reading JSON into typed values.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input is not well-formed JSON.
    #[error("malformed JSON at {position}: {message}")]
    Syntax { message: String, position: Position },

    /// The stream holds a different kind of token than the adapter needs.
    #[error("expected {expected} but was {found} at path {path} ({position})")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        path: String,
        position: Position,
    },

    /// A non-nullable adapter found `null`.
    #[error("expected {expected} but was NULL at path {path} ({position})")]
    UnexpectedNull {
        expected: TokenKind,
        path: String,
        position: Position,
    },

    /// A required field was not present in the object.
    #[error("field {field} is missing at path {path}")]
    MissingField { field: String, path: String },

    /// No adapter is registered for a custom scalar.
    #[error("no adapter registered for custom scalar '{name}'")]
    UnknownScalar { name: String },

    /// The adapter registered for a custom scalar produces another type.
    #[error("adapter registered for custom scalar '{name}' does not produce {expected}")]
    ScalarTypeMismatch { name: String, expected: &'static str },

    /// The token kind was right but its content is not acceptable.
    #[error("invalid value at path {path}: {message}")]
    InvalidValue { message: String, path: String },

    #[error("failed to read JSON input: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
enum PathElement {
    Index(usize),
    Name(Option<String>),
}

/// Forward-only, pull-style reader over one JSON document.
///
/// Tokens are produced lazily from a buffered source and the reader keeps
/// track of the position and JSON path of the next token so that every
/// failure can say where it happened. A reader is owned by one consumer at
/// a time.
///
/// # Examples
///
/// ```
/// use gqlshape::json::{JsonReader, TokenKind};
///
/// let mut reader = JsonReader::new(r#"{"hero": {"name": "R2-D2"}}"#);
/// reader.begin_object().unwrap();
/// assert_eq!(reader.next_name().unwrap(), "hero");
/// reader.begin_object().unwrap();
/// assert_eq!(reader.next_name().unwrap(), "name");
/// assert_eq!(reader.path(), "$.hero.name");
/// assert_eq!(reader.next_string().unwrap(), "R2-D2");
/// reader.end_object().unwrap();
/// reader.end_object().unwrap();
/// assert_eq!(reader.peek().unwrap(), TokenKind::EndDocument);
/// ```
pub struct JsonReader {
    input: Vec<char>,
    max_depth: usize,
    offset: usize,
    position: Position,
    stack: Vec<Scope>,
    path: Vec<PathElement>,
    peeked: Option<(JsonToken, Position)>,
}

/// Arrays and objects nested deeper than this are rejected, matching
/// `serde_json`'s recursion limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

impl JsonReader {
    pub fn new(input: &str) -> Self {
        JsonReader {
            input: input.chars().collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            offset: 0,
            position: Position::start(),
            stack: vec![Scope::EmptyDocument],
            path: Vec::new(),
            peeked: None,
        }
    }

    /// Buffers the whole source, then reads from memory.
    pub fn from_reader<R: Read>(mut source: R) -> Result<Self, DecodeError> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        Ok(JsonReader::new(&text))
    }

    /// Sets how many arrays and objects may be open at once.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// JSON path of the next value, e.g. `$.data.hero.friends[2]`.
    pub fn path(&self) -> String {
        let mut out = String::from("$");
        for element in &self.path {
            match element {
                PathElement::Index(i) => out.push_str(&format!("[{}]", i)),
                PathElement::Name(Some(name)) => {
                    out.push('.');
                    out.push_str(name);
                }
                PathElement::Name(None) => {}
            }
        }
        out
    }

    /// Position of the next token, or of the next unread character if no
    /// token has been peeked yet.
    pub fn position(&self) -> Position {
        match &self.peeked {
            Some((_, position)) => *position,
            None => self.position,
        }
    }

    /// Kind of the next token, without consuming it.
    pub fn peek(&mut self) -> Result<TokenKind, DecodeError> {
        Ok(self.peek_token()?.kind())
    }

    /// Whether the current array or object has more elements.
    pub fn has_next(&mut self) -> Result<bool, DecodeError> {
        let kind = self.peek()?;
        Ok(!matches!(
            kind,
            TokenKind::EndArray | TokenKind::EndObject | TokenKind::EndDocument
        ))
    }

    pub fn begin_array(&mut self) -> Result<(), DecodeError> {
        self.enter(TokenKind::BeginArray)?;
        self.stack.push(Scope::EmptyArray);
        self.path.push(PathElement::Index(0));
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), DecodeError> {
        self.consume(TokenKind::EndArray)?;
        self.stack.pop();
        self.path.pop();
        self.value_consumed();
        Ok(())
    }

    pub fn begin_object(&mut self) -> Result<(), DecodeError> {
        self.enter(TokenKind::BeginObject)?;
        self.stack.push(Scope::EmptyObject);
        self.path.push(PathElement::Name(None));
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), DecodeError> {
        self.consume(TokenKind::EndObject)?;
        self.stack.pop();
        self.path.pop();
        self.value_consumed();
        Ok(())
    }

    pub fn next_name(&mut self) -> Result<String, DecodeError> {
        match self.consume(TokenKind::Name)? {
            JsonToken::Name(name) => {
                if let Some(last) = self.path.last_mut() {
                    *last = PathElement::Name(Some(name.clone()));
                }
                Ok(name)
            }
            other => Err(self.unexpected(TokenKind::Name, other.kind())),
        }
    }

    /// Reads a string. Numbers are accepted too and returned as their text.
    pub fn next_string(&mut self) -> Result<String, DecodeError> {
        let token =
            self.consume_one_of(TokenKind::String, &[TokenKind::String, TokenKind::Number])?;
        self.value_consumed();
        match token {
            JsonToken::String(s) | JsonToken::Number(s) => Ok(s),
            other => Err(self.unexpected(TokenKind::String, other.kind())),
        }
    }

    pub fn next_boolean(&mut self) -> Result<bool, DecodeError> {
        match self.consume(TokenKind::Boolean)? {
            JsonToken::Boolean(b) => {
                self.value_consumed();
                Ok(b)
            }
            other => Err(self.unexpected(TokenKind::Boolean, other.kind())),
        }
    }

    /// Consumes a `null` literal.
    pub fn next_null(&mut self) -> Result<(), DecodeError> {
        let kind = self.peek()?;
        if kind != TokenKind::Null {
            return Err(self.unexpected(TokenKind::Null, kind));
        }
        self.take_peeked()?;
        self.value_consumed();
        Ok(())
    }

    /// Raw text of a number (or of a string holding one).
    pub fn next_number(&mut self) -> Result<String, DecodeError> {
        let token =
            self.consume_one_of(TokenKind::Number, &[TokenKind::Number, TokenKind::String])?;
        let path = self.path();
        self.value_consumed();
        match token {
            JsonToken::Number(text) => Ok(text),
            JsonToken::String(text) => {
                if is_number(&text) {
                    Ok(text)
                } else {
                    Err(DecodeError::InvalidValue {
                        message: format!("'{}' is not a number", text),
                        path,
                    })
                }
            }
            other => Err(self.unexpected(TokenKind::Number, other.kind())),
        }
    }

    pub fn next_long(&mut self) -> Result<i64, DecodeError> {
        let path = self.path();
        let text = self.next_number()?;
        if let Ok(value) = text.parse::<i64>() {
            return Ok(value);
        }
        // Integral values written with a fraction or exponent, e.g. 1.0 or 1e3
        match text.parse::<f64>() {
            Ok(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => Ok(value as i64),
            _ => Err(DecodeError::InvalidValue {
                message: format!("{} is not a 64-bit integer", text),
                path,
            }),
        }
    }

    pub fn next_int(&mut self) -> Result<i32, DecodeError> {
        let path = self.path();
        let value = self.next_long()?;
        i32::try_from(value).map_err(|_| DecodeError::InvalidValue {
            message: format!("{} does not fit in a 32-bit integer", value),
            path,
        })
    }

    pub fn next_double(&mut self) -> Result<f64, DecodeError> {
        let path = self.path();
        let text = self.next_number()?;
        text.parse::<f64>().map_err(|_| DecodeError::InvalidValue {
            message: format!("{} is not a double", text),
            path,
        })
    }

    /// Skips the next value, including everything nested in it. At a name,
    /// skips the name and its value.
    pub fn skip_value(&mut self) -> Result<(), DecodeError> {
        let path = self.path();
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                TokenKind::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                }
                TokenKind::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                }
                kind @ (TokenKind::EndArray | TokenKind::EndObject) if depth == 0 => {
                    return Err(self.unexpected(TokenKind::BeginObject, kind));
                }
                TokenKind::EndArray => {
                    self.end_array()?;
                    depth -= 1;
                }
                TokenKind::EndObject => {
                    self.end_object()?;
                    depth -= 1;
                }
                TokenKind::Name => {
                    self.next_name()?;
                    continue;
                }
                TokenKind::EndDocument => {
                    let position = self.position();
                    return Err(DecodeError::Syntax {
                        message: "unexpected end of document while skipping a value".into(),
                        position,
                    });
                }
                TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Null => {
                    self.take_peeked()?;
                    self.value_consumed();
                }
            }
            if depth == 0 {
                break;
            }
        }
        debug!(path = %path, "skipped JSON value");
        Ok(())
    }

    /// Reads names until one of `names` is found and returns its index.
    ///
    /// Members with other names are skipped together with their values.
    /// Returns `None` once the enclosing object has no more members.
    pub fn select_name(&mut self, names: &[&str]) -> Result<Option<usize>, DecodeError> {
        while self.peek()? == TokenKind::Name {
            let name = self.next_name()?;
            if let Some(index) = names.iter().position(|n| *n == name) {
                return Ok(Some(index));
            }
            self.skip_value()?;
        }
        Ok(None)
    }

    /// Builds an [`DecodeError::InvalidValue`] for the current path.
    pub fn invalid_value(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::InvalidValue {
            message: message.into(),
            path: self.path(),
        }
    }

    /// Builds a [`DecodeError::MissingField`] for the current path.
    pub fn missing_field(&self, field: impl Into<String>) -> DecodeError {
        DecodeError::MissingField {
            field: field.into(),
            path: self.path(),
        }
    }

    fn consume(&mut self, expected: TokenKind) -> Result<JsonToken, DecodeError> {
        self.consume_one_of(expected, &[expected])
    }

    /// Consumes an opening bracket, refusing to go past `max_depth`.
    fn enter(&mut self, kind: TokenKind) -> Result<(), DecodeError> {
        self.peek()?;
        let position = self.position();
        self.consume(kind)?;
        // The bottom of the stack is the document itself
        if self.stack.len() > self.max_depth {
            return Err(DecodeError::Syntax {
                message: format!("nesting deeper than {} levels", self.max_depth),
                position,
            });
        }
        Ok(())
    }

    fn consume_one_of(
        &mut self,
        expected: TokenKind,
        accepted: &[TokenKind],
    ) -> Result<JsonToken, DecodeError> {
        let kind = self.peek()?;
        if !accepted.contains(&kind) {
            return Err(self.unexpected(expected, kind));
        }
        self.take_peeked()
    }

    fn unexpected(&self, expected: TokenKind, found: TokenKind) -> DecodeError {
        if found == TokenKind::Null {
            DecodeError::UnexpectedNull {
                expected,
                path: self.path(),
                position: self.position(),
            }
        } else {
            DecodeError::UnexpectedToken {
                expected,
                found,
                path: self.path(),
                position: self.position(),
            }
        }
    }

    fn take_peeked(&mut self) -> Result<JsonToken, DecodeError> {
        self.peek_token()?;
        match self.peeked.take() {
            Some((token, _)) => Ok(token),
            None => Err(self.syntax("no token available")),
        }
    }

    /// Advances the array index once a complete element has been read.
    fn value_consumed(&mut self) {
        if let Some(PathElement::Index(i)) = self.path.last_mut() {
            *i += 1;
        }
    }

    fn peek_token(&mut self) -> Result<&JsonToken, DecodeError> {
        if self.peeked.is_none() {
            let next = self.read_token()?;
            self.peeked = Some(next);
        }
        match &self.peeked {
            Some((token, _)) => Ok(token),
            None => Err(self.syntax("no token available")),
        }
    }

    fn syntax(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::Syntax {
            message: message.into(),
            position: self.position,
        }
    }

    fn set_scope(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn read_token(&mut self) -> Result<(JsonToken, Position), DecodeError> {
        let scope = self.stack.last().copied().unwrap_or(Scope::NonEmptyDocument);
        match scope {
            Scope::EmptyArray => {
                self.skip_whitespace();
                if self.current_char() == Some(']') {
                    return Ok(self.punctuation(JsonToken::EndArray));
                }
                self.set_scope(Scope::NonEmptyArray);
            }
            Scope::NonEmptyArray => {
                self.skip_whitespace();
                match self.current_char() {
                    Some(']') => return Ok(self.punctuation(JsonToken::EndArray)),
                    Some(',') => self.advance(),
                    _ => return Err(self.syntax("expected ',' or ']'")),
                }
            }
            Scope::EmptyObject | Scope::NonEmptyObject => {
                self.skip_whitespace();
                match self.current_char() {
                    Some('}') => return Ok(self.punctuation(JsonToken::EndObject)),
                    Some(',') if scope == Scope::NonEmptyObject => self.advance(),
                    _ if scope == Scope::EmptyObject => {}
                    _ => return Err(self.syntax("expected ',' or '}'")),
                }
                self.skip_whitespace();
                let start = self.position;
                if self.current_char() != Some('"') {
                    return Err(self.syntax("expected a member name"));
                }
                let name = self.read_string()?;
                self.set_scope(Scope::DanglingName);
                return Ok((JsonToken::Name(name), start));
            }
            Scope::DanglingName => {
                self.skip_whitespace();
                if self.current_char() != Some(':') {
                    return Err(self.syntax("expected ':'"));
                }
                self.advance();
                self.set_scope(Scope::NonEmptyObject);
            }
            Scope::EmptyDocument => self.set_scope(Scope::NonEmptyDocument),
            Scope::NonEmptyDocument => {
                self.skip_whitespace();
                if self.current_char().is_none() {
                    return Ok((JsonToken::EndDocument, self.position));
                }
                return Err(self.syntax("unexpected data after the top-level value"));
            }
        }
        self.read_value()
    }

    fn read_value(&mut self) -> Result<(JsonToken, Position), DecodeError> {
        self.skip_whitespace();
        let start = self.position;
        let token = match self.current_char() {
            None => return Err(self.syntax("unexpected end of input")),
            Some('{') => {
                self.advance();
                JsonToken::BeginObject
            }
            Some('[') => {
                self.advance();
                JsonToken::BeginArray
            }
            Some('"') => JsonToken::String(self.read_string()?),
            Some('t') => self.read_literal("true", JsonToken::Boolean(true))?,
            Some('f') => self.read_literal("false", JsonToken::Boolean(false))?,
            Some('n') => self.read_literal("null", JsonToken::Null)?,
            Some(ch) if ch == '-' || ch.is_ascii_digit() => JsonToken::Number(self.read_number()?),
            Some(ch) => return Err(self.syntax(format!("unexpected character '{}'", ch))),
        };
        Ok((token, start))
    }

    fn punctuation(&mut self, token: JsonToken) -> (JsonToken, Position) {
        let start = self.position;
        self.advance();
        (token, start)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
            self.offset += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if matches!(ch, ' ' | '\t' | '\n' | '\r') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_literal(&mut self, word: &str, token: JsonToken) -> Result<JsonToken, DecodeError> {
        for expected in word.chars() {
            if self.current_char() != Some(expected) {
                return Err(self.syntax(format!("invalid literal, expected '{}'", word)));
            }
            self.advance();
        }
        if self.current_char().is_some_and(|c| c.is_alphanumeric()) {
            return Err(self.syntax(format!("invalid literal, expected '{}'", word)));
        }
        Ok(token)
    }

    fn read_number(&mut self) -> Result<String, DecodeError> {
        let mut number = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E') {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if is_number(&number) {
            Ok(number)
        } else {
            Err(self.syntax(format!("invalid number '{}'", number)))
        }
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    let escaped = match self.current_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('u') => {
                            self.advance();
                            result.push(self.read_unicode_escape()?);
                            continue;
                        }
                        Some(other) => {
                            let message = format!("invalid escape sequence '\\{}'", other);
                            return Err(self.syntax(message));
                        }
                        None => return Err(self.syntax("unterminated string")),
                    };
                    result.push(escaped);
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.syntax("unterminated string"))
    }

    /// Reads the hex digits after `\u`, combining surrogate pairs.
    fn read_unicode_escape(&mut self) -> Result<char, DecodeError> {
        let high = self.read_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            if self.current_char() == Some('\\') {
                self.advance();
                if self.current_char() == Some('u') {
                    self.advance();
                    let low = self.read_hex4()?;
                    if (0xDC00..0xE000).contains(&low) {
                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        return char::from_u32(code)
                            .ok_or_else(|| self.syntax("invalid surrogate pair"));
                    }
                }
            }
            return Err(self.syntax("unpaired surrogate in unicode escape"));
        }
        char::from_u32(high).ok_or_else(|| self.syntax("invalid unicode escape"))
    }

    fn read_hex4(&mut self) -> Result<u32, DecodeError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self
                .current_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.syntax("invalid unicode escape"))?;
            value = value * 16 + digit;
            self.advance();
        }
        Ok(value)
    }
}

/// JSON number grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
fn is_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let int_len = i - int_start;
    if int_len == 0 || (int_len > 1 && bytes[int_start] == b'0') {
        return false;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}
