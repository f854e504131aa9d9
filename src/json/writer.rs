//! Streaming JSON output.
//!
//! [`JsonWriter`] emits tokens straight to a sink, checking that calls form a
//! single well-formed document: names only inside objects, exactly one
//! top-level value, every container closed. Output is either compact or
//! pretty-printed with a configurable indent.
//!
//! # Examples
//!
//! ```
//! use gqlshape::json::{JsonWriter, WriterOptions};
//!
//! let mut out = Vec::new();
//! let mut writer = JsonWriter::new(&mut out, WriterOptions::compact());
//! writer.begin_object().unwrap();
//! writer.name("name").unwrap();
//! writer.value_str("R2-D2").unwrap();
//! writer.end_object().unwrap();
//! writer.finish().unwrap();
//!
//! assert_eq!(String::from_utf8(out).unwrap(), r#"{"name":"R2-D2"}"#);
//! ```

use std::io::{self, Write};

use thiserror::Error;

use super::token::Scope;

/// Errors raised while writing typed values as JSON.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The call sequence would not produce a well-formed document.
    #[error("invalid JSON writer state: {message}")]
    InvalidState { message: String },

    /// JSON has no representation for NaN or infinities.
    #[error("numeric values must be finite, got {0}")]
    NonFiniteNumber(f64),

    /// An absent optional reached a writer; its field must be skipped instead.
    #[error("cannot write an absent value")]
    AbsentValue,

    #[error("no adapter registered for custom scalar '{name}'")]
    UnknownScalar { name: String },

    #[error("adapter registered for custom scalar '{name}' does not accept {expected}")]
    ScalarTypeMismatch { name: String, expected: &'static str },

    /// A value failed an adapter's encoding precondition.
    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("failed to write JSON output: {0}")]
    Io(#[from] io::Error),
}

/// Formatting of the written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterOptions {
    /// Spaces per nesting level; `None` writes compact output.
    pub indent: Option<usize>,
}

impl WriterOptions {
    pub fn compact() -> Self {
        WriterOptions { indent: None }
    }

    /// Two spaces per level.
    pub fn pretty() -> Self {
        WriterOptions { indent: Some(2) }
    }

    pub fn with_indent(indent: usize) -> Self {
        WriterOptions {
            indent: Some(indent),
        }
    }
}

pub struct JsonWriter<'a> {
    sink: &'a mut dyn Write,
    stack: Vec<Scope>,
    options: WriterOptions,
}

impl<'a> JsonWriter<'a> {
    pub fn new(sink: &'a mut dyn Write, options: WriterOptions) -> Self {
        JsonWriter {
            sink,
            stack: vec![Scope::EmptyDocument],
            options,
        }
    }

    pub fn begin_object(&mut self) -> Result<(), EncodeError> {
        self.before_value()?;
        self.sink.write_all(b"{")?;
        self.stack.push(Scope::EmptyObject);
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), EncodeError> {
        self.close(Scope::EmptyObject, Scope::NonEmptyObject, b"}")
    }

    pub fn begin_array(&mut self) -> Result<(), EncodeError> {
        self.before_value()?;
        self.sink.write_all(b"[")?;
        self.stack.push(Scope::EmptyArray);
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), EncodeError> {
        self.close(Scope::EmptyArray, Scope::NonEmptyArray, b"]")
    }

    /// Writes a member name; the next call must write its value.
    pub fn name(&mut self, name: &str) -> Result<(), EncodeError> {
        match self.top() {
            Scope::EmptyObject => {}
            Scope::NonEmptyObject => self.sink.write_all(b",")?,
            Scope::DanglingName => return Err(invalid_state("name written twice without a value")),
            _ => return Err(invalid_state("names can only be written inside an object")),
        }
        self.newline()?;
        self.write_escaped(name)?;
        if self.options.indent.is_some() {
            self.sink.write_all(b": ")?;
        } else {
            self.sink.write_all(b":")?;
        }
        self.set_top(Scope::DanglingName);
        Ok(())
    }

    pub fn value_str(&mut self, value: &str) -> Result<(), EncodeError> {
        self.before_value()?;
        self.write_escaped(value)
    }

    pub fn value_bool(&mut self, value: bool) -> Result<(), EncodeError> {
        self.before_value()?;
        self.sink.write_all(if value { b"true" } else { b"false" })?;
        Ok(())
    }

    pub fn value_i64(&mut self, value: i64) -> Result<(), EncodeError> {
        self.before_value()?;
        write!(self.sink, "{}", value)?;
        Ok(())
    }

    pub fn value_f64(&mut self, value: f64) -> Result<(), EncodeError> {
        if !value.is_finite() {
            return Err(EncodeError::NonFiniteNumber(value));
        }
        self.before_value()?;
        write!(self.sink, "{}", value)?;
        Ok(())
    }

    /// Writes number text verbatim, e.g. a decimal that must not round-trip
    /// through `f64`. The caller guarantees it is a valid JSON number.
    pub fn value_number(&mut self, text: &str) -> Result<(), EncodeError> {
        self.before_value()?;
        self.sink.write_all(text.as_bytes())?;
        Ok(())
    }

    pub fn null_value(&mut self) -> Result<(), EncodeError> {
        self.before_value()?;
        self.sink.write_all(b"null")?;
        Ok(())
    }

    /// Writes an untyped JSON tree. Object members keep their map order.
    pub fn value_json(&mut self, value: &serde_json::Value) -> Result<(), EncodeError> {
        match value {
            serde_json::Value::Null => self.null_value(),
            serde_json::Value::Bool(b) => self.value_bool(*b),
            serde_json::Value::Number(n) => self.value_number(&n.to_string()),
            serde_json::Value::String(s) => self.value_str(s),
            serde_json::Value::Array(items) => {
                self.begin_array()?;
                for item in items {
                    self.value_json(item)?;
                }
                self.end_array()
            }
            serde_json::Value::Object(members) => {
                self.begin_object()?;
                for (name, member) in members {
                    self.name(name)?;
                    self.value_json(member)?;
                }
                self.end_object()
            }
        }
    }

    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.sink.flush()?;
        Ok(())
    }

    /// Checks that exactly one complete value was written, then flushes.
    pub fn finish(&mut self) -> Result<(), EncodeError> {
        if self.stack.as_slice() != [Scope::NonEmptyDocument] {
            return Err(invalid_state("incomplete document"));
        }
        self.flush()
    }

    fn top(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::NonEmptyDocument)
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn before_value(&mut self) -> Result<(), EncodeError> {
        match self.top() {
            Scope::EmptyDocument => self.set_top(Scope::NonEmptyDocument),
            Scope::NonEmptyDocument => {
                return Err(invalid_state("JSON must have only one top-level value"));
            }
            Scope::EmptyArray => {
                self.set_top(Scope::NonEmptyArray);
                self.newline()?;
            }
            Scope::NonEmptyArray => {
                self.sink.write_all(b",")?;
                self.newline()?;
            }
            Scope::DanglingName => self.set_top(Scope::NonEmptyObject),
            Scope::EmptyObject | Scope::NonEmptyObject => {
                return Err(invalid_state("expected a name before a value inside an object"));
            }
        }
        Ok(())
    }

    fn close(&mut self, empty: Scope, non_empty: Scope, bracket: &[u8]) -> Result<(), EncodeError> {
        let top = self.top();
        if top == Scope::DanglingName {
            return Err(invalid_state("dangling name"));
        }
        if top != empty && top != non_empty {
            return Err(invalid_state("nesting problem"));
        }
        self.stack.pop();
        if top == non_empty {
            self.newline()?;
        }
        self.sink.write_all(bracket)?;
        Ok(())
    }

    fn newline(&mut self) -> Result<(), EncodeError> {
        if let Some(indent) = self.options.indent {
            let depth = self.stack.len().saturating_sub(1);
            self.sink.write_all(b"\n")?;
            self.sink.write_all(" ".repeat(indent * depth).as_bytes())?;
        }
        Ok(())
    }

    fn write_escaped(&mut self, s: &str) -> Result<(), EncodeError> {
        let mut escaped = String::with_capacity(s.len() + 2);
        escaped.push('"');
        for c in s.chars() {
            match c {
                '"' => escaped.push_str("\\\""),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
                c => escaped.push(c),
            }
        }
        escaped.push('"');
        self.sink.write_all(escaped.as_bytes())?;
        Ok(())
    }
}

fn invalid_state(message: &str) -> EncodeError {
    EncodeError::InvalidState {
        message: message.to_string(),
    }
}
