//! Decode JSON against a GraphQL type and write it back out
//!
//! The type is given in GraphQL notation (`String`, `[Int!]!`, `Date`); the
//! adapter stack for it is assembled at runtime from the built-in adapters
//! and combinators. Custom scalars can be mapped onto a built-in with
//! `Name=Builtin`.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use rust_decimal::Decimal;

use super::CliError;
use crate::adapter::{
    from_json_str, list, nullable, to_json_string, Adapter, AnyAdapter, BooleanAdapter,
    CustomScalarAdapter, CustomScalarAdapters, DecimalAdapter, DoubleAdapter, IntAdapter,
    LongAdapter, StringAdapter,
};
use crate::json::{DecodeError, EncodeError, JsonReader, JsonWriter, WriterOptions};

/// Options for the decode command
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// GraphQL type of the document, e.g. `[String]!`
    pub type_ref: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Custom scalar mappings, `Name=Builtin`
    pub scalars: Vec<String>,
}

/// Result of a decode operation
#[derive(Debug)]
pub struct DecodeResult {
    pub value: Decoded,
    /// The value written back through the same adapters
    pub json: String,
}

/// A type reference in GraphQL notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(item) => write!(f, "[{}]", item),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// A decoded value of any supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Null,
    String(String),
    Int(i32),
    Long(i64),
    Float(f64),
    Boolean(bool),
    Decimal(Decimal),
    Json(serde_json::Value),
    List(Vec<Decoded>),
}

#[derive(Debug, Clone, Copy)]
enum Builtin {
    String,
    Int,
    Long,
    Float,
    Boolean,
    Decimal,
    Json,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "String" | "ID" => Some(Builtin::String),
            "Int" => Some(Builtin::Int),
            "Long" => Some(Builtin::Long),
            "Float" => Some(Builtin::Float),
            "Boolean" => Some(Builtin::Boolean),
            "Decimal" => Some(Builtin::Decimal),
            "JSON" => Some(Builtin::Json),
            _ => None,
        }
    }

    fn adapter(self) -> DynAdapter {
        match self {
            Builtin::String => Box::new(Erase(StringAdapter)),
            Builtin::Int => Box::new(Erase(IntAdapter)),
            Builtin::Long => Box::new(Erase(LongAdapter)),
            Builtin::Float => Box::new(Erase(DoubleAdapter)),
            Builtin::Boolean => Box::new(Erase(BooleanAdapter)),
            Builtin::Decimal => Box::new(Erase(DecimalAdapter)),
            Builtin::Json => Box::new(Erase(AnyAdapter)),
        }
    }
}

type DynAdapter = Box<dyn Adapter<Value = Decoded> + Send + Sync>;

/// Conversion between an adapter's value type and [`Decoded`].
trait Representable: Sized {
    fn into_decoded(self) -> Decoded;
    fn from_decoded(value: &Decoded) -> Option<Self>;
}

macro_rules! representable {
    ($ty:ty, $variant:ident) => {
        impl Representable for $ty {
            fn into_decoded(self) -> Decoded {
                Decoded::$variant(self)
            }

            fn from_decoded(value: &Decoded) -> Option<Self> {
                match value {
                    Decoded::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

representable!(String, String);
representable!(i32, Int);
representable!(i64, Long);
representable!(f64, Float);
representable!(bool, Boolean);
representable!(Decimal, Decimal);
representable!(serde_json::Value, Json);
representable!(Vec<Decoded>, List);

impl Representable for Option<Decoded> {
    fn into_decoded(self) -> Decoded {
        self.unwrap_or(Decoded::Null)
    }

    fn from_decoded(value: &Decoded) -> Option<Self> {
        match value {
            Decoded::Null => Some(None),
            other => Some(Some(other.clone())),
        }
    }
}

/// Presents an adapter as one producing [`Decoded`].
struct Erase<A>(A);

impl<A> Adapter for Erase<A>
where
    A: Adapter,
    A::Value: Representable,
{
    type Value = Decoded;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Decoded, DecodeError> {
        self.0.from_json(reader, scalars).map(Representable::into_decoded)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Decoded,
    ) -> Result<(), EncodeError> {
        let value = <A::Value as Representable>::from_decoded(value).ok_or_else(|| {
            EncodeError::InvalidValue {
                message: format!("{:?} does not match the adapter's type", value),
            }
        })?;
        self.0.to_json(writer, scalars, &value)
    }
}

pub fn execute_decode(options: &DecodeOptions) -> Result<DecodeResult, CliError> {
    let type_ref = parse_type(&options.type_ref)?;
    let scalars = scalar_registry(&options.scalars)?;
    let input = options.input.as_ref().ok_or(CliError::NoInput)?;

    let adapter = build_adapter(&type_ref);
    let value = from_json_str(&adapter, &scalars, input)?;

    let writer_options = if options.pretty {
        WriterOptions::pretty()
    } else {
        WriterOptions::compact()
    };
    let json = to_json_string(&adapter, &scalars, &value, writer_options)?;
    Ok(DecodeResult { value, json })
}

/// Parses a GraphQL type reference such as `[String!]`.
pub fn parse_type(text: &str) -> Result<TypeRef, CliError> {
    let mut chars = text.chars().peekable();
    let type_ref = parse_type_ref(&mut chars, text)?;
    skip_whitespace(&mut chars);
    if let Some(c) = chars.next() {
        return Err(invalid_type(text, format!("unexpected '{}'", c)));
    }
    Ok(type_ref)
}

fn parse_type_ref(chars: &mut Peekable<Chars<'_>>, text: &str) -> Result<TypeRef, CliError> {
    skip_whitespace(chars);
    let base = match chars.peek() {
        Some('[') => {
            chars.next();
            let item = parse_type_ref(chars, text)?;
            skip_whitespace(chars);
            if chars.next() != Some(']') {
                return Err(invalid_type(text, "expected ']'"));
            }
            TypeRef::List(Box::new(item))
        }
        Some(c) if c.is_alphabetic() || *c == '_' => {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            TypeRef::Named(name)
        }
        _ => return Err(invalid_type(text, "expected a type name or '['")),
    };

    skip_whitespace(chars);
    if chars.peek() == Some(&'!') {
        chars.next();
        return Ok(TypeRef::NonNull(Box::new(base)));
    }
    Ok(base)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn invalid_type(text: &str, message: impl Into<String>) -> CliError {
    CliError::InvalidType {
        text: text.to_string(),
        message: message.into(),
    }
}

fn scalar_registry(mappings: &[String]) -> Result<CustomScalarAdapters, CliError> {
    let mut builder = CustomScalarAdapters::builder();
    for mapping in mappings {
        let builtin = mapping
            .split_once('=')
            .and_then(|(name, kind)| Some((name.trim(), Builtin::from_name(kind.trim())?)))
            .filter(|(name, _)| !name.is_empty());
        match builtin {
            Some((name, builtin)) => builder = builder.add(name, builtin.adapter()),
            None => return Err(CliError::InvalidScalarMapping(mapping.clone())),
        }
    }
    Ok(builder.build())
}

/// GraphQL types are nullable unless marked `!`.
fn build_adapter(type_ref: &TypeRef) -> DynAdapter {
    match type_ref {
        TypeRef::NonNull(inner) => build_non_null(inner),
        other => Box::new(Erase(nullable(build_non_null(other)))),
    }
}

fn build_non_null(type_ref: &TypeRef) -> DynAdapter {
    match type_ref {
        TypeRef::NonNull(inner) => build_non_null(inner),
        TypeRef::List(item) => Box::new(Erase(list(build_adapter(item)))),
        TypeRef::Named(name) => match Builtin::from_name(name) {
            Some(builtin) => builtin.adapter(),
            None => Box::new(CustomScalarAdapter::<Decoded>::new(name.clone())),
        },
    }
}
