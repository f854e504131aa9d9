//! # Adapters
//!
//! An [`Adapter`] moves one typed value across the JSON boundary: `from_json`
//! consumes exactly one complete JSON value from a [`JsonReader`], `to_json`
//! emits exactly one to a [`JsonWriter`]. Generated code composes adapters
//! per field type:
//!
//! | GraphQL type     | Adapter                               | Rust value        |
//! |------------------|---------------------------------------|-------------------|
//! | `String!`        | `StringAdapter`                       | `String`          |
//! | `String`         | `StringAdapter.nullable()`            | `Option<String>`  |
//! | `[Int!]!`        | `IntAdapter.list()`                   | `Vec<i32>`        |
//! | `Date!` (custom) | `CustomScalarAdapter::<Date>::new(..)`| `Date`            |
//! | `Hero!` (object) | `HeroFields.obj()`                    | `Hero`            |
//!
//! `null` is only accepted where [`nullable`] was applied; a non-null field
//! that comes back `null` fails with [`DecodeError::UnexpectedNull`].
//!
//! After a failed `to_json` the writer's output is undefined and must be
//! discarded.
//!
//! ## Submodules
//!
//! - **[builtin]**: adapters for the built-in scalars and untyped JSON
//! - **[combinators]**: nullable, list, object and present wrappers
//! - **[custom]**: custom scalar registration and lookup
//!
//! [`nullable`]: combinators::nullable

pub mod builtin;
pub mod combinators;
pub mod custom;

use std::sync::Arc;

pub use builtin::{
    AnyAdapter, BooleanAdapter, DecimalAdapter, DoubleAdapter, IntAdapter, LongAdapter,
    StringAdapter,
};
pub use combinators::{
    list, nullable, obj, present, AdapterExt, ListAdapter, NullableAdapter, ObjectAdapter,
    PresentAdapter,
};
pub use custom::{
    CustomScalarAdapter, CustomScalarAdapters, CustomScalarAdaptersBuilder, ScalarLookupError,
};

use crate::json::{DecodeError, EncodeError, JsonReader, JsonWriter, TokenKind, WriterOptions};

/// Conversion between a typed value and a JSON value.
///
/// `scalars` is passed on every call so that custom scalars resolve against
/// whatever configuration the caller is using right now.
pub trait Adapter {
    type Value;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Self::Value, DecodeError>;

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Self::Value,
    ) -> Result<(), EncodeError>;
}

impl<A: Adapter + ?Sized> Adapter for &A {
    type Value = A::Value;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Self::Value, DecodeError> {
        (**self).from_json(reader, scalars)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Self::Value,
    ) -> Result<(), EncodeError> {
        (**self).to_json(writer, scalars, value)
    }
}

impl<A: Adapter + ?Sized> Adapter for Box<A> {
    type Value = A::Value;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Self::Value, DecodeError> {
        (**self).from_json(reader, scalars)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Self::Value,
    ) -> Result<(), EncodeError> {
        (**self).to_json(writer, scalars, value)
    }
}

impl<A: Adapter + ?Sized> Adapter for Arc<A> {
    type Value = A::Value;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Self::Value, DecodeError> {
        (**self).from_json(reader, scalars)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Self::Value,
    ) -> Result<(), EncodeError> {
        (**self).to_json(writer, scalars, value)
    }
}

/// A value that may be left out entirely, as opposed to sent as `null`.
///
/// `Optional<Option<T>>` distinguishes all three cases of a nullable input
/// field: absent, explicit `null`, and a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Optional<T> {
    Absent,
    Present(T),
}

impl<T> Optional<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Optional::Present(_))
    }

    pub fn as_ref(&self) -> Optional<&T> {
        match self {
            Optional::Absent => Optional::Absent,
            Optional::Present(value) => Optional::Present(value),
        }
    }

    /// The value, if present.
    pub fn present_value(self) -> Option<T> {
        match self {
            Optional::Absent => None,
            Optional::Present(value) => Some(value),
        }
    }
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Optional::Absent
    }
}

/// Decodes one complete JSON document with `adapter`.
///
/// # Examples
///
/// ```
/// use gqlshape::adapter::{from_json_str, AdapterExt, CustomScalarAdapters, StringAdapter};
///
/// let scalars = CustomScalarAdapters::empty();
/// assert_eq!(from_json_str(&StringAdapter, &scalars, r#""test""#).unwrap(), "test");
/// assert_eq!(from_json_str(&StringAdapter.nullable(), &scalars, "null").unwrap(), None);
/// assert!(from_json_str(&StringAdapter, &scalars, "null").is_err());
/// ```
pub fn from_json_str<A: Adapter + ?Sized>(
    adapter: &A,
    scalars: &CustomScalarAdapters,
    json: &str,
) -> Result<A::Value, DecodeError> {
    let mut reader = JsonReader::new(json);
    let value = adapter.from_json(&mut reader, scalars)?;
    match reader.peek()? {
        TokenKind::EndDocument => Ok(value),
        found => Err(DecodeError::UnexpectedToken {
            expected: TokenKind::EndDocument,
            found,
            path: reader.path(),
            position: reader.position(),
        }),
    }
}

/// Encodes `value` as a standalone JSON document.
pub fn to_json_string<A: Adapter + ?Sized>(
    adapter: &A,
    scalars: &CustomScalarAdapters,
    value: &A::Value,
    options: WriterOptions,
) -> Result<String, EncodeError> {
    let mut out = Vec::new();
    {
        let mut writer = JsonWriter::new(&mut out, options);
        adapter.to_json(&mut writer, scalars, value)?;
        writer.finish()?;
    }
    String::from_utf8(out).map_err(|e| EncodeError::InvalidValue {
        message: e.to_string(),
    })
}

/// Unwraps a required field collected while reading an object.
///
/// Generated object adapters collect members into `Option`s while looping
/// over [`JsonReader::select_name`], then call this once the members run out.
pub fn check_field_present<T>(
    reader: &JsonReader,
    value: Option<T>,
    field: &str,
) -> Result<T, DecodeError> {
    value.ok_or_else(|| reader.missing_field(field))
}
