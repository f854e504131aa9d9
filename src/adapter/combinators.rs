use super::{Adapter, CustomScalarAdapters, Optional};
use crate::json::{DecodeError, EncodeError, JsonReader, JsonWriter, TokenKind};

/// Accepts `null` in addition to whatever the wrapped adapter accepts.
#[derive(Debug, Clone, Copy)]
pub struct NullableAdapter<A>(pub A);

impl<A: Adapter> Adapter for NullableAdapter<A> {
    type Value = Option<A::Value>;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Self::Value, DecodeError> {
        if reader.peek()? == TokenKind::Null {
            reader.next_null()?;
            return Ok(None);
        }
        self.0.from_json(reader, scalars).map(Some)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Self::Value,
    ) -> Result<(), EncodeError> {
        match value {
            None => writer.null_value(),
            Some(value) => self.0.to_json(writer, scalars, value),
        }
    }
}

/// JSON arrays, each element handled by the wrapped adapter.
#[derive(Debug, Clone, Copy)]
pub struct ListAdapter<A>(pub A);

impl<A: Adapter> Adapter for ListAdapter<A> {
    type Value = Vec<A::Value>;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Self::Value, DecodeError> {
        let mut items = Vec::new();
        reader.begin_array()?;
        while reader.has_next()? {
            items.push(self.0.from_json(reader, scalars)?);
        }
        reader.end_array()?;
        Ok(items)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Self::Value,
    ) -> Result<(), EncodeError> {
        writer.begin_array()?;
        for item in value {
            self.0.to_json(writer, scalars, item)?;
        }
        writer.end_array()
    }
}

/// Wraps a fields adapter in `{` / `}`.
///
/// The wrapped adapter reads and writes the members of the object only, the
/// way generated model adapters do; this lets the same fields adapter be
/// reused where an enclosing reader has already opened the object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectAdapter<A>(pub A);

impl<A: Adapter> Adapter for ObjectAdapter<A> {
    type Value = A::Value;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Self::Value, DecodeError> {
        reader.begin_object()?;
        let value = self.0.from_json(reader, scalars)?;
        reader.end_object()?;
        Ok(value)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Self::Value,
    ) -> Result<(), EncodeError> {
        writer.begin_object()?;
        self.0.to_json(writer, scalars, value)?;
        writer.end_object()
    }
}

/// Reads values as [`Optional::Present`].
///
/// Writing [`Optional::Absent`] fails: an absent value has no JSON
/// representation, so the enclosing object writer must leave the member out.
#[derive(Debug, Clone, Copy)]
pub struct PresentAdapter<A>(pub A);

impl<A: Adapter> Adapter for PresentAdapter<A> {
    type Value = Optional<A::Value>;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<Self::Value, DecodeError> {
        self.0.from_json(reader, scalars).map(Optional::Present)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &Self::Value,
    ) -> Result<(), EncodeError> {
        match value {
            Optional::Absent => Err(EncodeError::AbsentValue),
            Optional::Present(value) => self.0.to_json(writer, scalars, value),
        }
    }
}

pub fn nullable<A: Adapter>(adapter: A) -> NullableAdapter<A> {
    NullableAdapter(adapter)
}

pub fn list<A: Adapter>(adapter: A) -> ListAdapter<A> {
    ListAdapter(adapter)
}

pub fn obj<A: Adapter>(adapter: A) -> ObjectAdapter<A> {
    ObjectAdapter(adapter)
}

pub fn present<A: Adapter>(adapter: A) -> PresentAdapter<A> {
    PresentAdapter(adapter)
}

/// Method-style combinators: `StringAdapter.nullable().list()`.
pub trait AdapterExt: Adapter + Sized {
    fn nullable(self) -> NullableAdapter<Self> {
        NullableAdapter(self)
    }

    fn list(self) -> ListAdapter<Self> {
        ListAdapter(self)
    }

    fn obj(self) -> ObjectAdapter<Self> {
        ObjectAdapter(self)
    }

    fn present(self) -> PresentAdapter<Self> {
        PresentAdapter(self)
    }
}

impl<A: Adapter> AdapterExt for A {}
