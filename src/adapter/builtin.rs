use std::str::FromStr;

use rust_decimal::Decimal;

use super::{Adapter, CustomScalarAdapters};
use crate::json::{DecodeError, EncodeError, JsonReader, JsonWriter, TokenKind};

/// `String`
#[derive(Debug, Clone, Copy, Default)]
pub struct StringAdapter;

impl Adapter for StringAdapter {
    type Value = String;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        _: &CustomScalarAdapters,
    ) -> Result<String, DecodeError> {
        reader.next_string()
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        _: &CustomScalarAdapters,
        value: &String,
    ) -> Result<(), EncodeError> {
        writer.value_str(value)
    }
}

/// `Int`, a signed 32-bit integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntAdapter;

impl Adapter for IntAdapter {
    type Value = i32;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        _: &CustomScalarAdapters,
    ) -> Result<i32, DecodeError> {
        reader.next_int()
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        _: &CustomScalarAdapters,
        value: &i32,
    ) -> Result<(), EncodeError> {
        writer.value_i64(i64::from(*value))
    }
}

/// 64-bit integers, commonly used for `Long`-style custom scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongAdapter;

impl Adapter for LongAdapter {
    type Value = i64;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        _: &CustomScalarAdapters,
    ) -> Result<i64, DecodeError> {
        reader.next_long()
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        _: &CustomScalarAdapters,
        value: &i64,
    ) -> Result<(), EncodeError> {
        writer.value_i64(*value)
    }
}

/// `Float`
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleAdapter;

impl Adapter for DoubleAdapter {
    type Value = f64;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        _: &CustomScalarAdapters,
    ) -> Result<f64, DecodeError> {
        reader.next_double()
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        _: &CustomScalarAdapters,
        value: &f64,
    ) -> Result<(), EncodeError> {
        writer.value_f64(*value)
    }
}

/// `Boolean`
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanAdapter;

impl Adapter for BooleanAdapter {
    type Value = bool;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        _: &CustomScalarAdapters,
    ) -> Result<bool, DecodeError> {
        reader.next_boolean()
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        _: &CustomScalarAdapters,
        value: &bool,
    ) -> Result<(), EncodeError> {
        writer.value_bool(*value)
    }
}

/// Arbitrary JSON, for scalars without a dedicated type.
///
/// Accepts `null` as a value in its own right.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyAdapter;

impl AnyAdapter {
    fn read(reader: &mut JsonReader) -> Result<serde_json::Value, DecodeError> {
        let value = match reader.peek()? {
            TokenKind::BeginObject => {
                let mut members = serde_json::Map::new();
                reader.begin_object()?;
                while reader.has_next()? {
                    let name = reader.next_name()?;
                    members.insert(name, Self::read(reader)?);
                }
                reader.end_object()?;
                serde_json::Value::Object(members)
            }
            TokenKind::BeginArray => {
                let mut items = Vec::new();
                reader.begin_array()?;
                while reader.has_next()? {
                    items.push(Self::read(reader)?);
                }
                reader.end_array()?;
                serde_json::Value::Array(items)
            }
            TokenKind::String => serde_json::Value::String(reader.next_string()?),
            TokenKind::Boolean => serde_json::Value::Bool(reader.next_boolean()?),
            TokenKind::Null => {
                reader.next_null()?;
                serde_json::Value::Null
            }
            TokenKind::Number => {
                let path = reader.path();
                let text = reader.next_number()?;
                let number =
                    serde_json::Number::from_str(&text).map_err(|e| DecodeError::InvalidValue {
                        message: format!("{}: {}", text, e),
                        path,
                    })?;
                serde_json::Value::Number(number)
            }
            found @ (TokenKind::Name
            | TokenKind::EndArray
            | TokenKind::EndObject
            | TokenKind::EndDocument) => {
                return Err(DecodeError::UnexpectedToken {
                    expected: TokenKind::BeginObject,
                    found,
                    path: reader.path(),
                    position: reader.position(),
                });
            }
        };
        Ok(value)
    }
}

impl Adapter for AnyAdapter {
    type Value = serde_json::Value;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        _: &CustomScalarAdapters,
    ) -> Result<serde_json::Value, DecodeError> {
        Self::read(reader)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        _: &CustomScalarAdapters,
        value: &serde_json::Value,
    ) -> Result<(), EncodeError> {
        writer.value_json(value)
    }
}

/// Arbitrary-precision decimals read from the number text itself, so values
/// such as `0.1` or large monetary amounts never pass through `f64`.
///
/// Numeric strings are accepted too (`"12.50"`), as servers often quote
/// decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalAdapter;

impl Adapter for DecimalAdapter {
    type Value = Decimal;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        _: &CustomScalarAdapters,
    ) -> Result<Decimal, DecodeError> {
        let path = reader.path();
        let text = reader.next_number()?;
        let parsed = if text.contains(['e', 'E']) {
            Decimal::from_scientific(&text)
        } else {
            Decimal::from_str(&text)
        };
        parsed.map_err(|e| DecodeError::InvalidValue {
            message: format!("{} is not a decimal: {}", text, e),
            path,
        })
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        _: &CustomScalarAdapters,
        value: &Decimal,
    ) -> Result<(), EncodeError> {
        writer.value_number(&value.to_string())
    }
}
