//! Custom scalars.
//!
//! A schema's custom scalars (`Date`, `URL`, `GeoPoint`, ...) are mapped to
//! Rust types by registering an adapter per scalar name. The registry is
//! immutable once built and cheap to clone, so one instance can be shared by
//! every concurrent decode; changing the mapping means building a new
//! registry.
//!
//! # Examples
//!
//! ```
//! use gqlshape::adapter::{
//!     from_json_str, CustomScalarAdapter, CustomScalarAdapters, LongAdapter,
//! };
//!
//! let scalars = CustomScalarAdapters::builder()
//!     .add("Timestamp", LongAdapter)
//!     .build();
//!
//! let timestamp = CustomScalarAdapter::<i64>::new("Timestamp");
//! assert_eq!(from_json_str(&timestamp, &scalars, "1700000000").unwrap(), 1_700_000_000);
//! ```

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use super::Adapter;
use crate::json::{DecodeError, EncodeError, JsonReader, JsonWriter};

/// What a registry entry holds once the concrete adapter type is erased.
type Registered<T> = Arc<dyn Adapter<Value = T> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalarLookupError {
    #[error("no adapter registered for custom scalar '{name}'")]
    Unregistered { name: String },

    #[error("adapter registered for custom scalar '{name}' is not an adapter for {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

impl From<ScalarLookupError> for DecodeError {
    fn from(err: ScalarLookupError) -> Self {
        match err {
            ScalarLookupError::Unregistered { name } => DecodeError::UnknownScalar { name },
            ScalarLookupError::TypeMismatch { name, expected } => {
                DecodeError::ScalarTypeMismatch { name, expected }
            }
        }
    }
}

impl From<ScalarLookupError> for EncodeError {
    fn from(err: ScalarLookupError) -> Self {
        match err {
            ScalarLookupError::Unregistered { name } => EncodeError::UnknownScalar { name },
            ScalarLookupError::TypeMismatch { name, expected } => {
                EncodeError::ScalarTypeMismatch { name, expected }
            }
        }
    }
}

/// Registry from custom scalar name to adapter.
#[derive(Clone, Default)]
pub struct CustomScalarAdapters {
    adapters: Arc<BTreeMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl CustomScalarAdapters {
    pub fn builder() -> CustomScalarAdaptersBuilder {
        CustomScalarAdaptersBuilder::default()
    }

    /// A registry with no custom scalars; only built-in adapters work with it.
    pub fn empty() -> Self {
        CustomScalarAdapters::default()
    }

    /// A builder seeded with this registry's entries, for deriving a new
    /// configuration. `self` is left untouched.
    pub fn to_builder(&self) -> CustomScalarAdaptersBuilder {
        CustomScalarAdaptersBuilder {
            adapters: (*self.adapters).clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    /// Registered scalar names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    /// Looks up the adapter registered for `name`, which must produce `T`.
    pub fn adapter_for<T: 'static>(&self, name: &str) -> Result<Registered<T>, ScalarLookupError> {
        trace!(scalar = name, expected = type_name::<T>(), "resolving custom scalar adapter");
        let entry = self
            .adapters
            .get(name)
            .ok_or_else(|| ScalarLookupError::Unregistered {
                name: name.to_string(),
            })?;
        entry
            .downcast_ref::<Registered<T>>()
            .cloned()
            .ok_or_else(|| ScalarLookupError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }
}

impl fmt::Debug for CustomScalarAdapters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[derive(Default)]
pub struct CustomScalarAdaptersBuilder {
    adapters: BTreeMap<String, Arc<dyn Any + Send + Sync>>,
}

impl CustomScalarAdaptersBuilder {
    /// Registers `adapter` for the scalar `name`, replacing any earlier entry.
    pub fn add<A>(mut self, name: impl Into<String>, adapter: A) -> Self
    where
        A: Adapter + Send + Sync + 'static,
        A::Value: 'static,
    {
        let entry: Registered<A::Value> = Arc::new(adapter);
        self.adapters.insert(name.into(), Arc::new(entry));
        self
    }

    pub fn build(self) -> CustomScalarAdapters {
        CustomScalarAdapters {
            adapters: Arc::new(self.adapters),
        }
    }
}

/// Adapter for a field of custom scalar type.
///
/// The registry is consulted on every call, not at construction, so the same
/// adapter works against whichever [`CustomScalarAdapters`] the caller passes.
pub struct CustomScalarAdapter<T> {
    name: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> CustomScalarAdapter<T> {
    pub fn new(name: impl Into<String>) -> Self {
        CustomScalarAdapter {
            name: name.into(),
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for CustomScalarAdapter<T> {
    fn clone(&self) -> Self {
        CustomScalarAdapter::new(self.name.clone())
    }
}

impl<T> fmt::Debug for CustomScalarAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomScalarAdapter")
            .field("name", &self.name)
            .field("type", &type_name::<T>())
            .finish()
    }
}

impl<T: 'static> Adapter for CustomScalarAdapter<T> {
    type Value = T;

    fn from_json(
        &self,
        reader: &mut JsonReader,
        scalars: &CustomScalarAdapters,
    ) -> Result<T, DecodeError> {
        scalars.adapter_for::<T>(&self.name)?.from_json(reader, scalars)
    }

    fn to_json(
        &self,
        writer: &mut JsonWriter<'_>,
        scalars: &CustomScalarAdapters,
        value: &T,
    ) -> Result<(), EncodeError> {
        scalars.adapter_for::<T>(&self.name)?.to_json(writer, scalars, value)
    }
}
