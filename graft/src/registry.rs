//! Decoders for nested objects, keyed by where the object sits.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use std::collections::HashMap;

use graft_json::JsonCursor;

use crate::cache::PlanCache;
use crate::context::DecodeContext;
use crate::error::{DecodeError, SchemaError};
use crate::shape::{Capability, Decodable, Shape};
use crate::value::AnyObject;

/// Decodes the nested object a cursor is positioned at.
pub trait SubDecoder: Send + Sync {
    /// Shape of the values this decoder produces.
    fn shape(&self) -> &'static Shape;

    /// Decode the object at `cursor`. `context` is positioned at that object.
    fn decode(
        &self,
        cursor: &mut dyn JsonCursor,
        context: &DecodeContext<'_>,
    ) -> Result<AnyObject, DecodeError>;

    /// Build whatever plans the decoder will need, ahead of the first decode.
    fn prepare(&self, plans: &PlanCache) -> Result<(), SchemaError> {
        let _ = plans;
        Ok(())
    }
}

/// Decodes `T` field by field, with no delegates.
pub struct FlatDecoder<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> FlatDecoder<T> {
    /// Create the decoder.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for FlatDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Decodable> SubDecoder for FlatDecoder<T> {
    fn shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn decode(
        &self,
        cursor: &mut dyn JsonCursor,
        context: &DecodeContext<'_>,
    ) -> Result<AnyObject, DecodeError> {
        context.decode(T::SHAPE, &[], cursor)
    }

    fn prepare(&self, plans: &PlanCache) -> Result<(), SchemaError> {
        plans.get_or_build(T::SHAPE, &[]).map(drop)
    }
}

/// Decodes a nested composite `T` with its own delegate capabilities.
pub struct CompositeDecoder<T> {
    capabilities: Vec<Capability>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CompositeDecoder<T> {
    /// Create the decoder.
    pub fn new(capabilities: &[Capability]) -> Self {
        Self {
            capabilities: capabilities.to_vec(),
            _marker: PhantomData,
        }
    }

    /// The capabilities `T` is decoded with.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }
}

impl<T: Decodable> SubDecoder for CompositeDecoder<T> {
    fn shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn decode(
        &self,
        cursor: &mut dyn JsonCursor,
        context: &DecodeContext<'_>,
    ) -> Result<AnyObject, DecodeError> {
        context.decode(T::SHAPE, &self.capabilities, cursor)
    }

    fn prepare(&self, plans: &PlanCache) -> Result<(), SchemaError> {
        plans.get_or_build(T::SHAPE, &self.capabilities).map(drop)
    }
}

/// Normalize a registry path: `$.book`, `$book` and `book` are the same key.
fn normalize(path: &str) -> &str {
    let path = path.strip_prefix('$').unwrap_or(path);
    path.strip_prefix('.').unwrap_or(path)
}

/// Sub-decoders keyed by the dotted path of a field relative to the root
/// object of a decode call.
#[derive(Default)]
pub struct SubDecoderRegistry {
    decoders: HashMap<String, Box<dyn SubDecoder>>,
}

impl SubDecoderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `decoder` for `path`, replacing any previous one.
    pub fn insert(&mut self, path: &str, decoder: impl SubDecoder + 'static) {
        self.decoders
            .insert(String::from(normalize(path)), Box::new(decoder));
    }

    /// The decoder for `path`.
    pub fn get(&self, path: &str) -> Option<&dyn SubDecoder> {
        self.decoders.get(normalize(path)).map(|d| d.as_ref())
    }

    /// Whether a decoder is registered for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.decoders.contains_key(normalize(path))
    }

    /// Number of registered decoders.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered decoders.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn SubDecoder)> {
        self.decoders.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

impl fmt::Debug for SubDecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.decoders.keys().collect();
        keys.sort();
        f.debug_map()
            .entries(
                keys.into_iter()
                    .filter_map(|k| self.decoders.get(k).map(|d| (k, d.shape().type_identifier))),
            )
            .finish()
    }
}
