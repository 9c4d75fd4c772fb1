//! The decoding engine and its builder.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use std::collections::HashMap;

use graft_json::{JsonCursor, SliceCursor};
use parking_lot::RwLock;

use crate::cache::PlanCache;
use crate::config::DecoderConfig;
use crate::context::DecodeContext;
use crate::error::{DecodeError, SchemaError, UnsupportedOperation};
use crate::registry::{CompositeDecoder, FlatDecoder, SubDecoder, SubDecoderRegistry};
use crate::schema::CompositionPlan;
use crate::shape::{Capability, Decodable, Shape};
use crate::{debug, trace};

/// Collects registrations and configuration for an [`Engine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    registry: SubDecoderRegistry,
    config: DecoderConfig,
    registrations: Vec<Registration>,
}

#[derive(Debug, Clone)]
struct Registration {
    target: &'static Shape,
    capabilities: Vec<Capability>,
}

impl EngineBuilder {
    /// A builder with default configuration and nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` as a composite whose delegates fulfill `capabilities`.
    ///
    /// The plan is built by [`build`](Self::build), and
    /// [`Engine::decode_registered`] decodes `T` with it.
    pub fn register<T: Decodable>(mut self, capabilities: &[Capability]) -> Self {
        self.registrations.retain(|r| !r.target.is::<T>());
        self.registrations.push(Registration {
            target: T::SHAPE,
            capabilities: capabilities.to_vec(),
        });
        self
    }

    /// Decode nested objects at `path` as a plain `T`.
    pub fn flat<T: Decodable>(self, path: &str) -> Self {
        self.sub_decoder(path, FlatDecoder::<T>::new())
    }

    /// Decode nested objects at `path` as a composite `T` whose delegates
    /// fulfill `capabilities`.
    pub fn composite<T: Decodable>(self, path: &str, capabilities: &[Capability]) -> Self {
        self.sub_decoder(path, CompositeDecoder::<T>::new(capabilities))
    }

    /// Decode nested objects at `path` with `decoder`.
    ///
    /// Paths are dotted field names relative to the object passed to
    /// [`Engine::decode`]: `book`, or `shelf.book` for a field of a nested
    /// object. A leading `$.` is accepted and ignored.
    pub fn sub_decoder(mut self, path: &str, decoder: impl SubDecoder + 'static) -> Self {
        self.registry.insert(path, decoder);
        self
    }

    /// Replace the configuration.
    pub fn config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Build every registered plan and freeze the engine.
    pub fn build(self) -> Result<Engine, SchemaError> {
        let plans = PlanCache::new();
        for registration in &self.registrations {
            plans.get_or_build(registration.target, &registration.capabilities)?;
        }
        for (path, decoder) in self.registry.iter() {
            trace!("preparing sub-decoder for {path}");
            decoder.prepare(&plans)?;
        }

        let registered: HashMap<TypeId, Vec<Capability>> = self
            .registrations
            .into_iter()
            .map(|r| (r.target.id(), r.capabilities))
            .collect();

        debug!(
            "engine built: {} registered type(s), {} sub-decoder(s)",
            registered.len(),
            self.registry.len()
        );

        Ok(Engine {
            registry: self.registry,
            config: self.config,
            plans,
            registered: RwLock::new(registered),
        })
    }
}

/// Decodes composite types from JSON objects.
///
/// The sub-decoder registry and configuration are fixed at build time.
/// Plans are cached on first use and shared by every decode, so one engine
/// can serve any number of threads.
#[derive(Debug)]
pub struct Engine {
    registry: SubDecoderRegistry,
    config: DecoderConfig,
    plans: PlanCache,
    registered: RwLock<HashMap<TypeId, Vec<Capability>>>,
}

impl Engine {
    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// The sub-decoder registry.
    pub fn registry(&self) -> &SubDecoderRegistry {
        &self.registry
    }

    fn root_context(&self) -> DecodeContext<'_> {
        DecodeContext::root(&self.registry, &self.config, &self.plans)
    }

    /// Decode the object at `cursor` as `T`, whose delegates fulfill
    /// `capabilities`.
    ///
    /// Delegates are constructed in the order of `capabilities`. On error
    /// no value is produced and the cursor position is unspecified.
    pub fn decode<T: Decodable>(
        &self,
        capabilities: &[Capability],
        cursor: &mut dyn JsonCursor,
    ) -> Result<T, DecodeError> {
        let object = self
            .root_context()
            .decode(T::SHAPE, capabilities, cursor)?;
        object
            .downcast::<T>()
            .map_err(|object| DecodeError::TypeMismatch {
                target: T::SHAPE.type_identifier,
                field: "$",
                expected: T::SHAPE.type_identifier,
                found: object.shape().type_identifier,
            })
    }

    /// Decode a whole JSON document holding one object.
    pub fn decode_str<T: Decodable>(
        &self,
        capabilities: &[Capability],
        input: &str,
    ) -> Result<T, DecodeError> {
        let mut cursor = SliceCursor::new(input.as_bytes());
        let value = self.decode(capabilities, &mut cursor)?;
        cursor.finish()?;
        Ok(value)
    }

    /// Decode every element of the JSON array at `cursor`; each element is
    /// decoded independently.
    pub fn decode_array<T: Decodable>(
        &self,
        capabilities: &[Capability],
        cursor: &mut dyn JsonCursor,
    ) -> Result<Vec<T>, DecodeError> {
        let mut out = Vec::new();
        cursor.begin_array()?;
        while cursor.has_next()? {
            out.push(self.decode(capabilities, cursor)?);
        }
        cursor.end_array()?;
        Ok(out)
    }

    /// Decode `T` with the capabilities it was registered with.
    pub fn decode_registered<T: Decodable>(
        &self,
        cursor: &mut dyn JsonCursor,
    ) -> Result<T, DecodeError> {
        let capabilities = self
            .registered
            .read()
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or(DecodeError::UnregisteredType {
                type_identifier: T::SHAPE.type_identifier,
            })?;
        self.decode(&capabilities, cursor)
    }

    /// Register `T` after the engine was built, building its plan now.
    ///
    /// A later registration of the same type replaces the capabilities
    /// [`decode_registered`](Self::decode_registered) uses.
    pub fn register_delegate_capabilities<T: Decodable>(
        &self,
        capabilities: &[Capability],
    ) -> Result<Arc<CompositionPlan>, SchemaError> {
        let plan = self.plans.get_or_build(T::SHAPE, capabilities)?;
        self.registered
            .write()
            .insert(TypeId::of::<T>(), capabilities.to_vec());
        debug!("registered {}", T::SHAPE.type_identifier);
        Ok(plan)
    }

    /// The plan for `T` with `capabilities`, built on first use.
    pub fn plan_for<T: Decodable>(
        &self,
        capabilities: &[Capability],
    ) -> Result<Arc<CompositionPlan>, SchemaError> {
        self.plans.get_or_build(T::SHAPE, capabilities)
    }

    /// Number of cached plans.
    pub fn cached_plans(&self) -> usize {
        self.plans.len()
    }

    /// Encoding is not supported; this always fails.
    pub fn encode<T: Decodable>(&self, value: &T) -> Result<String, UnsupportedOperation> {
        let _ = value;
        Err(UnsupportedOperation {
            operation: "encoding",
            type_identifier: T::SHAPE.type_identifier,
        })
    }
}
