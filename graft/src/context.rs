//! What a decode call carries down into nested objects.

use alloc::string::String;
use alloc::sync::Arc;

use graft_json::JsonCursor;

use crate::cache::PlanCache;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::registry::{SubDecoder, SubDecoderRegistry};
use crate::schema::CompositionPlan;
use crate::session::DecodeSession;
use crate::shape::{Capability, Shape};
use crate::value::AnyObject;

/// Read-only engine state plus the position of the object being decoded
/// relative to the root object of the decode call.
#[derive(Debug, Clone)]
pub struct DecodeContext<'e> {
    registry: &'e SubDecoderRegistry,
    config: &'e DecoderConfig,
    plans: &'e PlanCache,
    prefix: String,
    depth: usize,
}

impl<'e> DecodeContext<'e> {
    /// Context for a root object.
    pub fn root(
        registry: &'e SubDecoderRegistry,
        config: &'e DecoderConfig,
        plans: &'e PlanCache,
    ) -> Self {
        Self {
            registry,
            config,
            plans,
            prefix: String::new(),
            depth: 0,
        }
    }

    /// Context for the object held by field `field` of the current object.
    pub fn child(&self, field: &str, cursor: &dyn JsonCursor) -> Result<Self, DecodeError> {
        let depth = self.depth + 1;
        if depth > self.config.limits.max_depth {
            return Err(DecodeError::LimitExceeded {
                limit: "nesting depth",
                max: self.config.limits.max_depth,
                path: cursor.path(),
            });
        }
        Ok(Self {
            prefix: self.path_of(field),
            depth,
            ..self.clone()
        })
    }

    /// Registry key of field `field` of the current object (`book`,
    /// `book.author`).
    pub fn path_of(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            String::from(field)
        } else {
            alloc::format!("{}.{field}", self.prefix)
        }
    }

    /// Registry key of the current object; empty at the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// How many objects deep the current object is.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The engine configuration.
    pub fn config(&self) -> &'e DecoderConfig {
        self.config
    }

    /// The sub-decoder registered for field `field` of the current object.
    pub fn sub_decoder(&self, field: &str) -> Option<&'e dyn SubDecoder> {
        self.registry.get(&self.path_of(field))
    }

    /// The plan for `target`, from the shared cache.
    pub fn plan(
        &self,
        target: &'static Shape,
        capabilities: &[Capability],
    ) -> Result<Arc<CompositionPlan>, DecodeError> {
        Ok(self.plans.get_or_build(target, capabilities)?)
    }

    /// Decode the object at `cursor` as `target` with `capabilities`.
    pub fn decode(
        &self,
        target: &'static Shape,
        capabilities: &[Capability],
        cursor: &mut dyn JsonCursor,
    ) -> Result<AnyObject, DecodeError> {
        let plan = self.plan(target, capabilities)?;
        DecodeSession::new(plan, self).run(cursor)
    }
}
