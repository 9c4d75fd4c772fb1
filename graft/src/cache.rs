//! Shared cache of composition plans.

use alloc::sync::Arc;
use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::SchemaError;
use crate::schema::{CompositionPlan, PlanKey, SchemaBuilder};
use crate::shape::{Capability, Shape};
use crate::{debug, trace};

/// Plans keyed by target type and capability list.
///
/// Readers take the shared lock; a miss builds the plan without holding any
/// lock and then publishes it under the exclusive lock. A published plan is
/// never replaced.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: RwLock<HashMap<PlanKey, Arc<CompositionPlan>>>,
}

impl PlanCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached plan for `target` and `capabilities`, if any.
    pub fn get(&self, target: &Shape, capabilities: &[Capability]) -> Option<Arc<CompositionPlan>> {
        self.plans
            .read()
            .get(&PlanKey::new(target, capabilities))
            .cloned()
    }

    /// The plan for `target` and `capabilities`, building and publishing it
    /// on first use.
    pub fn get_or_build(
        &self,
        target: &'static Shape,
        capabilities: &[Capability],
    ) -> Result<Arc<CompositionPlan>, SchemaError> {
        let key = PlanKey::new(target, capabilities);
        if let Some(plan) = self.plans.read().get(&key) {
            trace!("plan cache hit for {}", target.type_identifier);
            return Ok(Arc::clone(plan));
        }

        let built = Arc::new(SchemaBuilder::build(target, capabilities)?);
        let mut plans = self.plans.write();
        let plan = plans.entry(key).or_insert_with(|| {
            debug!("publishing plan for {}", target.type_identifier);
            built
        });
        Ok(Arc::clone(plan))
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.plans.read().len()
    }

    /// Whether no plan has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.plans.read().is_empty()
    }
}
