//! Composition plans: which constructor parameters are delegates.

use alloc::vec::Vec;
use core::any::TypeId;

use indexmap::{IndexMap, IndexSet};

use crate::debug;
use crate::error::{FieldSource, SchemaError};
use crate::shape::{Capability, Param, Shape};

/// One capability resolved to the parameter that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegateBinding {
    /// The target parameter holding the delegate
    pub parameter: &'static str,
    /// The delegate's type
    pub delegate: &'static Shape,
    /// The capability that selected it
    pub capability: Capability,
}

/// Everything needed to construct one delegate: the parameter that holds it
/// and the capabilities that selected it, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateGroup {
    parameter: &'static str,
    delegate: &'static Shape,
    capabilities: Vec<Capability>,
}

impl DelegateGroup {
    /// The target parameter holding the delegate.
    pub fn parameter(&self) -> &'static str {
        self.parameter
    }

    /// The delegate's type.
    pub fn delegate(&self) -> &'static Shape {
        self.delegate
    }

    /// Capabilities bound to this parameter.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// The delegate's constructor parameters, in declared order.
    pub fn params(&self) -> &'static [Param] {
        self.delegate.params
    }
}

/// Cache key for a plan: the target type plus the capability list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    target: TypeId,
    capabilities: Vec<&'static str>,
}

impl PlanKey {
    /// Key for `target` decoded with `capabilities`.
    pub fn new(target: &Shape, capabilities: &[Capability]) -> Self {
        Self {
            target: target.id(),
            capabilities: capabilities.iter().map(Capability::name).collect(),
        }
    }
}

/// How to build a composite: which parameters are filled by delegates and
/// which come straight from JSON fields.
///
/// Every parameter of the target is in exactly one of
/// [`delegate_groups`](Self::delegate_groups) and
/// [`direct_parameter_names`](Self::direct_parameter_names).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionPlan {
    target: &'static Shape,
    capabilities: Vec<Capability>,
    bindings: Vec<DelegateBinding>,
    groups: IndexMap<&'static str, DelegateGroup>,
    direct: IndexSet<&'static str>,
    fields: IndexSet<&'static str>,
}

impl CompositionPlan {
    /// The composite type.
    pub fn target(&self) -> &'static Shape {
        self.target
    }

    /// Capabilities this plan was built for, in registration order.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// One binding per capability, in registration order.
    pub fn bindings(&self) -> &[DelegateBinding] {
        &self.bindings
    }

    /// The binding for `capability`.
    pub fn binding_for(&self, capability: &Capability) -> Option<&DelegateBinding> {
        self.bindings.iter().find(|b| b.capability == *capability)
    }

    /// One group per delegate parameter, ordered by the first capability
    /// that bound it.
    pub fn delegate_groups(&self) -> impl Iterator<Item = &DelegateGroup> {
        self.groups.values()
    }

    /// The delegate group for target parameter `parameter`.
    pub fn group_for(&self, parameter: &str) -> Option<&DelegateGroup> {
        self.groups.get(parameter)
    }

    /// Target parameters read directly from JSON fields, in declared order.
    pub fn direct_parameter_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.direct.iter().copied()
    }

    /// Every JSON field name the plan consumes: direct parameters and the
    /// parameters of every delegate.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().copied()
    }

    /// Whether some parameter consumes the JSON field `name`.
    pub fn consumes(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Cache key of this plan.
    pub fn key(&self) -> PlanKey {
        PlanKey::new(self.target, &self.capabilities)
    }
}

/// Builds [`CompositionPlan`]s from shapes.
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Resolve every capability to the single parameter of `target` whose
    /// declared type implements it.
    ///
    /// This only reads static metadata, so the same input always produces
    /// the same plan.
    pub fn build(
        target: &'static Shape,
        capabilities: &[Capability],
    ) -> Result<CompositionPlan, SchemaError> {
        check_unique_params(target)?;

        let mut bindings = Vec::with_capacity(capabilities.len());
        let mut groups: IndexMap<&'static str, DelegateGroup> = IndexMap::new();

        for (i, capability) in capabilities.iter().enumerate() {
            if capabilities[..i].contains(capability) {
                return Err(SchemaError::DuplicateCapability {
                    target: target.type_identifier,
                    capability: capability.name(),
                });
            }

            let candidates: Vec<(&'static Param, &'static Shape)> = target
                .object_params()
                .filter(|(_, shape)| shape.implements(capability))
                .collect();
            let [(param, delegate)] = candidates[..] else {
                return Err(SchemaError::AmbiguousOrMissingDelegate {
                    target: target.type_identifier,
                    capability: capability.name(),
                    candidates: candidates.iter().map(|(p, _)| p.name).collect(),
                });
            };

            if let Some((nested, _)) = delegate.object_params().next() {
                return Err(SchemaError::NestedDelegate {
                    target: target.type_identifier,
                    parameter: param.name,
                    delegate: delegate.type_identifier,
                    nested: nested.name,
                });
            }
            check_unique_params(delegate)?;

            bindings.push(DelegateBinding {
                parameter: param.name,
                delegate,
                capability: *capability,
            });
            groups
                .entry(param.name)
                .or_insert_with(|| DelegateGroup {
                    parameter: param.name,
                    delegate,
                    capabilities: Vec::new(),
                })
                .capabilities
                .push(*capability);
        }

        let direct: IndexSet<&'static str> = target
            .params
            .iter()
            .map(|p| p.name)
            .filter(|name| !groups.contains_key(*name))
            .collect();

        let fields = collect_fields(target, &direct, &groups)?;

        debug!(
            "plan for {}: {} delegate(s), {} direct parameter(s)",
            target.type_identifier,
            groups.len(),
            direct.len()
        );

        Ok(CompositionPlan {
            target,
            capabilities: capabilities.to_vec(),
            bindings,
            groups,
            direct,
            fields,
        })
    }
}

fn check_unique_params(shape: &Shape) -> Result<(), SchemaError> {
    for (i, param) in shape.params.iter().enumerate() {
        if shape.params[..i].iter().any(|p| p.name == param.name) {
            return Err(SchemaError::DuplicateParameter {
                type_identifier: shape.type_identifier,
                parameter: param.name,
            });
        }
    }
    Ok(())
}

/// All JSON field names the plan reads, rejecting names supplied twice.
fn collect_fields(
    target: &Shape,
    direct: &IndexSet<&'static str>,
    groups: &IndexMap<&'static str, DelegateGroup>,
) -> Result<IndexSet<&'static str>, SchemaError> {
    let mut fields: IndexMap<&'static str, FieldSource> = IndexMap::new();

    let sources = direct
        .iter()
        .map(|name| (*name, FieldSource::Direct))
        .chain(groups.values().flat_map(|group| {
            group
                .params()
                .iter()
                .map(move |p| (p.name, FieldSource::Delegate(group.parameter)))
        }));

    for (name, source) in sources {
        if let Some(first) = fields.get(name) {
            return Err(SchemaError::DuplicateField {
                target: target.type_identifier,
                field: name,
                first: *first,
                second: source,
            });
        }
        fields.insert(name, source);
    }

    Ok(fields.into_keys().collect())
}
