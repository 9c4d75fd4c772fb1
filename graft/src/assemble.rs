//! Building delegates, then the target, from a value table.

use alloc::string::String;
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::catalog::FieldCatalog;
use crate::debug;
use crate::error::DecodeError;
use crate::extract::ValueTable;
use crate::schema::CompositionPlan;
use crate::shape::{Decodable, Param, Shape};
use crate::value::{AnyObject, Arguments, Value};

/// Turns a [`ValueTable`] into an instance of the plan's target type.
pub struct Assembler<'p> {
    plan: &'p CompositionPlan,
}

impl<'p> Assembler<'p> {
    /// Create an assembler for `plan`.
    pub fn new(plan: &'p CompositionPlan) -> Self {
        Self { plan }
    }

    /// Construct every delegate in registration order, then the target with
    /// its arguments in declared order.
    ///
    /// Values are looked up by name through `catalog`; when a name occurs
    /// more than once the first occurrence wins.
    pub fn assemble(
        &self,
        mut table: ValueTable,
        catalog: &FieldCatalog,
    ) -> Result<AnyObject, DecodeError> {
        let target = self.plan.target();

        let mut delegates: IndexMap<&'static str, AnyObject> = IndexMap::new();
        for group in self.plan.delegate_groups() {
            let delegate = group.delegate();
            let values = group
                .params()
                .iter()
                .map(|param| Ok((param.name, self.fetch(delegate, param, &mut table, catalog)?)))
                .collect::<Result<Vec<_>, DecodeError>>()?;
            let object = delegate.construct(&mut Arguments::new(delegate.type_identifier, values))?;
            debug!(
                "constructed {} for {}.{}",
                delegate.type_identifier,
                target.type_identifier,
                group.parameter()
            );
            delegates.insert(group.parameter(), object);
        }

        let mut values = Vec::with_capacity(target.params.len());
        for param in target.params {
            let value = match delegates.swap_remove(param.name) {
                Some(object) => Value::Object(object),
                None => self.fetch(target, param, &mut table, catalog)?,
            };
            values.push((param.name, value));
        }

        let object = target.construct(&mut Arguments::new(target.type_identifier, values))?;
        debug!("constructed {}", target.type_identifier);
        Ok(object)
    }

    /// [`assemble`](Self::assemble), then unwrap the result as `T`.
    pub fn assemble_as<T: Decodable>(
        &self,
        table: ValueTable,
        catalog: &FieldCatalog,
    ) -> Result<T, DecodeError> {
        self.assemble(table, catalog)?
            .downcast::<T>()
            .map_err(|object| DecodeError::TypeMismatch {
                target: T::SHAPE.type_identifier,
                field: "$",
                expected: T::SHAPE.type_identifier,
                found: object.shape().type_identifier,
            })
    }

    /// The value for `param` of `owner`, checked against its declared type.
    fn fetch(
        &self,
        owner: &'static Shape,
        param: &'static Param,
        table: &mut ValueTable,
        catalog: &FieldCatalog,
    ) -> Result<Value, DecodeError> {
        let value = catalog
            .index_of(param.name)
            .and_then(|index| table.take(index));
        let Some(value) = value else {
            return Err(DecodeError::MissingRequiredField {
                target: owner.type_identifier,
                field: param.name,
                suggestion: self.suggest(param.name, catalog),
            });
        };
        if !param.ty.accepts(&value) {
            return Err(DecodeError::TypeMismatch {
                target: owner.type_identifier,
                field: param.name,
                expected: param.ty.describe(),
                found: value.describe(),
            });
        }
        Ok(value)
    }

    /// The present field most similar to `missing` that no parameter reads.
    #[cfg(feature = "suggestions")]
    fn suggest(&self, missing: &str, catalog: &FieldCatalog) -> Option<String> {
        const SIMILARITY_THRESHOLD: f64 = 0.6;

        let mut best: Option<(&str, f64)> = None;
        for name in catalog.names().filter(|name| !self.plan.consumes(name)) {
            let similarity = strsim::jaro_winkler(missing, name);
            if similarity >= SIMILARITY_THRESHOLD
                && best.is_none_or(|(_, best_similarity)| similarity > best_similarity)
            {
                best = Some((name, similarity));
            }
        }
        best.map(|(name, _)| String::from(name))
    }

    #[cfg(not(feature = "suggestions"))]
    fn suggest(&self, _missing: &str, _catalog: &FieldCatalog) -> Option<String> {
        None
    }
}
