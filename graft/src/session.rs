//! One object's decode, step by step.

use alloc::sync::Arc;
use core::fmt;

use graft_json::JsonCursor;

use crate::assemble::Assembler;
use crate::catalog::FieldCatalog;
use crate::context::DecodeContext;
use crate::error::DecodeError;
use crate::extract::{Extractor, ValueTable};
use crate::schema::CompositionPlan;
use crate::value::AnyObject;
use crate::{debug, trace};

/// Where a [`DecodeSession`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing done yet
    Idle,
    /// Lookahead has recorded the object's fields
    CatalogBuilt,
    /// The object has been consumed into a value table
    ValuesExtracted,
    /// The target was constructed
    Assembled,
    /// A step failed or was called out of order; nothing more can happen
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Idle => "idle",
            SessionState::CatalogBuilt => "catalog built",
            SessionState::ValuesExtracted => "values extracted",
            SessionState::Assembled => "assembled",
            SessionState::Failed => "failed",
        })
    }
}

/// Decodes one JSON object with one plan.
///
/// The steps must run in order: [`build_catalog`](Self::build_catalog),
/// [`extract`](Self::extract), [`assemble`](Self::assemble). Calling a step
/// out of order, or any step after a failure, returns
/// [`DecodeError::InvalidState`] and leaves the session
/// [`Failed`](SessionState::Failed).
pub struct DecodeSession<'a> {
    plan: Arc<CompositionPlan>,
    context: &'a DecodeContext<'a>,
    state: SessionState,
    catalog: Option<FieldCatalog>,
    table: Option<ValueTable>,
}

impl<'a> DecodeSession<'a> {
    /// A new, idle session.
    pub fn new(plan: Arc<CompositionPlan>, context: &'a DecodeContext<'a>) -> Self {
        Self {
            plan,
            context,
            state: SessionState::Idle,
            catalog: None,
            table: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The plan being decoded with.
    pub fn plan(&self) -> &CompositionPlan {
        &self.plan
    }

    /// The catalog, once built.
    pub fn catalog(&self) -> Option<&FieldCatalog> {
        self.catalog.as_ref()
    }

    /// Record the fields of the object at `cursor` without moving it.
    pub fn build_catalog(&mut self, cursor: &dyn JsonCursor) -> Result<(), DecodeError> {
        self.enter("build the catalog", SessionState::Idle)?;
        let result = FieldCatalog::peek(cursor, &self.context.config().limits);
        let catalog = self.settle(result, SessionState::CatalogBuilt)?;
        self.catalog = Some(catalog);
        Ok(())
    }

    /// Consume the object at `cursor` into a value table.
    pub fn extract(&mut self, cursor: &mut dyn JsonCursor) -> Result<(), DecodeError> {
        self.enter("extract values", SessionState::CatalogBuilt)?;
        let result = match &self.catalog {
            Some(catalog) => Extractor::new(self.context, &self.plan).decode_object(cursor, catalog),
            None => Err(DecodeError::InvalidState {
                operation: "extract values",
                state: self.state,
            }),
        };
        let table = self.settle(result, SessionState::ValuesExtracted)?;
        self.table = Some(table);
        Ok(())
    }

    /// Construct the delegates and the target.
    pub fn assemble(&mut self) -> Result<AnyObject, DecodeError> {
        self.enter("assemble", SessionState::ValuesExtracted)?;
        let result = match (self.table.take(), &self.catalog) {
            (Some(table), Some(catalog)) => Assembler::new(&self.plan).assemble(table, catalog),
            _ => Err(DecodeError::InvalidState {
                operation: "assemble",
                state: self.state,
            }),
        };
        self.settle(result, SessionState::Assembled)
    }

    /// Run all three steps.
    pub fn run(mut self, cursor: &mut dyn JsonCursor) -> Result<AnyObject, DecodeError> {
        self.build_catalog(&*cursor)?;
        self.extract(cursor)?;
        self.assemble()
    }

    fn enter(&mut self, operation: &'static str, expected: SessionState) -> Result<(), DecodeError> {
        if self.state == expected {
            return Ok(());
        }
        let err = DecodeError::InvalidState {
            operation,
            state: self.state,
        };
        self.transition(SessionState::Failed);
        Err(err)
    }

    fn settle<T>(
        &mut self,
        result: Result<T, DecodeError>,
        next: SessionState,
    ) -> Result<T, DecodeError> {
        match &result {
            Ok(_) => self.transition(next),
            Err(err) => {
                debug!(
                    "decoding {} failed: {err}",
                    self.plan.target().type_identifier
                );
                self.transition(SessionState::Failed);
            }
        }
        result
    }

    fn transition(&mut self, next: SessionState) {
        trace!(
            "{} session: {} -> {}",
            self.plan.target().type_identifier,
            self.state,
            next
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PlanCache;
    use crate::config::DecoderConfig;
    use crate::registry::SubDecoderRegistry;
    use crate::shape::Decodable;
    use crate::testing::PersonData;
    use graft_json::SliceCursor;

    struct Fixture {
        registry: SubDecoderRegistry,
        config: DecoderConfig,
        plans: PlanCache,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: SubDecoderRegistry::new(),
                config: DecoderConfig::default(),
                plans: PlanCache::new(),
            }
        }

        fn context(&self) -> DecodeContext<'_> {
            DecodeContext::root(&self.registry, &self.config, &self.plans)
        }
    }

    const PERSON_JSON: &[u8] = br#"{"name": "n", "surname": "s", "age": 4}"#;

    #[test]
    fn steps_in_order() {
        let fixture = Fixture::new();
        let context = fixture.context();
        let plan = context.plan(PersonData::SHAPE, &[]).unwrap();
        let mut session = DecodeSession::new(plan, &context);
        let mut cursor = SliceCursor::new(PERSON_JSON);

        assert_eq!(session.state(), SessionState::Idle);
        session.build_catalog(&cursor).unwrap();
        assert_eq!(session.state(), SessionState::CatalogBuilt);
        assert_eq!(session.catalog().map(FieldCatalog::len), Some(3));
        session.extract(&mut cursor).unwrap();
        assert_eq!(session.state(), SessionState::ValuesExtracted);
        let person = session.assemble().unwrap();
        assert_eq!(session.state(), SessionState::Assembled);
        assert_eq!(person.downcast_ref::<PersonData>().map(|p| p.age), Some(4));
    }

    #[test]
    fn skipping_a_step_fails_for_good() {
        let fixture = Fixture::new();
        let context = fixture.context();
        let plan = context.plan(PersonData::SHAPE, &[]).unwrap();
        let mut session = DecodeSession::new(plan, &context);
        let mut cursor = SliceCursor::new(PERSON_JSON);

        let err = session.extract(&mut cursor).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidState {
                operation: "extract values",
                state: SessionState::Idle,
            }
        );
        assert_eq!(session.state(), SessionState::Failed);

        // Failed is absorbing
        let err = session.build_catalog(&cursor).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidState {
                operation: "build the catalog",
                state: SessionState::Failed,
            }
        );
        insta::assert_snapshot!(err.to_string(), @"cannot build the catalog while the session is failed");
    }

    #[test]
    fn step_errors_fail_the_session() {
        let fixture = Fixture::new();
        let context = fixture.context();
        let plan = context.plan(PersonData::SHAPE, &[]).unwrap();
        let mut session = DecodeSession::new(plan, &context);
        let mut cursor = SliceCursor::new(br#"{"name": "n", "surname": "s"}"#);

        session.build_catalog(&cursor).unwrap();
        session.extract(&mut cursor).unwrap();
        assert!(matches!(
            session.assemble(),
            Err(DecodeError::MissingRequiredField { field: "age", .. })
        ));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.assemble().is_err());
    }

    #[test]
    fn assembling_twice_is_rejected() {
        let fixture = Fixture::new();
        let context = fixture.context();
        let plan = context.plan(PersonData::SHAPE, &[]).unwrap();
        let mut session = DecodeSession::new(plan, &context);
        let mut cursor = SliceCursor::new(PERSON_JSON);

        session.build_catalog(&cursor).unwrap();
        session.extract(&mut cursor).unwrap();
        session.assemble().unwrap();
        assert!(matches!(
            session.assemble(),
            Err(DecodeError::InvalidState {
                state: SessionState::Assembled,
                ..
            })
        ));
    }
}
