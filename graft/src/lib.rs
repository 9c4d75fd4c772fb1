//! Decode composite types from flat JSON objects.
//!
//! A composite is a type some of whose constructor parameters are filled by
//! embedding a smaller *delegate* value rather than by a JSON field of their
//! own. Given the capabilities the delegates fulfill, graft works out which
//! parameters are delegates ([`SchemaBuilder`]), records the fields of the
//! incoming object without consuming it ([`FieldCatalog`]), reads every field
//! into a typed value ([`Extractor`]), and then constructs each delegate
//! before the composite itself ([`Assembler`]).
//!
//! ```
//! use graft::{Arguments, Capability, Decodable, DecodeError, Engine, Param, Shape, ValueType};
//!
//! const PERSON: Capability = Capability::new("Person");
//!
//! struct PersonData {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Decodable for PersonData {
//!     const SHAPE: &'static Shape = &const {
//!         Shape::builder_for::<PersonData>("PersonData")
//!             .params(&const {
//!                 [
//!                     Param::new("name", ValueType::String),
//!                     Param::new("age", ValueType::Int),
//!                 ]
//!             })
//!             .implements(&const { [PERSON] })
//!             .build()
//!     };
//!
//!     fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
//!         Ok(PersonData {
//!             name: args.take("name")?,
//!             age: args.take("age")?,
//!         })
//!     }
//! }
//!
//! struct Student {
//!     data: PersonData,
//!     university: String,
//! }
//!
//! impl Decodable for Student {
//!     const SHAPE: &'static Shape = &const {
//!         Shape::builder_for::<Student>("Student")
//!             .params(&const {
//!                 [
//!                     Param::new("data", ValueType::Object(PersonData::SHAPE)),
//!                     Param::new("university", ValueType::String),
//!                 ]
//!             })
//!             .build()
//!     };
//!
//!     fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
//!         Ok(Student {
//!             data: args.take_object("data")?,
//!             university: args.take("university")?,
//!         })
//!     }
//! }
//!
//! let engine = Engine::builder().build().unwrap();
//! let student: Student = engine
//!     .decode_str(&[PERSON], r#"{"name": "Ada", "age": 20, "university": "U"}"#)
//!     .unwrap();
//! assert_eq!(student.data.name, "Ada");
//! assert_eq!(student.data.age, 20);
//! assert_eq!(student.university, "U");
//! ```

extern crate alloc;

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

mod assemble;
mod cache;
mod catalog;
mod config;
mod context;
mod engine;
mod error;
mod extract;
mod macros;
mod registry;
mod schema;
mod session;
mod shape;
mod value;

#[cfg(test)]
mod testing;

pub use assemble::Assembler;
pub use cache::PlanCache;
pub use catalog::{FieldCatalog, FieldEntry, FieldKind};
pub use config::{DecoderConfig, Limits};
pub use context::DecodeContext;
pub use engine::{Engine, EngineBuilder};
pub use error::{DecodeError, Error, FieldSource, SchemaError, UnsupportedOperation};
pub use extract::{Extractor, ValueTable};
pub use registry::{CompositeDecoder, FlatDecoder, SubDecoder, SubDecoderRegistry};
pub use schema::{CompositionPlan, DelegateBinding, DelegateGroup, PlanKey, SchemaBuilder};
pub use session::{DecodeSession, SessionState};
pub use shape::{Capability, ConstructFn, Decodable, Param, Shape, ShapeBuilder, ValueType};
pub use value::{AnyObject, Arguments, FromValue, Value};

pub use graft_json as json;
pub use graft_json::{JsonCursor, SliceCursor};
