//! Static type metadata: what a type's constructor takes and which
//! capabilities it fulfills.

use core::any::TypeId;
use core::fmt::{self, Debug, Display};

use crate::error::DecodeError;
use crate::value::{AnyObject, Arguments, Value};

/// A role a delegate type fulfills.
///
/// Capabilities carry no data. Two capabilities are the same capability when
/// their names are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability {
    name: &'static str,
}

impl Capability {
    /// Create a capability.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// The capability's name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The declared type of a constructor parameter.
#[derive(Clone, Copy)]
pub enum ValueType {
    /// A JSON string
    String,
    /// A JSON integer
    Int,
    /// A JSON boolean
    Bool,
    /// A JSON array of strings
    StringList,
    /// A nested object of the given type
    Object(&'static Shape),
}

impl ValueType {
    /// Short description, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "integer",
            ValueType::Bool => "boolean",
            ValueType::StringList => "list of strings",
            ValueType::Object(shape) => shape.type_identifier,
        }
    }

    /// The shape, if this is an object type.
    pub fn shape(&self) -> Option<&'static Shape> {
        match *self {
            ValueType::Object(shape) => Some(shape),
            _ => None,
        }
    }

    /// Whether `value` can be passed to a parameter of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::String, Value::String(_))
            | (ValueType::Int, Value::Int(_))
            | (ValueType::Bool, Value::Bool(_))
            | (ValueType::StringList, Value::StringList(_)) => true,
            (ValueType::Object(shape), Value::Object(object)) => object.shape() == *shape,
            _ => false,
        }
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueType::Object(a), ValueType::Object(b)) => a == b,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Eq for ValueType {}

impl Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Object(shape) => write!(f, "Object({})", shape.type_identifier),
            other => f.write_str(other.describe()),
        }
    }
}

/// One constructor parameter, as declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Parameter name; also the JSON field name that supplies it
    pub name: &'static str,
    /// Declared type
    pub ty: ValueType,
}

impl Param {
    /// Create a parameter.
    pub const fn new(name: &'static str, ty: ValueType) -> Self {
        Self { name, ty }
    }
}

/// Type-erased constructor stored in a [`Shape`].
pub type ConstructFn = fn(&mut Arguments) -> Result<AnyObject, DecodeError>;

/// A type that can be built from decoded JSON values.
///
/// Implementors describe their constructor once, statically, in
/// [`SHAPE`](Decodable::SHAPE), and build themselves from the arguments the
/// engine hands to [`construct`](Decodable::construct).
///
/// ```
/// use graft::{Arguments, Decodable, DecodeError, Param, Shape, ValueType};
///
/// struct Book {
///     title: String,
/// }
///
/// impl Decodable for Book {
///     const SHAPE: &'static Shape = &const {
///         Shape::builder_for::<Book>("Book")
///             .params(&const { [Param::new("bookTitle", ValueType::String)] })
///             .build()
///     };
///
///     fn construct(args: &mut Arguments) -> Result<Self, DecodeError> {
///         Ok(Book {
///             title: args.take("bookTitle")?,
///         })
///     }
/// }
/// ```
pub trait Decodable: Sized + Send + Sync + 'static {
    /// Static metadata for this type.
    const SHAPE: &'static Shape;

    /// Build a value from its constructor arguments.
    fn construct(args: &mut Arguments) -> Result<Self, DecodeError>;
}

fn construct_erased<T: Decodable>(args: &mut Arguments) -> Result<AnyObject, DecodeError> {
    T::construct(args).map(AnyObject::new)
}

/// Static metadata about a [`Decodable`] type.
#[derive(Clone, Copy)]
pub struct Shape {
    /// Name of the type, as written in Rust
    pub type_identifier: &'static str,

    /// Constructor parameters in declaration order
    pub params: &'static [Param],

    /// Capabilities this type fulfills when embedded as a delegate
    pub implements: &'static [Capability],

    type_id: fn() -> TypeId,
    construct: ConstructFn,
}

impl Shape {
    /// Start building the shape of `T`.
    pub const fn builder_for<T: Decodable>(type_identifier: &'static str) -> ShapeBuilder {
        ShapeBuilder::for_type::<T>(type_identifier)
    }

    /// The [`TypeId`] of the described type.
    pub fn id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Whether this shape describes `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id() == TypeId::of::<T>()
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&'static Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Whether this type fulfills `capability`.
    pub fn implements(&self, capability: &Capability) -> bool {
        self.implements.contains(capability)
    }

    /// Parameters whose type is a nested object.
    pub fn object_params(&self) -> impl Iterator<Item = (&'static Param, &'static Shape)> {
        let params: &'static [Param] = self.params;
        params
            .iter()
            .filter_map(|p| p.ty.shape().map(|shape| (p, shape)))
    }

    /// A shape is flat when none of its parameters is a nested object.
    pub fn is_flat(&self) -> bool {
        self.object_params().next().is_none()
    }

    /// Invoke the constructor.
    pub fn construct(&self, args: &mut Arguments) -> Result<AnyObject, DecodeError> {
        (self.construct)(args)
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Shape {}

impl Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type_identifier", &self.type_identifier)
            .field("params", &self.params)
            .field("implements", &self.implements)
            .finish()
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_identifier)
    }
}

/// Builder for [`Shape`], usable in const context.
///
/// ```ignore
/// Shape::builder_for::<Student>("Student")
///     .params(&const { [Param::new("data", ValueType::Object(PersonData::SHAPE))] })
///     .build()
/// ```
pub struct ShapeBuilder {
    shape: Shape,
}

impl ShapeBuilder {
    /// Create a builder for `T` with no parameters and no capabilities.
    pub const fn for_type<T: Decodable>(type_identifier: &'static str) -> Self {
        Self {
            shape: Shape {
                type_identifier,
                params: &[],
                implements: &[],
                type_id: TypeId::of::<T>,
                construct: construct_erased::<T>,
            },
        }
    }

    /// Set the constructor parameters, in declaration order.
    pub const fn params(mut self, params: &'static [Param]) -> Self {
        self.shape.params = params;
        self
    }

    /// Set the capabilities the type fulfills.
    pub const fn implements(mut self, capabilities: &'static [Capability]) -> Self {
        self.shape.implements = capabilities;
        self
    }

    /// Finish building.
    pub const fn build(self) -> Shape {
        self.shape
    }
}
