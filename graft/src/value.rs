//! Dynamic values produced by the extractor and consumed by constructors.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt::{self, Debug};

use crate::error::DecodeError;
use crate::shape::{Decodable, Shape};

/// A constructed value of some [`Decodable`] type, with its shape.
pub struct AnyObject {
    shape: &'static Shape,
    inner: Box<dyn Any + Send + Sync>,
}

impl AnyObject {
    /// Wrap a value.
    pub fn new<T: Decodable>(value: T) -> Self {
        Self {
            shape: T::SHAPE,
            inner: Box::new(value),
        }
    }

    /// Shape of the wrapped value.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// Whether the wrapped value is a `T`.
    pub fn is<T: Decodable>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the wrapped value as a `T`.
    pub fn downcast_ref<T: Decodable>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Take the wrapped value out as a `T`, or get `self` back.
    pub fn downcast<T: Decodable>(self) -> Result<T, Self> {
        let shape = self.shape;
        match self.inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Self { shape, inner }),
        }
    }
}

impl Debug for AnyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyObject<{}>", self.shape.type_identifier)
    }
}

/// A decoded field value.
#[derive(Debug)]
pub enum Value {
    /// From a JSON string
    String(String),
    /// From a JSON integer
    Int(i64),
    /// From `true`/`false`
    Bool(bool),
    /// From a JSON array of strings
    StringList(Vec<String>),
    /// From a nested JSON object, already assembled
    Object(AnyObject),
}

impl Value {
    /// Short description of what this value holds, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::StringList(_) => "list of strings",
            Value::Object(object) => object.shape().type_identifier,
        }
    }
}

/// Conversion from a [`Value`] into a constructor argument type.
pub trait FromValue: Sized {
    /// What the conversion expects, for error messages.
    const EXPECTED: &'static str;

    /// Convert, or hand the value back if it does not fit.
    fn from_value(value: Value) -> Result<Self, Value>;
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for Vec<String> {
    const EXPECTED: &'static str = "list of strings";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::StringList(list) => Ok(list),
            other => Err(other),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::Int(n) => <$ty>::try_from(n).map_err(|_| Value::Int(n)),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_from_value_int! {
    i64 => "integer",
    i32 => "32-bit integer",
    u32 => "unsigned 32-bit integer",
    u64 => "unsigned integer",
    usize => "unsigned integer",
}

/// Constructor arguments, in the order the constructor declares them.
#[derive(Debug)]
pub struct Arguments {
    target: &'static str,
    values: Vec<(&'static str, Option<Value>)>,
}

impl Arguments {
    /// Create arguments for the type named `target`.
    pub fn new(target: &'static str, values: Vec<(&'static str, Value)>) -> Self {
        Self {
            target,
            values: values
                .into_iter()
                .map(|(name, value)| (name, Some(value)))
                .collect(),
        }
    }

    /// Name of the type being constructed.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Argument names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|(name, _)| *name)
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.iter().filter(|(_, v)| v.is_some()).count()
    }

    fn take_value(&mut self, name: &'static str) -> Result<Value, DecodeError> {
        self.values
            .iter_mut()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.take())
            .ok_or(DecodeError::MissingRequiredField {
                target: self.target,
                field: name,
                suggestion: None,
            })
    }

    /// Take the argument `name`, converted to `T`.
    pub fn take<T: FromValue>(&mut self, name: &'static str) -> Result<T, DecodeError> {
        let value = self.take_value(name)?;
        T::from_value(value).map_err(|value| DecodeError::TypeMismatch {
            target: self.target,
            field: name,
            expected: T::EXPECTED,
            found: value.describe(),
        })
    }

    /// Take the argument `name` as an assembled object of type `T`.
    pub fn take_object<T: Decodable>(&mut self, name: &'static str) -> Result<T, DecodeError> {
        let found = match self.take_value(name)? {
            Value::Object(object) => match object.downcast::<T>() {
                Ok(value) => return Ok(value),
                Err(object) => object.shape().type_identifier,
            },
            other => other.describe(),
        };
        Err(DecodeError::TypeMismatch {
            target: self.target,
            field: name,
            expected: T::SHAPE.type_identifier,
            found,
        })
    }
}
