//! Error types.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use graft_json::JsonError;

use crate::session::SessionState;

/// Where a JSON-level field name comes from in a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// A parameter of the target's own constructor
    Direct,
    /// A parameter of the delegate held by the named target parameter
    Delegate(&'static str),
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSource::Direct => f.write_str("the target itself"),
            FieldSource::Delegate(parameter) => write!(f, "delegate '{parameter}'"),
        }
    }
}

/// Errors that can occur when building a composition plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A capability is held by no parameter, or by more than one
    AmbiguousOrMissingDelegate {
        /// The composite type
        target: &'static str,
        /// The capability being resolved
        capability: &'static str,
        /// Parameters whose type implements the capability
        candidates: Vec<&'static str>,
    },
    /// Two constructor parameters share a name
    DuplicateParameter {
        /// The type declaring the parameters
        type_identifier: &'static str,
        /// The repeated name
        parameter: &'static str,
    },
    /// The same capability was requested twice
    DuplicateCapability {
        /// The composite type
        target: &'static str,
        /// The repeated capability
        capability: &'static str,
    },
    /// A delegate has an object-typed parameter of its own
    NestedDelegate {
        /// The composite type
        target: &'static str,
        /// The target parameter holding the delegate
        parameter: &'static str,
        /// The delegate type
        delegate: &'static str,
        /// The delegate's object-typed parameter
        nested: &'static str,
    },
    /// A JSON field name is supplied from two places
    DuplicateField {
        /// The composite type
        target: &'static str,
        /// The clashing field name
        field: &'static str,
        /// Where the name was seen first
        first: FieldSource,
        /// Where it was seen again
        second: FieldSource,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::AmbiguousOrMissingDelegate {
                target,
                capability,
                candidates,
            } => {
                if candidates.is_empty() {
                    write!(
                        f,
                        "no parameter of {target} holds a delegate implementing {capability}"
                    )
                } else {
                    write!(
                        f,
                        "capability {capability} of {target} is held by more than one parameter: {}",
                        candidates.join(", ")
                    )
                }
            }
            SchemaError::DuplicateParameter {
                type_identifier,
                parameter,
            } => write!(
                f,
                "{type_identifier} declares parameter '{parameter}' more than once"
            ),
            SchemaError::DuplicateCapability { target, capability } => {
                write!(f, "capability {capability} requested twice for {target}")
            }
            SchemaError::NestedDelegate {
                target,
                parameter,
                delegate,
                nested,
            } => write!(
                f,
                "delegate {delegate} (parameter '{parameter}' of {target}) is not flat: \
                 its parameter '{nested}' is an object"
            ),
            SchemaError::DuplicateField {
                target,
                field,
                first,
                second,
            } => write!(
                f,
                "duplicate field name '{field}' in {target}: supplied by {first} and by {second}"
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Errors that can occur while decoding one object.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A nested object was found at a path no sub-decoder is registered for
    NoAdapterForPath {
        /// JSON path of the nested object
        path: String,
    },
    /// A token the engine cannot decode (null, floats, non-string array elements)
    UnsupportedToken {
        /// JSON path of the token
        path: String,
        /// What was found
        token: &'static str,
    },
    /// A constructor parameter has no value in the JSON object
    MissingRequiredField {
        /// The type whose constructor needs the field
        target: &'static str,
        /// The missing field
        field: &'static str,
        /// A similarly named field that was present, if any
        suggestion: Option<String>,
    },
    /// A value does not have the parameter's declared type
    TypeMismatch {
        /// The type whose constructor rejected the value
        target: &'static str,
        /// The field
        field: &'static str,
        /// Declared type
        expected: &'static str,
        /// Type of the decoded value
        found: &'static str,
    },
    /// Malformed JSON, or a cursor operation failed
    Json(JsonError),
    /// The real stream disagrees with what lookahead recorded
    CatalogMismatch {
        /// JSON path where the disagreement was found
        path: String,
        /// The field involved
        field: String,
        /// What disagreed
        reason: &'static str,
    },
    /// A configured limit was exceeded
    LimitExceeded {
        /// Which limit
        limit: &'static str,
        /// Its configured value
        max: usize,
        /// JSON path where it was exceeded
        path: String,
    },
    /// A decode session step was called out of order
    InvalidState {
        /// The step that was called
        operation: &'static str,
        /// The state the session was in
        state: SessionState,
    },
    /// The composition plan could not be built
    Schema(SchemaError),
    /// The type was never registered with the engine
    UnregisteredType {
        /// The type
        type_identifier: &'static str,
    },
}

impl From<JsonError> for DecodeError {
    fn from(err: JsonError) -> Self {
        DecodeError::Json(err)
    }
}

impl From<SchemaError> for DecodeError {
    fn from(err: SchemaError) -> Self {
        DecodeError::Schema(err)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NoAdapterForPath { path } => {
                write!(f, "no known sub-decoder for the object at {path}")
            }
            DecodeError::UnsupportedToken { path, token } => {
                write!(f, "unsupported token at {path}: {token}")
            }
            DecodeError::MissingRequiredField {
                target,
                field,
                suggestion,
            } => {
                write!(f, "missing required field '{field}' for {target}")?;
                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean '{suggestion}'?)")?;
                }
                Ok(())
            }
            DecodeError::TypeMismatch {
                target,
                field,
                expected,
                found,
            } => write!(
                f,
                "field '{field}' of {target} expects {expected}, found {found}"
            ),
            DecodeError::Json(err) => write!(f, "{err}"),
            DecodeError::CatalogMismatch {
                path,
                field,
                reason,
            } => write!(f, "field '{field}' at {path} {reason}"),
            DecodeError::LimitExceeded { limit, max, path } => {
                write!(f, "{limit} limit of {max} exceeded at {path}")
            }
            DecodeError::InvalidState { operation, state } => {
                write!(f, "cannot {operation} while the session is {state}")
            }
            DecodeError::Schema(err) => write!(f, "{err}"),
            DecodeError::UnregisteredType { type_identifier } => {
                write!(f, "{type_identifier} has no registered capabilities")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Json(err) => Some(err),
            DecodeError::Schema(err) => Some(err),
            _ => None,
        }
    }
}

/// Returned by every encode call: this engine only decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedOperation {
    /// The operation that was attempted
    pub operation: &'static str,
    /// The type it was attempted on
    pub type_identifier: &'static str,
}

impl fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is not supported (attempted on {})",
            self.operation, self.type_identifier
        )
    }
}

impl std::error::Error for UnsupportedOperation {}

/// Any error this crate produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Building a plan failed
    Schema(SchemaError),
    /// Decoding failed
    Decode(DecodeError),
    /// Encoding was attempted
    UnsupportedOperation(UnsupportedOperation),
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

impl From<UnsupportedOperation> for Error {
    fn from(err: UnsupportedOperation) -> Self {
        Error::UnsupportedOperation(err)
    }
}

impl From<JsonError> for Error {
    fn from(err: JsonError) -> Self {
        Error::Decode(DecodeError::Json(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(err) => write!(f, "{err}"),
            Error::Decode(err) => write!(f, "{err}"),
            Error::UnsupportedOperation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Schema(err) => Some(err),
            Error::Decode(err) => Some(err),
            Error::UnsupportedOperation(err) => Some(err),
        }
    }
}
