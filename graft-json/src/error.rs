//! Error types for JSON cursors.

use alloc::string::String;
use core::fmt::{self, Display};

use crate::scanner::{ScanError, ScanErrorKind};

/// A byte range in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte
    pub offset: usize,
    /// Length in bytes
    pub len: usize,
}

impl Span {
    /// Create a new span
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.offset, self.offset + self.len)
    }
}

/// Error produced by a [`JsonCursor`](crate::JsonCursor).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonError {
    /// The specific kind of error
    pub kind: JsonErrorKind,
    /// Source span where the error occurred
    pub span: Option<Span>,
    /// JSON path of the cursor when the error occurred (`$.book.title`)
    pub path: String,
}

impl JsonError {
    /// Create a new error with span information
    pub const fn new(kind: JsonErrorKind, span: Span, path: String) -> Self {
        JsonError {
            kind,
            span: Some(span),
            path,
        }
    }

    /// Create an error without span information
    pub const fn without_span(kind: JsonErrorKind, path: String) -> Self {
        JsonError {
            kind,
            span: None,
            path,
        }
    }

    pub(crate) fn from_scan(err: ScanError, path: String) -> Self {
        JsonError::new(JsonErrorKind::Scan(err.kind), err.span, path)
    }
}

impl Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.path)?;
        if let Some(span) = self.span {
            write!(f, " (bytes {span})")?;
        }
        Ok(())
    }
}

impl std::error::Error for JsonError {}

/// Specific error kinds for JSON cursors
#[derive(Debug, Clone, PartialEq)]
pub enum JsonErrorKind {
    /// Scanner error (malformed input)
    Scan(ScanErrorKind),
    /// The next token is not the one the operation requires
    UnexpectedToken {
        /// What the operation expected
        expected: &'static str,
        /// What the cursor actually found
        got: &'static str,
    },
    /// Integer does not fit in 64 bits
    NumberOutOfRange,
    /// A number with a fraction or exponent was read as an integer
    FloatNotSupported,
    /// Content remains after the root value
    TrailingData,
    /// Nesting went deeper than the cursor allows
    DepthLimitExceeded {
        /// The configured limit
        limit: usize,
    },
}

impl Display for JsonErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonErrorKind::Scan(kind) => match kind {
                ScanErrorKind::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
                ScanErrorKind::UnexpectedEof(ctx) => write!(f, "unexpected end of input {ctx}"),
                ScanErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8"),
                ScanErrorKind::InvalidEscape => write!(f, "invalid escape sequence"),
            },
            JsonErrorKind::UnexpectedToken { expected, got } => {
                write!(f, "expected {expected}, got {got}")
            }
            JsonErrorKind::NumberOutOfRange => write!(f, "integer out of range"),
            JsonErrorKind::FloatNotSupported => {
                write!(f, "floating point numbers are not supported")
            }
            JsonErrorKind::TrailingData => write!(f, "trailing data after the root value"),
            JsonErrorKind::DepthLimitExceeded { limit } => {
                write!(f, "nesting deeper than {limit} levels")
            }
        }
    }
}
