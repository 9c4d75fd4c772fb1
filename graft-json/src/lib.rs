//! A pull-style JSON cursor.
//!
//! [`JsonCursor`] is the reading capability the graft decoding engine is
//! written against: it hands out one token at a time, reports the current
//! JSON path, and can be duplicated for lookahead without moving the
//! original. [`SliceCursor`] implements it over an in-memory document.

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

#[allow(unused_imports)]
pub(crate) use trace;

mod cursor;
mod error;
pub mod scanner;

pub use cursor::{DEFAULT_MAX_DEPTH, JsonCursor, NameOptions, SliceCursor, TokenKind};
pub use error::{JsonError, JsonErrorKind, Span};
pub use scanner::ScanErrorKind;
