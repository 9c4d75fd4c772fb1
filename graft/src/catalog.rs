//! Lookahead over the next JSON object's top-level fields.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use graft_json::{JsonCursor, NameOptions, TokenKind};

use crate::config::Limits;
use crate::error::DecodeError;
use crate::trace;

/// The kind of a field's value, as seen by lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A string
    String,
    /// A number
    Number,
    /// `true` or `false`
    Boolean,
    /// An array
    BeginArray,
    /// An object
    BeginObject,
    /// `null`, or anything else the engine does not decode
    Null,
}

impl FieldKind {
    /// Classify the token at the start of a value.
    pub fn from_token(kind: TokenKind) -> Self {
        match kind {
            TokenKind::String => FieldKind::String,
            TokenKind::Number => FieldKind::Number,
            TokenKind::Boolean => FieldKind::Boolean,
            TokenKind::BeginArray => FieldKind::BeginArray,
            TokenKind::BeginObject => FieldKind::BeginObject,
            _ => FieldKind::Null,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::BeginArray => "array",
            FieldKind::BeginObject => "object",
            FieldKind::Null => "null",
        })
    }
}

/// One top-level field of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    /// Position in document order
    pub index: usize,
    /// Field name
    pub name: String,
    /// Kind of the value
    pub kind: FieldKind,
}

/// The top-level fields of one JSON object, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    entries: Vec<FieldEntry>,
}

impl FieldCatalog {
    /// Scan the object `cursor` is positioned at, without moving `cursor`.
    ///
    /// Values are skipped, not decoded, so any kind of value can be
    /// recorded. Fails only on malformed JSON or when the object has more
    /// than `limits.max_fields` fields.
    pub fn peek(cursor: &dyn JsonCursor, limits: &Limits) -> Result<Self, DecodeError> {
        let mut lookahead = cursor.duplicate_for_lookahead();
        let mut entries = Vec::new();

        lookahead.begin_object()?;
        while lookahead.has_next()? {
            if entries.len() == limits.max_fields {
                return Err(DecodeError::LimitExceeded {
                    limit: "field count",
                    max: limits.max_fields,
                    path: lookahead.path(),
                });
            }
            let name = lookahead.next_name()?;
            let kind = FieldKind::from_token(lookahead.peek()?);
            lookahead.skip_value()?;
            entries.push(FieldEntry {
                index: entries.len(),
                name,
                kind,
            });
        }

        trace!("catalog at {}: {} field(s)", cursor.path(), entries.len());
        Ok(Self { entries })
    }

    /// All entries in document order.
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// The entry at `index`.
    pub fn get(&self, index: usize) -> Option<&FieldEntry> {
        self.entries.get(index)
    }

    /// Index of the first field called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Index of the first field called `name` at or after `from`.
    pub fn index_of_from(&self, name: &str, from: usize) -> Option<usize> {
        self.entries
            .get(from..)?
            .iter()
            .position(|e| e.name == name)
            .map(|offset| from + offset)
    }

    /// Field names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The field names as options for [`JsonCursor::select_name`].
    pub fn name_options(&self) -> NameOptions {
        NameOptions::of(self.names())
    }
}
