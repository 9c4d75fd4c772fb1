//! Consuming one JSON object into typed values.

use alloc::string::String;
use alloc::vec::Vec;

use graft_json::{JsonCursor, JsonErrorKind, TokenKind};

use crate::catalog::{FieldCatalog, FieldKind};
use crate::context::DecodeContext;
use crate::error::DecodeError;
use crate::schema::CompositionPlan;
use crate::trace;
use crate::value::Value;

/// Decoded values of one object, by catalog index.
#[derive(Debug, Default)]
pub struct ValueTable {
    values: Vec<Option<Value>>,
}

impl ValueTable {
    /// A table for an object with `len` fields.
    pub fn new(len: usize) -> Self {
        let mut values = Vec::with_capacity(len);
        values.resize_with(len, || None);
        Self { values }
    }

    /// Store the value of field `index`.
    pub fn insert(&mut self, index: usize, value: Value) {
        if index >= self.values.len() {
            self.values.resize_with(index + 1, || None);
        }
        self.values[index] = Some(value);
    }

    /// The value of field `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)?.as_ref()
    }

    /// Remove and return the value of field `index`.
    pub fn take(&mut self, index: usize) -> Option<Value> {
        self.values.get_mut(index)?.take()
    }

    /// Whether field `index` has a value.
    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Whether no value is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads the fields of one object, dispatching on the kind lookahead
/// recorded for each.
pub struct Extractor<'a> {
    context: &'a DecodeContext<'a>,
    plan: &'a CompositionPlan,
}

impl<'a> Extractor<'a> {
    /// Create an extractor for objects decoded with `plan`.
    pub fn new(context: &'a DecodeContext<'a>, plan: &'a CompositionPlan) -> Self {
        Self { context, plan }
    }

    /// Consume the object at `cursor`, whose fields `catalog` lists.
    pub fn decode_object(
        &self,
        cursor: &mut dyn JsonCursor,
        catalog: &FieldCatalog,
    ) -> Result<ValueTable, DecodeError> {
        let options = catalog.name_options();
        let mut table = ValueTable::new(catalog.len());
        let mut next_entry = 0;

        cursor.begin_object()?;
        while cursor.has_next()? {
            let Some(selected) = cursor.select_name(&options)? else {
                let name = cursor.next_name()?;
                return Err(DecodeError::CatalogMismatch {
                    path: cursor.path(),
                    field: name,
                    reason: "was not seen by lookahead",
                });
            };

            // Repeated names select their first occurrence; the one being
            // read is the next occurrence not yet consumed.
            let name = options.get(selected).unwrap_or_default();
            let Some(index) = catalog.index_of_from(name, next_entry) else {
                return Err(DecodeError::CatalogMismatch {
                    path: cursor.path(),
                    field: String::from(name),
                    reason: "appears more often than lookahead recorded",
                });
            };
            next_entry = index + 1;

            let recorded = catalog.get(index).map(|e| e.kind);
            let actual = FieldKind::from_token(cursor.peek()?);
            if recorded != Some(actual) {
                return Err(DecodeError::CatalogMismatch {
                    path: cursor.path(),
                    field: String::from(name),
                    reason: "changed kind since lookahead",
                });
            }

            if self.context.config().skip_unknown_fields && !self.plan.consumes(name) {
                trace!("skipping unconsumed field {}", cursor.path());
                cursor.skip_value()?;
                continue;
            }

            trace!("field {} ({actual})", cursor.path());
            let value = self.read_value(cursor, name, actual)?;
            table.insert(index, value);
        }
        cursor.end_object()?;

        Ok(table)
    }

    fn read_value(
        &self,
        cursor: &mut dyn JsonCursor,
        name: &str,
        kind: FieldKind,
    ) -> Result<Value, DecodeError> {
        match kind {
            FieldKind::String => Ok(Value::String(cursor.next_str()?)),
            FieldKind::Number => match cursor.next_int() {
                Ok(n) => Ok(Value::Int(n)),
                Err(err) if err.kind == JsonErrorKind::FloatNotSupported => {
                    Err(DecodeError::UnsupportedToken {
                        path: cursor.path(),
                        token: "floating point number",
                    })
                }
                Err(err) => Err(err.into()),
            },
            FieldKind::Boolean => Ok(Value::Bool(cursor.next_bool()?)),
            FieldKind::BeginArray => read_string_list(cursor).map(Value::StringList),
            FieldKind::BeginObject => {
                let Some(decoder) = self.context.sub_decoder(name) else {
                    return Err(DecodeError::NoAdapterForPath {
                        path: cursor.path(),
                    });
                };
                let child = self.context.child(name, &*cursor)?;
                decoder.decode(cursor, &child).map(Value::Object)
            }
            FieldKind::Null => Err(DecodeError::UnsupportedToken {
                path: cursor.path(),
                token: "null",
            }),
        }
    }
}

fn read_string_list(cursor: &mut dyn JsonCursor) -> Result<Vec<String>, DecodeError> {
    let mut list = Vec::new();
    cursor.begin_array()?;
    while cursor.has_next()? {
        let kind = cursor.peek()?;
        if kind != TokenKind::String {
            return Err(DecodeError::UnsupportedToken {
                path: cursor.path(),
                token: kind.describe(),
            });
        }
        list.push(cursor.next_str()?);
    }
    cursor.end_array()?;
    Ok(list)
}
