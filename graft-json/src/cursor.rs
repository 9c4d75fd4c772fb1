//! The pull-style cursor capability and its slice-backed implementation.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display, Write as _};

use crate::error::{JsonError, JsonErrorKind, Span};
use crate::scanner::{self, ParsedInteger, Scanner, SpannedToken, Token};
use crate::trace;

/// Nesting limit used by [`SliceCursor::new`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What the cursor will produce next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// A field name inside an object
    Name,
    /// A string value
    String,
    /// A number value
    Number,
    /// `true` or `false`
    Boolean,
    /// `null`
    Null,
    /// Nothing left after the root value
    EndDocument,
}

impl TokenKind {
    /// Short human-readable description, used in error messages.
    pub const fn describe(self) -> &'static str {
        match self {
            TokenKind::BeginObject => "'{'",
            TokenKind::EndObject => "'}'",
            TokenKind::BeginArray => "'['",
            TokenKind::EndArray => "']'",
            TokenKind::Name => "a field name",
            TokenKind::String => "a string",
            TokenKind::Number => "a number",
            TokenKind::Boolean => "a boolean",
            TokenKind::Null => "null",
            TokenKind::EndDocument => "end of input",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A precomputed set of field names for [`JsonCursor::select_name`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameOptions {
    names: Vec<String>,
}

impl NameOptions {
    /// Build options from names; the index of each name is its position.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Index of the first option equal to `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// The option at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no options.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A pull-style JSON reader.
///
/// This is the only view of the input the decoding engine has. A read that
/// meets a token of the wrong kind fails without consuming it.
pub trait JsonCursor {
    /// Consume `{`.
    fn begin_object(&mut self) -> Result<(), JsonError>;

    /// Consume `}`.
    fn end_object(&mut self) -> Result<(), JsonError>;

    /// Consume `[`.
    fn begin_array(&mut self) -> Result<(), JsonError>;

    /// Consume `]`.
    fn end_array(&mut self) -> Result<(), JsonError>;

    /// Whether the current object or array has another element.
    fn has_next(&mut self) -> Result<bool, JsonError>;

    /// Kind of the next token, without consuming it.
    fn peek(&mut self) -> Result<TokenKind, JsonError>;

    /// Consume a field name (and its `:`).
    fn next_name(&mut self) -> Result<String, JsonError>;

    /// If the next field name is one of `options`, consume it and return its
    /// index. Otherwise return `None` and leave the name unconsumed.
    fn select_name(&mut self, options: &NameOptions) -> Result<Option<usize>, JsonError>;

    /// Consume a string value.
    fn next_str(&mut self) -> Result<String, JsonError>;

    /// Consume an integer value. Fractions and exponents are rejected.
    fn next_int(&mut self) -> Result<i64, JsonError>;

    /// Consume a boolean value.
    fn next_bool(&mut self) -> Result<bool, JsonError>;

    /// Consume the next value, whatever it is, including nested containers.
    fn skip_value(&mut self) -> Result<(), JsonError>;

    /// Consume a field name and its value.
    fn skip_name_and_value(&mut self) -> Result<(), JsonError> {
        self.next_name()?;
        self.skip_value()
    }

    /// Current location as a JSON path, e.g. `$.subjects[1]`.
    fn path(&self) -> String;

    /// Number of open containers.
    fn depth(&self) -> usize;

    /// An independent cursor at the same position.
    ///
    /// Reading from the duplicate never moves `self`.
    fn duplicate_for_lookahead(&self) -> Box<dyn JsonCursor + '_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    KeyOrEnd,
    Value,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    ValueOrEnd,
    CommaOrEnd,
}

#[derive(Debug, Clone)]
enum Frame {
    Object {
        state: ObjectState,
        name: Option<String>,
    },
    Array {
        state: ArrayState,
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootState {
    Value,
    Finished,
}

#[derive(Debug, Clone)]
struct Peeked {
    kind: TokenKind,
    token: SpannedToken,
}

/// A [`JsonCursor`] over a complete in-memory document.
///
/// Cloning is cheap (a position and the open-container stack), which is
/// exactly what [`JsonCursor::duplicate_for_lookahead`] does.
#[derive(Debug, Clone)]
pub struct SliceCursor<'de> {
    input: &'de [u8],
    scanner: Scanner,
    stack: Vec<Frame>,
    root: RootState,
    peeked: Option<Peeked>,
    max_depth: usize,
}

impl<'de> SliceCursor<'de> {
    /// Create a cursor at the start of `input`.
    pub fn new(input: &'de [u8]) -> Self {
        Self {
            input,
            scanner: Scanner::new(),
            stack: Vec::new(),
            root: RootState::Value,
            peeked: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how many containers may be open at once.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Byte offset of the next unread token (a peeked token counts as read).
    pub fn offset(&self) -> usize {
        self.scanner.pos()
    }

    /// Check that nothing but whitespace follows the root value.
    pub fn finish(&mut self) -> Result<(), JsonError> {
        let next = self.peeked()?;
        if next.kind != TokenKind::EndDocument {
            return Err(self.error(JsonErrorKind::TrailingData, next.token.span));
        }
        Ok(())
    }

    fn error(&self, kind: JsonErrorKind, span: Span) -> JsonError {
        JsonError::new(kind, span, self.path())
    }

    fn unexpected(&self, expected: &'static str, got: &'static str, span: Span) -> JsonError {
        self.error(JsonErrorKind::UnexpectedToken { expected, got }, span)
    }

    fn raw(&mut self) -> Result<SpannedToken, JsonError> {
        self.scanner
            .next_token(self.input)
            .map_err(|e| JsonError::from_scan(e, self.path()))
    }

    fn peeked(&mut self) -> Result<Peeked, JsonError> {
        if let Some(p) = &self.peeked {
            return Ok(p.clone());
        }
        let p = self.scan_next()?;
        self.peeked = Some(p.clone());
        Ok(p)
    }

    /// Read the next meaningful token, consuming separators on the way.
    fn scan_next(&mut self) -> Result<Peeked, JsonError> {
        let state = match self.stack.last() {
            Some(Frame::Object { state, .. }) => Ok(*state),
            Some(Frame::Array { state, .. }) => Err(*state),
            None => {
                let token = self.raw()?;
                return match self.root {
                    RootState::Value => self.value(token),
                    RootState::Finished if token.token == Token::Eof => Ok(Peeked {
                        kind: TokenKind::EndDocument,
                        token,
                    }),
                    RootState::Finished => {
                        Err(self.error(JsonErrorKind::TrailingData, token.span))
                    }
                };
            }
        };

        match state {
            Ok(ObjectState::KeyOrEnd) => {
                let token = self.raw()?;
                match token.token {
                    Token::ObjectEnd => Ok(Peeked {
                        kind: TokenKind::EndObject,
                        token,
                    }),
                    _ => self.name(token),
                }
            }
            Ok(ObjectState::CommaOrEnd) => {
                let token = self.raw()?;
                match token.token {
                    Token::ObjectEnd => Ok(Peeked {
                        kind: TokenKind::EndObject,
                        token,
                    }),
                    Token::Comma => {
                        let token = self.raw()?;
                        self.name(token)
                    }
                    _ => Err(self.unexpected("',' or '}'", describe_raw(&token.token), token.span)),
                }
            }
            Ok(ObjectState::Value) => {
                let token = self.raw()?;
                self.value(token)
            }
            Err(ArrayState::ValueOrEnd) => {
                let token = self.raw()?;
                match token.token {
                    Token::ArrayEnd => Ok(Peeked {
                        kind: TokenKind::EndArray,
                        token,
                    }),
                    _ => self.value(token),
                }
            }
            Err(ArrayState::CommaOrEnd) => {
                let token = self.raw()?;
                match token.token {
                    Token::ArrayEnd => Ok(Peeked {
                        kind: TokenKind::EndArray,
                        token,
                    }),
                    Token::Comma => {
                        let token = self.raw()?;
                        self.value(token)
                    }
                    _ => Err(self.unexpected("',' or ']'", describe_raw(&token.token), token.span)),
                }
            }
        }
    }

    fn name(&self, token: SpannedToken) -> Result<Peeked, JsonError> {
        match token.token {
            Token::String { .. } => Ok(Peeked {
                kind: TokenKind::Name,
                token,
            }),
            _ => Err(self.unexpected("a field name", describe_raw(&token.token), token.span)),
        }
    }

    fn value(&self, token: SpannedToken) -> Result<Peeked, JsonError> {
        let kind = match token.token {
            Token::ObjectStart => TokenKind::BeginObject,
            Token::ArrayStart => TokenKind::BeginArray,
            Token::String { .. } => TokenKind::String,
            Token::Number { .. } => TokenKind::Number,
            Token::True | Token::False => TokenKind::Boolean,
            Token::Null => TokenKind::Null,
            _ => return Err(self.unexpected("a value", describe_raw(&token.token), token.span)),
        };
        Ok(Peeked { kind, token })
    }

    /// Consume the peeked token if it is of kind `want`.
    fn expect(&mut self, want: TokenKind) -> Result<SpannedToken, JsonError> {
        let p = self.peeked()?;
        if p.kind != want {
            return Err(self.unexpected(want.describe(), p.kind.describe(), p.token.span));
        }
        self.peeked = None;
        Ok(p.token)
    }

    fn after_value(&mut self) {
        match self.stack.last_mut() {
            Some(Frame::Object { state, .. }) => *state = ObjectState::CommaOrEnd,
            Some(Frame::Array { state, index }) => {
                *state = ArrayState::CommaOrEnd;
                *index += 1;
            }
            None => self.root = RootState::Finished,
        }
    }

    fn push(&mut self, frame: Frame, span: Span) -> Result<(), JsonError> {
        if self.stack.len() >= self.max_depth {
            return Err(self.error(
                JsonErrorKind::DepthLimitExceeded {
                    limit: self.max_depth,
                },
                span,
            ));
        }
        self.stack.push(frame);
        Ok(())
    }

    fn string_at(&self, token: &SpannedToken) -> Result<String, JsonError> {
        match token.token {
            Token::String {
                start,
                end,
                has_escapes,
            } => scanner::decode_string(self.input, start, end, has_escapes)
                .map(|s| s.into_owned())
                .map_err(|e| JsonError::from_scan(e, self.path())),
            _ => Err(self.unexpected("a string", describe_raw(&token.token), token.span)),
        }
    }

    /// Consume the colon after a name and record the name in the current frame.
    fn enter_value(&mut self, name: String) -> Result<(), JsonError> {
        let colon = self.raw()?;
        if colon.token != Token::Colon {
            return Err(self.unexpected("':'", describe_raw(&colon.token), colon.span));
        }
        if let Some(Frame::Object {
            state,
            name: current,
        }) = self.stack.last_mut()
        {
            *state = ObjectState::Value;
            *current = Some(name);
        }
        Ok(())
    }

    /// Skip the body of a container whose opening token was already consumed.
    /// Commas and colons are checked as in a full parse.
    fn skip_container(&mut self, opener: Token) -> Result<(), JsonError> {
        let mut open: Vec<Skip> = Vec::new();
        open.push(Skip::opened_by(&opener));
        while let Some(&state) = open.last() {
            let token = self.raw()?;
            match (state, &token.token) {
                (Skip::ObjectOpen | Skip::Name, Token::String { .. }) => {
                    settle(&mut open, Skip::Colon);
                }
                (Skip::Colon, Token::Colon) => settle(&mut open, Skip::MemberValue),
                (Skip::ObjectNext, Token::Comma) => settle(&mut open, Skip::Name),
                (Skip::ArrayNext, Token::Comma) => settle(&mut open, Skip::Element),
                (Skip::ObjectOpen | Skip::ObjectNext, Token::ObjectEnd)
                | (Skip::ArrayOpen | Skip::ArrayNext, Token::ArrayEnd) => {
                    open.pop();
                }
                (
                    Skip::MemberValue | Skip::ArrayOpen | Skip::Element,
                    Token::ObjectStart | Token::ArrayStart,
                ) => {
                    if self.stack.len() + open.len() >= self.max_depth {
                        return Err(self.error(
                            JsonErrorKind::DepthLimitExceeded {
                                limit: self.max_depth,
                            },
                            token.span,
                        ));
                    }
                    settle(&mut open, state.after_value());
                    open.push(Skip::opened_by(&token.token));
                }
                (
                    Skip::MemberValue | Skip::ArrayOpen | Skip::Element,
                    Token::Null
                    | Token::True
                    | Token::False
                    | Token::String { .. }
                    | Token::Number { .. },
                ) => settle(&mut open, state.after_value()),
                (_, got) => {
                    return Err(self.unexpected(state.expected(), describe_raw(got), token.span));
                }
            }
        }
        Ok(())
    }
}

/// Position inside a container being skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    /// Right after `{`
    ObjectOpen,
    /// After a comma in an object
    Name,
    Colon,
    MemberValue,
    /// After a member's value
    ObjectNext,
    /// Right after `[`
    ArrayOpen,
    /// After a comma in an array
    Element,
    /// After an element
    ArrayNext,
}

impl Skip {
    fn opened_by(token: &Token) -> Self {
        if *token == Token::ObjectStart {
            Skip::ObjectOpen
        } else {
            Skip::ArrayOpen
        }
    }

    fn after_value(self) -> Self {
        match self {
            Skip::MemberValue => Skip::ObjectNext,
            Skip::ArrayOpen | Skip::Element => Skip::ArrayNext,
            other => other,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Skip::ObjectOpen => "a name or '}'",
            Skip::Name => "a name",
            Skip::Colon => "':'",
            Skip::MemberValue | Skip::Element => "a value",
            Skip::ObjectNext => "',' or '}'",
            Skip::ArrayOpen => "a value or ']'",
            Skip::ArrayNext => "',' or ']'",
        }
    }
}

fn settle(open: &mut [Skip], next: Skip) {
    if let Some(top) = open.last_mut() {
        *top = next;
    }
}

fn describe_raw(token: &Token) -> &'static str {
    match token {
        Token::ObjectStart => "'{'",
        Token::ObjectEnd => "'}'",
        Token::ArrayStart => "'['",
        Token::ArrayEnd => "']'",
        Token::Colon => "':'",
        Token::Comma => "','",
        Token::Null => "null",
        Token::True | Token::False => "a boolean",
        Token::String { .. } => "a string",
        Token::Number { .. } => "a number",
        Token::Eof => "end of input",
    }
}

impl JsonCursor for SliceCursor<'_> {
    fn begin_object(&mut self) -> Result<(), JsonError> {
        let token = self.expect(TokenKind::BeginObject)?;
        self.push(
            Frame::Object {
                state: ObjectState::KeyOrEnd,
                name: None,
            },
            token.span,
        )
    }

    fn end_object(&mut self) -> Result<(), JsonError> {
        self.expect(TokenKind::EndObject)?;
        self.stack.pop();
        self.after_value();
        Ok(())
    }

    fn begin_array(&mut self) -> Result<(), JsonError> {
        let token = self.expect(TokenKind::BeginArray)?;
        self.push(
            Frame::Array {
                state: ArrayState::ValueOrEnd,
                index: 0,
            },
            token.span,
        )
    }

    fn end_array(&mut self) -> Result<(), JsonError> {
        self.expect(TokenKind::EndArray)?;
        self.stack.pop();
        self.after_value();
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool, JsonError> {
        let kind = self.peek()?;
        Ok(!matches!(
            kind,
            TokenKind::EndObject | TokenKind::EndArray | TokenKind::EndDocument
        ))
    }

    fn peek(&mut self) -> Result<TokenKind, JsonError> {
        self.peeked().map(|p| p.kind)
    }

    fn next_name(&mut self) -> Result<String, JsonError> {
        let p = self.peeked()?;
        if p.kind != TokenKind::Name {
            return Err(self.unexpected("a field name", p.kind.describe(), p.token.span));
        }
        let name = self.string_at(&p.token)?;
        self.peeked = None;
        self.enter_value(name.clone())?;
        Ok(name)
    }

    fn select_name(&mut self, options: &NameOptions) -> Result<Option<usize>, JsonError> {
        let p = self.peeked()?;
        if p.kind != TokenKind::Name {
            return Err(self.unexpected("a field name", p.kind.describe(), p.token.span));
        }
        let name = self.string_at(&p.token)?;
        let Some(index) = options.index_of(&name) else {
            trace!("select_name: {name:?} is not among {} options", options.len());
            return Ok(None);
        };
        self.peeked = None;
        self.enter_value(name)?;
        Ok(Some(index))
    }

    fn next_str(&mut self) -> Result<String, JsonError> {
        let p = self.peeked()?;
        if p.kind != TokenKind::String {
            return Err(self.unexpected("a string", p.kind.describe(), p.token.span));
        }
        let s = self.string_at(&p.token)?;
        self.peeked = None;
        self.after_value();
        Ok(s)
    }

    fn next_int(&mut self) -> Result<i64, JsonError> {
        let p = self.peeked()?;
        let Token::Number { start, end, hint } = p.token.token else {
            return Err(self.unexpected("a number", p.kind.describe(), p.token.span));
        };
        let n = match scanner::parse_integer(self.input, start, end, hint) {
            ParsedInteger::Int(n) => n,
            ParsedInteger::OutOfRange => {
                return Err(self.error(JsonErrorKind::NumberOutOfRange, p.token.span));
            }
            ParsedInteger::Float => {
                return Err(self.error(JsonErrorKind::FloatNotSupported, p.token.span));
            }
        };
        self.peeked = None;
        self.after_value();
        Ok(n)
    }

    fn next_bool(&mut self) -> Result<bool, JsonError> {
        let token = self.expect(TokenKind::Boolean)?;
        self.after_value();
        Ok(token.token == Token::True)
    }

    fn skip_value(&mut self) -> Result<(), JsonError> {
        let p = self.peeked()?;
        match p.kind {
            TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Null => {
                self.peeked = None;
            }
            TokenKind::BeginObject | TokenKind::BeginArray => {
                self.peeked = None;
                self.skip_container(p.token.token)?;
            }
            other => {
                return Err(self.unexpected("a value", other.describe(), p.token.span));
            }
        }
        self.after_value();
        Ok(())
    }

    fn path(&self) -> String {
        let mut path = "$".to_string();
        for frame in &self.stack {
            // Writing to a String cannot fail
            let _ = match frame {
                Frame::Object {
                    name: Some(name), ..
                } => write!(path, ".{name}"),
                Frame::Object { name: None, .. } => Ok(()),
                Frame::Array { index, .. } => write!(path, "[{index}]"),
            };
        }
        path
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn duplicate_for_lookahead(&self) -> Box<dyn JsonCursor + '_> {
        Box::new(self.clone())
    }
}
