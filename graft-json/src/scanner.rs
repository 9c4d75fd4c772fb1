//! Low-level JSON scanner that finds token boundaries without materializing strings.
//!
//! The scanner only identifies where tokens are in a buffer. String content is
//! returned as indices plus a `has_escapes` flag, and numbers as indices plus a
//! [`NumberHint`]; the cursor decides when (and whether) to decode them. This
//! is what makes lookahead cheap: a duplicate cursor can walk an entire object
//! without allocating a single string value.

use alloc::borrow::Cow;
use alloc::string::String;
use core::str;

use crate::error::Span;

/// Token kinds with minimal data - strings/numbers are just indices into the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{`
    ObjectStart,
    /// `}`
    ObjectEnd,
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `null`
    Null,
    /// `true`
    True,
    /// `false`
    False,
    /// A string literal - indices point to content (excluding quotes)
    String {
        /// Start index of string content (after opening quote)
        start: usize,
        /// End index of string content (before closing quote)
        end: usize,
        /// True if the string contains escape sequences that need processing
        has_escapes: bool,
    },
    /// A number literal - indices point to the raw number text
    Number {
        /// Start index of number
        start: usize,
        /// End index of number
        end: usize,
        /// Hint about number format
        hint: NumberHint,
    },
    /// End of input reached
    Eof,
}

/// Hint about number format to guide parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberHint {
    /// Unsigned integer (no sign, no decimal, no exponent)
    Unsigned,
    /// Signed integer (has `-` prefix, no decimal, no exponent)
    Signed,
    /// Floating point (has `.` or `e`/`E`)
    Float,
}

/// Spanned token with location information
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token
    pub token: Token,
    /// Source span
    pub span: Span,
}

/// Scanner error
#[derive(Debug, Clone, PartialEq)]
pub struct ScanError {
    /// The error kind
    pub kind: ScanErrorKind,
    /// Source span
    pub span: Span,
}

/// Types of scanner errors
#[derive(Debug, Clone, PartialEq)]
pub enum ScanErrorKind {
    /// Unexpected character
    UnexpectedChar(char),
    /// Unexpected end of input (with context)
    UnexpectedEof(&'static str),
    /// Invalid UTF-8
    InvalidUtf8,
    /// Malformed escape sequence inside a string
    InvalidEscape,
}

/// Result type for scanner operations
pub type ScanResult = Result<SpannedToken, ScanError>;

/// JSON scanner over a complete in-memory buffer.
///
/// The scanner holds nothing but a position, so copying it is how a cursor
/// forks itself for lookahead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scanner {
    pos: usize,
}

impl Scanner {
    /// Create a new scanner starting at position 0
    pub const fn new() -> Self {
        Self { pos: 0 }
    }

    /// Current position in the buffer
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Scan the next token from the buffer.
    pub fn next_token(&mut self, buf: &[u8]) -> ScanResult {
        self.skip_whitespace(buf);

        let start = self.pos;
        let Some(&byte) = buf.get(self.pos) else {
            return Ok(SpannedToken {
                token: Token::Eof,
                span: Span::new(self.pos, 0),
            });
        };

        let single = |token| SpannedToken {
            token,
            span: Span::new(start, 1),
        };

        match byte {
            b'{' => {
                self.pos += 1;
                Ok(single(Token::ObjectStart))
            }
            b'}' => {
                self.pos += 1;
                Ok(single(Token::ObjectEnd))
            }
            b'[' => {
                self.pos += 1;
                Ok(single(Token::ArrayStart))
            }
            b']' => {
                self.pos += 1;
                Ok(single(Token::ArrayEnd))
            }
            b':' => {
                self.pos += 1;
                Ok(single(Token::Colon))
            }
            b',' => {
                self.pos += 1;
                Ok(single(Token::Comma))
            }
            b'"' => self.scan_string(buf, start),
            b'-' | b'0'..=b'9' => self.scan_number(buf, start),
            b't' => self.scan_literal(buf, start, b"true", Token::True),
            b'f' => self.scan_literal(buf, start, b"false", Token::False),
            b'n' => self.scan_literal(buf, start, b"null", Token::Null),
            _ => Err(unexpected_char(buf, start)),
        }
    }

    fn skip_whitespace(&mut self, buf: &[u8]) {
        let mut pos = self.pos;
        while let Some(&b) = buf.get(pos) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
                _ => break,
            }
        }
        self.pos = pos;
    }

    /// Scan a string, finding its boundaries and noting if it has escapes.
    fn scan_string(&mut self, buf: &[u8], start: usize) -> ScanResult {
        // Skip opening quote
        self.pos += 1;
        let content_start = self.pos;
        let mut has_escapes = false;

        const STEP_SIZE: usize = 16;
        type Window = u128;
        type Chunk = [u8; STEP_SIZE];

        // Skip whole 16-byte windows that contain neither a quote nor a backslash
        while let Some(Ok(chunk)) = buf
            .get(self.pos..)
            .and_then(|s| s.get(..STEP_SIZE))
            .map(Chunk::try_from)
        {
            let window = Window::from_ne_bytes(chunk);
            if contains_byte(window, b'"') || contains_byte(window, b'\\') {
                break;
            }
            self.pos += STEP_SIZE;
        }

        while let Some(&byte) = buf.get(self.pos) {
            match byte {
                b'"' => {
                    let content_end = self.pos;
                    self.pos += 1;
                    return Ok(SpannedToken {
                        token: Token::String {
                            start: content_start,
                            end: content_end,
                            has_escapes,
                        },
                        span: Span::new(start, self.pos - start),
                    });
                }
                b'\\' => {
                    has_escapes = true;
                    // The escaped byte can never terminate the string
                    self.pos += 2;
                }
                _ => self.pos += 1,
            }
        }

        Err(ScanError {
            kind: ScanErrorKind::UnexpectedEof("in string"),
            span: Span::new(start, buf.len().saturating_sub(start)),
        })
    }

    /// Scan a number, finding its boundaries and determining its type hint.
    fn scan_number(&mut self, buf: &[u8], start: usize) -> ScanResult {
        let mut hint = NumberHint::Unsigned;
        let mut pos = self.pos;

        if buf.get(pos) == Some(&b'-') {
            hint = NumberHint::Signed;
            pos += 1;
        }

        let digits_start = pos;
        pos = expect_digits(buf, start, pos)?;
        // No leading zeros: `0` must stand alone
        if buf[digits_start] == b'0' && pos - digits_start > 1 {
            return Err(unexpected_char(buf, digits_start + 1));
        }

        if buf.get(pos) == Some(&b'.') {
            hint = NumberHint::Float;
            pos = expect_digits(buf, start, pos + 1)?;
        }

        if matches!(buf.get(pos), Some(b'e') | Some(b'E')) {
            hint = NumberHint::Float;
            pos += 1;
            if matches!(buf.get(pos), Some(b'+') | Some(b'-')) {
                pos += 1;
            }
            pos = expect_digits(buf, start, pos)?;
        }

        self.pos = pos;
        Ok(SpannedToken {
            token: Token::Number {
                start,
                end: pos,
                hint,
            },
            span: Span::new(start, pos - start),
        })
    }

    /// Scan a literal keyword (true, false, null)
    fn scan_literal(
        &mut self,
        buf: &[u8],
        start: usize,
        expected: &'static [u8],
        token: Token,
    ) -> ScanResult {
        for &want in expected {
            match buf.get(self.pos) {
                Some(&b) if b == want => self.pos += 1,
                Some(_) => return Err(unexpected_char(buf, self.pos)),
                None => {
                    return Err(ScanError {
                        kind: ScanErrorKind::UnexpectedEof("in literal"),
                        span: Span::new(start, self.pos - start),
                    });
                }
            }
        }

        Ok(SpannedToken {
            token,
            span: Span::new(start, expected.len()),
        })
    }
}

/// Skip a run of at least one ASCII digit starting at `pos`, returning the
/// position after it.
fn expect_digits(buf: &[u8], start: usize, pos: usize) -> Result<usize, ScanError> {
    let end = pos + buf[pos.min(buf.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end > pos {
        return Ok(end);
    }
    if pos >= buf.len() {
        return Err(ScanError {
            kind: ScanErrorKind::UnexpectedEof("in number"),
            span: Span::new(start, pos - start),
        });
    }
    Err(unexpected_char(buf, pos))
}

/// Error for the character starting at `pos`, decoded as UTF-8 so a
/// multi-byte character is reported whole.
fn unexpected_char(buf: &[u8], pos: usize) -> ScanError {
    let rest = buf.get(pos..).unwrap_or_default();
    let head = &rest[..rest.len().min(4)];
    let valid = match str::from_utf8(head) {
        Ok(valid) => valid,
        Err(e) => str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default(),
    };
    match valid.chars().next() {
        Some(c) => ScanError {
            kind: ScanErrorKind::UnexpectedChar(c),
            span: Span::new(pos, c.len_utf8()),
        },
        None => ScanError {
            kind: ScanErrorKind::InvalidUtf8,
            span: Span::new(pos, 1),
        },
    }
}

/// Check if a 128-bit window contains a specific byte (SIMD-friendly)
#[inline]
const fn contains_byte(window: u128, byte: u8) -> bool {
    let pattern = u128::from_ne_bytes([byte; 16]);
    let xor = window ^ pattern;
    let has_zero = (xor.wrapping_sub(0x01010101010101010101010101010101))
        & !xor
        & 0x80808080808080808080808080808080;
    has_zero != 0
}

// =============================================================================
// Second pass: string and number decoding
// =============================================================================

/// Decode a JSON string, borrowing from the buffer when it has no escapes.
pub fn decode_string(
    buf: &[u8],
    start: usize,
    end: usize,
    has_escapes: bool,
) -> Result<Cow<'_, str>, ScanError> {
    let slice = &buf[start..end];
    if !has_escapes {
        return str::from_utf8(slice)
            .map(Cow::Borrowed)
            .map_err(|e| ScanError {
                kind: ScanErrorKind::InvalidUtf8,
                span: Span::new(start + e.valid_up_to(), 1),
            });
    }
    decode_escaped(buf, start, end).map(Cow::Owned)
}

fn decode_escaped(buf: &[u8], start: usize, end: usize) -> Result<String, ScanError> {
    let raw = str::from_utf8(&buf[start..end]).map_err(|e| ScanError {
        kind: ScanErrorKind::InvalidUtf8,
        span: Span::new(start + e.valid_up_to(), 1),
    })?;

    let bad_escape = |at: usize, len: usize| ScanError {
        kind: ScanErrorKind::InvalidEscape,
        span: Span::new(start + at, len),
    };

    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            return Err(bad_escape(i, 1));
        };
        match escaped {
            '"' => result.push('"'),
            '\\' => result.push('\\'),
            '/' => result.push('/'),
            'b' => result.push('\x08'),
            'f' => result.push('\x0c'),
            'n' => result.push('\n'),
            'r' => result.push('\r'),
            't' => result.push('\t'),
            'u' => {
                let high = read_hex4(raw, i + 2).ok_or_else(|| bad_escape(i, 6))?;
                skip(&mut chars, 4);
                let code_point = if (0xD800..=0xDBFF).contains(&high) {
                    // High surrogate - a \uXXXX low surrogate must follow
                    if raw.get(i + 6..i + 8) != Some("\\u") {
                        return Err(bad_escape(i, 6));
                    }
                    let low = read_hex4(raw, i + 8).ok_or_else(|| bad_escape(i, 12))?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(bad_escape(i, 12));
                    }
                    skip(&mut chars, 6);
                    0x10000 + ((u32::from(high) & 0x3FF) << 10) + (u32::from(low) & 0x3FF)
                } else {
                    u32::from(high)
                };
                let ch = char::from_u32(code_point).ok_or_else(|| bad_escape(i, 6))?;
                result.push(ch);
            }
            _ => return Err(bad_escape(i, 2)),
        }
    }

    Ok(result)
}

fn read_hex4(raw: &str, at: usize) -> Option<u16> {
    let hex = raw.get(at..at + 4)?;
    // from_str_radix alone would let a sign through
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

fn skip(chars: &mut str::CharIndices<'_>, n: usize) {
    for _ in 0..n {
        chars.next();
    }
}

/// Result of parsing an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedInteger {
    /// The literal fits in an `i64`.
    Int(i64),
    /// The literal is an integer but does not fit in an `i64`.
    OutOfRange,
    /// The literal has a fraction or exponent.
    Float,
}

/// Parse an integer literal from the buffer slice.
pub fn parse_integer(buf: &[u8], start: usize, end: usize, hint: NumberHint) -> ParsedInteger {
    if hint == NumberHint::Float {
        return ParsedInteger::Float;
    }
    // The scanner only admits ASCII digits and a leading '-'
    let Ok(text) = str::from_utf8(&buf[start..end]) else {
        return ParsedInteger::OutOfRange;
    };
    match text.parse::<i64>() {
        Ok(n) => ParsedInteger::Int(n),
        Err(_) => ParsedInteger::OutOfRange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &[u8]) -> Vec<Token> {
        let mut scanner = Scanner::new();
        let mut out = Vec::new();
        loop {
            let t = scanner.next_token(input).unwrap();
            if t.token == Token::Eof {
                break;
            }
            out.push(t.token);
        }
        out
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            tokens(b"{}[],:"),
            vec![
                Token::ObjectStart,
                Token::ObjectEnd,
                Token::ArrayStart,
                Token::ArrayEnd,
                Token::Comma,
                Token::Colon,
            ]
        );
    }

    #[test]
    fn test_literals_and_numbers() {
        let toks = tokens(b" true false null -12 7 1.5 2e3 ");
        assert_eq!(toks[0], Token::True);
        assert_eq!(toks[1], Token::False);
        assert_eq!(toks[2], Token::Null);
        assert!(matches!(
            toks[3],
            Token::Number {
                hint: NumberHint::Signed,
                ..
            }
        ));
        assert!(matches!(
            toks[4],
            Token::Number {
                hint: NumberHint::Unsigned,
                ..
            }
        ));
        assert!(matches!(
            toks[5],
            Token::Number {
                hint: NumberHint::Float,
                ..
            }
        ));
        assert!(matches!(
            toks[6],
            Token::Number {
                hint: NumberHint::Float,
                ..
            }
        ));
    }

    #[test]
    fn test_long_string_crosses_fast_path() {
        let input = br#""abcdefghijklmnopqrstuvwxyz0123456789 with an \"escape\" at the end""#;
        let mut scanner = Scanner::new();
        let t = scanner.next_token(input).unwrap();
        let Token::String {
            start,
            end,
            has_escapes,
        } = t.token
        else {
            panic!("expected string, got {:?}", t.token);
        };
        assert!(has_escapes);
        assert_eq!(
            decode_string(input, start, end, has_escapes).unwrap(),
            "abcdefghijklmnopqrstuvwxyz0123456789 with an \"escape\" at the end"
        );
    }

    #[test]
    fn test_unicode_escapes() {
        let input = br#""caf\u00e9 \ud83d\ude00""#;
        let mut scanner = Scanner::new();
        let Token::String {
            start,
            end,
            has_escapes,
        } = scanner.next_token(input).unwrap().token
        else {
            panic!("expected string");
        };
        assert_eq!(
            decode_string(input, start, end, has_escapes).unwrap(),
            "café 😀"
        );
    }

    #[test]
    fn test_lone_high_surrogate_is_rejected() {
        let input = br#""\ud83d oops""#;
        let mut scanner = Scanner::new();
        let Token::String { start, end, .. } = scanner.next_token(input).unwrap().token else {
            panic!("expected string");
        };
        let err = decode_string(input, start, end, true).unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::InvalidEscape);
    }

    #[test]
    fn test_unterminated_string() {
        let mut scanner = Scanner::new();
        let err = scanner.next_token(br#""never closed"#).unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedEof("in string"));
    }

    #[test]
    fn test_bad_literal() {
        let mut scanner = Scanner::new();
        let err = scanner.next_token(b"nul!").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedChar('!'));
    }

    #[test]
    fn test_leading_zeros_are_rejected() {
        let mut scanner = Scanner::new();
        let err = scanner.next_token(b"020").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedChar('2'));
        assert_eq!(err.span, Span::new(1, 1));

        let err = Scanner::new().next_token(b"-00").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedChar('0'));

        // a lone zero, and zero before a fraction, are fine
        for input in [&b"0"[..], b"-0", b"0.5", b"10"] {
            let t = Scanner::new().next_token(input).unwrap();
            assert!(matches!(t.token, Token::Number { end, .. } if end == input.len()));
        }
    }

    #[test]
    fn test_fraction_and_exponent_need_digits() {
        let err = Scanner::new().next_token(b"1.]").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedChar(']'));

        let err = Scanner::new().next_token(b"1e").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedEof("in number"));

        let err = Scanner::new().next_token(b"-").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedEof("in number"));
    }

    #[test]
    fn test_unicode_escape_needs_four_hex_digits() {
        for input in [&br#""\u+041""#[..], br#""\u-041""#, br#""\u00g1""#, br#""\u12""#] {
            let mut scanner = Scanner::new();
            let Token::String { start, end, .. } = scanner.next_token(input).unwrap().token else {
                panic!("expected string");
            };
            let err = decode_string(input, start, end, true).unwrap_err();
            assert_eq!(err.kind, ScanErrorKind::InvalidEscape, "{input:?}");
        }
    }

    #[test]
    fn test_unexpected_non_ascii_char() {
        let input = "é".as_bytes();
        let err = Scanner::new().next_token(input).unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedChar('é'));
        assert_eq!(err.span, Span::new(0, 2));

        let err = Scanner::new().next_token(b"tru\xc3\xa9").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedChar('é'));
        assert_eq!(err.span, Span::new(3, 2));

        // a lead byte with nothing after it is not a character
        let err = Scanner::new().next_token(&[0xC3]).unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::InvalidUtf8);
    }

    #[test]
    fn test_parse_integer() {
        let buf = b"-42 99999999999999999999 3.5";
        assert_eq!(
            parse_integer(buf, 0, 3, NumberHint::Signed),
            ParsedInteger::Int(-42)
        );
        assert_eq!(
            parse_integer(buf, 4, 24, NumberHint::Unsigned),
            ParsedInteger::OutOfRange
        );
        assert_eq!(
            parse_integer(buf, 25, 28, NumberHint::Float),
            ParsedInteger::Float
        );
    }
}
