//! OMCL tokenizer.
//!
//! Turns UTF-8 source text into [`Token`]s. Spaces, tabs, carriage returns and
//! comments are discarded; line breaks are significant and every run of blank
//! lines and comments between two real tokens collapses into one
//! [`TokenKind::Newline`].
//!
//! # Numbers
//!
//! Number literals run through a small state machine (see [`NumberState`]):
//!
//! - optional sign, optional `0x` / `0o` / `0b` radix prefix
//! - `_` is legal only between two digits of the same group (`1_000`)
//! - decimal literals may carry a fraction and an exponent (`9.0e19`, `123e-5`)
//! - radix literals are always integers; a `.` after one is an error
//!
//! # Lookahead
//!
//! [`Lexer::peek_token`] saves the cursor, lexes, and restores it; nothing is
//! cached. [`Lexer::peek_key_token`] does the same in key-name mode, where a bare
//! `[A-Za-z_][A-Za-z0-9_-]*` run (keywords included) comes back as a
//! [`TokenKind::String`].

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Source location of a token. Offsets are byte offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// 1-based line of the token's first character.
    pub line: usize,
    pub start: usize,
    pub end: usize,
    /// Offset of the first character of `line`.
    pub line_start: usize,
}

impl Span {
    /// 1-based column of the token's first character.
    pub fn column(&self) -> usize {
        self.start - self.line_start + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Eof,
    Newline,
    Comma,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equals,
    String(String),
    Int(i64),
    Float(f64),
    True,
    False,
    None,
    /// `!name`, holding `name`.
    Tag(String),
    Identifier(String),
    Unknown(char),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
            TokenKind::Equals => f.write_str("'='"),
            TokenKind::String(s) => write!(f, "string {s:?}"),
            TokenKind::Int(n) => write!(f, "integer {n}"),
            TokenKind::Float(x) => write!(f, "float {x:?}"),
            TokenKind::True => f.write_str("'true'"),
            TokenKind::False => f.write_str("'false'"),
            TokenKind::None => f.write_str("'none'"),
            TokenKind::Tag(t) => write!(f, "tag '!{t}'"),
            TokenKind::Identifier(id) => write!(f, "identifier '{id}'"),
            TokenKind::Unknown(c) => write!(f, "unexpected character {c:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column()
    }
}

/// States of the number literal recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
    Start,
    IntDigit,
    /// Just read `_` inside the integer part.
    IntDigitSep,
    Period,
    FloatDigit,
    /// Just read `_` inside the fraction.
    FloatDigitSep,
    Exponent,
    ExponentSign,
    ExponentDigit,
}

enum Step {
    /// Consume the character, keep it in the literal, move to the state.
    Keep(NumberState),
    /// Consume the character, drop it from the literal (a `_` separator).
    Skip(NumberState),
    Done,
    Fail(&'static str),
}

impl NumberState {
    fn step(self, c: Option<char>, radix: u32) -> Step {
        use NumberState::*;

        let decimal = radix == 10;
        let is_digit = |c: char| c.is_digit(radix);
        let Some(c) = c else {
            return match self {
                IntDigit | FloatDigit | ExponentDigit => Step::Done,
                IntDigitSep | FloatDigitSep => Step::Fail("'_' must be followed by a digit"),
                _ => Step::Fail("number literal ends unexpectedly"),
            };
        };

        match self {
            Start => match c {
                c if is_digit(c) => Step::Keep(IntDigit),
                '_' => Step::Fail("'_' must sit between two digits"),
                _ => Step::Fail("expected a digit"),
            },
            IntDigit => match c {
                c if is_digit(c) => Step::Keep(IntDigit),
                '_' => Step::Skip(IntDigitSep),
                '.' if decimal => Step::Keep(Period),
                '.' => Step::Fail("radix literals cannot have a fractional part"),
                'e' | 'E' if decimal => Step::Keep(Exponent),
                c if ends_number(c) => Step::Done,
                _ => Step::Fail("invalid character in integer literal"),
            },
            IntDigitSep | FloatDigitSep => match c {
                c if is_digit(c) => Step::Keep(if self == IntDigitSep {
                    IntDigit
                } else {
                    FloatDigit
                }),
                _ => Step::Fail("'_' must be followed by a digit"),
            },
            Period => match c {
                c if is_digit(c) => Step::Keep(FloatDigit),
                _ => Step::Fail("expected a digit after '.'"),
            },
            FloatDigit => match c {
                c if is_digit(c) => Step::Keep(FloatDigit),
                '_' => Step::Skip(FloatDigitSep),
                'e' | 'E' => Step::Keep(Exponent),
                c if ends_number(c) => Step::Done,
                _ => Step::Fail("invalid character in float literal"),
            },
            Exponent => match c {
                '+' | '-' => Step::Keep(ExponentSign),
                c if is_digit(c) => Step::Keep(ExponentDigit),
                _ => Step::Fail("expected exponent digits"),
            },
            ExponentSign => match c {
                c if is_digit(c) => Step::Keep(ExponentDigit),
                _ => Step::Fail("expected exponent digits"),
            },
            ExponentDigit => match c {
                c if is_digit(c) => Step::Keep(ExponentDigit),
                c if ends_number(c) => Step::Done,
                _ => Step::Fail("invalid character in exponent"),
            },
        }
    }

    fn is_float(self) -> bool {
        !matches!(self, NumberState::IntDigit)
    }
}

/// Characters that may directly follow a number literal.
fn ends_number(c: char) -> bool {
    !(c.is_alphanumeric() || c == '_' || c == '.')
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    pos: usize,
    line: usize,
    line_start: usize,
}

/// Hand-written OMCL tokenizer over an owned or borrowed source string.
#[derive(Debug)]
pub struct Lexer<'s> {
    src: Cow<'s, str>,
    cur: Cursor,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self::from_cow(Cow::Borrowed(src))
    }

    pub fn from_string(src: String) -> Lexer<'static> {
        Lexer::from_cow(Cow::Owned(src))
    }

    /// Read the whole file up front; a missing or unreadable file is
    /// [`Error::FileNotFound`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Lexer<'static>> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| Error::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Lexer::from_string(src))
    }

    fn from_cow(src: Cow<'s, str>) -> Self {
        Self {
            src,
            cur: Cursor {
                pos: 0,
                line: 1,
                line_start: 0,
            },
        }
    }

    pub fn source(&self) -> &str {
        &self.src
    }

    /// Lex every remaining token; the last one is always [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if eof {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.lex(false)
    }

    /// Like [`next_token`](Self::next_token), but a bare word comes back as a
    /// [`TokenKind::String`] key name.
    pub fn next_key_token(&mut self) -> Result<Token> {
        self.lex(true)
    }

    pub fn peek_token(&mut self) -> Result<Token> {
        let saved = self.cur;
        let tok = self.lex(false);
        self.cur = saved;
        tok
    }

    pub fn peek_key_token(&mut self) -> Result<Token> {
        let saved = self.cur;
        let tok = self.lex(true);
        self.cur = saved;
        tok
    }

    // ── cursor helpers ────────────────────────────────────────────────────

    fn rest(&self) -> &str {
        &self.src[self.cur.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cur.pos += ch.len_utf8();
        if ch == '\n' {
            self.cur.line += 1;
            self.cur.line_start = self.cur.pos;
        }
        Some(ch)
    }

    fn span_from(&self, start: Cursor) -> Span {
        Span {
            line: start.line,
            start: start.pos,
            end: self.cur.pos,
            line_start: start.line_start,
        }
    }

    fn error_at(&self, at: Cursor, message: impl Into<String>) -> Error {
        Error::Lexical {
            line: at.line,
            column: at.pos - at.line_start + 1,
            message: message.into(),
        }
    }

    // ── trivia ────────────────────────────────────────────────────────────

    /// Skip whitespace and comments. Returns the cursor at the first line break
    /// crossed, if any.
    fn skip_trivia(&mut self) -> Option<Cursor> {
        let mut first_newline = None;
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('\n') => {
                    first_newline.get_or_insert(self.cur);
                    self.advance();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    self.skip_block_comment(&mut first_newline);
                }
                _ => return first_newline,
            }
        }
    }

    /// Nested `/* */`. Running out of input inside the comment ends it silently.
    fn skip_block_comment(&mut self, first_newline: &mut Option<Cursor>) {
        let mut depth = 0usize;
        loop {
            if self.rest().starts_with("/*") {
                self.advance();
                self.advance();
                depth += 1;
            } else if self.rest().starts_with("*/") {
                self.advance();
                self.advance();
                depth -= 1;
                if depth == 0 {
                    return;
                }
            } else {
                if self.peek() == Some('\n') {
                    first_newline.get_or_insert(self.cur);
                }
                if self.advance().is_none() {
                    return;
                }
            }
        }
    }

    // ── tokens ────────────────────────────────────────────────────────────

    fn lex(&mut self, key_mode: bool) -> Result<Token> {
        if let Some(newline) = self.skip_trivia() {
            return Ok(Token {
                kind: TokenKind::Newline,
                span: self.span_from(newline),
            });
        }

        let start = self.cur;
        let Some(ch) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: self.span_from(start),
            });
        };

        let kind = match ch {
            ',' => self.single(TokenKind::Comma),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '=' => self.single(TokenKind::Equals),
            '"' | '\'' => self.lex_string(ch)?,
            '!' => self.lex_tag()?,
            c if c.is_ascii_digit() => self.lex_number()?,
            '+' | '-' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number()?
            }
            '_' if !key_mode && self.peek_second().is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number()?
            }
            c if is_name_start(c) => self.lex_word(key_mode),
            other => {
                self.advance();
                TokenKind::Unknown(other)
            }
        };

        Ok(Token {
            kind,
            span: self.span_from(start),
        })
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Verbatim text between matching quotes; line breaks included.
    fn lex_string(&mut self, quote: char) -> Result<TokenKind> {
        let open = self.cur;
        self.advance();
        let body_start = self.cur.pos;
        loop {
            match self.peek() {
                None => return Err(self.error_at(open, "unterminated string literal")),
                Some(c) if c == quote => {
                    let text = self.src[body_start..self.cur.pos].to_string();
                    self.advance();
                    return Ok(TokenKind::String(text));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn lex_tag(&mut self) -> Result<TokenKind> {
        let bang = self.cur;
        self.advance();
        let name_start = self.cur.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.advance();
        }
        if self.cur.pos == name_start {
            return Err(self.error_at(bang, "expected a tag name after '!'"));
        }
        Ok(TokenKind::Tag(self.src[name_start..self.cur.pos].to_string()))
    }

    fn lex_word(&mut self, key_mode: bool) -> TokenKind {
        let start = self.cur.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.advance();
        }
        let word = &self.src[start..self.cur.pos];
        if key_mode {
            return TokenKind::String(word.to_string());
        }
        match word {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "none" => TokenKind::None,
            _ => TokenKind::Identifier(word.to_string()),
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind> {
        let start = self.cur;
        let negative = match self.peek() {
            Some('-') => {
                self.advance();
                true
            }
            Some('+') => {
                self.advance();
                false
            }
            _ => false,
        };

        let radix = match (self.peek(), self.peek_second()) {
            (Some('0'), Some('x' | 'X')) => 16,
            (Some('0'), Some('o' | 'O')) => 8,
            (Some('0'), Some('b' | 'B')) => 2,
            _ => 10,
        };
        if radix != 10 {
            self.advance();
            self.advance();
        }

        let mut literal = String::new();
        let mut state = NumberState::Start;
        loop {
            let at = self.cur;
            let c = self.peek();
            match state.step(c, radix) {
                Step::Keep(next) => {
                    if let Some(c) = c {
                        literal.push(c);
                    }
                    self.advance();
                    state = next;
                }
                Step::Skip(next) => {
                    self.advance();
                    state = next;
                }
                Step::Done => break,
                Step::Fail(why) => {
                    let message = match c {
                        Some(c) => format!("unexpected character {c:?} in number: {why}"),
                        None => format!("unexpected end of input in number: {why}"),
                    };
                    return Err(self.error_at(at, message));
                }
            }
        }

        if radix != 10 {
            let magnitude = u64::from_str_radix(&literal, radix)
                .map_err(|_| self.error_at(start, "integer literal out of range"))?;
            // Radix literals keep their bit pattern, so 0xFFFF_FFFF_FFFF_FFFF is -1.
            let value = magnitude as i64;
            return Ok(TokenKind::Int(if negative {
                value.wrapping_neg()
            } else {
                value
            }));
        }

        if negative {
            literal.insert(0, '-');
        }
        if state.is_float() {
            let value = literal
                .parse::<f64>()
                .map_err(|_| self.error_at(start, format!("invalid float literal {literal:?}")))?;
            if !value.is_finite() {
                return Err(self.error_at(start, "float literal out of range"));
            }
            Ok(TokenKind::Float(value))
        } else {
            literal
                .parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|_| self.error_at(start, "integer literal out of range"))
        }
    }
}
