//! Recursive-descent OMCL parser.
//!
//! ```text
//! item      := tag* ( object | array | string+ | int | float | bool | none )
//! object    := '{' (newline | property (sep property)* trailing-sep?)? '}'
//! property  := (String | Identifier) ( '=' item | object | array )
//! array     := '[' (newline | item (sep item)* trailing-sep?)? ']'
//! sep       := (',' | newline)+
//! ```
//!
//! A top-level object or array has no opening delimiter and ends at end of
//! input. The first syntax error aborts the parse; there is no recovery and no
//! partial tree.

use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Span, TokenKind};
use crate::value::{Array, Object, Value, ValueKind};

/// Parse a top-level object (a whole OMCL document) from a string.
pub fn parse_str(src: &str) -> Result<Object> {
    Parser::new(src).parse_object()
}

/// Parse a single item, e.g. `!Point { x = 1, y = 2 }` or `"a" "b"`.
pub fn parse_item_str(src: &str) -> Result<Value> {
    Parser::new(src).parse_item()
}

/// Parse a top-level array: items separated by commas or newlines up to end of input.
pub fn parse_array_str(src: &str) -> Result<Array> {
    Parser::new(src).parse_array()
}

/// Deepest object/array nesting accepted before the parse fails.
pub const MAX_DEPTH: usize = 256;

/// One parse session over one source.
#[derive(Debug)]
pub struct Parser<'s> {
    lexer: Lexer<'s>,
    depth: usize,
}

impl<'s> Parser<'s> {
    pub fn new(src: &'s str) -> Self {
        Self::from_lexer(Lexer::new(src))
    }

    pub fn from_string(src: String) -> Parser<'static> {
        Parser::from_lexer(Lexer::from_string(src))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Parser<'static>> {
        Ok(Parser::from_lexer(Lexer::from_file(path)?))
    }

    pub fn from_lexer(lexer: Lexer<'s>) -> Self {
        Self { lexer, depth: 0 }
    }

    /// Parse exactly one item; only line breaks may follow it.
    pub fn parse_item(&mut self) -> Result<Value> {
        self.skip_newlines()?;
        let value = self.parse_value()?;
        self.skip_newlines()?;
        let tok = self.lexer.next_token()?;
        if tok.kind != TokenKind::Eof {
            return Err(syntax_error(tok.span, format!("unexpected {} after value", tok.kind)));
        }
        debug!("parsed top-level {}", value.kind_name());
        Ok(value)
    }

    /// Parse a document whose top level is an object body without braces.
    pub fn parse_object(&mut self) -> Result<Object> {
        let object = self.parse_object_body(&TokenKind::Eof)?;
        debug!("parsed top-level object with {} properties", object.len());
        Ok(object)
    }

    /// Parse a document whose top level is an array body without brackets.
    pub fn parse_array(&mut self) -> Result<Array> {
        let array = self.parse_array_body(&TokenKind::Eof)?;
        debug!("parsed top-level array with {} items", array.len());
        Ok(array)
    }

    fn parse_value(&mut self) -> Result<Value> {
        let mut tags = Vec::new();
        let tok = loop {
            let tok = self.lexer.next_token()?;
            if let TokenKind::Tag(name) = &tok.kind {
                tags.push(name.clone());
            } else {
                break tok;
            }
        };
        let span = tok.span;

        let kind = match tok.kind {
            TokenKind::LBrace => {
                self.enter(span)?;
                let object = self.parse_object_body(&TokenKind::RBrace)?;
                self.depth -= 1;
                ValueKind::Object(object)
            }
            TokenKind::LBracket => {
                self.enter(span)?;
                let array = self.parse_array_body(&TokenKind::RBracket)?;
                self.depth -= 1;
                ValueKind::Array(array)
            }
            TokenKind::String(mut text) => {
                while let TokenKind::String(next) = self.lexer.peek_token()?.kind {
                    self.lexer.next_token()?;
                    text.push_str(&next);
                }
                ValueKind::String(text)
            }
            TokenKind::Int(n) => ValueKind::Int(n),
            TokenKind::Float(f) => ValueKind::Float(f),
            TokenKind::True => ValueKind::Bool(true),
            TokenKind::False => ValueKind::Bool(false),
            TokenKind::None => ValueKind::None,
            other => {
                return Err(syntax_error(span, format!("expected a value, found {other}")));
            }
        };

        Ok(Value::with_tags(kind, tags))
    }

    fn parse_object_body(&mut self, close: &TokenKind) -> Result<Object> {
        let mut object = Object::new();
        self.skip_newlines()?;
        loop {
            if self.lexer.peek_key_token()?.kind == *close {
                self.lexer.next_token()?;
                return Ok(object);
            }
            self.parse_property(&mut object)?;
            self.expect_separator_or(close, "property")?;
        }
    }

    fn parse_property(&mut self, object: &mut Object) -> Result<()> {
        let key_tok = self.lexer.next_key_token()?;
        let key = match key_tok.kind {
            TokenKind::String(ref s) | TokenKind::Identifier(ref s) => s.clone(),
            ref other => {
                return Err(syntax_error(
                    key_tok.span,
                    format!("expected a property name, found {other}"),
                ));
            }
        };

        let tok = self.lexer.peek_token()?;
        let value = match tok.kind {
            TokenKind::Equals => {
                self.lexer.next_token()?;
                self.parse_value()?
            }
            TokenKind::LBrace | TokenKind::LBracket => self.parse_value()?,
            ref other => {
                return Err(syntax_error(
                    tok.span,
                    format!("expected '=' after property name {key:?}, found {other}"),
                ));
            }
        };

        if object.insert(key.clone(), value).is_some() {
            debug!(
                "duplicate property {key:?} at {}:{} overwrites earlier value",
                key_tok.line(),
                key_tok.column()
            );
        }
        Ok(())
    }

    fn parse_array_body(&mut self, close: &TokenKind) -> Result<Array> {
        let mut array = Array::new();
        self.skip_newlines()?;
        loop {
            if self.lexer.peek_token()?.kind == *close {
                self.lexer.next_token()?;
                return Ok(array);
            }
            array.push(self.parse_value()?);
            self.expect_separator_or(close, "array item")?;
        }
    }

    /// After an element: consume `(',' | newline)+`, or leave `close` for the
    /// caller. Anything else is an error.
    fn expect_separator_or(&mut self, close: &TokenKind, element: &str) -> Result<()> {
        let tok = self.lexer.peek_token()?;
        match tok.kind {
            TokenKind::Comma | TokenKind::Newline => {
                while matches!(
                    self.lexer.peek_token()?.kind,
                    TokenKind::Comma | TokenKind::Newline
                ) {
                    self.lexer.next_token()?;
                }
                Ok(())
            }
            ref kind if kind == close => Ok(()),
            ref other => Err(syntax_error(
                tok.span,
                format!("expected ',', newline or {close} after {element}, found {other}"),
            )),
        }
    }

    fn enter(&mut self, open: Span) -> Result<()> {
        if self.depth == MAX_DEPTH {
            return Err(syntax_error(
                open,
                format!("nesting deeper than {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_newlines(&mut self) -> Result<()> {
        while self.lexer.peek_token()?.kind == TokenKind::Newline {
            self.lexer.next_token()?;
        }
        Ok(())
    }
}

fn syntax_error(span: Span, message: String) -> Error {
    Error::Syntax {
        line: span.line,
        column: span.column(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_attach_to_the_value() {
        let value = parse_item_str("!a !b 5").unwrap();
        assert_eq!(value.tags(), ["a", "b"]);
        assert_eq!(value.as_i64(), Some(5));
    }

    #[test]
    fn keyword_is_a_valid_key() {
        let obj = parse_str("none = 1\ntrue = 2").unwrap();
        assert_eq!(obj["none"], Value::from(1));
        assert_eq!(obj["true"], Value::from(2));
    }

    #[test]
    fn stray_close_at_top_level() {
        let err = parse_str("a = 1\n}").unwrap_err();
        assert_eq!(err.location(), Some((2, 1)));
    }
}
