//! Renders a [`Value`] tree back to OMCL text.
//!
//! Output is deterministic:
//!
//! - objects open with `{`, one `name = value` per line, indented one level
//!   (4 spaces by default) deeper than the enclosing line
//! - arrays open with `[`, one item per line
//! - empty containers render as `{}` / `[]`
//! - strings are double-quoted; OMCL has no escape sequences, so an embedded `"`
//!   is spliced out into a `'"'` literal and the pieces rely on string
//!   concatenation, e.g. `say "hi"` → `"say " '"' "hi" '"'`
//! - tags are not written, and the `name { ... }` shorthand is never produced
//!
//! The output carries no trailing newline.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::value::{Array, Object, Value, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

/// Render `value` with default options.
pub fn serialize(value: &Value) -> Result<String> {
    serialize_with(value, &SerializerOptions::default())
}

pub fn serialize_with(value: &Value, options: &SerializerOptions) -> Result<String> {
    let mut ser = Serializer::new(options);
    ser.write_value(value, 0)?;
    Ok(ser.out)
}

/// Render a top-level object the way a document is written: one property per
/// line, no surrounding braces. [`crate::parse_str`] reads it back.
pub fn serialize_document(object: &Object) -> Result<String> {
    let mut ser = Serializer::new(&SerializerOptions::default());
    let mut first = true;
    for (key, value) in object {
        if !first {
            ser.out.push('\n');
        }
        first = false;
        ser.write_property(key, value, 0)?;
    }
    Ok(ser.out)
}

/// Render `value` into `sink`. The sink is flushed and dropped before returning.
pub fn serialize_to<W: Write>(value: &Value, mut sink: W) -> Result<()> {
    let text = serialize(value)?;
    sink.write_all(text.as_bytes())?;
    sink.flush()?;
    Ok(())
}

pub fn serialize_to_file(value: &Value, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    serialize_to(value, BufWriter::new(file))
}

struct Serializer {
    out: String,
    indent: usize,
}

impl Serializer {
    fn new(options: &SerializerOptions) -> Self {
        Self {
            out: String::new(),
            indent: options.indent,
        }
    }

    fn pad(&mut self, depth: usize) {
        for _ in 0..depth * self.indent {
            self.out.push(' ');
        }
    }

    fn write_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value.kind() {
            ValueKind::None => self.out.push_str("none"),
            ValueKind::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            ValueKind::Int(n) => self.out.push_str(&n.to_string()),
            ValueKind::Float(f) => self.out.push_str(&format_float(*f)?),
            ValueKind::String(s) => write_string(s, &mut self.out),
            ValueKind::Array(array) => self.write_array(array, depth)?,
            ValueKind::Object(object) => self.write_object(object, depth)?,
        }
        Ok(())
    }

    fn write_array(&mut self, array: &Array, depth: usize) -> Result<()> {
        if array.is_empty() {
            self.out.push_str("[]");
            return Ok(());
        }
        self.out.push_str("[\n");
        for item in array {
            self.pad(depth + 1);
            self.write_value(item, depth + 1)?;
            self.out.push('\n');
        }
        self.pad(depth);
        self.out.push(']');
        Ok(())
    }

    fn write_object(&mut self, object: &Object, depth: usize) -> Result<()> {
        if object.is_empty() {
            self.out.push_str("{}");
            return Ok(());
        }
        self.out.push_str("{\n");
        for (key, value) in object {
            self.write_property(key, value, depth + 1)?;
            self.out.push('\n');
        }
        self.pad(depth);
        self.out.push('}');
        Ok(())
    }

    fn write_property(&mut self, key: &str, value: &Value, depth: usize) -> Result<()> {
        self.pad(depth);
        write_key(key, &mut self.out)?;
        self.out.push_str(" = ");
        self.write_value(value, depth)
    }
}

/// `{:?}` keeps a `.0` on whole floats, so they read back as floats.
fn format_float(f: f64) -> Result<String> {
    if !f.is_finite() {
        return Err(Error::UnsupportedType {
            target: "OMCL text",
            found: format!("Float({f})"),
        });
    }
    Ok(format!("{f:?}"))
}

fn write_string(s: &str, out: &mut String) {
    if s.is_empty() {
        out.push_str("\"\"");
        return;
    }
    let mut first = true;
    let mut rest = s;
    while !rest.is_empty() {
        if !first {
            out.push(' ');
        }
        first = false;
        let quotes = rest.len() - rest.trim_start_matches('"').len();
        if quotes > 0 {
            out.push('\'');
            out.push_str(&rest[..quotes]);
            out.push('\'');
            rest = &rest[quotes..];
        } else {
            let run = rest.find('"').unwrap_or(rest.len());
            out.push('"');
            out.push_str(&rest[..run]);
            out.push('"');
            rest = &rest[run..];
        }
    }
}

/// Keys are written bare only when the lexer would read them back as the same
/// bare key. A key is a single string token, so one holding `"` falls back to
/// single quotes.
fn write_key(key: &str, out: &mut String) -> Result<()> {
    if is_bare_key(key) {
        out.push_str(key);
    } else if !key.contains('"') {
        out.push('"');
        out.push_str(key);
        out.push('"');
    } else if !key.contains('\'') {
        out.push('\'');
        out.push_str(key);
        out.push('\'');
    } else {
        return Err(Error::UnsupportedType {
            target: "OMCL property name",
            found: format!("{key:?}"),
        });
    }
    Ok(())
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(s: &str) -> String {
        let mut out = String::new();
        write_string(s, &mut out);
        out
    }

    #[test]
    fn plain_string() {
        assert_eq!(string("hello"), r#""hello""#);
    }

    #[test]
    fn embedded_quotes_are_spliced() {
        assert_eq!(string(r#"say "hi""#), r#""say " '"' "hi" '"'"#);
        assert_eq!(string(r#""""#), r#"'""'"#);
    }

    #[test]
    fn bare_key_rules() {
        assert!(is_bare_key("server_port"));
        assert!(is_bare_key("_private"));
        assert!(!is_bare_key("9lives"));
        assert!(!is_bare_key("a.b"));
        assert!(!is_bare_key("has space"));
        assert!(!is_bare_key(""));
    }

    #[test]
    fn whole_float_keeps_fraction() {
        assert_eq!(format_float(1.0).unwrap(), "1.0");
        assert!(format_float(f64::NAN).is_err());
    }
}
