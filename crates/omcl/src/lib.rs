//! # omcl
//!
//! Lexer, parser, document model, serializer and typed deserializer for **OMCL**,
//! a small configuration language.
//!
//! ```text
//! // a document is an object without the outer braces
//! name = "server" "-01"          // adjacent strings concatenate
//! port = 0x1F90
//! limits { max_conn = 1_000, timeout = 2.5e1 }
//! hobbies = [
//!     !Soccer { Name = "five-a-side" }
//!     !Chess { Name = "blitz" },
//! ]
//! /* block comments /* nest */ */
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use omcl::{parse_str, serialize, structure, Value};
//!
//! let doc = parse_str("name = \"demo\"\nsizes = [1, 2, 3]").unwrap();
//! assert_eq!(doc["name"], Value::from("demo"));
//!
//! #[derive(Debug, Default)]
//! struct Config { name: String, sizes: Vec<u32> }
//! structure!(Config { name, sizes });
//!
//! let config: Config = omcl::from_str("name = \"demo\"\nsizes = [1, 2, 3]").unwrap();
//! assert_eq!(config.sizes, [1, 2, 3]);
//!
//! let text = serialize(&Value::from(doc)).unwrap();
//! assert!(text.starts_with("{\n    name = \"demo\""));
//! ```
//!
//! ## Modules
//!
//! - [`value`]: `Value`, `Object`, `Array` document model
//! - [`lexer`]: source text → tokens
//! - [`parser`]: tokens → `Value` tree
//! - [`serializer`]: `Value` tree → OMCL text
//! - [`deserializer`]: `Value` tree → application types, converter registries
//! - [`converter`]: string / object / array converter traits, `TagRegistry`
//! - [`from_value`]: default conversions, `structure!` and `enumeration!`
//! - [`json`]: JSON bridge
//! - [`error`]: `Error`, `ErrorKind`

pub mod converter;
pub mod deserializer;
pub mod error;
pub mod from_value;
pub mod json;
pub mod lexer;
pub mod parser;
pub mod serializer;
pub mod value;

pub use converter::{ArrayConverter, ObjectConverter, StringConverter, TagRegistry};
pub use deserializer::{from_str, Deserializer, Fields, Structure};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use from_value::FromValue;
pub use json::{from_json, to_json};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{parse_array_str, parse_item_str, parse_str, Parser};
pub use serializer::{
    serialize, serialize_document, serialize_to, serialize_to_file, serialize_with,
    SerializerOptions,
};
pub use value::{Array, Object, Value, ValueKind};
