//! Error types for lexing, parsing, serializing, and deserializing OMCL.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur anywhere in the OMCL pipeline.
///
/// Every error aborts the operation that produced it; there are no partial results.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed token: bad number, unterminated string, empty tag.
    #[error("lexical error at {line}:{column}: {message}")]
    Lexical {
        line: usize,
        column: usize,
        message: String,
    },

    /// Well-formed tokens in an order the grammar does not allow.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// The source value cannot be converted into the target type.
    #[error("cannot convert {found} into `{target}`{}", detail_suffix(.detail))]
    TypeMismatch {
        target: &'static str,
        found: String,
        detail: Option<String>,
    },

    /// The target type has no conversion for this kind of source value.
    #[error("`{target}` cannot be built from {found}")]
    UnsupportedType { target: &'static str, found: String },

    /// The source object has keys that `target` does not declare.
    #[error("unknown properties for `{target}`: {rendered}")]
    UnknownProperties {
        target: &'static str,
        keys: Vec<String>,
        rendered: String,
    },

    /// A string did not name any member of the target enumeration.
    #[error("`{value}` is not a member of `{target}` (expected one of: {})", .expected.join(", "))]
    EnumValueInvalid {
        target: &'static str,
        value: String,
        expected: Vec<&'static str>,
    },

    #[error("file not found: {}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A caller-registered converter rejected its input.
    #[error("converter for `{target}` failed: {source}")]
    Converter {
        target: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Boxed error returned by caller-supplied converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Machine-distinguishable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LexicalError,
    SyntaxError,
    TypeMismatch,
    UnsupportedType,
    UnknownProperties,
    EnumValueInvalid,
    FileNotFound,
    Converter,
    Io,
    Json,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lexical { .. } => ErrorKind::LexicalError,
            Error::Syntax { .. } => ErrorKind::SyntaxError,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Error::UnknownProperties { .. } => ErrorKind::UnknownProperties,
            Error::EnumValueInvalid { .. } => ErrorKind::EnumValueInvalid,
            Error::FileNotFound { .. } => ErrorKind::FileNotFound,
            Error::Converter { .. } => ErrorKind::Converter,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::Json,
        }
    }

    /// 1-based `(line, column)` of a lexical or syntax error.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Error::Lexical { line, column, .. } | Error::Syntax { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }

    pub(crate) fn type_mismatch<T: ?Sized>(found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            target: std::any::type_name::<T>(),
            found: found.into(),
            detail: None,
        }
    }

    pub(crate) fn type_mismatch_detail<T: ?Sized>(
        found: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            target: std::any::type_name::<T>(),
            found: found.into(),
            detail: Some(detail.into()),
        }
    }

    pub(crate) fn unsupported<T: ?Sized>(found: impl Into<String>) -> Self {
        Error::UnsupportedType {
            target: std::any::type_name::<T>(),
            found: found.into(),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}

/// Convenience alias used throughout omcl.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn located_errors_expose_location() {
        let err = Error::Syntax {
            line: 3,
            column: 7,
            message: "expected '='".into(),
        };
        assert_eq!(err.location(), Some((3, 7)));
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
        assert_eq!(err.to_string(), "syntax error at 3:7: expected '='");
    }

    #[test]
    fn type_mismatch_names_target() {
        let err = Error::type_mismatch_detail::<u8>("Int(300)", "out of range");
        assert_eq!(err.location(), None);
        assert_eq!(err.to_string(), "cannot convert Int(300) into `u8`: out of range");
    }

    #[test]
    fn enum_error_lists_members() {
        let err = Error::EnumValueInvalid {
            target: "Color",
            value: "Purple".into(),
            expected: vec!["Red", "Green"],
        };
        assert_eq!(
            err.to_string(),
            "`Purple` is not a member of `Color` (expected one of: Red, Green)"
        );
    }
}
