//! Default conversions from [`Value`] into Rust types.
//!
//! [`FromValue`] is what the [`Deserializer`] falls back to when no converter is
//! registered for the exact target type. Nested values always go back through
//! [`Deserializer::convert`], so converters apply at every depth.
//!
//! | Target | Accepts |
//! |--------|---------|
//! | `bool` | `Bool`, or `"true"` / `"false"` |
//! | integers | `Int` in range, integral `Float` in range, parseable `String` |
//! | `f32` / `f64` | `Float`, `Int`, parseable `String` |
//! | `String`, `PathBuf`, `char` | `String` |
//! | `Option<T>` | `None` → `None`, anything else through `T` |
//! | `Vec<T>`, `VecDeque<T>`, sets | `Array`, item by item |
//! | `[T; N]` | `Array` of exactly `N` items |
//! | `HashMap<String, V>`, `BTreeMap<String, V>` | `Object`, property by property |
//! | [`Value`] | anything (clone) |
//!
//! `None` into any non-optional target is a type mismatch.

use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::path::PathBuf;

use crate::deserializer::Deserializer;
use crate::error::{Error, Result};
use crate::value::{Value, ValueKind};

/// Conversion from a document value, used when no converter overrides it.
pub trait FromValue: Sized + 'static {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self>;
}

/// Mismatch for a scalar target; arrays and objects are unsupported sources.
fn scalar_mismatch<T>(value: &Value) -> Error {
    match value.kind() {
        ValueKind::Array(_) | ValueKind::Object(_) => Error::unsupported::<T>(value.kind_name()),
        _ => Error::type_mismatch::<T>(value.describe()),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _de: &Deserializer) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, _de: &Deserializer) -> Result<Self> {
        match value.kind() {
            ValueKind::Bool(b) => Ok(*b),
            ValueKind::String(s) => s.parse().map_err(|_| {
                Error::type_mismatch_detail::<bool>(value.describe(), "expected `true` or `false`")
            }),
            _ => Err(scalar_mismatch::<bool>(value)),
        }
    }
}

macro_rules! integer_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value, _de: &Deserializer) -> Result<Self> {
                    match value.kind() {
                        ValueKind::Int(n) => <$t>::try_from(*n).map_err(|_| {
                            Error::type_mismatch_detail::<$t>(value.describe(), "out of range")
                        }),
                        // `as i128` saturates, so the bounds are checked first.
                        ValueKind::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                            if *f < i128::MIN as f64 || *f >= i128::MAX as f64 {
                                return Err(Error::type_mismatch_detail::<$t>(
                                    value.describe(),
                                    "out of range",
                                ));
                            }
                            <$t>::try_from(*f as i128).map_err(|_| {
                                Error::type_mismatch_detail::<$t>(value.describe(), "out of range")
                            })
                        }
                        ValueKind::Float(_) => Err(Error::type_mismatch_detail::<$t>(
                            value.describe(),
                            "not a whole number",
                        )),
                        ValueKind::String(s) => s.trim().parse::<$t>().map_err(|e| {
                            Error::type_mismatch_detail::<$t>(value.describe(), e.to_string())
                        }),
                        _ => Err(scalar_mismatch::<$t>(value)),
                    }
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl FromValue for f64 {
    fn from_value(value: &Value, _de: &Deserializer) -> Result<Self> {
        match value.kind() {
            ValueKind::Float(f) => Ok(*f),
            ValueKind::Int(n) => Ok(*n as f64),
            ValueKind::String(s) => s
                .trim()
                .parse()
                .map_err(|e: std::num::ParseFloatError| {
                    Error::type_mismatch_detail::<f64>(value.describe(), e.to_string())
                }),
            _ => Err(scalar_mismatch::<f64>(value)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        let wide = f64::from_value(value, de).map_err(|err| match err {
            Error::TypeMismatch { found, detail, .. } => Error::TypeMismatch {
                target: type_name::<f32>(),
                found,
                detail,
            },
            Error::UnsupportedType { found, .. } => Error::unsupported::<f32>(found),
            other => other,
        })?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(Error::type_mismatch_detail::<f32>(value.describe(), "out of range"));
        }
        Ok(narrow)
    }
}

impl FromValue for String {
    fn from_value(value: &Value, _de: &Deserializer) -> Result<Self> {
        match value.kind() {
            ValueKind::String(s) => Ok(s.clone()),
            _ => Err(scalar_mismatch::<String>(value)),
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: &Value, _de: &Deserializer) -> Result<Self> {
        match value.kind() {
            ValueKind::String(s) => Ok(PathBuf::from(s)),
            _ => Err(scalar_mismatch::<PathBuf>(value)),
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value, _de: &Deserializer) -> Result<Self> {
        let ValueKind::String(s) = value.kind() else {
            return Err(scalar_mismatch::<char>(value));
        };
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::type_mismatch_detail::<char>(
                value.describe(),
                "expected exactly one character",
            )),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        if value.is_none() {
            return Ok(None);
        }
        de.convert::<T>(value).map(Some)
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        de.convert::<T>(value).map(Box::new)
    }
}

/// Default-construct `C` and append every converted array item.
fn collect_items<C, T>(value: &Value, de: &Deserializer) -> Result<C>
where
    C: Default + Extend<T> + 'static,
    T: FromValue,
{
    let ValueKind::Array(array) = value.kind() else {
        return Err(Error::type_mismatch::<C>(value.describe()));
    };
    let mut collection = C::default();
    for item in array {
        collection.extend(std::iter::once(de.convert::<T>(item)?));
    }
    Ok(collection)
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        collect_items(value, de)
    }
}

impl<T: FromValue> FromValue for VecDeque<T> {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        collect_items(value, de)
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        collect_items(value, de)
    }
}

impl<T: FromValue + Eq + Hash> FromValue for HashSet<T> {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        collect_items(value, de)
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        let ValueKind::Array(array) = value.kind() else {
            return Err(Error::type_mismatch::<Self>(value.describe()));
        };
        if array.len() != N {
            return Err(Error::type_mismatch_detail::<Self>(
                value.describe(),
                format!("expected {N} items"),
            ));
        }
        let items = array
            .iter()
            .map(|item| de.convert::<T>(item))
            .collect::<Result<Vec<T>>>()?;
        <[T; N]>::try_from(items).map_err(|_| {
            Error::type_mismatch_detail::<Self>(value.describe(), format!("expected {N} items"))
        })
    }
}

/// Build a string-keyed map, converting every property to `V`.
fn collect_properties<M, V>(value: &Value, de: &Deserializer) -> Result<M>
where
    M: Default + Extend<(String, V)> + 'static,
    V: FromValue,
{
    let object = match value.kind() {
        ValueKind::Object(object) => object,
        ValueKind::Array(_) => return Err(Error::unsupported::<M>(value.kind_name())),
        _ => return Err(Error::type_mismatch::<M>(value.describe())),
    };
    let mut map = M::default();
    for (key, item) in object {
        map.extend(std::iter::once((key.clone(), de.convert::<V>(item)?)));
    }
    Ok(map)
}

impl<V: FromValue> FromValue for HashMap<String, V> {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        collect_properties(value, de)
    }
}

impl<V: FromValue> FromValue for BTreeMap<String, V> {
    fn from_value(value: &Value, de: &Deserializer) -> Result<Self> {
        collect_properties(value, de)
    }
}

/// Parse a string value by exact, case-sensitive member name.
///
/// Used by [`enumeration!`](crate::enumeration); callable directly for
/// hand-written enum impls.
pub fn parse_enum<T: Clone + 'static>(value: &Value, members: &[(&'static str, T)]) -> Result<T> {
    let ValueKind::String(name) = value.kind() else {
        return Err(scalar_mismatch::<T>(value));
    };
    members
        .iter()
        .find(|(member, _)| member == name)
        .map(|(_, v)| v.clone())
        .ok_or_else(|| Error::EnumValueInvalid {
            target: type_name::<T>(),
            value: name.clone(),
            expected: members.iter().map(|(member, _)| *member).collect(),
        })
}

/// Declare the field table of a struct.
///
/// Implements [`Structure`](crate::Structure) and [`FromValue`] for a `Default`
/// struct. Fields are listed either bare (the source key equals the field name)
/// or as `field => "SourceName"`.
///
/// ```
/// #[derive(Debug, Default, PartialEq)]
/// struct Server { host: String, port: u16 }
/// omcl::structure!(Server { host => "Host", port => "Port" });
///
/// let server: Server = omcl::from_str("Host = \"localhost\"\nPort = 8080").unwrap();
/// assert_eq!(server, Server { host: "localhost".into(), port: 8080 });
/// ```
#[macro_export]
macro_rules! structure {
    ($ty:ty { $($field:ident => $name:expr),* $(,)? }) => {
        impl $crate::Structure for $ty {
            fn fill(&mut self, fields: &mut $crate::Fields<'_>) -> $crate::Result<()> {
                $( fields.field($name, &mut self.$field)?; )*
                Ok(())
            }
        }

        impl $crate::FromValue for $ty {
            fn from_value(
                value: &$crate::Value,
                de: &$crate::Deserializer,
            ) -> $crate::Result<Self> {
                de.fill_default::<Self>(value)
            }
        }
    };
    ($ty:ty { $($field:ident),* $(,)? }) => {
        $crate::structure!($ty { $($field => stringify!($field)),* });
    };
}

/// Implement [`FromValue`] for a unit-only enum by member name.
///
/// ```
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Level { Low, High }
/// omcl::enumeration!(Level { Low, High });
///
/// let level: Level = omcl::Deserializer::new()
///     .convert(&omcl::Value::from("High"))
///     .unwrap();
/// assert_eq!(level, Level::High);
/// ```
#[macro_export]
macro_rules! enumeration {
    ($ty:ident { $($variant:ident),* $(,)? }) => {
        impl $crate::FromValue for $ty {
            fn from_value(
                value: &$crate::Value,
                _de: &$crate::Deserializer,
            ) -> $crate::Result<Self> {
                $crate::from_value::parse_enum(value, &[$((stringify!($variant), $ty::$variant)),*])
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn convert<T: FromValue>(value: impl Into<Value>) -> Result<T> {
        Deserializer::new().convert(&value.into())
    }

    #[test]
    fn integral_float_narrows() {
        assert_eq!(convert::<i32>(4.0).unwrap(), 4);
        assert_eq!(convert::<i32>(4.5).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn out_of_range_int() {
        let err = convert::<u8>(300).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("u8"));
    }

    #[test]
    fn huge_float_does_not_saturate() {
        for value in [1e40, -1e40] {
            let err = convert::<i128>(value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TypeMismatch);
            assert!(err.to_string().contains("out of range"), "{err}");
            assert_eq!(convert::<u128>(value).unwrap_err().kind(), ErrorKind::TypeMismatch);
        }
        assert_eq!(convert::<i128>(2f64.powi(100)).unwrap(), 1i128 << 100);
    }

    #[test]
    fn textual_parse() {
        assert_eq!(convert::<u16>("8080").unwrap(), 8080);
        assert_eq!(convert::<f64>("2.5").unwrap(), 2.5);
        assert!(convert::<bool>("true").unwrap());
    }

    #[test]
    fn f32_overflow() {
        assert_eq!(convert::<f32>(1e300).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn string_target_rejects_int() {
        assert_eq!(convert::<String>(1).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn scalar_from_array_is_unsupported() {
        let array: crate::Array = [1, 2].into_iter().collect();
        assert_eq!(convert::<i64>(array).unwrap_err().kind(), ErrorKind::UnsupportedType);
    }
}
