//! Generic mapping from a parsed [`Value`] tree into application types.
//!
//! Dispatch for a target type `T`, by source kind:
//!
//! - **String**: a registered [`StringConverter`] for `T` receives the tags and
//!   text and owns the result. Otherwise `T`'s [`FromValue`] impl decides
//!   (identity for `String`, member-name lookup for enumerations, textual parse
//!   for primitives).
//! - **Object**: a registered [`ObjectConverter`] for `T` that accepts the tags
//!   creates the instance, then structural fill runs on it. Otherwise
//!   [`FromValue`] decides (maps convert every property; [`Structure`] types are
//!   default-constructed and filled).
//! - **Array**: a registered [`ArrayConverter`] for `T` builds the collection.
//!   Otherwise [`FromValue`] decides (fixed-size arrays, insertable collections).
//! - **None / Bool / Int / Float**: always [`FromValue`].
//!
//! Structural fill never mutates the source: the keys each field consumes are
//! recorded in a visited set, and any key left over after the target's fields are
//! processed fails the whole call with [`Error::UnknownProperties`].

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;

use log::trace;

use crate::converter::{ArrayConverter, ObjectConverter, StringConverter};
use crate::error::{BoxError, Error, Result};
use crate::from_value::FromValue;
use crate::parser::Parser;
use crate::serializer::serialize;
use crate::value::{Array, Object, Value, ValueKind};

/// A type whose fields are filled by name from an OMCL object.
///
/// This is the explicit field table of the type: `fill` calls
/// [`Fields::field`] once per declared field. The [`structure!`](crate::structure)
/// macro writes the impl for plain structs.
pub trait Structure: 'static {
    fn fill(&mut self, fields: &mut Fields<'_>) -> Result<()>;
}

/// Cursor over the source object during structural fill.
pub struct Fields<'a> {
    object: &'a Object,
    de: &'a Deserializer,
    visited: HashSet<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(object: &'a Object, de: &'a Deserializer) -> Self {
        Self {
            object,
            de,
            visited: HashSet::new(),
        }
    }

    /// Convert and assign the property named `name`, if present. An absent
    /// property leaves `slot` untouched.
    pub fn field<T: FromValue>(&mut self, name: &str, slot: &mut T) -> Result<()> {
        let object: &'a Object = self.object;
        if let Some((key, value)) = object.get_key_value(name) {
            *slot = self.de.convert::<T>(value)?;
            self.visited.insert(key.as_str());
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.object.contains_key(name)
    }

    pub fn deserializer(&self) -> &Deserializer {
        self.de
    }

    fn leftover(&self) -> Object {
        self.object
            .iter()
            .filter(|(key, _)| !self.visited.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl fmt::Debug for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fields")
            .field("keys", &self.object.keys().collect::<Vec<_>>())
            .field("visited", &self.visited)
            .finish()
    }
}

type StringFn = Box<dyn Fn(&[String], &str) -> Result<Box<dyn Any>> + Send + Sync>;
type ObjectFn =
    Box<dyn Fn(&[String], &Object, &Deserializer) -> Result<Option<Box<dyn Any>>> + Send + Sync>;
type ArrayFn = Box<dyn Fn(&Array, &Deserializer) -> Result<Box<dyn Any>> + Send + Sync>;
type DynFn = Box<dyn Fn(&Value, &Deserializer) -> Result<Box<dyn Any>> + Send + Sync>;

/// Converter registries plus the conversion engine.
///
/// Configure once with the `register_*` methods, then share it read-only; it is
/// `Send + Sync`. Registering a second converter for the same target type
/// replaces the first.
#[derive(Default)]
pub struct Deserializer {
    strings: HashMap<TypeId, StringFn>,
    objects: HashMap<TypeId, ObjectFn>,
    arrays: HashMap<TypeId, ArrayFn>,
    types: HashMap<TypeId, (&'static str, DynFn)>,
}

impl fmt::Debug for Deserializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deserializer")
            .field("string_converters", &self.strings.len())
            .field("object_converters", &self.objects.len())
            .field("array_converters", &self.arrays.len())
            .field("registered_types", &self.types.len())
            .finish()
    }
}

impl Deserializer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── registration ──────────────────────────────────────────────────────

    pub fn register_string_converter<C>(&mut self, converter: C) -> &mut Self
    where
        C: StringConverter + Send + Sync + 'static,
    {
        self.register_string_fn(move |tags, text| converter.convert(tags, text))
    }

    /// Closure form of [`register_string_converter`](Self::register_string_converter).
    pub fn register_string_fn<T, F>(&mut self, convert: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&[String], &str) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        let erased = move |tags: &[String], text: &str| -> Result<Box<dyn Any>> {
            match convert(tags, text) {
                Ok(v) => Ok(Box::new(v)),
                Err(source) => Err(Error::Converter {
                    target: type_name::<T>(),
                    source,
                }),
            }
        };
        self.strings.insert(TypeId::of::<T>(), Box::new(erased));
        self
    }

    pub fn register_object_converter<C>(&mut self, converter: C) -> &mut Self
    where
        C: ObjectConverter + Send + Sync + 'static,
    {
        let erased = move |tags: &[String],
                           object: &Object,
                           de: &Deserializer|
              -> Result<Option<Box<dyn Any>>> {
            if !converter.can_convert(tags, object) {
                return Ok(None);
            }
            let mut instance = converter
                .create_instance(tags)
                .map_err(|source| Error::Converter {
                    target: type_name::<C::Target>(),
                    source,
                })?;
            de.fill(&mut instance, object)?;
            Ok(Some(Box::new(instance)))
        };
        self.objects
            .insert(TypeId::of::<C::Target>(), Box::new(erased));
        self
    }

    pub fn register_array_converter<C>(&mut self, converter: C) -> &mut Self
    where
        C: ArrayConverter + Send + Sync + 'static,
    {
        let erased = move |array: &Array, de: &Deserializer| -> Result<Box<dyn Any>> {
            let mut collection = converter.create_instance();
            for item in array {
                let element = de.convert::<C::Element>(item)?;
                converter.add_value(&mut collection, element);
            }
            Ok(Box::new(collection))
        };
        self.arrays
            .insert(TypeId::of::<C::Collection>(), Box::new(erased));
        self
    }

    /// Make `T` reachable through [`deserialize_dyn`](Self::deserialize_dyn).
    pub fn register_type<T: FromValue>(&mut self) -> &mut Self {
        let erased = |value: &Value, de: &Deserializer| -> Result<Box<dyn Any>> {
            Ok(Box::new(de.convert::<T>(value)?))
        };
        self.types
            .insert(TypeId::of::<T>(), (type_name::<T>(), Box::new(erased)));
        self
    }

    // ── entry points ──────────────────────────────────────────────────────

    /// Parse the parser's source as a top-level object and convert it to `T`.
    pub fn deserialize<T: FromValue>(&self, parser: &mut Parser<'_>) -> Result<T> {
        let document = Value::from(parser.parse_object()?);
        self.convert(&document)
    }

    /// [`deserialize`](Self::deserialize) for a type chosen at run time. The
    /// type must have been registered with [`register_type`](Self::register_type).
    pub fn deserialize_dyn(&self, target: TypeId, parser: &mut Parser<'_>) -> Result<Box<dyn Any>> {
        let Some((name, convert)) = self.types.get(&target) else {
            return Err(Error::UnsupportedType {
                target: "unregistered type",
                found: format!("{target:?}"),
            });
        };
        trace!("dynamic deserialization into `{name}`");
        let document = Value::from(parser.parse_object()?);
        convert(&document, self)
    }

    pub fn from_str<T: FromValue>(&self, src: &str) -> Result<T> {
        self.deserialize(&mut Parser::new(src))
    }

    /// Convert one value. Registered converters for exactly `T` take priority
    /// over `T`'s [`FromValue`] impl.
    pub fn convert<T: FromValue>(&self, value: &Value) -> Result<T> {
        let id = TypeId::of::<T>();
        trace!("converting {} into `{}`", value.kind_name(), type_name::<T>());

        let overridden = match value.kind() {
            ValueKind::String(text) => match self.strings.get(&id) {
                Some(convert) => {
                    trace!("string converter for `{}`", type_name::<T>());
                    Some(convert(value.tags(), text)?)
                }
                None => None,
            },
            ValueKind::Object(object) => match self.objects.get(&id) {
                Some(convert) => {
                    let made = convert(value.tags(), object, self)?;
                    if made.is_some() {
                        trace!("object converter for `{}`", type_name::<T>());
                    }
                    made
                }
                None => None,
            },
            ValueKind::Array(array) => match self.arrays.get(&id) {
                Some(convert) => {
                    trace!("array converter for `{}`", type_name::<T>());
                    Some(convert(array, self)?)
                }
                None => None,
            },
            _ => None,
        };

        match overridden {
            Some(boxed) => match boxed.downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(_) => Err(Error::unsupported::<T>(value.kind_name())),
            },
            None => T::from_value(value, self),
        }
    }

    /// Like [`convert`](Self::convert) for a `T` that is only reachable through
    /// an object converter, such as a tag-selected sum type.
    pub fn convert_object<T: Structure>(&self, value: &Value) -> Result<T> {
        let ValueKind::Object(object) = value.kind() else {
            return Err(Error::type_mismatch::<T>(value.describe()));
        };
        let Some(convert) = self.objects.get(&TypeId::of::<T>()) else {
            return Err(Error::unsupported::<T>(value.kind_name()));
        };
        match convert(value.tags(), object, self)? {
            Some(boxed) => match boxed.downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(_) => Err(Error::unsupported::<T>(value.kind_name())),
            },
            None => Err(Error::type_mismatch_detail::<T>(
                value.describe(),
                format!("no variant selected by tags {:?}", value.tags()),
            )),
        }
    }

    /// Default-construct `T` and fill it from an object value.
    pub fn fill_default<T: Structure + Default>(&self, value: &Value) -> Result<T> {
        match value.kind() {
            ValueKind::Object(object) => {
                let mut target = T::default();
                self.fill(&mut target, object)?;
                Ok(target)
            }
            ValueKind::Array(_) => Err(Error::unsupported::<T>(value.kind_name())),
            _ => Err(Error::type_mismatch::<T>(value.describe())),
        }
    }

    /// Structural field fill of an existing instance.
    pub fn fill<T: Structure>(&self, target: &mut T, object: &Object) -> Result<()> {
        let mut fields = Fields::new(object, self);
        target.fill(&mut fields)?;

        let leftover = fields.leftover();
        if leftover.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = leftover.keys().cloned().collect();
        let rendered = serialize(&Value::from(leftover)).unwrap_or_else(|_| keys.join(", "));
        Err(Error::UnknownProperties {
            target: type_name::<T>(),
            keys,
            rendered,
        })
    }
}

/// Parse `src` as a document and convert it with no converters registered.
pub fn from_str<T: FromValue>(src: &str) -> Result<T> {
    Deserializer::new().from_str(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn deserializer_is_shareable() {
        assert_send_sync::<Deserializer>();
    }

    #[test]
    fn unregistered_dyn_type_is_unsupported() {
        let de = Deserializer::new();
        let err = de
            .deserialize_dyn(TypeId::of::<u8>(), &mut Parser::new("a = 1"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedType);
    }
}
